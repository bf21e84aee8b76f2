//! Presentation sink trait for pushing fetched data to the UI layer

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::reading::{GasReading, Prediction, WeightReading};
use crate::state::StateHandle;

/// Severity of a user-facing toast message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastSeverity {
    /// Auto-dismissing warning, shown while degraded
    Transient,
    /// Sticky error, shown while polling is suspended
    Persistent,
}

/// A toast message raised by the polling controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub severity: ToastSeverity,
    pub message: String,
}

/// Record of a raised toast, kept in history for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToastRecord {
    pub severity: ToastSeverity,
    pub message: String,
    pub timestamp_epoch_ms: u64,
}

/// Trait for receiving per-source data updates and toasts
///
/// The poller calls these as each fetch settles; a failing source never
/// suppresses updates from the others.
#[async_trait]
pub trait PresentationSink: Send + Sync + std::fmt::Debug {
    async fn update_gas(&self, readings: &[GasReading]);

    async fn update_weight(&self, readings: &[WeightReading]);

    async fn update_prediction(&self, prediction: &Prediction);

    async fn toast(&self, toast: Toast);
}

/// Sink that writes into the shared dashboard state
#[derive(Debug)]
pub struct SharedStateSink {
    state: StateHandle,
}

impl SharedStateSink {
    pub fn new(state: StateHandle) -> Self {
        Self { state }
    }
}

#[async_trait]
impl PresentationSink for SharedStateSink {
    async fn update_gas(&self, readings: &[GasReading]) {
        self.state.write().await.gas = readings.to_vec();
    }

    async fn update_weight(&self, readings: &[WeightReading]) {
        self.state.write().await.weight = readings.to_vec();
    }

    async fn update_prediction(&self, prediction: &Prediction) {
        self.state.write().await.prediction = Some(prediction.clone());
    }

    async fn toast(&self, toast: Toast) {
        let mut state = self.state.write().await;
        let record = ToastRecord {
            severity: toast.severity,
            message: toast.message,
            timestamp_epoch_ms: crate::state::current_epoch_ms(),
        };
        state.add_toast(record);
    }
}
