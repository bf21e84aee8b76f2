//! Shared state for the latest readings, connection health, and toast history

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::poller::Health;
use crate::prefs::Theme;
use crate::reading::{GasReading, Prediction, WeightReading};
use crate::sink::ToastRecord;

/// Snapshot of the polling controller's connection health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionHealth {
    pub health: Health,
    pub error_count: u32,
    pub online: bool,
    pub last_success_epoch_ms: Option<u64>,
}

impl Default for ConnectionHealth {
    fn default() -> Self {
        Self {
            health: Health::Healthy,
            error_count: 0,
            online: true,
            last_success_epoch_ms: None,
        }
    }
}

/// Shared state accessible by the poller, sinks, and dashboard
#[derive(Debug)]
pub struct SharedState {
    pub gas: Vec<GasReading>,
    pub weight: Vec<WeightReading>,
    pub prediction: Option<Prediction>,
    pub health: ConnectionHealth,
    pub toasts: VecDeque<ToastRecord>,
    pub toast_max_size: usize,
    pub theme: Theme,
}

impl SharedState {
    pub fn new(toast_max_size: usize, theme: Theme) -> Self {
        Self {
            gas: Vec::new(),
            weight: Vec::new(),
            prediction: None,
            health: ConnectionHealth::default(),
            toasts: VecDeque::with_capacity(toast_max_size),
            toast_max_size,
            theme,
        }
    }

    /// Add a toast to history, evicting the oldest when full
    pub fn add_toast(&mut self, record: ToastRecord) {
        if self.toasts.len() >= self.toast_max_size {
            self.toasts.pop_front();
        }
        self.toasts.push_back(record);
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle(toast_max_size: usize, theme: Theme) -> StateHandle {
    Arc::new(RwLock::new(SharedState::new(toast_max_size, theme)))
}

pub(crate) fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ToastSeverity;

    fn record(message: &str) -> ToastRecord {
        ToastRecord {
            severity: ToastSeverity::Transient,
            message: message.to_string(),
            timestamp_epoch_ms: 0,
        }
    }

    #[test]
    fn new_state_is_empty_and_healthy() {
        let state = SharedState::new(10, Theme::Light);
        assert!(state.gas.is_empty());
        assert!(state.weight.is_empty());
        assert!(state.prediction.is_none());
        assert_eq!(state.health.health, Health::Healthy);
        assert_eq!(state.health.error_count, 0);
        assert!(state.health.online);
    }

    #[test]
    fn toast_history_respects_max_size() {
        let mut state = SharedState::new(2, Theme::Light);
        for i in 0..5 {
            state.add_toast(record(&format!("msg{}", i)));
        }
        assert_eq!(state.toasts.len(), 2);
        assert_eq!(state.toasts[0].message, "msg3");
        assert_eq!(state.toasts[1].message, "msg4");
    }

    #[test]
    fn theme_is_kept_in_state() {
        let state = SharedState::new(10, Theme::Dark);
        assert_eq!(state.theme, Theme::Dark);
    }
}
