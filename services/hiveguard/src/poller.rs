//! Polling controller: periodic fetches, failure tracking, suspend/resume
//!
//! One controller instance owns the whole polling lifecycle. Every tick
//! fetches gas, weight, and prediction concurrently and waits for all three
//! to settle; a failing source never suppresses the others. Consecutive
//! fetch failures walk the controller through `Healthy -> Degraded ->
//! Suspended`; suspension stops the timer and arms a one-shot resume timer
//! that restarts polling only if connectivity is online when it fires.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};
use tokio_util::sync::CancellationToken;

use crate::api::BackendClient;
use crate::config::Config;
use crate::reading::{GasReading, Prediction, WeightReading};
use crate::sink::{PresentationSink, Toast, ToastSeverity};
use crate::state::{current_epoch_ms, StateHandle};

/// Connection health of the polling controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Healthy,
    Degraded,
    Suspended,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Healthy => write!(f, "Healthy"),
            Health::Degraded => write!(f, "Degraded"),
            Health::Suspended => write!(f, "Suspended"),
        }
    }
}

/// Outcome of recording one fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureOutcome {
    Degraded { errors: u32, max_errors: u32 },
    Suspend,
    AlreadySuspended,
}

/// Failure/backoff state machine, free of timers and IO
#[derive(Debug)]
struct HealthMachine {
    health: Health,
    error_count: u32,
    max_errors: u32,
    online: bool,
}

impl HealthMachine {
    fn new(max_errors: u32) -> Self {
        Self {
            health: Health::Healthy,
            error_count: 0,
            max_errors,
            online: true,
        }
    }

    /// Record one fetch failure. The count never rises past `max_errors`;
    /// the failure that reaches it triggers suspension, later ones are
    /// absorbed until a resume.
    fn record_failure(&mut self) -> FailureOutcome {
        if self.health == Health::Suspended {
            return FailureOutcome::AlreadySuspended;
        }
        self.error_count += 1;
        if self.error_count >= self.max_errors {
            self.health = Health::Suspended;
            FailureOutcome::Suspend
        } else {
            self.health = Health::Degraded;
            FailureOutcome::Degraded {
                errors: self.error_count,
                max_errors: self.max_errors,
            }
        }
    }

    /// Any fetch success resets the error count and reports Healthy. It does
    /// not restart a stopped timer; only `resume` or an online edge does.
    fn record_success(&mut self) {
        self.error_count = 0;
        self.health = Health::Healthy;
    }

    /// The one-shot resume timer fired. Returns true if polling should
    /// restart; offline at fire time leaves the controller suspended with no
    /// further auto-retry.
    fn resume(&mut self) -> bool {
        if self.online {
            self.error_count = 0;
            self.health = Health::Healthy;
            true
        } else {
            false
        }
    }

    /// Record a connectivity edge. Returns true if an immediate tick should
    /// be performed (transition to online with pending errors).
    fn set_online(&mut self, online: bool) -> bool {
        self.online = online;
        if online && self.error_count > 0 {
            self.error_count = 0;
            if self.health == Health::Degraded {
                self.health = Health::Healthy;
            }
            true
        } else {
            false
        }
    }
}

#[derive(Debug)]
enum PollerCommand {
    ManualRefresh,
    SetOnline(bool),
}

/// Cloneable handle for requesting out-of-cadence actions from the poller
#[derive(Debug, Clone)]
pub struct PollerHandle {
    commands: mpsc::Sender<PollerCommand>,
}

impl PollerHandle {
    /// Perform one tick outside the timer cadence; the timer schedule is
    /// left untouched
    pub async fn manual_refresh(&self) -> bool {
        self.commands
            .send(PollerCommand::ManualRefresh)
            .await
            .is_ok()
    }

    /// Signal a connectivity change to the controller
    pub async fn set_online(&self, online: bool) -> bool {
        self.commands
            .send(PollerCommand::SetOnline(online))
            .await
            .is_ok()
    }
}

/// The polling controller
pub struct Poller {
    api: Arc<BackendClient>,
    sinks: Vec<Arc<dyn PresentationSink>>,
    state: StateHandle,
    refresh_rate: Duration,
    resume_delay: Duration,
    history_length: usize,
    machine: HealthMachine,
    timer: Option<Interval>,
    resume: Option<Pin<Box<Sleep>>>,
    last_gas: Option<Vec<GasReading>>,
    last_weight: Option<Vec<WeightReading>>,
    last_prediction: Option<Prediction>,
    cancel: CancellationToken,
    commands: mpsc::Receiver<PollerCommand>,
}

impl Poller {
    pub fn new(
        api: Arc<BackendClient>,
        sinks: Vec<Arc<dyn PresentationSink>>,
        config: &Config,
        state: StateHandle,
        cancel: CancellationToken,
    ) -> (Self, PollerHandle) {
        let (tx, rx) = mpsc::channel(16);
        let poller = Self {
            api,
            sinks,
            state,
            refresh_rate: Duration::from_millis(config.polling.refresh_rate_ms),
            resume_delay: Duration::from_millis(config.polling.resume_delay_ms),
            history_length: config.backend.history_length,
            machine: HealthMachine::new(config.polling.max_errors),
            timer: None,
            resume: None,
            last_gas: None,
            last_weight: None,
            last_prediction: None,
            cancel,
            commands: rx,
        };
        (poller, PollerHandle { commands: tx })
    }

    /// Run the controller until the cancellation token is triggered
    pub async fn run(mut self) {
        self.publish_health().await;
        self.start();
        self.tick().await;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Polling controller cancelled");
                    break;
                }
                Some(command) = self.commands.recv() => match command {
                    PollerCommand::ManualRefresh => {
                        tracing::debug!("Manual refresh requested");
                        self.tick().await;
                    }
                    PollerCommand::SetOnline(online) => self.set_online(online).await,
                },
                _ = async { self.timer.as_mut().unwrap().tick().await }, if self.timer.is_some() => {
                    self.tick().await;
                }
                _ = async { self.resume.as_mut().unwrap().await }, if self.resume.is_some() => {
                    self.resume_fired().await;
                }
            }
        }
    }

    /// (Re-)arm the periodic timer. Idempotent: any previously armed timer
    /// is dropped first, so at most one timer is ever live.
    pub fn start(&mut self) {
        let mut timer = interval_at(Instant::now() + self.refresh_rate, self.refresh_rate);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
    }

    /// Cancel the periodic timer; safe to call when not running
    pub fn stop(&mut self) {
        self.timer = None;
    }

    /// One polling cycle: fetch all sources concurrently, apply results as
    /// each settles, then feed failures into the health machine
    pub async fn tick(&mut self) {
        if !self.machine.online {
            tracing::debug!("Skipping tick while offline");
            return;
        }

        let n = self.history_length;
        let (gas, weight, prediction) = tokio::join!(
            self.api.latest_gas(n),
            self.api.latest_weight(n),
            self.api.prediction(),
        );

        let mut failures = 0u32;

        match gas {
            Ok(readings) => {
                self.record_success().await;
                if self.last_gas.as_ref() != Some(&readings) {
                    for sink in &self.sinks {
                        sink.update_gas(&readings).await;
                    }
                    self.last_gas = Some(readings);
                }
            }
            Err(e) => {
                tracing::warn!("Gas fetch failed: {}", e);
                failures += 1;
            }
        }

        match weight {
            Ok(readings) => {
                self.record_success().await;
                if self.last_weight.as_ref() != Some(&readings) {
                    for sink in &self.sinks {
                        sink.update_weight(&readings).await;
                    }
                    self.last_weight = Some(readings);
                }
            }
            Err(e) => {
                tracing::warn!("Weight fetch failed: {}", e);
                failures += 1;
            }
        }

        match prediction {
            Ok(prediction) => {
                self.record_success().await;
                if self.last_prediction.as_ref() != Some(&prediction) {
                    for sink in &self.sinks {
                        sink.update_prediction(&prediction).await;
                    }
                    self.last_prediction = Some(prediction);
                }
            }
            Err(e) => {
                tracing::warn!("Prediction fetch failed: {}", e);
                failures += 1;
            }
        }

        for _ in 0..failures {
            self.record_failure().await;
        }

        self.publish_health().await;
    }

    async fn record_success(&mut self) {
        self.machine.record_success();
        self.state.write().await.health.last_success_epoch_ms = Some(current_epoch_ms());
    }

    async fn record_failure(&mut self) {
        match self.machine.record_failure() {
            FailureOutcome::Degraded { errors, max_errors } => {
                self.raise_toast(
                    ToastSeverity::Transient,
                    format!("Connection error ({}/{}). Retrying...", errors, max_errors),
                )
                .await;
            }
            FailureOutcome::Suspend => {
                tracing::warn!(
                    "Suspending polling after {} consecutive errors",
                    self.machine.max_errors
                );
                self.raise_toast(
                    ToastSeverity::Persistent,
                    "Multiple connection failures. Please check your network.".to_string(),
                )
                .await;
                self.stop();
                self.resume = Some(Box::pin(sleep(self.resume_delay)));
            }
            FailureOutcome::AlreadySuspended => {}
        }
    }

    async fn raise_toast(&self, severity: ToastSeverity, message: String) {
        let toast = Toast { severity, message };
        for sink in &self.sinks {
            sink.toast(toast.clone()).await;
        }
    }

    async fn set_online(&mut self, online: bool) {
        tracing::info!(
            "Connectivity changed: {}",
            if online { "online" } else { "offline" }
        );
        let refresh = self.machine.set_online(online);
        self.publish_health().await;
        if refresh {
            self.tick().await;
        }
    }

    async fn resume_fired(&mut self) {
        self.resume = None;
        if self.machine.resume() {
            tracing::info!("Resuming polling after suspension");
            self.start();
            self.publish_health().await;
        } else {
            tracing::debug!("Resume timer fired while offline, staying suspended");
        }
    }

    async fn publish_health(&self) {
        let mut state = self.state.write().await;
        state.health.health = self.machine.health;
        state.health.error_count = self.machine.error_count;
        state.health.online = self.machine.online;
    }
}
