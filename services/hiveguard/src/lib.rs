//! HiveGuard - beehive monitoring console
//!
//! Polls the beehive backend API for gas, weight, and leak-prediction data,
//! classifies readings into status bands, raises alert toasts, and serves a
//! local web dashboard.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod poller;
pub mod prefs;
pub mod reading;
pub mod sink;
pub mod state;
pub mod status;

pub use config::{load_config, Config};
pub use error::{HiveGuardError, Result};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::BackendClient;
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::poller::Poller;
use crate::sink::{PresentationSink, SharedStateSink};

/// Run the hiveguard service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::default());
    let cancel = CancellationToken::new();

    let api = Arc::new(BackendClient::new(&config.backend.base_url, http));

    // Shared state, seeded with the persisted theme
    let theme = prefs::load_theme(&config.prefs_path);
    let state = state::new_state_handle(config.dashboard.toast_history_size, theme);

    let sinks: Vec<Arc<dyn PresentationSink>> =
        vec![Arc::new(SharedStateSink::new(state.clone()))];

    let (poller, poller_handle) = Poller::new(api, sinks, &config, state.clone(), cancel.clone());

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    // Start dashboard if enabled
    if config.dashboard.enabled {
        let dashboard_port = config.dashboard.port;
        let dashboard_state = state.clone();
        let dashboard_poller = poller_handle.clone();
        let prefs_path = config.prefs_path.clone();
        let cancel_for_dashboard = cancel.clone();

        tokio::spawn(async move {
            let router = dashboard::build_router(dashboard_state, dashboard_poller, prefs_path);
            let addr = SocketAddr::from(([0, 0, 0, 0], dashboard_port));
            tracing::info!("Dashboard listening on http://{}", addr);

            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(
                        "Failed to bind dashboard to port {}: {}. Continuing without dashboard.",
                        dashboard_port,
                        e
                    );
                    return;
                }
            };

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel_for_dashboard.cancelled().await;
                })
                .await
                .ok();

            tracing::debug!("Dashboard stopped");
        });
    }

    tracing::info!(
        "Polling {} every {}ms",
        config.backend.base_url,
        config.polling.refresh_rate_ms
    );

    // Run the polling controller (blocks until cancelled)
    poller.run().await;

    tracing::info!("HiveGuard stopped");
    Ok(())
}
