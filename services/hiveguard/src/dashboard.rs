//! Local web dashboard with JSON API endpoints

use std::path::PathBuf;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::poller::PollerHandle;
use crate::prefs::{self, Theme};
use crate::state::StateHandle;
use crate::status;

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
    pub poller: PollerHandle,
    pub prefs_path: PathBuf,
}

/// Build the dashboard axum router
pub fn build_router(state: StateHandle, poller: PollerHandle, prefs_path: PathBuf) -> Router {
    let dashboard_state = DashboardState {
        state,
        poller,
        prefs_path,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/status", get(status_handler))
        .route("/api/gas", get(gas_handler))
        .route("/api/weight", get(weight_handler))
        .route("/api/prediction", get(prediction_handler))
        .route("/api/toasts", get(toasts_handler))
        .route("/api/theme", get(theme_handler).put(set_theme_handler))
        .route("/api/refresh", post(refresh_handler))
        .route("/api/connectivity", put(connectivity_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(dashboard_state)
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;

    let gas_rows: String = state
        .gas
        .iter()
        .map(|r| {
            let band = status::gas_band(r.value);
            format!(
                r#"<tr><td>{}</td><td class="{}">{}</td><td>{}</td><td>{}</td></tr>"#,
                r.id,
                band.css_class(),
                r.value,
                band,
                r.timestamp
            )
        })
        .collect();

    let weight_row = state
        .weight
        .first()
        .map(|r| {
            let band = status::weight_band(r.weight);
            format!(
                r#"<p class="{}">{} g at {} {}</p>"#,
                band.css_class(),
                r.weight,
                r.timestamp,
                band.message().unwrap_or("")
            )
        })
        .unwrap_or_else(|| "<p>No weight data yet.</p>".to_string());

    let prediction_row = match &state.prediction {
        Some(p) => {
            let eta = match p.eta_hours {
                Some(h) => format!(
                    r#"<span class="{}">{:.1} hours</span>"#,
                    status::eta_urgency(h).css_class(),
                    h
                ),
                None => "&mdash;".to_string(),
            };
            let value = match p.expected_value {
                Some(v) => format!(
                    r#"<span class="{}">{:.0} ppm</span>"#,
                    status::value_urgency(v).css_class(),
                    v
                ),
                None => "&mdash;".to_string(),
            };
            format!("<p>Leak ETA: {} &middot; Expected level: {}</p>", eta, value)
        }
        None => "<p>Prediction unavailable.</p>".to_string(),
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>HiveGuard</title>
    <style>
        body {{ font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem; }}
        body.dark {{ background: #1c1c1e; color: #f2f2f7; }}
        table {{ width: 100%; border-collapse: collapse; }}
        td, th {{ padding: 0.5rem; border-bottom: 1px solid #dee2e6; text-align: left; }}
        .status-ok {{ color: #155724; }}
        .status-warning {{ color: #856404; }}
        .status-alert {{ color: #721c24; font-weight: 600; }}
        .semi-alert {{ color: #856404; }}
        .alert {{ color: #721c24; font-weight: 600; }}
    </style>
    <script>
        async function refreshData() {{
            const status = await (await fetch('/api/status')).json();
            document.getElementById('connection').textContent =
                status.online ? status.health : 'Offline';
        }}
        async function toggleTheme() {{
            const current = (await (await fetch('/api/theme')).json()).theme;
            const next = current === 'dark' ? 'light' : 'dark';
            await fetch('/api/theme', {{
                method: 'PUT',
                headers: {{'Content-Type': 'application/json'}},
                body: JSON.stringify({{theme: next}})
            }});
            document.body.classList.toggle('dark', next === 'dark');
        }}
        function manualRefresh() {{
            fetch('/api/refresh', {{method: 'POST'}}).then(() => location.reload());
        }}
        setInterval(refreshData, 5000);
    </script>
</head>
<body class="{theme_class}">
    <h1>HiveGuard</h1>
    <p>Connection: <span id="connection">{health}</span> &middot; errors {errors}
       <button onclick="manualRefresh()">Refresh</button>
       <button onclick="toggleTheme()">Theme</button></p>
    <section>
        <h2>Hive weight</h2>
        {weight_row}
    </section>
    <section>
        <h2>Leak prediction</h2>
        {prediction_row}
    </section>
    <section>
        <h2>Gas readings</h2>
        <table>
            <thead><tr><th>ID</th><th>Value (ppm)</th><th>Status</th><th>Timestamp</th></tr></thead>
            <tbody>{gas_rows}</tbody>
        </table>
    </section>
</body>
</html>"#,
        theme_class = if state.theme == Theme::Dark { "dark" } else { "" },
        health = state.health.health,
        errors = state.health.error_count,
        weight_row = weight_row,
        prediction_row = prediction_row,
        gas_rows = gas_rows,
    );

    Html(html)
}

async fn status_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;

    Json(serde_json::json!({
        "health": format!("{}", state.health.health),
        "error_count": state.health.error_count,
        "online": state.health.online,
        "last_success_epoch_ms": state.health.last_success_epoch_ms,
        "theme": state.theme,
    }))
}

async fn gas_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;

    let readings: Vec<serde_json::Value> = state
        .gas
        .iter()
        .map(|r| {
            let band = status::gas_band(r.value);
            serde_json::json!({
                "id": r.id,
                "value": r.value,
                "timestamp": r.timestamp,
                "band": format!("{}", band),
                "css_class": band.css_class(),
            })
        })
        .collect();

    Json(readings)
}

async fn weight_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;

    let readings: Vec<serde_json::Value> = state
        .weight
        .iter()
        .map(|r| {
            let band = status::weight_band(r.weight);
            serde_json::json!({
                "weight": r.weight,
                "timestamp": r.timestamp,
                "band": band,
                "message": band.message(),
            })
        })
        .collect();

    Json(readings)
}

async fn prediction_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;

    let body = match &state.prediction {
        Some(p) => serde_json::json!({
            "eta_hours": p.eta_hours,
            "expected_value": p.expected_value,
            "eta_urgency": p.eta_hours.map(status::eta_urgency),
            "value_urgency": p.expected_value.map(status::value_urgency),
        }),
        None => serde_json::json!({
            "eta_hours": null,
            "expected_value": null,
            "eta_urgency": null,
            "value_urgency": null,
        }),
    };

    Json(body)
}

async fn toasts_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    let toasts: Vec<_> = state.toasts.iter().cloned().collect();
    Json(toasts)
}

async fn theme_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    Json(serde_json::json!({ "theme": state.theme }))
}

#[derive(Debug, Deserialize)]
struct ThemeBody {
    theme: Theme,
}

async fn set_theme_handler(
    State(dashboard): State<DashboardState>,
    Json(body): Json<ThemeBody>,
) -> impl IntoResponse {
    if let Err(e) = prefs::store_theme(&dashboard.prefs_path, body.theme) {
        tracing::warn!("Failed to persist theme: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }
    dashboard.state.write().await.theme = body.theme;
    Json(serde_json::json!({ "theme": body.theme })).into_response()
}

async fn refresh_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    if dashboard.poller.manual_refresh().await {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[derive(Debug, Deserialize)]
struct ConnectivityBody {
    online: bool,
}

async fn connectivity_handler(
    State(dashboard): State<DashboardState>,
    Json(body): Json<ConnectivityBody>,
) -> impl IntoResponse {
    if dashboard.poller.set_online(body.online).await {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use crate::api::BackendClient;
    use crate::config::Config;
    use crate::io::MockHttpClient;
    use crate::poller::Poller;
    use crate::reading::{GasReading, Prediction, WeightReading};
    use crate::state::{new_state_handle, StateHandle};

    /// Build a router plus a live (but not running) poller so the command
    /// channel stays open
    fn setup(prefs_path: PathBuf) -> (Router, StateHandle, Poller) {
        let state = new_state_handle(10, Theme::Light);
        let api = Arc::new(BackendClient::new(
            "http://localhost:5000",
            Arc::new(MockHttpClient::new()),
        ));
        let (poller, handle) = Poller::new(
            api,
            vec![],
            &Config::default(),
            state.clone(),
            CancellationToken::new(),
        );
        let router = build_router(state.clone(), handle, prefs_path);
        (router, state, poller)
    }

    fn tmp_prefs() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        (dir, path)
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (dir, path) = tmp_prefs();
        let (app, _state, _poller) = setup(path);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        drop(dir);
    }

    #[tokio::test]
    async fn status_returns_health_json() {
        let (_dir, path) = tmp_prefs();
        let (app, _state, _poller) = setup(path);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["health"], "Healthy");
        assert_eq!(json["error_count"], 0);
        assert_eq!(json["online"], true);
        assert_eq!(json["theme"], "light");
    }

    #[tokio::test]
    async fn gas_returns_classified_readings() {
        let (_dir, path) = tmp_prefs();
        let (app, state, _poller) = setup(path);
        state.write().await.gas = vec![GasReading {
            id: 1,
            value: 1050,
            timestamp: "2025-06-01T12:00:00".to_string(),
        }];

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/gas")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(json[0]["band"], "High");
        assert_eq!(json[0]["css_class"], "status-alert");
    }

    #[tokio::test]
    async fn weight_returns_band_message() {
        let (_dir, path) = tmp_prefs();
        let (app, state, _poller) = setup(path);
        state.write().await.weight = vec![WeightReading {
            weight: 250.0,
            timestamp: "2025-06-01T12:00:00".to_string(),
        }];

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/weight")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(json[0]["band"], "semi_alert");
        assert!(json[0]["message"]
            .as_str()
            .unwrap()
            .contains("semi-threshold"));
    }

    #[tokio::test]
    async fn prediction_returns_urgencies() {
        let (_dir, path) = tmp_prefs();
        let (app, state, _poller) = setup(path);
        state.write().await.prediction = Some(Prediction {
            eta_hours: Some(2.4),
            expected_value: Some(1100.0),
        });

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/prediction")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["eta_urgency"], "alert");
        assert_eq!(json["value_urgency"], "alert");
    }

    #[tokio::test]
    async fn prediction_unavailable_returns_nulls() {
        let (_dir, path) = tmp_prefs();
        let (app, _state, _poller) = setup(path);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/prediction")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["eta_hours"].is_null());
        assert!(json["eta_urgency"].is_null());
    }

    #[tokio::test]
    async fn put_theme_persists_and_updates_state() {
        let (_dir, path) = tmp_prefs();
        let (app, state, _poller) = setup(path.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/theme")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"theme": "dark"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(state.read().await.theme, Theme::Dark);
        assert_eq!(prefs::load_theme(&path), Theme::Dark);
    }

    #[tokio::test]
    async fn post_refresh_is_accepted() {
        let (_dir, path) = tmp_prefs();
        let (app, _state, _poller) = setup(path);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn index_returns_html() {
        let (_dir, path) = tmp_prefs();
        let (app, state, _poller) = setup(path);
        state.write().await.gas = vec![GasReading {
            id: 1,
            value: 380,
            timestamp: "2025-06-01T12:00:00".to_string(),
        }];

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("HiveGuard"));
        assert!(html.contains("Normal"));
    }
}
