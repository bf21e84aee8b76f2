//! Error types for the hiveguard service

/// Errors that can occur in the hiveguard service
#[derive(Debug, thiserror::Error)]
pub enum HiveGuardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend API error: {0}")]
    Api(String),

    #[error("Preferences error: {0}")]
    Prefs(String),

    #[error("Dashboard error: {0}")]
    Dashboard(String),
}

/// Result type alias for hiveguard operations
pub type Result<T> = std::result::Result<T, HiveGuardError>;
