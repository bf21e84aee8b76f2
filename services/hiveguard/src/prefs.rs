//! Persisted user preferences
//!
//! One key survives restarts: the dashboard theme. It is read once at
//! startup and written on every toggle, stored as a small JSON file.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Dashboard color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Prefs {
    theme: Theme,
}

/// Load the saved theme, falling back to the default when the file is
/// missing or unreadable
pub fn load_theme(path: &Path) -> Theme {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<Prefs>(&content) {
            Ok(prefs) => prefs.theme,
            Err(e) => {
                tracing::warn!("Ignoring corrupt preferences file {:?}: {}", path, e);
                Theme::default()
            }
        },
        Err(_) => Theme::default(),
    }
}

/// Persist the theme choice
pub fn store_theme(path: &Path, theme: Theme) -> crate::Result<()> {
    let content = serde_json::to_string_pretty(&Prefs { theme })?;
    std::fs::write(path, content).map_err(|e| {
        crate::HiveGuardError::Prefs(format!("Failed to write preferences {:?}: {}", path, e))
    })
}
