//! Pure classification of readings into status bands
//!
//! Thresholds are fixed and boundary inclusion is deliberate: moving a value
//! across any boundary here changes what the dashboard shows, so the tests
//! below pin the exact boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Band for a gas concentration reading (ppm)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasBand {
    Normal,
    Elevated,
    High,
}

impl GasBand {
    /// CSS class the dashboard attaches to the value element
    pub fn css_class(&self) -> &'static str {
        match self {
            GasBand::Normal => "status-ok",
            GasBand::Elevated => "status-warning",
            GasBand::High => "status-alert",
        }
    }
}

impl fmt::Display for GasBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GasBand::Normal => write!(f, "Normal"),
            GasBand::Elevated => write!(f, "Elevated"),
            GasBand::High => write!(f, "High"),
        }
    }
}

/// Band for a hive weight reading (grams)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightBand {
    Quiet,
    SemiAlert,
    Alert,
}

impl WeightBand {
    /// Alert text shown under the weight card, if any
    pub fn message(&self) -> Option<&'static str> {
        match self {
            WeightBand::Quiet => None,
            WeightBand::SemiAlert => {
                Some("The weight of the beehive crossed semi-threshold. Once check the beehive.")
            }
            WeightBand::Alert => Some("The weight crossed full threshold! Check for honey."),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            WeightBand::Quiet => "",
            WeightBand::SemiAlert => "semi-alert",
            WeightBand::Alert => "alert",
        }
    }
}

/// Urgency band for prediction figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Ok,
    Warning,
    Alert,
}

impl Urgency {
    pub fn css_class(&self) -> &'static str {
        match self {
            Urgency::Ok => "status-ok",
            Urgency::Warning => "status-warning",
            Urgency::Alert => "status-alert",
        }
    }
}

/// Classify a gas concentration: `< 400` Normal, `400..=999` Elevated, `>= 1000` High
pub fn gas_band(value: i64) -> GasBand {
    if value < 400 {
        GasBand::Normal
    } else if value < 1000 {
        GasBand::Elevated
    } else {
        GasBand::High
    }
}

/// Classify a hive weight: `<= 200` quiet, `200 < w <= 500` semi-alert, `> 500` alert
pub fn weight_band(weight: f64) -> WeightBand {
    if weight <= 200.0 {
        WeightBand::Quiet
    } else if weight <= 500.0 {
        WeightBand::SemiAlert
    } else {
        WeightBand::Alert
    }
}

/// Classify a predicted leak ETA in hours: `< 3` alert, `3..<12` warning, `>= 12` ok
pub fn eta_urgency(eta_hours: f64) -> Urgency {
    if eta_hours < 3.0 {
        Urgency::Alert
    } else if eta_hours < 12.0 {
        Urgency::Warning
    } else {
        Urgency::Ok
    }
}

/// Classify a predicted gas value: `> 1000` alert, `800..=1000` warning, `< 800` ok
pub fn value_urgency(expected_value: f64) -> Urgency {
    if expected_value > 1000.0 {
        Urgency::Alert
    } else if expected_value >= 800.0 {
        Urgency::Warning
    } else {
        Urgency::Ok
    }
}
