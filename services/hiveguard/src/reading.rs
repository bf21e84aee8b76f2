//! Wire types for the beehive backend API
//!
//! These types mirror the backend JSON response structures. Arrays arrive
//! newest-first. `PartialEq` is derived so the poller can detect per-source
//! changes by structural equality instead of comparing serialized payloads.

use serde::{Deserialize, Serialize};

/// One gas sensor sample as returned by `/api/gas/last/{n}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasReading {
    pub id: i64,
    pub value: i64,
    pub timestamp: String,
}

/// One hive scale sample as returned by `/api/weight/last/{n}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightReading {
    pub weight: f64,
    pub timestamp: String,
}

/// Leak prediction as returned by `/api/gas/predict`
///
/// `None` in either field means no prediction is available yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub eta_hours: Option<f64>,
    pub expected_value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_reading_parses_backend_shape() {
        let json = r#"{"id": 42, "value": 650, "timestamp": "2025-06-01T12:00:00"}"#;
        let reading: GasReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.id, 42);
        assert_eq!(reading.value, 650);
        assert_eq!(reading.timestamp, "2025-06-01T12:00:00");
    }

    #[test]
    fn weight_reading_ignores_extra_fields() {
        // The backend also sends an id column for weight rows
        let json = r#"{"id": 7, "weight": 312.5, "timestamp": "2025-06-01T12:00:00"}"#;
        let reading: WeightReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.weight, 312.5);
    }

    #[test]
    fn prediction_parses_nulls() {
        let json = r#"{"eta_hours": null, "expected_value": null}"#;
        let prediction: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(prediction.eta_hours, None);
        assert_eq!(prediction.expected_value, None);
    }

    #[test]
    fn structural_equality_detects_changes() {
        let a = GasReading {
            id: 1,
            value: 500,
            timestamp: "t".to_string(),
        };
        let mut b = a.clone();
        assert_eq!(a, b);
        b.value = 501;
        assert_ne!(a, b);
    }
}
