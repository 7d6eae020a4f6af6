use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::profiles::CLUSTER_PROFILES;

/// Canonical, endpoint-specific prediction. Built once by [`normalize`] right
/// after the HTTP call; nothing downstream inspects raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PredictionResponse {
    Duration {
        hours: f64,
    },
    Occupancy {
        occupied: bool,
        probability_occupied: f64,
        probability_free: f64,
    },
    Cluster {
        cluster: usize,
        profile: String,
        confidence: f64,
    },
}

impl PredictionResponse {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            PredictionResponse::Duration { .. } => Endpoint::Duration,
            PredictionResponse::Occupancy { .. } => Endpoint::Occupancy,
            PredictionResponse::Cluster { .. } => Endpoint::Cluster,
        }
    }

    /// Probability of the predicted class, or the cluster confidence.
    pub fn confidence(&self) -> Option<f64> {
        match self {
            PredictionResponse::Duration { .. } => None,
            PredictionResponse::Occupancy { occupied, probability_occupied, probability_free } => {
                Some(if *occupied { *probability_occupied } else { *probability_free })
            }
            PredictionResponse::Cluster { confidence, .. } => Some(*confidence),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DurationWire {
    duration_prediction: Option<f64>,
    prediction: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbabilityWire {
    occupied: f64,
    not_occupied: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OccupancyWire {
    occupancy_prediction: Option<u8>,
    prediction: Option<u8>,
    probability: Option<ProbabilityWire>,
    occupancy_probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ClusterWire {
    cluster: usize,
    profile: Option<String>,
    confidence: f64,
}

fn unit_interval(name: &str, value: f64) -> Result<f64, ApiError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::Malformed(format!("{} out of [0, 1]: {}", name, value)))
    }
}

/// Maps a raw success body onto the canonical shape for `endpoint`.
///
/// Upstream deployments disagree on key names, and some bodies carry several
/// spellings at once. `duration_prediction` wins over `prediction` for
/// duration, `occupancy_prediction` wins over `prediction` for occupancy, and
/// a nested `probability` object wins over a flat `occupancy_probability`.
pub fn normalize(endpoint: Endpoint, body: Value) -> Result<PredictionResponse, ApiError> {
    let malformed = |e: serde_json::Error| ApiError::Malformed(e.to_string());
    match endpoint {
        Endpoint::Duration => {
            let wire: DurationWire = serde_json::from_value(body).map_err(malformed)?;
            let hours = wire
                .duration_prediction
                .or(wire.prediction)
                .ok_or_else(|| ApiError::Malformed("missing duration prediction".into()))?;
            if !hours.is_finite() || hours < 0.0 {
                return Err(ApiError::Malformed(format!("invalid duration: {}", hours)));
            }
            Ok(PredictionResponse::Duration { hours })
        }
        Endpoint::Occupancy => {
            let wire: OccupancyWire = serde_json::from_value(body).map_err(malformed)?;
            let (occupied, free) = match (wire.probability, wire.occupancy_probability) {
                (Some(p), _) => (p.occupied, p.not_occupied.unwrap_or(1.0 - p.occupied)),
                (None, Some(occupied)) => (occupied, 1.0 - occupied),
                (None, None) => return Err(ApiError::Malformed("missing occupancy probability".into())),
            };
            let class = wire
                .occupancy_prediction
                .or(wire.prediction)
                .ok_or_else(|| ApiError::Malformed("missing occupancy prediction".into()))?;
            if class > 1 {
                return Err(ApiError::Malformed(format!("invalid occupancy class: {}", class)));
            }
            Ok(PredictionResponse::Occupancy {
                occupied: class == 1,
                probability_occupied: unit_interval("probability.occupied", occupied)?,
                probability_free: unit_interval("probability.not_occupied", free)?,
            })
        }
        Endpoint::Cluster => {
            let wire: ClusterWire = serde_json::from_value(body).map_err(malformed)?;
            let known = CLUSTER_PROFILES
                .get(wire.cluster)
                .ok_or_else(|| ApiError::Malformed(format!("unknown cluster: {}", wire.cluster)))?;
            Ok(PredictionResponse::Cluster {
                cluster: wire.cluster,
                profile: wire.profile.unwrap_or_else(|| known.name.to_string()),
                confidence: unit_interval("confidence", wire.confidence)?,
            })
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Optional body of a non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

/// Pulls `error` out of a failure body, if the body is JSON and has one.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body).ok().and_then(|b| b.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duration_accepts_both_key_names() {
        let current = normalize(Endpoint::Duration, json!({ "duration_prediction": 5.5 })).unwrap();
        let legacy = normalize(Endpoint::Duration, json!({ "prediction": 5.5, "unit": "hours" })).unwrap();
        assert_eq!(current, PredictionResponse::Duration { hours: 5.5 });
        assert_eq!(current, legacy);
    }

    #[test]
    fn duration_body_with_both_spellings_prefers_duration_prediction() {
        let body = json!({ "duration_prediction": 2.5, "prediction": 3.0, "unit": "hours" });
        assert_eq!(normalize(Endpoint::Duration, body).unwrap(), PredictionResponse::Duration { hours: 2.5 });
        let err = normalize(Endpoint::Duration, json!({ "unit": "hours" })).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn occupancy_body_with_both_spellings_prefers_occupancy_prediction() {
        let body = json!({ "prediction": 0, "occupancy_prediction": 1, "occupancy_probability": 0.8 });
        let response = normalize(Endpoint::Occupancy, body).unwrap();
        assert_eq!(
            response,
            PredictionResponse::Occupancy { occupied: true, probability_occupied: 0.8, probability_free: 1.0 - 0.8 }
        );
        assert!(normalize(Endpoint::Occupancy, json!({ "occupancy_probability": 0.8 })).is_err());
    }

    #[test]
    fn negative_duration_is_malformed() {
        let err = normalize(Endpoint::Duration, json!({ "duration_prediction": -1.0 })).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn occupancy_nested_probability() {
        let body = json!({ "prediction": 1, "probability": { "occupied": 0.82, "not_occupied": 0.18 }, "label": "Occupied" });
        let response = normalize(Endpoint::Occupancy, body).unwrap();
        assert_eq!(
            response,
            PredictionResponse::Occupancy { occupied: true, probability_occupied: 0.82, probability_free: 0.18 }
        );
        assert_eq!(response.confidence(), Some(0.82));
    }

    #[test]
    fn occupancy_flat_legacy_shape() {
        let body = json!({ "occupancy_prediction": 0, "occupancy_probability": 0.25 });
        let response = normalize(Endpoint::Occupancy, body).unwrap();
        assert_eq!(
            response,
            PredictionResponse::Occupancy { occupied: false, probability_occupied: 0.25, probability_free: 0.75 }
        );
        assert_eq!(response.confidence(), Some(0.75));
    }

    #[test]
    fn occupancy_without_probability_is_rejected() {
        assert!(normalize(Endpoint::Occupancy, json!({ "prediction": 1 })).is_err());
        assert!(normalize(Endpoint::Occupancy, json!({ "prediction": 3, "occupancy_probability": 0.5 })).is_err());
    }

    #[test]
    fn cluster_checks_index_and_confidence() {
        let ok = normalize(Endpoint::Cluster, json!({ "cluster": 2, "profile": "Habitués fidèles", "confidence": 0.67 }));
        assert_eq!(ok.unwrap().confidence(), Some(0.67));
        assert!(normalize(Endpoint::Cluster, json!({ "cluster": 4, "confidence": 0.5 })).is_err());
        assert!(normalize(Endpoint::Cluster, json!({ "cluster": 1, "confidence": 1.5 })).is_err());
    }

    #[test]
    fn cluster_profile_defaults_to_table_name() {
        let response = normalize(Endpoint::Cluster, json!({ "cluster": 0, "confidence": 0.4 })).unwrap();
        let PredictionResponse::Cluster { profile, .. } = response else { panic!("not a cluster") };
        assert_eq!(profile, CLUSTER_PROFILES[0].name);
    }

    #[test]
    fn error_body_extraction() {
        assert_eq!(error_message(r#"{"error":"Missing feature: Hour"}"#).as_deref(), Some("Missing feature: Hour"));
        assert_eq!(error_message("<html>502</html>"), None);
    }
}
