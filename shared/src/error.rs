use thiserror::Error;

use crate::endpoint::Endpoint;

pub const CONNECTIVITY_MESSAGE: &str =
    "Impossible de se connecter à l'API. Veuillez vérifier que le serveur de prédiction est en cours d'exécution.";
pub const MODELS_NOT_LOADED_MESSAGE: &str = "API disponible mais les modèles ne sont pas chargés.";
pub const ALL_FAILED_MESSAGE: &str =
    "Tous les scénarios ont échoué. Vérifiez la console pour plus de détails.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The service could not be reached at all.
    #[error("Network error: {0}")]
    Connectivity(String),
    /// The service answered with a non-2xx status.
    #[error("Server error: {} - {}", status_text(.status), message_text(.message))]
    Service {
        status: Option<u16>,
        message: Option<String>,
    },
    #[error("Failed to parse response: {0}")]
    Malformed(String),
    #[error("Request aborted")]
    Aborted,
}

fn status_text(status: &Option<u16>) -> String {
    status.map_or_else(|| "unknown status".to_string(), |s| s.to_string())
}

fn message_text(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("no message")
}

impl ApiError {
    pub fn service(status: u16, message: Option<String>) -> Self {
        ApiError::Service {
            status: Some(status),
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Connectivity(_))
    }

    /// Text shown to the user for a failed call against `endpoint`.
    pub fn user_message(&self, endpoint: Endpoint) -> String {
        match self {
            ApiError::Service { message: Some(message), .. } => message.clone(),
            ApiError::Connectivity(_) => CONNECTIVITY_MESSAGE.to_string(),
            _ => endpoint.failure_message().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarnessError {
    #[error("no scenario to run")]
    Empty,
    #[error("all {attempted} scenarios failed")]
    AllFailed { attempted: usize },
    #[error("batch cancelled")]
    Cancelled,
}

impl HarnessError {
    pub fn user_message(&self) -> String {
        match self {
            HarnessError::AllFailed { .. } => ALL_FAILED_MESSAGE.to_string(),
            HarnessError::Empty => "Aucun scénario à exécuter.".to_string(),
            HarnessError::Cancelled => "Exécution interrompue.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_body_wins_over_fallback() {
        let err = ApiError::service(503, Some("Models not loaded".into()));
        assert_eq!(err.user_message(Endpoint::Duration), "Models not loaded");
    }

    #[test]
    fn blank_service_message_falls_back_to_endpoint_text() {
        let err = ApiError::service(500, Some("  ".into()));
        assert_eq!(err.user_message(Endpoint::Cluster), Endpoint::Cluster.failure_message());
    }

    #[test]
    fn service_error_text_has_no_debug_wrappers() {
        assert_eq!(ApiError::service(500, None).to_string(), "Server error: 500 - no message");
        assert_eq!(
            ApiError::service(503, Some("Models not loaded".into())).to_string(),
            "Server error: 503 - Models not loaded"
        );
        let unknown = ApiError::Service { status: None, message: None };
        assert_eq!(unknown.to_string(), "Server error: unknown status - no message");
    }

    #[test]
    fn connectivity_is_distinct_from_service_failure() {
        let down = ApiError::Connectivity("connection refused".into());
        assert!(down.is_connectivity());
        assert_eq!(down.user_message(Endpoint::Occupancy), CONNECTIVITY_MESSAGE);
        assert!(!ApiError::service(500, None).is_connectivity());
    }
}
