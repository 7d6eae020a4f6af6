use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::error::{ApiError, CONNECTIVITY_MESSAGE, MODELS_NOT_LOADED_MESSAGE};
use crate::features::FeatureLists;
use crate::prediction::{HealthStatus, PredictionResponse};
use crate::scenario::ScenarioInput;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_BATCH_DELAY_MS: u64 = 500;
pub const DEFAULT_RANDOM_BATCH_SIZE: usize = 5;
/// Random batches wait a little less between requests than the fixed catalogs.
pub const RANDOM_BATCH_DELAY_MS: u64 = 300;

/// Startup configuration handed to the API client and the dashboard root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,
    #[serde(default = "default_random_batch_size")]
    pub random_batch_size: usize,
}

fn default_batch_delay() -> u64 {
    DEFAULT_BATCH_DELAY_MS
}

fn default_random_batch_size() -> usize {
    DEFAULT_RANDOM_BATCH_SIZE
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            random_batch_size: DEFAULT_RANDOM_BATCH_SIZE,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

/// HTTP contract of the remote prediction service.
///
/// `predict` returns the already-normalized response. `pause` is the runtime's
/// timer, used between batch requests.
#[allow(async_fn_in_trait)]
pub trait PredictionService {
    async fn health(&self) -> Result<HealthStatus, ApiError>;
    async fn features(&self) -> Result<FeatureLists, ApiError>;
    async fn predict(&self, endpoint: Endpoint, input: &ScenarioInput) -> Result<PredictionResponse, ApiError>;
    async fn pause(&self, duration: Duration);
}

/// Set once the owning view or command goes away; long-running work checks it
/// before touching shared state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceState {
    Checking,
    Connected(FeatureLists),
    /// Reachable, but the models are not usable.
    Degraded(String),
    Disconnected(String),
}

impl ServiceState {
    pub fn features(&self) -> Option<&FeatureLists> {
        match self {
            ServiceState::Connected(features) => Some(features),
            _ => None,
        }
    }

    pub fn banner(&self) -> Option<&str> {
        match self {
            ServiceState::Degraded(message) | ServiceState::Disconnected(message) => Some(message),
            _ => None,
        }
    }
}

/// Health check followed by the feature lists. `/features` is only requested
/// once `/health` reports `"ok"`.
pub async fn bootstrap<S: PredictionService>(service: &S) -> ServiceState {
    match service.health().await {
        Ok(health) if health.is_ok() => {}
        Ok(health) => {
            log::warn!("prediction service degraded: {:?}", health);
            return ServiceState::Degraded(MODELS_NOT_LOADED_MESSAGE.to_string());
        }
        Err(ApiError::Service { message, .. }) => {
            log::warn!("health check rejected: {:?}", message);
            return ServiceState::Degraded(message.unwrap_or_else(|| MODELS_NOT_LOADED_MESSAGE.to_string()));
        }
        Err(ApiError::Malformed(reason)) => {
            log::warn!("health check answered an unexpected body: {}", reason);
            return ServiceState::Degraded(MODELS_NOT_LOADED_MESSAGE.to_string());
        }
        Err(e) => {
            log::error!("health check failed: {}", e);
            return ServiceState::Disconnected(CONNECTIVITY_MESSAGE.to_string());
        }
    }

    match service.features().await {
        Ok(features) => {
            log::info!(
                "service ready: {} regression / {} classification features",
                features.regression_features.len(),
                features.classification_features.len()
            );
            ServiceState::Connected(features)
        }
        Err(ApiError::Service { message, .. }) => {
            ServiceState::Degraded(message.unwrap_or_else(|| MODELS_NOT_LOADED_MESSAGE.to_string()))
        }
        Err(e) if e.is_connectivity() => ServiceState::Disconnected(CONNECTIVITY_MESSAGE.to_string()),
        Err(e) => {
            log::error!("feature lists unusable: {}", e);
            ServiceState::Degraded(MODELS_NOT_LOADED_MESSAGE.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_join_does_not_double_slashes() {
        let config = ApiConfig::new("http://api.local:5000/");
        assert_eq!(config.url("/health"), "http://api.local:5000/health");
        assert_eq!(config.url("predict/duration"), "http://api.local:5000/predict/duration");
    }

    #[test]
    fn config_json_fills_defaults() {
        let config: ApiConfig = serde_json::from_str(r#"{"base_url":"http://x"}"#).unwrap();
        assert_eq!(config.batch_delay_ms, DEFAULT_BATCH_DELAY_MS);
        assert_eq!(config.random_batch_size, DEFAULT_RANDOM_BATCH_SIZE);
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let view = token.clone();
        assert!(!view.is_cancelled());
        token.cancel();
        assert!(view.is_cancelled());
    }
}
