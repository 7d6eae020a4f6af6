use std::time::Duration;

use gloo_console::error;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::features::FeatureLists;
use shared::prediction::{self, HealthStatus, PredictionResponse};
use shared::service::DEFAULT_API_URL;
use shared::{ApiConfig, ApiError, Endpoint, PredictionService, ScenarioInput};
use web_sys::AbortController;

/// Prediction service over `fetch`. Every request carries the same abort
/// signal, so [`HttpClient::abort`] drops whatever is still in flight.
#[derive(Clone)]
pub struct HttpClient {
    config: ApiConfig,
    abort: Option<AbortController>,
}

impl HttpClient {
    pub fn new(config: ApiConfig) -> Self {
        let abort = AbortController::new().ok();
        if abort.is_none() {
            log::warn!("AbortController unavailable; requests cannot be cancelled");
        }
        Self { config, abort }
    }

    pub fn abort(&self) {
        if let Some(controller) = &self.abort {
            controller.abort();
        }
    }

    fn aborted(&self) -> bool {
        self.abort.as_ref().is_some_and(|c| c.signal().aborted())
    }

    fn with_signal(&self, builder: RequestBuilder) -> RequestBuilder {
        let signal = self.abort.as_ref().map(|c| c.signal());
        builder.abort_signal(signal.as_ref())
    }

    fn transport_error(&self, e: gloo_net::Error) -> ApiError {
        if self.aborted() {
            ApiError::Aborted
        } else {
            ApiError::Connectivity(e.to_string())
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        if !response.ok() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(format!("{} answered {}: {}", response.url(), status, body));
            return Err(ApiError::service(status, prediction::error_message(&body)));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .with_signal(Request::get(&self.config.url(path)))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }
}

impl PredictionService for HttpClient {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get("/health").await
    }

    async fn features(&self) -> Result<FeatureLists, ApiError> {
        self.get("/features").await
    }

    async fn predict(&self, endpoint: Endpoint, input: &ScenarioInput) -> Result<PredictionResponse, ApiError> {
        let request = self
            .with_signal(Request::post(&self.config.url(endpoint.path())))
            .json(input)
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let body: serde_json::Value = self.read_json(response).await?;
        prediction::normalize(endpoint, body).inspect_err(|e| {
            error!(format!("unexpected {} response: {}", endpoint, e));
        })
    }

    async fn pause(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

/// Runtime configuration from the hosting server, or the build-time default
/// when the page is served some other way.
pub async fn load_config() -> ApiConfig {
    let fetched = match Request::get("/api/config").send().await {
        Ok(response) if response.ok() => response.json::<ApiConfig>().await.ok(),
        Ok(response) => {
            log::warn!("/api/config answered {}", response.status());
            None
        }
        Err(e) => {
            log::warn!("/api/config unavailable: {}", e);
            None
        }
    };
    fetched.unwrap_or_else(|| ApiConfig::new(option_env!("PARKINI_API_URL").unwrap_or(DEFAULT_API_URL)))
}
