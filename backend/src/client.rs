use std::time::Duration;

use log::error;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::features::FeatureLists;
use shared::prediction::{self, HealthStatus, PredictionResponse};
use shared::{ApiConfig, ApiError, Endpoint, PredictionService, ScenarioInput};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Prediction service over `reqwest`, used by the `check` and `batch` commands.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            error!("{} answered {}: {}", url, status, body);
            return Err(ApiError::service(status.as_u16(), prediction::error_message(&body)));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.config.url(path))
            .send()
            .await
            .map_err(transport_error)?;
        self.read_json(response).await
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    ApiError::Connectivity(e.to_string())
}

impl PredictionService for ApiClient {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get("/health").await
    }

    async fn features(&self) -> Result<FeatureLists, ApiError> {
        self.get("/features").await
    }

    async fn predict(&self, endpoint: Endpoint, input: &ScenarioInput) -> Result<PredictionResponse, ApiError> {
        let response = self
            .client
            .post(self.config.url(endpoint.path()))
            .json(input)
            .send()
            .await
            .map_err(transport_error)?;
        let body: serde_json::Value = self.read_json(response).await?;
        prediction::normalize(endpoint, body).inspect_err(|e| error!("unexpected {} response: {}", endpoint, e))
    }

    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
