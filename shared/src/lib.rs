//! Domain types and logic shared by the dashboard frontend and the native runner.
//!
//! Everything here is runtime-agnostic: HTTP goes through [`PredictionService`],
//! which the frontend implements over `gloo-net` and the backend over `reqwest`.

pub mod charts;
pub mod display;
pub mod endpoint;
pub mod error;
pub mod export;
pub mod features;
pub mod form;
pub mod harness;
pub mod prediction;
pub mod profiles;
pub mod scenario;
pub mod service;
pub mod stats;

pub use endpoint::Endpoint;
pub use error::{ApiError, HarnessError};
pub use features::FeatureLists;
pub use form::{FormController, FormError, FormState};
pub use harness::{BatchOptions, BatchOutcome, BatchProgress, TestHistory, TestRecord};
pub use prediction::{HealthStatus, PredictionResponse};
pub use scenario::{Scenario, ScenarioInput};
pub use service::{ApiConfig, CancelToken, PredictionService, ServiceState};
pub use stats::AggregateStatistics;
