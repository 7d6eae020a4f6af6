use std::collections::BTreeMap;

use thiserror::Error;

use crate::endpoint::Endpoint;
use crate::features::{
    self, CLUSTER_FEATURES, ENTRY_TIME_MINUTES, EXIT_TIME_MINUTES, IS_WEEKEND, MINUTES_PER_DAY, WEEKDAY,
};
use crate::prediction::PredictionResponse;
use crate::scenario::ScenarioInput;
use crate::service::PredictionService;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

/// Values that other fields imply. Called after every raw field update so the
/// coupling rules live in one place:
///
/// * `Weekday` sets `Is_Weekend` (Saturday/Sunday are 5 and 6) when it is required;
/// * moving the entry time past the exit pushes the exit one hour later (capped at midnight);
/// * moving the exit time before the entry pulls the entry one hour earlier.
pub fn derive_fields<S: AsRef<str>>(input: &mut ScenarioInput, changed: &str, required: &[S]) {
    let requires = |key: &str| required.iter().any(|k| k.as_ref() == key);
    match changed {
        WEEKDAY if requires(IS_WEEKEND) => {
            if let Some(weekday) = input.get(WEEKDAY) {
                let weekend = weekday == 5.0 || weekday == 6.0;
                input.set(IS_WEEKEND, if weekend { 1.0 } else { 0.0 });
            }
        }
        ENTRY_TIME_MINUTES => {
            if let (Some(entry), Some(exit)) = (input.get(ENTRY_TIME_MINUTES), input.get(EXIT_TIME_MINUTES)) {
                if entry >= exit {
                    input.set(EXIT_TIME_MINUTES, (entry + 60.0).min(MINUTES_PER_DAY));
                }
            }
        }
        EXIT_TIME_MINUTES => {
            if let (Some(entry), Some(exit)) = (input.get(ENTRY_TIME_MINUTES), input.get(EXIT_TIME_MINUTES)) {
                if exit <= entry {
                    input.set(ENTRY_TIME_MINUTES, (exit - 60.0).max(0.0));
                }
            }
        }
        _ => {}
    }
}

/// Editable values of one prediction form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    endpoint: Endpoint,
    required: Vec<String>,
    values: BTreeMap<String, Option<f64>>,
}

impl FormState {
    /// One entry per required key, seeded with the catalog default or left empty.
    pub fn seeded(endpoint: Endpoint, required: Vec<String>) -> Self {
        let values = required
            .iter()
            .map(|key| (key.clone(), features::spec_for(endpoint, key).map(|spec| spec.default)))
            .collect();
        Self { endpoint, required, values }
    }

    pub fn cluster() -> Self {
        Self::seeded(
            Endpoint::Cluster,
            CLUSTER_FEATURES.iter().map(|k| k.to_string()).collect(),
        )
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied().flatten()
    }

    pub fn set_field(&mut self, name: &str, value: Option<f64>) {
        self.values.insert(name.to_string(), value.filter(|v| v.is_finite()));

        let mut filled = self.filled();
        derive_fields(&mut filled, name, &self.required);
        for (key, value) in filled.iter() {
            if self.value(key) != Some(value) {
                self.values.insert(key.to_string(), Some(value));
            }
        }
    }

    /// Text input; anything that is not a number leaves the field empty.
    pub fn set_field_text(&mut self, name: &str, raw: &str) {
        self.set_field(name, raw.trim().parse::<f64>().ok());
    }

    pub fn is_complete(&self) -> bool {
        !self.required.is_empty() && self.missing().is_empty()
    }

    pub fn can_submit(&self, loading: bool) -> bool {
        !loading && self.is_complete()
    }

    pub fn missing(&self) -> Vec<String> {
        self.filled().missing(&self.required)
    }

    pub fn to_input(&self) -> Result<ScenarioInput, FormError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }
        Ok(self
            .required
            .iter()
            .filter_map(|key| self.value(key).map(|v| (key.clone(), v)))
            .collect())
    }

    pub fn load(&mut self, input: &ScenarioInput) {
        for (key, value) in input.iter() {
            if self.values.contains_key(key) {
                self.values.insert(key.to_string(), Some(value));
            }
        }
    }

    fn filled(&self) -> ScenarioInput {
        self.values
            .iter()
            .filter_map(|(k, v)| v.map(|v| (k.clone(), v)))
            .collect()
    }
}

/// Result slot of a form: either the last prediction or the last error message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Prediction(PredictionResponse),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormController {
    pub state: FormState,
    pub outcome: Option<Outcome>,
    pub loading: bool,
}

impl FormController {
    pub fn new(state: FormState) -> Self {
        Self { state, outcome: None, loading: false }
    }

    pub fn can_submit(&self) -> bool {
        self.state.can_submit(self.loading)
    }

    pub fn prediction(&self) -> Option<&PredictionResponse> {
        match &self.outcome {
            Some(Outcome::Prediction(p)) => Some(p),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(Outcome::Failed(message)) => Some(message),
            _ => None,
        }
    }

    /// Marks the form busy and hands back the input to send, or `None` when
    /// the form is incomplete or already waiting on a response.
    pub fn begin(&mut self) -> Option<ScenarioInput> {
        if !self.can_submit() {
            return None;
        }
        let input = self.state.to_input().ok()?;
        self.loading = true;
        Some(input)
    }

    pub fn finish(&mut self, result: Result<PredictionResponse, String>) {
        self.loading = false;
        self.outcome = Some(match result {
            Ok(prediction) => Outcome::Prediction(prediction),
            Err(message) => Outcome::Failed(message),
        });
    }

    /// Sends the form through `service`. No-op (returns `false`) unless every
    /// required field is filled.
    pub async fn submit<S: PredictionService>(&mut self, service: &S) -> bool {
        let Some(input) = self.begin() else {
            return false;
        };
        let endpoint = self.state.endpoint();
        let result = service
            .predict(endpoint, &input)
            .await
            .map_err(|e| e.user_message(endpoint));
        if let Err(message) = &result {
            log::warn!("{} prediction failed: {}", endpoint, message);
        }
        self.finish(result);
        true
    }
}
