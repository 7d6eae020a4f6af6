use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::endpoint::Endpoint;
use crate::error::{ApiError, HarnessError};
use crate::prediction::PredictionResponse;
use crate::scenario::{Scenario, ScenarioInput};
use crate::service::{CancelToken, PredictionService};
use crate::stats::AggregateStatistics;

/// One successful call. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub scenario_name: String,
    pub input: ScenarioInput,
    pub result: PredictionResponse,
}

impl TestRecord {
    pub fn new(scenario_name: impl Into<String>, input: ScenarioInput, result: PredictionResponse) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            scenario_name: scenario_name.into(),
            input,
            result,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.result.endpoint()
    }
}

/// Records, most recent first.
///
/// Merge order: a batch keeps its scenario order and is prepended as one
/// block; a single run prepends one record. Every change builds a new sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestHistory {
    records: Vec<TestRecord>,
}

impl TestHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&TestRecord> {
        self.records.first()
    }

    pub fn push(&mut self, record: TestRecord) {
        self.merge_batch(vec![record]);
    }

    pub fn merge_batch(&mut self, batch: Vec<TestRecord>) {
        let mut merged = batch;
        merged.extend(self.records.iter().cloned());
        self.records = merged;
    }

    pub fn clear(&mut self) {
        self.records = Vec::new();
    }

    pub fn for_endpoint(&self, endpoint: Endpoint) -> impl Iterator<Item = &TestRecord> {
        self.records.iter().filter(move |r| r.endpoint() == endpoint)
    }

    pub fn statistics(&self) -> AggregateStatistics {
        AggregateStatistics::compute(&self.records)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOptions {
    /// Fixed wait after each successful request.
    pub delay: Duration,
}

impl BatchOptions {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioFailure {
    pub scenario_name: String,
    pub error: ApiError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub endpoint: Endpoint,
    /// Successful records, in scenario order.
    pub records: Vec<TestRecord>,
    pub failures: Vec<ScenarioFailure>,
}

impl BatchOutcome {
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

pub async fn run_single<S: PredictionService>(
    service: &S,
    endpoint: Endpoint,
    scenario: &Scenario,
) -> Result<TestRecord, ApiError> {
    let result = service.predict(endpoint, &scenario.input).await?;
    Ok(TestRecord::new(scenario.name.clone(), scenario.input.clone(), result))
}

/// Runs `scenarios` against `endpoint` one at a time, in order.
///
/// A failing scenario is logged and skipped; the batch only fails when nothing
/// succeeded or when `cancel` fires.
pub async fn run_batch<S, F>(
    service: &S,
    endpoint: Endpoint,
    scenarios: &[Scenario],
    options: BatchOptions,
    cancel: &CancelToken,
    mut on_progress: F,
) -> Result<BatchOutcome, HarnessError>
where
    S: PredictionService,
    F: FnMut(BatchProgress),
{
    if scenarios.is_empty() {
        return Err(HarnessError::Empty);
    }

    let total = scenarios.len();
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for (i, scenario) in scenarios.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(HarnessError::Cancelled);
        }
        on_progress(BatchProgress { completed: i, total });
        log::info!("Test {}/{} ({}): {}", i + 1, total, endpoint, scenario.name);

        match run_single(service, endpoint, scenario).await {
            Ok(record) => {
                log::debug!("Test {} succeeded: {:?}", i + 1, record.result);
                records.push(record);
                if !options.delay.is_zero() {
                    service.pause(options.delay).await;
                }
            }
            Err(error) => {
                log::warn!("Scenario \"{}\" failed: {}", scenario.name, error);
                failures.push(ScenarioFailure { scenario_name: scenario.name.clone(), error });
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(HarnessError::Cancelled);
    }
    on_progress(BatchProgress { completed: total, total });

    if records.is_empty() {
        log::error!("all {} scenarios against {} failed", total, endpoint);
        return Err(HarnessError::AllFailed { attempted: total });
    }

    Ok(BatchOutcome { endpoint, records, failures })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, hours: f64) -> TestRecord {
        TestRecord::new(name, ScenarioInput::new(), PredictionResponse::Duration { hours })
    }

    fn names(history: &TestHistory) -> Vec<&str> {
        history.records().iter().map(|r| r.scenario_name.as_str()).collect()
    }

    #[test]
    fn batches_are_prepended_as_blocks_in_scenario_order() {
        let mut history = TestHistory::new();
        history.merge_batch(vec![record("a1", 1.0), record("a2", 2.0)]);
        history.merge_batch(vec![record("b1", 1.0), record("b2", 2.0), record("b3", 3.0)]);
        assert_eq!(names(&history), vec!["b1", "b2", "b3", "a1", "a2"]);

        history.push(record("single", 4.0));
        assert_eq!(history.latest().unwrap().scenario_name, "single");
        assert_eq!(history.len(), 6);
    }

    #[test]
    fn clear_empties_history_and_statistics() {
        let mut history = TestHistory::new();
        history.push(record("x", 2.0));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.statistics().duration.count, 0);
    }

    #[test]
    fn filters_by_endpoint() {
        let mut history = TestHistory::new();
        history.push(record("d", 2.0));
        history.push(TestRecord::new(
            "o",
            ScenarioInput::new(),
            PredictionResponse::Occupancy { occupied: true, probability_occupied: 0.9, probability_free: 0.1 },
        ));
        assert_eq!(history.for_endpoint(Endpoint::Duration).count(), 1);
        assert_eq!(history.for_endpoint(Endpoint::Cluster).count(), 0);
    }

    #[test]
    fn progress_percent() {
        assert_eq!(BatchProgress { completed: 1, total: 4 }.percent(), 25.0);
        assert_eq!(BatchProgress { completed: 0, total: 0 }.percent(), 100.0);
    }
}
