use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Args;
use log::{info, warn};
use rand::Rng;
use shared::display::{DurationView, format_probability};
use shared::export::{self, ExportError};
use shared::harness::run_batch;
use shared::scenario::{fixed_scenarios, random_scenarios};
use shared::service::RANDOM_BATCH_DELAY_MS;
use shared::{
    AggregateStatistics, ApiConfig, BatchOptions, BatchOutcome, CancelToken, Endpoint, HarnessError,
    PredictionService, Scenario,
};
use thiserror::Error;

use crate::client::ApiClient;
use crate::config::Settings;

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Model to exercise: duration, occupancy or cluster.
    pub endpoint: Endpoint,

    /// Generate random scenarios instead of running the fixed catalog.
    #[arg(long)]
    pub random: bool,

    /// Number of random scenarios (overrides RANDOM_BATCH_SIZE).
    #[arg(long, requires = "random")]
    pub count: Option<usize>,

    /// Pause after each successful request, in milliseconds.
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Write the results as CSV to this file, or into this directory.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum BatchCommandError {
    #[error("Batch failed: {0}")]
    Harness(#[from] HarnessError),
    #[error("CSV export failed: {0}")]
    Export(#[from] ExportError),
    #[error("Could not write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
}

/// Scenarios to run and the pause between them.
pub fn plan<R: Rng + ?Sized>(args: &BatchArgs, config: &ApiConfig, rng: &mut R) -> (Vec<Scenario>, BatchOptions) {
    if args.random {
        let count = args.count.unwrap_or(config.random_batch_size);
        let delay = args.delay_ms.unwrap_or(RANDOM_BATCH_DELAY_MS);
        (
            random_scenarios(args.endpoint, count, rng),
            BatchOptions::with_delay(Duration::from_millis(delay)),
        )
    } else {
        let delay = args.delay_ms.map(Duration::from_millis).unwrap_or_else(|| config.batch_delay());
        (fixed_scenarios(args.endpoint), BatchOptions::with_delay(delay))
    }
}

pub async fn execute<S: PredictionService>(
    service: &S,
    endpoint: Endpoint,
    scenarios: &[Scenario],
    options: BatchOptions,
    cancel: &CancelToken,
) -> Result<BatchOutcome, BatchCommandError> {
    let outcome = run_batch(service, endpoint, scenarios, options, cancel, |progress| {
        if progress.completed == progress.total {
            info!("{} / {} done", progress.completed, progress.total);
        }
    })
    .await?;

    if !outcome.failures.is_empty() {
        let names: Vec<&str> = outcome.failures.iter().map(|f| f.scenario_name.as_str()).collect();
        warn!(
            "{} of {} scenarios failed: {}",
            outcome.failures.len(),
            outcome.attempted(),
            names.join(", ")
        );
    }
    Ok(outcome)
}

/// Human-readable statistics for `endpoint`, one entry per log line.
pub fn summary_lines(endpoint: Endpoint, stats: &AggregateStatistics) -> Vec<String> {
    match endpoint {
        Endpoint::Occupancy => {
            let s = &stats.occupancy;
            vec![
                format!("tests: {} ({} occupied, {} free)", s.count, s.predicted_occupied, s.predicted_free),
                format!(
                    "occupancy probability: avg {} / min {} / max {}",
                    format_probability(s.avg_probability),
                    format_probability(s.min_probability),
                    format_probability(s.max_probability)
                ),
                format!(
                    "confidence: avg {}, {} above threshold",
                    format_probability(s.avg_confidence),
                    format_probability(s.confident_share)
                ),
            ]
        }
        Endpoint::Duration => {
            let s = &stats.duration;
            vec![
                format!("tests: {}", s.count),
                format!(
                    "duration: avg {} / min {} / max {}",
                    DurationView::new(s.avg_duration).clock(),
                    DurationView::new(s.min_duration).clock(),
                    DurationView::new(s.max_duration).clock()
                ),
            ]
        }
        Endpoint::Cluster => {
            let s = &stats.cluster;
            let per_cluster: Vec<String> = s
                .per_cluster
                .iter()
                .enumerate()
                .map(|(i, n)| format!("#{}: {}", i + 1, n))
                .collect();
            vec![
                format!("tests: {}", s.count),
                format!("clusters: {}", per_cluster.join(", ")),
                format!("confidence: avg {}", format_probability(s.avg_confidence)),
            ]
        }
    }
}

/// A directory gets the dated default file name.
pub fn csv_destination(path: &Path, date: NaiveDate) -> PathBuf {
    if path.is_dir() {
        path.join(export::file_name(date))
    } else {
        path.to_path_buf()
    }
}

pub fn write_csv(outcome: &BatchOutcome, path: &Path) -> Result<PathBuf, BatchCommandError> {
    let destination = csv_destination(path, Local::now().date_naive());
    let content = export::export_csv(&outcome.records)?;
    std::fs::write(&destination, content).map_err(|source| BatchCommandError::Write {
        path: destination.clone(),
        source,
    })?;
    Ok(destination)
}

pub async fn run_batch_command(settings: Settings, args: BatchArgs) -> crate::error::Result<()> {
    let client = ApiClient::new(settings.api)?;
    let (scenarios, options) = plan(&args, client.config(), &mut rand::thread_rng());
    info!(
        "Running {} {} scenario(s) against {}",
        scenarios.len(),
        args.endpoint,
        client.config().base_url
    );

    let cancel = CancelToken::new();
    let interrupt = cancel.clone();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current request");
            interrupt.cancel();
        }
    });

    let outcome = execute(&client, args.endpoint, &scenarios, options, &cancel).await?;
    let stats = AggregateStatistics::compute(&outcome.records);
    for line in summary_lines(args.endpoint, &stats) {
        info!("{}", line);
    }

    if let Some(path) = &args.csv {
        let written = write_csv(&outcome, path)?;
        info!("Results written to {}", written.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use shared::features::FeatureLists;
    use shared::prediction::HealthStatus;
    use shared::{ApiError, PredictionResponse, ScenarioInput};
    use std::cell::Cell;

    /// Answers every other request with a 500.
    struct Flaky {
        calls: Cell<usize>,
    }

    impl PredictionService for Flaky {
        async fn health(&self) -> Result<HealthStatus, ApiError> {
            Ok(HealthStatus { status: "ok".into(), message: None })
        }

        async fn features(&self) -> Result<FeatureLists, ApiError> {
            Ok(FeatureLists::default())
        }

        async fn predict(&self, _: Endpoint, _: &ScenarioInput) -> Result<PredictionResponse, ApiError> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if n % 2 == 1 {
                return Err(ApiError::service(500, None));
            }
            Ok(PredictionResponse::Duration { hours: 1.0 + n as f64 })
        }

        async fn pause(&self, _: Duration) {}
    }

    fn args(random: bool, count: Option<usize>, delay_ms: Option<u64>) -> BatchArgs {
        BatchArgs { endpoint: Endpoint::Cluster, random, count, delay_ms, csv: None }
    }

    #[test]
    fn fixed_plan_uses_catalog_and_config_delay() {
        let mut config = ApiConfig::default();
        config.batch_delay_ms = 120;
        let (scenarios, options) = plan(&args(false, None, None), &config, &mut StdRng::seed_from_u64(1));
        assert_eq!(scenarios.len(), 4);
        assert_eq!(options.delay, Duration::from_millis(120));
    }

    #[test]
    fn random_plan_honours_count_and_delay_override() {
        let config = ApiConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let (scenarios, options) = plan(&args(true, None, None), &config, &mut rng);
        assert_eq!(scenarios.len(), 5);
        assert_eq!(options.delay, Duration::from_millis(300));

        let (scenarios, options) = plan(&args(true, Some(2), Some(0)), &config, &mut rng);
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[1].name, "Test aléatoire #2");
        assert!(options.delay.is_zero());
    }

    #[actix_web::test]
    async fn execute_keeps_successes_in_order() {
        let service = Flaky { calls: Cell::new(0) };
        let scenarios = fixed_scenarios(Endpoint::Duration);
        let outcome = execute(&service, Endpoint::Duration, &scenarios, BatchOptions::default(), &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.records[0].scenario_name, scenarios[0].name);
        assert_eq!(outcome.records[1].scenario_name, scenarios[2].name);

        let lines = summary_lines(Endpoint::Duration, &AggregateStatistics::compute(&outcome.records));
        assert_eq!(lines, vec!["tests: 3".to_string(), "duration: avg 3h / min 1h / max 5h".to_string()]);
    }

    #[actix_web::test]
    async fn cancelled_batch_is_an_error() {
        let service = Flaky { calls: Cell::new(0) };
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = execute(
            &service,
            Endpoint::Duration,
            &fixed_scenarios(Endpoint::Duration),
            BatchOptions::default(),
            &cancel,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BatchCommandError::Harness(HarnessError::Cancelled)));
        assert_eq!(service.calls.get(), 0);
    }

    #[test]
    fn csv_goes_into_directories_under_the_dated_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let dir = std::env::temp_dir();
        assert_eq!(
            csv_destination(&dir, date),
            dir.join("smart_parking_test_results_2024-03-09.csv")
        );
        let file = dir.join("parkini-out.csv");
        assert_eq!(csv_destination(&file, date), file);
    }

    #[actix_web::test]
    async fn write_csv_creates_the_file() {
        let service = Flaky { calls: Cell::new(0) };
        let scenarios = fixed_scenarios(Endpoint::Duration);
        let outcome = execute(&service, Endpoint::Duration, &scenarios[..1], BatchOptions::default(), &CancelToken::new())
            .await
            .unwrap();

        let path = std::env::temp_dir().join(format!("parkini-batch-{}.csv", std::process::id()));
        let written = write_csv(&outcome, &path).unwrap();
        let content = std::fs::read_to_string(&written).unwrap();
        std::fs::remove_file(&written).ok();

        assert_eq!(written, path);
        assert_eq!(content.lines().count(), 2);
        assert!(content.starts_with("timestamp,scenario,endpoint,"));
    }
}
