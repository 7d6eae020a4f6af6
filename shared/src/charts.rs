//! Chart-ready series built from statistics and records. The frontend only
//! maps these onto CSS gradients and styled bars; no aggregation happens at
//! render time.

use std::collections::BTreeMap;

use crate::display::{format_probability, DurationView};
use crate::features::{self, HOUR, WEEKDAY, WEEKDAY_NAMES};
use crate::harness::TestRecord;
use crate::prediction::PredictionResponse;
use crate::profiles::CLUSTER_PROFILES;
use crate::stats::{ClusterStats, DurationStats, OccupancyStats};

pub const OCCUPIED_COLOR: &str = "#f44336";
pub const FREE_COLOR: &str = "#4caf50";

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarPoint {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
}

/// One x-axis category with one value per series.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub scenario: String,
    pub prediction: String,
    pub detail: String,
}

/// Share of each slice in the total, 0..=1. Zero for an empty pie.
pub fn share(slices: &[PieSlice], index: usize) -> f64 {
    let total: f64 = slices.iter().map(|s| s.value).sum();
    match slices.get(index) {
        Some(slice) if total > 0.0 => slice.value / total,
        _ => 0.0,
    }
}

pub fn occupancy_split(stats: &OccupancyStats) -> Vec<PieSlice> {
    vec![
        PieSlice { label: "Occupées".into(), value: stats.predicted_occupied as f64, color: OCCUPIED_COLOR },
        PieSlice { label: "Libres".into(), value: stats.predicted_free as f64, color: FREE_COLOR },
    ]
}

pub fn cluster_distribution(stats: &ClusterStats) -> Vec<PieSlice> {
    CLUSTER_PROFILES
        .iter()
        .zip(stats.per_cluster)
        .enumerate()
        .map(|(i, (profile, count))| PieSlice {
            label: format!("Cluster {}: {}", i + 1, profile.name),
            value: count as f64,
            color: profile.color,
        })
        .collect()
}

pub fn duration_bars(stats: &DurationStats) -> Vec<BarPoint> {
    stats
        .samples
        .iter()
        .map(|sample| BarPoint {
            label: sample.scenario_name.clone(),
            value: sample.hours,
            color: DurationView::new(sample.hours).color(),
        })
        .collect()
}

pub fn cluster_series() -> Vec<Series> {
    CLUSTER_PROFILES
        .iter()
        .enumerate()
        .map(|(i, profile)| Series { label: format!("Cluster {}", i + 1), color: profile.color })
        .collect()
}

/// One group per cluster feature, one bar per cluster (see [`cluster_series`]).
pub fn cluster_feature_means(stats: &ClusterStats) -> Vec<BarGroup> {
    stats
        .feature_means
        .iter()
        .map(|m| BarGroup { label: features::label_for(m.feature).to_string(), values: m.means.to_vec() })
        .collect()
}

pub fn occupancy_series() -> Vec<Series> {
    vec![
        Series { label: "Occupé".into(), color: OCCUPIED_COLOR },
        Series { label: "Libre".into(), color: FREE_COLOR },
    ]
}

/// Occupied/free counts grouped by the value of `key` in each record's input,
/// in ascending key order. Records without the key are skipped.
fn occupancy_by<F>(records: &[TestRecord], key: &str, label: F) -> Vec<BarGroup>
where
    F: Fn(i64) -> String,
{
    let mut groups: BTreeMap<i64, [f64; 2]> = BTreeMap::new();
    for record in records {
        let PredictionResponse::Occupancy { occupied, .. } = record.result else {
            continue;
        };
        let Some(value) = record.input.get(key) else {
            continue;
        };
        let counts = groups.entry(value.round() as i64).or_default();
        counts[if occupied { 0 } else { 1 }] += 1.0;
    }
    groups
        .into_iter()
        .map(|(k, counts)| BarGroup { label: label(k), values: counts.to_vec() })
        .collect()
}

pub fn occupancy_by_weekday(records: &[TestRecord]) -> Vec<BarGroup> {
    occupancy_by(records, WEEKDAY, |day| {
        usize::try_from(day)
            .ok()
            .and_then(|d| WEEKDAY_NAMES.get(d))
            .map(|name| name.to_string())
            .unwrap_or_else(|| day.to_string())
    })
}

pub fn occupancy_by_hour(records: &[TestRecord]) -> Vec<BarGroup> {
    occupancy_by(records, HOUR, |hour| format!("{}:00", hour))
}

pub fn occupancy_sample_rows(stats: &OccupancyStats) -> Vec<SampleRow> {
    stats
        .samples
        .iter()
        .map(|s| SampleRow {
            scenario: s.scenario_name.clone(),
            prediction: if s.occupied { "Occupée" } else { "Libre" }.to_string(),
            detail: format_probability(s.probability),
        })
        .collect()
}

pub fn duration_sample_rows(stats: &DurationStats) -> Vec<SampleRow> {
    stats
        .samples
        .iter()
        .map(|s| {
            let view = DurationView::new(s.hours);
            SampleRow { scenario: s.scenario_name.clone(), prediction: view.clock(), detail: view.decimal() }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioInput;
    use crate::stats::AggregateStatistics;
    use pretty_assertions::assert_eq;

    fn occupancy(weekday: f64, hour: f64, occupied: bool) -> TestRecord {
        TestRecord::new(
            "o",
            ScenarioInput::new().with(WEEKDAY, weekday).with(HOUR, hour),
            PredictionResponse::Occupancy { occupied, probability_occupied: 0.5, probability_free: 0.5 },
        )
    }

    #[test]
    fn occupancy_pie_follows_counts() {
        let records = vec![occupancy(0.0, 8.0, true), occupancy(0.0, 9.0, true), occupancy(6.0, 9.0, false)];
        let stats = AggregateStatistics::compute(&records);
        let pie = occupancy_split(&stats.occupancy);
        assert_eq!(pie[0].value, 2.0);
        assert_eq!(pie[1].value, 1.0);
        assert!((share(&pie, 0) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_pie_has_zero_shares() {
        let pie = occupancy_split(&OccupancyStats::default());
        assert_eq!(share(&pie, 0), 0.0);
        assert_eq!(share(&pie, 5), 0.0);
    }

    #[test]
    fn grouped_by_weekday_and_hour() {
        let records = vec![occupancy(6.0, 9.0, false), occupancy(0.0, 8.0, true), occupancy(0.0, 9.0, true)];
        let by_day = occupancy_by_weekday(&records);
        assert_eq!(by_day.len(), 2);
        assert_eq!(by_day[0].label, WEEKDAY_NAMES[0]);
        assert_eq!(by_day[0].values, vec![2.0, 0.0]);
        assert_eq!(by_day[1].values, vec![0.0, 1.0]);

        let by_hour = occupancy_by_hour(&records);
        assert_eq!(by_hour.iter().map(|g| g.label.as_str()).collect::<Vec<_>>(), vec!["8:00", "9:00"]);
    }

    #[test]
    fn cluster_charts_cover_all_four_clusters() {
        let record = TestRecord::new(
            "c",
            ScenarioInput::new().with(features::PAYMENT_AMOUNT, 12.0),
            PredictionResponse::Cluster { cluster: 1, profile: String::new(), confidence: 0.9 },
        );
        let stats = AggregateStatistics::compute(&[record]);
        let pie = cluster_distribution(&stats.cluster);
        assert_eq!(pie.len(), 4);
        assert_eq!(pie[1].value, 1.0);
        assert_eq!(cluster_series().len(), 4);

        let bars = cluster_feature_means(&stats.cluster);
        assert_eq!(bars.len(), 4);
        assert!(bars.iter().any(|g| g.values == vec![0.0, 12.0, 0.0, 0.0]));
    }

    #[test]
    fn duration_bars_use_band_colors() {
        let records = vec![TestRecord::new("long", ScenarioInput::new(), PredictionResponse::Duration { hours: 7.0 })];
        let stats = AggregateStatistics::compute(&records);
        let bars = duration_bars(&stats.duration);
        assert_eq!(bars[0].color, "#f44336");
        let rows = duration_sample_rows(&stats.duration);
        assert_eq!(rows[0].prediction, "7h");
    }

    #[test]
    fn sample_rows_stay_within_their_endpoint() {
        let records = vec![
            occupancy(0.0, 8.0, true),
            TestRecord::new("court", ScenarioInput::new(), PredictionResponse::Duration { hours: 1.5 }),
            occupancy(2.0, 9.0, false),
        ];
        let stats = AggregateStatistics::compute(&records);

        let occupancy_rows = occupancy_sample_rows(&stats.occupancy);
        assert_eq!(occupancy_rows.len(), 2);
        assert!(occupancy_rows.iter().all(|r| r.scenario == "o"));
        assert_eq!(occupancy_rows[0].prediction, "Occupée");
        assert_eq!(occupancy_rows[1].prediction, "Libre");

        let duration_rows = duration_sample_rows(&stats.duration);
        assert_eq!(duration_rows.len(), 1);
        assert_eq!(duration_rows[0].prediction, "1h30");
        assert_eq!(duration_rows[0].detail, "1.50 heures");
    }
}
