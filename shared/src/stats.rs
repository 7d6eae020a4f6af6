use crate::features::CLUSTER_FEATURES;
use crate::harness::TestRecord;
use crate::prediction::PredictionResponse;
use crate::profiles::CLUSTER_COUNT;

pub const SAMPLE_SIZE: usize = 5;
/// Predicted-class probability above which an occupancy answer counts as confident.
pub const CONFIDENT_THRESHOLD: f64 = 0.75;

/// Running sum/min/max. Reports zeros while empty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        // rounding can push sum/count a hair outside the observed range
        (self.sum / self.count as f64).clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccupancySample {
    pub scenario_name: String,
    pub occupied: bool,
    pub probability: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccupancyStats {
    pub count: usize,
    pub predicted_occupied: usize,
    pub predicted_free: usize,
    /// Probability of the "occupied" class.
    pub avg_probability: f64,
    pub min_probability: f64,
    pub max_probability: f64,
    /// Probability of whichever class was predicted.
    pub avg_confidence: f64,
    /// Share (0..=1) of answers whose confidence exceeds [`CONFIDENT_THRESHOLD`].
    pub confident_share: f64,
    pub samples: Vec<OccupancySample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DurationSample {
    pub scenario_name: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DurationStats {
    pub count: usize,
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub samples: Vec<DurationSample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMeans {
    pub feature: &'static str,
    /// Mean input value per cluster index, 0 for empty clusters.
    pub means: [f64; CLUSTER_COUNT],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterStats {
    pub count: usize,
    pub per_cluster: [usize; CLUSTER_COUNT],
    pub avg_confidence: f64,
    pub feature_means: Vec<FeatureMeans>,
}

/// Derived view of a record sequence. Always rebuilt from scratch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStatistics {
    pub occupancy: OccupancyStats,
    pub duration: DurationStats,
    pub cluster: ClusterStats,
}

impl AggregateStatistics {
    pub fn compute(records: &[TestRecord]) -> Self {
        let mut occupancy = OccupancyStats::default();
        let mut occupied_probability = Accumulator::default();
        let mut occupancy_confidence = Accumulator::default();
        let mut confident = 0usize;

        let mut duration = DurationStats::default();
        let mut hours_acc = Accumulator::default();

        let mut cluster = ClusterStats::default();
        let mut cluster_confidence = Accumulator::default();
        let mut feature_sums = [[0.0f64; CLUSTER_COUNT]; CLUSTER_FEATURES.len()];
        let mut feature_counts = [[0usize; CLUSTER_COUNT]; CLUSTER_FEATURES.len()];

        for record in records {
            match &record.result {
                PredictionResponse::Occupancy { occupied, probability_occupied, .. } => {
                    occupied_probability.add(*probability_occupied);
                    if *occupied {
                        occupancy.predicted_occupied += 1;
                    } else {
                        occupancy.predicted_free += 1;
                    }
                    let conf = record.result.confidence().unwrap_or_default();
                    occupancy_confidence.add(conf);
                    if conf > CONFIDENT_THRESHOLD {
                        confident += 1;
                    }
                    if occupancy.samples.len() < SAMPLE_SIZE {
                        occupancy.samples.push(OccupancySample {
                            scenario_name: record.scenario_name.clone(),
                            occupied: *occupied,
                            probability: *probability_occupied,
                        });
                    }
                }
                PredictionResponse::Duration { hours } => {
                    hours_acc.add(*hours);
                    if duration.samples.len() < SAMPLE_SIZE {
                        duration.samples.push(DurationSample {
                            scenario_name: record.scenario_name.clone(),
                            hours: *hours,
                        });
                    }
                }
                PredictionResponse::Cluster { cluster: index, confidence, .. } => {
                    cluster_confidence.add(*confidence);
                    if let Some(slot) = cluster.per_cluster.get_mut(*index) {
                        *slot += 1;
                        for (f, key) in CLUSTER_FEATURES.iter().enumerate() {
                            if let Some(value) = record.input.get(key) {
                                feature_sums[f][*index] += value;
                                feature_counts[f][*index] += 1;
                            }
                        }
                    }
                }
            }
        }

        occupancy.count = occupied_probability.count;
        occupancy.avg_probability = occupied_probability.mean();
        occupancy.min_probability = occupied_probability.min;
        occupancy.max_probability = occupied_probability.max;
        occupancy.avg_confidence = occupancy_confidence.mean();
        if occupancy.count > 0 {
            occupancy.confident_share = confident as f64 / occupancy.count as f64;
        }

        duration.count = hours_acc.count;
        duration.avg_duration = hours_acc.mean();
        duration.min_duration = hours_acc.min;
        duration.max_duration = hours_acc.max;

        cluster.count = cluster_confidence.count;
        cluster.avg_confidence = cluster_confidence.mean();
        cluster.feature_means = CLUSTER_FEATURES
            .iter()
            .enumerate()
            .map(|(f, key)| {
                let mut means = [0.0; CLUSTER_COUNT];
                for (c, mean) in means.iter_mut().enumerate() {
                    if feature_counts[f][c] > 0 {
                        *mean = feature_sums[f][c] / feature_counts[f][c] as f64;
                    }
                }
                FeatureMeans { feature: key, means }
            })
            .collect();

        Self { occupancy, duration, cluster }
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy.count == 0 && self.duration.count == 0 && self.cluster.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioInput;
    use pretty_assertions::assert_eq;

    fn occupancy(name: &str, occupied: bool, p: f64) -> TestRecord {
        TestRecord::new(
            name,
            ScenarioInput::new(),
            PredictionResponse::Occupancy { occupied, probability_occupied: p, probability_free: 1.0 - p },
        )
    }

    fn duration(hours: f64) -> TestRecord {
        TestRecord::new("d", ScenarioInput::new(), PredictionResponse::Duration { hours })
    }

    fn cluster(index: usize, confidence: f64, history: f64) -> TestRecord {
        TestRecord::new(
            "c",
            ScenarioInput::new().with("User_Parking_History", history),
            PredictionResponse::Cluster { cluster: index, profile: String::new(), confidence },
        )
    }

    #[test]
    fn empty_sequence_has_no_nan() {
        let stats = AggregateStatistics::compute(&[]);
        assert!(stats.is_empty());
        assert_eq!(stats.occupancy.avg_probability, 0.0);
        assert_eq!(stats.occupancy.min_probability, 0.0);
        assert_eq!(stats.duration.avg_duration, 0.0);
        assert_eq!(stats.duration.max_duration, 0.0);
        assert_eq!(stats.cluster.avg_confidence, 0.0);
        assert!(stats.cluster.feature_means.iter().all(|m| m.means == [0.0; 4]));
    }

    #[test]
    fn occupancy_split_and_probability_range() {
        let records = vec![
            occupancy("a", true, 0.82),
            occupancy("b", false, 0.10),
            occupancy("c", true, 0.60),
        ];
        let stats = AggregateStatistics::compute(&records).occupancy;
        assert_eq!(stats.count, 3);
        assert_eq!(stats.predicted_occupied, 2);
        assert_eq!(stats.predicted_free, 1);
        assert_eq!(stats.min_probability, 0.10);
        assert_eq!(stats.max_probability, 0.82);
        assert!((stats.avg_probability - 0.50666).abs() < 1e-4);
        // confidences 0.82, 0.90, 0.60
        assert!((stats.confident_share - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn average_stays_within_min_and_max() {
        let records: Vec<_> = (0..3).map(|_| occupancy("x", true, 0.1)).collect();
        let stats = AggregateStatistics::compute(&records).occupancy;
        assert!(stats.min_probability <= stats.avg_probability);
        assert!(stats.avg_probability <= stats.max_probability);
    }

    #[test]
    fn duration_range_and_samples() {
        let records: Vec<_> = [2.0, 5.5, 1.25, 3.0, 4.0, 8.0].into_iter().map(duration).collect();
        let stats = AggregateStatistics::compute(&records).duration;
        assert_eq!(stats.count, 6);
        assert_eq!(stats.min_duration, 1.25);
        assert_eq!(stats.max_duration, 8.0);
        assert!((stats.avg_duration - 23.75 / 6.0).abs() < 1e-9);
        assert_eq!(stats.samples.len(), SAMPLE_SIZE);
        assert_eq!(stats.samples[1].hours, 5.5);
    }

    #[test]
    fn mixed_sequences_are_split_by_kind() {
        let records = vec![duration(2.0), occupancy("o", false, 0.3), cluster(2, 0.67, 20.0)];
        let stats = AggregateStatistics::compute(&records);
        assert_eq!(stats.duration.count, 1);
        assert_eq!(stats.occupancy.count, 1);
        assert_eq!(stats.cluster.count, 1);
    }

    #[test]
    fn cluster_distribution_and_feature_means() {
        let records = vec![cluster(2, 0.6, 20.0), cluster(2, 0.8, 30.0), cluster(0, 0.4, 2.0)];
        let stats = AggregateStatistics::compute(&records).cluster;
        assert_eq!(stats.per_cluster, [1, 0, 2, 0]);
        assert!((stats.avg_confidence - 0.6).abs() < 1e-9);
        let history = stats
            .feature_means
            .iter()
            .find(|m| m.feature == "User_Parking_History")
            .unwrap();
        assert_eq!(history.means, [2.0, 0.0, 25.0, 0.0]);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let records = vec![occupancy("a", true, 0.7), duration(3.5), cluster(1, 0.5, 4.0)];
        assert_eq!(AggregateStatistics::compute(&records), AggregateStatistics::compute(&records));
    }
}
