use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::harness::TestRecord;
use crate::prediction::PredictionResponse;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

const PREDICTION_COLUMNS: [&str; 7] = [
    "prediction",
    "probability_occupied",
    "probability_free",
    "duration_hours",
    "cluster",
    "profile",
    "confidence",
];

pub fn file_name(date: NaiveDate) -> String {
    format!("smart_parking_test_results_{}.csv", date.format("%Y-%m-%d"))
}

/// One row per record: metadata, the union of input keys (sorted), then the
/// prediction columns. Cells that do not apply are left empty.
pub fn export_csv(records: &[TestRecord]) -> Result<String, ExportError> {
    let input_keys: BTreeSet<&str> = records.iter().flat_map(|r| r.input.keys()).collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    let header = ["timestamp", "scenario", "endpoint"]
        .into_iter()
        .chain(input_keys.iter().copied())
        .chain(PREDICTION_COLUMNS);
    writer.write_record(header)?;

    for record in records {
        let mut row = vec![
            record.timestamp.to_rfc3339(),
            record.scenario_name.clone(),
            record.endpoint().to_string(),
        ];
        row.extend(
            input_keys
                .iter()
                .map(|key| record.input.get(key).map(|v| v.to_string()).unwrap_or_default()),
        );
        row.extend(prediction_cells(&record.result));
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|e| ExportError::Buffer(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

fn prediction_cells(result: &PredictionResponse) -> [String; 7] {
    let confidence = result.confidence().map(|c| format!("{:.4}", c)).unwrap_or_default();
    match result {
        PredictionResponse::Duration { hours } => [
            format!("{:.2}", hours),
            String::new(),
            String::new(),
            format!("{:.4}", hours),
            String::new(),
            String::new(),
            confidence,
        ],
        PredictionResponse::Occupancy { occupied, probability_occupied, probability_free } => [
            if *occupied { "1" } else { "0" }.to_string(),
            format!("{:.4}", probability_occupied),
            format!("{:.4}", probability_free),
            String::new(),
            String::new(),
            String::new(),
            confidence,
        ],
        PredictionResponse::Cluster { cluster, profile, .. } => [
            cluster.to_string(),
            String::new(),
            String::new(),
            String::new(),
            cluster.to_string(),
            profile.clone(),
            confidence,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioInput;

    #[test]
    fn file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(file_name(date), "smart_parking_test_results_2024-03-09.csv");
    }

    #[test]
    fn header_has_sorted_union_of_input_keys() {
        let records = vec![
            TestRecord::new(
                "a",
                ScenarioInput::new().with("Hour", 8.0),
                PredictionResponse::Duration { hours: 2.5 },
            ),
            TestRecord::new(
                "b, with comma",
                ScenarioInput::new().with("Weekday", 2.0),
                PredictionResponse::Occupancy { occupied: true, probability_occupied: 0.8, probability_free: 0.2 },
            ),
        ];
        let csv = export_csv(&records).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,scenario,endpoint,Hour,Weekday,prediction,probability_occupied,\
             probability_free,duration_hours,cluster,profile,confidence"
        );
        let first = lines.next().unwrap();
        assert!(first.contains(",a,duration,8,,2.50,,,2.5000,,,"));
        let second = lines.next().unwrap();
        assert!(second.contains(",\"b, with comma\",occupancy,,2,1,0.8000,0.2000,,,,0.8000"));
    }

    #[test]
    fn empty_history_exports_only_the_header() {
        let csv = export_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
