//! Presentation models for a single prediction.

use crate::prediction::PredictionResponse;
use crate::profiles::{self, ClusterProfile};

/// Upper end of the duration scale, in hours.
pub const DURATION_SCALE_HOURS: f64 = 8.0;

pub fn format_probability(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DurationView {
    pub hours: u32,
    pub minutes: u32,
    pub value: f64,
}

impl DurationView {
    pub fn new(value: f64) -> Self {
        let value = value.max(0.0);
        let mut hours = value.floor() as u32;
        let mut minutes = ((value - value.floor()) * 60.0).round() as u32;
        if minutes >= 60 {
            hours += 1;
            minutes -= 60;
        }
        Self { hours, minutes, value }
    }

    /// `"5h30"`, or `"5h"` for whole hours.
    pub fn clock(&self) -> String {
        if self.minutes == 0 {
            format!("{}h", self.hours)
        } else {
            format!("{}h{:02}", self.hours, self.minutes)
        }
    }

    pub fn decimal(&self) -> String {
        format!("{:.2} heures", self.value)
    }

    /// Marker position on the duration scale, 0..=100.
    pub fn scale_position(&self) -> f64 {
        (self.value / DURATION_SCALE_HOURS).min(1.0) * 100.0
    }

    pub fn color(&self) -> &'static str {
        match self.value {
            v if v <= 1.0 => "#4caf50",
            v if v <= 2.0 => "#8bc34a",
            v if v <= 4.0 => "#ffeb3b",
            v if v <= 6.0 => "#ff9800",
            _ => "#f44336",
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self.value {
            v if v <= 1.0 => "Stationnement de très courte durée.",
            v if v <= 2.0 => "Stationnement de courte durée.",
            v if v <= 4.0 => "Stationnement de durée moyenne.",
            v if v <= 6.0 => "Stationnement de longue durée.",
            _ => "Stationnement de très longue durée.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyView {
    pub occupied: bool,
    pub probability_occupied: f64,
}

impl OccupancyView {
    pub fn new(occupied: bool, probability_occupied: f64) -> Self {
        Self { occupied, probability_occupied }
    }

    pub fn title(&self) -> &'static str {
        if self.occupied { "Place occupée" } else { "Place libre" }
    }

    pub fn probability_text(&self) -> String {
        format_probability(self.probability_occupied)
    }

    pub fn bar_percent(&self) -> f64 {
        self.probability_occupied * 100.0
    }

    pub fn interpretation(&self) -> String {
        if self.occupied {
            format!(
                "Il est {} probable que cette place soit occupée.",
                format_probability(self.probability_occupied)
            )
        } else {
            format!(
                "Il est {} probable que cette place soit libre.",
                format_probability(1.0 - self.probability_occupied)
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterView {
    pub index: usize,
    pub confidence: f64,
    /// Label sent by the service, shown when the index has no known profile.
    pub service_label: String,
}

impl ClusterView {
    pub fn new(index: usize, confidence: f64, service_label: impl Into<String>) -> Self {
        Self { index, confidence, service_label: service_label.into() }
    }

    pub fn profile(&self) -> Option<&'static ClusterProfile> {
        profiles::profile(self.index)
    }

    pub fn name(&self) -> &str {
        match self.profile() {
            Some(profile) => profile.name,
            None => &self.service_label,
        }
    }

    pub fn chip_label(&self) -> String {
        format!("Cluster {}: {}", self.index + 1, self.name())
    }

    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }

    pub fn color(&self) -> &'static str {
        self.profile().map(|p| p.color).unwrap_or("#9e9e9e")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Duration(DurationView),
    Occupancy(OccupancyView),
    Cluster(ClusterView),
}

impl From<&PredictionResponse> for ResultView {
    fn from(response: &PredictionResponse) -> Self {
        match response {
            PredictionResponse::Duration { hours } => ResultView::Duration(DurationView::new(*hours)),
            PredictionResponse::Occupancy { occupied, probability_occupied, .. } => {
                ResultView::Occupancy(OccupancyView::new(*occupied, *probability_occupied))
            }
            PredictionResponse::Cluster { cluster, profile, confidence } => {
                ResultView::Cluster(ClusterView::new(*cluster, *confidence, profile.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_clock_and_decimal() {
        let view = DurationView::new(5.5);
        assert_eq!(view.clock(), "5h30");
        assert_eq!(view.decimal(), "5.50 heures");
        assert_eq!(DurationView::new(3.0).clock(), "3h");
        assert_eq!(DurationView::new(1.25).clock(), "1h15");
    }

    #[test]
    fn minutes_carry_into_the_next_hour() {
        let view = DurationView::new(2.999);
        assert_eq!((view.hours, view.minutes), (3, 0));
        assert_eq!(view.clock(), "3h");
    }

    #[test]
    fn duration_scale_and_bands() {
        assert_eq!(DurationView::new(4.0).scale_position(), 50.0);
        assert_eq!(DurationView::new(12.0).scale_position(), 100.0);
        assert_eq!(DurationView::new(0.5).color(), "#4caf50");
        assert_eq!(DurationView::new(2.0).color(), "#8bc34a");
        assert_eq!(DurationView::new(5.5).color(), "#ff9800");
        assert_eq!(DurationView::new(7.0).interpretation(), "Stationnement de très longue durée.");
    }

    #[test]
    fn occupied_result_renders_probability() {
        let view = OccupancyView::new(true, 0.82);
        assert_eq!(view.title(), "Place occupée");
        assert_eq!(view.probability_text(), "82.0%");
        assert_eq!(view.interpretation(), "Il est 82.0% probable que cette place soit occupée.");
    }

    #[test]
    fn free_result_reports_probability_of_being_free() {
        let view = OccupancyView::new(false, 0.25);
        assert_eq!(view.title(), "Place libre");
        assert_eq!(view.interpretation(), "Il est 75.0% probable que cette place soit libre.");
    }

    #[test]
    fn cluster_view_uses_fixed_profile_table() {
        let response = PredictionResponse::Cluster { cluster: 2, profile: "x".into(), confidence: 0.67 };
        let ResultView::Cluster(view) = ResultView::from(&response) else {
            panic!("expected a cluster view");
        };
        assert_eq!(view.confidence_percent(), 67);
        assert_eq!(view.name(), "Habitués fidèles");
        assert_eq!(view.chip_label(), "Cluster 3: Habitués fidèles");
        assert_eq!(view.color(), "#4caf50");
    }

    #[test]
    fn probability_formatting() {
        assert_eq!(format_probability(0.0), "0.0%");
        assert_eq!(format_probability(1.0), "100.0%");
        assert_eq!(format_probability(0.3333), "33.3%");
    }
}
