use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;

pub const HOUR: &str = "Hour";
pub const WEEKDAY: &str = "Weekday";
pub const DAY: &str = "Day";
pub const IS_WEEKEND: &str = "Is_Weekend";
pub const ELECTRIC_VEHICLE: &str = "Electric_Vehicle";
pub const RESERVED_STATUS: &str = "Reserved_Status";
pub const USER_PARKING_HISTORY: &str = "User_Parking_History";
pub const PARKING_DURATION: &str = "Parking_Duration";
pub const PAYMENT_AMOUNT: &str = "Payment_Amount";
pub const PROXIMITY_TO_EXIT: &str = "Proximity_To_Exit";
pub const WEATHER_TEMPERATURE: &str = "Weather_Temperature";
pub const WEATHER_PRECIPITATION: &str = "Weather_Precipitation";
pub const ENTRY_TIME_MINUTES: &str = "Entry_Time_Minutes";
pub const EXIT_TIME_MINUTES: &str = "Exit_Time_Minutes";

pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Request keys of `/predict/cluster`; the service does not advertise them.
pub const CLUSTER_FEATURES: [&str; 4] = [
    PARKING_DURATION,
    PAYMENT_AMOUNT,
    USER_PARKING_HISTORY,
    PROXIMITY_TO_EXIT,
];

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche",
];

/// Body of `GET /features`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureLists {
    pub regression_features: Vec<String>,
    pub classification_features: Vec<String>,
}

impl FeatureLists {
    /// Required keys for a form targeting `endpoint`.
    pub fn required_for(&self, endpoint: Endpoint) -> Vec<String> {
        match endpoint {
            Endpoint::Duration => self.regression_features.clone(),
            Endpoint::Occupancy => self.classification_features.clone(),
            Endpoint::Cluster => CLUSTER_FEATURES.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: f64,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureKind {
    Select(Vec<SelectOption>),
    Day,
    Toggle,
    Slider { min: f64, max: f64, step: f64 },
    Number { min: f64, max: f64, step: f64 },
    TimeOfDay { step: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub kind: FeatureKind,
    pub default: f64,
}

impl FeatureSpec {
    fn new(key: &'static str, label: &'static str, kind: FeatureKind, default: f64) -> Self {
        Self { key, label, unit: None, kind, default }
    }

    fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }
}

fn hour_options() -> Vec<SelectOption> {
    const LABELS: [&str; 24] = [
        "0:00", "1:00", "2:00", "3:00", "4:00", "5:00", "6:00", "7:00", "8:00", "9:00", "10:00", "11:00",
        "12:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00", "19:00", "20:00", "21:00", "22:00",
        "23:00",
    ];
    LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| SelectOption { value: i as f64, label })
        .collect()
}

fn history_options() -> Vec<SelectOption> {
    vec![
        SelectOption { value: 1.0, label: "Rare" },
        SelectOption { value: 5.0, label: "Occasionnel" },
        SelectOption { value: 15.0, label: "Régulier" },
        SelectOption { value: 30.0, label: "Fréquent" },
    ]
}

fn common_features(duration_default: f64) -> Vec<FeatureSpec> {
    vec![
        FeatureSpec::new(HOUR, "Heure d'arrivée", FeatureKind::Select(hour_options()), 12.0),
        FeatureSpec::new(WEEKDAY, "Jour de la semaine", FeatureKind::Day, 3.0),
        FeatureSpec::new(IS_WEEKEND, "Jour de weekend", FeatureKind::Toggle, 0.0),
        FeatureSpec::new(ELECTRIC_VEHICLE, "Véhicule électrique", FeatureKind::Toggle, 0.0),
        FeatureSpec::new(RESERVED_STATUS, "Place réservée", FeatureKind::Toggle, 0.0),
        FeatureSpec::new(
            USER_PARKING_HISTORY,
            "Fréquence d'utilisation",
            FeatureKind::Select(history_options()),
            5.0,
        ),
        FeatureSpec::new(
            PARKING_DURATION,
            "Durée prévue du stationnement",
            FeatureKind::Slider { min: 0.5, max: 8.0, step: 0.5 },
            duration_default,
        )
        .unit("h"),
        FeatureSpec::new(
            PAYMENT_AMOUNT,
            "Montant du paiement",
            FeatureKind::Number { min: 0.0, max: 50.0, step: 0.5 },
            10.0,
        )
        .unit("€"),
        FeatureSpec::new(
            PROXIMITY_TO_EXIT,
            "Distance à la sortie",
            FeatureKind::Number { min: 1.0, max: 100.0, step: 1.0 },
            25.0,
        )
        .unit("m"),
    ]
}

/// Input widgets and defaults for the form targeting `endpoint`.
pub fn catalog(endpoint: Endpoint) -> Vec<FeatureSpec> {
    match endpoint {
        Endpoint::Duration => {
            let mut specs = common_features(3.0);
            specs.push(
                FeatureSpec::new(
                    WEATHER_TEMPERATURE,
                    "Température extérieure",
                    FeatureKind::Slider { min: -10.0, max: 40.0, step: 1.0 },
                    22.0,
                )
                .unit("°C"),
            );
            specs.push(FeatureSpec::new(
                WEATHER_PRECIPITATION,
                "Niveau de précipitation",
                FeatureKind::Select(vec![
                    SelectOption { value: 0.0, label: "Aucune" },
                    SelectOption { value: 1.0, label: "Légère" },
                    SelectOption { value: 2.0, label: "Modérée" },
                    SelectOption { value: 3.0, label: "Forte" },
                ]),
                0.0,
            ));
            specs
        }
        Endpoint::Occupancy => {
            let mut specs = common_features(2.0);
            specs.push(FeatureSpec::new(
                ENTRY_TIME_MINUTES,
                "Heure d'entrée",
                FeatureKind::TimeOfDay { step: 30.0 },
                720.0,
            ));
            specs.push(FeatureSpec::new(
                EXIT_TIME_MINUTES,
                "Heure de sortie",
                FeatureKind::TimeOfDay { step: 30.0 },
                900.0,
            ));
            specs
        }
        Endpoint::Cluster => vec![
            FeatureSpec::new(
                PARKING_DURATION,
                "Durée de stationnement",
                FeatureKind::Slider { min: 0.5, max: 8.0, step: 0.5 },
                2.0,
            )
            .unit("h"),
            FeatureSpec::new(
                PAYMENT_AMOUNT,
                "Montant payé",
                FeatureKind::Slider { min: 1.0, max: 40.0, step: 1.0 },
                10.0,
            )
            .unit("€"),
            FeatureSpec::new(
                USER_PARKING_HISTORY,
                "Historique d'utilisation",
                FeatureKind::Slider { min: 0.0, max: 50.0, step: 1.0 },
                5.0,
            ),
            FeatureSpec::new(
                PROXIMITY_TO_EXIT,
                "Distance à la sortie",
                FeatureKind::Slider { min: 1.0, max: 100.0, step: 1.0 },
                30.0,
            )
            .unit("m"),
        ],
    }
}

pub fn spec_for(endpoint: Endpoint, key: &str) -> Option<FeatureSpec> {
    catalog(endpoint).into_iter().find(|spec| spec.key == key)
}

pub fn label_for(key: &str) -> &str {
    match key {
        HOUR => "Heure d'arrivée",
        WEEKDAY => "Jour de la semaine",
        DAY => "Jour",
        IS_WEEKEND => "Jour de weekend",
        ELECTRIC_VEHICLE => "Véhicule électrique",
        RESERVED_STATUS => "Place réservée",
        USER_PARKING_HISTORY => "Historique utilisateur",
        PARKING_DURATION => "Durée de stationnement (h)",
        PAYMENT_AMOUNT => "Montant payé (€)",
        PROXIMITY_TO_EXIT => "Distance à la sortie (m)",
        WEATHER_TEMPERATURE => "Température (°C)",
        WEATHER_PRECIPITATION => "Précipitations",
        ENTRY_TIME_MINUTES => "Heure d'entrée",
        EXIT_TIME_MINUTES => "Heure de sortie",
        other => other,
    }
}

/// `570` -> `"09:30"`.
pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.clamp(0.0, MINUTES_PER_DAY) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Renders a feature value the way the scenario tables show it.
pub fn format_value(key: &str, value: f64) -> String {
    match key {
        WEEKDAY | DAY => WEEKDAY_NAMES
            .get(value as usize)
            .map(|name| name.to_string())
            .unwrap_or_else(|| value.to_string()),
        IS_WEEKEND | ELECTRIC_VEHICLE | RESERVED_STATUS => {
            if value == 1.0 { "Oui".into() } else { "Non".into() }
        }
        ENTRY_TIME_MINUTES | EXIT_TIME_MINUTES => format_minutes(value),
        PAYMENT_AMOUNT => format!("{} €", value),
        PROXIMITY_TO_EXIT => format!("{} m", value),
        PARKING_DURATION => format!("{} h", value),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_catalog_matches_request_keys() {
        let keys: Vec<_> = catalog(Endpoint::Cluster).iter().map(|s| s.key).collect();
        assert_eq!(keys, CLUSTER_FEATURES.to_vec());
    }

    #[test]
    fn defaults_follow_the_form_that_owns_them() {
        assert_eq!(spec_for(Endpoint::Duration, PARKING_DURATION).unwrap().default, 3.0);
        assert_eq!(spec_for(Endpoint::Occupancy, PARKING_DURATION).unwrap().default, 2.0);
        assert_eq!(spec_for(Endpoint::Occupancy, ENTRY_TIME_MINUTES).unwrap().default, 720.0);
        assert_eq!(spec_for(Endpoint::Cluster, PROXIMITY_TO_EXIT).unwrap().default, 30.0);
        assert!(spec_for(Endpoint::Cluster, HOUR).is_none());
    }

    #[test]
    fn formats_table_values() {
        assert_eq!(format_value(WEEKDAY, 5.0), "Samedi");
        assert_eq!(format_value(RESERVED_STATUS, 1.0), "Oui");
        assert_eq!(format_value(EXIT_TIME_MINUTES, 570.0), "09:30");
        assert_eq!(format_value(PAYMENT_AMOUNT, 7.5), "7.5 €");
        assert_eq!(format_value("Custom", 2.0), "2");
    }

    #[test]
    fn cluster_requirements_do_not_depend_on_advertised_lists() {
        let lists = FeatureLists::default();
        assert_eq!(lists.required_for(Endpoint::Cluster).len(), 4);
        assert!(lists.required_for(Endpoint::Duration).is_empty());
    }
}
