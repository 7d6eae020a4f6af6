use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::features::*;
use crate::form::derive_fields;

/// Feature name to numeric value. Key order carries no meaning; the sorted map
/// only keeps serialization deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioInput(BTreeMap<String, f64>);

impl ScenarioInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Required keys that are absent or not finite.
    pub fn missing<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        required
            .iter()
            .map(AsRef::as_ref)
            .filter(|key| !self.get(key).is_some_and(f64::is_finite))
            .map(str::to_string)
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ScenarioInput {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub input: ScenarioInput,
}

impl Scenario {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input: ScenarioInput) -> Self {
        Self { name: name.into(), description: description.into(), input }
    }
}

fn input(pairs: &[(&str, f64)]) -> ScenarioInput {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

/// Predefined scenarios used by the test panels.
pub fn fixed_scenarios(endpoint: Endpoint) -> Vec<Scenario> {
    match endpoint {
        Endpoint::Duration => duration_scenarios(),
        Endpoint::Occupancy => occupancy_scenarios(),
        Endpoint::Cluster => cluster_scenarios(),
    }
}

#[allow(clippy::too_many_arguments)]
fn duration_row(
    hour: f64,
    weekday: f64,
    weekend: f64,
    ev: f64,
    reserved: f64,
    history: f64,
    duration: f64,
    payment: f64,
    proximity: f64,
    temperature: f64,
    precipitation: f64,
) -> ScenarioInput {
    input(&[
        (HOUR, hour),
        (WEEKDAY, weekday),
        // legacy key still read by some deployed regression models
        (DAY, weekday),
        (IS_WEEKEND, weekend),
        (ELECTRIC_VEHICLE, ev),
        (RESERVED_STATUS, reserved),
        (USER_PARKING_HISTORY, history),
        (PARKING_DURATION, duration),
        (PAYMENT_AMOUNT, payment),
        (PROXIMITY_TO_EXIT, proximity),
        (WEATHER_TEMPERATURE, temperature),
        (WEATHER_PRECIPITATION, precipitation),
    ])
}

fn duration_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "Jour de semaine - Bureau",
            "Un jour de semaine typique pour un travailleur de bureau",
            duration_row(9.0, 2.0, 0.0, 0.0, 1.0, 15.0, 5.0, 15.0, 30.0, 22.0, 0.0),
        ),
        Scenario::new(
            "Shopping weekend",
            "Shopping du weekend, après-midi",
            duration_row(14.0, 6.0, 1.0, 0.0, 0.0, 3.0, 3.0, 8.0, 15.0, 24.0, 0.0),
        ),
        Scenario::new(
            "Soirée en semaine",
            "Sortie en soirée pendant la semaine",
            duration_row(19.0, 4.0, 0.0, 0.0, 0.0, 2.0, 3.0, 6.0, 20.0, 18.0, 1.0),
        ),
        Scenario::new(
            "Véhicule électrique - longue durée",
            "Véhicule électrique nécessitant une recharge complète",
            duration_row(10.0, 3.0, 0.0, 1.0, 1.0, 8.0, 8.0, 25.0, 40.0, 20.0, 0.0),
        ),
        Scenario::new(
            "Journée pluvieuse",
            "Jour pluvieux avec précipitations importantes",
            duration_row(12.0, 5.0, 0.0, 0.0, 0.0, 1.0, 1.0, 4.0, 10.0, 14.0, 3.0),
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn occupancy_row(
    hour: f64,
    weekday: f64,
    weekend: f64,
    duration: f64,
    ev: f64,
    reserved: f64,
    entry: f64,
    exit: f64,
    history: f64,
    payment: f64,
    proximity: f64,
) -> ScenarioInput {
    input(&[
        (HOUR, hour),
        (WEEKDAY, weekday),
        (IS_WEEKEND, weekend),
        (PARKING_DURATION, duration),
        (ELECTRIC_VEHICLE, ev),
        (RESERVED_STATUS, reserved),
        (ENTRY_TIME_MINUTES, entry),
        (EXIT_TIME_MINUTES, exit),
        (USER_PARKING_HISTORY, history),
        (PAYMENT_AMOUNT, payment),
        (PROXIMITY_TO_EXIT, proximity),
    ])
}

fn occupancy_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "Scénario 1: Jour de semaine, matin",
            "Un usager régulier se gare en semaine pour une courte durée le matin.",
            occupancy_row(9.0, 2.0, 0.0, 1.5, 0.0, 0.0, 540.0, 630.0, 3.0, 5.0, 15.0),
        ),
        Scenario::new(
            "Scénario 2: Weekend, longue durée",
            "Stationnement de longue durée pendant le weekend, usager occasionnel.",
            occupancy_row(14.0, 6.0, 1.0, 5.0, 0.0, 0.0, 840.0, 1140.0, 1.0, 15.0, 45.0),
        ),
        Scenario::new(
            "Scénario 3: Véhicule électrique",
            "Un véhicule électrique stationné près de la sortie, appartenant à un usager très régulier.",
            occupancy_row(17.0, 4.0, 0.0, 2.5, 1.0, 0.0, 1020.0, 1170.0, 10.0, 7.5, 5.0),
        ),
        Scenario::new(
            "Scénario 4: Place réservée, soirée",
            "Stationnement de nuit dans une place réservée, par un abonné fidèle.",
            occupancy_row(20.0, 5.0, 1.0, 8.0, 0.0, 1.0, 1200.0, 1680.0, 25.0, 25.0, 30.0),
        ),
        Scenario::new(
            "Scénario 5: Profil Premium",
            "Client premium fidèle avec un véhicule électrique, se gare près de la sortie.",
            occupancy_row(10.0, 3.0, 0.0, 2.0, 1.0, 1.0, 600.0, 720.0, 30.0, 20.0, 5.0),
        ),
        Scenario::new(
            "Scénario 6: Usager économique",
            "Usager occasionnel, stationnement court et économique loin de la sortie.",
            occupancy_row(7.0, 1.0, 0.0, 0.5, 0.0, 0.0, 420.0, 450.0, 2.0, 2.0, 80.0),
        ),
    ]
}

fn cluster_row(duration: f64, payment: f64, history: f64, proximity: f64) -> ScenarioInput {
    input(&[
        (PARKING_DURATION, duration),
        (PAYMENT_AMOUNT, payment),
        (USER_PARKING_HISTORY, history),
        (PROXIMITY_TO_EXIT, proximity),
    ])
}

fn cluster_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "Client Premium",
            "Client fidèle avec stationnement proche des sorties et dépensant beaucoup.",
            cluster_row(3.0, 25.0, 30.0, 5.0),
        ),
        Scenario::new(
            "Utilisateur Occasionnel",
            "Client occasionnel avec stationnement court et économique.",
            cluster_row(1.0, 5.0, 2.0, 75.0),
        ),
        Scenario::new(
            "Séjour Longue Durée",
            "Client qui stationne pour une longue durée avec un budget conséquent.",
            cluster_row(7.0, 35.0, 8.0, 40.0),
        ),
        Scenario::new(
            "Utilisateur Régulier",
            "Client régulier avec stationnement modéré et tarif standard.",
            cluster_row(2.0, 10.0, 15.0, 30.0),
        ),
    ]
}

fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> f64 {
    if rng.gen_bool(probability) { 1.0 } else { 0.0 }
}

/// Random input for `endpoint`, consistent with the derived-field rules.
pub fn random_input<R: Rng + ?Sized>(endpoint: Endpoint, rng: &mut R) -> ScenarioInput {
    let mut input = match endpoint {
        Endpoint::Cluster => cluster_row(
            (rng.gen_range(0.5..8.0_f64) * 2.0).round() / 2.0,
            rng.gen_range(1..=40) as f64,
            rng.gen_range(0..50) as f64,
            rng.gen_range(1..=100) as f64,
        ),
        Endpoint::Occupancy | Endpoint::Duration => {
            let weekday = rng.gen_range(0..7) as f64;
            let mut input = ScenarioInput::new()
                .with(HOUR, rng.gen_range(0..24) as f64)
                .with(WEEKDAY, weekday)
                .with(IS_WEEKEND, chance(rng, 0.3))
                .with(PARKING_DURATION, rng.gen_range(0.5..8.5))
                .with(ELECTRIC_VEHICLE, chance(rng, 0.2))
                .with(RESERVED_STATUS, chance(rng, 0.3))
                .with(USER_PARKING_HISTORY, rng.gen_range(0..50) as f64)
                .with(PAYMENT_AMOUNT, (rng.gen_range(0.0..30.0_f64) * 10.0).round() / 10.0)
                .with(PROXIMITY_TO_EXIT, rng.gen_range(1..=100) as f64);
            if endpoint == Endpoint::Occupancy {
                input.set(ENTRY_TIME_MINUTES, rng.gen_range(0..1440) as f64);
                input.set(EXIT_TIME_MINUTES, rng.gen_range(0..1440) as f64);
            } else {
                input.set(DAY, weekday);
                input.set(WEATHER_TEMPERATURE, rng.gen_range(-10..=40) as f64);
                input.set(WEATHER_PRECIPITATION, rng.gen_range(0..=3) as f64);
            }
            input
        }
    };

    let keys: Vec<String> = input.keys().map(str::to_string).collect();
    derive_fields(&mut input, WEEKDAY, &keys);
    derive_fields(&mut input, ENTRY_TIME_MINUTES, &keys);
    input
}

pub fn random_scenarios<R: Rng + ?Sized>(endpoint: Endpoint, count: usize, rng: &mut R) -> Vec<Scenario> {
    (1..=count)
        .map(|i| {
            Scenario::new(
                format!("Test aléatoire #{}", i),
                "Paramètres générés aléatoirement pour tester le modèle avec des données imprévisibles.",
                random_input(endpoint, rng),
            )
        })
        .collect()
}
