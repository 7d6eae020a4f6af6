use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Prediction target exposed by the remote service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Endpoint {
    Duration,
    Occupancy,
    Cluster,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Duration => "/predict/duration",
            Endpoint::Occupancy => "/predict/occupancy",
            Endpoint::Cluster => "/predict/cluster",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Duration => "Durée de stationnement",
            Endpoint::Occupancy => "Occupation des places",
            Endpoint::Cluster => "Profil comportemental",
        }
    }

    /// Message shown when the service failed without an `error` body.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Endpoint::Duration => "Une erreur est survenue lors de la prédiction de la durée.",
            Endpoint::Occupancy => "Une erreur est survenue lors de la prédiction de l'occupation.",
            Endpoint::Cluster => "Une erreur est survenue lors de la prédiction du cluster.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn names_round_trip_through_strum() {
        for endpoint in Endpoint::iter() {
            let name = endpoint.to_string();
            assert_eq!(Endpoint::from_str(&name).unwrap(), endpoint);
            assert!(endpoint.path().ends_with(&name));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(Endpoint::from_str("parking").is_err());
    }
}
