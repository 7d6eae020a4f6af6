/// One of the four behavioral archetypes returned by `/predict/cluster`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub characteristics: [(&'static str, &'static str); 3],
}

pub const CLUSTER_COUNT: usize = 4;

pub const CLUSTER_PROFILES: [ClusterProfile; CLUSTER_COUNT] = [
    ClusterProfile {
        name: "Court séjour économique",
        description: "Utilisateurs privilégiant des stationnements courts, payant peu et souvent éloignés des sorties.",
        color: "#2196f3",
        characteristics: [("Durée moyenne", "1-2 heures"), ("Budget", "Économique"), ("Fidélité", "Variable")],
    },
    ClusterProfile {
        name: "Longue durée premium",
        description: "Utilisateurs stationnant pour de longues durées, avec un budget plus important.",
        color: "#ff9800",
        characteristics: [("Durée moyenne", "5+ heures"), ("Budget", "Élevé"), ("Fidélité", "Moyenne")],
    },
    ClusterProfile {
        name: "Habitués fidèles",
        description: "Utilisateurs fréquents du parking, avec un historique de visites élevé.",
        color: "#4caf50",
        characteristics: [("Durée moyenne", "Variable"), ("Budget", "Moyen"), ("Fidélité", "Très élevée")],
    },
    ClusterProfile {
        name: "Proximité & confort",
        description: "Utilisateurs privilégiant les places proches des sorties, peu importe le coût.",
        color: "#e91e63",
        characteristics: [("Durée moyenne", "Variable"), ("Budget", "Élevé"), ("Fidélité", "Moyenne à élevée")],
    },
];

pub fn profile(index: usize) -> Option<&'static ClusterProfile> {
    CLUSTER_PROFILES.get(index)
}
