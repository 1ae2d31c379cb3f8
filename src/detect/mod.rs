//! Incident triage: typed feature snapshots and the rule cascade.

pub mod features;
pub mod rules;
pub mod scoring;

pub use features::FeatureSnapshot;
pub use rules::classify;

/// Severity levels for classified incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        write!(f, "{}", name)
    }
}

/// The closed set of incident categories the cascade can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum IncidentType {
    BadDeploy,
    MemoryLeak,
    TrafficSpike,
    Normal,
    Watch,
}

impl IncidentType {
    /// Severity is fixed per category, ordered by operational impact.
    pub fn severity(self) -> Severity {
        match self {
            IncidentType::BadDeploy => Severity::Critical,
            IncidentType::MemoryLeak => Severity::High,
            IncidentType::TrafficSpike => Severity::Medium,
            IncidentType::Normal => Severity::Low,
            IncidentType::Watch => Severity::Medium,
        }
    }

    /// One-line summary shown alongside the verdict.
    pub fn description(self) -> &'static str {
        match self {
            IncidentType::BadDeploy => "Deployment causing critical resource regression.",
            IncidentType::MemoryLeak => "Potential memory leak detected in service.",
            IncidentType::TrafficSpike => "Traffic surge detected (likely legitimate).",
            IncidentType::Normal => "All metrics within healthy ranges.",
            IncidentType::Watch => "Metrics showing signs of degradation.",
        }
    }

    /// A traffic spike is expected load, not an incident; everything else
    /// besides Normal counts as anomalous.
    pub fn is_anomaly(self) -> bool {
        !matches!(self, IncidentType::Normal | IncidentType::TrafficSpike)
    }
}

impl std::fmt::Display for IncidentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IncidentType::BadDeploy => "BadDeploy",
            IncidentType::MemoryLeak => "MemoryLeak",
            IncidentType::TrafficSpike => "TrafficSpike",
            IncidentType::Normal => "Normal",
            IncidentType::Watch => "Watch",
        };
        write!(f, "{}", name)
    }
}

/// A classified verdict with the evidence that triggered it.
///
/// Transient value owned by the caller; the classifier holds no state
/// between invocations.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Verdict {
    pub incident_type: IncidentType,
    pub severity: Severity,
    /// Bounded heuristic score in [0, 1], not a calibrated probability.
    pub confidence: f64,
    /// Ordered, never empty: one human-readable line per fired predicate.
    pub indicators: Vec<String>,
    pub description: String,
}

impl Verdict {
    pub fn new(incident_type: IncidentType, confidence: f64, indicators: Vec<String>) -> Self {
        Self {
            severity: incident_type.severity(),
            description: incident_type.description().to_string(),
            incident_type,
            confidence,
            indicators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_per_type() {
        assert_eq!(IncidentType::BadDeploy.severity(), Severity::Critical);
        assert_eq!(IncidentType::MemoryLeak.severity(), Severity::High);
        assert_eq!(IncidentType::TrafficSpike.severity(), Severity::Medium);
        assert_eq!(IncidentType::Normal.severity(), Severity::Low);
        assert_eq!(IncidentType::Watch.severity(), Severity::Medium);
    }

    #[test]
    fn test_anomaly_split() {
        assert!(IncidentType::BadDeploy.is_anomaly());
        assert!(IncidentType::MemoryLeak.is_anomaly());
        assert!(IncidentType::Watch.is_anomaly());
        assert!(!IncidentType::Normal.is_anomaly());
        assert!(!IncidentType::TrafficSpike.is_anomaly());
    }
}
