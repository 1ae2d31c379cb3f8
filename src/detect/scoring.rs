//! Anomaly scoring over classified verdicts.
//!
//! Maps a verdict to a coarse anomaly score for dashboards that want a
//! single dial instead of the full indicator list. A fixed table, not a
//! model: traffic spikes and healthy snapshots sit at the floor.

use serde::Serialize;

use super::{classify, FeatureSnapshot, IncidentType, Severity, Verdict};

/// Heuristic weight per incident type used to scale the anomaly score.
fn anomaly_weight(incident_type: IncidentType) -> f64 {
    match incident_type {
        IncidentType::BadDeploy => 0.9,
        IncidentType::MemoryLeak => 0.8,
        IncidentType::Watch => 0.6,
        IncidentType::TrafficSpike => 0.3,
        IncidentType::Normal => 0.1,
    }
}

/// Coarse anomaly signal derived from a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyAssessment {
    pub anomaly_score: f64,
    pub is_anomaly: bool,
}

pub fn assess(verdict: &Verdict) -> AnomalyAssessment {
    let is_anomaly = verdict.incident_type.is_anomaly();
    let anomaly_score = if is_anomaly {
        (0.5 + anomaly_weight(verdict.incident_type) * 0.5).min(0.95)
    } else {
        0.3
    };
    AnomalyAssessment {
        anomaly_score,
        is_anomaly,
    }
}

/// One report row: the snapshot, its verdict, and the derived anomaly
/// signal. Score and confidence are rounded to two decimals for wire and
/// report use; the raw `Verdict` keeps full precision.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub anomaly_score: f64,
    pub is_anomaly: bool,
    pub incident_type: IncidentType,
    pub severity: Severity,
    pub confidence: f64,
    pub indicators: Vec<String>,
    pub description: String,
    pub features: FeatureSnapshot,
}

/// Classify a snapshot and fold in the anomaly assessment.
pub fn predict(snapshot: FeatureSnapshot) -> Prediction {
    let verdict = classify(&snapshot);
    let assessment = assess(&verdict);
    Prediction {
        anomaly_score: round2(assessment.anomaly_score),
        is_anomaly: assessment.is_anomaly,
        incident_type: verdict.incident_type,
        severity: verdict.severity,
        confidence: round2(verdict.confidence),
        indicators: verdict.indicators,
        description: verdict.description,
        features: snapshot,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
