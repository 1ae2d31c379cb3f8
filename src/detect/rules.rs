//! The ordered rule cascade.
//!
//! Rules are evaluated in order of decreasing operational severity, so a
//! snapshot matching several categories is classified as the worse one.
//! Each rule is an independent evaluator returning `Option<Verdict>`; the
//! terminal `watch` rule always matches, making `classify` total over all
//! possible snapshots.

use super::{FeatureSnapshot, IncidentType, Verdict};

type Rule = fn(&FeatureSnapshot) -> Option<Verdict>;

/// First-match-wins order. `watch` is not listed: it is the guaranteed
/// fallback applied when nothing here fires.
const CASCADE: &[Rule] = &[bad_deploy, memory_leak, traffic_spike, normal];

/// Classify one telemetry snapshot. Pure and total: never fails, holds no
/// state, and identical input always yields an identical verdict.
pub fn classify(snapshot: &FeatureSnapshot) -> Verdict {
    CASCADE
        .iter()
        .find_map(|rule| rule(snapshot))
        .unwrap_or_else(|| watch(snapshot))
}

/// Count-based confidence: 0.7 base plus 0.1 per fired indicator, capped
/// below 1.0 because this is a heuristic, not a calibrated probability.
fn scaled_confidence(fired: usize, cap: f64) -> f64 {
    (0.7 + 0.1 * fired as f64).min(cap)
}

fn bad_deploy(f: &FeatureSnapshot) -> Option<Verdict> {
    let mut indicators = Vec::new();
    if f.mean_cpu > 80.0 {
        indicators.push(format!("High CPU usage ({:.1}% > 80%)", f.mean_cpu));
    }
    if f.cpu_volatility > 1.0 {
        indicators.push(format!(
            "Elevated CPU volatility ({:.1} > 1.0)",
            f.cpu_volatility
        ));
    }
    if f.unit_economics_ratio < 1.0 {
        indicators.push(format!(
            "Concerning unit economics (ratio: {:.1} < 1.0)",
            f.unit_economics_ratio
        ));
    }
    if f.request_spike_count > 5 {
        indicators.push(format!(
            "High request spikes detected ({})",
            f.request_spike_count
        ));
    }

    if indicators.len() < 2 {
        return None;
    }
    let confidence = scaled_confidence(indicators.len(), 0.95);
    Some(Verdict::new(IncidentType::BadDeploy, confidence, indicators))
}

fn memory_leak(f: &FeatureSnapshot) -> Option<Verdict> {
    let mut indicators = Vec::new();
    if f.memory_trend > 0.8 {
        indicators.push(format!("Memory trend increasing ({:.1} > 0.8)", f.memory_trend));
    }
    if f.mean_memory > 65.0 {
        indicators.push(format!("Elevated memory usage ({:.1}% > 65%)", f.mean_memory));
    }
    if f.request_spike_count > 0 {
        indicators.push(format!("Request spikes detected ({})", f.request_spike_count));
    }

    if indicators.len() < 2 {
        return None;
    }
    let confidence = scaled_confidence(indicators.len(), 0.9);
    Some(Verdict::new(IncidentType::MemoryLeak, confidence, indicators))
}

fn traffic_spike(f: &FeatureSnapshot) -> Option<Verdict> {
    let mut indicators = Vec::new();
    if f.mean_requests > 2000.0 {
        indicators.push(format!("High request count ({:.0} > 2000)", f.mean_requests));
    }
    if f.throughput_delta > 200.0 {
        indicators.push(format!(
            "Elevated throughput delta ({:.0} > 200)",
            f.throughput_delta
        ));
    }
    if f.unit_economics_ratio > 1.2 {
        indicators.push(format!(
            "Healthy unit economics (ratio: {:.1} > 1.2)",
            f.unit_economics_ratio
        ));
    }

    if indicators.len() < 2 {
        return None;
    }
    // Confidence counts the threshold predicates only; the fixed annotation
    // below is displayed but never scored.
    let confidence = scaled_confidence(indicators.len(), 0.9);
    indicators.push("Legitimate traffic pattern".to_string());
    Some(Verdict::new(IncidentType::TrafficSpike, confidence, indicators))
}

fn normal(f: &FeatureSnapshot) -> Option<Verdict> {
    // AND semantics, unlike the count-based rules above: every condition
    // must hold, and all four comparison strings are reported.
    let conditions = [
        (f.mean_cpu < 70.0, format!("CPU ({:.1}%) < 70%", f.mean_cpu)),
        (f.mean_memory < 70.0, format!("Memory ({:.1}%) < 70%", f.mean_memory)),
        (
            f.unit_economics_ratio >= 1.0,
            format!("Unit economics ({:.1}) >= 1.0", f.unit_economics_ratio),
        ),
        (
            f.request_spike_count <= 5,
            format!("Spikes ({}) <= 5", f.request_spike_count),
        ),
    ];

    if !conditions.iter().all(|(met, _)| *met) {
        return None;
    }
    let indicators = conditions.into_iter().map(|(_, desc)| desc).collect();
    Some(Verdict::new(IncidentType::Normal, 0.9, indicators))
}

/// Terminal rule: always produces a verdict. The heading is always present,
/// so the indicator list is non-empty even when no single metric stands out.
fn watch(f: &FeatureSnapshot) -> Verdict {
    let mut indicators = vec!["Potential issues detected:".to_string()];
    if f.mean_cpu > 70.0 {
        indicators.push(format!("Elevated CPU ({:.1}%)", f.mean_cpu));
    }
    if f.mean_memory > 65.0 {
        indicators.push(format!("Elevated Memory ({:.1}%)", f.mean_memory));
    }
    if f.unit_economics_ratio < 1.0 {
        indicators.push(format!("Bad Unit Economics ({:.1})", f.unit_economics_ratio));
    }
    Verdict::new(IncidentType::Watch, 0.6, indicators)
}

#[cfg(test)]
mod tests {
    use super::super::Severity;
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_snapshot_is_normal() {
        // All defaults pass the Normal gate: cpu 0 < 70, memory 0 < 70,
        // ratio 1.0 >= 1.0, spikes 0 <= 5.
        let verdict = classify(&FeatureSnapshot::default());
        assert_eq!(verdict.incident_type, IncidentType::Normal);
        assert_eq!(verdict.severity, Severity::Low);
        assert!(approx(verdict.confidence, 0.9));
        assert_eq!(
            verdict.indicators,
            vec![
                "CPU (0.0%) < 70%",
                "Memory (0.0%) < 70%",
                "Unit economics (1.0) >= 1.0",
                "Spikes (0) <= 5",
            ]
        );
        assert_eq!(verdict.description, "All metrics within healthy ranges.");
    }

    #[test]
    fn test_bad_deploy_three_indicators_hits_cap() {
        let snap = FeatureSnapshot {
            mean_cpu: 85.0,
            cpu_volatility: 1.2,
            unit_economics_ratio: 0.8,
            request_spike_count: 1,
            ..FeatureSnapshot::default()
        };
        let verdict = classify(&snap);
        assert_eq!(verdict.incident_type, IncidentType::BadDeploy);
        assert_eq!(verdict.severity, Severity::Critical);
        // 0.7 + 0.1*3 = 1.0, capped to 0.95.
        assert!(approx(verdict.confidence, 0.95));
        assert_eq!(verdict.indicators.len(), 3);
        assert_eq!(verdict.indicators[0], "High CPU usage (85.0% > 80%)");
        assert_eq!(verdict.indicators[1], "Elevated CPU volatility (1.2 > 1.0)");
        assert_eq!(
            verdict.indicators[2],
            "Concerning unit economics (ratio: 0.8 < 1.0)"
        );
    }

    #[test]
    fn test_bad_deploy_two_indicators_is_enough() {
        let snap = FeatureSnapshot {
            mean_cpu: 85.0,
            unit_economics_ratio: 0.8,
            ..FeatureSnapshot::default()
        };
        let verdict = classify(&snap);
        assert_eq!(verdict.incident_type, IncidentType::BadDeploy);
        assert!(approx(verdict.confidence, 0.9));
        assert_eq!(verdict.indicators.len(), 2);
    }

    #[test]
    fn test_bad_deploy_spike_indicator_uses_count() {
        let snap = FeatureSnapshot {
            mean_cpu: 90.0,
            request_spike_count: 8,
            ..FeatureSnapshot::default()
        };
        // ratio defaults to 1.0, so only cpu + spikes fire -- still two.
        let verdict = classify(&snap);
        assert_eq!(verdict.incident_type, IncidentType::BadDeploy);
        assert!(verdict
            .indicators
            .contains(&"High request spikes detected (8)".to_string()));
    }

    #[test]
    fn test_lone_high_cpu_falls_through_to_watch() {
        let snap = FeatureSnapshot {
            mean_cpu: 85.0,
            ..FeatureSnapshot::default()
        };
        let verdict = classify(&snap);
        assert_eq!(verdict.incident_type, IncidentType::Watch);
        assert_eq!(verdict.severity, Severity::Medium);
        assert!(approx(verdict.confidence, 0.6));
        assert_eq!(
            verdict.indicators,
            vec!["Potential issues detected:", "Elevated CPU (85.0%)"]
        );
    }

    #[test]
    fn test_memory_leak_two_of_three() {
        let snap = FeatureSnapshot {
            memory_trend: 1.1,
            mean_memory: 78.0,
            ..FeatureSnapshot::default()
        };
        let verdict = classify(&snap);
        assert_eq!(verdict.incident_type, IncidentType::MemoryLeak);
        assert_eq!(verdict.severity, Severity::High);
        assert!(approx(verdict.confidence, 0.9));
        assert_eq!(
            verdict.indicators,
            vec![
                "Memory trend increasing (1.1 > 0.8)",
                "Elevated memory usage (78.0% > 65%)",
            ]
        );
    }

    #[test]
    fn test_memory_leak_single_indicator_does_not_fire() {
        let snap = FeatureSnapshot {
            memory_trend: 1.1,
            ..FeatureSnapshot::default()
        };
        let verdict = classify(&snap);
        assert_ne!(verdict.incident_type, IncidentType::MemoryLeak);
    }

    #[test]
    fn test_traffic_spike_appends_annotation_without_scoring_it() {
        let snap = FeatureSnapshot {
            mean_requests: 3200.0,
            throughput_delta: 400.0,
            ..FeatureSnapshot::default()
        };
        let verdict = classify(&snap);
        assert_eq!(verdict.incident_type, IncidentType::TrafficSpike);
        assert_eq!(verdict.severity, Severity::Medium);
        // Two predicates fired; the annotation is displayed but not counted.
        assert!(approx(verdict.confidence, 0.9));
        assert_eq!(
            verdict.indicators,
            vec![
                "High request count (3200 > 2000)",
                "Elevated throughput delta (400 > 200)",
                "Legitimate traffic pattern",
            ]
        );
    }

    #[test]
    fn test_traffic_spike_all_three_predicates() {
        let snap = FeatureSnapshot {
            mean_requests: 2500.0,
            throughput_delta: 300.0,
            unit_economics_ratio: 1.4,
            ..FeatureSnapshot::default()
        };
        let verdict = classify(&snap);
        assert_eq!(verdict.incident_type, IncidentType::TrafficSpike);
        assert!(approx(verdict.confidence, 0.9)); // min(0.9, 0.7 + 0.3)
        assert_eq!(verdict.indicators.len(), 4);
        assert_eq!(verdict.indicators[3], "Legitimate traffic pattern");
    }

    #[test]
    fn test_cascade_prefers_worse_category() {
        // Fires both BadDeploy (cpu + ratio) and MemoryLeak (memory + spikes);
        // the cascade must report the more severe one.
        let snap = FeatureSnapshot {
            mean_cpu: 92.0,
            unit_economics_ratio: 0.7,
            mean_memory: 80.0,
            memory_trend: 1.0,
            request_spike_count: 2,
            ..FeatureSnapshot::default()
        };
        let verdict = classify(&snap);
        assert_eq!(verdict.incident_type, IncidentType::BadDeploy);
    }

    #[test]
    fn test_watch_with_heading_only() {
        // Spikes alone break the Normal gate but trip none of the Watch
        // metrics, so the verdict carries just the heading.
        let snap = FeatureSnapshot {
            request_spike_count: 6,
            ..FeatureSnapshot::default()
        };
        let verdict = classify(&snap);
        assert_eq!(verdict.incident_type, IncidentType::Watch);
        assert_eq!(verdict.indicators, vec!["Potential issues detected:"]);
    }

    #[test]
    fn test_watch_collects_all_concerning_metrics() {
        let snap = FeatureSnapshot {
            mean_cpu: 75.0,
            mean_memory: 66.0,
            unit_economics_ratio: 0.9,
            memory_trend: 0.5,
            ..FeatureSnapshot::default()
        };
        // BadDeploy: only ratio fires. MemoryLeak: only memory fires.
        // TrafficSpike: nothing. Normal: cpu too high. Watch it is.
        let verdict = classify(&snap);
        assert_eq!(verdict.incident_type, IncidentType::Watch);
        assert_eq!(
            verdict.indicators,
            vec![
                "Potential issues detected:",
                "Elevated CPU (75.0%)",
                "Elevated Memory (66.0%)",
                "Bad Unit Economics (0.9)",
            ]
        );
    }

    #[test]
    fn test_classify_is_pure() {
        let snap = FeatureSnapshot {
            mean_cpu: 85.0,
            unit_economics_ratio: 0.8,
            ..FeatureSnapshot::default()
        };
        assert_eq!(classify(&snap), classify(&snap));
    }
}
