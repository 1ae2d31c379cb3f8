use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One aggregated measurement window summarized into a fixed set of scalar
/// metrics, as produced by an upstream telemetry aggregator.
///
/// Every field has a declared default so a sparse payload always yields a
/// usable snapshot; `unit_economics_ratio` is the single field whose default
/// is not zero (1.0 -- break-even), which changes which predicates can fire
/// when the key is absent. Unknown keys in incoming payloads are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSnapshot {
    /// Average CPU utilization percentage over the window.
    pub mean_cpu: f64,
    /// Dispersion measure of CPU utilization.
    pub cpu_volatility: f64,
    /// Cost-efficiency ratio; >1 favorable, <1 unfavorable.
    pub unit_economics_ratio: f64,
    /// Count of abrupt request-rate spikes detected in the window.
    #[serde(deserialize_with = "spike_count")]
    pub request_spike_count: u32,
    /// Slope/sign of the memory usage trend.
    pub memory_trend: f64,
    /// Average memory utilization percentage over the window.
    pub mean_memory: f64,
    /// Average request rate.
    pub mean_requests: f64,
    /// Change in throughput vs. baseline.
    pub throughput_delta: f64,

    // Advisory fields from the upstream aggregator schema. The cascade never
    // reads them; they are carried through to reports untouched.
    pub std_cpu: f64,
    pub min_cpu: f64,
    pub max_cpu: f64,
    pub delta_cpu: f64,
    pub cpu_trend: f64,
    pub std_memory: f64,
    pub cost_delta: f64,
}

impl Default for FeatureSnapshot {
    fn default() -> Self {
        Self {
            mean_cpu: 0.0,
            cpu_volatility: 0.0,
            unit_economics_ratio: 1.0,
            request_spike_count: 0,
            memory_trend: 0.0,
            mean_memory: 0.0,
            mean_requests: 0.0,
            throughput_delta: 0.0,
            std_cpu: 0.0,
            min_cpu: 0.0,
            max_cpu: 0.0,
            delta_cpu: 0.0,
            cpu_trend: 0.0,
            std_memory: 0.0,
            cost_delta: 0.0,
        }
    }
}

/// Upstream collectors report spike counts as plain numbers, sometimes
/// fractional. Floor and clamp at zero rather than reject.
fn spike_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.max(0.0) as u32)
}

impl FeatureSnapshot {
    /// Build a snapshot from a name/value map. Total: missing keys take
    /// their declared defaults, unknown keys are ignored.
    pub fn from_map(map: &HashMap<String, f64>) -> Self {
        let val = |key: &str, default: f64| map.get(key).copied().unwrap_or(default);

        Self {
            mean_cpu: val("mean_cpu", 0.0),
            cpu_volatility: val("cpu_volatility", 0.0),
            unit_economics_ratio: val("unit_economics_ratio", 1.0),
            request_spike_count: val("request_spike_count", 0.0).max(0.0) as u32,
            memory_trend: val("memory_trend", 0.0),
            mean_memory: val("mean_memory", 0.0),
            mean_requests: val("mean_requests", 0.0),
            throughput_delta: val("throughput_delta", 0.0),
            std_cpu: val("std_cpu", 0.0),
            min_cpu: val("min_cpu", 0.0),
            max_cpu: val("max_cpu", 0.0),
            delta_cpu: val("delta_cpu", 0.0),
            cpu_trend: val("cpu_trend", 0.0),
            std_memory: val("std_memory", 0.0),
            cost_delta: val("cost_delta", 0.0),
        }
    }
}
