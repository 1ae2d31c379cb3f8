//! Synthetic telemetry generation for demos and test fixtures.
//!
//! Produces feature snapshots that are likely -- not guaranteed -- to route
//! through a specific classifier branch. The ranges deliberately straddle
//! the cascade thresholds, so callers asserting on routing must either fix
//! the seed or assert on tendency. The random source is always injected;
//! there is no implicit global generator.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::detect::FeatureSnapshot;

/// The four archetypal scenarios the generator can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    BadDeploy,
    MemoryLeak,
    TrafficSpike,
    Normal,
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scenario::BadDeploy => "BadDeploy",
            Scenario::MemoryLeak => "MemoryLeak",
            Scenario::TrafficSpike => "TrafficSpike",
            Scenario::Normal => "Normal",
        };
        write!(f, "{}", name)
    }
}

impl Scenario {
    /// Weighted pick from one uniform draw in [0, 1):
    /// 25% BadDeploy, 25% MemoryLeak, 20% TrafficSpike, 30% Normal.
    pub fn sample(rng: &mut impl Rng) -> Self {
        let s: f64 = rng.gen();
        if s < 0.25 {
            Scenario::BadDeploy
        } else if s < 0.5 {
            Scenario::MemoryLeak
        } else if s < 0.7 {
            Scenario::TrafficSpike
        } else {
            Scenario::Normal
        }
    }

    /// Populate the subset of features relevant to this scenario, each drawn
    /// uniformly from its archetype range. Everything else stays at the
    /// snapshot defaults. Integer counts are floored uniform draws.
    pub fn generate(self, rng: &mut impl Rng) -> FeatureSnapshot {
        let mut snap = FeatureSnapshot::default();
        match self {
            Scenario::BadDeploy => {
                snap.mean_cpu = rng.gen_range(75.0..95.0);
                snap.std_cpu = rng.gen_range(2.0..5.0);
                snap.min_cpu = rng.gen_range(70.0..80.0);
                snap.max_cpu = rng.gen_range(90.0..100.0);
                snap.cpu_volatility = rng.gen_range(0.8..1.5);
                snap.mean_memory = rng.gen_range(40.0..60.0);
                snap.unit_economics_ratio = rng.gen_range(0.5..0.9);
                snap.request_spike_count = rng.gen_range(4.0..10.0) as u32;
                snap.mean_requests = rng.gen_range(500.0..1000.0);
            }
            Scenario::MemoryLeak => {
                snap.mean_cpu = rng.gen_range(40.0..60.0);
                snap.mean_memory = rng.gen_range(70.0..90.0);
                snap.memory_trend = rng.gen_range(0.7..1.2);
                snap.std_memory = rng.gen_range(5.0..15.0);
                snap.request_spike_count = rng.gen_range(0.0..3.0) as u32;
                snap.unit_economics_ratio = rng.gen_range(0.9..1.1);
            }
            Scenario::TrafficSpike => {
                snap.mean_cpu = rng.gen_range(60.0..80.0);
                snap.mean_requests = rng.gen_range(2500.0..4000.0);
                snap.throughput_delta = rng.gen_range(250.0..500.0);
                snap.unit_economics_ratio = rng.gen_range(1.1..1.5);
                snap.request_spike_count = rng.gen_range(0.0..2.0) as u32;
                snap.mean_memory = rng.gen_range(50.0..70.0);
            }
            Scenario::Normal => {
                snap.mean_cpu = rng.gen_range(30.0..60.0);
                snap.mean_memory = rng.gen_range(40.0..60.0);
                snap.unit_economics_ratio = rng.gen_range(1.1..1.3);
                snap.request_spike_count = rng.gen_range(0.0..3.0) as u32;
                snap.mean_requests = rng.gen_range(800.0..1500.0);
            }
        }
        snap
    }
}

/// Generate one snapshot and report which scenario produced it.
pub fn generate_labeled(rng: &mut impl Rng) -> (Scenario, FeatureSnapshot) {
    let scenario = Scenario::sample(rng);
    let snapshot = scenario.generate(rng);
    (scenario, snapshot)
}

/// Generate one snapshot, scenario unlabeled. Suitable for direct chaining
/// into the classifier.
pub fn generate_telemetry(rng: &mut impl Rng) -> FeatureSnapshot {
    generate_labeled(rng).1
}
