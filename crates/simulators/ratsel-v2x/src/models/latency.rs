use serde::Deserialize;

use ratsel_core::metrics::{Bytes, Latency};
use ratsel_models::dist::JitterSampler;
use ratsel_models::net::profiles::{AccessKind, RadioProfile};

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct LatencySettings {
    #[serde(default = "default_propagation_ms_per_m")]
    pub propagation_ms_per_m: f64,
    #[serde(default = "default_processing_ms_per_kb")]
    pub processing_ms_per_kb: f64,
    #[serde(default = "default_jitter_spread_ms")]
    pub jitter_spread_ms: f64,
}

fn default_propagation_ms_per_m() -> f64 {
    0.0033
}

fn default_processing_ms_per_kb() -> f64 {
    1.0
}

fn default_jitter_spread_ms() -> f64 {
    5.0
}

impl Default for LatencySettings {
    fn default() -> Self {
        Self {
            propagation_ms_per_m: default_propagation_ms_per_m(),
            processing_ms_per_kb: default_processing_ms_per_kb(),
            jitter_spread_ms: default_jitter_spread_ms(),
        }
    }
}

/// End-to-end delay model. The RAT's base latency plus propagation, payload
/// processing, an access-kind overhead and symmetric jitter, floored at 1 ms.
#[derive(Debug, Clone)]
pub struct LatencyModel {
    settings: LatencySettings,
    jitter: JitterSampler,
}

impl LatencyModel {
    pub fn with_settings(settings: LatencySettings, seed: u64) -> Self {
        let jitter = JitterSampler::new(seed, settings.jitter_spread_ms);
        Self { settings, jitter }
    }

    pub fn measure(
        &mut self,
        profile: &RadioProfile,
        access: AccessKind,
        distance: f64,
        payload: Bytes,
    ) -> Latency {
        let propagation = distance * self.settings.propagation_ms_per_m;
        let processing = payload.as_f64() / 1000.0 * self.settings.processing_ms_per_kb;
        let overhead = Self::access_overhead(access);
        let total = profile.latency_ms + propagation + processing + overhead + self.jitter.sample();
        Latency::new(total.max(1.0))
    }

    fn access_overhead(access: AccessKind) -> f64 {
        match access {
            AccessKind::BaseStation => 50.0,
            AccessKind::Rsu => 20.0,
            AccessKind::Peer => 5.0,
        }
    }
}
