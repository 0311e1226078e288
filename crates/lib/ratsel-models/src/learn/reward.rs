use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::net::profiles::{MessageProfile, RadioProfile};

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct RewardSettings {
    #[serde(default = "default_success_base")]
    pub success_base: f64,
    #[serde(default = "default_failure_base")]
    pub failure_base: f64,
    #[serde(default = "default_latency_penalty_per_ms")]
    pub latency_penalty_per_ms: f64,
    #[serde(default = "default_distance_penalty_per_m")]
    pub distance_penalty_per_m: f64,
    #[serde(default = "default_match_bonus")]
    pub match_bonus: f64,
    #[serde(default = "default_reliability_bonus")]
    pub reliability_bonus: f64,
    #[serde(default = "default_handover_penalty")]
    pub handover_penalty: f64,
}

fn default_success_base() -> f64 {
    10.0
}

fn default_failure_base() -> f64 {
    -15.0
}

fn default_latency_penalty_per_ms() -> f64 {
    0.1
}

fn default_distance_penalty_per_m() -> f64 {
    0.05
}

fn default_match_bonus() -> f64 {
    5.0
}

fn default_reliability_bonus() -> f64 {
    15.0
}

fn default_handover_penalty() -> f64 {
    8.0
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            success_base: default_success_base(),
            failure_base: default_failure_base(),
            latency_penalty_per_ms: default_latency_penalty_per_ms(),
            distance_penalty_per_m: default_distance_penalty_per_m(),
            match_bonus: default_match_bonus(),
            reliability_bonus: default_reliability_bonus(),
            handover_penalty: default_handover_penalty(),
        }
    }
}

/// What actually happened to one transmission, as observed by the simulator.
#[derive(TypedBuilder, Debug, Clone, Copy)]
pub struct TxOutcome {
    pub success: bool,
    pub latency_ms: f64,
    pub distance: f64,
    pub loss_rate: f64,
    pub handover: bool,
}

/// Scores a transmission outcome into the scalar the learner trains on. The
/// message profile's configured weight scales the base term, so a lost safety
/// message hurts far more than a lost infotainment chunk.
#[derive(Debug, Clone, Copy)]
pub struct RewardCalculator {
    settings: RewardSettings,
}

impl RewardCalculator {
    pub fn with_settings(settings: RewardSettings) -> Self {
        Self { settings }
    }

    pub fn compute(
        &self,
        outcome: &TxOutcome,
        message: &MessageProfile,
        radio: &RadioProfile,
    ) -> f64 {
        let base = if outcome.success {
            self.settings.success_base
        } else {
            self.settings.failure_base
        };
        let multiplier = message.weight;
        let excess_latency = (outcome.latency_ms - message.latency_requirement_ms).max(0.0);
        let latency_penalty = excess_latency * self.settings.latency_penalty_per_ms;
        let distance_penalty = outcome.distance * self.settings.distance_penalty_per_m;
        let match_bonus = if radio.prefers(message.kind) {
            self.settings.match_bonus
        } else {
            0.0
        };
        let reliability_bonus = if outcome.success
            && (1.0 - outcome.loss_rate) >= message.reliability_requirement
        {
            self.settings.reliability_bonus
        } else {
            0.0
        };
        let handover_penalty = if outcome.handover {
            self.settings.handover_penalty
        } else {
            0.0
        };
        base * multiplier - latency_penalty - distance_penalty + match_bonus + reliability_bonus
            - handover_penalty
    }
}
