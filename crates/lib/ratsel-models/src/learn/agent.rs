use hashbrown::HashMap;
use serde::Deserialize;

use crate::dist::UnitSampler;
use crate::net::profiles::{MessageKind, RatType};

/// Discretized sender-to-target distance. Band edges follow the RAT ranges so that
/// each band roughly maps to a different set of usable links.
#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq)]
pub enum DistanceBand {
    Close,
    Medium,
    Far,
    VeryFar,
}

impl DistanceBand {
    pub fn from_distance(distance: f64) -> Self {
        if distance <= 30.0 {
            DistanceBand::Close
        } else if distance <= 60.0 {
            DistanceBand::Medium
        } else if distance <= 100.0 {
            DistanceBand::Far
        } else {
            DistanceBand::VeryFar
        }
    }
}

/// Discretized vehicle speed in m/s.
#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq)]
pub enum SpeedBand {
    Slow,
    Medium,
    Fast,
}

impl SpeedBand {
    pub fn from_velocity(velocity: f64) -> Self {
        if velocity <= 15.0 {
            SpeedBand::Slow
        } else if velocity <= 30.0 {
            SpeedBand::Medium
        } else {
            SpeedBand::Fast
        }
    }
}

/// The discretized state a decision is made in. Used directly as a lookup key, so
/// two observations that discretize alike share learned values.
#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq)]
pub struct StateKey {
    pub distance: DistanceBand,
    pub speed: SpeedBand,
    pub lane: u8,
    pub message: MessageKind,
}

/// One state-action cell of the value table.
#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq)]
pub struct QKey {
    pub state: StateKey,
    pub action: RatType,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct LearningSettings {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    #[serde(default = "default_epsilon_start")]
    pub epsilon_start: f64,
    #[serde(default = "default_epsilon_min")]
    pub epsilon_min: f64,
    #[serde(default = "default_epsilon_decay")]
    pub epsilon_decay: f64,
}

fn default_alpha() -> f64 {
    0.1
}

fn default_gamma() -> f64 {
    0.95
}

fn default_epsilon_start() -> f64 {
    1.0
}

fn default_epsilon_min() -> f64 {
    0.01
}

fn default_epsilon_decay() -> f64 {
    0.995
}

impl Default for LearningSettings {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            gamma: default_gamma(),
            epsilon_start: default_epsilon_start(),
            epsilon_min: default_epsilon_min(),
            epsilon_decay: default_epsilon_decay(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingStep {
    state: StateKey,
    action: RatType,
    reward: Option<f64>,
}

/// Tabular Q-learning over RAT choices. The temporal-difference update for a step
/// is deferred until the next decision, when the successor state and its action
/// set are known.
#[derive(Debug, Clone)]
pub struct QLearner {
    settings: LearningSettings,
    table: HashMap<QKey, f64>,
    epsilon: f64,
    pending: Option<PendingStep>,
    decisions: u64,
    explorations: u64,
}

impl QLearner {
    pub fn with_settings(settings: LearningSettings) -> Self {
        Self {
            settings,
            table: HashMap::new(),
            epsilon: settings.epsilon_start,
            pending: None,
            decisions: 0,
            explorations: 0,
        }
    }

    /// Picks an action for the given state. An empty action set yields None and
    /// leaves the learner untouched, so blackout ticks neither decay epsilon nor
    /// poison the pending update.
    pub fn decide(
        &mut self,
        state: StateKey,
        actions: &[RatType],
        sampler: &mut UnitSampler,
    ) -> Option<RatType> {
        if actions.is_empty() {
            return None;
        }
        self.apply_pending(state, actions);
        let explore = sampler.sample() < self.epsilon;
        let action = if explore {
            self.explorations += 1;
            actions[sampler.pick_index(actions.len())]
        } else {
            self.greedy(state, actions)
        };
        self.decisions += 1;
        self.pending = Some(PendingStep {
            state,
            action,
            reward: None,
        });
        self.epsilon = (self.epsilon * self.settings.epsilon_decay).max(self.settings.epsilon_min);
        Some(action)
    }

    /// Records the reward for the most recent decision. It is folded into the
    /// value table at the next decision.
    pub fn observe_reward(&mut self, reward: f64) {
        if let Some(pending) = self.pending.as_mut() {
            pending.reward = Some(reward);
        }
    }

    fn apply_pending(&mut self, next_state: StateKey, next_actions: &[RatType]) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        // A decision whose outcome was never observed carries no signal.
        let Some(reward) = pending.reward else {
            return;
        };
        let max_next = next_actions
            .iter()
            .map(|action| {
                self.q_value(QKey {
                    state: next_state,
                    action: *action,
                })
            })
            .fold(f64::NEG_INFINITY, f64::max);
        let key = QKey {
            state: pending.state,
            action: pending.action,
        };
        let current = self.q_value(key);
        let target = reward + self.settings.gamma * max_next;
        let updated = current + self.settings.alpha * (target - current);
        self.table.insert(key, updated);
    }

    fn greedy(&self, state: StateKey, actions: &[RatType]) -> RatType {
        let mut best = actions[0];
        let mut best_value = self.q_value(QKey {
            state,
            action: best,
        });
        for action in actions[1..].iter() {
            let value = self.q_value(QKey {
                state,
                action: *action,
            });
            if value > best_value {
                best = *action;
                best_value = value;
            }
        }
        best
    }

    pub fn q_value(&self, key: QKey) -> f64 {
        self.table.get(&key).copied().unwrap_or(0.0)
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    pub fn explorations(&self) -> u64 {
        self.explorations
    }

    /// Drops everything learned and restarts exploration from scratch.
    pub fn reset(&mut self) {
        self.table.clear();
        self.epsilon = self.settings.epsilon_start;
        self.pending = None;
        self.decisions = 0;
        self.explorations = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dist::SamplerSettings;

    fn sampler() -> UnitSampler {
        UnitSampler::with_settings(&SamplerSettings { seed: 42 })
    }

    fn state() -> StateKey {
        StateKey {
            distance: DistanceBand::Close,
            speed: SpeedBand::Slow,
            lane: 0,
            message: MessageKind::Safety,
        }
    }

    #[test]
    fn distance_band_edges() {
        assert_eq!(DistanceBand::from_distance(30.0), DistanceBand::Close);
        assert_eq!(DistanceBand::from_distance(30.1), DistanceBand::Medium);
        assert_eq!(DistanceBand::from_distance(60.1), DistanceBand::Far);
        assert_eq!(DistanceBand::from_distance(100.1), DistanceBand::VeryFar);
    }

    #[test]
    fn speed_band_edges() {
        assert_eq!(SpeedBand::from_velocity(15.0), SpeedBand::Slow);
        assert_eq!(SpeedBand::from_velocity(22.0), SpeedBand::Medium);
        assert_eq!(SpeedBand::from_velocity(31.0), SpeedBand::Fast);
    }

    #[test]
    fn empty_action_set_is_inert() {
        let mut learner = QLearner::with_settings(LearningSettings::default());
        let mut sampler = sampler();
        let epsilon_before = learner.epsilon();
        assert!(learner.decide(state(), &[], &mut sampler).is_none());
        assert_eq!(learner.epsilon(), epsilon_before);
        assert_eq!(learner.decisions(), 0);
    }

    #[test]
    fn epsilon_decays_to_floor() {
        let settings = LearningSettings::default();
        let mut learner = QLearner::with_settings(settings);
        let mut sampler = sampler();
        for _ in 0..2000 {
            learner.decide(state(), &RatType::ALL, &mut sampler);
            learner.observe_reward(1.0);
        }
        assert_eq!(learner.epsilon(), settings.epsilon_min);
    }

    #[test]
    fn repeated_reward_converges_to_discounted_sum() {
        let settings = LearningSettings::default();
        let mut learner = QLearner::with_settings(LearningSettings {
            epsilon_start: 0.0,
            ..settings
        });
        let mut sampler = sampler();
        let actions = [RatType::Dsrc];
        let reward = 10.0;
        for _ in 0..5000 {
            learner.decide(state(), &actions, &mut sampler);
            learner.observe_reward(reward);
        }
        let expected = reward / (1.0 - settings.gamma);
        let learned = learner.q_value(QKey {
            state: state(),
            action: RatType::Dsrc,
        });
        assert!(
            (learned - expected).abs() < 1.0,
            "learned {} expected {}",
            learned,
            expected
        );
    }

    #[test]
    fn unrewarded_decision_leaves_table_untouched() {
        let mut learner = QLearner::with_settings(LearningSettings::default());
        let mut sampler = sampler();
        learner.decide(state(), &RatType::ALL, &mut sampler);
        learner.decide(state(), &RatType::ALL, &mut sampler);
        assert_eq!(learner.table_len(), 0);
    }

    #[test]
    fn reset_restores_initial_exploration() {
        let mut learner = QLearner::with_settings(LearningSettings::default());
        let mut sampler = sampler();
        for _ in 0..50 {
            learner.decide(state(), &RatType::ALL, &mut sampler);
            learner.observe_reward(-1.0);
        }
        assert!(learner.table_len() > 0);
        learner.reset();
        assert_eq!(learner.table_len(), 0);
        assert_eq!(learner.epsilon(), LearningSettings::default().epsilon_start);
        assert_eq!(learner.decisions(), 0);
    }
}
