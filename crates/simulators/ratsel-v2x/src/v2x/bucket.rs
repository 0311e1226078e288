use hashbrown::HashMap;
use log::{debug, info};
use typed_builder::TypedBuilder;

use ratsel_core::agent::NodeId;
use ratsel_core::bucket::{Bucket, TimeMS};
use ratsel_input::mobility::TraceMap;
use ratsel_models::dist::UnitSampler;
use ratsel_models::learn::reward::{RewardCalculator, TxOutcome};
use ratsel_models::mobility::MapState;
use ratsel_models::net::candidates::{AccessPoint, Candidate, CandidateEnumerator};
use ratsel_models::net::profiles::{
    AccessKind, MessageCatalog, MessageKind, MessageProfile, RadioCatalog, RadioProfile, RatType,
};
use ratsel_models::stats::{LearningStats, NetStats, TxRecord};
use ratsel_output::results::Results;

use crate::models::latency::LatencyModel;
use crate::models::message::MessageMix;

/// Per-vehicle learner introspection, refreshed every time the vehicle acts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LearnerReport {
    pub epsilon: f64,
    pub table_entries: u64,
    pub decisions: u64,
    pub explorations: u64,
    pub reward_sum: f64,
    pub reward_count: u64,
}

#[derive(TypedBuilder)]
pub struct BucketModels {
    pub radio_catalog: RadioCatalog,
    pub message_catalog: MessageCatalog,
    pub enumerator: CandidateEnumerator,
    pub latency: LatencyModel,
    pub mix: MessageMix,
    pub reward: RewardCalculator,
    pub results: Results,
    pub mix_sampler: UnitSampler,
    pub loss_sampler: UnitSampler,
    pub decision_sampler: UnitSampler,
    pub sight_sampler: UnitSampler,
}

/// Shared state of the road scenario: the static infrastructure, the per-tick
/// position snapshot and the output plumbing. Vehicles only observe each other
/// through the snapshot taken at the start of the tick.
#[derive(TypedBuilder)]
pub struct RoadBucket {
    pub models: BucketModels,
    pub infrastructure: Vec<AccessPoint>,
    pub traces: TraceMap,
    pub nlos_fraction: f64,
    #[builder(default)]
    pub positions: HashMap<NodeId, MapState>,
    #[builder(default)]
    pub net_stats: NetStats,
    #[builder(default)]
    pub learner_reports: HashMap<NodeId, LearnerReport>,
    #[builder(default)]
    pub step: TimeMS,
}

impl RoadBucket {
    pub fn map_state_of(&self, node_id: NodeId) -> Option<MapState> {
        self.positions.get(&node_id).copied()
    }

    /// The sender's view of the network this tick: all infrastructure access
    /// points plus every other vehicle as a DSRC peer.
    pub fn access_points_for(&self, sender: NodeId) -> Vec<AccessPoint> {
        let mut points = self.infrastructure.clone();
        for (node_id, state) in self.positions.iter() {
            if *node_id == sender {
                continue;
            }
            points.push(AccessPoint {
                id: *node_id,
                kind: AccessKind::Peer,
                rat: RatType::Dsrc,
                position: state.pos,
            });
        }
        points
    }

    pub fn enumerate_candidates(
        &mut self,
        sender: NodeId,
        message: &MessageProfile,
    ) -> Vec<Candidate> {
        let Some(state) = self.map_state_of(sender) else {
            return Vec::new();
        };
        let points = self.access_points_for(sender);
        let line_of_sight = self.models.sight_sampler.sample() >= self.nlos_fraction;
        self.models
            .enumerator
            .enumerate(state.pos, &points, message, line_of_sight)
    }

    pub fn shortlist(&self, candidates: &[Candidate]) -> Option<Candidate> {
        self.models.enumerator.shortlist(candidates)
    }

    pub fn sample_message_kind(&mut self) -> MessageKind {
        self.models.mix.sample(&mut self.models.mix_sampler)
    }

    pub fn draw_success(&mut self, loss_rate: f64) -> bool {
        self.models.loss_sampler.sample() > loss_rate
    }

    pub fn message_profile(&self, kind: MessageKind) -> MessageProfile {
        self.models.message_catalog.profile_of(kind).clone()
    }

    pub fn radio_profile(&self, rat: RatType) -> RadioProfile {
        self.models.radio_catalog.profile_of(rat).clone()
    }

    pub fn compute_reward(
        &self,
        outcome: &TxOutcome,
        message: &MessageProfile,
        radio: &RadioProfile,
    ) -> f64 {
        self.models.reward.compute(outcome, message, radio)
    }

    pub fn record_tx(&mut self, record: &TxRecord) {
        self.net_stats.record(record);
        if let Some(writer) = &mut self.models.results.tx_records {
            writer.add_data(record);
        }
    }

    pub fn record_blackout(&mut self) {
        self.net_stats.record_blackout();
    }

    pub fn report_learner(&mut self, node_id: NodeId, report: LearnerReport) {
        self.learner_reports.insert(node_id, report);
    }

    /// Clears the statistics window without touching any learner state.
    pub fn reset_stats(&mut self) {
        self.net_stats.take();
    }

    fn learning_stats(&self) -> LearningStats {
        let learners = self.learner_reports.len() as u64;
        let mut decisions = 0;
        let mut explorations = 0;
        let mut table_entries = 0;
        let mut epsilon_sum = 0.0;
        let mut reward_sum = 0.0;
        let mut reward_count = 0;
        for report in self.learner_reports.values() {
            decisions += report.decisions;
            explorations += report.explorations;
            table_entries += report.table_entries;
            epsilon_sum += report.epsilon;
            reward_sum += report.reward_sum;
            reward_count += report.reward_count;
        }
        LearningStats::builder()
            .decisions(decisions)
            .explorations(explorations)
            .table_entries(table_entries)
            .avg_epsilon(if learners == 0 {
                0.0
            } else {
                epsilon_sum / learners as f64
            })
            .avg_reward(if reward_count == 0 {
                0.0
            } else {
                reward_sum / reward_count as f64
            })
            .build()
    }
}

impl Bucket for RoadBucket {
    fn initialize(&mut self, step: TimeMS) {
        self.step = step;
        info!(
            "Initialized road bucket with {} access points",
            self.infrastructure.len()
        );
    }

    fn before_nodes(&mut self, step: TimeMS) {
        self.step = step;
        debug!("Refreshing position snapshot at step {}", step);
        if let Some(states) = self.traces.get(&step) {
            // A vehicle missing from a fresh trace slice has left the scenario;
            // it must stop transmitting and stop appearing as a peer.
            self.positions
                .retain(|node_id, _| states.contains_key(node_id));
            for (node_id, state) in states.iter() {
                self.positions.insert(*node_id, *state);
            }
        }
    }

    fn after_nodes(&mut self) {}

    fn stream_output(&mut self) {
        let window = self.net_stats.take();
        if let Some(writer) = &mut self.models.results.net_stats {
            writer.add_data(self.step, &window);
        }
        let learning_window = self.learning_stats();
        if let Some(writer) = &mut self.models.results.learning {
            writer.add_data(self.step, &learning_window);
        }
        self.models.results.write_to_file();
    }

    fn terminate(self) {
        info!("Closing result files at step {}", self.step);
        self.models.results.close_files();
    }
}
