use log::debug;
use typed_builder::TypedBuilder;

use ratsel_core::agent::{Node, NodeId, NodeKind, NodeOrder, NodeProperties, Orderable};
use ratsel_core::bucket::TimeMS;
use ratsel_models::learn::agent::{DistanceBand, QLearner, SpeedBand, StateKey};
use ratsel_models::learn::reward::TxOutcome;
use ratsel_models::mobility::MapState;
use ratsel_models::net::candidates::Candidate;
use ratsel_models::net::profiles::{MessageKind, RatType};
use ratsel_models::stats::TxRecord;

use crate::v2x::bucket::{LearnerReport, RoadBucket};

#[derive(Clone, Copy, Debug, TypedBuilder)]
pub struct VehicleInfo {
    pub id: NodeId,
    pub kind: NodeKind,
    pub order: NodeOrder,
}

impl NodeProperties for VehicleInfo {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

/// A vehicle that periodically generates a message, asks its learner for a RAT
/// and lives with the outcome. Each vehicle owns its learner; nothing about the
/// policy is shared across vehicles.
#[derive(TypedBuilder)]
pub struct Vehicle {
    pub vehicle_info: VehicleInfo,
    pub learner: QLearner,
    #[builder(default)]
    pub map_state: MapState,
    #[builder(default)]
    pub current_rat: Option<RatType>,
    #[builder(default)]
    pub current_message: Option<MessageKind>,
    #[builder(default)]
    pub last_send: Option<TimeMS>,
    #[builder(default)]
    reward_sum: f64,
    #[builder(default)]
    reward_count: u64,
}

impl Vehicle {
    fn is_due(&self, step: TimeMS, bucket: &RoadBucket) -> bool {
        match (self.last_send, self.current_message) {
            (Some(last), Some(kind)) => {
                let interval = bucket.message_profile(kind).send_interval;
                step - last >= interval
            }
            _ => true,
        }
    }

    fn pick_candidate(
        &mut self,
        state_key: StateKey,
        candidates: &[Candidate],
        bucket: &mut RoadBucket,
    ) -> (Option<Candidate>, bool) {
        let mut actions: Vec<RatType> = Vec::new();
        for candidate in candidates.iter().filter(|c| c.viable) {
            if !actions.contains(&candidate.rat) {
                actions.push(candidate.rat);
            }
        }
        if let Some(rat) =
            self.learner
                .decide(state_key, &actions, &mut bucket.models.decision_sampler)
        {
            let chosen = candidates
                .iter()
                .filter(|c| c.viable && c.rat == rat)
                .max_by(|a, b| a.score.total_cmp(&b.score))
                .copied();
            return (chosen, true);
        }
        // Nothing viable. Degrade to the best overall link without training on it.
        (bucket.shortlist(candidates), false)
    }

    fn transmit(&mut self, step: TimeMS, bucket: &mut RoadBucket) {
        let kind = bucket.sample_message_kind();
        let message = bucket.message_profile(kind);
        let candidates = bucket.enumerate_candidates(self.vehicle_info.id, &message);
        if candidates.is_empty() {
            debug!(
                "No access point in range of {} at step {}",
                self.vehicle_info.id, step
            );
            bucket.record_blackout();
            return;
        }

        let nearest = candidates
            .iter()
            .map(|c| c.distance)
            .fold(f64::INFINITY, f64::min);
        let state_key = StateKey {
            distance: DistanceBand::from_distance(nearest),
            speed: SpeedBand::from_velocity(self.map_state.velocity),
            lane: self.map_state.lane,
            message: kind,
        };

        let (chosen, learned) = self.pick_candidate(state_key, &candidates, bucket);
        let Some(chosen) = chosen else {
            bucket.record_blackout();
            return;
        };

        let radio = bucket.radio_profile(chosen.rat);
        let success = bucket.draw_success(chosen.loss_rate);
        let latency = bucket.models.latency.measure(
            &radio,
            chosen.access,
            chosen.distance,
            message.size_bytes,
        );
        let handover = self.current_rat.is_some_and(|previous| previous != chosen.rat);

        let outcome = TxOutcome::builder()
            .success(success)
            .latency_ms(latency.as_f64())
            .distance(chosen.distance)
            .loss_rate(chosen.loss_rate)
            .handover(handover)
            .build();
        let reward = bucket.compute_reward(&outcome, &message, &radio);
        if learned {
            self.learner.observe_reward(reward);
        }
        self.reward_sum += reward;
        self.reward_count += 1;

        let record = TxRecord::builder()
            .time_step(step)
            .node_id(self.vehicle_info.id)
            .message(kind)
            .priority(message.priority)
            .rat(chosen.rat)
            .access(chosen.access)
            .target(chosen.target)
            .distance(chosen.distance)
            .snr(chosen.snr)
            .loss_rate(chosen.loss_rate)
            .latency_ms(latency.as_f64())
            .size_bytes(message.size_bytes)
            .success(success)
            .handover(handover)
            .reward(reward)
            .build();
        bucket.record_tx(&record);

        self.current_rat = Some(chosen.rat);
        self.current_message = Some(kind);
        self.last_send = Some(step);
    }

    fn report(&self, bucket: &mut RoadBucket) {
        bucket.report_learner(
            self.vehicle_info.id,
            LearnerReport {
                epsilon: self.learner.epsilon(),
                table_entries: self.learner.table_len() as u64,
                decisions: self.learner.decisions(),
                explorations: self.learner.explorations(),
                reward_sum: self.reward_sum,
                reward_count: self.reward_count,
            },
        );
    }

    /// Clears everything a fresh run should not inherit except the learned policy.
    pub fn reset_state(&mut self) {
        self.current_rat = None;
        self.current_message = None;
        self.last_send = None;
        self.reward_sum = 0.0;
        self.reward_count = 0;
    }

    /// Drops the learned policy as well.
    pub fn reset_learning(&mut self) {
        self.learner.reset();
    }
}

impl Orderable for Vehicle {
    fn order(&self) -> NodeOrder {
        self.vehicle_info.order
    }
}

impl Node<RoadBucket> for Vehicle {
    fn id(&self) -> NodeId {
        self.vehicle_info.id
    }

    fn step(&mut self, bucket: &mut RoadBucket) {
        let step = bucket.step;
        // A vehicle outside the trace window has not entered the scenario yet.
        let Some(map_state) = bucket.map_state_of(self.vehicle_info.id) else {
            return;
        };
        self.map_state = map_state;
        if self.is_due(step, bucket) {
            self.transmit(step, bucket);
        }
        self.report(bucket);
    }
}
