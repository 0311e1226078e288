use hashbrown::HashMap;
use typed_builder::TypedBuilder;

use ratsel_core::agent::NodeId;
use ratsel_core::bucket::TimeMS;
use ratsel_core::metrics::Bytes;

use crate::net::profiles::{AccessKind, MessageKind, RatType};

/// One transmission attempt, as written to the results tables.
#[derive(TypedBuilder, Debug, Clone, Copy)]
pub struct TxRecord {
    pub time_step: TimeMS,
    pub node_id: NodeId,
    pub message: MessageKind,
    pub priority: u8,
    pub rat: RatType,
    pub access: AccessKind,
    pub target: NodeId,
    pub distance: f64,
    pub snr: f64,
    pub loss_rate: f64,
    pub latency_ms: f64,
    pub size_bytes: Bytes,
    pub success: bool,
    pub handover: bool,
    pub reward: f64,
}

/// Sent/received/lost tallies for one RAT or one message kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxCounters {
    pub sent: u64,
    pub received: u64,
    pub lost: u64,
}

impl TxCounters {
    pub fn record(&mut self, success: bool) {
        self.sent += 1;
        if success {
            self.received += 1;
        } else {
            self.lost += 1;
        }
    }

    pub fn delivery_ratio(&self) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        self.received as f64 / self.sent as f64
    }
}

/// Running network-level aggregates for one measurement window.
#[derive(Debug, Clone, Default)]
pub struct NetStats {
    pub totals: TxCounters,
    pub by_rat: HashMap<RatType, TxCounters>,
    pub by_message: HashMap<MessageKind, TxCounters>,
    pub handovers: u64,
    pub blackouts: u64,
    pub bytes_transferred: Bytes,
    latency_sum: f64,
    latency_count: u64,
}

impl NetStats {
    pub fn record(&mut self, record: &TxRecord) {
        self.totals.record(record.success);
        self.by_rat
            .entry(record.rat)
            .or_default()
            .record(record.success);
        self.by_message
            .entry(record.message)
            .or_default()
            .record(record.success);
        if record.handover {
            self.handovers += 1;
        }
        if record.success {
            self.bytes_transferred += record.size_bytes;
            self.latency_sum += record.latency_ms;
            self.latency_count += 1;
        }
    }

    /// Counts a tick where a sender found no reachable access point.
    pub fn record_blackout(&mut self) {
        self.blackouts += 1;
    }

    pub fn avg_latency_ms(&self) -> f64 {
        if self.latency_count == 0 {
            return 0.0;
        }
        self.latency_sum / self.latency_count as f64
    }

    /// Hands out the accumulated window and starts a fresh one.
    pub fn take(&mut self) -> NetStats {
        std::mem::take(self)
    }
}

/// Learner-side aggregates across all vehicles at one reporting instant.
#[derive(TypedBuilder, Debug, Clone, Copy, Default)]
pub struct LearningStats {
    pub decisions: u64,
    pub explorations: u64,
    pub table_entries: u64,
    pub avg_epsilon: f64,
    pub avg_reward: f64,
}

impl LearningStats {
    pub fn exploration_ratio(&self) -> f64 {
        if self.decisions == 0 {
            return 0.0;
        }
        self.explorations as f64 / self.decisions as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(success: bool, rat: RatType, handover: bool) -> TxRecord {
        TxRecord::builder()
            .time_step(TimeMS::from(1000))
            .node_id(NodeId::from(7))
            .message(MessageKind::BasicCam)
            .priority(2)
            .rat(rat)
            .access(AccessKind::Rsu)
            .target(NodeId::from(201))
            .distance(35.0)
            .snr(18.0)
            .loss_rate(0.05)
            .latency_ms(60.0)
            .size_bytes(Bytes::new(512))
            .success(success)
            .handover(handover)
            .reward(12.0)
            .build()
    }

    #[test]
    fn counters_split_sent_into_received_and_lost() {
        let mut stats = NetStats::default();
        stats.record(&record(true, RatType::Wifi, false));
        stats.record(&record(false, RatType::Wifi, false));
        stats.record(&record(true, RatType::Lte, true));
        assert_eq!(stats.totals.sent, 3);
        assert_eq!(stats.totals.received + stats.totals.lost, stats.totals.sent);
        assert_eq!(stats.by_rat[&RatType::Wifi].sent, 2);
        assert_eq!(stats.handovers, 1);
        assert_eq!(stats.bytes_transferred, Bytes::new(1024));
        assert_eq!(stats.totals.delivery_ratio(), 2.0 / 3.0);
    }

    #[test]
    fn latency_averages_over_successes_only() {
        let mut stats = NetStats::default();
        stats.record(&record(true, RatType::Dsrc, false));
        stats.record(&record(false, RatType::Dsrc, false));
        assert_eq!(stats.avg_latency_ms(), 60.0);
    }

    #[test]
    fn exploration_ratio_guards_the_zero_denominator() {
        let idle = LearningStats::default();
        assert_eq!(idle.exploration_ratio(), 0.0);
        let warmed = LearningStats::builder()
            .decisions(200)
            .explorations(50)
            .table_entries(12)
            .avg_epsilon(0.3)
            .avg_reward(4.0)
            .build();
        assert_eq!(warmed.exploration_ratio(), 0.25);
    }

    #[test]
    fn take_resets_the_window() {
        let mut stats = NetStats::default();
        stats.record(&record(true, RatType::Dsrc, false));
        stats.record_blackout();
        let window = stats.take();
        assert_eq!(window.totals.sent, 1);
        assert_eq!(window.blackouts, 1);
        assert_eq!(stats.totals.sent, 0);
        assert_eq!(stats.blackouts, 0);
        assert!(stats.by_rat.is_empty());
    }
}
