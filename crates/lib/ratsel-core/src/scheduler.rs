use indexmap::IndexMap;
use log::debug;
use typed_builder::TypedBuilder;

use crate::agent::{Node, NodeId};
use crate::bucket::{Bucket, TimeMS};

/// A trait used to represent a scheduler. A scheduler owns the nodes and the bucket
/// and advances the simulation one tick at a time. The order of calling the
/// scheduler's functions is important for correct behavior.
pub trait Scheduler<B: Bucket>: Send {
    fn duration(&self) -> TimeMS;
    fn initialize(&mut self);
    fn trigger(&mut self) -> TimeMS;
    fn terminate(self);
}

/// Steps all nodes once per tick in node order. All nodes are active for the whole
/// run; topology and vehicle sets are fixed at build time.
#[derive(TypedBuilder)]
pub struct TickScheduler<N, B>
where
    N: Node<B>,
    B: Bucket,
{
    pub bucket: B,
    pub nodes: IndexMap<NodeId, N>,
    pub duration: TimeMS,
    pub step_size: TimeMS,
    pub output_interval: TimeMS,
    #[builder(default = TimeMS::default())]
    pub now: TimeMS,
    #[builder(default = TimeMS::default())]
    pub output_step: TimeMS,
}

impl<N, B> TickScheduler<N, B>
where
    N: Node<B>,
    B: Bucket,
{
    pub fn node_of(&self, node_id: &NodeId) -> &N {
        self.nodes
            .get(node_id)
            .expect("node not found in scheduler")
    }
}

impl<N, B> Scheduler<B> for TickScheduler<N, B>
where
    N: Node<B>,
    B: Bucket,
{
    fn duration(&self) -> TimeMS {
        self.duration
    }

    fn initialize(&mut self) {
        self.nodes
            .sort_by(|_, this, _, other| this.order().cmp(&other.order()));
        for node in self.nodes.values() {
            debug!("Registered node {} with the scheduler", node.id());
        }
        self.bucket.initialize(self.now);
    }

    fn trigger(&mut self) -> TimeMS {
        self.bucket.before_nodes(self.now);

        self.nodes
            .values_mut()
            .for_each(|node| node.step(&mut self.bucket));

        self.bucket.after_nodes();

        if self.now == self.output_step {
            self.bucket.stream_output();
            self.output_step += self.output_interval;
        }

        self.now += self.step_size;
        self.now
    }

    fn terminate(self) {
        self.bucket.terminate();
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::agent::{NodeOrder, Orderable};

    #[derive(Default)]
    struct CountingBucket {
        pub steps_seen: u64,
        pub flushes: u64,
    }

    impl Bucket for CountingBucket {
        fn initialize(&mut self, _step: TimeMS) {}

        fn before_nodes(&mut self, _step: TimeMS) {
            self.steps_seen += 1;
        }

        fn after_nodes(&mut self) {}

        fn stream_output(&mut self) {
            self.flushes += 1;
        }

        fn terminate(self) {}
    }

    struct TestNode {
        id: NodeId,
        order: NodeOrder,
        stepped: u64,
    }

    impl Orderable for TestNode {
        fn order(&self) -> NodeOrder {
            self.order
        }
    }

    impl Node<CountingBucket> for TestNode {
        fn id(&self) -> NodeId {
            self.id
        }

        fn step(&mut self, _bucket: &mut CountingBucket) {
            self.stepped += 1;
        }
    }

    fn make_scheduler() -> TickScheduler<TestNode, CountingBucket> {
        let mut nodes = IndexMap::new();
        for raw_id in 0u64..3 {
            let node = TestNode {
                id: NodeId::from(raw_id),
                order: NodeOrder::from((3 - raw_id) as u32),
                stepped: 0,
            };
            nodes.insert(node.id, node);
        }
        TickScheduler::builder()
            .bucket(CountingBucket::default())
            .nodes(nodes)
            .duration(TimeMS::from(1000))
            .step_size(TimeMS::from(100))
            .output_interval(TimeMS::from(500))
            .build()
    }

    #[test]
    fn nodes_sorted_by_order() {
        let mut scheduler = make_scheduler();
        scheduler.initialize();
        let first = scheduler.nodes.first().expect("empty scheduler").1;
        assert_eq!(first.id(), NodeId::from(2));
    }

    #[test]
    fn ticks_until_duration() {
        let mut scheduler = make_scheduler();
        scheduler.initialize();
        let mut now = TimeMS::default();
        while now < scheduler.duration() {
            now = scheduler.trigger();
        }
        assert_eq!(scheduler.bucket.steps_seen, 10);
        assert_eq!(scheduler.node_of(&NodeId::from(0)).stepped, 10);
        assert_eq!(scheduler.bucket.flushes, 2);
    }
}
