use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;

use serde::Deserialize;

use crate::bucket::Bucket;

/// A unique ID that is a property of every node in the simulation, mobile or fixed.
#[derive(Deserialize, Default, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<u64>()?;
        Ok(Self(id))
    }
}

impl From<u64> for NodeId {
    fn from(f: u64) -> Self {
        Self(f)
    }
}

impl NodeId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// The kind of a node at the highest level. A vehicle moves along the trace and
/// originates traffic, while RSUs and the base station are fixed access points that
/// only terminate traffic.
#[derive(Deserialize, Debug, Hash, Copy, Default, Clone, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Vehicle,
    Rsu,
    BaseStation,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Vehicle => write!(f, "Vehicle"),
            NodeKind::Rsu => write!(f, "RSU"),
            NodeKind::BaseStation => write!(f, "BaseStation"),
        }
    }
}

/// Node order indicates the order in which node behavior is simulated within a tick.
/// Nodes with a lower order value are stepped first.
#[derive(Deserialize, Debug, Copy, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeOrder(pub u32);

impl From<u32> for NodeOrder {
    fn from(f: u32) -> Self {
        Self(f)
    }
}

impl NodeOrder {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

pub trait Orderable {
    fn order(&self) -> NodeOrder;
}

/// Trait for the basic properties of a node. Types carrying node metadata around the
/// simulation should implement this at a minimum.
pub trait NodeProperties: Debug + Copy + Clone + Send {
    fn id(&self) -> NodeId;
    fn kind(&self) -> &NodeKind;
}

/// A simulated node. Extend this for a custom device type. Only types with this trait
/// can be registered with a scheduler and hence stepped each tick.
pub trait Node<B>: Orderable + Send
where
    B: Bucket,
{
    fn id(&self) -> NodeId;
    fn step(&mut self, bucket: &mut B);
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn node_id_from_str() {
        let id: NodeId = "42".parse().expect("failed to parse node id");
        assert_eq!(id, NodeId::from(42));
        assert_eq!(id.as_u64(), 42);
    }

    #[test]
    fn node_order_comparison() {
        assert!(NodeOrder::from(1) < NodeOrder::from(2));
    }
}
