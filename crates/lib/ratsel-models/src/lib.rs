#![forbid(unsafe_code)]

pub mod dist;
pub mod learn;
pub mod mobility;
pub mod net;
pub mod stats;
