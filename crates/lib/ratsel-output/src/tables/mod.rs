pub mod learn;
pub mod net;
pub mod tx;
