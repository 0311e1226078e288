pub mod latency;
pub mod message;
