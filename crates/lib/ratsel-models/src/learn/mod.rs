pub mod agent;
pub mod reward;
