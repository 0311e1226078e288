#![forbid(unsafe_code)]

pub mod models;
pub mod simulation;
pub mod v2x;
