#![forbid(unsafe_code)]

pub mod logger;
pub mod results;
pub mod tables;
