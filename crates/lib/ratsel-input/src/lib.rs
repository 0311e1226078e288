#![forbid(unsafe_code)]

pub mod mobility;
