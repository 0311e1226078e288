use std::fmt::Display;
use std::ops::{Add, AddAssign};

use serde::Deserialize;

/// Payload size moved over a link, in bytes.
#[derive(Deserialize, Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct Bytes(u64);

impl Bytes {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
    pub fn as_u64(&self) -> u64 {
        self.0
    }
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }
}

impl Display for Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Bytes {
    fn from(f: u64) -> Self {
        Self(f)
    }
}

impl Add for Bytes {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Bytes {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// End-to-end delay of a transmission in milliseconds. Fractional because the
/// propagation and jitter terms are sub-millisecond.
#[derive(Deserialize, Default, Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Latency(f64);

impl Latency {
    pub fn new(value: f64) -> Self {
        Self(value)
    }
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl Display for Latency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<f64> for Latency {
    fn from(f: f64) -> Self {
        Self(f)
    }
}

impl Add for Latency {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Latency {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn byte_accumulation() {
        let mut total = Bytes::default();
        total += Bytes::new(512);
        total += Bytes::new(256);
        assert_eq!(total.as_u64(), 768);
    }
}
