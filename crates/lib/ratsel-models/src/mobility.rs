use serde::Deserialize;
use typed_builder::TypedBuilder;

/// A position in the simulation field. Units are meters.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Positional state of a mobile node at one tick, as supplied by the kinematics
/// collaborator through the trace input.
#[derive(Debug, Clone, Copy, Default, TypedBuilder)]
pub struct MapState {
    pub pos: Point3,
    #[builder(default)]
    pub velocity: f64,
    #[builder(default)]
    pub lane: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_distance() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
    }
}
