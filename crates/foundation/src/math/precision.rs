//! Float comparison helpers for editing.
//!
//! Nearest-candidate searches (snapping, vertex grabs) need a total order on
//! distances so ties resolve the same way every time. Reprojected coordinates
//! need a tolerance instead of exact equality.

use core::cmp::Ordering;

use super::Vec2;

/// Total order on `f64` where `-0.0 == 0.0` and every NaN sorts last.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// A distance (or any float key) usable with `Ord`.
#[derive(Debug, Copy, Clone, Default)]
pub struct StableF64(pub f64);

impl Ord for StableF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        stable_total_cmp_f64(self.0, other.0)
    }
}

impl PartialOrd for StableF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for StableF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for StableF64 {}

/// `true` when both components differ by at most `eps`.
pub fn approx_eq_vec2(a: Vec2, b: Vec2, eps: f64) -> bool {
    (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps
}
