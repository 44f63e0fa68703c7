use foundation::ids::FeatureId;
use foundation::math::{Vec2, closest_on_segment};

use crate::feature::Feature;
use crate::geometry::{Geometry, polygon_contains};
use crate::store::FeatureStore;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PickOptions {
    /// Slack around points and strokes, in working-projection units.
    pub tolerance: f64,
}

impl PickOptions {
    /// Converts a pixel tolerance with the current view resolution (units per pixel).
    pub fn from_pixels(tolerance_px: f64, resolution: f64) -> Self {
        Self {
            tolerance: tolerance_px * resolution,
        }
    }
}

/// Resolves which features are rendered under a map coordinate.
///
/// Ordering contract:
/// - Candidates are returned topmost first. Within one layer the topmost
///   feature is the one painted last.
///
/// Implementations may be backed by a renderer whose feature references can
/// outlive the store entries; callers re-check `FeatureStore::has_feature`.
pub trait HitTester {
    fn features_at(&self, store: &FeatureStore, at: Vec2, opts: PickOptions) -> Vec<FeatureId>;
}

/// Hit testing against the stored geometry, painting in store order.
#[derive(Debug, Default, Copy, Clone)]
pub struct GeometryHitTester;

impl HitTester for GeometryHitTester {
    fn features_at(&self, store: &FeatureStore, at: Vec2, opts: PickOptions) -> Vec<FeatureId> {
        store
            .features()
            .iter()
            .rev()
            .filter(|f| feature_hit(f, at, opts.tolerance))
            .map(|f| f.id.clone())
            .collect()
    }
}

/// Topmost feature under `at`, if any.
pub fn pick_point(
    tester: &dyn HitTester,
    store: &FeatureStore,
    at: Vec2,
    opts: PickOptions,
) -> Option<FeatureId> {
    tester.features_at(store, at, opts).into_iter().next()
}

fn feature_hit(feature: &Feature, at: Vec2, tolerance: f64) -> bool {
    let Some(geometry) = &feature.geometry else {
        return false;
    };
    if let Some(extent) = geometry.extent()
        && !extent.buffered(tolerance).contains(at)
    {
        return false;
    }
    geometry_hit(geometry, at, tolerance)
}

pub fn geometry_hit(geometry: &Geometry, at: Vec2, tolerance: f64) -> bool {
    let near_stroke = || {
        geometry
            .segments()
            .iter()
            .any(|&(a, b)| closest_on_segment(at, a, b).distance(at) <= tolerance)
    };

    match geometry {
        Geometry::Point(p) => p.distance(at) <= tolerance,
        Geometry::MultiPoint(points) => points.iter().any(|p| p.distance(at) <= tolerance),
        Geometry::LineString(_) | Geometry::MultiLineString(_) => near_stroke(),
        Geometry::Polygon(rings) => polygon_contains(rings, at) || near_stroke(),
        Geometry::MultiPolygon(polys) => {
            polys.iter().any(|rings| polygon_contains(rings, at)) || near_stroke()
        }
        Geometry::Circle { center, radius } => center.distance(at) <= radius + tolerance,
    }
}
