use foundation::ids::FeatureId;
use foundation::math::{StableF64, Vec2, closest_on_segment};
use scene::{FeatureStore, Geometry};

/// Pulls pointer coordinates onto existing geometry.
///
/// Vertices win over edges: an edge is only used when no vertex lies within
/// the tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapTool {
    instance: u64,
    tolerance_px: f64,
}

impl SnapTool {
    pub fn new(instance: u64, tolerance_px: f64) -> Self {
        Self {
            instance,
            tolerance_px,
        }
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// `at` moved onto the nearest vertex or edge within tolerance, or `at`
    /// unchanged.
    pub fn snap(&self, store: &FeatureStore, at: Vec2, resolution: f64) -> Vec2 {
        self.snap_except(store, at, resolution, None)
    }

    /// Like [`SnapTool::snap`], ignoring the geometry of `skip`.
    ///
    /// Used while dragging, where the grabbed feature would otherwise pull the
    /// pointer back onto its own vertex.
    pub fn snap_except(
        &self,
        store: &FeatureStore,
        at: Vec2,
        resolution: f64,
        skip: Option<&FeatureId>,
    ) -> Vec2 {
        let tolerance = self.tolerance_px * resolution;
        let geometries = store
            .features()
            .iter()
            .filter(|f| skip != Some(&f.id))
            .filter_map(|f| f.geometry.as_ref());

        let mut best_vertex: Option<(StableF64, Vec2)> = None;
        let mut best_edge: Option<(StableF64, Vec2)> = None;
        for geometry in geometries {
            if let Geometry::Circle { center, radius } = geometry {
                let d = center.distance(at);
                if d > 0.0 {
                    let rim = *center + (at - *center).scale(radius / d);
                    keep_nearest(&mut best_edge, rim, at, tolerance);
                }
                continue;
            }
            for v in geometry.vertices() {
                keep_nearest(&mut best_vertex, v, at, tolerance);
            }
            for (a, b) in geometry.segments() {
                keep_nearest(&mut best_edge, closest_on_segment(at, a, b), at, tolerance);
            }
        }

        best_vertex.or(best_edge).map(|(_, p)| p).unwrap_or(at)
    }
}

fn keep_nearest(
    best: &mut Option<(StableF64, Vec2)>,
    candidate: Vec2,
    at: Vec2,
    tolerance: f64,
) {
    let d = StableF64(candidate.distance(at));
    if d.0 > tolerance {
        return;
    }
    if best.is_none_or(|(bd, _)| d < bd) {
        *best = Some((d, candidate));
    }
}

#[cfg(test)]
mod tests {
    use super::SnapTool;
    use foundation::math::Vec2;
    use scene::{FeatureDraft, FeatureStore, Geometry};

    fn store() -> FeatureStore {
        let mut store = FeatureStore::new();
        store.add_features([
            FeatureDraft::new(Geometry::LineString(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(100.0, 0.0),
            ])),
            FeatureDraft::new(Geometry::Circle {
                center: Vec2::new(500.0, 500.0),
                radius: 50.0,
            }),
        ]);
        store
    }

    #[test]
    fn prefers_vertices_over_edges() {
        let snap = SnapTool::new(0, 10.0);
        let store = store();
        assert_eq!(snap.snap(&store, Vec2::new(4.0, 3.0), 1.0), Vec2::new(0.0, 0.0));
        assert_eq!(snap.snap(&store, Vec2::new(50.0, 3.0), 1.0), Vec2::new(50.0, 0.0));
    }

    #[test]
    fn out_of_range_is_untouched() {
        let snap = SnapTool::new(0, 10.0);
        let store = store();
        let far = Vec2::new(50.0, 30.0);
        assert_eq!(snap.snap(&store, far, 1.0), far);
        // The same pixel tolerance reaches further when zoomed out.
        assert_eq!(snap.snap(&store, far, 4.0), Vec2::new(50.0, 0.0));
    }

    #[test]
    fn skipped_feature_does_not_attract() {
        let snap = SnapTool::new(0, 10.0);
        let mut store = store();
        let ids = store.add_features([FeatureDraft::new(Geometry::Point(Vec2::new(300.0, 0.0)))]);
        let at = Vec2::new(304.0, 0.0);
        assert_eq!(snap.snap(&store, at, 1.0), Vec2::new(300.0, 0.0));
        assert_eq!(snap.snap_except(&store, at, 1.0, Some(&ids[0])), at);
    }

    #[test]
    fn snaps_onto_circle_rim() {
        let snap = SnapTool::new(0, 10.0);
        let p = snap.snap(&store(), Vec2::new(555.0, 500.0), 1.0);
        assert!((p.x - 550.0).abs() < 1e-9 && (p.y - 500.0).abs() < 1e-9);
    }
}
