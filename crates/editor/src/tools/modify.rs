use foundation::ids::FeatureId;
use foundation::math::{StableF64, Vec2};
use scene::{FeatureStore, Geometry, StoreError};
use tracing::debug;

/// What a pointer-down grabbed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrabTarget {
    /// Index into `Geometry::vertices()`; a circle's center is vertex 0.
    Vertex(usize),
    /// The circle outline; dragging it changes the radius.
    CircleRim,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grab {
    pub feature: FeatureId,
    pub target: GrabTarget,
}

/// Drags vertices of stored geometries.
///
/// The store is updated on every drag step so the layer redraws live.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifyTool {
    instance: u64,
    tolerance_px: f64,
    grab: Option<Grab>,
}

impl ModifyTool {
    pub fn new(instance: u64, tolerance_px: f64) -> Self {
        Self {
            instance,
            tolerance_px,
            grab: None,
        }
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn grab(&self) -> Option<&Grab> {
        self.grab.as_ref()
    }

    /// Grabs the nearest vertex within tolerance. Topmost features win ties.
    pub fn pointer_down(&mut self, store: &FeatureStore, at: Vec2, resolution: f64) -> bool {
        let tolerance = self.tolerance_px * resolution;
        let mut best: Option<(StableF64, Grab)> = None;

        for feature in store.features().iter().rev() {
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            let mut consider = |d: f64, target: GrabTarget| {
                if d > tolerance {
                    return;
                }
                let d = StableF64(d);
                if best.as_ref().is_none_or(|(bd, _)| d < *bd) {
                    best = Some((
                        d,
                        Grab {
                            feature: feature.id.clone(),
                            target,
                        },
                    ));
                }
            };

            if let Geometry::Circle { center, radius } = geometry {
                consider(center.distance(at), GrabTarget::Vertex(0));
                consider((center.distance(at) - radius).abs(), GrabTarget::CircleRim);
                continue;
            }
            for (i, v) in geometry.vertices().into_iter().enumerate() {
                consider(v.distance(at), GrabTarget::Vertex(i));
            }
        }

        self.grab = best.map(|(_, g)| g);
        if let Some(g) = &self.grab {
            debug!(feature = %g.feature, target = ?g.target, "modify grab");
        }
        self.grab.is_some()
    }

    /// Moves the grabbed vertex to `at`. Returns `false` without a grab or
    /// when the geometry is left unchanged.
    pub fn drag(&mut self, store: &mut FeatureStore, at: Vec2) -> Result<bool, StoreError> {
        let Some(grab) = &self.grab else {
            return Ok(false);
        };
        let Some(current) = store.get(&grab.feature).and_then(|f| f.geometry.as_ref()) else {
            let missing = grab.feature.clone();
            self.grab = None;
            return Err(StoreError::NotFound(missing));
        };
        let mut geometry = current.clone();

        let moved = match (grab.target, &mut geometry) {
            (GrabTarget::CircleRim, Geometry::Circle { center, radius }) => {
                *radius = center.distance(at);
                true
            }
            (GrabTarget::Vertex(i), g) => g.move_vertex(i, at),
            (GrabTarget::CircleRim, _) => false,
        };
        if !moved || geometry == *current {
            return Ok(false);
        }
        store.set_geometry(&grab.feature, geometry)?;
        Ok(true)
    }

    /// Ends the drag. Returns the feature that was being modified.
    pub fn pointer_up(&mut self) -> Option<FeatureId> {
        self.grab.take().map(|g| g.feature)
    }
}
