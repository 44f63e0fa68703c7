use foundation::math::Vec2;
use scene::{Geometry, GeometryType};

/// Pixel distance within which clicking the first (polygon) or last
/// (line) sketch vertex finishes the sketch.
pub const FINISH_TOLERANCE_PX: f64 = 12.0;

/// Sketches one geometry at a time from map clicks.
///
/// - `Point` finishes on the first click.
/// - `LineString` finishes on `finish()` with two or more vertices, or by
///   clicking its last vertex again.
/// - `Polygon` finishes on `finish()` with three or more vertices, or by
///   clicking its first vertex. The ring is closed on output.
/// - `Circle` takes the center, then a rim point.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTool {
    instance: u64,
    geometry_type: GeometryType,
    sketch: Vec<Vec2>,
}

impl DrawTool {
    /// `None` for geometry types that cannot be drawn.
    pub fn new(instance: u64, geometry_type: GeometryType) -> Option<Self> {
        if !geometry_type.is_drawable() {
            return None;
        }
        Some(Self {
            instance,
            geometry_type,
            sketch: Vec::new(),
        })
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    /// Vertices placed so far for the unfinished geometry.
    pub fn sketch(&self) -> &[Vec2] {
        &self.sketch
    }

    /// Adds a vertex. Returns the geometry if this click completed it.
    pub fn click(&mut self, at: Vec2, resolution: f64) -> Option<Geometry> {
        let finish_tolerance = FINISH_TOLERANCE_PX * resolution;
        match self.geometry_type {
            GeometryType::Point => Some(Geometry::Point(at)),
            GeometryType::Circle => {
                if let Some(&center) = self.sketch.first() {
                    self.sketch.clear();
                    return Some(Geometry::Circle {
                        center,
                        radius: center.distance(at),
                    });
                }
                self.sketch.push(at);
                None
            }
            GeometryType::LineString => {
                if self.sketch.len() >= 2
                    && self
                        .sketch
                        .last()
                        .is_some_and(|last| last.distance(at) <= finish_tolerance)
                {
                    return self.finish();
                }
                self.sketch.push(at);
                None
            }
            GeometryType::Polygon => {
                if self.sketch.len() >= 3 && self.sketch[0].distance(at) <= finish_tolerance {
                    return self.finish();
                }
                self.sketch.push(at);
                None
            }
            GeometryType::MultiPoint
            | GeometryType::MultiLineString
            | GeometryType::MultiPolygon => None,
        }
    }

    /// Completes the sketch if it has enough vertices; otherwise keeps it.
    pub fn finish(&mut self) -> Option<Geometry> {
        let geometry = match self.geometry_type {
            GeometryType::LineString if self.sketch.len() >= 2 => {
                Geometry::LineString(std::mem::take(&mut self.sketch))
            }
            GeometryType::Polygon if self.sketch.len() >= 3 => {
                let mut ring = std::mem::take(&mut self.sketch);
                ring.push(ring[0]);
                Geometry::Polygon(vec![ring])
            }
            _ => return None,
        };
        Some(geometry)
    }

    /// Discards the unfinished sketch.
    pub fn abort(&mut self) -> bool {
        let had = !self.sketch.is_empty();
        self.sketch.clear();
        had
    }
}

#[cfg(test)]
mod tests {
    use super::DrawTool;
    use foundation::math::Vec2;
    use pretty_assertions::assert_eq;
    use scene::{Geometry, GeometryType};

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn multi_types_are_not_drawable() {
        assert!(DrawTool::new(0, GeometryType::MultiPoint).is_none());
    }

    #[test]
    fn point_finishes_immediately() {
        let mut draw = DrawTool::new(0, GeometryType::Point).expect("drawable");
        assert_eq!(draw.click(v(1.0, 2.0), 1.0), Some(Geometry::Point(v(1.0, 2.0))));
        assert!(draw.sketch().is_empty());
    }

    #[test]
    fn line_needs_two_vertices() {
        let mut draw = DrawTool::new(0, GeometryType::LineString).expect("drawable");
        assert_eq!(draw.click(v(0.0, 0.0), 1.0), None);
        assert_eq!(draw.finish(), None);
        assert_eq!(draw.click(v(100.0, 0.0), 1.0), None);
        // Clicking the last vertex again ends the line.
        assert_eq!(
            draw.click(v(101.0, 1.0), 1.0),
            Some(Geometry::LineString(vec![v(0.0, 0.0), v(100.0, 0.0)]))
        );
        assert!(draw.sketch().is_empty());
    }

    #[test]
    fn polygon_closes_on_first_vertex() {
        let mut draw = DrawTool::new(0, GeometryType::Polygon).expect("drawable");
        for p in [v(0.0, 0.0), v(100.0, 0.0), v(100.0, 100.0)] {
            assert_eq!(draw.click(p, 1.0), None);
        }
        let done = draw.click(v(2.0, -2.0), 1.0);
        assert_eq!(
            done,
            Some(Geometry::Polygon(vec![vec![
                v(0.0, 0.0),
                v(100.0, 0.0),
                v(100.0, 100.0),
                v(0.0, 0.0)
            ]]))
        );
    }

    #[test]
    fn circle_from_center_and_rim() {
        let mut draw = DrawTool::new(0, GeometryType::Circle).expect("drawable");
        assert_eq!(draw.click(v(10.0, 10.0), 1.0), None);
        assert_eq!(
            draw.click(v(13.0, 14.0), 1.0),
            Some(Geometry::Circle {
                center: v(10.0, 10.0),
                radius: 5.0
            })
        );
    }

    #[test]
    fn abort_discards_sketch() {
        let mut draw = DrawTool::new(0, GeometryType::Polygon).expect("drawable");
        draw.click(v(0.0, 0.0), 1.0);
        assert!(draw.abort());
        assert!(!draw.abort());
        assert_eq!(draw.finish(), None);
    }
}
