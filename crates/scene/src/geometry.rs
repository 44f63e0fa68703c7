use std::fmt;
use std::str::FromStr;

use foundation::bounds::Aabb2;
use foundation::math::Vec2;

/// Segments used when a circle has to be expressed as a polygon.
pub const CIRCLE_SEGMENTS: usize = 64;

/// Geometry kinds the editor knows about.
///
/// Only `Point`, `LineString`, `Polygon` and `Circle` can be drawn; the
/// multi-part kinds arrive through import.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    Circle,
}

impl GeometryType {
    pub const DRAWABLE: [GeometryType; 4] = [
        GeometryType::Point,
        GeometryType::LineString,
        GeometryType::Polygon,
        GeometryType::Circle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::Circle => "Circle",
        }
    }

    pub fn is_drawable(self) -> bool {
        Self::DRAWABLE.contains(&self)
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown geometry type: {0}")]
pub struct UnknownGeometryType(pub String);

impl FromStr for GeometryType {
    type Err = UnknownGeometryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Point" => Ok(GeometryType::Point),
            "LineString" => Ok(GeometryType::LineString),
            "Polygon" => Ok(GeometryType::Polygon),
            "MultiPoint" => Ok(GeometryType::MultiPoint),
            "MultiLineString" => Ok(GeometryType::MultiLineString),
            "MultiPolygon" => Ok(GeometryType::MultiPolygon),
            "Circle" => Ok(GeometryType::Circle),
            other => Err(UnknownGeometryType(other.to_string())),
        }
    }
}

/// Geometry in working-projection coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Vec2),
    LineString(Vec<Vec2>),
    /// Outer ring first, then holes. Rings are closed (first == last).
    Polygon(Vec<Vec<Vec2>>),
    MultiPoint(Vec<Vec2>),
    MultiLineString(Vec<Vec<Vec2>>),
    MultiPolygon(Vec<Vec<Vec<Vec2>>>),
    Circle { center: Vec2, radius: f64 },
}

impl Geometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::Circle { .. } => GeometryType::Circle,
        }
    }

    /// Every stored vertex in storage order. A circle yields its center.
    pub fn vertices(&self) -> Vec<Vec2> {
        match self {
            Geometry::Point(p) => vec![*p],
            Geometry::LineString(line) | Geometry::MultiPoint(line) => line.clone(),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().flatten().copied().collect()
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().flatten().copied().collect(),
            Geometry::Circle { center, .. } => vec![*center],
        }
    }

    /// Line segments of the rendered outline.
    pub fn segments(&self) -> Vec<(Vec2, Vec2)> {
        fn push_path(out: &mut Vec<(Vec2, Vec2)>, path: &[Vec2]) {
            out.extend(path.windows(2).map(|w| (w[0], w[1])));
        }

        let mut out = Vec::new();
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) | Geometry::Circle { .. } => {}
            Geometry::LineString(line) => push_path(&mut out, line),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                for ring in rings {
                    push_path(&mut out, ring);
                }
            }
            Geometry::MultiPolygon(polys) => {
                for ring in polys.iter().flatten() {
                    push_path(&mut out, ring);
                }
            }
        }
        out
    }

    pub fn extent(&self) -> Option<Aabb2> {
        match self {
            Geometry::Circle { center, radius } => Some(Aabb2::new(
                [center.x - radius, center.y - radius],
                [center.x + radius, center.y + radius],
            )),
            _ => Aabb2::from_points(&self.vertices()),
        }
    }

    /// Applies `f` to every coordinate. Circle radii are carried unchanged.
    pub fn map_coords(&self, f: &mut impl FnMut(Vec2) -> Vec2) -> Geometry {
        fn path(p: &[Vec2], f: &mut impl FnMut(Vec2) -> Vec2) -> Vec<Vec2> {
            p.iter().map(|v| f(*v)).collect()
        }

        match self {
            Geometry::Point(p) => Geometry::Point(f(*p)),
            Geometry::LineString(line) => Geometry::LineString(path(line, f)),
            Geometry::MultiPoint(points) => Geometry::MultiPoint(path(points, f)),
            Geometry::Polygon(rings) => {
                Geometry::Polygon(rings.iter().map(|r| path(r, f)).collect())
            }
            Geometry::MultiLineString(lines) => {
                Geometry::MultiLineString(lines.iter().map(|l| path(l, f)).collect())
            }
            Geometry::MultiPolygon(polys) => Geometry::MultiPolygon(
                polys
                    .iter()
                    .map(|rings| rings.iter().map(|r| path(r, f)).collect())
                    .collect(),
            ),
            Geometry::Circle { center, radius } => Geometry::Circle {
                center: f(*center),
                radius: *radius,
            },
        }
    }

    /// Replaces the `index`-th vertex (in `vertices()` order).
    ///
    /// Closed rings keep their closure: moving the first vertex of a ring
    /// also moves the last one and vice versa. Moving a circle's center
    /// translates the circle. Returns `false` if `index` is out of range.
    pub fn move_vertex(&mut self, index: usize, to: Vec2) -> bool {
        fn move_in_path(path: &mut [Vec2], index: &mut usize, to: Vec2, closed: bool) -> bool {
            if *index >= path.len() {
                *index -= path.len();
                return false;
            }
            let last = path.len() - 1;
            path[*index] = to;
            if closed && last > 0 {
                if *index == 0 {
                    path[last] = to;
                } else if *index == last {
                    path[0] = to;
                }
            }
            true
        }

        let mut index = index;
        match self {
            Geometry::Point(p) => {
                if index == 0 {
                    *p = to;
                    return true;
                }
                false
            }
            Geometry::Circle { center, .. } => {
                if index == 0 {
                    *center = to;
                    return true;
                }
                false
            }
            Geometry::LineString(line) | Geometry::MultiPoint(line) => {
                move_in_path(line, &mut index, to, false)
            }
            Geometry::MultiLineString(lines) => lines
                .iter_mut()
                .any(|l| move_in_path(l, &mut index, to, false)),
            Geometry::Polygon(rings) => rings
                .iter_mut()
                .any(|r| move_in_path(r, &mut index, to, true)),
            Geometry::MultiPolygon(polys) => polys
                .iter_mut()
                .flatten()
                .any(|r| move_in_path(r, &mut index, to, true)),
        }
    }

    /// Circles become regular polygons; every other kind is returned as is.
    pub fn circle_to_polygon(&self, segments: usize) -> Geometry {
        let Geometry::Circle { center, radius } = self else {
            return self.clone();
        };
        let n = segments.max(3);
        let mut ring: Vec<Vec2> = (0..n)
            .map(|i| {
                let a = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
                Vec2::new(center.x + radius * a.cos(), center.y + radius * a.sin())
            })
            .collect();
        ring.push(ring[0]);
        Geometry::Polygon(vec![ring])
    }
}

/// Even-odd point-in-ring test.
pub fn ring_contains(ring: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Polygon containment honoring holes: inside the outer ring and outside every hole.
pub fn polygon_contains(rings: &[Vec<Vec2>], p: Vec2) -> bool {
    let Some((outer, holes)) = rings.split_first() else {
        return false;
    };
    ring_contains(outer, p) && !holes.iter().any(|h| ring_contains(h, p))
}
