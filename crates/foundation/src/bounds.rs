use crate::math::Vec2;

/// Axis-aligned 2D extent in working-projection units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Smallest extent covering `points`; `None` when empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut out = Aabb2::new([first.x, first.y], [first.x, first.y]);
        for p in it {
            out.min[0] = out.min[0].min(p.x);
            out.min[1] = out.min[1].min(p.y);
            out.max[0] = out.max[0].max(p.x);
            out.max[1] = out.max[1].max(p.y);
        }
        Some(out)
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Grows the extent by `margin` on every side.
    pub fn buffered(&self, margin: f64) -> Self {
        Aabb2::new(
            [self.min[0] - margin, self.min[1] - margin],
            [self.max[0] + margin, self.max[1] + margin],
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min[0] && p.x <= self.max[0] && p.y >= self.min[1] && p.y <= self.max[1]
    }
}
