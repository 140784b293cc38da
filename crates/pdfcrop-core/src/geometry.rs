/// A point in page space (1/72 inch, bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Affine transformation matrix `[a b c d e f]`.
///
/// Points are treated as row vectors, so `p' = p × M`:
///
/// ```text
/// x' = a·x + c·y + e
/// y' = b·x + d·y + f
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ctm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Ctm {
    fn default() -> Self {
        Self::identity()
    }
}

impl Ctm {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Build from a 6-element array `[a, b, c, d, e, f]`.
    pub fn from_array(m: [f64; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Compose two matrices: the result applies `self` first, then `other`.
    pub fn concat(&self, other: &Ctm) -> Ctm {
        Ctm {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }

    /// Average linear scale factor, used to bring line widths into device space.
    pub fn mean_scale(&self) -> f64 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

/// Axis-aligned rectangle in page space.
///
/// Unlike a PDF `/MediaBox` array the bounds are always normalized:
/// `min_x <= max_x` and `min_y <= max_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Create a rectangle from two opposite corners in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Create a rectangle from its lower-left corner and size.
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Degenerate rectangle covering a single point.
    pub fn from_point(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// The four corners, counter-clockwise from the lower-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn include_point(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn include_rect(&mut self, other: &Rect) {
        *self = self.union(other);
    }

    /// Bounding box of this rectangle after transformation by `ctm`.
    pub fn transform(&self, ctm: &Ctm) -> Rect {
        let [p0, p1, p2, p3] = self.corners();
        let mut out = Rect::from_point(ctm.transform_point(p0));
        out.include_point(ctm.transform_point(p1));
        out.include_point(ctm.transform_point(p2));
        out.include_point(ctm.transform_point(p3));
        out
    }

    /// Grow every edge outward by `amount`.
    pub fn outset(&self, amount: f64) -> Rect {
        Rect {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Whether `other` lies entirely within this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Snap edges lying outside `bounds` back onto the matching edge of `bounds`.
    ///
    /// Edges already inside are left untouched, so clipping twice is a no-op.
    /// An axis lying wholly outside `bounds` collapses onto the nearest edge.
    pub fn clip_to(&self, bounds: &Rect) -> Rect {
        let (min_x, max_x) = clip_axis(self.min_x, self.max_x, bounds.min_x, bounds.max_x);
        let (min_y, max_y) = clip_axis(self.min_y, self.max_y, bounds.min_y, bounds.max_y);
        Rect {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Rectangle from edges that may cross. A crossed axis collapses to the
    /// midpoint of its two edges.
    pub fn from_edges(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Rect {
        let (min_x, max_x) = collapse_crossed(min_x, max_x);
        let (min_y, max_y) = collapse_crossed(min_y, max_y);
        Rect {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

fn collapse_crossed(lo: f64, hi: f64) -> (f64, f64) {
    if lo > hi {
        let mid = 0.5 * (lo + hi);
        (mid, mid)
    } else {
        (lo, hi)
    }
}

/// Clip one axis; an interval outside the bounds collapses onto the nearest point.
fn clip_axis(lo: f64, hi: f64, bound_lo: f64, bound_hi: f64) -> (f64, f64) {
    let (lo, hi) = collapse_crossed(lo.max(bound_lo), hi.min(bound_hi));
    if lo < bound_lo || hi > bound_hi {
        let p = lo.clamp(bound_lo, bound_hi);
        (p, p)
    } else {
        (lo, hi)
    }
}

/// Grow an optional extent to include `rect`.
pub fn grow(extent: &mut Option<Rect>, rect: &Rect) {
    match extent {
        Some(current) => current.include_rect(rect),
        None => *extent = Some(*rect),
    }
}
