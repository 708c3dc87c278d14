//! Geometry primitives: [`Point`], [`Range`] and [`Position`].
//!
//! The world is a horizontal X/Z plane. Road cells are addressed by integer
//! [`Point`]s; agents move with real-valued [`Position`]s whose `y` component
//! (height) is carried along but never used for routing.

use std::fmt;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// An integer cell on the X/Z plane.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub z: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The four cardinal neighbours (-z, +x, +z, -x).
    #[inline]
    pub fn neighbors_4(self) -> [Point; 4] {
        [
            Self::new(self.x, self.z - 1),
            Self::new(self.x + 1, self.z),
            Self::new(self.x, self.z + 1),
            Self::new(self.x - 1, self.z),
        ]
    }

    /// Whether `other` is one cardinal step away.
    #[inline]
    pub fn is_adjacent(self, other: Point) -> bool {
        (self.x - other.x).abs() + (self.z - other.z).abs() == 1
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.z.cmp(&other.z).then(self.x.cmp(&other.x))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle of cells \[min, max). `min` is inclusive, `max` is
/// exclusive.
///
/// All empty ranges are considered equal.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        (self.min == other.min && self.max == other.max) || (self.is_empty() && other.is_empty())
    }
}

impl Eq for Range {}

impl Range {
    /// Create a new range from two corners and auto-canonicalize so that
    /// `min` ≤ `max` on each axis.
    #[inline]
    pub fn new(x0: i32, z0: i32, x1: i32, z1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), z0.min(z1)),
            max: Point::new(x0.max(x1), z0.max(z1)),
        }
    }

    /// Range covering every cell from `min` to `max` inclusive.
    ///
    /// Returns the empty range when `min` lies beyond `max` on either axis,
    /// or when `max` sits on `i32::MAX` and has no exclusive bound.
    #[inline]
    pub fn inclusive(min: Point, max: Point) -> Self {
        if min.x > max.x || min.z > max.z {
            return Self::default();
        }
        let (Some(x), Some(z)) = (max.x.checked_add(1), max.z.checked_add(1)) else {
            return Self::default();
        };
        Self {
            min,
            max: Point::new(x, z),
        }
    }

    /// Width of the range along X.
    #[inline]
    pub fn width(self) -> u32 {
        span(self.min.x, self.max.x)
    }

    /// Depth of the range along Z.
    #[inline]
    pub fn depth(self) -> u32 {
        span(self.min.z, self.max.z)
    }

    /// Total number of cells in the range, saturating at `usize::MAX`.
    #[inline]
    pub fn len(self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.width() as usize).saturating_mul(self.depth() as usize)
    }

    /// Whether the range has zero or negative area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.z >= self.max.z
    }

    /// Whether `p` is inside the half-open range.
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.z >= self.min.z && p.z < self.max.z
    }

    /// Row-major (z outer, x inner) iterator over every cell in the range.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            cur: self.min,
        }
    }
}

/// Distance from `lo` to `hi`, zero when inverted. Never overflows.
#[inline]
fn span(lo: i32, hi: i32) -> u32 {
    (i64::from(hi) - i64::from(lo)).max(0) as u32
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;
    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{})", self.min, self.max)
    }
}

/// Row-major iterator over the cells in a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    cur: Point,
}

impl Iterator for RangeIter {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        if self.cur.z >= self.range.max.z || self.range.is_empty() {
            return None;
        }
        let p = self.cur;
        self.cur.x += 1;
        if self.cur.x >= self.range.max.x {
            self.cur.x = self.range.min.x;
            self.cur.z += 1;
        }
        Some(p)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.range.is_empty() || self.cur.z >= self.range.max.z {
            return (0, Some(0));
        }
        let w = self.range.width() as usize;
        let remaining_in_row = span(self.cur.x, self.range.max.x) as usize;
        let remaining_rows = span(self.cur.z, self.range.max.z) as usize - 1;
        let total = remaining_rows
            .saturating_mul(w)
            .saturating_add(remaining_in_row);
        (total, Some(total))
    }
}

impl ExactSizeIterator for RangeIter {}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A real-valued agent position as reported by a positioning service.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub y: f64,
    pub z: f64,
}

impl Position {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Position on the ground plane (`y = 0`).
    #[inline]
    pub const fn planar(x: f64, z: f64) -> Self {
        Self { x, y: 0.0, z }
    }

    /// Per-axis planar displacement `(|dx|, |dz|)` from `other`.
    #[inline]
    pub fn planar_offset(self, other: Position) -> (f64, f64) {
        ((self.x - other.x).abs(), (self.z - other.z).abs())
    }

    /// Manhattan distance on the X/Z plane to the cell `p`.
    #[inline]
    pub fn manhattan_to(self, p: Point) -> f64 {
        (self.x - p.x as f64).abs() + (self.z - p.z as f64).abs()
    }

    /// The cell this position falls in (floored on both axes).
    #[inline]
    pub fn cell(self) -> Point {
        Point::new(self.x.floor() as i32, self.z.floor() as i32)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}
