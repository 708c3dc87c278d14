use roadnav_core::Point;

/// Manhattan (L1) distance between two cells.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.z - b.z).abs()
}
