//! Named rectangular regions and the [`RegionStore`] that holds them.
//!
//! A [`Region`] is described by its corner list exactly as it arrives from the
//! world; only the first four corners are read and their order does not
//! matter. Regions with fewer than four corners, or with non-finite
//! coordinates, are *malformed*: they never contribute road cells and never
//! contain anything.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::geom::{Point, Position, Range};

/// Number of corners a well-formed region must provide.
pub const REGION_CORNERS: usize = 4;

/// Largest absolute cell coordinate a road may cover on either axis.
///
/// Keeps cell distances and search scores well inside `i32`.
pub const GRID_LIMIT: i32 = 1 << 28;

/// One corner of a region. `y` is carried but unused.
///
/// A missing `x` or `z` on the wire reads as NaN, which makes the owning
/// region malformed.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Corner {
    #[cfg_attr(feature = "serde", serde(default = "missing_coordinate"))]
    pub x: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub y: f64,
    #[cfg_attr(feature = "serde", serde(default = "missing_coordinate"))]
    pub z: f64,
}

#[cfg(feature = "serde")]
fn missing_coordinate() -> f64 {
    f64::NAN
}

impl Corner {
    #[inline]
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, y: 0.0, z }
    }
}

/// Real-valued axis-aligned bounding box on the X/Z plane (inclusive).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Bounds {
    /// Whether `p` lies inside or on the edge of the box.
    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.z >= self.min_z && p.z <= self.max_z
    }

    /// Average of the min and max corners on each axis.
    #[inline]
    pub fn centroid(&self) -> Position {
        Position::planar(
            (self.min_x + self.max_x) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }

    /// The integer cells covered by the box: every `(x, z)` with
    /// `min_x <= x <= max_x` and `min_z <= z <= max_z`.
    ///
    /// Returns `None` when the box reaches past [`GRID_LIMIT`] on either
    /// axis.
    pub fn cells(&self) -> Option<Range> {
        let limit = f64::from(GRID_LIMIT);
        let in_grid = |lo: f64, hi: f64| lo >= -limit && hi <= limit;
        if !in_grid(self.min_x, self.max_x) || !in_grid(self.min_z, self.max_z) {
            return None;
        }
        Some(Range::inclusive(
            Point::new(self.min_x.ceil() as i32, self.min_z.ceil() as i32),
            Point::new(self.max_x.floor() as i32, self.max_z.floor() as i32),
        ))
    }
}

/// A named rectangle, either a road or a building.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub corners: Vec<Corner>,
}

impl Region {
    /// Create a region from an explicit corner list.
    pub fn new(name: impl Into<String>, corners: Vec<Corner>) -> Self {
        Self {
            name: name.into(),
            corners,
        }
    }

    /// Convenience constructor for an axis-aligned rectangle spanning
    /// `(x0, z0)` to `(x1, z1)`, in any order.
    pub fn rect(name: impl Into<String>, x0: f64, z0: f64, x1: f64, z1: f64) -> Self {
        Self::new(
            name,
            vec![
                Corner::new(x0, z0),
                Corner::new(x1, z0),
                Corner::new(x1, z1),
                Corner::new(x0, z1),
            ],
        )
    }

    /// Bounding box of the first four corners, or `None` when malformed.
    pub fn bounds(&self) -> Option<Bounds> {
        let corners = self.corners.get(..REGION_CORNERS)?;
        if corners.iter().any(|c| !c.x.is_finite() || !c.z.is_finite()) {
            return None;
        }
        let mut b = Bounds {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_z: f64::INFINITY,
            max_z: f64::NEG_INFINITY,
        };
        for c in corners {
            b.min_x = b.min_x.min(c.x);
            b.max_x = b.max_x.max(c.x);
            b.min_z = b.min_z.min(c.z);
            b.max_z = b.max_z.max(c.z);
        }
        Some(b)
    }

    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.bounds().is_some()
    }

    /// Centre of the bounding box, used as the routing target.
    #[inline]
    pub fn centroid(&self) -> Option<Position> {
        self.bounds().map(|b| b.centroid())
    }

    /// Whether `p` is inside the bounding box. Malformed regions contain
    /// nothing.
    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        self.bounds().is_some_and(|b| b.contains(p))
    }
}

/// In-process content digest of a region list, used to detect real changes
/// when a snapshot is re-sent. Not stable across builds; never persist it.
pub fn digest(regions: &[Region]) -> u64 {
    let mut h = DefaultHasher::new();
    regions.len().hash(&mut h);
    for r in regions {
        r.name.hash(&mut h);
        r.corners.len().hash(&mut h);
        for c in &r.corners {
            c.x.to_bits().hash(&mut h);
            c.y.to_bits().hash(&mut h);
            c.z.to_bits().hash(&mut h);
        }
    }
    h.finish()
}

// ---------------------------------------------------------------------------
// RegionStore
// ---------------------------------------------------------------------------

/// The current road and building snapshot.
///
/// Both collections are replaced wholesale; the store never patches
/// individual regions.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionStore {
    #[cfg_attr(feature = "serde", serde(default))]
    pub roads: Vec<Region>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub buildings: Vec<Region>,
}

impl RegionStore {
    pub fn new(roads: Vec<Region>, buildings: Vec<Region>) -> Self {
        Self { roads, buildings }
    }

    /// Replace both collections.
    pub fn replace(&mut self, roads: Vec<Region>, buildings: Vec<Region>) {
        self.roads = roads;
        self.buildings = buildings;
    }

    #[inline]
    pub fn roads(&self) -> &[Region] {
        &self.roads
    }

    #[inline]
    pub fn buildings(&self) -> &[Region] {
        &self.buildings
    }

    /// First building with exactly this name.
    pub fn building(&self, name: &str) -> Option<&Region> {
        self.buildings.iter().find(|b| b.name == name)
    }

    /// Building names in store order, as a destination menu would list them.
    pub fn building_names(&self) -> impl Iterator<Item = &str> {
        self.buildings.iter().map(|b| b.name.as_str())
    }

    /// First road region containing `p`.
    pub fn road_at(&self, p: Position) -> Option<&Region> {
        self.roads.iter().find(|r| r.contains(p))
    }

    /// First building region containing `p`.
    pub fn building_at(&self, p: Position) -> Option<&Region> {
        self.buildings.iter().find(|r| r.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_order_independent() {
        let r = Region::new(
            "plaza",
            vec![
                Corner::new(10.0, -2.0),
                Corner::new(-4.0, 7.0),
                Corner::new(10.0, 7.0),
                Corner::new(-4.0, -2.0),
            ],
        );
        let b = r.bounds().unwrap();
        assert_eq!((b.min_x, b.max_x, b.min_z, b.max_z), (-4.0, 10.0, -2.0, 7.0));
        assert_eq!(b.centroid(), Position::planar(3.0, 2.5));
    }

    #[test]
    fn too_few_corners_is_malformed() {
        let r = Region::new("broken", vec![Corner::new(0.0, 0.0), Corner::new(5.0, 5.0)]);
        assert!(!r.is_well_formed());
        assert!(r.centroid().is_none());
        assert!(!r.contains(Position::planar(1.0, 1.0)));
    }

    #[test]
    fn non_finite_corner_is_malformed() {
        let mut r = Region::rect("nan", 0.0, 0.0, 3.0, 3.0);
        r.corners[2].x = f64::NAN;
        assert!(r.bounds().is_none());
    }

    #[test]
    fn extra_corners_are_ignored() {
        let mut r = Region::rect("road", 0.0, 0.0, 2.0, 2.0);
        r.corners.push(Corner::new(100.0, 100.0));
        assert_eq!(r.bounds().unwrap().max_x, 2.0);
    }

    #[test]
    fn cells_round_inward() {
        let b = Region::rect("r", 0.5, -1.2, 3.9, 1.0).bounds().unwrap();
        let cells = b.cells().unwrap();
        assert_eq!(cells.min, Point::new(1, -1));
        assert_eq!(cells.max, Point::new(4, 2));
        assert_eq!(cells.len(), 9);
    }

    #[test]
    fn thin_box_without_integer_has_no_cells() {
        let b = Region::rect("sliver", 0.2, 0.0, 0.8, 5.0).bounds().unwrap();
        assert!(b.cells().unwrap().is_empty());
    }

    #[test]
    fn box_past_grid_limit_has_no_cells() {
        let max = f64::from(i32::MAX);
        let edge = Region::rect("edge", max - 2.0, 0.0, max, 0.0);
        assert!(edge.is_well_formed());
        assert!(edge.bounds().unwrap().cells().is_none());

        let wide = Region::rect("wide", -2e9, 0.0, 2e9, -1.0);
        assert!(wide.bounds().unwrap().cells().is_none());

        let limit = f64::from(GRID_LIMIT);
        let rim = Region::rect("rim", limit - 1.0, -limit, limit, -limit);
        assert_eq!(rim.bounds().unwrap().cells().unwrap().len(), 2);
    }

    #[test]
    fn contains_is_inclusive() {
        let r = Region::rect("r", 0.0, 0.0, 4.0, 4.0);
        assert!(r.contains(Position::planar(4.0, 0.0)));
        assert!(!r.contains(Position::planar(4.01, 0.0)));
    }

    #[test]
    fn store_lookups() {
        let store = RegionStore::new(
            vec![
                Region::new("bad", vec![]),
                Region::rect("main street", 0.0, 0.0, 20.0, 2.0),
            ],
            vec![
                Region::rect("bakery", 0.0, 3.0, 4.0, 6.0),
                Region::rect("library", 10.0, 3.0, 14.0, 8.0),
            ],
        );
        assert_eq!(store.building("library").unwrap().name, "library");
        assert!(store.building("Library").is_none());
        assert_eq!(
            store.building_names().collect::<Vec<_>>(),
            vec!["bakery", "library"]
        );
        assert_eq!(
            store.road_at(Position::planar(5.0, 1.0)).unwrap().name,
            "main street"
        );
        assert!(store.building_at(Position::planar(5.0, 1.0)).is_none());
        assert_eq!(
            store.building_at(Position::new(12.0, 70.0, 4.0)).unwrap().name,
            "library"
        );
    }

    #[test]
    fn digest_tracks_content() {
        let a = vec![Region::rect("a", 0.0, 0.0, 1.0, 1.0)];
        let b = vec![Region::rect("a", 0.0, 0.0, 1.0, 2.0)];
        assert_eq!(digest(&a), digest(&a.clone()));
        assert_ne!(digest(&a), digest(&b));
        assert_ne!(digest(&[]), digest(&a));
    }
}
