//! **roadnav-core** — core types for road-grid navigation.
//!
//! This crate provides the foundational types shared across the *roadnav*
//! workspace: integer grid geometry on the X/Z plane, real-valued agent
//! positions, named rectangular regions and the region store that holds the
//! current road and building snapshot.

pub mod geom;
pub mod region;

pub use geom::{Point, Position, Range};
pub use region::{Bounds, Corner, Region, RegionStore};
