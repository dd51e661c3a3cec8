//! Point-in-Polygon (PIP) administrative lookup.
//!
//! Builds one keyed polygon index per administrative unit, links them into
//! a tree by adcode, and walks that tree for a point. Lookups scan every
//! region of a unit; there is no spatial index.

pub mod codec;
mod hierarchy;
mod index;
mod locator;
mod schema;

pub use codec::{KeyCodec, DEFAULT_DELIMITER};
pub use hierarchy::{BuildFailure, HierarchicalGeo, HierarchyBuild};
pub use index::{RegionEntry, RegionIndex, NOT_FOUND};
pub use locator::MultiLevelLocator;
pub use schema::{KeySchema, DEFAULT_ADCODE_KEY};
