//! adlookup - hierarchical administrative region lookup over GeoJSON boundaries.
//!
//! This library provides the boundary sources, polygon indexes and the
//! multi-level locator shared by the `locate` and `query` binaries.

pub mod config;
pub mod error;
pub mod models;
pub mod pip;
pub mod source;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{Error, Result};
pub use models::{AttrValue, GeoPoint, LevelRecord, Region};
pub use pip::{
    HierarchicalGeo, HierarchyBuild, KeyCodec, KeySchema, MultiLevelLocator, RegionIndex,
    NOT_FOUND,
};
