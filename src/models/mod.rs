//! Core data models for administrative lookup.

pub mod admin;
pub mod point;
pub mod record;

pub use admin::{AttrValue, Region};
pub use point::GeoPoint;
pub use record::LevelRecord;
