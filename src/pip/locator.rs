//! Multi-level lookup: root region, then its child unit, and so on down.

use hashbrown::HashSet;
use std::path::Path;
use tracing::debug;

use super::{HierarchicalGeo, KeySchema};
use crate::error::Result;
use crate::models::{GeoPoint, LevelRecord};
use crate::source::{BoundarySource, DirectorySource};

/// Resolves a point to one record per administrative level
#[derive(Debug, Clone)]
pub struct MultiLevelLocator {
    geo: HierarchicalGeo,
    schema: KeySchema,
    max_levels: Option<usize>,
}

impl MultiLevelLocator {
    /// Locator over an already built hierarchy, with no level limit
    pub fn new(geo: HierarchicalGeo, schema: KeySchema) -> Self {
        Self {
            geo,
            schema,
            max_levels: None,
        }
    }

    /// Build the hierarchy from a source; child failures are dropped
    pub fn from_source<S>(source: &S, root: &str, schema: KeySchema) -> Result<Self>
    where
        S: BoundarySource + ?Sized,
    {
        let geo = HierarchicalGeo::build(source, root, &schema)?.into_geo();
        Ok(Self::new(geo, schema))
    }

    /// Build from a directory of `{adcode}_full.json` files
    pub fn from_dir<P: AsRef<Path>>(dir: P, root: &str, schema: KeySchema) -> Result<Self> {
        Self::from_source(&DirectorySource::new(dir), root, schema)
    }

    /// Stop after `levels` records
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = Some(levels);
        self
    }

    pub fn max_levels(&self) -> Option<usize> {
        self.max_levels
    }

    pub fn hierarchy(&self) -> &HierarchicalGeo {
        &self.geo
    }

    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    /// Records for (lat, lon), outermost level first
    pub fn find_loc(&self, lat: f64, lon: f64) -> Vec<LevelRecord> {
        self.lookup(&GeoPoint::new(lat, lon))
    }

    /// Walk the hierarchy for a point.
    ///
    /// Returns an empty vector when the root index is missing or does not
    /// contain the point. Descends while the matched region has a non-empty
    /// adcode with a registered index, and stops at the first miss.
    pub fn lookup(&self, point: &GeoPoint) -> Vec<LevelRecord> {
        let mut levels = Vec::new();
        let Some(mut index) = self.geo.root_index() else {
            return levels;
        };

        let adcode_position = self.schema.adcode_position();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(self.geo.root());

        loop {
            if self.max_levels.is_some_and(|max| levels.len() >= max) {
                break;
            }

            let Some((_, values)) = index.locate_values(point) else {
                break;
            };
            levels.push(LevelRecord::from_fields(self.schema.keys(), values));

            let next = adcode_position
                .and_then(|pos| values.get(pos))
                .map(String::as_str)
                .filter(|code| !code.is_empty());

            let Some(code) = next else {
                break;
            };
            // a code that repeats on the path would loop forever
            if !visited.insert(code) {
                break;
            }
            match self.geo.get(code) {
                Some(child) => index = child,
                None => break,
            }
        }

        debug!(
            "Lookup at ({}, {}): {} levels",
            point.lat,
            point.lon,
            levels.len()
        );
        levels
    }

    /// Whether the point lies inside any root-level region
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.geo
            .root_index()
            .is_some_and(|index| index.contain_loc(lat, lon))
    }
}
