//! Tree of region indexes keyed by administrative code.
//!
//! The root unit's index is built first; every adcode its regions carry is
//! then loaded as a child unit, and so on down. Depth depends entirely on
//! which boundary files exist.

use hashbrown::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

use super::{KeySchema, RegionIndex};
use crate::error::{Error, Result};
use crate::source::{BoundarySource, DirectorySource};

/// A child unit whose index could not be built
#[derive(Debug)]
pub struct BuildFailure {
    pub adcode: String,
    /// Unit whose regions referenced `adcode`
    pub parent: String,
    pub error: Error,
}

/// Result of a hierarchy build: the indexes that were built plus every
/// child that was skipped.
#[derive(Debug)]
pub struct HierarchyBuild {
    geo: HierarchicalGeo,
    failures: Vec<BuildFailure>,
}

impl HierarchyBuild {
    pub fn geo(&self) -> &HierarchicalGeo {
        &self.geo
    }

    pub fn failures(&self) -> &[BuildFailure] {
        &self.failures
    }

    /// Failures other than missing sources (leaf units)
    pub fn unexpected_failures(&self) -> impl Iterator<Item = &BuildFailure> {
        self.failures.iter().filter(|f| !f.error.is_missing_source())
    }

    pub fn into_geo(self) -> HierarchicalGeo {
        self.geo
    }

    pub fn into_parts(self) -> (HierarchicalGeo, Vec<BuildFailure>) {
        (self.geo, self.failures)
    }
}

#[derive(Debug, Clone)]
pub struct HierarchicalGeo {
    root: String,
    indexes: HashMap<String, RegionIndex>,
}

impl HierarchicalGeo {
    /// Build the hierarchy below `root`.
    ///
    /// Failing to build the root index is an error. Children that fail are
    /// recorded in [`HierarchyBuild::failures`] and skipped. Each adcode is
    /// loaded at most once, so cyclic code references terminate.
    pub fn build<S>(source: &S, root: &str, schema: &KeySchema) -> Result<HierarchyBuild>
    where
        S: BoundarySource + ?Sized,
    {
        info!("Building region hierarchy from root adcode {}", root);

        let root_index = RegionIndex::build(source.regions(root)?, schema)?;

        let mut indexes = HashMap::new();
        let mut failures = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(root.to_string());

        // (adcode, parent) pairs; popped depth-first
        let mut pending: Vec<(String, String)> = Vec::new();
        schedule_children(&mut pending, &mut visited, root, &root_index);
        indexes.insert(root.to_string(), root_index);

        while let Some((adcode, parent)) = pending.pop() {
            let built = source
                .regions(&adcode)
                .and_then(|regions| RegionIndex::build(regions, schema));

            match built {
                Ok(index) => {
                    debug!(
                        "Built index for {} ({} regions, {} child codes)",
                        adcode,
                        index.len(),
                        index.adcodes().len()
                    );
                    schedule_children(&mut pending, &mut visited, &adcode, &index);
                    indexes.insert(adcode, index);
                }
                Err(error) => {
                    if error.is_missing_source() {
                        debug!("No boundaries below {} (parent {})", adcode, parent);
                    } else {
                        warn!("Skipping {} (parent {}): {}", adcode, parent, error);
                    }
                    failures.push(BuildFailure {
                        adcode,
                        parent,
                        error,
                    });
                }
            }
        }

        info!(
            "Region hierarchy built: {} indexes, {} codes without an index",
            indexes.len(),
            failures.len()
        );

        Ok(HierarchyBuild {
            geo: HierarchicalGeo {
                root: root.to_string(),
                indexes,
            },
            failures,
        })
    }

    /// Build from a directory of `{adcode}_full.json` files
    pub fn from_dir<P: AsRef<Path>>(
        dir: P,
        root: &str,
        schema: &KeySchema,
    ) -> Result<HierarchyBuild> {
        Self::build(&DirectorySource::new(dir), root, schema)
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn root_index(&self) -> Option<&RegionIndex> {
        self.indexes.get(&self.root)
    }

    pub fn get(&self, adcode: &str) -> Option<&RegionIndex> {
        self.indexes.get(adcode)
    }

    pub fn contains_code(&self, adcode: &str) -> bool {
        self.indexes.contains_key(adcode)
    }

    /// Adcodes that have an index, sorted
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.indexes.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

/// Queue unseen child codes so the first-seen child is popped first
fn schedule_children(
    pending: &mut Vec<(String, String)>,
    visited: &mut HashSet<String>,
    parent: &str,
    index: &RegionIndex,
) {
    for adcode in index.adcodes().iter().rev() {
        if visited.insert(adcode.clone()) {
            pending.push((adcode.clone(), parent.to_string()));
        }
    }
}
