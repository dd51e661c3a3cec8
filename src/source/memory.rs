//! In-memory boundary collections keyed by adcode.

use std::collections::HashMap;

use super::{parse_regions, BoundarySource};
use crate::error::{Error, Result};
use crate::models::Region;

/// Boundary collections held as raw bytes, e.g. from `include_bytes!`
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, adcode: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.documents.insert(adcode.into(), data.into());
    }

    /// Builder-style [`MemorySource::insert`]
    pub fn with(mut self, adcode: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(adcode, data);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl BoundarySource for MemorySource {
    fn regions(&self, adcode: &str) -> Result<Vec<Region>> {
        let data = self
            .documents
            .get(adcode)
            .ok_or_else(|| Error::SourceNotFound {
                adcode: adcode.to_string(),
            })?;
        parse_regions(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::collection;

    #[test]
    fn test_lookup_by_code() {
        let source = MemorySource::new().with("100000", collection(&[]));
        assert_eq!(source.len(), 1);
        assert!(source.regions("100000").unwrap().is_empty());
        assert!(source.regions("230000").unwrap_err().is_missing_source());
    }
}
