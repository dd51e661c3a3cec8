//! Boundary sources: where the regions for an adcode come from.
//!
//! Boundary files are GeoJSON feature collections. A source resolves an
//! administrative code to the decoded regions of its subdivisions.

mod directory;
mod features;
mod memory;

pub use directory::{DirectorySource, DEFAULT_FILE_SUFFIX};
pub use features::parse_regions;
pub use memory::MemorySource;

use crate::error::Result;
use crate::models::Region;

/// Resolves "the boundary collection for adcode X".
///
/// Returns [`crate::Error::SourceNotFound`] when no collection exists for
/// the code; hierarchy construction treats that as a leaf.
pub trait BoundarySource {
    fn regions(&self, adcode: &str) -> Result<Vec<Region>>;
}

impl<T: BoundarySource + ?Sized> BoundarySource for &T {
    fn regions(&self, adcode: &str) -> Result<Vec<Region>> {
        (**self).regions(adcode)
    }
}
