//! Error type for boundary loading and index construction.

use std::io;
use std::path::PathBuf;

/// Errors raised while loading boundary sources or building indexes.
///
/// Lookup never fails: a point outside every known region is a normal
/// outcome and is reported as `None` (or [`crate::NOT_FOUND`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No boundary source exists for the requested adcode.
    #[error("no boundary source for adcode {adcode}")]
    SourceNotFound { adcode: String },

    /// The boundary source exists but could not be read.
    #[error("failed to read boundary source {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bytes are not a GeoJSON feature collection.
    #[error("invalid boundary collection: {0}")]
    Parse(String),

    /// A feature lacks one of the attributes the key schema requires.
    #[error("file has no key: {key} in some features")]
    MissingAttribute { key: String },

    /// A composite key split into a different number of fields than expected.
    #[error("composite key decoded into {found} fields, expected {expected}")]
    DecodeMismatch { expected: usize, found: usize },
}

impl Error {
    /// True when the source for an adcode simply does not exist.
    ///
    /// During hierarchy construction this is how leaf units show up.
    pub fn is_missing_source(&self) -> bool {
        matches!(self, Error::SourceNotFound { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
