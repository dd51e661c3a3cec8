//! Boundary files on disk, one `{adcode}_full.json` per administrative unit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::{parse_regions, BoundarySource};
use crate::error::{Error, Result};
use crate::models::Region;

/// File name suffix appended to the adcode
pub const DEFAULT_FILE_SUFFIX: &str = "_full.json";

/// Directory of boundary files named `{adcode}{suffix}`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    base_dir: PathBuf,
    suffix: String,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            suffix: DEFAULT_FILE_SUFFIX.to_string(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the boundary file for an adcode
    pub fn path_for(&self, adcode: &str) -> PathBuf {
        self.base_dir.join(format!("{}{}", adcode, self.suffix))
    }

    /// Read the raw bytes of the boundary file for an adcode
    pub fn read(&self, adcode: &str) -> Result<Vec<u8>> {
        // Codes come from file contents; never let one escape the directory
        if adcode.is_empty() || adcode.contains(['/', '\\']) || adcode == ".." {
            return Err(Error::SourceNotFound {
                adcode: adcode.to_string(),
            });
        }

        let path = self.path_for(adcode);
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::SourceNotFound {
                adcode: adcode.to_string(),
            }),
            Err(source) => Err(Error::SourceRead { path, source }),
        }
    }

    /// Adcodes that have a boundary file in the directory, sorted
    pub fn available_codes(&self) -> Result<Vec<String>> {
        let mut codes = Vec::new();

        for entry in WalkDir::new(&self.base_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::SourceRead {
                path: self.base_dir.clone(),
                source: io::Error::from(e),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(code) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(self.suffix.as_str()))
            {
                if !code.is_empty() {
                    codes.push(code.to_string());
                }
            }
        }

        codes.sort();
        Ok(codes)
    }
}

impl BoundarySource for DirectorySource {
    fn regions(&self, adcode: &str) -> Result<Vec<Region>> {
        let data = self.read(adcode)?;
        debug!(
            "Read {} bytes of boundaries for {} from {}",
            data.len(),
            adcode,
            self.path_for(adcode).display()
        );
        parse_regions(&data)
    }
}
