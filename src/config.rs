//! TOML configuration for the `locate` and `query` binaries.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pip::{HierarchicalGeo, HierarchyBuild, KeySchema, MultiLevelLocator};
use crate::pip::{DEFAULT_ADCODE_KEY, DEFAULT_DELIMITER};
use crate::source::{DirectorySource, DEFAULT_FILE_SUFFIX};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub locator: LocatorConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocatorConfig {
    /// Directory holding `{adcode}{file_suffix}` boundary files
    pub data_dir: PathBuf,
    pub root_adcode: String,
    #[serde(default = "default_keys")]
    pub keys: Vec<String>,
    #[serde(default = "default_adcode_key")]
    pub adcode_key: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
    /// 0 means no limit
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_keys() -> Vec<String> {
    vec![
        "name".to_string(),
        "level".to_string(),
        DEFAULT_ADCODE_KEY.to_string(),
    ]
}

fn default_adcode_key() -> String {
    DEFAULT_ADCODE_KEY.to_string()
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

fn default_file_suffix() -> String {
    DEFAULT_FILE_SUFFIX.to_string()
}

fn default_max_levels() -> usize {
    3
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl LocatorConfig {
    /// Defaults for everything but the data directory and root code
    pub fn new(data_dir: impl Into<PathBuf>, root_adcode: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            root_adcode: root_adcode.into(),
            keys: default_keys(),
            adcode_key: default_adcode_key(),
            delimiter: default_delimiter(),
            file_suffix: default_file_suffix(),
            max_levels: default_max_levels(),
        }
    }

    pub fn schema(&self) -> KeySchema {
        KeySchema::new(self.keys.iter().cloned())
            .with_adcode_key(self.adcode_key.clone())
            .with_delimiter(self.delimiter.clone())
    }

    pub fn source(&self) -> DirectorySource {
        DirectorySource::new(&self.data_dir).with_suffix(self.file_suffix.clone())
    }

    pub fn level_limit(&self) -> Option<usize> {
        (self.max_levels > 0).then_some(self.max_levels)
    }

    /// Build the hierarchy, keeping the per-child failures
    pub fn build_hierarchy(&self) -> Result<HierarchyBuild> {
        HierarchicalGeo::build(&self.source(), &self.root_adcode, &self.schema()).with_context(
            || {
                format!(
                    "Failed to build hierarchy for root {} from {}",
                    self.root_adcode,
                    self.data_dir.display()
                )
            },
        )
    }

    /// Wrap a built hierarchy in a locator honouring `max_levels`
    pub fn locator(&self, geo: HierarchicalGeo) -> MultiLevelLocator {
        let locator = MultiLevelLocator::new(geo, self.schema());
        match self.level_limit() {
            Some(levels) => locator.with_max_levels(levels),
            None => locator,
        }
    }
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub root_adcode: Option<String>,
    pub keys: Option<Vec<String>>,
    pub delimiter: Option<String>,
    pub max_levels: Option<usize>,
}

impl Overrides {
    /// Resolve the locator settings from an optional config file plus overrides
    pub fn resolve(&self, config_path: Option<&Path>) -> Result<LocatorConfig> {
        let mut locator = match config_path {
            Some(path) => Config::load_from_file(path)?.locator,
            None => {
                let data_dir = self
                    .data_dir
                    .clone()
                    .context("--data-dir is required without a config file")?;
                let root = self
                    .root_adcode
                    .clone()
                    .context("--root is required without a config file")?;
                LocatorConfig::new(data_dir, root)
            }
        };
        self.apply(&mut locator);
        Ok(locator)
    }

    pub fn apply(&self, locator: &mut LocatorConfig) {
        if let Some(data_dir) = &self.data_dir {
            locator.data_dir = data_dir.clone();
        }
        if let Some(root) = &self.root_adcode {
            locator.root_adcode = root.clone();
        }
        if let Some(keys) = &self.keys {
            locator.keys = keys.clone();
        }
        if let Some(delimiter) = &self.delimiter {
            locator.delimiter = delimiter.clone();
        }
        if let Some(max_levels) = self.max_levels {
            locator.max_levels = max_levels;
        }
    }
}
