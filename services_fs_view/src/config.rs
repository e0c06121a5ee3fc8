//! Service configuration
//!
//! Every field has a default, and the defaults give the plain walk semantics:
//! unbounded recursion, hidden entries included.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`FsViewConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables of the filesystem view service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsViewConfig {
    /// How many directory levels below the start a recursive walk may descend
    ///
    /// `None` is unbounded. `Some(0)` behaves like a non-recursive walk.
    pub max_walk_depth: Option<usize>,

    /// Leave dot-entries (and everything below them) out of walks
    pub skip_hidden: bool,
}

impl FsViewConfig {
    /// Parses a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Sets the recursion limit
    pub fn with_max_walk_depth(mut self, depth: usize) -> Self {
        self.max_walk_depth = Some(depth);
        self
    }

    /// Sets whether walks skip dot-entries
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Returns true if a walk currently at `depth` may descend one level
    pub(crate) fn may_descend(&self, depth: usize) -> bool {
        self.max_walk_depth.map_or(true, |max| depth < max)
    }
}

impl Default for FsViewConfig {
    fn default() -> Self {
        Self {
            max_walk_depth: None,
            skip_hidden: false,
        }
    }
}
