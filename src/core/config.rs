//! # Configuration
//!
//! Runtime configuration for a sapf session.
//!
//! Precedence, lowest first: `Default`, JSON file, environment, caller overrides.
//!
//! | Variable         | Field          |
//! |------------------|----------------|
//! | `SAPF_LIBRARY`   | `library_path` |
//! | `SAPF_INIT`      | `init`         |
//! | `SAPF_MAX_STEPS` | `max_steps`    |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{SapfError, SapfResult};
use super::export::Export;

pub const ENV_LIBRARY: &str = "SAPF_LIBRARY";
pub const ENV_INIT: &str = "SAPF_INIT";
pub const ENV_MAX_STEPS: &str = "SAPF_MAX_STEPS";

/// Default location of the shared object, relative to the working directory
pub const DEFAULT_LIBRARY_PATH: &str = "./sapf.so";

/// Configuration for loading and driving the sapf library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SapfConfig {
    /// Path to the shared object
    pub library_path: PathBuf,

    /// Argument passed to `init`; `init` is skipped when unset
    pub init: Option<String>,

    /// Upper bound on steps per episode (None = until done)
    pub max_steps: Option<u64>,

    /// Exports that must resolve when the library is opened
    pub required_exports: Vec<Export>,
}

impl Default for SapfConfig {
    fn default() -> Self {
        Self {
            library_path: PathBuf::from(DEFAULT_LIBRARY_PATH),
            init: None,
            max_steps: None,
            required_exports: Vec::new(),
        }
    }
}

impl SapfConfig {
    /// Create a config pointing at a library path
    pub fn new(library_path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: library_path.into(),
            ..Self::default()
        }
    }

    pub fn with_init(mut self, init: impl Into<String>) -> Self {
        self.init = Some(init.into());
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_required_exports(mut self, exports: &[Export]) -> Self {
        self.required_exports = exports.to_vec();
        self
    }

    /// Construct from a JSON string; missing fields take their defaults
    pub fn from_json(json: &str) -> SapfResult<Self> {
        serde_json::from_str(json).map_err(|e| SapfError::Config(e.to_string()))
    }

    /// Construct from a JSON file
    pub fn from_file(path: &Path) -> SapfResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Overlay values from the process environment
    pub fn apply_env(self) -> SapfResult<Self> {
        self.apply_lookup(|key| std::env::var(key).ok())
    }

    /// Overlay values from any key lookup
    pub fn apply_lookup<F>(mut self, lookup: F) -> SapfResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_LIBRARY) {
            self.library_path = PathBuf::from(path);
        }
        if let Some(init) = lookup(ENV_INIT) {
            self.init = Some(init);
        }
        if let Some(raw) = lookup(ENV_MAX_STEPS) {
            let max_steps = raw.trim().parse::<u64>().map_err(|e| {
                SapfError::Config(format!("{ENV_MAX_STEPS}={raw:?} is not a step count: {e}"))
            })?;
            self.max_steps = Some(max_steps);
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> SapfResult<()> {
        if self.library_path.as_os_str().is_empty() {
            return Err(SapfError::Config("library_path must not be empty".into()));
        }
        if self.max_steps == Some(0) {
            return Err(SapfError::Config("max_steps must be at least 1".into()));
        }
        if let Some(init) = &self.init {
            if init.contains('\0') {
                return Err(SapfError::Config(
                    "init must not contain a NUL byte".into(),
                ));
            }
        }
        Ok(())
    }
}
