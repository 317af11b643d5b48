//! Engine configuration
//!
//! Loaded from a JSON file; every field has a default so a partial file (or
//! no file at all) is valid:
//!
//! ```json
//! {
//!   "device_info": "Samsung Galaxy S22",
//!   "export_record_limit": 500,
//!   "timeline": { "records_per_dataset": 100, "max_events": 200 },
//!   "discovery": {
//!     "table_keywords": ["url", "history", "visit", "bookmark"],
//!     "required_column_token": "url",
//!     "row_limit": 50
//!   }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ArtifactError, ArtifactResult};

/// Config file name under the platform config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Application directory name
pub const APP_DIR_NAME: &str = "core-mfx";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Free-text device description written into exports
    pub device_info: String,
    /// Records written per dataset in an export
    pub export_record_limit: usize,
    pub timeline: TimelineLimits,
    pub discovery: DiscoveryConfig,
    /// Rows read from the first table of an unrecognized database
    pub generic_row_limit: usize,
    /// Rows shown by a table view
    pub table_row_limit: usize,
    /// Capacity of the load completion queue
    pub completion_queue_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device_info: "Samsung Galaxy S22".to_string(),
            export_record_limit: 500,
            timeline: TimelineLimits::default(),
            discovery: DiscoveryConfig::default(),
            generic_row_limit: 100,
            table_row_limit: 1000,
            completion_queue_depth: 16,
        }
    }
}

/// Bounds on timeline correlation cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineLimits {
    /// Leading records scanned per dataset
    pub records_per_dataset: usize,
    /// Events kept after sorting
    pub max_events: usize,
}

impl Default for TimelineLimits {
    fn default() -> Self {
        Self {
            records_per_dataset: 100,
            max_events: 200,
        }
    }
}

/// Last-resort browser table discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// A table is scanned if its name contains any of these (case-insensitive)
    pub table_keywords: Vec<String>,
    /// A scanned table is accepted if a column name contains this token
    pub required_column_token: String,
    /// Rows read per scanned table
    pub row_limit: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            table_keywords: ["url", "history", "visit", "bookmark"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            required_column_token: "url".to_string(),
            row_limit: 50,
        }
    }
}

impl EngineConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> ArtifactResult<Self> {
        info!("Loading config from: {}", path.display());
        let json = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the default config file if it exists,
    /// else built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> ArtifactResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match default_config_path() {
            Some(default_path) if default_path.exists() => Self::load(&default_path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> ArtifactResult<()> {
        let limits = [
            ("export_record_limit", self.export_record_limit),
            ("timeline.records_per_dataset", self.timeline.records_per_dataset),
            ("timeline.max_events", self.timeline.max_events),
            ("discovery.row_limit", self.discovery.row_limit),
            ("generic_row_limit", self.generic_row_limit),
            ("table_row_limit", self.table_row_limit),
            ("completion_queue_depth", self.completion_queue_depth),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, v)| *v == 0) {
            return Err(ArtifactError::Config(format!("{} must be greater than zero", name)));
        }
        if self.discovery.required_column_token.trim().is_empty() {
            return Err(ArtifactError::Config(
                "discovery.required_column_token must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<config dir>/core-mfx/config.json`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}
