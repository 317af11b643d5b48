//! Interchange export
//!
//! Flattens the dataset store into one pretty-printed JSON document:
//!
//! ```json
//! {
//!   "export_date": "2024-03-01T10:15:00.123456+01:00",
//!   "device_info": "Samsung Galaxy S22",
//!   "databases": {
//!     "Call Log": { "record_count": 600, "data_type": "calls", "records": [ ... ] }
//!   }
//! }
//! ```
//!
//! `records` holds at most `export_record_limit` records while
//! `record_count` is always the full count. Datasets appear in store order.

use std::fs;
use std::path::{Path, PathBuf};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{info, instrument};

use crate::artifact::{Category, Record};
use crate::config::EngineConfig;
use crate::error::{ArtifactError, ArtifactResult};
use crate::store::DatasetStore;

#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub export_date: String,
    pub device_info: String,
    pub databases: ExportedDatabases<'a>,
}

/// Display name to dataset, serialized as a JSON object in store order
#[derive(Debug, Default)]
pub struct ExportedDatabases<'a>(pub Vec<(&'a str, ExportedDatabase<'a>)>);

impl Serialize for ExportedDatabases<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, database) in &self.0 {
            map.serialize_entry(name, database)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
pub struct ExportedDatabase<'a> {
    pub record_count: usize,
    pub data_type: Category,
    pub records: &'a [Record],
}

/// Result of a written export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub datasets: usize,
    pub bytes: usize,
}

/// Build the export document, truncating each dataset to `limit` records
pub fn build_export<'a>(store: &'a DatasetStore, device_info: &str, limit: usize) -> ExportDocument<'a> {
    let databases = store
        .iter()
        .map(|dataset| {
            let records = dataset.records();
            let kept = &records[..records.len().min(limit)];
            (
                dataset.name(),
                ExportedDatabase {
                    record_count: dataset.count(),
                    data_type: dataset.category(),
                    records: kept,
                },
            )
        })
        .collect();

    ExportDocument {
        export_date: chrono::Local::now().to_rfc3339(),
        device_info: device_info.to_string(),
        databases: ExportedDatabases(databases),
    }
}

/// Write the store to `path` as pretty-printed JSON
#[instrument(skip(store, config), fields(path = %path.display()))]
pub fn write_export(store: &DatasetStore, config: &EngineConfig, path: &Path) -> ArtifactResult<ExportSummary> {
    if store.is_empty() {
        return Err(ArtifactError::Config("no datasets loaded".to_string()));
    }

    let document = build_export(store, &config.device_info, config.export_record_limit);
    let json = serde_json::to_string_pretty(&document)?;
    fs::write(path, &json)?;

    info!(datasets = store.len(), bytes = json.len(), "Export written");

    Ok(ExportSummary {
        path: path.to_path_buf(),
        datasets: store.len(),
        bytes: json.len(),
    })
}
