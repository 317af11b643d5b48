//! Types for resolved mobile artifacts
//!
//! Records are kept column-ordered so a table view can take its column set
//! from the first record, the same way the source query returned them.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ArtifactError;

/// Artifact category, selecting which candidate set resolves a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// contacts2.db
    Contacts,
    /// calllog.db
    Calls,
    /// mmssms.db
    Messages,
    /// Chrome History (visits / bookmarks)
    Browser,
    /// Chrome History (downloads)
    Downloads,
    /// Chrome History (meta key/value table)
    Meta,
    /// calendar.db
    Calendar,
    /// accounts.db
    Accounts,
    /// Anything else: first table dump
    Generic,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Contacts,
        Category::Calls,
        Category::Messages,
        Category::Browser,
        Category::Downloads,
        Category::Meta,
        Category::Calendar,
        Category::Accounts,
        Category::Generic,
    ];

    /// Tag used in exports and overviews
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Contacts => "contacts",
            Category::Calls => "calls",
            Category::Messages => "messages",
            Category::Browser => "browser",
            Category::Downloads => "downloads",
            Category::Meta => "meta",
            Category::Calendar => "calendar",
            Category::Accounts => "accounts",
            Category::Generic => "generic",
        }
    }

    /// Pick a category from an expected file name or catalog hint.
    ///
    /// Substring match, first hit wins: `contacts`, `calllog`, `mmssms`,
    /// `browser`/`chrome` (split into downloads / meta / history),
    /// `calendar`, `accounts`. Everything else is generic.
    pub fn from_file_hint(hint: &str) -> Category {
        let lower = hint.to_lowercase();

        if lower.contains("contacts") {
            Category::Contacts
        } else if lower.contains("calllog") {
            Category::Calls
        } else if lower.contains("mmssms") {
            Category::Messages
        } else if lower.contains("browser") || lower.contains("chrome") {
            if lower.contains("downloads") {
                Category::Downloads
            } else if lower.contains("meta") {
                Category::Meta
            } else {
                Category::Browser
            }
        } else if lower.contains("calendar") {
            Category::Calendar
        } else if lower.contains("accounts") {
            Category::Accounts
        } else {
            Category::Generic
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| ArtifactError::UnknownCategory(s.to_string()))
    }
}

/// One sanitized cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Stand-in for a value that could not be represented as text
    Marker(String),
}

impl CellValue {
    /// Non-null, non-empty display text
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) | CellValue::Marker(s) if s.is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(r) => write!(f, "{}", r),
            CellValue::Text(s) | CellValue::Marker(s) => f.write_str(s),
        }
    }
}

/// Column-ordered, sanitized row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column. A repeated column name keeps its first position and
    /// takes the later value.
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: CellValue) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Display label of a column, if present and non-empty
    pub fn label(&self, column: &str) -> Option<String> {
        self.get(column).and_then(CellValue::as_label)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Where a dataset came from
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    /// Path the artifact was opened from
    pub path: PathBuf,
    /// File name of the artifact
    pub file_name: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// SHA-256 of the file, taken once the read-only open succeeded
    pub sha256: String,
    /// Label of the candidate query that matched, if any
    pub matched_query: Option<String>,
    /// When the load finished
    pub loaded_at: DateTime<Utc>,
}

/// The resolved records of one loaded artifact
#[derive(Debug, Clone, Serialize)]
pub struct LoadedDataset {
    name: String,
    category: Category,
    records: Vec<Record>,
    count: usize,
    source: SourceInfo,
}

impl LoadedDataset {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        records: Vec<Record>,
        source: SourceInfo,
    ) -> Self {
        let count = records.len();
        Self {
            name: name.into(),
            category,
            records,
            count,
            source,
        }
    }

    /// Display name the dataset is stored under
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    /// True when no candidate produced rows
    pub fn is_unresolved(&self) -> bool {
        self.count == 0
    }
}
