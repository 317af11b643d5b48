//! Adaptive candidate resolution
//!
//! Opens an artifact database read-only and walks a candidate list until one
//! candidate is accepted. A candidate whose SQL references missing tables or
//! columns is recorded as `Failed` and skipped; the store error never leaves
//! this module.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info, warn};

use crate::error::{ArtifactError, ArtifactResult};
use crate::sanitize::sanitize;

use super::candidates::{Acceptance, Candidate};
use super::types::Record;

/// An opened artifact database.
///
/// The connection is released when this value is dropped, on every exit path
/// of the load that owns it.
pub struct ArtifactFile {
    path: PathBuf,
    display_name: String,
    conn: Connection,
}

impl ArtifactFile {
    /// Open a database file read-only and confirm it is a SQLite store
    pub fn open(path: &Path) -> ArtifactResult<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| ArtifactError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        // SQLite opens lazily; reading the schema is what rejects non-databases
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(|source| ArtifactError::NotADatabase {
                path: path.to_path_buf(),
                source,
            })?;

        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        debug!(path = %path.display(), "Opened artifact database");

        Ok(Self {
            path: path.to_path_buf(),
            display_name,
            conn,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the artifact
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Table names in schema order
    pub fn tables(&self) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect()
    }

    /// Run a statement and sanitize every cell, in store order.
    ///
    /// When two result columns share a name, the record keeps the first.
    pub fn fetch(&self, sql: &str) -> rusqlite::Result<(Vec<String>, Vec<Record>)> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (i, name) in columns.iter().enumerate() {
                // Repeated names (`SELECT a.id, b.id`) resolve to the leftmost column
                if record.get(name).is_none() {
                    record.insert(name.clone(), sanitize(row.get_ref(i)?));
                }
            }
            records.push(record);
        }

        Ok((columns, records))
    }
}

impl Drop for ArtifactFile {
    fn drop(&mut self) {
        debug!(artifact = %self.display_name, "Releasing artifact connection");
    }
}

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Accepted; resolution stopped here
    Matched { rows: usize },
    /// Ran, but the rows did not satisfy the acceptance rule
    NoMatch,
    /// The query could not run against this schema
    Failed(String),
}

/// One tried candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub label: String,
    pub outcome: CandidateOutcome,
}

/// Result of walking a candidate list
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Sanitized rows of the accepted candidate (empty if none matched)
    pub records: Vec<Record>,
    /// Label of the accepted candidate
    pub matched: Option<String>,
    /// Every candidate tried, in order
    pub attempts: Vec<Attempt>,
}

impl Resolution {
    pub fn is_matched(&self) -> bool {
        self.matched.is_some()
    }

    fn accept(mut self, label: String, records: Vec<Record>) -> Self {
        self.attempts.push(Attempt {
            label: label.clone(),
            outcome: CandidateOutcome::Matched { rows: records.len() },
        });
        self.matched = Some(label);
        self.records = records;
        self
    }

    fn reject(&mut self, label: String, outcome: CandidateOutcome) {
        self.attempts.push(Attempt { label, outcome });
    }
}

/// Walk `candidates` against `file`, returning the first accepted result
pub fn resolve(file: &ArtifactFile, candidates: &[Candidate]) -> Resolution {
    let mut resolution = Resolution::default();

    for candidate in candidates {
        debug!(artifact = %file.display_name(), candidate = candidate.label(), "Trying candidate");
        let hit = match candidate {
            Candidate::Query(query) => {
                try_query(file, &query.label, &query.sql, &query.acceptance, &mut resolution)
            }
            Candidate::DiscoverTables {
                label,
                keywords,
                required_column,
                row_limit,
            } => discover_tables(file, label, keywords, required_column, *row_limit, &mut resolution),
            Candidate::FirstTable { label, row_limit } => {
                first_table(file, label, *row_limit, &mut resolution)
            }
        };

        if let Some((label, records)) = hit {
            info!(
                artifact = %file.display_name(),
                candidate = %label,
                rows = records.len(),
                "Candidate accepted"
            );
            return resolution.accept(label, records);
        }
    }

    warn!(
        artifact = %file.display_name(),
        tried = resolution.attempts.len(),
        "No candidate matched"
    );
    resolution
}

fn try_query(
    file: &ArtifactFile,
    label: &str,
    sql: &str,
    acceptance: &Acceptance,
    resolution: &mut Resolution,
) -> Option<(String, Vec<Record>)> {
    match file.fetch(sql) {
        Ok((columns, records)) if acceptance.accepts(&columns, records.len()) => {
            Some((label.to_string(), records))
        }
        Ok((_, records)) => {
            debug!(candidate = label, rows = records.len(), "Candidate not accepted");
            resolution.reject(label.to_string(), CandidateOutcome::NoMatch);
            None
        }
        Err(e) => {
            debug!(candidate = label, error = %e, "Candidate query failed");
            resolution.reject(label.to_string(), CandidateOutcome::Failed(e.to_string()));
            None
        }
    }
}

fn discover_tables(
    file: &ArtifactFile,
    label: &str,
    keywords: &[String],
    required_column: &str,
    row_limit: usize,
    resolution: &mut Resolution,
) -> Option<(String, Vec<Record>)> {
    let tables = match file.tables() {
        Ok(tables) => tables,
        Err(e) => {
            resolution.reject(label.to_string(), CandidateOutcome::Failed(e.to_string()));
            return None;
        }
    };

    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let acceptance = Acceptance::ColumnContaining(required_column.to_string());

    for table in tables {
        let lower = table.to_lowercase();
        if !keywords.iter().any(|k| lower.contains(k.as_str())) {
            continue;
        }
        let sql = format!("SELECT * FROM {} LIMIT {}", quote_ident(&table), row_limit);
        let table_label = format!("{}:{}", label, table);
        if let Some(hit) = try_query(file, &table_label, &sql, &acceptance, resolution) {
            return Some(hit);
        }
    }

    None
}

fn first_table(
    file: &ArtifactFile,
    label: &str,
    row_limit: usize,
    resolution: &mut Resolution,
) -> Option<(String, Vec<Record>)> {
    let first = match file.tables() {
        Ok(tables) => tables.into_iter().next(),
        Err(e) => {
            resolution.reject(label.to_string(), CandidateOutcome::Failed(e.to_string()));
            return None;
        }
    };

    let Some(table) = first else {
        resolution.reject(label.to_string(), CandidateOutcome::NoMatch);
        return None;
    };

    let sql = format!("SELECT * FROM {} LIMIT {}", quote_ident(&table), row_limit);
    let table_label = format!("{}:{}", label, table);
    try_query(file, &table_label, &sql, &Acceptance::AnyRow, resolution)
}

/// Quote a table name taken from the schema
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
