//! Mobile Artifact Support
//!
//! This module opens the SQLite databases pulled from a handset (contacts,
//! call log, SMS, browser history, calendar, accounts, ...) and resolves each
//! one against a per-category list of candidate queries, most specific schema
//! first. The first candidate that produces rows wins.
//!
//! Schemas drift across OEM and app versions, so nothing here assumes a
//! particular layout is present. A category that matches nothing yields an
//! empty record set, not an error.

pub mod types;
pub mod catalog;
pub mod candidates;
pub mod resolver;

pub use types::*;
pub use catalog::{CatalogEntry, CATALOG};
pub use candidates::{candidate_set, Acceptance, Candidate, RecordQuery};
pub use resolver::{resolve, ArtifactFile, Attempt, CandidateOutcome, Resolution};
