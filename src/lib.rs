//! Mobile forensic artifact engine
//!
//! Loads SQLite databases extracted from a handset, resolves each against
//! the query strategies for its category, and correlates the results into a
//! single timeline and an interchange export.
//!
//! ```no_run
//! use mfx_lib::{EngineConfig, LoadCoordinator, LoadRequest};
//!
//! let mut coordinator = LoadCoordinator::new(EngineConfig::default());
//! coordinator.submit(LoadRequest::from_path("/evidence/calllog.db"))?;
//! for status in coordinator.wait_all() {
//!     println!("{}", status.text);
//! }
//! let events = coordinator.timeline();
//! # Ok::<(), mfx_lib::ArtifactError>(())
//! ```

pub mod artifact;
pub mod common;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod logging;
pub mod sanitize;
pub mod store;
pub mod timeline;
pub mod views;

pub use artifact::{Category, CellValue, LoadedDataset, Record, SourceInfo};
pub use config::EngineConfig;
pub use error::{ArtifactError, ArtifactResult};
pub use export::{build_export, write_export, ExportSummary};
pub use loader::{load_artifact, LoadCoordinator, LoadEvent, LoadRequest, StatusMessage};
pub use store::DatasetStore;
pub use timeline::{correlate, TimelineEvent};
