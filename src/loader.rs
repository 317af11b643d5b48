//! Load workers and the foreground coordinator
//!
//! Every load request gets its own worker thread. A worker opens the
//! artifact, resolves it, and sends the finished dataset back over a bounded
//! completion queue. Only the coordinator applies completions to the
//! [`DatasetStore`], so the store needs no lock and never holds a partial
//! load.
//!
//! Loads cannot be cancelled and have no timeout; a query that never
//! returns keeps its worker (and its `pending` slot) forever.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::artifact::{
    candidate_set, catalog, resolve, ArtifactFile, CatalogEntry, Category, LoadedDataset,
    SourceInfo,
};
use crate::common::sha256_file;
use crate::config::EngineConfig;
use crate::error::{ArtifactError, ArtifactResult};
use crate::export::{self, ExportSummary};
use crate::store::DatasetStore;
use crate::timeline::{self, TimelineEvent};

/// One user-initiated load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub path: PathBuf,
    pub category: Category,
    /// Key the dataset is stored under
    pub display_name: String,
}

impl LoadRequest {
    pub fn new(path: impl Into<PathBuf>, category: Category, display_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            category,
            display_name: display_name.into(),
        }
    }

    /// Load `path` as the given catalog artifact
    pub fn from_catalog(entry: &CatalogEntry, path: impl Into<PathBuf>) -> Self {
        Self::new(path, entry.category, entry.label)
    }

    /// Infer the artifact from the file name.
    ///
    /// An exact catalog file name uses that entry's label; anything else is
    /// stored under its file name with a category from the name hint.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match catalog::lookup_file(&file_name) {
            Some(entry) => Self::from_catalog(entry, path),
            None => {
                let category = Category::from_file_hint(&file_name);
                Self::new(path, category, file_name)
            }
        }
    }
}

/// Open, resolve and package one artifact.
///
/// The artifact connection is released before this returns, whatever the
/// outcome.
#[instrument(skip(config), fields(path = %request.path.display(), category = %request.category))]
pub fn load_artifact(request: &LoadRequest, config: &EngineConfig) -> ArtifactResult<LoadedDataset> {
    let file = ArtifactFile::open(&request.path)?;
    let digest = sha256_file(&request.path)?;

    let resolution = resolve(&file, &candidate_set(request.category, config));
    if !resolution.is_matched() {
        info!(name = %request.display_name, "Storing unresolved dataset");
    }
    let source = SourceInfo {
        path: file.path().to_path_buf(),
        file_name: file.display_name().to_string(),
        size_bytes: digest.size_bytes,
        sha256: digest.sha256,
        matched_query: resolution.matched.clone(),
        loaded_at: Utc::now(),
    };
    drop(file);

    Ok(LoadedDataset::new(
        request.display_name.clone(),
        request.category,
        resolution.records,
        source,
    ))
}

/// Message sent from a worker to the coordinator
#[derive(Debug)]
pub enum LoadEvent {
    Completed(LoadedDataset),
    Failed {
        display_name: String,
        path: PathBuf,
        error: String,
    },
}

/// Per-load status line for the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub display_name: String,
    pub text: String,
    pub is_error: bool,
}

/// Owns the dataset store and applies worker completions to it
pub struct LoadCoordinator {
    config: Arc<EngineConfig>,
    store: DatasetStore,
    sender: SyncSender<LoadEvent>,
    receiver: Receiver<LoadEvent>,
    pending: usize,
}

impl LoadCoordinator {
    pub fn new(config: EngineConfig) -> Self {
        let (sender, receiver) = mpsc::sync_channel(config.completion_queue_depth);
        Self {
            config: Arc::new(config),
            store: DatasetStore::new(),
            sender,
            receiver,
            pending: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access for views
    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Loads submitted but not yet applied
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Spawn a worker for `request`
    pub fn submit(&mut self, request: LoadRequest) -> ArtifactResult<JoinHandle<()>> {
        let sender = self.sender.clone();
        let config = Arc::clone(&self.config);

        info!(name = %request.display_name, path = %request.path.display(), "Loading artifact");

        let handle = thread::Builder::new()
            .name(worker_name(&request.display_name))
            .spawn(move || {
                let event = run_worker(&request, || load_artifact(&request, &config));
                // Only fails if the coordinator is gone, and then nobody is listening
                let _ = sender.send(event);
            })?;

        self.pending += 1;
        Ok(handle)
    }

    /// Apply every completion that is already queued, without blocking
    pub fn pump(&mut self) -> Vec<StatusMessage> {
        let mut statuses = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            statuses.push(self.apply(event));
        }
        statuses
    }

    /// Block until every submitted load has completed or failed
    pub fn wait_all(&mut self) -> Vec<StatusMessage> {
        let mut statuses = Vec::new();
        while self.pending > 0 {
            match self.receiver.recv() {
                Ok(event) => statuses.push(self.apply(event)),
                Err(_) => break,
            }
        }
        statuses
    }

    /// Timeline over the current store contents
    pub fn timeline(&self) -> Vec<TimelineEvent> {
        timeline::correlate(&self.store, &self.config.timeline)
    }

    /// Write the interchange export for the current store
    pub fn export(&self, path: &Path) -> ArtifactResult<ExportSummary> {
        export::write_export(&self.store, &self.config, path)
    }

    fn apply(&mut self, event: LoadEvent) -> StatusMessage {
        self.pending = self.pending.saturating_sub(1);

        match event {
            LoadEvent::Completed(dataset) => {
                let display_name = dataset.name().to_string();
                let text = format!("Loaded {}: {} records", display_name, dataset.count());
                info!(name = %display_name, records = dataset.count(), "Dataset stored");
                self.store.insert(dataset);
                StatusMessage {
                    display_name,
                    text,
                    is_error: false,
                }
            }
            LoadEvent::Failed {
                display_name,
                path,
                error,
            } => {
                warn!(name = %display_name, path = %path.display(), %error, "Load failed");
                StatusMessage {
                    text: format!("Error loading {}: {}", display_name, error),
                    display_name,
                    is_error: true,
                }
            }
        }
    }
}

/// Thread name for a load; `Builder::spawn` rejects names containing NUL
fn worker_name(display_name: &str) -> String {
    format!("load-{}", display_name.replace('\0', ""))
}

fn run_worker<F>(request: &LoadRequest, load: F) -> LoadEvent
where
    F: FnOnce() -> ArtifactResult<LoadedDataset>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(load));

    let error = match outcome {
        Ok(Ok(dataset)) => return LoadEvent::Completed(dataset),
        Ok(Err(e)) => e,
        Err(payload) => ArtifactError::WorkerPanic(panic_message(payload.as_ref())),
    };

    LoadEvent::Failed {
        display_name: request.display_name.clone(),
        path: request.path.clone(),
        error: error.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
