//! In-memory registry of loaded datasets
//!
//! Keyed by display name, in first-load order. Only the load coordinator
//! writes to it, and only with a finished dataset, so readers never see a
//! partial load.

use tracing::debug;

use crate::artifact::LoadedDataset;

#[derive(Debug, Default)]
pub struct DatasetStore {
    datasets: Vec<LoadedDataset>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a dataset, replacing any dataset with the same display name.
    ///
    /// A replaced entry keeps its position. Returns the previous dataset.
    pub fn insert(&mut self, dataset: LoadedDataset) -> Option<LoadedDataset> {
        match self.datasets.iter_mut().find(|d| d.name() == dataset.name()) {
            Some(slot) => {
                debug!(name = dataset.name(), "Replacing dataset");
                Some(std::mem::replace(slot, dataset))
            }
            None => {
                self.datasets.push(dataset);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&LoadedDataset> {
        self.datasets.iter().find(|d| d.name() == name)
    }

    /// Datasets in first-load order
    pub fn iter(&self) -> impl Iterator<Item = &LoadedDataset> {
        self.datasets.iter()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Sum of record counts across datasets
    pub fn total_records(&self) -> usize {
        self.datasets.iter().map(LoadedDataset::count).sum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::artifact::{Category, CellValue, Record, SourceInfo};
    use std::path::PathBuf;

    pub(crate) fn dataset(name: &str, category: Category, records: Vec<Record>) -> LoadedDataset {
        let source = SourceInfo {
            path: PathBuf::from(format!("/evidence/{}.db", name)),
            file_name: format!("{}.db", name),
            size_bytes: 0,
            sha256: String::new(),
            matched_query: None,
            loaded_at: chrono::Utc::now(),
        };
        LoadedDataset::new(name, category, records, source)
    }

    fn numbered(n: i64) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new().with("id", CellValue::Integer(i)))
            .collect()
    }

    #[test]
    fn test_count_matches_records() {
        let ds = dataset("Call Log", Category::Calls, numbered(3));
        assert_eq!(ds.count(), ds.records().len());
    }

    #[test]
    fn test_same_name_replaces() {
        let mut store = DatasetStore::new();
        assert!(store.insert(dataset("Call Log", Category::Calls, numbered(3))).is_none());
        assert!(store.insert(dataset("Messages", Category::Messages, numbered(1))).is_none());

        let previous = store.insert(dataset("Call Log", Category::Calls, numbered(5)));
        assert_eq!(previous.unwrap().count(), 3);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("Call Log").unwrap().count(), 5);
        let names: Vec<_> = store.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Call Log", "Messages"]);
    }

    #[test]
    fn test_total_records() {
        let mut store = DatasetStore::new();
        assert_eq!(store.total_records(), 0);
        store.insert(dataset("A", Category::Generic, numbered(2)));
        store.insert(dataset("B", Category::Generic, numbered(4)));
        assert_eq!(store.total_records(), 6);

        store.insert(dataset("A", Category::Generic, numbered(1)));
        assert_eq!(store.total_records(), 5);
    }
}
