use super::{IndexSettings, SettingsProvider};
use crate::core::{Result, RoutingError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Settings provider backed by a fixed in-memory table.
///
/// Useful offline (settings exported once to a file) and in tests. Unknown
/// indices answer [`RoutingError::SettingsMissing`].
#[derive(Debug, Default)]
pub struct StaticSettingsProvider {
    indices: HashMap<String, IndexSettings>,
    fetches: AtomicUsize,
}

impl StaticSettingsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StaticSettingsProvider::insert`].
    pub fn with_index(mut self, index_name: impl Into<String>, settings: IndexSettings) -> Self {
        self.insert(index_name, settings);
        self
    }

    pub fn insert(&mut self, index_name: impl Into<String>, settings: IndexSettings) {
        self.indices.insert(index_name.into(), settings);
    }

    /// Loads a table of the form
    /// `{"logs": {"number_of_shards": 3, "routing_partition_size": 2}}`.
    ///
    /// Omitted fields take the documented defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let indices: HashMap<String, IndexSettings> = serde_json::from_str(json)
            .map_err(|e| RoutingError::Config(format!("Invalid settings table: {}", e)))?;
        Ok(Self {
            indices,
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            RoutingError::Config(format!("Cannot read settings file {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Number of `fetch_settings` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn index_names(&self) -> Vec<String> {
        let mut names = self.indices.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }
}

#[async_trait]
impl SettingsProvider for StaticSettingsProvider {
    async fn fetch_settings(&self, index_name: &str) -> Result<IndexSettings> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.indices
            .get(index_name)
            .copied()
            .ok_or_else(|| RoutingError::missing(index_name))
    }
}
