// ============================================================================
// Shard Router
// ============================================================================
//
// Predicts the shard a document lands on: settings come from the cache or,
// on first use of an index, from the provider; the shard formula runs
// locally.
//
// Cache layout: the map lock only guards finding or creating a per-index
// `OnceCell` and is never held across a fetch. The cell serialises first
// access, so concurrent first callers share one provider call. A failed,
// timed-out or dropped fetch leaves the cell empty and the next caller
// fetches again. An empty cell nobody else holds is removed from the map,
// so unknown index names never accumulate.
//
// ============================================================================

pub mod bulk;
pub mod config;
pub mod formula;

pub use bulk::{BulkDocument, group_documents};
pub use config::RouterConfig;
pub use formula::{ShardFormula, compute_shard, floor_mod};

use crate::core::{Result, RoutingError};
use crate::settings::{IndexSettings, SettingsProvider};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::{Instrument, info_span};

type SettingsCell = Arc<OnceCell<IndexSettings>>;
type SettingsCache = RwLock<HashMap<String, SettingsCell>>;

/// Resolves shard numbers for documents of any number of indices.
///
/// Settings are fetched once per index name and kept for the router's
/// lifetime. Share one router between tasks with `Arc<ShardRouter>`.
///
/// # Examples
///
/// ```
/// use shardroute::{IndexSettings, ShardRouter, StaticSettingsProvider};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let provider = StaticSettingsProvider::new().with_index("logs", IndexSettings::new(5, 1));
/// let router = ShardRouter::new(Arc::new(provider));
///
/// let shard = router.shard_number("logs", "doc-1", "hello").await.unwrap();
/// assert_eq!(shard, 1);
/// # });
/// ```
pub struct ShardRouter {
    provider: Arc<dyn SettingsProvider>,
    config: RouterConfig,
    cache: SettingsCache,
}

impl ShardRouter {
    pub fn new(provider: Arc<dyn SettingsProvider>) -> Self {
        Self::with_config(provider, RouterConfig::default())
    }

    pub fn with_config(provider: Arc<dyn SettingsProvider>, config: RouterConfig) -> Self {
        Self {
            provider,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Shard number the cluster assigns to a document of `index_name`.
    ///
    /// `document_id` only matters for indices with a routing partition size
    /// above 1. Errors from the settings lookup are returned as-is; no
    /// default shard is ever guessed.
    pub async fn shard_number(
        &self,
        index_name: &str,
        document_id: &str,
        routing_key: &str,
    ) -> Result<u32> {
        self.formula_for(index_name)
            .await?
            .shard_for(document_id, routing_key)
    }

    /// Shard number for a document indexed without custom routing.
    pub async fn shard_number_for_id(&self, index_name: &str, document_id: &str) -> Result<u32> {
        self.shard_number(index_name, document_id, document_id).await
    }

    /// Resolves settings once and buckets a whole batch by shard.
    pub async fn group_by_shard<I>(
        &self,
        index_name: &str,
        docs: I,
    ) -> Result<BTreeMap<u32, Vec<BulkDocument>>>
    where
        I: IntoIterator<Item = BulkDocument>,
    {
        let formula = self.formula_for(index_name).await?;
        group_documents(&formula, docs)
    }

    /// Shard formula bound to the index's settings, for callers routing many
    /// documents synchronously.
    pub async fn formula_for(&self, index_name: &str) -> Result<ShardFormula> {
        let settings = self.settings_for(index_name).await?;
        ShardFormula::new(index_name, &settings)
    }

    /// Validated settings for `index_name`, fetched on first use.
    pub async fn settings_for(&self, index_name: &str) -> Result<IndexSettings> {
        let cell = self.cache_cell(index_name).await;
        let mut pending = PendingCell {
            cache: &self.cache,
            index_name,
            cell,
            armed: true,
        };

        match pending
            .cell
            .get_or_try_init(|| self.fetch_validated(index_name))
            .await
        {
            Ok(settings) => {
                let settings = *settings;
                pending.armed = false;
                Ok(settings)
            }
            Err(err) => {
                pending.armed = false;
                let mut cache = self.cache.write().await;
                pending.evict_from(&mut cache);
                Err(err)
            }
        }
    }

    /// Cached settings, without triggering a fetch.
    pub async fn cached_settings(&self, index_name: &str) -> Option<IndexSettings> {
        self.cache
            .read()
            .await
            .get(index_name)
            .and_then(|cell| cell.get().copied())
    }

    /// Number of indices whose settings are cached.
    pub async fn cached_index_count(&self) -> usize {
        self.cache
            .read()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    /// Number of index names the cache currently tracks, including fetches
    /// still in flight.
    pub async fn tracked_index_count(&self) -> usize {
        self.cache.read().await.len()
    }

    async fn cache_cell(&self, index_name: &str) -> SettingsCell {
        if let Some(cell) = self.cache.read().await.get(index_name) {
            return Arc::clone(cell);
        }

        let mut cache = self.cache.write().await;
        Arc::clone(cache.entry(index_name.to_string()).or_default())
    }

    async fn fetch_validated(&self, index_name: &str) -> Result<IndexSettings> {
        let span = info_span!("router.settings.fetch", index = %index_name);

        async move {
            let fetch = self.provider.fetch_settings(index_name);
            let settings = match self.config.fetch_timeout {
                Some(timeout) => tokio::time::timeout(timeout, fetch).await.map_err(|_| {
                    RoutingError::unavailable(
                        index_name,
                        format!("settings fetch timed out after {:?}", timeout),
                    )
                })??,
                None => fetch.await?,
            };
            settings.validate(index_name)?;
            Ok(settings)
        }
        .instrument(span)
        .await
    }
}

/// A cache cell a caller is initialising. Whoever leaves it empty removes it
/// again, unless another caller still holds the cell.
struct PendingCell<'a> {
    cache: &'a SettingsCache,
    index_name: &'a str,
    cell: SettingsCell,
    armed: bool,
}

impl PendingCell<'_> {
    // Clones are only handed out under the map lock, so with the write lock
    // held a strong count of 2 means the map and this caller.
    fn evict_from(&self, cache: &mut HashMap<String, SettingsCell>) {
        let abandoned = cache.get(self.index_name).is_some_and(|current| {
            Arc::ptr_eq(current, &self.cell)
                && !current.initialized()
                && Arc::strong_count(&self.cell) == 2
        });
        if abandoned {
            cache.remove(self.index_name);
        }
    }
}

impl Drop for PendingCell<'_> {
    // Caller dropped mid-fetch. Drop cannot await, so a contended lock leaves
    // the empty cell for the next caller of this index to reuse.
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut cache) = self.cache.try_write() {
            self.evict_from(&mut cache);
        }
    }
}
