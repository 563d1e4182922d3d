//! Service facade
//!
//! The unit the HTTP boundary calls: wires the [`DatasetStore`], the query
//! engine and the statistics cache together. Constructed once per process;
//! the cache is injected so tests can substitute their own.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::aggregate::{self, OperatorSummary, QuarterExpense, StatisticsSnapshot};
use crate::cache::TtlCache;
use crate::query::{self, PageResult};
use crate::store::{DatasetStore, StoreResult};

/// Fixed key for the single cached statistics snapshot.
const STATS_CACHE_KEY: &str = "estatisticas";

/// Default statistics TTL: five minutes, matching the quarterly cadence of
/// the underlying dataset.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default bound on cached entries.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 100;

/// Read-only data service over the current expense snapshot.
pub struct DataService {
    store: Arc<DatasetStore>,
    stats_cache: TtlCache<String, Arc<StatisticsSnapshot>>,
}

impl DataService {
    /// Create a service with an explicitly configured statistics cache.
    pub fn new(store: Arc<DatasetStore>, stats_cache: TtlCache<String, Arc<StatisticsSnapshot>>) -> Self {
        Self { store, stats_cache }
    }

    /// Create a service with the default cache sizing.
    pub fn with_defaults(store: Arc<DatasetStore>) -> Self {
        Self::new(
            store,
            TtlCache::new(
                Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
                DEFAULT_CACHE_MAX_ENTRIES,
            ),
        )
    }

    /// List operators, paginated and optionally filtered.
    pub fn list_operators(
        &self,
        page: usize,
        limit: usize,
        search: Option<&str>,
        region: Option<&str>,
    ) -> StoreResult<PageResult> {
        let snapshot = self.store.snapshot()?;
        Ok(query::list_operators(&snapshot, page, limit, search, region))
    }

    /// Look up one operator by CNPJ (any accepted format). `Ok(None)` is the
    /// typed absence the boundary maps to 404.
    pub fn get_operator(&self, cnpj: &str) -> StoreResult<Option<OperatorSummary>> {
        let snapshot = self.store.snapshot()?;
        Ok(query::find_operator(&snapshot, cnpj))
    }

    /// Expense history for one operator, oldest quarter first. Empty when
    /// the operator has no records.
    pub fn get_operator_history(&self, cnpj: &str) -> StoreResult<Vec<QuarterExpense>> {
        let snapshot = self.store.snapshot()?;
        Ok(query::history_for(&snapshot, cnpj))
    }

    /// Full-dataset statistics, cached under a fixed key.
    ///
    /// The response may lag a dataset reload by up to the cache TTL; that
    /// staleness is by design.
    pub fn get_statistics(&self) -> StoreResult<Arc<StatisticsSnapshot>> {
        let key = STATS_CACHE_KEY.to_string();
        if let Some(stats) = self.stats_cache.get(&key) {
            debug!("statistics served from cache");
            return Ok(stats);
        }

        let snapshot = self.store.snapshot()?;
        let stats = Arc::new(aggregate::compute_statistics(&snapshot));
        debug!(
            operators = stats.operator_count,
            "statistics recomputed and cached"
        );
        self.stats_cache.insert(key, Arc::clone(&stats));
        Ok(stats)
    }

    /// The backing store, exposed for readiness checks and reloads.
    pub fn store(&self) -> &DatasetStore {
        &self.store
    }
}
