//! # Operadoras
//!
//! Read API over consolidated health-plan operator expense data. Loads a
//! semicolon-delimited quarterly expense CSV into an in-memory snapshot and
//! serves aggregated views of it: paginated operator listings, per-operator
//! expense history and global statistics.
//!
//! ## Modules
//!
//! - [`store`]: CSV loading and the shared dataset snapshot
//! - [`aggregate`]: Pure aggregation over snapshot records
//! - [`query`]: Pagination, filtering and lookup
//! - [`cache`]: Generic TTL cache backing the statistics endpoint
//! - [`service`]: Facade the HTTP layer calls
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use operadoras::service::DataService;
//! use operadoras::store::DatasetStore;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(DatasetStore::new("./data/consolidado_enriquecido.csv"));
//!     let service = DataService::with_defaults(store);
//!
//!     let page = service.list_operators(1, 10, None, None)?;
//!     println!("{} operators", page.meta.total);
//!
//!     let stats = service.get_statistics()?;
//!     println!("total expenses: {}", stats.total_expenses);
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod config;
pub mod query;
pub mod service;
pub mod store;

// Re-export top-level types for convenience
pub use store::{DatasetStore, ExpenseRecord, Snapshot, StoreError, StoreResult};

pub use aggregate::{OperatorSummary, QuarterExpense, RegionStat, StatisticsSnapshot};

pub use query::{PageMeta, PageResult, MAX_PAGE_SIZE};

pub use cache::TtlCache;

pub use service::DataService;

pub use api::{build_router, serve, ApiError, ApiResult, AppState};

pub use config::{ApiConfig, CacheConfig, Config, ConfigError, DataConfig, LoggingConfig};
