//! Application State
//!
//! Shared state accessible by all API handlers, wrapped in `Arc` for
//! sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::service::DataService;

/// Shared application state for all handlers
pub struct AppState {
    /// Data service backing every route.
    pub service: Arc<DataService>,
    /// API configuration (pagination bounds, bind address).
    pub config: ApiConfig,
    /// Server start time for uptime tracking.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: Arc<DataService>, config: ApiConfig) -> Self {
        Self {
            service,
            config,
            start_time: Instant::now(),
        }
    }

    /// Server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
