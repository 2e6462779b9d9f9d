// Application state module
// Shared, read-only state handed to every connection task

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::routing::{RouteError, RouteTable};
use crate::shop::{self, Catalog, View};

/// Application state, shared behind one `Arc`
pub struct AppState {
    pub config: Config,
    /// Built once at startup, never mutated
    pub routes: RouteTable<View>,
    pub catalog: Catalog,
    pub shutdown_signal: Arc<Notify>,
}

impl AppState {
    /// Build the route table and catalog from configuration
    pub fn new(config: &Config) -> Result<Self, RouteError> {
        Ok(Self {
            config: config.clone(),
            routes: shop::urls::build()?,
            catalog: Catalog::new(config.catalog.courses.clone()),
            shutdown_signal: Arc::new(Notify::new()),
        })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
