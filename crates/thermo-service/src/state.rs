//! Application state shared across handlers.
//!
//! The store is opened once and shared behind a single mutex by the
//! aggregation engine (writes) and the query service (reads). The live
//! reading cell is owned here as well, so tests can build an isolated state
//! per case.

use std::sync::Arc;

use thermo_store::Store;
use thermo_types::{Clock, SystemClock};
use tokio::sync::{Mutex, RwLock};

use crate::aggregator::AggregationEngine;
use crate::config::Config;
use crate::live::LiveReadingCell;
use crate::query::QueryService;

/// Shared application state.
pub struct AppState {
    /// The data store (wrapped in Mutex for thread-safe access).
    pub store: Arc<Mutex<Store>>,
    /// Most recent reading since process start.
    pub live: Arc<LiveReadingCell>,
    /// Write path for incoming readings.
    pub engine: AggregationEngine<Store>,
    /// Read path for the current reading and chart data.
    pub query: QueryService<Store>,
    /// Source of "now" for ingestion timestamps and chart windows.
    pub clock: Arc<dyn Clock>,
    /// Configuration (RwLock for runtime updates).
    pub config: RwLock<Config>,
}

impl AppState {
    /// Create new application state using the UTC system clock.
    pub fn new(store: Store, config: Config) -> Arc<Self> {
        Self::with_clock(store, config, Arc::new(SystemClock::default()))
    }

    /// Create new application state with an explicit clock.
    pub fn with_clock(store: Store, config: Config, clock: Arc<dyn Clock>) -> Arc<Self> {
        let store = Arc::new(Mutex::new(store));
        let live = Arc::new(LiveReadingCell::new());

        Arc::new(Self {
            engine: AggregationEngine::new(Arc::clone(&store), Arc::clone(&live)),
            query: QueryService::new(Arc::clone(&store), Arc::clone(&live), Arc::clone(&clock)),
            store,
            live,
            clock,
            config: RwLock::new(config),
        })
    }
}
