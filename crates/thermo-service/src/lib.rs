//! HTTP service that folds temperature readings into hourly min/max buckets.
//!
//! This crate provides a service that:
//! - Accepts readings over HTTP and records them into hour-aligned buckets
//! - Keeps the most recent reading in memory for cheap polling
//! - Serves hourly min/max series for charting
//!
//! # REST API Endpoints
//!
//! - `GET /` - Placeholder landing page
//! - `GET /api/health` - Service health check
//! - `GET /api/health/detailed` - Health check with database diagnostics
//! - `POST /api/temp/insert` - Record a reading: `{"value": 19.9}` or `{"value": "19.9"}`
//! - `GET /api/temp/get` - Latest reading since start
//! - `GET /api/chart/get?days=N` - Hourly buckets for the last `N` days
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/thermo/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:5000"
//!
//! [storage]
//! path = "~/.local/share/thermo/data.db"
//!
//! [readings]
//! clamp = true
//! min = 10.0
//! max = 30.0
//!
//! [chart]
//! default_days = 1
//! max_days = 366
//! ```

pub mod aggregator;
pub mod api;
pub mod config;
pub mod live;
pub mod query;
pub mod state;

pub use aggregator::{AggregateError, AggregationEngine, Effect};
pub use config::{ChartConfig, Config, ConfigError, ServerConfig, StorageConfig};
pub use live::LiveReadingCell;
pub use query::QueryService;
pub use state::AppState;
