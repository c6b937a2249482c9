//! Pick'em operator service
//!
//! Configuration loading, logging setup, and the snapshot-backed service
//! state behind the `pickem` binary.

pub mod config;
pub mod logging;
pub mod service;

pub use config::{load_config, LoggingConfig, ServiceConfig};
pub use logging::initialize_logging;
pub use service::{score_stats_file, PickemService, ScoreReport, ScoredLine};
