//! Configuration loading and management for the Attendance Engine.
//!
//! This module loads the engine settings (sweeper cadence, aggregation
//! policy and closure defaults) from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Standard day: {} minutes", config.aggregation().standard_daily_minutes);
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::{
    AggregationConfig, BreakPolicy, ClosureConfig, DEFAULT_STANDARD_DAILY_MINUTES, EngineConfig,
    SweeperConfig,
};
