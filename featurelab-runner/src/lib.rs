//! FeatureLab Runner: batch feature engineering around `featurelab-core`.
//!
//! This crate provides:
//! - CSV loading with a deterministic synthetic fallback
//! - Per-ticker engineering, run in parallel across a ticker list
//! - The index join (stock frame beside a market-index frame)
//! - CSV / JSON export
//! - TOML job configuration

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod merge;

pub use batch::{
    engineer_all, engineer_ticker, finish_frame, run_batch, BatchError, BatchReport,
    EngineeredTicker, TickerFailure, TickerOutcome,
};
pub use config::{ConfigError, JobConfig, TickerSpec};
pub use data_loader::{
    generate_synthetic_series, load_csv, load_series, read_csv, DataSource, LoadError,
    LoadedSeries, SyntheticOptions,
};
pub use export::{frame_to_csv, frame_to_json, write_frame, write_series, ExportFormat};
pub use merge::{merge_with_index, MergeOptions};
