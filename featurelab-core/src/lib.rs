//! FeatureLab Core: technical-indicator feature engineering for daily OHLCV
//! series.
//!
//! - Domain types (price bars, column-oriented series)
//! - Windowed and recursive indicators behind one `Indicator` trait
//! - Forward-looking trend label
//! - Feature engine assembling an index-aligned `FeatureFrame`

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod frame;
pub mod indicators;
pub mod label;

pub use config::{Constants, FeatureConfig};
pub use domain::{Field, PriceBar, Series};
pub use engine::{engineer_features, FeatureEngine};
pub use error::FeatureError;
pub use frame::{Column, FeatureFrame, FeatureRow};
pub use label::{LabelPolicy, TrendLabel};
