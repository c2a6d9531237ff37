//! Domain types for FeatureLab

pub mod bar;
pub mod series;

pub use bar::PriceBar;
pub use series::{Field, Series};
