//! Batch job configuration, loaded from TOML.
//!
//! ```toml
//! output_dir = "features"
//! data_dir = "data"
//! formats = ["csv", "json"]
//! drop_unlabeled = true
//! drop_columns = ["williams_%R_y"]
//!
//! [index]
//! symbol = "SPY"
//!
//! [[tickers]]
//! symbol = "AAPL"
//!
//! [[tickers]]
//! symbol = "AMD"
//! path = "other/amd_daily.csv"
//!
//! [features]
//! lookback = 5
//! window = 20
//!
//! [synthetic]
//! enabled = false
//! ```
//!
//! Relative paths resolve against the directory of the config file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use featurelab_core::{FeatureConfig, FeatureError};

use crate::data_loader::SyntheticOptions;
use crate::export::ExportFormat;
use crate::merge::MergeOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read job config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse job config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid feature settings: {0}")]
    Features(#[from] FeatureError),

    #[error("invalid job config: {0}")]
    Invalid(String),
}

/// A ticker to engineer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TickerSpec {
    pub symbol: String,
    /// CSV file; defaults to `{data_dir}/{symbol}.csv`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl TickerSpec {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub tickers: Vec<TickerSpec>,
    /// Market index joined onto every ticker.
    #[serde(default)]
    pub index: Option<TickerSpec>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,
    /// Drop rows without a forward label (only meaningful with the ternary
    /// label policy).
    #[serde(default)]
    pub drop_unlabeled: bool,
    /// Columns removed after the index join.
    #[serde(default)]
    pub drop_columns: Vec<String>,
    #[serde(default)]
    pub synthetic: SyntheticOptions,
    #[serde(default)]
    pub features: FeatureConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("features")
}

fn default_formats() -> Vec<ExportFormat> {
    vec![ExportFormat::Csv]
}

impl JobConfig {
    /// Minimal job over the given tickers with default settings.
    pub fn for_tickers(tickers: Vec<TickerSpec>) -> Self {
        Self {
            tickers,
            index: None,
            output_dir: default_output_dir(),
            data_dir: None,
            formats: default_formats(),
            drop_unlabeled: false,
            drop_columns: Vec::new(),
            synthetic: SyntheticOptions::default(),
            features: FeatureConfig::default(),
        }
    }

    /// Load a job config from a TOML file; relative paths resolve against
    /// the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse a job config from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.features.validate()?;
        if self.tickers.is_empty() {
            return Err(ConfigError::Invalid("no tickers configured".into()));
        }
        if self.formats.is_empty() {
            return Err(ConfigError::Invalid("no export formats configured".into()));
        }
        let mut seen = HashSet::new();
        for ticker in self.tickers.iter().chain(self.index.iter()) {
            if ticker.symbol.trim().is_empty() {
                return Err(ConfigError::Invalid("empty ticker symbol".into()));
            }
            if !seen.insert(ticker.symbol.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "ticker '{}' listed twice",
                    ticker.symbol
                )));
            }
            if self.csv_path(ticker).is_none() && !self.synthetic.enabled {
                return Err(ConfigError::Invalid(format!(
                    "ticker '{}' has no path, no data_dir is set, and synthetic data is disabled",
                    ticker.symbol
                )));
            }
        }
        Ok(())
    }

    /// CSV location for a ticker, if one can be determined.
    pub fn csv_path(&self, ticker: &TickerSpec) -> Option<PathBuf> {
        ticker.path.clone().or_else(|| {
            self.data_dir
                .as_ref()
                .map(|dir| dir.join(format!("{}.csv", ticker.symbol)))
        })
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            drop_unlabeled: self.drop_unlabeled,
            drop_columns: self.drop_columns.clone(),
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.output_dir);
        if let Some(dir) = self.data_dir.as_mut() {
            resolve(dir);
        }
        for ticker in self.tickers.iter_mut().chain(self.index.iter_mut()) {
            if let Some(path) = ticker.path.as_mut() {
                resolve(path);
            }
        }
    }
}
