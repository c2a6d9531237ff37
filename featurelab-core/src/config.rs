//! Engine configuration.
//!
//! `lookback` and `window` are the only per-run knobs the pipeline normally
//! touches. The smoothing spans and fixed sub-windows live in [`Constants`]
//! so they stay auditable and can be overridden in tests. Everything is
//! loadable from TOML; missing keys fall back to the defaults below.
//!
//! ```toml
//! lookback = 5
//! window = 20
//! macd_seed = "canonical"
//! roc_scale = "ratio"
//! label_policy = "collapse_to_positive"
//!
//! [constants]
//! atr_span = 14
//! macd_fast = 12
//! macd_slow = 26
//! disparity_window = 10
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FeatureError;
use crate::indicators::{MacdSeed, RocScale};
use crate::label::LabelPolicy;

pub const DEFAULT_LOOKBACK: usize = 5;
pub const DEFAULT_WINDOW: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] FeatureError),
}

/// Fixed spans and sub-windows shared by the smoothed and windowed modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Constants {
    /// Span of the ATR exponential mean (alpha = 2 / (span + 1)).
    pub atr_span: usize,
    /// Fast MACD EMA period (multiplier 2 / (fast + 1)).
    pub macd_fast: usize,
    /// Slow MACD EMA period (multiplier 2 / (slow + 1)).
    pub macd_slow: usize,
    /// Trailing window of the disparity mean; independent of `lookback`.
    pub disparity_window: usize,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            atr_span: 14,
            macd_fast: 12,
            macd_slow: 26,
            disparity_window: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureConfig {
    /// Trailing window (bars) for %K, %D, %R, momentum, ROC, RSI, volatility.
    pub lookback: usize,
    /// Forward horizon (bars) of the trend label.
    pub window: usize,
    pub macd_seed: MacdSeed,
    pub roc_scale: RocScale,
    pub label_policy: LabelPolicy,
    pub constants: Constants,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            window: DEFAULT_WINDOW,
            macd_seed: MacdSeed::default(),
            roc_scale: RocScale::default(),
            label_policy: LabelPolicy::default(),
            constants: Constants::default(),
        }
    }
}

impl FeatureConfig {
    pub fn new(lookback: usize, window: usize) -> Self {
        Self {
            lookback,
            window,
            ..Self::default()
        }
    }

    /// Load a configuration from a TOML file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parameter checks that do not depend on the series.
    pub fn validate(&self) -> Result<(), FeatureError> {
        let c = &self.constants;
        let positive = [
            ("lookback", self.lookback),
            ("window", self.window),
            ("atr_span", c.atr_span),
            ("macd_fast", c.macd_fast),
            ("macd_slow", c.macd_slow),
            ("disparity_window", c.disparity_window),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(FeatureError::InvalidParameter(format!(
                    "{name} must be > 0"
                )));
            }
        }
        if c.macd_fast >= c.macd_slow {
            return Err(FeatureError::InvalidParameter(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                c.macd_fast, c.macd_slow
            )));
        }
        if self.macd_seed == MacdSeed::Legacy && c.macd_fast < 2 {
            return Err(FeatureError::InvalidParameter(
                "legacy MACD seeding needs macd_fast >= 2".into(),
            ));
        }
        Ok(())
    }

    /// Checks against a concrete series length.
    pub fn validate_for_len(&self, len: usize) -> Result<(), FeatureError> {
        self.validate()?;
        if self.lookback >= len {
            return Err(FeatureError::InsufficientHistory {
                param: "lookback",
                value: self.lookback,
                len,
            });
        }
        if self.window >= len {
            return Err(FeatureError::InsufficientHistory {
                param: "window",
                value: self.window,
                len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = FeatureConfig::default();
        assert_eq!(config.lookback, 5);
        assert_eq!(config.window, 20);
        assert_eq!(config.constants.atr_span, 14);
        assert_eq!(config.constants.macd_fast, 12);
        assert_eq!(config.constants.macd_slow, 26);
        assert_eq!(config.constants.disparity_window, 10);
        assert_eq!(config.macd_seed, MacdSeed::Canonical);
        assert_eq!(config.roc_scale, RocScale::Ratio);
        assert_eq!(config.label_policy, LabelPolicy::CollapseToPositive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_toml() {
        let config = FeatureConfig::from_toml(
            r#"
            lookback = 90
            label_policy = "ternary"

            [constants]
            disparity_window = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.lookback, 90);
        assert_eq!(config.window, 20);
        assert_eq!(config.label_policy, LabelPolicy::Ternary);
        assert_eq!(config.constants.disparity_window, 20);
        assert_eq!(config.constants.atr_span, 14);
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        let err = FeatureConfig::from_toml("lookbak = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn parse_rejects_zero_lookback() {
        let err = FeatureConfig::from_toml("lookback = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(FeatureError::InvalidParameter(_))
        ));
    }

    #[test]
    fn validate_rejects_inverted_macd_periods() {
        let mut config = FeatureConfig::default();
        config.constants.macd_fast = 26;
        config.constants.macd_slow = 12;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_for_len_reports_insufficient_history() {
        let config = FeatureConfig::new(5, 3);
        assert!(config.validate_for_len(6).is_ok());
        assert_eq!(
            config.validate_for_len(5),
            Err(FeatureError::InsufficientHistory {
                param: "lookback",
                value: 5,
                len: 5
            })
        );

        let config = FeatureConfig::new(2, 10);
        assert_eq!(
            config.validate_for_len(8),
            Err(FeatureError::InsufficientHistory {
                param: "window",
                value: 10,
                len: 8
            })
        );
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = FeatureConfig::new(14, 5);
        config.macd_seed = MacdSeed::Legacy;
        config.roc_scale = RocScale::Percent;
        let text = toml::to_string(&config).unwrap();
        let back = FeatureConfig::from_toml(&text).unwrap();
        assert_eq!(config, back);
    }
}
