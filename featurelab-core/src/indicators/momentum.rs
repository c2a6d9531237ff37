//! Momentum and Rate of Change over `lookback` bars.
//!
//! momentum[t] = close[t] - close[t-lookback]
//! roc[t]      = (close[t] - close[t-lookback]) / close[t-lookback]      (ratio)
//!             = (close[t] - close[t-lookback]) / close[t-lookback] * 100 (percent)
//! Lookback: `lookback`. A zero reference close leaves ROC without a value.

use serde::{Deserialize, Serialize};

use super::{checked_ratio, names, Indicator, IndicatorSeries};
use crate::domain::Series;
use crate::error::FeatureError;

/// Output scale of the rate of change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RocScale {
    /// Fractional change, 0.05 for +5%.
    #[default]
    Ratio,
    /// Percentage points, 5.0 for +5%.
    Percent,
}

impl RocScale {
    fn factor(self) -> f64 {
        match self {
            RocScale::Ratio => 1.0,
            RocScale::Percent => 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Momentum {
    lookback: usize,
}

impl Momentum {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "Momentum lookback must be >= 1");
        Self { lookback }
    }
}

impl Indicator for Momentum {
    fn name(&self) -> &str {
        names::MOMENTUM
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        let n = series.len();
        let mut result = vec![None; n];
        for i in self.lookback..n {
            result[i] = Some(series.close(i)? - series.close(i - self.lookback)?);
        }
        Ok(result)
    }
}

#[derive(Debug, Clone)]
pub struct Roc {
    lookback: usize,
    scale: RocScale,
}

impl Roc {
    pub fn new(lookback: usize, scale: RocScale) -> Self {
        assert!(lookback >= 1, "ROC lookback must be >= 1");
        Self { lookback, scale }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        names::ROC
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        let n = series.len();
        let mut result = vec![None; n];
        for i in self.lookback..n {
            let prev = series.close(i - self.lookback)?;
            let curr = series.close(i)?;
            result[i] = checked_ratio(curr - prev, prev, self.name(), i)
                .ok()
                .map(|r| r * self.scale.factor());
        }
        Ok(result)
    }
}
