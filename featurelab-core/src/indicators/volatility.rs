//! Average price volatility and the disparity index.
//!
//! volatility[t] = 100 / lookback * Σ pct_change[j], j = t-lookback+1 .. t
//!   where pct_change[j] = (close[j] - close[j-1]) / close[j-1]
//!   The sum has lookback - 1 terms and stops before bar t; the divisor is
//!   still `lookback`.
//! disparity[t]  = 100 * close[t] / mean(close[t-w .. t])
//!   where w is the fixed disparity window (10 bars by default), not `lookback`.
//!
//! Lookback: `lookback` for volatility, max(lookback, w) for disparity.
//! A zero close in a divisor position leaves the affected bars without a value.

use super::rolling::RollingSum;
use super::{checked_ratio, names, Indicator, IndicatorSeries};
use crate::domain::Series;
use crate::error::FeatureError;

#[derive(Debug, Clone)]
pub struct Volatility {
    lookback: usize,
}

impl Volatility {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "volatility lookback must be >= 1");
        Self { lookback }
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        names::VOLATILITY
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        let n = series.len();
        let mut result = vec![None; n];
        // lookback == 1 sums nothing and reads as a flat 0.0.
        let mut window = (self.lookback > 1).then(|| RollingSum::new(self.lookback - 1));

        for i in 1..n {
            if i >= self.lookback {
                let sum = match &window {
                    Some(window) => window.sum(),
                    None => Some(0.0),
                };
                result[i] = sum.map(|s| s * 100.0 / self.lookback as f64);
            }

            if let Some(window) = window.as_mut() {
                let prev = series.close(i - 1)?;
                let pct = checked_ratio(series.close(i)? - prev, prev, self.name(), i).ok();
                window.push(pct);
            }
        }

        Ok(result)
    }
}

#[derive(Debug, Clone)]
pub struct Disparity {
    lookback: usize,
    window: usize,
}

impl Disparity {
    /// `window` is the fixed averaging window; `lookback` only delays the start.
    pub fn new(lookback: usize, window: usize) -> Self {
        assert!(window >= 1, "disparity window must be >= 1");
        Self { lookback, window }
    }
}

impl Indicator for Disparity {
    fn name(&self) -> &str {
        names::DISPARITY
    }

    fn lookback(&self) -> usize {
        self.lookback.max(self.window)
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        let n = series.len();
        let mut result = vec![None; n];
        let mut prior = RollingSum::new(self.window);
        let start = self.lookback();

        for i in 1..n {
            prior.push(Some(series.close(i - 1)?));
            if i < start {
                continue;
            }
            if let Some(mean) = prior.mean() {
                result[i] = checked_ratio(series.close(i)?, mean, self.name(), i)
                    .ok()
                    .map(|r| 100.0 * r);
            }
        }

        Ok(result)
    }
}
