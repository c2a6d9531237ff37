//! Relative Strength Index (RSI) with simple averages.
//!
//! change[t] = close[t] - close[t-1] (change[0] = 0), split into gain and loss.
//! avg_gain / avg_loss are plain means over the `lookback` changes before
//! bar t (changes t-lookback .. t), so bar t's own change is not included.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: `lookback`.
//! Edge cases: avg_loss == 0 → RSI = 100; both zero → RSI = 50.

use super::rolling::RollingSum;
use super::{checked_ratio, names, Indicator, IndicatorSeries};
use crate::domain::Series;
use crate::error::FeatureError;

#[derive(Debug, Clone)]
pub struct Rsi {
    lookback: usize,
}

impl Rsi {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "RSI lookback must be >= 1");
        Self { lookback }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        names::RSI
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        let n = series.len();
        let mut result = vec![None; n];
        let mut gains = RollingSum::new(self.lookback);
        let mut losses = RollingSum::new(self.lookback);

        for i in 0..n {
            if i >= self.lookback {
                if let (Some(avg_gain), Some(avg_loss)) = (gains.mean(), losses.mean()) {
                    result[i] = Some(self.rsi(avg_gain, avg_loss, i));
                }
            }

            let change = if i == 0 {
                0.0
            } else {
                series.close(i)? - series.close(i - 1)?
            };
            gains.push(Some(change.max(0.0)));
            losses.push(Some((-change).max(0.0)));
        }

        Ok(result)
    }
}

impl Rsi {
    fn rsi(&self, avg_gain: f64, avg_loss: f64, index: usize) -> f64 {
        match checked_ratio(avg_gain, avg_loss, self.name(), index) {
            Ok(rs) => 100.0 - 100.0 / (1.0 + rs),
            Err(_) if avg_gain == 0.0 => 50.0, // no movement
            Err(_) => 100.0,
        }
    }
}
