//! Stochastic oscillators: %K, %D, and Williams %R.
//!
//! The range is taken over the closes of the `lookback` bars strictly before
//! bar i, so the current close can sit above or below it (%K above 100 or
//! below 0 is possible and kept as-is).
//!
//! %K[i] = (close[i] - low) / (high - low) * 100
//! %R[i] = (high - close[i]) / (high - low) * -100
//! %D[i] = mean(%K[i - lookback + 1 ..= i]), warm-up zeros of %K included.
//! Lookback: `lookback`.
//!
//! Flat range (high == low): the close is compared with the flat level.
//! Above saturates to the top (%K = 100, %R = 0), below to the bottom
//! (%K = 0, %R = -100), equal sits mid-range (%K = 50, %R = -50).

use super::rolling::{prior_extremes, RollingSum};
use super::{checked_ratio, materialize, names, Indicator, IndicatorSeries};
use crate::domain::{Field, Series};
use crate::error::FeatureError;

#[derive(Debug, Clone)]
pub struct StochasticK {
    lookback: usize,
}

impl StochasticK {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "stochastic lookback must be >= 1");
        Self { lookback }
    }
}

#[derive(Debug, Clone)]
pub struct StochasticD {
    lookback: usize,
}

impl StochasticD {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "stochastic lookback must be >= 1");
        Self { lookback }
    }
}

#[derive(Debug, Clone)]
pub struct WilliamsR {
    lookback: usize,
}

impl WilliamsR {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "Williams %R lookback must be >= 1");
        Self { lookback }
    }
}

/// Where a close sits relative to a flat range level.
fn flat_range_fraction(close: f64, level: f64) -> f64 {
    if close > level {
        1.0
    } else if close < level {
        0.0
    } else {
        0.5
    }
}

/// Applies `f(close, low, high, index)` on every bar past warm-up.
fn over_prior_range<F>(series: &Series, lookback: usize, mut f: F) -> Result<IndicatorSeries, FeatureError>
where
    F: FnMut(f64, f64, f64, usize) -> f64,
{
    let n = series.len();
    let mut result = vec![None; n];
    let extremes = prior_extremes(series.column(Field::Close), lookback);

    for (i, range) in extremes.into_iter().enumerate().skip(lookback) {
        if let Some((low, high)) = range {
            let close = series.close(i)?;
            result[i] = Some(f(close, low, high, i));
        }
    }

    Ok(result)
}

impl Indicator for StochasticK {
    fn name(&self) -> &str {
        names::STOCHASTIC_K
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        over_prior_range(series, self.lookback, |close, low, high, i| {
            match checked_ratio(close - low, high - low, self.name(), i) {
                Ok(frac) => frac * 100.0,
                Err(_) => flat_range_fraction(close, low) * 100.0,
            }
        })
    }
}

impl Indicator for WilliamsR {
    fn name(&self) -> &str {
        names::WILLIAMS_R
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        over_prior_range(series, self.lookback, |close, low, high, i| {
            match checked_ratio(high - close, high - low, self.name(), i) {
                Ok(frac) => frac * -100.0,
                Err(_) => (flat_range_fraction(close, low) - 1.0) * 100.0,
            }
        })
    }
}

impl Indicator for StochasticD {
    fn name(&self) -> &str {
        names::STOCHASTIC_D
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        let k_indicator = StochasticK::new(self.lookback);
        // %K warm-up zeros take part in the average, damping early %D.
        let k = materialize(k_indicator.name(), &k_indicator.compute(series)?);

        let mut result = vec![None; k.len()];
        let mut window = RollingSum::new(self.lookback);
        for (i, &value) in k.iter().enumerate() {
            window.push(Some(value));
            if i >= self.lookback {
                result[i] = window.mean();
            }
        }
        Ok(result)
    }
}
