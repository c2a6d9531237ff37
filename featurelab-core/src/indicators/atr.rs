//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), defined
//! from bar 1 on. ATR is the adjusted exponentially weighted mean of True
//! Range with span 14 (alpha = 2/15), decaying from bar 1; bar 0 has no
//! previous close and never carries a value.
//! Lookback: 1.

use super::ema::ewm_adjusted;
use super::{names, Indicator, IndicatorSeries};
use crate::domain::Series;
use crate::error::FeatureError;

#[derive(Debug, Clone)]
pub struct Atr {
    span: usize,
}

impl Atr {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "ATR span must be >= 1");
        Self { span }
    }
}

/// True Range per bar. TR[0] is `None` (no previous close).
pub fn true_range(series: &Series) -> Result<IndicatorSeries, FeatureError> {
    let n = series.len();
    let mut tr = vec![None; n];

    for i in 1..n {
        let h = series.high(i)?;
        let l = series.low(i)?;
        let pc = series.close(i - 1)?;
        tr[i] = Some((h - l).max((h - pc).abs()).max((l - pc).abs()));
    }

    Ok(tr)
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        names::ATR
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        Ok(ewm_adjusted(&true_range(series)?, self.span))
    }
}
