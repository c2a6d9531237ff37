//! Moving Average Convergence Divergence (MACD line only).
//!
//! Canonical seeding: fast and slow EMAs of close, each seeded with the SMA
//! of its first `period` closes (12 and 26 by default, multipliers 2/13 and
//! 2/27). MACD[t] = EMA_fast[t] - EMA_slow[t] from bar slow-1 on.
//! Lookback: slow - 1.
//!
//! Legacy seeding reproduces the numbers of the historical feature tables:
//! seeds are the means of the first fast-1 / slow-1 closes, the recurrence
//! for step k reads close[period-1+k], and step k is stored at index k.
//! Values therefore sit `slow - 1` bars earlier than the closes they use,
//! which leaks future prices into past rows. Only use it when comparing
//! against previously produced feature tables.

use serde::{Deserialize, Serialize};

use super::ema::{alpha_for_span, ema_of_series};
use super::{names, Indicator, IndicatorSeries};
use crate::domain::{Field, Series};
use crate::error::FeatureError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSeed {
    #[default]
    Canonical,
    Legacy,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    seed: MacdSeed,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, seed: MacdSeed) -> Self {
        assert!(fast >= 1 && fast < slow, "MACD needs 1 <= fast < slow");
        if seed == MacdSeed::Legacy {
            assert!(fast >= 2, "legacy MACD seeding needs fast >= 2");
        }
        Self { fast, slow, seed }
    }

    fn canonical(&self, closes: &[f64]) -> IndicatorSeries {
        let fast = ema_of_series(closes, self.fast);
        let slow = ema_of_series(closes, self.slow);
        fast.into_iter()
            .zip(slow)
            .map(|(f, s)| Some(f? - s?))
            .collect()
    }

    fn legacy(&self, closes: &[f64]) -> IndicatorSeries {
        let n = closes.len();
        let mut result = vec![None; n];
        let fast = legacy_ema(closes, self.fast - 1, alpha_for_span(self.fast));
        let slow = legacy_ema(closes, self.slow - 1, alpha_for_span(self.slow));

        for (k, (f, s)) in fast.iter().zip(slow.iter()).enumerate().skip(1) {
            if let (Some(f), Some(s)) = (f, s) {
                result[k] = Some(f - s);
            }
        }
        result
    }
}

/// Step k of the shifted recurrence, stored at index k (see module docs).
fn legacy_ema(closes: &[f64], seed_len: usize, alpha: f64) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut out = vec![None; n];
    if n <= seed_len {
        return out;
    }

    let mut prev = closes[..seed_len].iter().sum::<f64>() / seed_len as f64;
    out[0] = Some(prev);
    for (k, &close) in closes.iter().enumerate().skip(seed_len + 1) {
        prev += (close - prev) * alpha;
        out[k - seed_len] = Some(prev);
    }
    out
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        names::MACD
    }

    fn lookback(&self) -> usize {
        match self.seed {
            MacdSeed::Canonical => self.slow - 1,
            MacdSeed::Legacy => 1,
        }
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        let closes = series.column(Field::Close);
        Ok(match self.seed {
            MacdSeed::Canonical => self.canonical(closes),
            MacdSeed::Legacy => self.legacy(closes),
        })
    }
}
