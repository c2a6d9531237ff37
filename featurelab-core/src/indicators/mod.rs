//! Indicator trait and concrete indicator implementations.
//!
//! Indicators are pure functions: a [`Series`] in, one value per bar out.
//! Internally a bar without a value yet is `None`; the numeric `0.0`
//! sentinel only appears when the engine materializes a column into the
//! feature frame (see [`materialize`]).
//!
//! Two families:
//! - windowed statistics (stochastic, momentum, RSI, volatility), built on
//!   the kernels in [`rolling`];
//! - recursive scans (ATR, MACD, OBV) that carry state bar to bar.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod momentum;
pub mod obv;
pub mod rolling;
pub mod rsi;
pub mod stochastic;
pub mod volatility;

pub use atr::{true_range, Atr};
pub use macd::{Macd, MacdSeed};
pub use momentum::{Momentum, Roc, RocScale};
pub use obv::Obv;
pub use rsi::Rsi;
pub use stochastic::{StochasticD, StochasticK, WilliamsR};
pub use volatility::{Disparity, Volatility};

use crate::domain::Series;
use crate::error::FeatureError;

/// Value emitted for bars that have no indicator value (warm-up, undefined).
pub const SENTINEL: f64 = 0.0;

/// Per-bar indicator output before materialization.
pub type IndicatorSeries = Vec<Option<f64>>;

/// Column names, in frame order.
pub mod names {
    pub const STOCHASTIC_K: &str = "slow_stochastic_%K";
    pub const STOCHASTIC_D: &str = "fast_stochastic_%D";
    pub const WILLIAMS_R: &str = "williams_%R";
    pub const MOMENTUM: &str = "price_difference";
    pub const ROC: &str = "price_ROC";
    pub const RSI: &str = "RSI";
    pub const ATR: &str = "ATR";
    pub const VOLATILITY: &str = "average_price_volatility";
    pub const DISPARITY: &str = "disparity_index";
    pub const MACD: &str = "MACD";
    pub const OBV: &str = "on_balance_volume";
    pub const LABEL: &str = "label";

    pub const INDICATORS: [&str; 11] = [
        STOCHASTIC_K,
        STOCHASTIC_D,
        WILLIAMS_R,
        MOMENTUM,
        ROC,
        RSI,
        ATR,
        VOLATILITY,
        DISPARITY,
        MACD,
        OBV,
    ];
}

/// Trait for indicators.
///
/// `compute` returns exactly `series.len()` values. The first `lookback()`
/// entries are always `None`; later entries may also be `None` where the
/// value is undefined (for example a zero divisor).
///
/// # Look-ahead contamination guard
/// Apart from the legacy MACD seeding, no indicator value at bar t depends
/// on data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Column name in the feature frame.
    fn name(&self) -> &str;

    /// Number of leading bars that never carry a value.
    fn lookback(&self) -> usize;

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError>;
}

/// `num / den`, or `DegenerateWindow` when the quotient is not finite.
pub(crate) fn checked_ratio(
    num: f64,
    den: f64,
    indicator: &str,
    index: usize,
) -> Result<f64, FeatureError> {
    let q = num / den;
    if den == 0.0 || !q.is_finite() {
        return Err(FeatureError::DegenerateWindow {
            indicator: indicator.to_string(),
            index,
        });
    }
    Ok(q)
}

/// Turn an indicator series into the numeric column stored in the frame.
///
/// `None` becomes [`SENTINEL`]. A non-finite value is a bug in the
/// indicator's degenerate-window handling; it is logged and also replaced
/// by the sentinel so nothing non-finite reaches consumers.
pub fn materialize(name: &str, values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(index, v)| match v {
            Some(x) if x.is_finite() => *x,
            Some(x) => {
                tracing::warn!(indicator = name, index, value = %x, "non-finite value replaced by sentinel");
                SENTINEL
            }
            None => SENTINEL,
        })
        .collect()
}

/// Create a synthetic series from close prices for testing.
///
/// open = prev_close (or close for the first bar), high = max(open, close) + 1,
/// low = min(open, close) - 1, volume = 1000.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> Series {
    let data: Vec<(f64, f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close, 1000.0)
        })
        .collect();
    make_ohlcv_series(&data)
}

/// Create a series from explicit (open, high, low, close, volume) tuples.
#[cfg(test)]
pub fn make_ohlcv_series(data: &[(f64, f64, f64, f64, f64)]) -> Series {
    use crate::domain::PriceBar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2019, 1, 2).unwrap();
    let bars = data
        .iter()
        .enumerate()
        .map(|(i, &(open, high, low, close, volume))| {
            PriceBar::new(
                base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume,
            )
        })
        .collect();
    Series::new(bars).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
