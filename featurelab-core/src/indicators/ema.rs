//! Exponential averaging kernels used by ATR and MACD.
//!
//! Two conventions are needed:
//! - [`ema_of_series`]: classic EMA seeded with the SMA of the first
//!   `period` values, EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1],
//!   alpha = 2 / (period + 1). First value at index period-1.
//! - [`ewm_adjusted`]: the bias-corrected exponentially weighted mean
//!   y[t] = Σ w^k x[t-k] / Σ w^k with w = 1 - alpha, alpha = 2 / (span + 1).
//!   It has a value from the first defined input onward; leading `None`
//!   inputs are skipped rather than weighted.

/// Smoothing factor for an EMA of the given period or span.
pub fn alpha_for_span(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// SMA-seeded EMA of an arbitrary series.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];

    if n < period || period == 0 {
        return result;
    }

    let alpha = alpha_for_span(period);

    // Seed: SMA of first `period` values
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..n {
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = Some(ema);
        prev = ema;
    }

    result
}

/// Adjusted exponentially weighted mean over the defined tail of `values`.
///
/// Leading `None` entries stay `None`. A `None` after the first defined value
/// is treated as a gap: its output is `None` and the weights keep decaying
/// across it, matching the usual ignore-missing-values-but-keep-time rule.
pub fn ewm_adjusted(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    assert!(span >= 1, "EWM span must be >= 1");
    let decay = 1.0 - alpha_for_span(span);
    let mut result = vec![None; values.len()];
    let mut num = 0.0;
    let mut den = 0.0;
    let mut started = false;

    for (i, v) in values.iter().enumerate() {
        match v {
            Some(x) => {
                num = x + decay * num;
                den = 1.0 + decay * den;
                started = true;
                result[i] = Some(num / den);
            }
            None if started => {
                num *= decay;
                den *= decay;
            }
            None => {}
        }
    }

    result
}
