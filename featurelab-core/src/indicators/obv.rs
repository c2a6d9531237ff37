//! On-Balance Volume (OBV).
//!
//! obv[0] = volume[0]
//! obv[t] = obv[t-1] + volume[t]  if close[t] > close[t-1]
//!        = obv[t-1] - volume[t]  if close[t] < close[t-1]
//!        = obv[t-1]              otherwise (exact tie)
//! Lookback: 0.

use super::{names, Indicator, IndicatorSeries};
use crate::domain::Series;
use crate::error::FeatureError;

#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Obv {
    fn name(&self) -> &str {
        names::OBV
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, series: &Series) -> Result<IndicatorSeries, FeatureError> {
        let n = series.len();
        let mut result = Vec::with_capacity(n);
        let mut obv = series.volume(0)?;
        result.push(Some(obv));

        for i in 1..n {
            let curr = series.close(i)?;
            let prev = series.close(i - 1)?;
            if curr > prev {
                obv += series.volume(i)?;
            } else if curr < prev {
                obv -= series.volume(i)?;
            }
            result.push(Some(obv));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlcv_series;

    fn closes_with_volume(data: &[(f64, f64)]) -> Series {
        let rows: Vec<_> = data
            .iter()
            .map(|&(close, volume)| (close, close, close, close, volume))
            .collect();
        make_ohlcv_series(&rows)
    }

    #[test]
    fn obv_accumulates_signed_volume() {
        let series = closes_with_volume(&[
            (10.0, 100.0),
            (11.0, 200.0), // up: +200
            (10.5, 50.0),  // down: -50
            (10.5, 999.0), // tie: unchanged
            (12.0, 10.0),  // up: +10
        ]);
        let result = Obv::new().compute(&series).unwrap();
        assert_eq!(
            result,
            vec![Some(100.0), Some(300.0), Some(250.0), Some(250.0), Some(260.0)]
        );
    }

    #[test]
    fn obv_constant_close_stays_at_first_volume() {
        let series = closes_with_volume(&[(5.0, 42.0), (5.0, 1.0), (5.0, 2.0), (5.0, 3.0)]);
        let result = Obv::new().compute(&series).unwrap();
        assert!(result.iter().all(|v| *v == Some(42.0)));
    }

    #[test]
    fn obv_single_bar() {
        let series = closes_with_volume(&[(5.0, 7.0)]);
        assert_eq!(Obv::new().compute(&series).unwrap(), vec![Some(7.0)]);
    }
}
