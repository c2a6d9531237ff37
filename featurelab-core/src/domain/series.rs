//! Series: the validated, read-only price history handed to every indicator.
//!
//! Storage is column-oriented so windowed indicators can scan one field
//! without touching the others. All positional reads go through
//! [`Series::value`], which is bounds-checked.

use chrono::NaiveDate;

use super::bar::PriceBar;
use crate::error::FeatureError;

/// OHLCV field selector for [`Series::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    symbol: Option<String>,
    dates: Vec<NaiveDate>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
}

impl Series {
    /// Build a series from date-ordered bars.
    ///
    /// Rejects an empty input, non-finite fields, and dates that are not
    /// strictly increasing. Calendar gaps are fine.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, FeatureError> {
        if bars.is_empty() {
            return Err(FeatureError::EmptySeries);
        }

        let n = bars.len();
        let mut series = Self {
            symbol: None,
            dates: Vec::with_capacity(n),
            open: Vec::with_capacity(n),
            high: Vec::with_capacity(n),
            low: Vec::with_capacity(n),
            close: Vec::with_capacity(n),
            volume: Vec::with_capacity(n),
        };

        for (index, bar) in bars.into_iter().enumerate() {
            if let Some(field) = bar.non_finite_field() {
                return Err(FeatureError::InvalidBar {
                    index,
                    reason: format!("{field} is not finite"),
                });
            }
            if let Some(prev) = series.dates.last() {
                if bar.date <= *prev {
                    return Err(FeatureError::UnorderedDates { index });
                }
            }
            series.dates.push(bar.date);
            series.open.push(bar.open);
            series.high.push(bar.high);
            series.low.push(bar.low);
            series.close.push(bar.close);
            series.volume.push(bar.volume);
        }

        Ok(series)
    }

    /// Attach a ticker symbol (used for logging and export only).
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Number of bars. Always >= 1.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Field value at bar `index`.
    pub fn value(&self, field: Field, index: usize) -> Result<f64, FeatureError> {
        self.column(field)
            .get(index)
            .copied()
            .ok_or(FeatureError::OutOfRange {
                index,
                len: self.len(),
            })
    }

    pub fn open(&self, index: usize) -> Result<f64, FeatureError> {
        self.value(Field::Open, index)
    }

    pub fn high(&self, index: usize) -> Result<f64, FeatureError> {
        self.value(Field::High, index)
    }

    pub fn low(&self, index: usize) -> Result<f64, FeatureError> {
        self.value(Field::Low, index)
    }

    pub fn close(&self, index: usize) -> Result<f64, FeatureError> {
        self.value(Field::Close, index)
    }

    pub fn volume(&self, index: usize) -> Result<f64, FeatureError> {
        self.value(Field::Volume, index)
    }

    pub fn date(&self, index: usize) -> Result<NaiveDate, FeatureError> {
        self.dates.get(index).copied().ok_or(FeatureError::OutOfRange {
            index,
            len: self.len(),
        })
    }

    /// Full bar at `index`.
    pub fn bar(&self, index: usize) -> Result<PriceBar, FeatureError> {
        Ok(PriceBar {
            date: self.date(index)?,
            open: self.open(index)?,
            high: self.high(index)?,
            low: self.low(index)?,
            close: self.close(index)?,
            volume: self.volume(index)?,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Whole column for one field, for callers that scan rather than index.
    pub fn column(&self, field: Field) -> &[f64] {
        match field {
            Field::Open => &self.open,
            Field::High => &self.high,
            Field::Low => &self.low,
            Field::Close => &self.close,
            Field::Volume => &self.volume,
        }
    }

    /// Copy of the first `len` bars, or `None` when `len` is 0 or exceeds the series.
    pub fn truncated(&self, len: usize) -> Option<Self> {
        if len == 0 || len > self.len() {
            return None;
        }
        Some(Self {
            symbol: self.symbol.clone(),
            dates: self.dates[..len].to_vec(),
            open: self.open[..len].to_vec(),
            high: self.high[..len].to_vec(),
            low: self.low[..len].to_vec(),
            close: self.close[..len].to_vec(),
            volume: self.volume[..len].to_vec(),
        })
    }
}
