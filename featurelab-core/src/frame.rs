//! FeatureFrame: the assembled, index-aligned feature table.
//!
//! One row per input bar, named numeric columns in a stable order, plus the
//! trend label. All values are finite; bars without an indicator value hold
//! the `0.0` sentinel.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FeatureError;
use crate::indicators::names;
use crate::label::TrendLabel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// One row view of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub index: usize,
    pub date: NaiveDate,
    pub values: Vec<f64>,
    pub label: TrendLabel,
}

/// Counts of each label value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelBalance {
    pub down: usize,
    pub unlabeled: usize,
    pub up: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameParts")]
pub struct FeatureFrame {
    symbol: Option<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
    labels: Vec<TrendLabel>,
}

/// Unchecked serialized form; goes through [`FeatureFrame::from_parts`].
#[derive(Deserialize)]
struct FrameParts {
    symbol: Option<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
    labels: Vec<TrendLabel>,
}

impl TryFrom<FrameParts> for FeatureFrame {
    type Error = FeatureError;

    fn try_from(parts: FrameParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.symbol, parts.dates, parts.columns, parts.labels)
    }
}

impl FeatureFrame {
    /// Assemble a frame, checking that every column and the labels match
    /// the number of dates.
    pub fn from_parts(
        symbol: Option<String>,
        dates: Vec<NaiveDate>,
        columns: Vec<Column>,
        labels: Vec<TrendLabel>,
    ) -> Result<Self, FeatureError> {
        let expected = dates.len();
        for column in &columns {
            if column.values.len() != expected {
                return Err(FeatureError::LengthMismatch {
                    column: column.name.clone(),
                    expected,
                    actual: column.values.len(),
                });
            }
        }
        if labels.len() != expected {
            return Err(FeatureError::LengthMismatch {
                column: names::LABEL.to_string(),
                expected,
                actual: labels.len(),
            });
        }
        Ok(Self {
            symbol,
            dates,
            columns,
            labels,
        })
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn labels(&self) -> &[TrendLabel] {
        &self.labels
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn try_column(&self, name: &str) -> Result<&[f64], FeatureError> {
        self.column(name)
            .ok_or_else(|| FeatureError::UnknownColumn(name.to_string()))
    }

    /// Value of `name` at `row`.
    pub fn value(&self, name: &str, row: usize) -> Result<f64, FeatureError> {
        let values = self.try_column(name)?;
        values.get(row).copied().ok_or(FeatureError::OutOfRange {
            index: row,
            len: values.len(),
        })
    }

    pub fn row(&self, index: usize) -> Result<FeatureRow, FeatureError> {
        let date = *self.dates.get(index).ok_or(FeatureError::OutOfRange {
            index,
            len: self.len(),
        })?;
        Ok(FeatureRow {
            index,
            date,
            values: self.columns.iter().map(|c| c.values[index]).collect(),
            label: self.labels[index],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = FeatureRow> + '_ {
        (0..self.len()).map(move |index| FeatureRow {
            index,
            date: self.dates[index],
            values: self.columns.iter().map(|c| c.values[index]).collect(),
            label: self.labels[index],
        })
    }

    /// Remove a column, returning its values.
    pub fn drop_column(&mut self, name: &str) -> Result<Vec<f64>, FeatureError> {
        let pos = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| FeatureError::UnknownColumn(name.to_string()))?;
        Ok(self.columns.remove(pos).values)
    }

    /// Append `suffix` to every column name (for joining several tickers).
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        for column in &mut self.columns {
            column.name.push_str(suffix);
        }
        self
    }

    /// New frame holding only the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Result<Self, FeatureError> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.len()) {
            return Err(FeatureError::OutOfRange {
                index: bad,
                len: self.len(),
            });
        }
        Ok(Self {
            symbol: self.symbol.clone(),
            dates: rows.iter().map(|&r| self.dates[r]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), rows.iter().map(|&r| c.values[r]).collect()))
                .collect(),
            labels: rows.iter().map(|&r| self.labels[r]).collect(),
        })
    }

    /// Rows whose label is Up or Down.
    pub fn labeled_only(&self) -> Self {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.labels[i].is_labeled())
            .collect();
        // Indices come from 0..len, so selection cannot fail.
        self.select_rows(&keep).unwrap_or_else(|_| self.clone())
    }

    pub fn label_balance(&self) -> LabelBalance {
        let mut balance = LabelBalance::default();
        for label in &self.labels {
            match label {
                TrendLabel::Down => balance.down += 1,
                TrendLabel::Unlabeled => balance.unlabeled += 1,
                TrendLabel::Up => balance.up += 1,
            }
        }
        balance
    }

    /// BLAKE3 digest over dates, column names, value bits, and labels.
    ///
    /// Two frames with the same fingerprint are bit-identical.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.len() as u64).to_le_bytes());
        for date in &self.dates {
            hasher.update(date.to_string().as_bytes());
        }
        for column in &self.columns {
            hasher.update(column.name.as_bytes());
            hasher.update(&[0]);
            for v in &column.values {
                hasher.update(&v.to_bits().to_le_bytes());
            }
        }
        for label in &self.labels {
            hasher.update(&[label.as_i8() as u8]);
        }
        hasher.finalize().to_hex().to_string()
    }
}
