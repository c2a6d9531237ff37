//! Forward-looking trend label.
//!
//! For bar i with 1 <= i and i + window < N:
//!   Up   if close[i + window] >= close[i]
//!   Down otherwise
//! Bar 0 and the last `window` bars have no forward comparison and are
//! Unlabeled. [`LabelPolicy`] decides what Unlabeled becomes on output.

use serde::{Deserialize, Serialize};

use crate::domain::Series;
use crate::error::FeatureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendLabel {
    Down,
    Unlabeled,
    Up,
}

impl TrendLabel {
    /// -1, 0, or +1.
    pub fn as_i8(self) -> i8 {
        match self {
            TrendLabel::Down => -1,
            TrendLabel::Unlabeled => 0,
            TrendLabel::Up => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_i8())
    }

    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(TrendLabel::Down),
            0 => Some(TrendLabel::Unlabeled),
            1 => Some(TrendLabel::Up),
            _ => None,
        }
    }

    pub fn is_labeled(self) -> bool {
        self != TrendLabel::Unlabeled
    }
}

/// What happens to bars without a forward comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Unlabeled bars are emitted as Up, giving a strict {-1, +1} column.
    /// Reproduces the historical feature tables; biases the class balance
    /// towards Up by `window + 1` rows per series.
    #[default]
    CollapseToPositive,
    /// Unlabeled bars stay Unlabeled (0) so consumers can drop them.
    Ternary,
}

#[derive(Debug, Clone)]
pub struct LabelGenerator {
    window: usize,
    policy: LabelPolicy,
}

impl LabelGenerator {
    pub fn new(window: usize, policy: LabelPolicy) -> Self {
        assert!(window >= 1, "label window must be >= 1");
        Self { window, policy }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Raw labels before the policy is applied.
    pub fn raw(&self, series: &Series) -> Result<Vec<TrendLabel>, FeatureError> {
        let n = series.len();
        let mut labels = vec![TrendLabel::Unlabeled; n];
        for i in 1..n.saturating_sub(self.window) {
            let now = series.close(i)?;
            let ahead = series.close(i + self.window)?;
            labels[i] = if ahead - now >= 0.0 {
                TrendLabel::Up
            } else {
                TrendLabel::Down
            };
        }
        Ok(labels)
    }

    /// Labels with the configured policy applied.
    pub fn generate(&self, series: &Series) -> Result<Vec<TrendLabel>, FeatureError> {
        let mut labels = self.raw(series)?;
        if self.policy == LabelPolicy::CollapseToPositive {
            for label in labels.iter_mut().filter(|l| !l.is_labeled()) {
                *label = TrendLabel::Up;
            }
        }
        Ok(labels)
    }
}
