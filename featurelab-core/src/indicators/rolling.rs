//! Sliding-window kernels shared by the windowed indicators.
//!
//! Both kernels are O(1) amortized per bar, so every windowed indicator is a
//! single O(N) pass regardless of `lookback`.

use std::collections::VecDeque;

/// Fixed-length running sum over the most recent `period` pushes.
///
/// Missing values (`None`) poison the sum while they are inside the window.
/// When every value in the window is zero the sum is reset to exactly `0.0`,
/// so an all-zero window (for example a run with no losses) never becomes a
/// tiny non-zero divisor. The sum is also recomputed from the window every
/// `period` pushes, which bounds add/subtract drift to one window's worth.
#[derive(Debug, Clone)]
pub struct RollingSum {
    period: usize,
    window: VecDeque<Option<f64>>,
    sum: f64,
    nonzero: usize,
    missing: usize,
    since_rebase: usize,
}

impl RollingSum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "rolling period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
            nonzero: 0,
            missing: 0,
            since_rebase: 0,
        }
    }

    /// Push the next value, evicting the oldest once the window is full.
    pub fn push(&mut self, value: Option<f64>) {
        self.admit(value);
        self.window.push_back(value);
        if self.window.len() > self.period {
            if let Some(old) = self.window.pop_front() {
                self.evict(old);
            }
        }
        self.since_rebase += 1;
        if self.nonzero == 0 {
            self.sum = 0.0;
        } else if self.since_rebase >= self.period {
            self.sum = self.window.iter().flatten().sum();
            self.since_rebase = 0;
        }
    }

    fn admit(&mut self, value: Option<f64>) {
        match value {
            Some(v) => {
                self.sum += v;
                if v != 0.0 {
                    self.nonzero += 1;
                }
            }
            None => self.missing += 1,
        }
    }

    fn evict(&mut self, value: Option<f64>) {
        match value {
            Some(v) => {
                self.sum -= v;
                if v != 0.0 {
                    self.nonzero -= 1;
                }
            }
            None => self.missing -= 1,
        }
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.period
    }

    /// Sum of the window, or `None` while it is short or holds a missing value.
    pub fn sum(&self) -> Option<f64> {
        (self.is_full() && self.missing == 0).then_some(self.sum)
    }

    /// Mean of the window under the same conditions as [`RollingSum::sum`].
    pub fn mean(&self) -> Option<f64> {
        self.sum().map(|s| s / self.period as f64)
    }
}

/// Min and max of the `period` values strictly before each index.
///
/// Entry `i` covers `values[i - period .. i]` and is `None` for `i < period`.
/// Uses a pair of monotonic deques of indices: front of `max_q` is the
/// window maximum, front of `min_q` the minimum.
pub fn prior_extremes(values: &[f64], period: usize) -> Vec<Option<(f64, f64)>> {
    assert!(period >= 1, "extremes period must be >= 1");
    let n = values.len();
    let mut out = vec![None; n];
    let mut max_q: VecDeque<usize> = VecDeque::with_capacity(period);
    let mut min_q: VecDeque<usize> = VecDeque::with_capacity(period);

    for i in 0..n {
        if i >= period {
            if let (Some(&lo), Some(&hi)) = (min_q.front(), max_q.front()) {
                out[i] = Some((values[lo], values[hi]));
            }
        }

        // Admit values[i] for the windows that start after it.
        let v = values[i];
        while max_q.back().is_some_and(|&j| values[j] <= v) {
            max_q.pop_back();
        }
        max_q.push_back(i);
        while min_q.back().is_some_and(|&j| values[j] >= v) {
            min_q.pop_back();
        }
        min_q.push_back(i);

        // Next window is [i + 1 - period, i + 1).
        let start = (i + 1).saturating_sub(period);
        while max_q.front().is_some_and(|&j| j < start) {
            max_q.pop_front();
        }
        while min_q.front().is_some_and(|&j| j < start) {
            min_q.pop_front();
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_sum_fills_then_slides() {
        let mut rs = RollingSum::new(3);
        rs.push(Some(1.0));
        rs.push(Some(2.0));
        assert_eq!(rs.sum(), None);
        rs.push(Some(3.0));
        assert_eq!(rs.sum(), Some(6.0));
        assert_eq!(rs.mean(), Some(2.0));
        rs.push(Some(4.0));
        assert_eq!(rs.sum(), Some(9.0));
    }

    #[test]
    fn rolling_sum_missing_value_poisons_window() {
        let mut rs = RollingSum::new(2);
        rs.push(Some(1.0));
        rs.push(None);
        assert_eq!(rs.sum(), None);
        rs.push(Some(5.0));
        assert_eq!(rs.sum(), None);
        rs.push(Some(6.0));
        assert_eq!(rs.sum(), Some(11.0));
    }

    #[test]
    fn rolling_sum_all_zero_window_is_exact_zero() {
        let mut rs = RollingSum::new(2);
        rs.push(Some(0.1));
        rs.push(Some(0.2));
        rs.push(Some(0.0));
        rs.push(Some(0.0));
        assert_eq!(rs.sum(), Some(0.0));
    }

    #[test]
    fn rolling_sum_recovers_after_large_value_leaves() {
        // 1e16 + 1.0 loses the 1.0; the periodic re-sum restores it.
        let mut rs = RollingSum::new(2);
        rs.push(Some(1e16));
        rs.push(Some(1.0));
        rs.push(Some(1.0));
        rs.push(Some(1.0));
        assert_eq!(rs.sum(), Some(2.0));
    }

    #[test]
    fn rolling_sum_tracks_naive_sum() {
        let values: Vec<f64> = (0..5_000)
            .map(|i| ((i * 7919 % 1_000) as f64) * 0.123_456_789 - 61.7)
            .collect();
        let period = 14;
        let mut rs = RollingSum::new(period);
        for (i, &v) in values.iter().enumerate() {
            rs.push(Some(v));
            if i + 1 >= period {
                let naive: f64 = values[i + 1 - period..=i].iter().sum();
                let got = rs.sum().unwrap();
                assert!((got - naive).abs() < 1e-9, "i={i}: {got} vs {naive}");
            }
        }
    }

    #[test]
    fn prior_extremes_exclude_current_bar() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let ext = prior_extremes(&values, 3);
        assert_eq!(ext[0], None);
        assert_eq!(ext[2], None);
        assert_eq!(ext[3], Some((1.0, 4.0))); // [3, 1, 4]
        assert_eq!(ext[4], Some((1.0, 4.0))); // [1, 4, 1]
        assert_eq!(ext[5], Some((1.0, 5.0))); // [4, 1, 5]
        assert_eq!(ext[6], Some((1.0, 9.0))); // [1, 5, 9]
        assert_eq!(ext[7], Some((2.0, 9.0))); // [5, 9, 2]
    }

    #[test]
    fn prior_extremes_match_naive_scan() {
        let values: Vec<f64> = (0..60)
            .map(|i| ((i * 37 % 23) as f64) - 11.0)
            .collect();
        for period in 1..8 {
            let ext = prior_extremes(&values, period);
            for i in period..values.len() {
                let window = &values[i - period..i];
                let lo = window.iter().cloned().fold(f64::INFINITY, f64::min);
                let hi = window.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                assert_eq!(ext[i], Some((lo, hi)), "period={period} i={i}");
            }
        }
    }
}
