//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Every column has one finite value per input bar
//! 2. Warm-up positions hold the 0.0 sentinel
//! 3. OBV is monotonic under monotonic closes, constant under constant closes
//! 4. Upward drift labels every comparable bar Up
//! 5. RSI stays within [0, 100]
//! 6. Identical inputs produce bit-identical frames

use chrono::NaiveDate;
use featurelab_core::indicators::names;
use featurelab_core::{
    FeatureConfig, FeatureEngine, LabelPolicy, PriceBar, Series, TrendLabel,
};
use proptest::prelude::*;

fn series_from(closes: &[f64], volumes: &[f64]) -> Series {
    let base_date = NaiveDate::from_ymd_opt(2019, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar::new(
                base_date + chrono::Duration::days(i as i64),
                open,
                open.max(close) * 1.01,
                open.min(close) * 0.99,
                close,
                volumes[i % volumes.len()],
            )
        })
        .collect();
    Series::new(bars).unwrap()
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, 2..120)
}

fn arb_volumes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0.0..1e6_f64).prop_map(f64::round), 1..10)
}

/// Parameters strictly below the series length.
fn params_for(n: usize, lookback_seed: usize, window_seed: usize) -> (usize, usize) {
    (1 + lookback_seed % (n - 1), 1 + window_seed % (n - 1))
}

// ── 1. Shape and finiteness ──────────────────────────────────────────

proptest! {
    #[test]
    fn columns_match_series_length(
        closes in arb_closes(),
        volumes in arb_volumes(),
        lookback_seed in 0usize..64,
        window_seed in 0usize..64,
    ) {
        let n = closes.len();
        let (lookback, window) = params_for(n, lookback_seed, window_seed);
        let series = series_from(&closes, &volumes);
        let frame = FeatureEngine::new(FeatureConfig::new(lookback, window))
            .unwrap()
            .run(&series)
            .unwrap();

        prop_assert_eq!(frame.len(), n);
        prop_assert_eq!(frame.labels().len(), n);
        prop_assert_eq!(frame.column_names(), names::INDICATORS.to_vec());
        for column in frame.columns() {
            prop_assert_eq!(column.values.len(), n);
            prop_assert!(column.values.iter().all(|v| v.is_finite()), "{}", column.name);
        }
    }

    // ── 2. Warm-up sentinel ──────────────────────────────────────────

    #[test]
    fn warm_up_positions_are_zero(
        closes in arb_closes(),
        volumes in arb_volumes(),
        lookback_seed in 0usize..64,
        window_seed in 0usize..64,
    ) {
        let n = closes.len();
        let (lookback, window) = params_for(n, lookback_seed, window_seed);
        let engine = FeatureEngine::new(FeatureConfig::new(lookback, window)).unwrap();
        let frame = engine.run(&series_from(&closes, &volumes)).unwrap();

        for indicator in engine.indicators() {
            let values = frame.column(indicator.name()).unwrap();
            let warm_up = indicator.lookback().min(n);
            prop_assert!(
                values[..warm_up].iter().all(|v| *v == 0.0),
                "{} has a value inside its warm-up",
                indicator.name()
            );
        }
    }

    // ── 3. OBV ───────────────────────────────────────────────────────

    #[test]
    fn obv_monotonic_under_rising_closes(
        steps in prop::collection::vec(0.0..5.0_f64, 2..80),
        volumes in arb_volumes(),
    ) {
        let closes: Vec<f64> = steps
            .iter()
            .scan(50.0, |price, step| {
                *price += step;
                Some(*price)
            })
            .collect();
        let frame = FeatureEngine::new(FeatureConfig::new(1, 1))
            .unwrap()
            .run(&series_from(&closes, &volumes))
            .unwrap();
        let obv = frame.column(names::OBV).unwrap();
        prop_assert!(obv.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn obv_monotonic_under_falling_closes(
        steps in prop::collection::vec(0.0..5.0_f64, 2..80),
        volumes in arb_volumes(),
    ) {
        let closes: Vec<f64> = steps
            .iter()
            .scan(500.0, |price, step| {
                *price -= step;
                Some(*price)
            })
            .collect();
        let frame = FeatureEngine::new(FeatureConfig::new(1, 1))
            .unwrap()
            .run(&series_from(&closes, &volumes))
            .unwrap();
        let obv = frame.column(names::OBV).unwrap();
        prop_assert!(obv.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn obv_constant_under_flat_closes(
        n in 2usize..80,
        price in 1.0..500.0_f64,
        volumes in arb_volumes(),
    ) {
        let closes = vec![price; n];
        let frame = FeatureEngine::new(FeatureConfig::new(1, 1))
            .unwrap()
            .run(&series_from(&closes, &volumes))
            .unwrap();
        let obv = frame.column(names::OBV).unwrap();
        prop_assert!(obv.iter().all(|v| *v == volumes[0]));
    }

    // ── 4. Labels ────────────────────────────────────────────────────

    #[test]
    fn upward_drift_labels_up(
        steps in prop::collection::vec(0.01..5.0_f64, 2..80),
        window_seed in 0usize..64,
    ) {
        let closes: Vec<f64> = steps
            .iter()
            .scan(50.0, |price, step| {
                *price += step;
                Some(*price)
            })
            .collect();
        let n = closes.len();
        let (_, window) = params_for(n, 0, window_seed);
        let series = series_from(&closes, &[1_000.0]);

        let frame = FeatureEngine::new(FeatureConfig::new(1, window))
            .unwrap()
            .run(&series)
            .unwrap();
        prop_assert!(frame.labels().iter().all(|l| *l == TrendLabel::Up));

        let mut config = FeatureConfig::new(1, window);
        config.label_policy = LabelPolicy::Ternary;
        let frame = FeatureEngine::new(config).unwrap().run(&series).unwrap();
        for (i, label) in frame.labels().iter().enumerate() {
            let expected = if i >= 1 && i + window < n {
                TrendLabel::Up
            } else {
                TrendLabel::Unlabeled
            };
            prop_assert_eq!(*label, expected);
        }
    }

    // ── 5. RSI range ─────────────────────────────────────────────────

    #[test]
    fn rsi_within_bounds(
        closes in arb_closes(),
        lookback_seed in 0usize..64,
    ) {
        let n = closes.len();
        let (lookback, _) = params_for(n, lookback_seed, 0);
        let frame = FeatureEngine::new(FeatureConfig::new(lookback, 1))
            .unwrap()
            .run(&series_from(&closes, &[1.0]))
            .unwrap();
        let rsi = frame.column(names::RSI).unwrap();
        prop_assert!(rsi.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    // ── 6. Determinism ───────────────────────────────────────────────

    #[test]
    fn runs_are_deterministic(
        closes in arb_closes(),
        volumes in arb_volumes(),
    ) {
        let n = closes.len();
        let (lookback, window) = params_for(n, 5, 20);
        let series = series_from(&closes, &volumes);
        let engine = FeatureEngine::new(FeatureConfig::new(lookback, window)).unwrap();
        let a = engine.run(&series).unwrap();
        let b = engine.run(&series).unwrap();
        prop_assert_eq!(a.fingerprint(), b.fingerprint());
        prop_assert_eq!(a, b);
    }
}
