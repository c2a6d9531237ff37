//! Feature assembly.
//!
//! The engine turns one [`Series`] into a [`FeatureFrame`]: every indicator is
//! computed once over the whole series (in parallel, each with shared
//! read-only access), checked for length, materialized to the sentinel form,
//! and joined with the trend label. The engine holds only its configuration,
//! so a single instance can serve many series concurrently.

use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::config::FeatureConfig;
use crate::domain::Series;
use crate::error::FeatureError;
use crate::frame::{Column, FeatureFrame};
use crate::indicators::{
    materialize, Atr, Disparity, Indicator, Macd, Momentum, Obv, Roc, Rsi, StochasticD,
    StochasticK, Volatility, WilliamsR,
};
use crate::label::LabelGenerator;

#[derive(Debug, Clone, Default)]
pub struct FeatureEngine {
    config: FeatureConfig,
}

impl FeatureEngine {
    pub fn new(config: FeatureConfig) -> Result<Self, FeatureError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// The indicator set, in frame column order.
    pub fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        let c = &self.config;
        let k = &c.constants;
        vec![
            Box::new(StochasticK::new(c.lookback)),
            Box::new(StochasticD::new(c.lookback)),
            Box::new(WilliamsR::new(c.lookback)),
            Box::new(Momentum::new(c.lookback)),
            Box::new(Roc::new(c.lookback, c.roc_scale)),
            Box::new(Rsi::new(c.lookback)),
            Box::new(Atr::new(k.atr_span)),
            Box::new(Volatility::new(c.lookback)),
            Box::new(Disparity::new(c.lookback, k.disparity_window)),
            Box::new(Macd::new(k.macd_fast, k.macd_slow, c.macd_seed)),
            Box::new(Obv::new()),
        ]
    }

    /// Longest warm-up across the indicator set.
    pub fn warmup(&self) -> usize {
        compute_warmup(&self.indicators())
    }

    /// Engineer the full feature frame for `series`.
    pub fn run(&self, series: &Series) -> Result<FeatureFrame, FeatureError> {
        let n = series.len();
        let span = info_span!("engineer", symbol = series.symbol().unwrap_or("-"), bars = n);
        let _guard = span.enter();

        self.config.validate_for_len(n)?;

        let indicators = self.indicators();
        let computed = indicators
            .par_iter()
            .map(|indicator| indicator.compute(series).map(|values| (indicator, values)))
            .collect::<Result<Vec<_>, FeatureError>>()?;

        let mut columns = Vec::with_capacity(computed.len());
        for (indicator, values) in computed {
            if values.len() != n {
                return Err(FeatureError::LengthMismatch {
                    column: indicator.name().to_string(),
                    expected: n,
                    actual: values.len(),
                });
            }
            let defined = values.iter().filter(|v| v.is_some()).count();
            debug!(
                indicator = indicator.name(),
                lookback = indicator.lookback(),
                defined,
                "indicator computed"
            );
            columns.push(Column::new(indicator.name(), materialize(indicator.name(), &values)));
        }

        let labels = LabelGenerator::new(self.config.window, self.config.label_policy)
            .generate(series)?;

        let frame = FeatureFrame::from_parts(
            series.symbol().map(str::to_string),
            series.dates().to_vec(),
            columns,
            labels,
        )?;

        let balance = frame.label_balance();
        info!(
            columns = frame.columns().len(),
            up = balance.up,
            down = balance.down,
            unlabeled = balance.unlabeled,
            "feature frame assembled"
        );
        Ok(frame)
    }
}

/// Engineer features with default constants and the given `lookback` and
/// label `window`.
pub fn engineer_features(
    series: &Series,
    lookback: usize,
    window: usize,
) -> Result<FeatureFrame, FeatureError> {
    FeatureEngine::new(FeatureConfig::new(lookback, window))?.run(series)
}

/// Maximum lookback across a set of indicators.
pub fn compute_warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}
