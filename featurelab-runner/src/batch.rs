//! Batch runner: engineers many tickers in parallel.
//!
//! Each ticker is loaded, engineered, optionally joined with the index
//! frame, and written to `{output_dir}/{symbol}.{ext}`. Tickers are
//! independent; a failure in one is recorded and does not stop the others.
//! The index ticker is engineered first and must succeed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, info_span, warn};

use featurelab_core::frame::LabelBalance;
use featurelab_core::{FeatureEngine, FeatureError, FeatureFrame};

use crate::config::{JobConfig, TickerSpec};
use crate::data_loader::{load_series, DataSource, LoadError};
use crate::export::write_frame;
use crate::merge::{merge_with_index, MergeOptions};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("feature engineering failed for '{symbol}': {source}")]
    Feature {
        symbol: String,
        #[source]
        source: FeatureError,
    },
}

/// A ticker's engineered frame before it is written out.
#[derive(Debug, Clone)]
pub struct EngineeredTicker {
    pub symbol: String,
    pub source: DataSource,
    pub frame: FeatureFrame,
}

/// Summary of one written ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerOutcome {
    pub symbol: String,
    pub source: DataSource,
    pub rows: usize,
    pub columns: usize,
    pub balance: LabelBalance,
    pub fingerprint: String,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerFailure {
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub succeeded: Vec<TickerOutcome>,
    pub failed: Vec<TickerFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Load and engineer a single ticker.
pub fn engineer_ticker(
    config: &JobConfig,
    engine: &FeatureEngine,
    ticker: &TickerSpec,
) -> Result<EngineeredTicker, BatchError> {
    let path = config.csv_path(ticker);
    let loaded = load_series(&ticker.symbol, path.as_deref(), &config.synthetic)?;
    let frame = engine
        .run(&loaded.series)
        .map_err(|source| BatchError::Feature {
            symbol: ticker.symbol.clone(),
            source,
        })?;
    Ok(EngineeredTicker {
        symbol: ticker.symbol.clone(),
        source: loaded.source,
        frame,
    })
}

/// Engineer every configured ticker in parallel, in config order.
pub fn engineer_all(
    config: &JobConfig,
    engine: &FeatureEngine,
) -> Vec<(String, Result<EngineeredTicker, BatchError>)> {
    config
        .tickers
        .par_iter()
        .map(|ticker| {
            let span = info_span!("ticker", symbol = %ticker.symbol);
            let _guard = span.enter();
            (ticker.symbol.clone(), engineer_ticker(config, engine, ticker))
        })
        .collect()
}

/// Post-process a ticker frame: index join (when an index frame is given)
/// or the standalone drop options.
pub fn finish_frame(
    frame: FeatureFrame,
    index: Option<&FeatureFrame>,
    opts: &MergeOptions,
) -> Result<FeatureFrame, FeatureError> {
    if let Some(index) = index {
        return merge_with_index(index, &frame, opts);
    }
    let mut frame = frame;
    for name in &opts.drop_columns {
        frame.drop_column(name)?;
    }
    if opts.drop_unlabeled {
        frame = frame.labeled_only();
    }
    Ok(frame)
}

/// Run a whole batch job and write its outputs.
pub fn run_batch(config: &JobConfig) -> Result<BatchReport> {
    config.validate().context("invalid job config")?;
    let engine = FeatureEngine::new(config.features).context("invalid feature settings")?;

    let index_frame = match &config.index {
        Some(index) => {
            let engineered = engineer_ticker(config, &engine, index)
                .with_context(|| format!("failed to engineer index '{}'", index.symbol))?;
            info!(symbol = %index.symbol, rows = engineered.frame.len(), "index engineered");
            Some(engineered.frame)
        }
        None => None,
    };

    let merge_opts = config.merge_options();
    let mut report = BatchReport::default();

    for (symbol, result) in engineer_all(config, &engine) {
        let outcome = result
            .map_err(anyhow::Error::from)
            .and_then(|engineered| write_ticker(config, engineered, index_frame.as_ref(), &merge_opts));
        match outcome {
            Ok(outcome) => report.succeeded.push(outcome),
            Err(err) => {
                warn!(symbol = %symbol, error = %format!("{err:#}"), "ticker failed");
                report.failed.push(TickerFailure {
                    symbol,
                    error: format!("{err:#}"),
                });
            }
        }
    }

    info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        output_dir = %config.output_dir.display(),
        "batch complete"
    );
    Ok(report)
}

fn write_ticker(
    config: &JobConfig,
    engineered: EngineeredTicker,
    index: Option<&FeatureFrame>,
    opts: &MergeOptions,
) -> Result<TickerOutcome> {
    let EngineeredTicker {
        symbol,
        source,
        frame,
    } = engineered;
    let frame = finish_frame(frame, index, opts)
        .with_context(|| format!("failed to post-process '{symbol}'"))?;

    let mut files = Vec::with_capacity(config.formats.len());
    for &format in &config.formats {
        let path = config
            .output_dir
            .join(format!("{symbol}.{}", format.extension()));
        write_frame(&frame, &path, format)?;
        files.push(path);
    }

    Ok(TickerOutcome {
        symbol,
        source,
        rows: frame.len(),
        columns: frame.columns().len(),
        balance: frame.label_balance(),
        fingerprint: frame.fingerprint(),
        files,
    })
}
