//! FeatureLab CLI: engineer, batch, and synth commands.
//!
//! Commands:
//! - `engineer`: build the feature frame for one OHLCV CSV (optionally joined
//!   with an index CSV) and write it as CSV or JSON
//! - `batch`: run a TOML job over many tickers in parallel
//! - `synth`: write a deterministic synthetic OHLCV CSV for development

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{prelude::*, EnvFilter};

use featurelab_core::indicators::{MacdSeed, RocScale};
use featurelab_core::{FeatureConfig, FeatureEngine, FeatureFrame, LabelPolicy};
use featurelab_runner::data_loader::{seed_from_symbol, symbol_from_path};
use featurelab_runner::{
    finish_frame, frame_to_csv, generate_synthetic_series, load_csv, run_batch, write_frame,
    write_series, ExportFormat, JobConfig, MergeOptions,
};

#[derive(Parser)]
#[command(
    name = "featurelab",
    version,
    about = "FeatureLab CLI: technical-indicator features and trend labels from daily OHLCV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Engineer the feature frame for a single OHLCV CSV.
    Engineer {
        /// Input CSV (Date,Open,High,Low,Close,Adj Close,Volume).
        #[arg(long)]
        input: PathBuf,

        /// Symbol. Defaults to the input file stem.
        #[arg(long)]
        symbol: Option<String>,

        /// Output file (.csv or .json). Writes CSV to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Feature settings TOML; flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Trailing window in bars.
        #[arg(long)]
        lookback: Option<usize>,

        /// Label horizon in bars.
        #[arg(long)]
        window: Option<usize>,

        #[arg(long, value_enum)]
        macd_seed: Option<MacdSeedArg>,

        #[arg(long, value_enum)]
        label_policy: Option<LabelPolicyArg>,

        /// Report ROC in percent instead of as a ratio.
        #[arg(long, default_value_t = false)]
        roc_percent: bool,

        /// Market-index CSV to join by date (index columns get `_x`, the
        /// input's `_y`).
        #[arg(long)]
        index: Option<PathBuf>,

        /// Drop rows without a forward label.
        #[arg(long, default_value_t = false)]
        drop_unlabeled: bool,
    },
    /// Run a batch job from a TOML config file.
    Batch {
        /// Path to the job TOML.
        #[arg(long)]
        config: PathBuf,

        /// Override the job's output directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write a synthetic OHLCV CSV.
    Synth {
        #[arg(long, default_value = "SYN")]
        symbol: String,

        /// Number of trading days.
        #[arg(long, default_value_t = 756)]
        bars: usize,

        /// First date (YYYY-MM-DD).
        #[arg(long, default_value = "2011-01-03")]
        start: String,

        /// RNG seed. Defaults to a hash of the symbol.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MacdSeedArg {
    Canonical,
    Legacy,
}

#[derive(Clone, Copy, ValueEnum)]
enum LabelPolicyArg {
    Collapse,
    Ternary,
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so CSV on stdout stays clean.
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "featurelab starting");

    match cli.command {
        Commands::Engineer {
            input,
            symbol,
            output,
            config,
            lookback,
            window,
            macd_seed,
            label_policy,
            roc_percent,
            index,
            drop_unlabeled,
        } => {
            let features = build_feature_config(
                config.as_deref(),
                lookback,
                window,
                macd_seed,
                label_policy,
                roc_percent,
            )?;
            let opts = MergeOptions {
                drop_unlabeled,
                drop_columns: Vec::new(),
            };
            run_engineer(&input, symbol, output.as_deref(), features, index.as_deref(), &opts)
        }
        Commands::Batch { config, output_dir } => run_batch_cmd(&config, output_dir),
        Commands::Synth {
            symbol,
            bars,
            start,
            seed,
            output,
        } => run_synth(&symbol, bars, &start, seed, &output),
    }
}

fn build_feature_config(
    path: Option<&Path>,
    lookback: Option<usize>,
    window: Option<usize>,
    macd_seed: Option<MacdSeedArg>,
    label_policy: Option<LabelPolicyArg>,
    roc_percent: bool,
) -> Result<FeatureConfig> {
    let mut config = match path {
        Some(path) => FeatureConfig::from_file(path)?,
        None => FeatureConfig::default(),
    };
    if let Some(lookback) = lookback {
        config.lookback = lookback;
    }
    if let Some(window) = window {
        config.window = window;
    }
    if let Some(seed) = macd_seed {
        config.macd_seed = match seed {
            MacdSeedArg::Canonical => MacdSeed::Canonical,
            MacdSeedArg::Legacy => MacdSeed::Legacy,
        };
    }
    if let Some(policy) = label_policy {
        config.label_policy = match policy {
            LabelPolicyArg::Collapse => LabelPolicy::CollapseToPositive,
            LabelPolicyArg::Ternary => LabelPolicy::Ternary,
        };
    }
    if roc_percent {
        config.roc_scale = RocScale::Percent;
    }
    config.validate()?;
    Ok(config)
}

fn run_engineer(
    input: &Path,
    symbol: Option<String>,
    output: Option<&Path>,
    features: FeatureConfig,
    index: Option<&Path>,
    opts: &MergeOptions,
) -> Result<()> {
    let symbol = symbol.unwrap_or_else(|| symbol_from_path(input));
    let engine = FeatureEngine::new(features)?;

    let series = load_csv(input, &symbol)?;
    let frame = engine
        .run(&series)
        .with_context(|| format!("failed to engineer {symbol}"))?;

    let index_frame = match index {
        Some(index_path) => {
            let index_symbol = symbol_from_path(index_path);
            let index_series = load_csv(index_path, &index_symbol)?;
            let index_frame = engine
                .run(&index_series)
                .with_context(|| format!("failed to engineer index {index_symbol}"))?;
            Some(index_frame)
        }
        None => None,
    };
    let frame = finish_frame(frame, index_frame.as_ref(), opts)?;

    match output {
        Some(path) => {
            let format = ExportFormat::from_path(path)
                .ok_or_else(|| anyhow!("unsupported output extension: {}", path.display()))?;
            write_frame(&frame, path, format)?;
            print_summary(&frame);
            eprintln!("Features saved to: {}", path.display());
        }
        None => {
            let csv = frame_to_csv(&frame)?;
            std::io::stdout()
                .lock()
                .write_all(csv.as_bytes())
                .context("failed to write CSV to stdout")?;
        }
    }
    Ok(())
}

fn run_batch_cmd(config_path: &Path, output_dir: Option<PathBuf>) -> Result<()> {
    let mut config = JobConfig::from_file(config_path)?;
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    let report = run_batch(&config)?;

    println!(
        "{:<10} {:>6} {:>8} {:>6} {:>6} {:>9}  FINGERPRINT",
        "SYMBOL", "ROWS", "COLUMNS", "UP", "DOWN", "SOURCE"
    );
    for outcome in &report.succeeded {
        println!(
            "{:<10} {:>6} {:>8} {:>6} {:>6} {:>9}  {}",
            outcome.symbol,
            outcome.rows,
            outcome.columns,
            outcome.balance.up,
            outcome.balance.down,
            format!("{:?}", outcome.source),
            &outcome.fingerprint[..16],
        );
    }
    for failure in &report.failed {
        eprintln!("Error for {}: {}", failure.symbol, failure.error);
    }

    if !report.is_complete() {
        bail!(
            "{} of {} tickers failed",
            report.failed.len(),
            report.failed.len() + report.succeeded.len()
        );
    }
    Ok(())
}

fn run_synth(
    symbol: &str,
    bars: usize,
    start: &str,
    seed: Option<u64>,
    output: &Path,
) -> Result<()> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("invalid --start date '{start}'"))?;
    let seed = seed.unwrap_or_else(|| seed_from_symbol(symbol));
    let series = generate_synthetic_series(symbol, start, bars, seed)?;
    write_series(&series, output)?;
    println!(
        "Wrote {} synthetic bars for {symbol} (seed {seed}) to {}",
        series.len(),
        output.display()
    );
    Ok(())
}

fn print_summary(frame: &FeatureFrame) {
    let balance = frame.label_balance();
    eprintln!("Symbol:      {}", frame.symbol().unwrap_or("-"));
    eprintln!("Rows:        {}", frame.len());
    eprintln!("Columns:     {}", frame.columns().len());
    eprintln!(
        "Labels:      up={} down={} unlabeled={}",
        balance.up, balance.down, balance.unlabeled
    );
    eprintln!("Fingerprint: {}", frame.fingerprint());
}
