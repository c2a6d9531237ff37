//! Series loading for the runner.
//!
//! Reads daily OHLCV CSV files in the market-data provider's layout
//! (`Date,Open,High,Low,Close,Adj Close,Volume`, `Adj Close` optional and
//! ignored) and implements the fallback policy:
//! 1. If a CSV file exists for the ticker → load it
//! 2. If not and synthetic data is enabled → generate a synthetic series
//! 3. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only mode. Frames built from it are tagged
//! via [`DataSource::Synthetic`].

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use featurelab_core::{FeatureError, PriceBar, Series};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data file for '{symbol}' (looked for {path:?}) and synthetic data is disabled")]
    NotFound {
        symbol: String,
        path: Option<PathBuf>,
    },

    #[error("open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid series for '{symbol}': {source}")]
    Series {
        symbol: String,
        #[source]
        source: FeatureError,
    },
}

/// Where a loaded series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// Settings for the synthetic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticOptions {
    pub enabled: bool,
    /// Number of trading days to generate.
    pub bars: usize,
    pub start: NaiveDate,
    /// Fixed seed; when absent the seed is derived from the symbol.
    pub seed: Option<u64>,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            bars: 756,
            start: NaiveDate::from_ymd_opt(2011, 1, 3).unwrap_or_default(),
            seed: None,
        }
    }
}

/// A series together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: Series,
    pub source: DataSource,
}

/// One CSV row. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvBar {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Adj Close", default)]
    _adj_close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: f64,
}

/// Parse OHLCV CSV from any reader.
pub fn read_csv<R: Read>(reader: R, symbol: &str) -> Result<Series, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for row in rdr.deserialize() {
        let row: CsvBar = row?;
        bars.push(PriceBar::new(
            row.date, row.open, row.high, row.low, row.close, row.volume,
        ));
    }

    let insane = bars.iter().filter(|b| !b.is_sane()).count();
    if insane > 0 {
        warn!(symbol, bars = insane, "bars with inconsistent high/low bounds");
    }

    Series::new(bars)
        .map(|s| s.with_symbol(symbol))
        .map_err(|source| LoadError::Series {
            symbol: symbol.to_string(),
            source,
        })
}

/// Load a ticker's CSV file.
pub fn load_csv(path: &Path, symbol: &str) -> Result<Series, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_csv(file, symbol)?;
    debug!(symbol, bars = series.len(), path = %path.display(), "loaded CSV");
    Ok(series)
}

/// Symbol implied by a file name (`data/AAPL.csv` → `AAPL`).
pub fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

/// Load a ticker, falling back to synthetic data when allowed.
pub fn load_series(
    symbol: &str,
    path: Option<&Path>,
    synthetic: &SyntheticOptions,
) -> Result<LoadedSeries, LoadError> {
    if let Some(path) = path.filter(|p| p.exists()) {
        return Ok(LoadedSeries {
            series: load_csv(path, symbol)?,
            source: DataSource::Csv,
        });
    }

    if synthetic.enabled {
        warn!(symbol, "generating synthetic data; frame will be tagged as synthetic");
        let seed = synthetic.seed.unwrap_or_else(|| seed_from_symbol(symbol));
        let series = generate_synthetic_series(symbol, synthetic.start, synthetic.bars, seed)
            .map_err(|source| LoadError::Series {
                symbol: symbol.to_string(),
                source,
            })?;
        return Ok(LoadedSeries {
            series,
            source: DataSource::Synthetic,
        });
    }

    Err(LoadError::NotFound {
        symbol: symbol.to_string(),
        path: path.map(Path::to_path_buf),
    })
}

/// Deterministic seed from the symbol name.
pub fn seed_from_symbol(symbol: &str) -> u64 {
    let hash = blake3::hash(symbol.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Generate a synthetic daily series for testing/development.
///
/// A random walk from 100.0 over weekdays starting at `start`. The same
/// `seed` always yields the same series.
pub fn generate_synthetic_series(
    symbol: &str,
    start: NaiveDate,
    bars: usize,
    seed: u64,
) -> Result<Series, FeatureError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(bars);
    let mut price = 100.0_f64;
    let mut current = start;

    while out.len() < bars {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        out.push(PriceBar::new(current, open, high, low, close, volume));

        price = close;
        current += chrono::Duration::days(1);
    }

    Ok(Series::new(out)?.with_symbol(symbol))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2019-01-02,154.89,158.85,154.23,157.92,153.22,37039700
2019-01-03,143.98,145.72,142.00,142.19,137.96,91312200
2019-01-04,144.53,148.55,143.80,148.26,143.85,58607100
";

    #[test]
    fn read_csv_parses_provider_layout() {
        let series = read_csv(SAMPLE.as_bytes(), "AAPL").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.symbol(), Some("AAPL"));
        assert_eq!(series.close(1).unwrap(), 142.19);
        assert_eq!(series.volume(2).unwrap(), 58_607_100.0);
        assert_eq!(
            series.date(0).unwrap(),
            NaiveDate::from_ymd_opt(2019, 1, 2).unwrap()
        );
    }

    #[test]
    fn read_csv_without_adj_close() {
        let csv = "Date,Open,High,Low,Close,Volume\n2019-01-02,1,2,0.5,1.5,10\n";
        let series = read_csv(csv.as_bytes(), "X").unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.high(0).unwrap(), 2.0);
    }

    #[test]
    fn read_csv_rejects_unordered_dates() {
        let csv = "Date,Open,High,Low,Close,Volume\n\
                   2019-01-03,1,2,0.5,1.5,10\n\
                   2019-01-02,1,2,0.5,1.5,10\n";
        let err = read_csv(csv.as_bytes(), "X").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Series {
                source: FeatureError::UnorderedDates { index: 1 },
                ..
            }
        ));
    }

    #[test]
    fn read_csv_rejects_empty_file() {
        let csv = "Date,Open,High,Low,Close,Volume\n";
        let err = read_csv(csv.as_bytes(), "X").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Series {
                source: FeatureError::EmptySeries,
                ..
            }
        ));
    }

    #[test]
    fn read_csv_rejects_bad_number() {
        let csv = "Date,Open,High,Low,Close,Volume\n2019-01-02,1,2,0.5,abc,10\n";
        assert!(matches!(
            read_csv(csv.as_bytes(), "X"),
            Err(LoadError::Csv(_))
        ));
    }

    #[test]
    fn synthetic_is_deterministic_and_skips_weekends() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(); // Friday
        let a = generate_synthetic_series("SPY", start, 30, 7).unwrap();
        let b = generate_synthetic_series("SPY", start, 30, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 30);
        assert!(a.dates().iter().all(|d| d.weekday().number_from_monday() <= 5));
        assert_eq!(a.date(1).unwrap(), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        for i in 0..a.len() {
            assert!(a.bar(i).unwrap().is_sane());
        }

        let c = generate_synthetic_series("SPY", start, 30, 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn synthetic_zero_bars_is_empty_series_error() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            generate_synthetic_series("X", start, 0, 1),
            Err(FeatureError::EmptySeries)
        );
    }

    #[test]
    fn load_series_missing_file_without_synthetic_fails() {
        let err = load_series(
            "NOPE",
            Some(Path::new("/definitely/not/here.csv")),
            &SyntheticOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::NotFound { ref symbol, .. } if symbol == "NOPE"));
    }

    #[test]
    fn load_series_falls_back_to_synthetic() {
        let opts = SyntheticOptions {
            enabled: true,
            bars: 50,
            ..SyntheticOptions::default()
        };
        let loaded = load_series("QQQ", None, &opts).unwrap();
        assert_eq!(loaded.source, DataSource::Synthetic);
        assert_eq!(loaded.series.len(), 50);
        assert_eq!(loaded.series.symbol(), Some("QQQ"));

        let again = load_series("QQQ", None, &opts).unwrap();
        assert_eq!(loaded.series, again.series);
    }

    #[test]
    fn symbol_from_file_stem() {
        assert_eq!(symbol_from_path(Path::new("data/AAPL.csv")), "AAPL");
    }
}
