//! Export: CSV and JSON artifacts for feature frames and series.
//!
//! - **CSV**: `date`, every feature column in frame order, then `label`
//!   (-1 / 0 / +1). Values are written with full round-trip precision.
//! - **JSON**: the serde form of [`FeatureFrame`], loadable again.
//!
//! Synthetic series are written in the same CSV layout the loader reads, so
//! `synth` output can be fed straight back into `engineer`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use featurelab_core::indicators::names;
use featurelab_core::{FeatureFrame, Series};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

// ─── Feature frames ─────────────────────────────────────────────────

/// Export a feature frame as CSV.
pub fn frame_to_csv(frame: &FeatureFrame) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = Vec::with_capacity(frame.columns().len() + 2);
    header.push("date");
    header.extend(frame.column_names());
    header.push(names::LABEL);
    wtr.write_record(&header)?;

    for row in frame.rows() {
        let mut record = Vec::with_capacity(row.values.len() + 2);
        record.push(row.date.to_string());
        record.extend(row.values.iter().map(|v| v.to_string()));
        record.push(row.label.as_i8().to_string());
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Serialize a feature frame to pretty JSON.
pub fn frame_to_json(frame: &FeatureFrame) -> Result<String> {
    serde_json::to_string_pretty(frame).context("failed to serialize FeatureFrame to JSON")
}

/// Deserialize a feature frame from JSON, re-checking column lengths.
pub fn frame_from_json(json: &str) -> Result<FeatureFrame> {
    let frame: FeatureFrame =
        serde_json::from_str(json).context("failed to deserialize FeatureFrame from JSON")?;
    if frame.columns().iter().any(|c| c.values.iter().any(|v| !v.is_finite())) {
        bail!("FeatureFrame JSON contains non-finite values");
    }
    Ok(frame)
}

/// Write a frame to `path` in the given format, creating parent directories.
pub fn write_frame(frame: &FeatureFrame, path: &Path, format: ExportFormat) -> Result<()> {
    let body = match format {
        ExportFormat::Csv => frame_to_csv(frame)?,
        ExportFormat::Json => frame_to_json(frame)?,
    };
    write_file(path, &body)
}

// ─── Series ─────────────────────────────────────────────────────────

/// Export a series in the provider CSV layout (`Adj Close` = `Close`).
pub fn series_to_csv(series: &Series) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"])?;
    for i in 0..series.len() {
        let bar = series.bar(i)?;
        wtr.write_record([
            bar.date.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn write_series(series: &Series, path: &Path) -> Result<()> {
    write_file(path, &series_to_csv(series)?)
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output dir: {}", parent.display()))?;
    }
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}
