use std::{
    fs,
    io::Write,
    path::Path,
};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use firestorm_core::EnrichedFireRecord;
#[cfg(feature = "parquet")]
use polars::prelude::{
    DataFrame, DatetimeChunked, IntoSeries, NamedFrom, ParquetWriter, Series, TimeUnit,
};
use tempfile::NamedTempFile;
use tracing::info;

use crate::dates::format_timestamp;
use crate::table::RawTable;

pub const NEAREST_STORM_DATE: &str = "nearest_storm_date";
pub const STORM_AMPLITUDE: &str = "storm_amplitude";
pub const DISTANCE_TO_STORM: &str = "distance_to_storm";

const APPENDED: [&str; 3] = [NEAREST_STORM_DATE, STORM_AMPLITUDE, DISTANCE_TO_STORM];

/// Output encodings, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    #[cfg(feature = "parquet")]
    Parquet,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(OutputFormat::Csv),
            #[cfg(feature = "parquet")]
            Some("parquet") => Ok(OutputFormat::Parquet),
            #[cfg(not(feature = "parquet"))]
            Some("parquet") => bail!("parquet support is disabled; rebuild with the 'parquet' feature"),
            _ => bail!(
                "unsupported output extension for {}; use .csv or .parquet",
                path.display()
            ),
        }
    }
}

/// Fire rows plus the three match columns, ready for any writer.
///
/// Original fire columns come first. Match columns are appended, or
/// overwritten in place when the fire table already carries a column of that
/// name (e.g. re-running on a previous output).
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub storm_dates: Vec<Option<NaiveDateTime>>,
    pub amplitudes: Vec<Option<f64>>,
    pub distances: Vec<Option<f64>>,
    /// Column slot of each appended field within `headers`.
    slots: [usize; 3],
}

impl EnrichedTable {
    pub fn build(fires: &RawTable, records: &[EnrichedFireRecord]) -> Result<Self> {
        if fires.len() != records.len() {
            bail!(
                "fire table has {} rows but the join produced {} records",
                fires.len(),
                records.len()
            );
        }

        let mut headers = fires.headers.clone();
        let mut slots = [0usize; 3];
        for (slot, name) in slots.iter_mut().zip(APPENDED) {
            *slot = match headers.iter().position(|h| h == name) {
                Some(existing) => existing,
                None => {
                    headers.push(name.to_string());
                    headers.len() - 1
                }
            };
        }

        Ok(Self {
            headers,
            rows: fires.rows.clone(),
            storm_dates: records.iter().map(|r| r.nearest_storm_date()).collect(),
            amplitudes: records.iter().map(|r| r.storm_amplitude()).collect(),
            distances: records.iter().map(|r| r.distance_km()).collect(),
            slots,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Output row `idx` as strings; nulls become empty cells.
    pub fn row_cells(&self, idx: usize) -> Vec<String> {
        let mut cells = self.rows[idx].clone();
        cells.resize(self.headers.len(), String::new());
        cells[self.slots[0]] = self.storm_dates[idx].map(format_timestamp).unwrap_or_default();
        cells[self.slots[1]] = self.amplitudes[idx].map(|v| v.to_string()).unwrap_or_default();
        cells[self.slots[2]] = self.distances[idx].map(|v| v.to_string()).unwrap_or_default();
        cells
    }

    #[cfg(feature = "parquet")]
    fn is_appended(&self, col: usize) -> Option<usize> {
        self.slots.iter().position(|&s| s == col)
    }
}

/// Writes the enriched fire table to `output`.
///
/// Format follows the extension: `.csv` always, `.parquet` when built with
/// the `parquet` feature. The table is written to a temporary file in the
/// destination directory and renamed into place, so a failed write never
/// leaves a truncated output behind.
pub fn write_enriched(fires: &RawTable, records: &[EnrichedFireRecord], output: &Path) -> Result<()> {
    let format = OutputFormat::from_path(output)?;
    let table = EnrichedTable::build(fires, records)?;

    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory '{}'", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in '{}'", dir.display()))?;
    match format {
        OutputFormat::Csv => write_csv(&table, tmp.as_file_mut())?,
        #[cfg(feature = "parquet")]
        OutputFormat::Parquet => write_parquet(&table, tmp.as_file_mut())?,
    }
    tmp.persist(output)
        .with_context(|| format!("moving output into place at {}", output.display()))?;

    info!(path = %output.display(), rows = table.len(), "wrote enriched fire table");
    Ok(())
}

fn write_csv<W: Write>(table: &EnrichedTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.headers)?;
    for idx in 0..table.len() {
        wtr.write_record(table.row_cells(idx))?;
    }
    wtr.flush().context("writing CSV output")?;
    Ok(())
}

#[cfg(feature = "parquet")]
fn write_parquet(table: &EnrichedTable, file: &mut fs::File) -> Result<()> {
    let mut columns = Vec::with_capacity(table.headers.len());
    for (col, name) in table.headers.iter().enumerate() {
        let series = match table.is_appended(col) {
            Some(0) => DatetimeChunked::from_naive_datetime_options(
                name.as_str(),
                table.storm_dates.iter().copied(),
                TimeUnit::Milliseconds,
            )
            .into_series(),
            Some(1) => Series::new(name.as_str(), table.amplitudes.clone()),
            Some(_) => Series::new(name.as_str(), table.distances.clone()),
            None => {
                let values: Vec<&str> = table
                    .rows
                    .iter()
                    .map(|row| row.get(col).map(String::as_str).unwrap_or(""))
                    .collect();
                Series::new(name.as_str(), values)
            }
        };
        columns.push(series);
    }
    let mut df = DataFrame::new(columns).context("assembling enriched frame")?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .context("writing Parquet output")?;
    Ok(())
}
