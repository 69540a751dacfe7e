use firestorm_core::{Dataset, FireRecord, FirestormError, FirestormResult, StormRecord};
use serde::{Deserialize, Serialize};

use crate::dates::parse_timestamp;
use crate::table::RawTable;

/// Column names for each input table.
///
/// Defaults match the fire and lightning exports the join was built for.
/// Names are normalized before lookup, so case and surrounding whitespace do
/// not matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_lat")]
    pub fire_lat: String,
    #[serde(default = "default_lon")]
    pub fire_lon: String,
    #[serde(default = "default_fire_date")]
    pub fire_date: String,
    #[serde(default = "default_lat")]
    pub storm_lat: String,
    #[serde(default = "default_lon")]
    pub storm_lon: String,
    #[serde(default = "default_storm_date")]
    pub storm_date: String,
    #[serde(default = "default_amplitude")]
    pub storm_amplitude: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            fire_lat: default_lat(),
            fire_lon: default_lon(),
            fire_date: default_fire_date(),
            storm_lat: default_lat(),
            storm_lon: default_lon(),
            storm_date: default_storm_date(),
            storm_amplitude: default_amplitude(),
        }
    }
}

fn default_lat() -> String {
    "lat".to_string()
}

fn default_lon() -> String {
    "lon".to_string()
}

fn default_fire_date() -> String {
    "дата первого наблюдения".to_string()
}

fn default_storm_date() -> String {
    "dt".to_string()
}

fn default_amplitude() -> String {
    "amplitude".to_string()
}

/// Builds typed fire records; the record id is the row position.
pub fn fires_from_table(table: &RawTable, columns: &ColumnMapping) -> FirestormResult<Vec<FireRecord>> {
    let ds = Dataset::Fires;
    let lat = table.require_column(&columns.fire_lat, ds)?;
    let lon = table.require_column(&columns.fire_lon, ds)?;
    let date = table.require_column(&columns.fire_date, ds)?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let cells = RowCells { table, row, idx, ds };
            FireRecord::new(
                idx,
                cells.float(lat)?,
                cells.float(lon)?,
                cells.timestamp(date)?,
            )
        })
        .collect()
}

/// Builds typed storm records; the record id is the row position.
pub fn storms_from_table(table: &RawTable, columns: &ColumnMapping) -> FirestormResult<Vec<StormRecord>> {
    let ds = Dataset::Storms;
    let lat = table.require_column(&columns.storm_lat, ds)?;
    let lon = table.require_column(&columns.storm_lon, ds)?;
    let date = table.require_column(&columns.storm_date, ds)?;
    let amplitude = table.require_column(&columns.storm_amplitude, ds)?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let cells = RowCells { table, row, idx, ds };
            StormRecord::new(
                idx,
                cells.float(lat)?,
                cells.float(lon)?,
                cells.timestamp(date)?,
                cells.float(amplitude)?,
            )
        })
        .collect()
}

struct RowCells<'a> {
    table: &'a RawTable,
    row: &'a [String],
    idx: usize,
    ds: Dataset,
}

impl RowCells<'_> {
    fn cell(&self, col: usize) -> FirestormResult<&str> {
        let value = self.row.get(col).map(|s| s.trim()).unwrap_or("");
        if value.is_empty() {
            return Err(self.invalid(col, "value is missing".to_string()));
        }
        Ok(value)
    }

    fn float(&self, col: usize) -> FirestormResult<f64> {
        let raw = self.cell(col)?;
        parse_float(raw).ok_or_else(|| self.invalid(col, format!("'{raw}' is not a number")))
    }

    fn timestamp(&self, col: usize) -> FirestormResult<chrono::NaiveDateTime> {
        let raw = self.cell(col)?;
        parse_timestamp(raw).ok_or_else(|| self.invalid(col, format!("'{raw}' is not a date")))
    }

    fn invalid(&self, col: usize, message: String) -> FirestormError {
        FirestormError::validation(self.ds, self.idx, self.table.headers[col].clone(), message)
    }
}

/// Parses a decimal number, accepting a comma as the decimal separator.
fn parse_float(raw: &str) -> Option<f64> {
    let value = match raw.parse::<f64>() {
        Ok(v) => v,
        Err(_) if raw.matches(',').count() == 1 && !raw.contains('.') => {
            raw.replace(',', ".").parse::<f64>().ok()?
        }
        Err(_) => return None,
    };
    value.is_finite().then_some(value)
}
