use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::ReaderBuilder;
use firestorm_core::{Dataset, FirestormError, FirestormResult};
use tracing::debug;

use crate::dates::format_timestamp;

/// Spreadsheet extensions read through calamine.
const WORKBOOK_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// A header row plus string cells, exactly as read from disk.
///
/// Headers are normalized (trimmed, lower-cased) on read. Cells are kept as
/// written so the original fire columns can be copied to the output untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Trims, strips a UTF-8 BOM and lower-cases a column name.
pub fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

impl RawTable {
    /// Reads a CSV file or the first sheet of a workbook, by extension.
    pub fn read(path: &Path, dataset: Dataset) -> FirestormResult<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let table = match ext.as_str() {
            "csv" | "txt" => Self::read_csv(path, dataset)?,
            ext if WORKBOOK_EXTENSIONS.contains(&ext) => Self::read_workbook(path, dataset)?,
            _ => {
                return Err(FirestormError::Parse(format!(
                    "unsupported {dataset} input {}; use .csv, .xls or .xlsx",
                    path.display()
                )))
            }
        };
        debug!(
            dataset = dataset.as_str(),
            path = %path.display(),
            rows = table.len(),
            columns = table.headers.len(),
            "read table"
        );
        Ok(table)
    }

    pub fn read_csv(path: &Path, dataset: Dataset) -> FirestormResult<Self> {
        let file = File::open(path).map_err(|err| {
            FirestormError::Io(std::io::Error::new(
                err.kind(),
                format!("opening {} table {}: {err}", dataset, path.display()),
            ))
        })?;
        Self::from_reader(file, dataset)
    }

    pub fn from_reader<R: Read>(reader: R, dataset: Dataset) -> FirestormResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|err| FirestormError::Parse(format!("reading {dataset} header: {err}")))?
            .iter()
            .map(normalize_header)
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in rdr.records().enumerate() {
            let record = record
                .map_err(|err| FirestormError::Parse(format!("reading {dataset} row {idx}: {err}")))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Reads the first worksheet; its first row is the header.
    ///
    /// Date-formatted cells are rendered as `%Y-%m-%d %H:%M:%S`. Blank rows
    /// are skipped.
    pub fn read_workbook(path: &Path, dataset: Dataset) -> FirestormResult<Self> {
        let mut workbook = open_workbook_auto(path).map_err(|err| {
            FirestormError::Parse(format!("opening {dataset} workbook {}: {err}", path.display()))
        })?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| {
                FirestormError::Parse(format!("{dataset} workbook {} has no sheets", path.display()))
            })?
            .map_err(|err| {
                FirestormError::Parse(format!("reading {dataset} workbook {}: {err}", path.display()))
            })?;

        let mut sheet_rows = range.rows();
        let headers = sheet_rows
            .next()
            .map(|row| row.iter().map(|c| normalize_header(&cell_text(c))).collect())
            .unwrap_or_default();
        let rows = sheet_rows
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name; the lookup name is normalized first.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header(name);
        self.headers.iter().position(|h| *h == wanted)
    }

    /// Like [`column_index`](Self::column_index) but a missing column is a validation error.
    pub fn require_column(&self, name: &str, dataset: Dataset) -> FirestormResult<usize> {
        self.column_index(name)
            .ok_or_else(|| FirestormError::missing_column(dataset, normalize_header(name)))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(format_timestamp)
            .unwrap_or_else(|| cell.to_string()),
        Data::Error(err) => err.to_string(),
    }
}
