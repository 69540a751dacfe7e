//! Unified error types for the firestorm workspace
//!
//! [`FirestormError`] covers every failure the join can surface: unreadable
//! inputs, malformed configuration, and records that fail validation.
//! Domain helpers build the validation variant so the offending dataset,
//! record and field are always reported together.
//!
//! # Example
//!
//! ```ignore
//! use firestorm_core::{FirestormError, FirestormResult};
//!
//! fn load(path: &str) -> FirestormResult<()> {
//!     let table = read_fires(path)?;
//!     check_columns(&table)?;
//!     Ok(())
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// Which input table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Fires,
    Storms,
}

impl Dataset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Fires => "fires",
            Dataset::Storms => "storms",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for all firestorm operations.
#[derive(Error, Debug)]
pub enum FirestormError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid thresholds or configuration files
    #[error("Configuration error: {0}")]
    Config(String),

    /// A record is missing a required field or holds an unusable value.
    ///
    /// `record` is the 0-based row position within `dataset`; `None` when the
    /// failure concerns the table as a whole (e.g. a missing column).
    #[error("Validation error in {dataset}{}: field '{field}': {message}", fmt_record(.record))]
    Validation {
        dataset: Dataset,
        record: Option<usize>,
        field: String,
        message: String,
    },
}

fn fmt_record(record: &Option<usize>) -> String {
    match record {
        Some(idx) => format!(" record {idx}"),
        None => String::new(),
    }
}

impl FirestormError {
    pub fn validation(
        dataset: Dataset,
        record: usize,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        FirestormError::Validation {
            dataset,
            record: Some(record),
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing_column(dataset: Dataset, column: impl Into<String>) -> Self {
        FirestormError::Validation {
            dataset,
            record: None,
            field: column.into(),
            message: "column not found".to_string(),
        }
    }
}

/// Convenience type alias for Results using FirestormError.
pub type FirestormResult<T> = Result<T, FirestormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_names_record_and_field() {
        let err = FirestormError::validation(Dataset::Storms, 7, "amplitude", "not a number");
        let text = err.to_string();
        assert!(text.contains("storms record 7"));
        assert!(text.contains("'amplitude'"));
        assert!(text.contains("not a number"));
        assert!(matches!(err, FirestormError::Validation { .. }));
    }

    #[test]
    fn test_missing_column_has_no_record() {
        let err = FirestormError::missing_column(Dataset::Fires, "lat");
        assert_eq!(
            err.to_string(),
            "Validation error in fires: field 'lat': column not found"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FirestormError = io_err.into();
        assert!(matches!(err, FirestormError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> FirestormResult<()> {
            Err(FirestormError::Config("max distance must be positive".into()))
        }

        fn outer() -> FirestormResult<()> {
            inner()?;
            Ok(())
        }

        let err = outer().unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
