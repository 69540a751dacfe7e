//! # firestorm-io: Table Ingestion and Export
//!
//! Reads the fire and storm exports (CSV or Excel workbooks) into
//! [`RawTable`]s, turns them into typed records with a [`ColumnMapping`], and
//! writes the enriched fire table back out as CSV or Parquet.
//!
//! Every unusable cell surfaces as a validation error naming the table, row
//! and column; nothing is silently coerced to a null.

pub mod dates;
pub mod export;
pub mod ingest;
pub mod table;

pub use dates::{format_timestamp, parse_timestamp};
pub use export::{
    write_enriched, EnrichedTable, OutputFormat, DISTANCE_TO_STORM, NEAREST_STORM_DATE,
    STORM_AMPLITUDE,
};
pub use ingest::{fires_from_table, storms_from_table, ColumnMapping};
pub use table::{normalize_header, RawTable};
