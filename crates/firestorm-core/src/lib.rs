//! # firestorm-core: Fire/Storm Record Model
//!
//! Shared data structures for the spatiotemporal fire/storm join.
//!
//! ## Core Data Structures
//!
//! - [`FireRecord`] - a fire observation: row id, position, first-observed date
//! - [`StormRecord`] - a lightning observation: row id, position, date, amplitude
//! - [`StormMatch`] / [`MatchResult`] - the storm accepted for a fire, if any
//! - [`EnrichedFireRecord`] - fire plus its match, one per input fire
//!
//! ## Errors
//!
//! [`FirestormError`] is the common error type; validation failures always
//! carry the dataset, row and field that caused them.

pub mod error;
pub mod records;
pub mod units;

pub use error::{Dataset, FirestormError, FirestormResult};
pub use records::{
    CoordinateError, EnrichedFireRecord, FireRecord, GeoPoint, MatchResult, StormMatch,
    StormRecord,
};
pub use units::Kilometers;
