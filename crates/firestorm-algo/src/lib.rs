//! # firestorm-algo: Spatiotemporal Fire/Storm Matching
//!
//! For each fire, finds the planar-nearest storm with an R-tree and accepts it
//! only if it is also within a geodesic distance and a time window.
//!
//! ## Components
//!
//! - [`GeoIndex`] - R-tree over storm `(lat, lon)`; candidate selection only
//! - [`geodesic_km`] - WGS-84 surface distance used for the acceptance check
//! - [`MatchPolicy`] - inclusive distance and time thresholds
//! - [`FireStormMatcher`] - one fire in, one [`MatchResult`](firestorm_core::MatchResult) out
//! - [`DatasetJoinPipeline`] - matches a whole fire table in input order
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use firestorm_algo::{DatasetJoinPipeline, MatchPolicy};
//! use firestorm_core::{FireRecord, StormRecord};
//!
//! let day = NaiveDate::from_ymd_opt(2021, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let fires = vec![FireRecord::new(0, 55.0, 37.0, day).unwrap()];
//! let storms = vec![StormRecord::new(0, 55.001, 37.001, day, 14.2).unwrap()];
//!
//! let pipeline = DatasetJoinPipeline::new(MatchPolicy::with_days(50.0, 5).unwrap());
//! let enriched = pipeline.run(&fires, &storms).unwrap();
//! assert!(enriched[0].is_matched());
//! ```
//!
//! ## Known limitation
//!
//! Only the single planar-nearest storm is validated. If a different storm is
//! geodesically closer (high latitudes, antimeridian), it is never considered.

pub mod distance;
pub mod geo_index;
pub mod matcher;
pub mod pipeline;
pub mod policy;
pub mod summary;

pub use distance::geodesic_km;
pub use geo_index::{GeoIndex, Neighbor};
pub use matcher::FireStormMatcher;
pub use pipeline::DatasetJoinPipeline;
pub use policy::{time_gap, MatchPolicy};
pub use summary::JoinSummary;
