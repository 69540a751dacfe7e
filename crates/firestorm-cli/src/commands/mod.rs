pub mod config;
pub mod join;
pub mod runs;
pub mod telemetry;
pub mod util;
