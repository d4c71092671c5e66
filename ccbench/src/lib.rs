#![deny(rust_2018_idioms)]

// This module contains the definition of `Column` and `Measurement`.
pub mod measurement;

// This module contains the definition of `MeasurementDB` and `Search`.
pub mod db;

// This module contains the definition of `F64` and `Histogram`.
pub mod metrics;

// This module contains the computation of per-group and per-value means.
pub mod aggregate;

// This module contains the definition of `ReportConfig` and its presets.
pub mod config;

// Re-exports.
pub use aggregate::{group_means, mean_per_value, GroupMeans};
pub use config::ReportConfig;
pub use db::{MeasurementDB, Search};
pub use measurement::{Column, Measurement};
