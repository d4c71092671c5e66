// This module contains the definition of `F64`.
pub mod float;

// This module contains the definition of `Histogram`.
mod histogram;

// Re-exports.
pub use float::F64;
pub use histogram::Histogram;
