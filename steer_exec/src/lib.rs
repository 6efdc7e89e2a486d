//! # Steering library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the steering executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Steering correction - deviates steering demands to avoid detected objects
pub mod corr;

/// Steering control - routes steering demands according to the drive mode
pub mod ctrl;

/// Parameters of the steering executable
pub mod params;
