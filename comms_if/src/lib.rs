//! # Communications interface crate.
//!
//! Provides the message types exchanged between the steering executable and the rest of the
//! vehicle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for equipment (perception and steering)
pub mod eqpt;

/// Inbound event envelope
pub mod evt;
