//! Steering control module
//!
//! Routes the steering demands of the radio command and of the autopilot according to the
//! current drive mode, correcting them to avoid the latest detected objects when enabled.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;
