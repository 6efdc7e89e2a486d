//! # Steering correction module
//!
//! Obstacle aware steering correction. The detected objects of the current frame are filtered down
//! to the near field, duplicates are grouped, and the nearest remaining obstacle is looked up in
//! two hand tuned grids to find how much the steering must be deviated to avoid it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod bbox;
mod filter;
mod grid;
mod params;
mod select;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;
use std::path::PathBuf;

use comms_if::eqpt::per::Object;

pub use bbox::*;
pub use filter::*;
pub use grid::*;
pub use params::*;
pub use select::*;
pub use state::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something which can modify a steering demand to take the detected objects into account.
pub trait Corrector: Send + Sync {
    /// Return the steering demand to use given the current demand and the objects detected in the
    /// latest frame.
    ///
    /// This never fails, if no correction can be computed the current steering is returned.
    fn adjust(&self, current_steering: f64, objects: &[Object]) -> f64;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during steering correction.
#[derive(Debug, thiserror::Error)]
pub enum CorrError {
    #[error("Invalid {axis} value: {value}, must be between {min} and {max}")]
    OutOfRange {
        axis: GridAxis,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("List of objects must contain at least one object")]
    EmptyInput,

    #[error("Cannot load the grid configuration: {0}")]
    ConfigLoad(ConfigLoadError),
}

/// Errors which can occur while loading or building a grid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Cannot read grid file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot parse grid file {0:?}: {1}")]
    DeserialiseError(PathBuf, serde_json::Error),

    #[error("Invalid grid: {0}")]
    InvalidShape(String),
}

/// Axes of a [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAxis {
    /// Horizontal axis, between -1 and +1
    Steering,

    /// Vertical axis, between 0 (top of the frame) and 1 (bottom of the frame)
    Distance,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl fmt::Display for GridAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridAxis::Steering => write!(f, "steering"),
            GridAxis::Distance => write!(f, "distance"),
        }
    }
}

impl From<ConfigLoadError> for CorrError {
    fn from(e: ConfigLoadError) -> Self {
        CorrError::ConfigLoad(e)
    }
}
