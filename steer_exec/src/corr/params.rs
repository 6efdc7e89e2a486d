//! Parameters structure for steering correction

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the grid corrector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrParams {

    // ---- GRIDS ----

    /// Path to the JSON steering correction grid, or `None` to use the built-in grid.
    pub steering_grid_path: Option<PathBuf>,

    /// Path to the JSON object move factors grid, or `None` to use the built-in grid.
    pub obj_move_factors_path: Option<PathBuf>,

    // ---- THRESHOLDS ----

    /// Steering demands strictly within `(-delta_middle, delta_middle)` are considered to be
    /// driving straight.
    pub delta_middle: f64,

    /// Objects covering at least this fraction of the image are ignored.
    pub size_threshold: f64,

    // ---- IMAGE ----

    /// Width of the detector's image.
    ///
    /// Units: pixels
    pub img_width: u32,

    /// Height of the detector's image.
    ///
    /// Units: pixels
    pub img_height: u32,
}

impl Default for CorrParams {
    fn default() -> Self {
        Self {
            steering_grid_path: None,
            obj_move_factors_path: None,
            delta_middle: 0.1,
            size_threshold: 0.75,
            img_width: 160,
            img_height: 120,
        }
    }
}
