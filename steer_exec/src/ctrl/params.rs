//! Parameters structure for steering control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for steering control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtrlParams {
    /// Correct the steering demands to avoid detected objects.
    pub enable_correction: bool,

    /// Also correct the radio command demands while the user drives. Has no effect unless
    /// `enable_correction` is set.
    pub enable_correction_on_user: bool,
}
