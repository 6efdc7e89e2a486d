//! # Steering Messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A steering sample, either from the radio command or from the autopilot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SteeringMsg {
    /// Normalised steering demand, between -1 (full left) and +1 (full right).
    pub steering: f32,

    /// Confidence of the source in this demand.
    #[serde(default)]
    pub confidence: f32,
}

/// Notification of a drive mode change.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveModeMsg {
    pub drive_mode: DriveMode,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Which steering channel is in control of the vehicle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriveMode {
    /// Unknown mode, no channel is in control
    Invalid,

    /// The human driver, through the radio command
    User,

    /// The autopilot drives both steering and throttle
    Pilot,

    /// The autopilot steers, the user drives the throttle
    Copilot,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveMode {
    /// True if the radio command steering channel is in control.
    pub fn rc_in_control(&self) -> bool {
        matches!(self, DriveMode::User)
    }

    /// True if the autopilot steering channel is in control.
    pub fn pilot_in_control(&self) -> bool {
        matches!(self, DriveMode::Pilot | DriveMode::Copilot)
    }
}

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::User
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
