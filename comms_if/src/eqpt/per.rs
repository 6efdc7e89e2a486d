//! # Perception Messages
//!
//! Objects detected by the perception chain. All positions are fractions of the image width or
//! height, so that `0.0` is the left/top edge of the frame and `1.0` the right/bottom edge.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Confidence given to objects which were synthesised rather than detected (for example by
/// merging several detections).
pub const SYNTHETIC_CONFIDENCE: f32 = -1.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A detected obstacle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Object {
    /// Kind of object
    #[serde(rename = "type", default)]
    pub obj_type: ObjectType,

    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,

    /// Detector confidence, or [`SYNTHETIC_CONFIDENCE`]
    #[serde(default)]
    pub confidence: f32,
}

/// All objects detected in one frame.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ObjectsMsg {
    #[serde(default)]
    pub objects: Vec<Object>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Kinds of object the perception chain can report.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Any,
    Car,
    Bump,
    Plot,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Object {
    /// Create a new object of type `ANY` from its bounds.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32, confidence: f32) -> Self {
        Self {
            obj_type: ObjectType::Any,
            left,
            top,
            right,
            bottom,
            confidence,
        }
    }

    /// Width of the object as a fraction of the image width.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}

impl Default for ObjectType {
    fn default() -> Self {
        ObjectType::Any
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_object_defaults() {
        let obj: Object =
            serde_json::from_str(r#"{"left": 0.1, "top": 0.2, "right": 0.3, "bottom": 0.4}"#)
                .unwrap();

        assert_eq!(obj.obj_type, ObjectType::Any);
        assert_eq!(obj.confidence, 0.0);
        assert_eq!(obj.right, 0.3);

        let obj: Object = serde_json::from_str(
            r#"{"type": "CAR", "left": 0.1, "top": 0.2, "right": 0.3, "bottom": 0.4, "confidence": 0.9}"#,
        )
        .unwrap();

        assert_eq!(obj.obj_type, ObjectType::Car);
        assert_eq!(obj.confidence, 0.9);
    }
}
