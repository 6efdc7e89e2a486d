//! # Event module
//!
//! Inbound events handled by the steering controller. Events are carried in a JSON envelope of the
//! form `{"type": "<TYPE>", "payload": {...}}`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// Internal
use crate::eqpt::{
    per::ObjectsMsg,
    steer::{DriveModeMsg, SteeringMsg},
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An event received from the rest of the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// The drive mode changed
    DriveMode(DriveModeMsg),

    /// New steering sample from the radio command
    RcSteering(SteeringMsg),

    /// New steering sample from the autopilot
    PilotSteering(SteeringMsg),

    /// New list of detected objects
    Objects(ObjectsMsg),
}

/// Event types, used to identify the payload of an envelope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub enum EvtType {
    DriveMode,
    RcSteering,
    PilotSteering,
    Objects,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum EvtParseError {
    #[error("Event contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Event has an invalid type ({0})")]
    InvalidType(String),

    #[error("Event of type {0:?} is expected to have a payload but it doesn't")]
    MissingPayload(EvtType),

    #[error("Payload doesn't match the {0:?} event type: {1}")]
    InvalidPayload(EvtType, serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Event {
    /// Parse a new event from a JSON envelope
    pub fn from_json(json_str: &str) -> Result<Self, EvtParseError> {
        let val: Value = serde_json::from_str(json_str).map_err(EvtParseError::InvalidJson)?;

        let type_str = match val["type"].as_str() {
            Some(s) => s,
            None => {
                return Err(EvtParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        };

        let evt_type = match EvtType::from_type_str(type_str) {
            Some(t) => t,
            None => {
                return Err(EvtParseError::InvalidType(format!(
                    "{} is not a recognised event type",
                    type_str
                )))
            }
        };

        // Every event carries a payload
        let payload = &val["payload"];
        if payload.is_null() {
            return Err(EvtParseError::MissingPayload(evt_type));
        }

        let invalid = |e| EvtParseError::InvalidPayload(evt_type, e);

        Ok(match evt_type {
            EvtType::DriveMode => {
                Event::DriveMode(serde_json::from_value(payload.clone()).map_err(invalid)?)
            }
            EvtType::RcSteering => {
                Event::RcSteering(serde_json::from_value(payload.clone()).map_err(invalid)?)
            }
            EvtType::PilotSteering => {
                Event::PilotSteering(serde_json::from_value(payload.clone()).map_err(invalid)?)
            }
            EvtType::Objects => {
                Event::Objects(serde_json::from_value(payload.clone()).map_err(invalid)?)
            }
        })
    }

    /// Get the type of this event
    pub fn evt_type(&self) -> EvtType {
        match self {
            Event::DriveMode(_) => EvtType::DriveMode,
            Event::RcSteering(_) => EvtType::RcSteering,
            Event::PilotSteering(_) => EvtType::PilotSteering,
            Event::Objects(_) => EvtType::Objects,
        }
    }
}

impl EvtType {
    fn from_type_str(s: &str) -> Option<Self> {
        match s {
            "DRIVE_MODE" => Some(EvtType::DriveMode),
            "RC_STEERING" => Some(EvtType::RcSteering),
            "PILOT_STEERING" => Some(EvtType::PilotSteering),
            "OBJECTS" => Some(EvtType::Objects),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::steer::DriveMode;

    #[test]
    fn test_parse_events() -> Result<(), EvtParseError> {
        let evt = Event::from_json(r#"{"type": "DRIVE_MODE", "payload": {"drive_mode": "PILOT"}}"#)?;
        assert_eq!(
            evt,
            Event::DriveMode(DriveModeMsg {
                drive_mode: DriveMode::Pilot
            })
        );

        let evt = Event::from_json(
            r#"{"type": "RC_STEERING", "payload": {"steering": 0.3, "confidence": 1.0}}"#,
        )?;
        assert_eq!(
            evt,
            Event::RcSteering(SteeringMsg {
                steering: 0.3,
                confidence: 1.0
            })
        );
        assert_eq!(evt.evt_type(), EvtType::RcSteering);

        let evt = Event::from_json(
            r#"{"type": "OBJECTS", "payload": {"objects": [
                {"left": 0.4, "top": 0.92, "right": 0.6, "bottom": 0.98, "confidence": 0.9}
            ]}}"#,
        )?;
        match evt {
            Event::Objects(o) => assert_eq!(o.objects.len(), 1),
            e => panic!("Expected objects event, got {:?}", e),
        }

        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Event::from_json("{not json"),
            Err(EvtParseError::InvalidJson(_))
        ));
        assert!(matches!(
            Event::from_json(r#"{"type": "THROTTLE", "payload": {}}"#),
            Err(EvtParseError::InvalidType(_))
        ));
        assert!(matches!(
            Event::from_json(r#"{"payload": {}}"#),
            Err(EvtParseError::InvalidType(_))
        ));
        assert!(matches!(
            Event::from_json(r#"{"type": "PILOT_STEERING"}"#),
            Err(EvtParseError::MissingPayload(EvtType::PilotSteering))
        ));
        assert!(matches!(
            Event::from_json(r#"{"type": "DRIVE_MODE", "payload": {"drive_mode": "TURBO"}}"#),
            Err(EvtParseError::InvalidPayload(EvtType::DriveMode, _))
        ));
    }
}
