//! # Event script interpreter module
//!
//! This module provides an interpreter for event scripts, allowing recorded or hand written
//! sequences of drive mode, steering and object events to be replayed through the steering
//! controller.
//!
//! A script is made of lines of the form `<time_s>: <event json>;`, for example:
//!
//! ```text
//! 0.0: {"type": "DRIVE_MODE", "payload": {"drive_mode": "PILOT"}};
//! 0.1: {"type": "PILOT_STEERING", "payload": {"steering": 0.3, "confidence": 1.0}};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::Path;
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::evt::{Event, EvtParseError};
use crate::session::get_elapsed_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An event which is scripted to occur at a specific time.
#[derive(Debug, Clone)]
pub struct ScriptedEvent {
    /// The time the event is supposed to occur at
    pub exec_time_s: f64,

    /// The event itself
    pub evt: Event
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_evts` to acquire the
/// events that are due, or `.drain` to get all of them at once.
pub struct ScriptInterpreter {
    evts: VecDeque<ScriptedEvent>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid event at {0} s: {1}")]
    InvalidEvt(f64, EvtParseError)
}

pub enum PendingEvts {
    None,
    Some(Vec<Event>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();
        
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.display().to_string()));
        }

        let script = fs::read_to_string(path)
            .map_err(ScriptError::ScriptLoadError)?;

        Self::parse(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn parse(script: &str) -> Result<Self, ScriptError> {
        let mut evt_queue: VecDeque<ScriptedEvent> = VecDeque::new();

        // Timestamp, colon, then everything up to the terminating semicolon
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script regex is invalid");

        for cap in re.captures_iter(script) {
            let time_str = &cap[1];
            let exec_time_s: f64 = time_str.parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{} ({})", time_str, e)))?;

            let evt = Event::from_json(&cap[3])
                .map_err(|e| ScriptError::InvalidEvt(exec_time_s, e))?;

            evt_queue.push_back(ScriptedEvent {
                exec_time_s,
                evt
            });
        }

        if evt_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        // Scripts may be written out of order, replay them in time order. The sort is stable so
        // events sharing a timestamp keep their script order.
        evt_queue.make_contiguous().sort_by(|a, b| {
            a.exec_time_s
                .partial_cmp(&b.exec_time_s)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(ScriptInterpreter {
            evts: evt_queue
        })
    }

    /// Return the events which are due at the current session time.
    pub fn get_pending_evts(&mut self) -> PendingEvts {
        self.get_pending_evts_at(get_elapsed_seconds())
    }

    /// Return the events which are due at the given time.
    pub fn get_pending_evts_at(&mut self, current_time_s: f64) -> PendingEvts {

        if self.evts.is_empty() {
            return PendingEvts::EndOfScript
        }

        let mut evt_vec: Vec<Event> = vec![];

        while let Some(front) = self.evts.front() {
            if front.exec_time_s >= current_time_s {
                break;
            }
            if let Some(e) = self.evts.pop_front() {
                evt_vec.push(e.evt);
            }
        }

        if evt_vec.is_empty() {
            PendingEvts::None
        }
        else {
            PendingEvts::Some(evt_vec)
        }
    }

    /// Remove and return every remaining event, ignoring their timestamps.
    pub fn drain(&mut self) -> Vec<ScriptedEvent> {
        self.evts.drain(..).collect()
    }

    /// Get the number of events in the script
    pub fn get_num_evts(&self) -> usize {
        self.evts.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.evts.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
