//! Implementations for the steering controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// Internal
use super::CtrlParams;
use crate::corr::Corrector;
use comms_if::{
    eqpt::{
        per::{Object, ObjectsMsg},
        steer::{DriveMode, DriveModeMsg, SteeringMsg},
    },
    evt::Event,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive mode and objects, shared between the event handlers.
#[derive(Debug, Default)]
pub struct SharedState {
    inner: RwLock<Snapshot>,
}

/// Consistent copy of the shared state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub drive_mode: DriveMode,
    pub objects: Vec<Object>,
}

/// Mode gated steering router.
///
/// Every handler takes `&self` so that a single controller can be shared between the threads
/// receiving each kind of message.
pub struct Controller<C: Corrector> {
    state: SharedState,
    corrector: C,
    params: CtrlParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SharedState {
    pub fn new(drive_mode: DriveMode) -> Self {
        Self {
            inner: RwLock::new(Snapshot {
                drive_mode,
                objects: Vec::new(),
            }),
        }
    }

    pub fn set_drive_mode(&self, drive_mode: DriveMode) {
        self.write().drive_mode = drive_mode;
    }

    pub fn set_objects(&self, objects: Vec<Object>) {
        self.write().objects = objects;
    }

    pub fn drive_mode(&self) -> DriveMode {
        self.read().drive_mode
    }

    /// Copy of the current drive mode and objects, taken under a single lock.
    pub fn snapshot(&self) -> Snapshot {
        self.read().clone()
    }

    // The state is plain data, so a writer panicking cannot leave it inconsistent and a
    // poisoned lock is simply recovered.

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Corrector> Controller<C> {
    /// Create a new controller, starting in `User` mode with no objects.
    pub fn new(corrector: C, params: CtrlParams) -> Self {
        info!(
            "Steering controller created (correction: {}, on user: {})",
            params.enable_correction, params.enable_correction_on_user
        );

        Self {
            state: SharedState::new(DriveMode::default()),
            corrector,
            params,
        }
    }

    /// Process an event, returning the steering message to publish if there is one.
    pub fn handle(&self, event: Event) -> Option<SteeringMsg> {
        match event {
            Event::DriveMode(msg) => {
                self.on_drive_mode(msg);
                None
            }
            Event::Objects(msg) => {
                self.on_objects(msg);
                None
            }
            Event::RcSteering(msg) => self.on_rc_steering(msg),
            Event::PilotSteering(msg) => self.on_pilot_steering(msg),
        }
    }

    pub fn on_drive_mode(&self, msg: DriveModeMsg) {
        debug!("Drive mode changed to {:?}", msg.drive_mode);
        self.state.set_drive_mode(msg.drive_mode);
    }

    pub fn on_objects(&self, msg: ObjectsMsg) {
        trace!("Received {} objects", msg.objects.len());
        self.state.set_objects(msg.objects);
    }

    /// Steering demand from the radio command, only forwarded while the user drives.
    pub fn on_rc_steering(&self, msg: SteeringMsg) -> Option<SteeringMsg> {
        let snapshot = self.state.snapshot();

        if !snapshot.drive_mode.rc_in_control() {
            return None;
        }

        debug!("Receive steering message from radio command: {:.2}", msg.steering);

        if self.params.enable_correction && self.params.enable_correction_on_user {
            Some(self.adjust(msg, &snapshot.objects))
        } else {
            Some(msg)
        }
    }

    /// Steering demand from the autopilot, only forwarded while the autopilot steers.
    pub fn on_pilot_steering(&self, msg: SteeringMsg) -> Option<SteeringMsg> {
        let snapshot = self.state.snapshot();

        if !snapshot.drive_mode.pilot_in_control() {
            return None;
        }

        debug!("Receive steering message from autopilot: {:.2}", msg.steering);

        if self.params.enable_correction {
            Some(self.adjust(msg, &snapshot.objects))
        } else {
            Some(msg)
        }
    }

    pub fn drive_mode(&self) -> DriveMode {
        self.state.drive_mode()
    }

    pub fn objects(&self) -> Vec<Object> {
        self.state.snapshot().objects
    }

    fn adjust(&self, msg: SteeringMsg, objects: &[Object]) -> SteeringMsg {
        let steering = self.corrector.adjust(msg.steering as f64, objects);

        debug!(
            "Adjust steering to avoid objects: {} -> {}",
            msg.steering, steering
        );

        SteeringMsg {
            steering: steering as f32,
            ..msg
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
