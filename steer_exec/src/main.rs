//! # Steering Executable
//!
//! Replays an event script (drive mode changes, steering demands and detected objects) through
//! the steering controller, logging and archiving every steering demand which would be published
//! to the vehicle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info};
use serde::Serialize;
use structopt::StructOpt;

use comms_if::eqpt::steer::SteeringMsg;
use steer_lib::{
    corr::{CorrParams, GridCorrector},
    ctrl::Controller,
    params::SteerExecParams,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingEvts, ScriptInterpreter},
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one cycle when replaying in real time.
const CYCLE_PERIOD_S: f64 = 0.01;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "steer_exec", about = "Replay an event script through the steering controller")]
struct Opts {
    /// Path to the event script
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Parameter file, relative to $STEER_SW_ROOT/params
    #[structopt(short, long, default_value = "steer_exec.toml")]
    params: String,

    /// Replay the script against the session clock rather than as fast as possible
    #[structopt(short, long)]
    realtime: bool,

    /// Minimum log level, one of info, debug or trace
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter,
}

/// A steering demand published by the controller.
#[derive(Debug, Serialize)]
struct PublishedSteering {
    /// Time of the event which produced the demand.
    ///
    /// Units: seconds
    time_s: f64,

    steering: f32,
    confidence: f32,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("steer_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Steering Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("Options: {:#?}", opts);

    // ---- LOAD PARAMETERS ----

    let mut params: SteerExecParams = util::params::load(&opts.params)
        .wrap_err_with(|| format!("Could not load {}", opts.params))?;

    let sw_root = host::get_steer_sw_root().wrap_err("Could not get the software root")?;
    resolve_grid_paths(&mut params.corrector, &sw_root);

    // ---- INITIALISE SCRIPT ----

    info!("Loading script from {:?}", opts.script);

    let mut script_interpreter =
        ScriptInterpreter::new(&opts.script).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} events\n",
        script_interpreter.get_duration(),
        script_interpreter.get_num_evts()
    );

    // ---- MODULE INIT ----

    let corrector =
        GridCorrector::new(&params.corrector).wrap_err("Failed to initialise the corrector")?;

    let ctrl = Controller::new(corrector, params.ctrl);
    info!("Controller init complete");

    // ---- MAIN LOOP ----

    info!("Begining replay\n");

    let published = if opts.realtime {
        replay_realtime(&ctrl, &mut script_interpreter)
    } else {
        replay(&ctrl, &mut script_interpreter)
    };

    info!(
        "End of script reached, {} steering demands published",
        published.len()
    );

    session.save("outputs/steering.json", published);
    session.exit();

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Grid paths in the parameters are relative to the software root.
fn resolve_grid_paths(params: &mut CorrParams, sw_root: &Path) {
    let paths = params
        .steering_grid_path
        .iter_mut()
        .chain(params.obj_move_factors_path.iter_mut());

    for path in paths {
        if path.is_relative() {
            *path = sw_root.join(&*path);
        }
    }
}

/// Process every event in order, as fast as possible.
fn replay(
    ctrl: &Controller<GridCorrector>,
    script_interpreter: &mut ScriptInterpreter,
) -> Vec<PublishedSteering> {
    script_interpreter
        .drain()
        .into_iter()
        .filter_map(|e| {
            let exec_time_s = e.exec_time_s;
            ctrl.handle(e.evt).map(|msg| publish(exec_time_s, msg))
        })
        .collect()
}

/// Process the events as they become due on the session clock.
fn replay_realtime(
    ctrl: &Controller<GridCorrector>,
    script_interpreter: &mut ScriptInterpreter,
) -> Vec<PublishedSteering> {
    let mut published = Vec::new();

    loop {
        let cycle_start_instant = Instant::now();

        match script_interpreter.get_pending_evts() {
            PendingEvts::None => (),
            PendingEvts::Some(evts) => {
                let time_s = session::get_elapsed_seconds();

                published.extend(
                    evts.into_iter()
                        .filter_map(|e| ctrl.handle(e))
                        .map(|msg| publish(time_s, msg)),
                );
            }
            PendingEvts::EndOfScript => break,
        }

        // Sleep for the rest of the cycle
        let cycle_dur = Instant::now() - cycle_start_instant;
        if let Some(rem) = Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            thread::sleep(rem);
        }
    }

    published
}

fn publish(time_s: f64, msg: SteeringMsg) -> PublishedSteering {
    info!(
        "[{:8.3}] Steering: {:+.3} (confidence {:.2})",
        time_s, msg.steering, msg.confidence
    );

    PublishedSteering {
        time_s,
        steering: msg.steering,
        confidence: msg.confidence,
    }
}
