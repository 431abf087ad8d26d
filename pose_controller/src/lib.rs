//! # pose_controller
//!
//! Drive a side-scrolling game with your body.  Body-pose landmarks come in
//! once per frame, the [`gesture_classifier`] turns them into key intents,
//! and the [`key_actuator`] turns those into keyboard events.
//!
//! ## Gesture → Key mapping (default bindings)
//!
//! | Gesture | Key |
//! |---|---|
//! | Jog in place on the left half of the frame | hold `A` |
//! | Jog in place on the right half of the frame | hold `D` |
//! | Head above the jump line | `Space` for half a second |
//! | Both arms dropped below the stop line | release everything |
//!
//! ## Presentation
//!
//! * **Windowed** (default): a worker thread runs capture + classification
//!   and sends snapshots over a bounded channel to the window, which draws
//!   the skeleton, the stop (red) / jump (blue) / centre (green) lines, the
//!   current gesture and any advisory.
//! * **Headless** (`--headless`): one synchronous loop; gesture changes and
//!   advisories go to the log.
//!
//! ## Pose sources
//!
//! * `sim` — a synthetic body driven from the window's keyboard.
//! * `script` — the built-in demo choreography.
//! * `stdin` — JSON-lines [`pose_model::FrameRecord`]s from an external
//!   pose estimator.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Body |
//! |---|---|
//! | `←` / `→` | Step left / right |
//! | `Space` (hold) | Jog in place |
//! | `↑` | Jump |
//! | `↓` (hold) | Lower both arms |
//! | `W` | Hide / show the right hand |
//! | `H` | Leave / re-enter the frame |
//! | `Esc` | Quit |

pub mod source;
pub mod session;
pub mod headless;
pub mod worker;
pub mod visualizer;
pub mod app;

use gesture_classifier::ConfigError;

use crate::source::SourceError;

/// Anything that ends a session early.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("pose source failed: {0}")]
    Source(#[from] SourceError),
    #[error("invalid classifier settings: {0}")]
    Config(#[from] ConfigError),
    #[error("window error: {0}")]
    Window(String),
    #[error("could not start worker thread: {0}")]
    Spawn(std::io::Error),
    #[error("worker thread panicked")]
    WorkerPanicked,
    #[error("{0}")]
    Usage(String),
}
