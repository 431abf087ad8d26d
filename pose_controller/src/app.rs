//! Top-level wiring: pick a source, a keyboard backend and a presentation
//! mode, then run one session.

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use gesture_classifier::{ClassifierConfig, GestureClassifier};
use key_actuator::{open_backend, Actuator, BackendKind, KeyBindings, KeyboardBackend};
use log::info;
use pose_model::{FrameSize, Script};

use crate::headless::HeadlessPresenter;
use crate::session::{Session, SessionSummary};
use crate::source::{JsonLinesSource, PoseSource, ScriptedPoseSource, SimInput, SimPoseSource};
use crate::visualizer::Visualizer;
use crate::worker::{Worker, DEFAULT_SHUTDOWN_TIMEOUT};
use crate::ControllerError;

const TITLE: &str = "Pose Controller";

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    Headless,
    #[default]
    Windowed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SourceKind {
    /// Synthetic body driven from the window's keyboard.
    #[default]
    Sim,
    /// Built-in demo choreography.
    Script,
    /// JSON-lines frame records on stdin.
    Stdin,
}

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub mode:             Mode,
    pub source:           SourceKind,
    pub backend:          BackendKind,
    pub bindings:         KeyBindings,
    pub classifier:       ClassifierConfig,
    /// Frame rate of the sim and script sources.
    pub fps:              u32,
    /// Frame size reported by the sim and script sources.
    pub frame:            FrameSize,
    /// Pace the script in real time even when headless.  Windowed mode
    /// always paces.
    pub realtime:         bool,
    /// Snapshot channel capacity between worker and window.
    pub channel_capacity: usize,
    pub shutdown_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            mode:             Mode::default(),
            source:           SourceKind::default(),
            backend:          BackendKind::default(),
            bindings:         KeyBindings::default(),
            classifier:       ClassifierConfig::default(),
            fps:              30,
            frame:            FrameSize::default(),
            realtime:         false,
            channel_capacity: 4,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

fn make_source(
    cfg: &AppConfig,
    sim_rx: Option<Receiver<SimInput>>,
    paced: bool,
) -> Result<Box<dyn PoseSource>, ControllerError> {
    Ok(match cfg.source {
        SourceKind::Script => {
            Box::new(ScriptedPoseSource::new(Script::demo(cfg.fps), cfg.frame, paced))
        }
        SourceKind::Stdin => Box::new(JsonLinesSource::stdin()),
        SourceKind::Sim => match sim_rx {
            Some(rx) => Box::new(SimPoseSource::new(rx, cfg.frame, cfg.fps)),
            None => {
                return Err(ControllerError::Usage(
                    "the simulated body needs the window; use --source script or --source stdin with --headless".into(),
                ))
            }
        },
    })
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the application entry point
// ════════════════════════════════════════════════════════════════════════════

/// Run one session in the configured mode.
///
/// Returns `Ok(None)` only when a windowed worker had to be detached
/// because it didn't stop in time.
pub fn run(cfg: AppConfig) -> Result<Option<SessionSummary>, ControllerError> {
    cfg.classifier.validate()?;
    info!(
        "mode={:?} source={:?} keys={} (left={} right={} jump={} stop={})",
        cfg.mode, cfg.source, cfg.backend,
        cfg.bindings.left, cfg.bindings.right, cfg.bindings.jump, cfg.bindings.stop,
    );
    match cfg.mode {
        Mode::Headless => run_headless(&cfg, open_backend(cfg.backend)).map(Some),
        Mode::Windowed => run_windowed(&cfg),
    }
}

/// Single-threaded loop; gesture changes go to the log.
pub fn run_headless(
    cfg: &AppConfig,
    backend: Box<dyn KeyboardBackend>,
) -> Result<SessionSummary, ControllerError> {
    let source = make_source(cfg, None, cfg.realtime)?;
    let classifier = GestureClassifier::new(cfg.classifier.clone())?;
    let actuator = Actuator::new(cfg.bindings.clone(), backend);
    Session::new(source, classifier, actuator, HeadlessPresenter::new()).run()
}

fn run_windowed(cfg: &AppConfig) -> Result<Option<SessionSummary>, ControllerError> {
    // ── Sim input channel (window keyboard → synthetic body) ──────────────
    let (sim_tx, sim_rx) = match cfg.source {
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel();
            (Some(tx), Some(rx))
        }
        _ => (None, None),
    };

    // ── Window first, so a missing display fails before anything runs ────
    let mut vis = Visualizer::new(TITLE, sim_tx)?;

    // ── Worker (owns source, classifier and actuator) ─────────────────────
    let source = make_source(cfg, sim_rx, true)?;
    let source_name = source.name();
    let classifier = GestureClassifier::new(cfg.classifier.clone())?;
    let (bindings, backend) = (cfg.bindings.clone(), cfg.backend);
    let worker = Worker::spawn(
        source,
        classifier,
        move || Actuator::new(bindings, open_backend(backend)),
        cfg.channel_capacity,
    )?;

    // ── Render loop ───────────────────────────────────────────────────────
    let mut latest = None;
    let mut outcome = Ok(());
    while vis.is_open() && vis.poll_input() {
        if let Some(s) = worker.latest() {
            latest = Some(s);
        }
        let status = if worker.is_finished() {
            format!("{} stream ended - esc to close", source_name)
        } else {
            format!("source {}  keys {}", source_name, cfg.backend)
        };
        if let Err(e) = vis.render(latest.as_ref(), &status) {
            outcome = Err(e);
            break;
        }
    }

    // Closing the window also closes the sim input channel.
    drop(vis);
    let summary = worker.shutdown(cfg.shutdown_timeout)?;
    outcome?;
    Ok(summary)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionEnd;
    use key_actuator::{Key, KeyEvent, RecordingBackend};

    fn headless(source: SourceKind) -> AppConfig {
        AppConfig { mode: Mode::Headless, source, ..AppConfig::default() }
    }

    #[test]
    fn headless_script_runs_the_whole_demo() {
        let cfg = headless(SourceKind::Script);
        let rec = RecordingBackend::default();
        let summary = run_headless(&cfg, Box::new(rec.clone())).unwrap();

        assert_eq!(summary.frames, Script::demo(cfg.fps).frame_count() as u64);
        assert_eq!(summary.end, SessionEnd::EndOfStream);
        assert!(rec.events().contains(&KeyEvent::Down(Key::Space)));
        assert!(rec.held().is_empty());
    }

    #[test]
    fn custom_bindings_reach_the_backend() {
        let cfg = AppConfig {
            bindings: KeyBindings { left: Key::Left, right: Key::Right, ..KeyBindings::default() },
            ..headless(SourceKind::Script)
        };
        let rec = RecordingBackend::default();
        run_headless(&cfg, Box::new(rec.clone())).unwrap();
        let events = rec.events();
        assert!(events.contains(&KeyEvent::Down(Key::Left)));
        assert!(events.contains(&KeyEvent::Down(Key::Right)));
        assert!(!events.contains(&KeyEvent::Down(Key::Char('a'))));
    }

    #[test]
    fn sim_source_needs_a_window() {
        let err = run_headless(&headless(SourceKind::Sim), Box::new(RecordingBackend::default()));
        assert!(matches!(err, Err(ControllerError::Usage(_))));
    }

    #[test]
    fn bad_classifier_settings_are_rejected() {
        let mut cfg = headless(SourceKind::Script);
        cfg.classifier.history_length = 0;
        assert!(matches!(run(cfg), Err(ControllerError::Config(_))));
    }
}
