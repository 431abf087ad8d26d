//! pose_controller — play a side-scroller by jogging, jumping and dropping
//! your arms in front of the camera.

use clap::Parser;
use env_logger::Env;
use gesture_classifier::{ClassifierConfig, Direction, DirectionMode};
use key_actuator::{BackendKind, Key, KeyBindings};
use log::info;
use pose_controller::app::{run, AppConfig, Mode, SourceKind};
use pose_model::FrameSize;

#[derive(Parser, Debug)]
#[command(name = "pose_controller", version, about = "Drive a side-scrolling game with body gestures")]
struct Args {
    /// Log gesture changes instead of opening a window.
    #[arg(long)]
    headless: bool,

    /// Where pose landmarks come from.
    #[arg(long, value_enum, default_value_t = SourceKind::Sim)]
    source: SourceKind,

    /// Keyboard backend: null, log or enigo.
    #[arg(long, default_value = "log")]
    keys: BackendKind,

    #[arg(long, default_value = "a")]
    left: Key,

    #[arg(long, default_value = "d")]
    right: Key,

    #[arg(long, default_value = "space")]
    jump: Key,

    #[arg(long = "stop-key", default_value = "s")]
    stop_key: Key,

    /// Also tap the stop key when both arms drop.
    #[arg(long)]
    stop_tap: bool,

    /// Always move this way instead of following your position.
    #[arg(long, value_parser = parse_direction)]
    fixed_direction: Option<Direction>,

    /// Frame rate of the sim and script sources.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Pace the script source in real time when headless.
    #[arg(long)]
    realtime: bool,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "left"  => Ok(Direction::Left),
        "right" => Ok(Direction::Right),
        _ => Err(format!("expected left or right, got {:?}", s)),
    }
}

impl Args {
    fn into_config(self) -> AppConfig {
        let direction_mode = match self.fixed_direction {
            Some(d) => DirectionMode::Fixed(d),
            None    => DirectionMode::Tracked,
        };
        AppConfig {
            mode:       if self.headless { Mode::Headless } else { Mode::Windowed },
            source:     self.source,
            backend:    self.keys,
            bindings:   KeyBindings {
                left:  self.left,
                right: self.right,
                jump:  self.jump,
                stop:  self.stop_key,
            },
            classifier: ClassifierConfig {
                direction_mode,
                stop_tap: self.stop_tap,
                ..ClassifierConfig::default()
            },
            fps:        self.fps,
            frame:      FrameSize::new(self.width, self.height),
            realtime:   self.realtime,
            ..AppConfig::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cfg = Args::parse().into_config();

    eprintln!();
    eprintln!("╔══════════════════════════════════════════════════════════════╗");
    eprintln!("║          Pose Controller — jog, jump, stop to play           ║");
    eprintln!("╚══════════════════════════════════════════════════════════════╝");
    eprintln!();

    if cfg!(not(feature = "enigo")) && cfg.backend == BackendKind::Enigo {
        eprintln!("  Built without OS key events (use --features enigo)");
        eprintln!();
    }

    match run(cfg) {
        Ok(Some(s)) => info!(
            "{} frames, {} without a usable pose, {} gesture changes, {} key intents",
            s.frames, s.advisory_frames, s.gesture_changes, s.intents
        ),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
