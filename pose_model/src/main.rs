//! pose_script — print the demo choreography as a JSON-lines landmark stream.
//!
//! ```text
//! pose_script --fps 30 | pose_controller --headless --source stdin
//! ```

use std::io::{self, Write};

use clap::Parser;
use pose_model::{FrameSize, Script};

#[derive(Parser, Debug)]
#[command(name = "pose_script", about = "Emit a scripted pose stream as JSON lines")]
struct Args {
    /// Frames per second of the generated stream.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 480)]
    height: u32,
}

fn main() {
    let args = Args::parse();
    let script = Script::demo(args.fps);
    let frame = FrameSize::new(args.width, args.height);

    if let Err(e) = emit(&script, frame) {
        // A closed pipe just means the reader is done with us.
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn emit(script: &Script, frame: FrameSize) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for rec in script.records(frame) {
        let line = rec.to_json_line().map_err(io::Error::other)?;
        writeln!(out, "{}", line)?;
    }
    out.flush()
}
