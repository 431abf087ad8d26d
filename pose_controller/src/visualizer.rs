//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌───────────────────────────────────────────┬─────────────────┐
//! │  video area (mirrored)                    │  GESTURE        │
//! │   ── jump line (blue) ──────────────────  │  Moving Right ->│
//! │        o   skeleton                       │                 │
//! │       /|\             │ centre (green)    │  stop / jump    │
//! │   ── stop line (red) ───────────────────  │  movement meter │
//! │        advisory text                      │  held keys      │
//! ├───────────────────────────────────────────┴─────────────────┤
//! │  status bar / key legend                                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Drawing goes to a [`Canvas`] so it can be tested without a window.

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use pose_model::{Pose, SKELETON};

use crate::session::Snapshot;
use crate::source::{SimInput, SimKey};
use crate::ControllerError;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 960;
pub const WIN_H:      usize = 560;
const VIDEO_X:        usize = 12;
const VIDEO_Y:        usize = 12;
const VIDEO_W:        usize = 640;
const VIDEO_H:        usize = 480;
const PANEL_X:        usize = VIDEO_X + VIDEO_W + 16;
const STATUS_Y:       usize = WIN_H - 48;

const BG_COLOR:       u32 = 0xFF1A1A2E;
const VIDEO_BG:       u32 = 0xFF101018;
const TEXT_BG:        u32 = 0xFF0F3460;
const BONE_COLOR:     u32 = 0xFFE0E0E0;
const JOINT_COLOR:    u32 = 0xFFFFD700;
const FAINT_COLOR:    u32 = 0xFF666666;  // low-visibility joints
const STOP_COLOR:     u32 = 0xFFFF3030;
const JUMP_COLOR:     u32 = 0xFF3070FF;
const CENTER_COLOR:   u32 = 0xFF30D050;
const ADVISORY_COLOR: u32 = 0xFFFFB000;
const LABEL_COLOR:    u32 = 0xFFEEEEEE;
const DIM_COLOR:      u32 = 0xFF888888;

const LEGEND: &str = "<- -> step  space jog  up jump  down lower arms  w hand  h leave  esc quit";

// ════════════════════════════════════════════════════════════════════════════
// Canvas — ARGB framebuffer with a few drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    w:   usize,
    h:   usize,
    buf: Vec<u32>,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { w, h, buf: vec![BG_COLOR; w * h] }
    }

    pub fn buffer(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.w && y < self.h).then(|| self.buf[y * self.w + x])
    }

    pub fn clear(&mut self, color: u32) { self.buf.fill(color); }

    /// Off-canvas coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.buf[y as usize * self.w + x as usize] = color;
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    /// Bresenham line, clipped per pixel.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let (mut x, mut y) = (x0, y0);
        let dx =  (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    pub fn dot(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Draw `text` with the 3×5 font, each font pixel `scale`² screen pixels.
    /// Returns the width drawn.
    pub fn text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) -> usize {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            if cx + 4 * scale > self.w { break; }
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
        }
        cx - x
    }
}

pub fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale.max(1)
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

/// Map a normalized coordinate into the video area.  Far off-frame values
/// are pulled in to keep line drawing bounded.
fn to_video(x: f32, y: f32) -> (i32, i32) {
    let (x, y) = (x.clamp(-1.0, 2.0), y.clamp(-1.0, 2.0));
    (
        VIDEO_X as i32 + (x * VIDEO_W as f32).round() as i32,
        VIDEO_Y as i32 + (y * VIDEO_H as f32).round() as i32,
    )
}

/// Render one frame of the UI into `canvas` (sized `WIN_W × WIN_H`).
pub fn draw_scene(canvas: &mut Canvas, snapshot: Option<&Snapshot>, status: &str) {
    canvas.clear(BG_COLOR);
    canvas.fill_rect(VIDEO_X, VIDEO_Y, VIDEO_W, VIDEO_H, VIDEO_BG);

    match snapshot {
        Some(s) => {
            draw_guides(canvas, s);
            if let Some(pose) = &s.pose {
                draw_skeleton(canvas, pose);
            }
            if let Some(a) = s.advisory {
                draw_centered(canvas, a.message(), VIDEO_Y + VIDEO_H - 40, 2, ADVISORY_COLOR);
            }
            draw_panel(canvas, s);
        }
        None => {
            draw_centered(canvas, "waiting for frames", VIDEO_Y + VIDEO_H / 2, 3, DIM_COLOR);
        }
    }

    // ── Status bar ────────────────────────────────────────────────────────
    canvas.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
    canvas.text(status, 10, STATUS_Y + 10, 2, LABEL_COLOR);
    canvas.text(LEGEND, 10, WIN_H - 14, 1, DIM_COLOR);
}

fn draw_centered(canvas: &mut Canvas, text: &str, y: usize, scale: usize, color: u32) {
    let w = text_width(text, scale);
    let x = VIDEO_X + VIDEO_W.saturating_sub(w) / 2;
    canvas.text(text, x, y, scale, color);
}

fn draw_guides(canvas: &mut Canvas, s: &Snapshot) {
    let x_left  = VIDEO_X as i32;
    let x_right = (VIDEO_X + VIDEO_W - 1) as i32;

    let (_, stop_y) = to_video(0.0, s.thresholds.stop());
    let (_, jump_y) = to_video(0.0, s.thresholds.jump());
    canvas.line(x_left, stop_y, x_right, stop_y, STOP_COLOR);
    canvas.line(x_left, jump_y, x_right, jump_y, JUMP_COLOR);

    let (mid_x, _) = to_video(0.5, 0.0);
    canvas.line(mid_x, VIDEO_Y as i32, mid_x, (VIDEO_Y + VIDEO_H - 1) as i32, CENTER_COLOR);

    canvas.text("jump", VIDEO_X + 4, (jump_y.max(6) - 6) as usize, 1, JUMP_COLOR);
    canvas.text("stop", VIDEO_X + 4, (stop_y.max(6) - 6) as usize, 1, STOP_COLOR);
}

fn draw_skeleton(canvas: &mut Canvas, pose: &Pose) {
    for (a, b) in SKELETON {
        let (pa, pb) = (pose[a], pose[b]);
        let (x0, y0) = to_video(pa.x, pa.y);
        let (x1, y1) = to_video(pb.x, pb.y);
        canvas.line(x0, y0, x1, y1, BONE_COLOR);
    }
    for lm in pose.iter() {
        let (x, y) = to_video(lm.x, lm.y);
        let color = if lm.visibility > 0.7 { JOINT_COLOR } else { FAINT_COLOR };
        canvas.dot(x, y, 3, color);
    }
}

fn draw_panel(canvas: &mut Canvas, s: &Snapshot) {
    let x = PANEL_X;
    canvas.text("GESTURE", x, VIDEO_Y, 2, DIM_COLOR);
    let label = format!("{} {}", s.gesture.label(), s.gesture.glyph());
    canvas.text(label.trim_end(), x, VIDEO_Y + 20, 3, LABEL_COLOR);

    let mut y = VIDEO_Y + 70;
    for (line, color) in [
        (format!("stop  {:.2}", s.thresholds.stop()), STOP_COLOR),
        (format!("jump  {:.2}", s.thresholds.jump()), JUMP_COLOR),
        (format!("facing {}", s.direction), CENTER_COLOR),
    ] {
        canvas.text(&line, x, y, 2, color);
        y += 20;
    }

    // ── Movement meter ────────────────────────────────────────────────────
    y += 10;
    canvas.text("movement", x, y, 2, DIM_COLOR);
    y += 16;
    let meter_w = WIN_W - x - 16;
    let limit = (s.diff_threshold * 2.0).max(1.0);
    let fill = ((s.movement / limit).clamp(0.0, 1.0) * meter_w as f32) as usize;
    canvas.fill_rect(x, y, meter_w, 12, TEXT_BG);
    canvas.fill_rect(x, y, fill, 12, if s.movement > s.diff_threshold { CENTER_COLOR } else { DIM_COLOR });
    let mark = x + meter_w / 2;
    canvas.fill_rect(mark, y.saturating_sub(2), 1, 16, LABEL_COLOR);
    y += 28;

    // ── Keys ──────────────────────────────────────────────────────────────
    let held = s.held_key.map_or("-", |k| k.name());
    canvas.text(&format!("holding {}", held), x, y, 2, LABEL_COLOR);
    y += 20;
    if s.jumping {
        canvas.text("jump held", x, y, 2, JUMP_COLOR);
        y += 20;
    }
    if s.stopped {
        canvas.text("arms down", x, y, 2, STOP_COLOR);
        y += 20;
    }
    canvas.text(&format!("frame {}", s.frame_index), x, y + 10, 1, DIM_COLOR);
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    /// Present only when the simulated body is in use.
    sim_tx: Option<Sender<SimInput>>,
}

impl Visualizer {
    pub fn new(title: &str, sim_tx: Option<Sender<SimInput>>) -> Result<Self, ControllerError> {
        let mut window = Window::new(
            title,
            WIN_W, WIN_H,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )
        .map_err(|e| ControllerError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, canvas: Canvas::new(WIN_W, WIN_H), sim_tx })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard input, forwarding simulation keys.  Returns false when
    /// the window should close.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() || self.window.is_key_down(Key::Escape) {
            return false;
        }
        let Some(tx) = &self.sim_tx else { return true };

        const BINDINGS: [(Key, SimKey); 7] = [
            (Key::Left,  SimKey::StepLeft),
            (Key::Right, SimKey::StepRight),
            (Key::Space, SimKey::Jog),
            (Key::Up,    SimKey::Jump),
            (Key::Down,  SimKey::LowerArms),
            (Key::W,     SimKey::OccludeWrist),
            (Key::H,     SimKey::Leave),
        ];
        for (key, sim) in BINDINGS {
            // Stepping repeats while held; everything else is edge-triggered.
            let repeat = if matches!(sim, SimKey::StepLeft | SimKey::StepRight) {
                KeyRepeat::Yes
            } else {
                KeyRepeat::No
            };
            if self.window.is_key_pressed(key, repeat) {
                let _ = tx.send(SimInput::KeyDown(sim));
            }
            if self.window.is_key_released(key) {
                let _ = tx.send(SimInput::KeyUp(sim));
            }
        }
        true
    }

    pub fn render(&mut self, snapshot: Option<&Snapshot>, status: &str) -> Result<(), ControllerError> {
        draw_scene(&mut self.canvas, snapshot, status);
        self.window
            .update_with_buffer(self.canvas.buffer(), WIN_W, WIN_H)
            .map_err(|e| ControllerError::Window(e.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '^' => [0b010, 0b101, 0b000, 0b000, 0b000],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_classifier::{Advisory, Direction, Gesture, Thresholds};
    use pose_model::{BodyModel, FrameSize, Landmark};

    fn snapshot(pose: Option<Pose>) -> Snapshot {
        Snapshot {
            frame_index:    7,
            frame_size:     FrameSize::default(),
            pose,
            gesture:        Gesture::MovingRight,
            advisory:       None,
            thresholds:     Thresholds::new(0.75, 0.25),
            direction:      Direction::Right,
            held_key:       None,
            jumping:        false,
            stopped:        false,
            movement:       250.0,
            diff_threshold: 200.0,
        }
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut c = Canvas::new(20, 20);
        c.line(2, 3, 15, 11, 0xFF123456);
        assert_eq!(c.pixel(2, 3), Some(0xFF123456));
        assert_eq!(c.pixel(15, 11), Some(0xFF123456));
    }

    #[test]
    fn off_canvas_drawing_is_ignored() {
        let mut c = Canvas::new(10, 10);
        c.line(-50, -50, 500, 500, 0xFFFFFFFF);
        c.dot(-3, 4, 2, 0xFFFFFFFF);
        c.set_pixel(10, 0, 0xFFFFFFFF);
        assert_eq!(c.pixel(0, 0), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(10, 0), None);
    }

    #[test]
    fn text_width_scales() {
        let mut c = Canvas::new(200, 40);
        assert_eq!(c.text("Moving Left <-", 0, 0, 2, LABEL_COLOR), text_width("Moving Left <-", 2));
        assert_eq!(text_width("ab", 3), 24);
    }

    #[test]
    fn threshold_lines_are_drawn_at_their_heights() {
        let mut c = Canvas::new(WIN_W, WIN_H);
        draw_scene(&mut c, Some(&snapshot(None)), "ok");

        let stop_y = VIDEO_Y + (0.75 * VIDEO_H as f32) as usize;
        let jump_y = VIDEO_Y + (0.25 * VIDEO_H as f32) as usize;
        let probe_x = VIDEO_X + VIDEO_W - 20;
        assert_eq!(c.pixel(probe_x, stop_y), Some(STOP_COLOR));
        assert_eq!(c.pixel(probe_x, jump_y), Some(JUMP_COLOR));
        assert_eq!(c.pixel(VIDEO_X + VIDEO_W / 2, VIDEO_Y + 5), Some(CENTER_COLOR));
    }

    #[test]
    fn skeleton_is_drawn_inside_the_video_area() {
        let mut c = Canvas::new(WIN_W, WIN_H);
        let pose = BodyModel::at(0.3).pose();
        draw_scene(&mut c, Some(&snapshot(Some(pose.clone()))), "");
        let nose = pose[pose_model::PoseLandmark::Nose];
        let (x, y) = to_video(nose.x, nose.y);
        assert_eq!(c.pixel(x as usize, y as usize), Some(JOINT_COLOR));
    }

    #[test]
    fn wild_coordinates_do_not_panic() {
        let mut c = Canvas::new(WIN_W, WIN_H);
        let pose = Pose::uniform(Landmark::new(-40.0, 1e6, 1.0));
        let mut s = snapshot(Some(pose));
        s.advisory = Some(Advisory::PartiallyVisible);
        s.movement = f32::NAN;
        draw_scene(&mut c, Some(&s), "status");
        draw_scene(&mut c, None, "");
    }
}
