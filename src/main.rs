// What you SEE:
// • The source image (camera still or --image file) fills the window.
// • Six effects play one after another, then the window goes black and a
//   closing note opens in your text viewer.
// • Space pauses, / skips to the next phase, R grabs a fresh camera still,
//   ESC quits.

mod camera;
mod window;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use image::RgbaImage;
use melt_screen::draw::draw_text_5x7;
use melt_screen::{
    FrameBuffer, MeltScreen, SessionConfig, Size, SourceChoice, TICK_INTERVAL, TextFileHandoff,
    load_image,
};
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use window::Drawer;

const TITLE: &str = "Melt Screen";
/// Window refresh rate; ticks still run at their own fixed interval.
const TARGET_FPS: usize = 60;

#[derive(Debug, Parser)]
#[command(name = "melt-screen", about = "Timed screen-melt effects over a camera still or an image")]
struct Cli {
    /// Melt this image file instead of a camera still
    #[arg(long, value_name = "FILE", conflicts_with_all = ["camera", "no_capture"])]
    image: Option<PathBuf>,

    /// Camera used for the startup still and for recapture (R)
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    camera: u32,

    /// Start without any source (solid background)
    #[arg(long)]
    no_capture: bool,

    #[arg(long, default_value_t = 1280)]
    width: usize,

    #[arg(long, default_value_t = 720)]
    height: usize,

    /// Seed every random choice for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Where the closing note is written
    #[arg(long, value_name = "FILE")]
    note: Option<PathBuf>,

    /// Write the closing note without opening it
    #[arg(long)]
    no_viewer: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn session(&self) -> SessionConfig {
        let source = match (&self.image, self.no_capture) {
            (Some(path), _) => SourceChoice::File(path.clone()),
            (None, true) => SourceChoice::None,
            (None, false) => SourceChoice::Camera(self.camera),
        };
        SessionConfig {
            source,
            window: Size::new(self.width, self.height),
            seed: self.seed,
            note_path: self.note.clone().unwrap_or_else(TextFileHandoff::default_path),
            launch_viewer: !self.no_viewer,
        }
    }
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(format!("melt_screen={level}").parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

/// Fetch the configured source. Failures leave the screen on its background.
fn acquire(source: &SourceChoice) -> Option<RgbaImage> {
    let result = match source {
        SourceChoice::File(path) => load_image(path),
        SourceChoice::Camera(index) => camera::grab_still(*index),
        SourceChoice::None => return None,
    };
    match result {
        Ok(image) => Some(image),
        Err(err) => {
            warn!(%err, "could not acquire source image; using background");
            None
        }
    }
}

fn hud_text(screen: &MeltScreen) -> String {
    if screen.is_finished() {
        return "DONE | ESC: close".to_string();
    }
    let phase = screen.phase().map(|p| p.name()).unwrap_or("-");
    let state = if screen.is_paused() { " | PAUSED" } else { "" };
    format!("PHASE {}: {}{} | SPACE: pause  /: skip", screen.phase_index(), phase, state)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = cli.session();
    cfg.validate().context("validating options")?;

    let mut drawer = Drawer::new(TITLE, cfg.window, TARGET_FPS)?;
    let handoff = Box::new(cfg.handoff());
    let mut screen = MeltScreen::new(drawer.size(), cfg.seed, handoff, Instant::now());

    if let Some(image) = acquire(&cfg.source) {
        screen.set_source(image, Instant::now());
    }

    /* What is actually pushed to the window: the core frame plus the HUD. */
    let mut shown = FrameBuffer::filled(screen.display(), 0);
    let mut last_tick = Instant::now();
    let mut dirty = true;
    let mut announced_finish = false;

    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        let size = drawer.size();
        if size != screen.display() {
            screen.on_resize(size);
            dirty = true;
        }

        if drawer.space_pressed_once() {
            screen.toggle_pause(now);
            dirty = true;
        }
        if drawer.slash_pressed_once() {
            screen.skip(now);
            dirty = true;
        }
        if drawer.r_pressed_once() {
            match cfg.camera_index() {
                Some(index) => match camera::grab_still(index) {
                    Ok(image) => {
                        screen.set_source(image, now);
                        dirty = true;
                    }
                    Err(err) => warn!(%err, "recapture failed"),
                },
                None => info!("recapture needs a camera source"),
            }
        }

        // Fixed-rate tick; the core ignores it while paused or finished.
        if now.duration_since(last_tick) >= TICK_INTERVAL {
            last_tick = now;
            if !screen.is_paused() && !screen.is_finished() {
                screen.on_tick(now);
                dirty = true;
            }
        }

        if screen.is_finished() && !announced_finish {
            announced_finish = true;
            drawer.set_title(&format!("{TITLE} - done"));
            dirty = true;
        }

        if dirty && !screen.display().is_empty() {
            shown.copy_from(screen.on_paint(now));
            draw_text_5x7(&mut shown, 8, 8, &hud_text(&screen), 1, 0x00_FF_FF_FF, 255);
            drawer.present(&shown)?;
            dirty = false;
        } else {
            drawer.update();
        }
    }

    Ok(())
}
