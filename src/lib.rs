//! Six timed "screen melt" phases played over a captured or loaded image.
//!
//! The crate is the rendering core: a phase state machine, the frame provider
//! that keeps a display-sized copy of the source, the ambient animators and
//! one software renderer per phase. Window, keyboard and image acquisition
//! live in the binary and talk to [`MeltScreen`] only.

pub mod config;
pub mod draw;
pub mod effects;
pub mod error;
pub mod finalize;
pub mod fx;
pub mod provider;
pub mod scheduler;
pub mod screen;
pub mod types;

pub use config::{SessionConfig, SourceChoice};
pub use error::{Error, Result};
pub use finalize::{FINAL_NOTE, Finalizer, Handoff, TextFileHandoff};
pub use provider::FrameProvider;
pub use scheduler::{PHASE_COUNT, PHASE_DURATIONS_MS, Phase, PhaseScheduler, Transition};
pub use screen::{MeltScreen, TICK_INTERVAL};
pub use types::{FrameBuffer, Size};

/// Decode an image file into the RGBA raster the core works from.
pub fn load_image(path: &std::path::Path) -> Result<image::RgbaImage> {
    let decoded = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoded.to_rgba8())
}
