//! Host-facing facade: one object the window loop drives with ticks, paints,
//! resizes and key presses. All mutation happens on the caller's thread, in
//! the order the host calls in.

use std::time::{Duration, Instant};

use image::RgbaImage;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::effects::{FrameInputs, Renderer, draw_captions};
use crate::finalize::{Finalizer, Handoff};
use crate::fx::{Captions, MELT_MIN_DELTA, Markers, MeltOffsets, rotation_step};
use crate::provider::FrameProvider;
use crate::scheduler::{Phase, PhaseParams, PhaseScheduler, Transition};
use crate::types::{FrameBuffer, Size, BACKGROUND};

/// Fixed interval between ticks (~30 Hz).
pub const TICK_INTERVAL: Duration = Duration::from_millis(33);

pub struct MeltScreen {
    provider: FrameProvider,
    scheduler: PhaseScheduler,
    offsets: MeltOffsets,
    rotation_deg: f32,
    captions: Captions,
    markers: Markers,
    rng: StdRng,
    renderer: Renderer,
    finalizer: Finalizer,
    frame: FrameBuffer,
}

impl MeltScreen {
    /// Build the screen for `display` and enter the first phase at `now`.
    /// A `seed` makes every random choice reproducible.
    pub fn new(display: Size, seed: Option<u64>, handoff: Box<dyn Handoff>, now: Instant) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let renderer = Renderer::new(StdRng::seed_from_u64(rng.random()));
        let mut screen = Self {
            provider: FrameProvider::new(display),
            scheduler: PhaseScheduler::new(),
            offsets: MeltOffsets::default(),
            rotation_deg: 0.0,
            captions: Captions::default(),
            markers: Markers::default(),
            rng,
            renderer,
            finalizer: Finalizer::new(handoff),
            frame: FrameBuffer::filled(display, BACKGROUND),
        };
        screen.start_phase(0, now);
        screen
    }

    pub fn display(&self) -> Size {
        self.provider.display()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.scheduler.phase()
    }

    pub fn phase_index(&self) -> usize {
        self.scheduler.index()
    }

    pub fn params(&self) -> PhaseParams {
        self.scheduler.params()
    }

    pub fn progress(&self, now: Instant) -> f32 {
        self.scheduler.progress(now)
    }

    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished()
    }

    pub fn has_source(&self) -> bool {
        self.provider.has_source()
    }

    pub fn working(&self) -> &FrameBuffer {
        self.provider.working()
    }

    pub fn offsets(&self) -> &[i32] {
        self.offsets.as_slice()
    }

    pub fn rotation_deg(&self) -> f32 {
        self.rotation_deg
    }

    pub fn captions(&self) -> &Captions {
        &self.captions
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Enter phase `index`; past the last phase the sequence is finalized.
    pub fn start_phase(&mut self, index: usize, now: Instant) -> Transition {
        let transition = self.scheduler.start_phase(index, now);
        self.apply(transition);
        transition
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Entered(phase) => {
                let display = self.display();
                self.offsets.reset(display.width, self.scheduler.params().column_width);
                if phase.spawns_markers() {
                    self.markers.reset(&mut self.rng, display);
                } else {
                    self.markers.clear();
                }
            }
            Transition::Finished => self.finish(),
            Transition::AlreadyFinished => {}
        }
    }

    fn finish(&mut self) {
        self.finalizer.run();
        self.provider.blank();
        self.frame.reset(self.display(), BACKGROUND);
        info!("sequence finalized");
    }

    /// One fixed step: ambient animators, then the phase-timeout check.
    /// Does nothing while paused or after the sequence ended.
    pub fn on_tick(&mut self, now: Instant) {
        if self.is_finished() || self.is_paused() {
            return;
        }
        let display = self.display();
        self.captions.tick(&mut self.rng, display);

        match self.scheduler.phase() {
            Some(Phase::Melt) => {
                let max = self.scheduler.params().max_drop_speed;
                let floor = self.provider.working().height;
                self.offsets.drip(&mut self.rng, MELT_MIN_DELTA, max, floor);
            }
            Some(Phase::RotatingDuplicates) => {
                self.rotation_deg += rotation_step(self.scheduler.progress(now));
            }
            Some(Phase::RedSquareMarkers) => self.markers.tick(&mut self.rng, display),
            _ => {}
        }

        if let Some(transition) = self.scheduler.tick(now) {
            self.apply(transition);
        }
    }

    /// Render the current phase plus captions. A phase that has run its full
    /// duration is advanced right after the paint.
    pub fn on_paint(&mut self, now: Instant) -> &FrameBuffer {
        if self.is_finished() {
            self.frame.reset(self.display(), BACKGROUND);
            return &self.frame;
        }

        let progress = self.scheduler.progress(now);
        match self.scheduler.phase() {
            Some(phase) => {
                let inputs = FrameInputs {
                    working: self.provider.working(),
                    progress,
                    params: self.scheduler.params(),
                    offsets: self.offsets.as_slice(),
                    rotation_deg: self.rotation_deg,
                    markers: self.markers.as_slice(),
                };
                self.renderer.render(phase, &inputs, &mut self.frame);
            }
            None => self.frame.copy_from(self.provider.working()),
        }
        draw_captions(&mut self.frame, self.captions.as_slice());

        if !self.is_paused() && progress >= 1.0 {
            let next = self.scheduler.index() + 1;
            self.start_phase(next, now);
        }
        &self.frame
    }

    /// Rebuild the working buffer and the offsets together for a new size.
    pub fn on_resize(&mut self, size: Size) {
        debug!(width = size.width, height = size.height, "display resized");
        self.provider.handle_resize(size);
        if self.is_finished() {
            self.provider.blank();
        }
        self.offsets.reset(size.width, self.scheduler.params().column_width);
        self.frame.reset(size, BACKGROUND);
    }

    pub fn skip(&mut self, now: Instant) -> Transition {
        let transition = self.scheduler.skip(now);
        self.apply(transition);
        transition
    }

    pub fn toggle_pause(&mut self, now: Instant) -> bool {
        self.scheduler.toggle_pause(now)
    }

    /// Replace the source image and restart the sequence from the first phase.
    pub fn set_source(&mut self, image: RgbaImage, now: Instant) {
        info!(width = image.width(), height = image.height(), "source image replaced");
        self.provider.set_source(image);
        self.start_phase(0, now);
        if self.is_finished() {
            self.provider.blank();
        }
    }
}
