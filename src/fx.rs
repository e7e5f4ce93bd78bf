// Ambient animators: per-tick state that the renderers read but never write.
// - melt offsets: per-column drip displacement (melt phase only)
// - rotation: carousel angle (rotating-duplicates phase only)
// - captions: floating text rising from below the screen (always)
// - markers: bouncing X squares (marker phase only)
//
// Each animator advances by a fixed step per tick; the tick rate sets the pace.

use rand::Rng;
use tracing::debug;

use crate::types::Size;

/// Lower bound of the per-tick drip delta.
pub const MELT_MIN_DELTA: i32 = -4;
/// Chance per column per tick that a drip snaps back to 0.
pub const MELT_RESET_CHANCE: f64 = 0.003;

pub const CAPTION_SPAWN_CHANCE: f64 = 0.04;
/// Captions are dropped once they rise this far above the top edge.
pub const CAPTION_TOP_MARGIN: f32 = -50.0;
/// Horizontal room kept free for the caption text at the right edge.
pub const CAPTION_RIGHT_MARGIN: usize = 200;

pub const MARKER_START_COUNT: usize = 10;
pub const MARKER_CAP: usize = 200;
pub const MARKER_CLONE_CHANCE: f64 = 0.02;
/// Clones land within this many pixels of their parent on each axis.
pub const MARKER_CLONE_SPREAD: i32 = 20;
/// Velocity components are uniform in [-MARKER_MAX_SPEED, MARKER_MAX_SPEED).
pub const MARKER_MAX_SPEED: f32 = 4.0;

/* ------------------------------ melt offsets ------------------------------ */

/// One vertical displacement per column of `column_width` pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeltOffsets {
    values: Vec<i32>,
}

impl MeltOffsets {
    /// Number of columns needed to span `display_width`, never less than one.
    pub fn column_count(display_width: usize, column_width: usize) -> usize {
        display_width.div_ceil(column_width.max(1)).max(1)
    }

    /// Zero every column and resize for the display.
    pub fn reset(&mut self, display_width: usize, column_width: usize) {
        let cols = Self::column_count(display_width, column_width);
        self.values.clear();
        self.values.resize(cols, 0);
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drip every column by a random delta in `[min_delta, max_delta]`.
    /// Offsets never go below `-floor_height`; now and then a column snaps back to 0.
    pub fn drip<R: Rng + ?Sized>(&mut self, rng: &mut R, min_delta: i32, max_delta: i32, floor_height: usize) {
        let floor = -(floor_height as i32);
        let (lo, hi) = (min_delta.min(max_delta), min_delta.max(max_delta));
        for offset in &mut self.values {
            let change = rng.random_range(lo..=hi);
            *offset = (*offset + change).max(floor);
            if rng.random_bool(MELT_RESET_CHANCE) {
                *offset = 0;
            }
        }
    }
}

/* -------------------------------- rotation -------------------------------- */

/// Degrees the carousel turns in one tick: a base rate that speeds up with progress.
pub fn rotation_step(progress: f32) -> f32 {
    6.0 + 18.0 * progress.clamp(0.0, 1.0)
}

/* -------------------------------- captions -------------------------------- */

/// One floating caption. Visual: a line of text drifting up the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Caption {
    pub x: f32,
    pub y: f32,
    pub speed: f32, // px per tick, fixed at spawn
}

#[derive(Debug, Clone, Default)]
pub struct Captions {
    items: Vec<Caption>,
}

impl Captions {
    pub fn as_slice(&self) -> &[Caption] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, caption: Caption) {
        self.items.push(caption);
    }

    /// Maybe spawn one caption below the bottom edge, then move all of them up.
    /// Captions that leave the top margin are removed; survivors keep their order.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, display: Size) {
        if rng.random_bool(CAPTION_SPAWN_CHANCE) {
            let span = display.width.saturating_sub(CAPTION_RIGHT_MARGIN).max(1);
            let x = rng.random_range(0..span) as f32;
            let y = display.height as f32 + rng.random_range(5..80) as f32;
            let speed = 1.0 + rng.random::<f32>() * 2.0;
            self.items.push(Caption { x, y, speed });
        }

        for c in &mut self.items {
            c.y -= c.speed;
        }
        self.items.retain(|c| c.y >= CAPTION_TOP_MARGIN);
    }
}

/* --------------------------------- markers -------------------------------- */

/// A bouncing X square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Markers {
    items: Vec<Marker>,
}

fn random_velocity<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random::<f32>() * 2.0 * MARKER_MAX_SPEED - MARKER_MAX_SPEED
}

/// A fresh marker within `MARKER_CLONE_SPREAD` pixels of `parent`, with its own velocity.
fn clone_near<R: Rng + ?Sized>(rng: &mut R, parent: &Marker) -> Marker {
    let spread = MARKER_CLONE_SPREAD;
    Marker {
        x: parent.x + rng.random_range(-spread..spread) as f32,
        y: parent.y + rng.random_range(-spread..spread) as f32,
        vx: random_velocity(rng),
        vy: random_velocity(rng),
    }
}

impl Markers {
    pub fn as_slice(&self) -> &[Marker] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, marker: Marker) {
        self.items.push(marker);
    }

    /// Replace the set with `MARKER_START_COUNT` markers scattered over the display.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R, display: Size) {
        self.items.clear();
        for _ in 0..MARKER_START_COUNT {
            let x = rng.random_range(0..display.width.max(1)) as f32;
            let y = rng.random_range(0..display.height.max(1)) as f32;
            let vx = random_velocity(rng);
            let vy = random_velocity(rng);
            self.items.push(Marker { x, y, vx, vy });
        }
    }

    /// Move every marker and reflect velocity on the axis whose bound it crossed.
    /// Positions are not clamped. Occasionally a marker spawns a nearby clone,
    /// never beyond `MARKER_CAP`; clones move in the same tick.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, display: Size) {
        let (w, h) = (display.width as f32, display.height as f32);
        let mut i = 0;
        while i < self.items.len() {
            let m = &mut self.items[i];
            m.x += m.vx;
            m.y += m.vy;
            if m.x < 0.0 || m.x > w {
                m.vx = -m.vx;
            }
            if m.y < 0.0 || m.y > h {
                m.vy = -m.vy;
            }
            let parent = *m;

            if self.items.len() < MARKER_CAP && rng.random_bool(MARKER_CLONE_CHANCE) {
                self.items.push(clone_near(rng, &parent));
                debug!(count = self.items.len(), "marker cloned");
            }
            i += 1;
        }
    }
}
