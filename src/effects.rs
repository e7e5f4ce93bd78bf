// The six phase renderers. Each one reads the working buffer plus the state the
// animators own and paints a full frame into `out`; none of them touch that
// state. The only randomness here (melt splashes, static noise) comes from the
// renderer's own generator.

use rand::{Rng, rngs::StdRng};

use crate::draw::{
    blit_rect, blit_scaled, draw_text_5x7, draw_thick_line, fill_ellipse, fill_rect, scale_nearest,
    scale_smooth,
};
use crate::fx::{Caption, Marker};
use crate::scheduler::{Phase, PhaseParams};
use crate::types::{FrameBuffer, Size, BACKGROUND};

pub const CAPTION_TEXT: &str = "moggado pelo jodismiu";
const CAPTION_SCALE: i32 = 2;
const CAPTION_ALPHA: u8 = 220;
const WHITE: u32 = 0x00_FF_FF_FF;

const SPLASH_COUNT: usize = 30;
const SPLASH_COLOR: u32 = 0x00_FF_DC_A0;
const SPLASH_ALPHA: u8 = 60;

const ZOOM_MAX_EXTRA: f32 = 0.6;
const ZOOM_TINT: u32 = 0x00_FF_FF_C8;

const THUMB_DIVISOR: usize = 6;
const THUMB_MIN: usize = 8;
const CAROUSEL_RADIUS: f32 = 0.35;

const NOISE_BLOCK: usize = 4;

const PIXEL_BLOCK_START: f32 = 8.0;
const PIXEL_BLOCK_END: f32 = 40.0;

const SQUARE_COLOR: u32 = 0x00_C8_00_00;
const SQUARE_ALPHA: u8 = 220;
const MARKER_SIZE: i32 = 28;
const MARKER_COLOR: u32 = 0x00_FF_00_00;
const MARKER_INSET: i32 = 4;
const MARKER_STROKE: i32 = 3;

/// Everything a renderer may read for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub working: &'a FrameBuffer,
    pub progress: f32,
    pub params: PhaseParams,
    pub offsets: &'a [i32],
    pub rotation_deg: f32,
    pub markers: &'a [Marker],
}

impl FrameInputs<'_> {
    fn size(&self) -> Size {
        self.working.size()
    }
}

/// Dispatches a phase to its renderer.
pub struct Renderer {
    rng: StdRng,
}

impl Renderer {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Paint `phase` into `out`, which ends up the size of the working buffer.
    pub fn render(&mut self, phase: Phase, input: &FrameInputs<'_>, out: &mut FrameBuffer) {
        match phase {
            Phase::Melt => {
                melt_columns(input, out);
                melt_splashes(&mut self.rng, out);
            }
            Phase::ZoomLag => zoom_lag(input, out),
            Phase::RotatingDuplicates => rotating_duplicates(input, out),
            Phase::StaticNoise => static_noise(&mut self.rng, input, out),
            Phase::Pixelate => pixelate(input, out),
            Phase::RedSquareMarkers => red_square_markers(input, out),
        }
    }
}

/// Every column of `column_width` pixels is copied from the working buffer,
/// shifted down by its offset (up when negative). Exposed areas stay background.
pub fn melt_columns(input: &FrameInputs<'_>, out: &mut FrameBuffer) {
    let Size { width: w, height: h } = input.size();
    out.reset(input.size(), BACKGROUND);
    let cw = input.params.column_width.max(1);
    let (w, h) = (w as i32, h as i32);

    for (col, &dy) in input.offsets.iter().enumerate() {
        let sx = (col * cw) as i32;
        if sx >= w {
            break;
        }
        // Wholly below the screen.
        if dy >= h {
            continue;
        }
        let sw = (cw as i32).min(w - sx);
        let visible_y = dy.max(0);
        let visible_h = h - visible_y;
        if visible_h <= 0 {
            continue;
        }
        let src_y = visible_y - dy;
        blit_rect(out, input.working, sx, src_y, sx, visible_y, sw, visible_h);
    }
}

/// Soft warm blobs sprinkled over the melt, fresh every frame.
fn melt_splashes(rng: &mut StdRng, out: &mut FrameBuffer) {
    if out.size().is_empty() {
        return;
    }
    for _ in 0..SPLASH_COUNT {
        let cx = rng.random_range(0..out.width) as i32;
        let cy = rng.random_range(0..out.height) as i32;
        let rw = rng.random_range(20..120);
        let rh = rng.random_range(10..60);
        fill_ellipse(out, cx - rw / 2, cy - rh / 2, rw, rh, SPLASH_COLOR, SPLASH_ALPHA);
    }
}

/// Scale about the center from 1x to 1.6x, under a tint that thickens with progress.
pub fn zoom_lag(input: &FrameInputs<'_>, out: &mut FrameBuffer) {
    let size = input.size();
    out.reset(size, BACKGROUND);
    let p = input.progress.clamp(0.0, 1.0);
    let zoom = 1.0 + ZOOM_MAX_EXTRA * p;
    let (w, h) = (size.width as f32, size.height as f32);
    let (sw, sh) = (w * zoom, h * zoom);
    blit_scaled(out, input.working, (w - sw) / 2.0, (h - sh) / 2.0, sw, sh);

    let alpha = (60.0 + 120.0 * p) as u8;
    fill_rect(out, 0, 0, size.width as i32, size.height as i32, ZOOM_TINT, alpha);
}

/// A ring of thumbnails around the center. Each copy sits at the shared angle
/// plus its slot, and pulses in size with |sin| of its angle.
pub fn rotating_duplicates(input: &FrameInputs<'_>, out: &mut FrameBuffer) {
    let size = input.size();
    out.reset(size, BACKGROUND);
    let n = input.params.duplicate_count;
    if n == 0 || size.is_empty() {
        return;
    }

    let thumb_size = Size::new(
        (size.width / THUMB_DIVISOR).max(THUMB_MIN),
        (size.height / THUMB_DIVISOR).max(THUMB_MIN),
    );
    let thumb = scale_smooth(input.working, thumb_size);
    let (tw, th) = (thumb_size.width as f32, thumb_size.height as f32);

    let radius = size.width.min(size.height) as f32 * CAROUSEL_RADIUS;
    let (cx, cy) = (size.width as f32 / 2.0, size.height as f32 / 2.0);
    let angle = input.rotation_deg;

    for i in 0..n {
        let a = angle + i as f32 * (360.0 / n as f32);
        let rad = a.to_radians();
        let x = cx + radius * rad.cos() - tw / 2.0;
        let y = cy + radius * rad.sin() - th / 2.0;

        let scale = 0.7 + 0.6 * (a + angle).to_radians().sin().abs();
        let dw = (tw * scale) as i32;
        let dh = (th * scale) as i32;
        let dx = x as i32 - dw / 2 + thumb_size.width as i32 / 2;
        let dy = y as i32 - dh / 2 + thumb_size.height as i32 / 2;
        blit_scaled(out, &thumb, dx as f32, dy as f32, dw as f32, dh as f32);
    }
}

/// The working buffer buried under opaque random gray blocks.
pub fn static_noise(rng: &mut StdRng, input: &FrameInputs<'_>, out: &mut FrameBuffer) {
    out.copy_from(input.working);
    for y in (0..out.height).step_by(NOISE_BLOCK) {
        for x in (0..out.width).step_by(NOISE_BLOCK) {
            let v = rng.random::<u8>() as u32;
            let gray = (v << 16) | (v << 8) | v;
            let b = NOISE_BLOCK as i32;
            fill_rect(out, x as i32, y as i32, b, b, gray, 255);
        }
    }
}

/// Side of a pixelation block at `progress`, growing from 8 to 40.
pub fn pixel_block(progress: f32) -> usize {
    let p = progress.clamp(0.0, 1.0);
    ((PIXEL_BLOCK_START + (PIXEL_BLOCK_END - PIXEL_BLOCK_START) * p) as usize).max(1)
}

/// Nearest-neighbor down to one sample per block, then back up.
pub fn pixelate(input: &FrameInputs<'_>, out: &mut FrameBuffer) {
    let size = input.size();
    let block = pixel_block(input.progress);
    let small_size = Size::new((size.width / block).max(1), (size.height / block).max(1));
    let small = scale_nearest(input.working, small_size);
    *out = scale_nearest(&small, size);
}

/// A red square growing from the center to the full display, with the
/// bouncing X markers drawn on top.
pub fn red_square_markers(input: &FrameInputs<'_>, out: &mut FrameBuffer) {
    out.copy_from(input.working);
    let p = input.progress.clamp(0.0, 1.0);
    let (w, h) = (out.width as f32, out.height as f32);
    fill_rect(
        out,
        (w * (0.5 - 0.5 * p)) as i32,
        (h * (0.5 - 0.5 * p)) as i32,
        (w * p) as i32,
        (h * p) as i32,
        SQUARE_COLOR,
        SQUARE_ALPHA,
    );

    for m in input.markers {
        let left = m.x as i32 - MARKER_SIZE / 2;
        let top = m.y as i32 - MARKER_SIZE / 2;
        let (right, bottom) = (left + MARKER_SIZE, top + MARKER_SIZE);
        fill_rect(out, left, top, MARKER_SIZE, MARKER_SIZE, MARKER_COLOR, 255);
        let i = MARKER_INSET;
        draw_thick_line(out, left + i, top + i, right - i, bottom - i, MARKER_STROKE, WHITE);
        draw_thick_line(out, left + i, bottom - i, right - i, top + i, MARKER_STROKE, WHITE);
    }
}

/// Shared decoration drawn over every phase.
pub fn draw_captions(out: &mut FrameBuffer, captions: &[Caption]) {
    for c in captions {
        draw_text_5x7(out, c.x as i32, c.y as i32, CAPTION_TEXT, CAPTION_SCALE, WHITE, CAPTION_ALPHA);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::blend;
    use crate::types::unpack_rgb;
    use rand::SeedableRng;

    fn gradient(w: usize, h: usize) -> FrameBuffer {
        FrameBuffer {
            width: w,
            height: h,
            pixels: (0..(w * h) as u32).map(|i| i * 7919 & 0x00FF_FFFF).collect(),
        }
    }

    fn inputs<'a>(working: &'a FrameBuffer, offsets: &'a [i32], markers: &'a [Marker]) -> FrameInputs<'a> {
        FrameInputs {
            working,
            progress: 0.0,
            params: PhaseParams::default(),
            offsets,
            rotation_deg: 0.0,
            markers,
        }
    }

    #[test]
    fn melt_shifts_each_column_by_its_offset() {
        let working = gradient(6, 4);
        let offsets = [0, 2, -1];
        let mut input = inputs(&working, &offsets, &[]);
        input.params.column_width = 2;
        let mut out = FrameBuffer::filled(Size::new(1, 1), 0);
        melt_columns(&input, &mut out);

        assert_eq!(out.size(), working.size());
        for y in 0..4 {
            assert_eq!(out.get(0, y), working.get(0, y));
            assert_eq!(out.get(1, y), working.get(1, y));
        }
        // Column 1 dropped by two rows.
        assert_eq!(out.get(2, 0), BACKGROUND);
        assert_eq!(out.get(3, 1), BACKGROUND);
        assert_eq!(out.get(2, 2), working.get(2, 0));
        assert_eq!(out.get(3, 3), working.get(3, 1));
        // Column 2 lifted by one row.
        assert_eq!(out.get(4, 0), working.get(4, 1));
        assert_eq!(out.get(5, 2), working.get(5, 3));
        assert_eq!(out.get(4, 3), BACKGROUND);
    }

    #[test]
    fn melt_skips_columns_below_the_screen_and_partial_last_column() {
        let working = gradient(5, 3);
        let offsets = [3, 0];
        let mut input = inputs(&working, &offsets, &[]);
        input.params.column_width = 4;
        let mut out = FrameBuffer::filled(Size::new(5, 3), 0);
        melt_columns(&input, &mut out);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(out.get(x, y), BACKGROUND);
            }
            assert_eq!(out.get(4, y), working.get(4, y));
        }
    }

    #[test]
    fn zoom_at_start_is_the_working_buffer_under_a_light_tint() {
        let working = gradient(8, 6);
        let input = inputs(&working, &[], &[]);
        let mut out = FrameBuffer::filled(Size::new(1, 1), 0);
        zoom_lag(&input, &mut out);
        for (o, w) in out.pixels.iter().zip(&working.pixels) {
            assert_eq!(*o, blend(*w, ZOOM_TINT, 60));
        }
    }

    #[test]
    fn zoom_magnifies_about_the_center() {
        let working = gradient(100, 100);
        let mut input = inputs(&working, &[], &[]);
        input.progress = 1.0;
        let mut out = FrameBuffer::filled(Size::new(1, 1), 0);
        zoom_lag(&input, &mut out);
        // The 1.6x image spans [-30, 130): pixel 0 samples source column 19.
        let expected = blend(working.get(19, 19), ZOOM_TINT, 180);
        assert_eq!(out.get(0, 0), expected);
    }

    #[test]
    fn pixel_blocks_grow_from_8_to_40() {
        assert_eq!(pixel_block(0.0), 8);
        assert_eq!(pixel_block(0.5), 24);
        assert_eq!(pixel_block(1.0), 40);
        assert_eq!(pixel_block(-3.0), 8);
    }

    #[test]
    fn pixelate_produces_uniform_blocks() {
        let working = gradient(16, 16);
        let input = inputs(&working, &[], &[]);
        let mut out = FrameBuffer::filled(Size::new(1, 1), 0);
        pixelate(&input, &mut out);
        assert_eq!(out.size(), working.size());
        for by in [0, 8] {
            for bx in [0, 8] {
                let first = out.get(bx, by);
                assert_eq!(first, working.get(bx, by));
                for y in by..by + 8 {
                    for x in bx..bx + 8 {
                        assert_eq!(out.get(x, y), first);
                    }
                }
            }
        }
    }

    #[test]
    fn pixelate_never_divides_by_zero_on_tiny_displays() {
        let working = gradient(3, 2);
        let mut input = inputs(&working, &[], &[]);
        input.progress = 1.0;
        let mut out = FrameBuffer::filled(Size::new(1, 1), 0);
        pixelate(&input, &mut out);
        assert!(out.pixels.iter().all(|&p| p == working.get(0, 0)));
    }

    #[test]
    fn static_noise_tiles_gray_blocks() {
        let working = gradient(10, 9);
        let input = inputs(&working, &[], &[]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut out = FrameBuffer::filled(Size::new(1, 1), 0);
        static_noise(&mut rng, &input, &mut out);
        assert_eq!(out.size(), working.size());
        for y in 0..9 {
            for x in 0..10 {
                let (r, g, b) = unpack_rgb(out.get(x, y));
                assert!(r == g && g == b);
                let anchor = out.get(x / 4 * 4, y / 4 * 4);
                assert_eq!(out.get(x, y), anchor);
            }
        }
    }

    #[test]
    fn red_square_is_absent_at_start_and_covers_everything_at_the_end() {
        let working = gradient(20, 10);
        let mut input = inputs(&working, &[], &[]);
        let mut out = FrameBuffer::filled(Size::new(1, 1), 0);
        red_square_markers(&input, &mut out);
        assert_eq!(out, working);

        input.progress = 1.0;
        red_square_markers(&input, &mut out);
        for (o, w) in out.pixels.iter().zip(&working.pixels) {
            assert_eq!(*o, blend(*w, SQUARE_COLOR, SQUARE_ALPHA));
        }
    }

    #[test]
    fn markers_are_red_squares_with_a_white_cross() {
        let working = FrameBuffer::filled(Size::new(100, 100), 0x00_00_40_00);
        let markers = [Marker { x: 50.0, y: 50.0, vx: 0.0, vy: 0.0 }];
        let input = inputs(&working, &[], &markers);
        let mut out = FrameBuffer::filled(Size::new(1, 1), 0);
        red_square_markers(&input, &mut out);
        assert_eq!(out.get(50, 50), WHITE);
        assert_eq!(out.get(41, 41), WHITE);
        assert_eq!(out.get(41, 59), WHITE);
        assert_eq!(out.get(37, 50), MARKER_COLOR);
        assert_eq!(out.get(20, 20), 0x00_00_40_00);
    }

    #[test]
    fn carousel_draws_copies_and_leaves_the_center_empty() {
        let working = FrameBuffer::filled(Size::new(120, 120), WHITE);
        let input = inputs(&working, &[], &[]);
        let mut out = FrameBuffer::filled(Size::new(1, 1), 0);
        rotating_duplicates(&input, &mut out);
        assert_eq!(out.get(60, 60), BACKGROUND);
        // Slot 0 sits at angle 0, right of center at radius 42.
        assert_eq!(out.get(102, 60), WHITE);
        assert!(out.pixels.iter().filter(|&&p| p == WHITE).count() > 500);
    }

    #[test]
    fn every_phase_renders_at_display_size_even_when_empty() {
        let mut renderer = Renderer::new(StdRng::seed_from_u64(1));
        let markers = [Marker { x: 1.0, y: 1.0, vx: 1.0, vy: 1.0 }];
        for size in [Size::new(0, 0), Size::new(0, 5), Size::new(1, 1), Size::new(33, 17)] {
            let working = FrameBuffer::filled(size, 0x00_12_34_56);
            let offsets = [1, -1, 40, 0];
            let mut input = inputs(&working, &offsets, &markers);
            input.progress = 0.7;
            input.rotation_deg = 123.0;
            for phase in Phase::ALL {
                let mut out = FrameBuffer::filled(Size::new(2, 2), 0);
                renderer.render(phase, &input, &mut out);
                assert_eq!(out.size(), size, "{phase:?}");
            }
        }
    }

    #[test]
    fn captions_draw_text_at_their_positions() {
        let mut out = FrameBuffer::filled(Size::new(300, 40), 0);
        draw_captions(&mut out, &[Caption { x: 10.0, y: 10.0, speed: 1.0 }]);
        assert!(out.pixels.iter().any(|&p| p != 0));
        assert!((0..40).all(|y| (0..10).all(|x| out.get(x, y) == 0)));
    }
}
