// Software drawing utilities on top of `FrameBuffer`.
// Everything here clips against the buffer, so callers may pass rectangles,
// lines and text that hang partly (or wholly) off screen.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::types::{FrameBuffer, Size, BACKGROUND, pack_rgb, unpack_rgb};

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Alpha blend a single color channel.
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u16;
    let result = src as u16 * a + dst as u16 * (255 - a);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

#[inline]
pub fn blend(dst: u32, src: u32, alpha: u8) -> u32 {
    match alpha {
        0 => dst,
        255 => src,
        a => {
            let (sr, sg, sb) = unpack_rgb(src);
            let (dr, dg, db) = unpack_rgb(dst);
            pack_rgb(
                blend_channel(sr, dr, a),
                blend_channel(sg, dg, a),
                blend_channel(sb, db, a),
            )
        }
    }
}

/// Clip a rectangle to the buffer; `None` when nothing is visible.
fn clip_rect(fb: &FrameBuffer, x: i32, y: i32, w: i32, h: i32) -> Option<(usize, usize, usize, usize)> {
    if w <= 0 || h <= 0 {
        return None;
    }
    let x0 = (x as i64).max(0);
    let y0 = (y as i64).max(0);
    let x1 = (x as i64 + w as i64).min(fb.width as i64);
    let y1 = (y as i64 + h as i64).min(fb.height as i64);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
}

/// Fill an axis-aligned rectangle, blending when `alpha` < 255.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32, alpha: u8) {
    let Some((x0, y0, x1, y1)) = clip_rect(fb, x, y, w, h) else {
        return;
    };
    for row in y0..y1 {
        let line = &mut fb.pixels[row * fb.width + x0..row * fb.width + x1];
        if alpha == 255 {
            line.fill(color);
        } else {
            for px in line {
                *px = blend(*px, color, alpha);
            }
        }
    }
}

/// Fill the ellipse inscribed in the rectangle (x, y, w, h).
pub fn fill_ellipse(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32, alpha: u8) {
    let Some((x0, y0, x1, y1)) = clip_rect(fb, x, y, w, h) else {
        return;
    };
    let rx = w as f32 / 2.0;
    let ry = h as f32 / 2.0;
    let cx = x as f32 + rx;
    let cy = y as f32 + ry;
    for py in y0..y1 {
        let ny = (py as f32 + 0.5 - cy) / ry;
        for px in x0..x1 {
            let nx = (px as f32 + 0.5 - cx) / rx;
            if nx * nx + ny * ny <= 1.0 {
                let idx = py * fb.width + px;
                fb.pixels[idx] = blend(fb.pixels[idx], color, alpha);
            }
        }
    }
}

/// Bresenham with a square `thickness` x `thickness` pen stamped at each step.
pub fn draw_thick_line(
    fb: &mut FrameBuffer,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    thickness: i32,
    color: u32,
) {
    let t = thickness.max(1);
    let lo = -(t - 1) / 2;
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if t == 1 {
            put_pixel(fb, x0, y0, color);
        } else {
            fill_rect(fb, x0 + lo, y0 + lo, t, t, color, 255);
        }
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Copy a `w` x `h` block from `src` at (sx,sy) into `dst` at (dx,dy).
/// Source and destination are clipped symmetrically: a row or column that
/// falls outside either buffer is dropped from both.
pub fn blit_rect(
    dst: &mut FrameBuffer,
    src: &FrameBuffer,
    sx: i32,
    sy: i32,
    dx: i32,
    dy: i32,
    w: i32,
    h: i32,
) {
    let (mut sx, mut sy, mut dx, mut dy) = (sx as i64, sy as i64, dx as i64, dy as i64);
    let (mut w, mut h) = (w as i64, h as i64);

    // Trim the leading edge against both origins.
    let lead_x = (-sx).max(-dx).max(0);
    let lead_y = (-sy).max(-dy).max(0);
    sx += lead_x;
    dx += lead_x;
    w -= lead_x;
    sy += lead_y;
    dy += lead_y;
    h -= lead_y;

    // Trim the trailing edge against both extents.
    w = w.min(src.width as i64 - sx).min(dst.width as i64 - dx);
    h = h.min(src.height as i64 - sy).min(dst.height as i64 - dy);
    if w <= 0 || h <= 0 {
        return;
    }

    let (sx, sy, dx, dy, w) = (sx as usize, sy as usize, dx as usize, dy as usize, w as usize);
    for row in 0..h as usize {
        let s = (sy + row) * src.width + sx;
        let d = (dy + row) * dst.width + dx;
        dst.pixels[d..d + w].copy_from_slice(&src.pixels[s..s + w]);
    }
}

/// Resize with nearest-neighbor sampling. Empty sources yield background.
pub fn scale_nearest(src: &FrameBuffer, size: Size) -> FrameBuffer {
    let mut out = FrameBuffer::filled(size, BACKGROUND);
    if src.size().is_empty() || size.is_empty() {
        return out;
    }
    for y in 0..size.height {
        let sy = y * src.height / size.height;
        let row = &src.pixels[sy * src.width..(sy + 1) * src.width];
        for x in 0..size.width {
            out.pixels[y * size.width + x] = row[x * src.width / size.width];
        }
    }
    out
}

/// Resize with bilinear filtering, for thumbnails that should stay smooth.
pub fn scale_smooth(src: &FrameBuffer, size: Size) -> FrameBuffer {
    if src.size().is_empty() || size.is_empty() {
        return FrameBuffer::filled(size, BACKGROUND);
    }
    let rgba = RgbaImage::from_fn(src.width as u32, src.height as u32, |x, y| {
        let (r, g, b) = unpack_rgb(src.get(x as usize, y as usize));
        Rgba([r, g, b, 255])
    });
    let (w, h) = (size.width as u32, size.height as u32);
    FrameBuffer::from_rgba(&imageops::resize(&rgba, w, h, FilterType::Triangle))
}

/// Draw `src` stretched into the float rectangle (x, y, w, h), sampling the
/// source nearest to each covered destination pixel center.
pub fn blit_scaled(dst: &mut FrameBuffer, src: &FrameBuffer, x: f32, y: f32, w: f32, h: f32) {
    if src.size().is_empty() || !(w > 0.0 && h > 0.0) {
        return;
    }
    let x0 = x.max(0.0).floor() as usize;
    let y0 = y.max(0.0).floor() as usize;
    let x1 = ((x + w).ceil().max(0.0) as usize).min(dst.width);
    let y1 = ((y + h).ceil().max(0.0) as usize).min(dst.height);
    let step_x = src.width as f32 / w;
    let step_y = src.height as f32 / h;
    for py in y0..y1 {
        let fy = (py as f32 + 0.5 - y) * step_y;
        if fy < 0.0 || fy >= src.height as f32 {
            continue;
        }
        let sy = fy as usize;
        for px in x0..x1 {
            let fx = (px as f32 + 0.5 - x) * step_x;
            if fx < 0.0 || fx >= src.width as f32 {
                continue;
            }
            dst.pixels[py * dst.width + px] = src.get(fx as usize, sy);
        }
    }
}

/* ---------- 5x7 bitmap font (uppercase ASCII subset) ---------- */

/// Return a 5x7 glyph bitmap for a limited character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
/// Lowercase letters render with their uppercase glyph.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y), each font pixel a `scale` square.
/// A 1-pixel black shadow is drawn first for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, scale: i32, color: u32, alpha: u8) {
    let Some(rows) = glyph5x7(ch) else {
        return;
    };
    for (ox, oy, c) in [(1, 1, 0x00_00_00_00), (0, 0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    let px = x + rx * scale + ox;
                    let py = y + ry as i32 * scale + oy;
                    fill_rect(fb, px, py, scale, scale, c, alpha);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs with 1-pixel spacing (times `scale`).
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, scale: i32, color: u32, alpha: u8) {
    let scale = scale.max(1);
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, scale, color, alpha);
        x += 6 * scale;
    }
}
