// Core raster types shared by the provider, the renderers and the window.

use image::RgbaImage;

/// Background shown wherever nothing else is drawn (0x00RRGGBB).
pub const BACKGROUND: u32 = 0x00_00_00_00;

/// Display dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A buffer of the given size filled with one color.
    pub fn filled(size: Size, color: u32) -> Self {
        Self {
            width: size.width,
            height: size.height,
            pixels: vec![color; size.width * size.height],
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Pack an RGBA image into 0x00RRGGBB, dropping alpha.
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| pack_rgb(p[0], p[1], p[2]))
            .collect();
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            pixels,
        }
    }

    /// Reuse the allocation for a new size, filling with `color`.
    pub fn reset(&mut self, size: Size, color: u32) {
        self.width = size.width;
        self.height = size.height;
        self.pixels.clear();
        self.pixels.resize(size.width * size.height, color);
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Overwrite this buffer with `other`, adopting its size.
    pub fn copy_from(&mut self, other: &FrameBuffer) {
        self.width = other.width;
        self.height = other.height;
        self.pixels.clear();
        self.pixels.extend_from_slice(&other.pixels);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_rgb(px: u32) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}
