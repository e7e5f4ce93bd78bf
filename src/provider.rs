//! Owns the source raster and the display-sized working buffer derived from it.

use image::{RgbaImage, imageops::{self, FilterType}};
use tracing::debug;

use crate::types::{FrameBuffer, Size, BACKGROUND};

/// Interpolation used when stretching the source to the display.
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Holds the source image and keeps a working buffer the size of the display.
///
/// The working buffer is rebuilt as a whole whenever the display size or the
/// source changes, so readers never observe a half-updated buffer.
#[derive(Debug)]
pub struct FrameProvider {
    source: Option<RgbaImage>,
    working: FrameBuffer,
}

impl FrameProvider {
    /// Start without a source: the working buffer is solid background.
    pub fn new(display: Size) -> Self {
        Self {
            source: None,
            working: FrameBuffer::filled(display, BACKGROUND),
        }
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn working(&self) -> &FrameBuffer {
        &self.working
    }

    pub fn display(&self) -> Size {
        self.working.size()
    }

    /// Replace the source wholesale and rebuild at the current display size.
    pub fn set_source(&mut self, image: RgbaImage) {
        self.source = Some(image);
        let display = self.display();
        self.rebuild(display);
    }

    /// Rebuild the working buffer for a new display size.
    pub fn handle_resize(&mut self, size: Size) {
        debug!(width = size.width, height = size.height, "rebuilding working buffer");
        self.rebuild(size);
    }

    /// Replace the working buffer with a blank one (used after the sequence ends).
    pub fn blank(&mut self) {
        self.working.fill(BACKGROUND);
    }

    fn rebuild(&mut self, display: Size) {
        self.working = match &self.source {
            Some(src) if !display.is_empty() => FrameBuffer::from_rgba(&imageops::resize(
                src,
                display.width as u32,
                display.height as u32,
                RESIZE_FILTER,
            )),
            _ => FrameBuffer::filled(display, BACKGROUND),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn without_source_the_working_buffer_is_background() {
        let mut provider = FrameProvider::new(Size::new(8, 6));
        assert!(!provider.has_source());
        assert_eq!(provider.working().size(), Size::new(8, 6));
        assert!(provider.working().pixels.iter().all(|&p| p == BACKGROUND));

        provider.handle_resize(Size::new(3, 2));
        assert_eq!(provider.working().size(), Size::new(3, 2));
        assert!(provider.working().pixels.iter().all(|&p| p == BACKGROUND));
    }

    #[test]
    fn working_buffer_tracks_display_size() {
        let mut provider = FrameProvider::new(Size::new(10, 10));
        provider.set_source(checker(40, 30));
        assert_eq!(provider.working().size(), Size::new(10, 10));
        provider.handle_resize(Size::new(17, 5));
        assert_eq!(provider.working().size(), Size::new(17, 5));
        assert_eq!(provider.working().pixels.len(), 17 * 5);
    }

    #[test]
    fn set_then_resize_to_same_size_matches_direct_resize() {
        let img = checker(31, 19);
        let size = Size::new(12, 9);
        let mut provider = FrameProvider::new(size);
        provider.set_source(img.clone());
        provider.handle_resize(size);

        let direct = FrameBuffer::from_rgba(&imageops::resize(&img, 12, 9, RESIZE_FILTER));
        assert_eq!(provider.working(), &direct);
    }

    #[test]
    fn zero_sized_display_does_not_resize_the_source() {
        let mut provider = FrameProvider::new(Size::new(0, 0));
        provider.set_source(checker(4, 4));
        assert!(provider.working().pixels.is_empty());
        provider.handle_resize(Size::new(4, 0));
        assert_eq!(provider.working().size(), Size::new(4, 0));
    }

    #[test]
    fn blank_keeps_size() {
        let mut provider = FrameProvider::new(Size::new(4, 4));
        provider.set_source(checker(4, 4));
        provider.blank();
        assert_eq!(provider.working().size(), Size::new(4, 4));
        assert!(provider.working().pixels.iter().all(|&p| p == BACKGROUND));
        assert!(provider.has_source());
    }
}
