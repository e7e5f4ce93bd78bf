// Grabs one still from a camera to use as the melt source.
// Visual expectation: the window shows the camera's view, then melts it.

use melt_screen::Error;

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
};

use image::{Rgba, RgbaImage};
use tracing::debug;

// Many webcams hand out dark frames while auto-exposure settles.
const WARMUP_FRAMES: usize = 5;

/// Open camera `index`, keep the last of a few frames, and close it again.
pub fn grab_still(index: u32) -> Result<RgbaImage, Error> {
    let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);

    let mut cam = Camera::new(CameraIndex::Index(index), req)
        .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

    cam.open_stream()
        .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

    let mut last = None;
    for _ in 0..WARMUP_FRAMES {
        let frame = cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;
        last = Some(frame);
    }
    // Best effort; the still is already in hand.
    let _ = cam.stop_stream();

    let frame = last.ok_or_else(|| Error::CameraFrame("no frame captured".into()))?;
    let rgb = frame
        .decode_image::<RgbFormat>()
        .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;
    debug!(width = rgb.width(), height = rgb.height(), "camera still captured");

    // Repack pixel by pixel so nokhwa's image types never leak out.
    let (w, h) = rgb.dimensions();
    Ok(RgbaImage::from_fn(w, h, |x, y| {
        let p = rgb.get_pixel(x, y);
        Rgba([p[0], p[1], p[2], 255])
    }))
}
