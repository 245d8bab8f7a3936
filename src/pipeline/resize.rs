//! Aspect-preserving image fitting for the direct renderer.
//!
//! Every image is scaled (up or down) so that it fills as much of the
//! `max_width × max_height` box as possible without distortion. The fitted
//! size is in PDF points; the pixel buffer is resampled to
//! `points × raster_scale` so a scale above 1 keeps more detail in print.

use crate::error::SlidesError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;
use tracing::debug;

/// An image decoded and resampled for one table cell.
#[derive(Debug, Clone)]
pub struct FittedImage {
    pub image: DynamicImage,
    /// Size to draw at, in points.
    pub width_pt: u32,
    pub height_pt: u32,
}

/// Largest size with the same aspect ratio that fits inside the box.
///
/// Dimensions are truncated towards zero and never drop below 1.
pub fn fit_within(width: u32, height: u32, max_width: f32, max_height: f32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (1, 1);
    }
    let (w, h) = (f64::from(width), f64::from(height));
    let ratio = (f64::from(max_width) / w).min(f64::from(max_height) / h);
    // Nudge before truncating so 800 * (280 / 800) lands on 280, not 279.
    let w = (w * ratio + 1e-6).floor() as u32;
    let h = (h * ratio + 1e-6).floor() as u32;
    (w.max(1), h.max(1))
}

/// Decode `path`, choosing the decoder from the file's leading bytes so a
/// mislabelled extension still loads.
pub fn open_image(path: &Path) -> Result<DynamicImage, SlidesError> {
    let decode_err = |detail: String| SlidesError::ImageDecode {
        path: path.to_path_buf(),
        detail,
    };
    ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| decode_err(e.to_string()))?
        .decode()
        .map_err(|e| decode_err(e.to_string()))
}

/// Decode `path` and resample it to fit the box.
pub fn prepare_image(
    path: &Path,
    max_width: f32,
    max_height: f32,
    raster_scale: f32,
) -> Result<FittedImage, SlidesError> {
    let img = open_image(path)?;

    let (width_pt, height_pt) = fit_within(img.width(), img.height(), max_width, max_height);
    let px_w = ((width_pt as f32 * raster_scale).round() as u32).max(1);
    let px_h = ((height_pt as f32 * raster_scale).round() as u32).max(1);

    let resized = if (px_w, px_h) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(px_w, px_h, FilterType::Lanczos3)
    };
    debug!(
        "Fitted {} → {}x{} pt ({}x{} px)",
        path.display(),
        width_pt,
        height_pt,
        px_w,
        px_h
    );

    Ok(FittedImage {
        image: resized,
        width_pt,
        height_pt,
    })
}
