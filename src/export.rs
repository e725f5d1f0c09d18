//! Framebuffer export to image files

use std::path::Path;
use image::RgbImage;
use crate::rasterizer::Rasterizer;

#[derive(Debug)]
pub enum ExportError {
    /// Buffer length does not match width * height * 3
    Dimensions { width: usize, height: usize },
    Image(image::ImageError),
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Image(e)
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Dimensions { width, height } => {
                write!(f, "framebuffer does not fit a {}x{} image", width, height)
            }
            ExportError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Dimensions { .. } => None,
            ExportError::Image(e) => Some(e),
        }
    }
}

/// Copy the color buffer into an `RgbImage` (row 0 at the top)
pub fn to_rgb_image(rasterizer: &Rasterizer) -> Result<RgbImage, ExportError> {
    let (width, height) = (rasterizer.width(), rasterizer.height());
    let dims = ExportError::Dimensions { width, height };
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(dims),
    };

    RgbImage::from_raw(w, h, rasterizer.frame_buffer().to_vec()).ok_or(dims)
}

/// Expand packed RGB to opaque RGBA, the layout GPU texture uploads expect
pub fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        out.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    out
}

/// Write the color buffer as a PNG
pub fn save_png<P: AsRef<Path>>(rasterizer: &Rasterizer, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    let img = to_rgb_image(rasterizer)?;
    img.save_with_format(path, image::ImageFormat::Png)?;
    log::info!("wrote {}x{} frame to {}", img.width(), img.height(), path.display());
    Ok(())
}
