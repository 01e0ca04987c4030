use image::ImageEncoder;

use crate::composition::frame::OutputFormat;
use crate::foundation::error::{StripError, StripResult};

/// Encode straight RGBA8 pixels in `format`.
///
/// JPEG drops alpha; the composited strip is opaque so nothing is lost.
pub fn encode_rgba8(
    rgba: &[u8],
    width: u32,
    height: u32,
    format: OutputFormat,
) -> StripResult<Vec<u8>> {
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if width == 0 || height == 0 || rgba.len() != expected {
        return Err(StripError::encode(format!(
            "expected {expected} rgba bytes for {width}x{height}, got {}",
            rgba.len()
        )));
    }

    let mut out = Vec::new();
    match format {
        OutputFormat::Jpeg { quality } => {
            if !(1..=100).contains(&quality) {
                return Err(StripError::invalid_config(format!(
                    "jpeg quality must be in 1..=100, got {quality}"
                )));
            }
            let rgb: Vec<u8> = rgba
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
                .encode(&rgb, width, height, image::ExtendedColorType::Rgb8)
                .map_err(|e| StripError::encode(format!("jpeg: {e}")))?;
        }
        OutputFormat::Png => {
            image::codecs::png::PngEncoder::new(&mut out)
                .write_image(rgba, width, height, image::ExtendedColorType::Rgba8)
                .map_err(|e| StripError::encode(format!("png: {e}")))?;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/encode.rs"]
mod tests;
