use std::str::FromStr;

use crate::foundation::core::PixelRect;
use crate::foundation::error::{StripError, StripResult};

/// Pixel filter applied to each panel after its frame is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterKind {
    /// Leave pixels untouched.
    #[default]
    None,
    /// Weighted luma (0.30/0.59/0.11) written to all three channels.
    Grayscale,
    /// Contrast-reduced, brightened look.
    Smoothing,
}

impl FilterKind {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Smoothing => "smoothing",
        }
    }
}

impl FromStr for FilterKind {
    type Err = StripError;

    fn from_str(s: &str) -> StripResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "grayscale" => Ok(Self::Grayscale),
            "smoothing" => Ok(Self::Smoothing),
            _ => Err(StripError::UnknownFilter(s.to_string())),
        }
    }
}

impl TryFrom<String> for FilterKind {
    type Error = StripError;

    fn try_from(value: String) -> StripResult<Self> {
        value.parse()
    }
}

impl From<FilterKind> for String {
    fn from(value: FilterKind) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply `kind` in place to `region` of an RGBA8 buffer `width` pixels wide.
///
/// The region is clamped to the buffer. Alpha is never modified.
pub fn apply_filter(
    rgba: &mut [u8],
    width: u32,
    region: PixelRect,
    kind: FilterKind,
) -> StripResult<()> {
    if width == 0 || !rgba.len().is_multiple_of(4) || !(rgba.len() / 4).is_multiple_of(width as usize)
    {
        return Err(StripError::render(
            "apply_filter expects a whole number of rgba8 rows",
        ));
    }
    let height = (rgba.len() / 4 / width as usize) as u32;
    let region = region.clamp_to(width, height);
    if kind == FilterKind::None || region.is_empty() {
        return Ok(());
    }

    let row_bytes = width as usize * 4;
    for y in region.y0..region.y1 {
        let start = y as usize * row_bytes + region.x0 as usize * 4;
        let end = y as usize * row_bytes + region.x1 as usize * 4;
        for px in rgba[start..end].chunks_exact_mut(4) {
            match kind {
                FilterKind::None => {}
                FilterKind::Grayscale => {
                    let l = luma(px[0], px[1], px[2]);
                    px[0] = l;
                    px[1] = l;
                    px[2] = l;
                }
                FilterKind::Smoothing => {
                    for c in &mut px[..3] {
                        *c = smooth_channel(*c);
                    }
                }
            }
        }
    }
    Ok(())
}

/// `round(0.30 R + 0.59 G + 0.11 B)` in exact integer arithmetic.
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((30 * u32::from(r) + 59 * u32::from(g) + 11 * u32::from(b) + 50) / 100) as u8
}

fn smooth_channel(c: u8) -> u8 {
    let v = (f32::from(c) - 128.0) * 0.9 + 128.0 + 25.0;
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filter.rs"]
mod tests;
