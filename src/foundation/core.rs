use std::str::FromStr;

use crate::foundation::error::{StripError, StripResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Opaque 8-bit RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Pure white, the default strip background.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Build a colour from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Rgb8 {
    type Err = StripError;

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional).
    fn from_str(s: &str) -> StripResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StripError::invalid_config(format!("invalid colour '{s}'")));
        }
        let channel = |h: &str| {
            u8::from_str_radix(h, 16)
                .map_err(|_| StripError::invalid_config(format!("invalid colour '{s}'")))
        };
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    out[i] = v * 17;
                }
                Ok(Self::new(out[0], out[1], out[2]))
            }
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(StripError::invalid_config(format!("invalid colour '{s}'"))),
        }
    }
}

impl TryFrom<String> for Rgb8 {
    type Error = StripError;

    fn try_from(value: String) -> StripResult<Self> {
        value.parse()
    }
}

impl From<Rgb8> for String {
    fn from(value: Rgb8) -> Self {
        value.to_hex()
    }
}

/// Integer pixel rectangle `[x0, x1) x [y0, y1)` inside a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub x0: u32,
    /// Top edge (inclusive).
    pub y0: u32,
    /// Right edge (exclusive).
    pub x1: u32,
    /// Bottom edge (exclusive).
    pub y1: u32,
}

impl PixelRect {
    /// Build from origin and size.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x.saturating_add(width),
            y1: y.saturating_add(height),
        }
    }

    /// Cover a layout-space rectangle scaled by `scale`, rounding outward.
    pub fn covering(rect: Rect, scale: f64) -> Self {
        let f = |v: f64| v.max(0.0) as u32;
        Self {
            x0: f((rect.x0 * scale).floor()),
            y0: f((rect.y0 * scale).floor()),
            x1: f((rect.x1 * scale).ceil()),
            y1: f((rect.y1 * scale).ceil()),
        }
    }

    /// Intersect with a `width x height` image.
    pub fn clamp_to(self, width: u32, height: u32) -> Self {
        let x1 = self.x1.min(width);
        let y1 = self.y1.min(height);
        Self {
            x0: self.x0.min(x1),
            y0: self.y0.min(y1),
            x1,
            y1,
        }
    }

    /// Width in pixels.
    pub fn width(self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    /// Height in pixels.
    pub fn height(self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    /// Return `true` when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Return `true` when pixel `(x, y)` lies inside.
    pub fn contains(self, x: u32, y: u32) -> bool {
        self.x0 <= x && x < self.x1 && self.y0 <= y && y < self.y1
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
