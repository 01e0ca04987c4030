use crate::assets::decode::{RasterImage, decode_image};
use crate::foundation::error::StripResult;

/// One captured photo, immutable once captured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// 0-based capture order.
    pub index: usize,
    /// Decoded pixels.
    pub image: RasterImage,
}

impl Frame {
    /// Wrap an already-decoded image.
    pub fn new(index: usize, image: RasterImage) -> Self {
        Self { index, image }
    }

    /// Decode an encoded capture (JPEG/PNG/...).
    pub fn from_encoded(index: usize, bytes: &[u8]) -> StripResult<Self> {
        Ok(Self::new(index, decode_image(bytes)?))
    }

    /// Wrap straight RGBA8 pixels.
    pub fn from_rgba8(index: usize, width: u32, height: u32, rgba: Vec<u8>) -> StripResult<Self> {
        Ok(Self::new(index, RasterImage::from_rgba8(width, height, rgba)?))
    }
}

/// Encoding of a [`Composite`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum OutputFormat {
    /// Lossy JPEG with a 1..=100 quality.
    Jpeg {
        /// Encoder quality.
        quality: u8,
    },
    /// Lossless PNG.
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg { quality: 95 }
    }
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// The final rendered strip.
///
/// Never mutated after creation; the publication manager only reads `encoded`.
#[derive(Clone, Debug)]
pub struct Composite {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Straight RGBA8 pixels, row-major.
    pub rgba8: Vec<u8>,
    /// Compressed image bytes.
    pub encoded: Vec<u8>,
    /// Format of `encoded`.
    pub format: OutputFormat,
}

impl Composite {
    /// Pixel at `(x, y)` as straight RGBA8.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.rgba8
            .get(i..i + 4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}
