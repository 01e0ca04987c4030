use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::decode::{RasterImage, decode_image};
use crate::assets::store::AssetResolver;
use crate::composition::frame::OutputFormat;
use crate::effects::filter::FilterKind;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{StripError, StripResult};
use crate::layout::strip::StripDesign;

/// Decorative overlay drawn around every panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sticker {
    /// A short text glyph (e.g. an emoji) drawn with the engine font.
    Glyph(String),
    /// A decoded image.
    Image(RasterImage),
}

/// What the footer shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FooterContent {
    /// Blank footer.
    #[default]
    None,
    /// Encoded logo/pattern image, decoded at composition time.
    Logo(Arc<Vec<u8>>),
    /// Single-line caption.
    Caption(String),
}

impl FooterContent {
    /// Pick the footer from optional inputs; a logo wins over a caption.
    pub fn from_parts(logo: Option<Vec<u8>>, caption: Option<String>) -> Self {
        match (logo, caption) {
            (Some(bytes), _) => Self::Logo(Arc::new(bytes)),
            (None, Some(text)) if !text.trim().is_empty() => Self::Caption(text),
            _ => Self::None,
        }
    }
}

/// Immutable styling snapshot for one composition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleConfig {
    /// Number of panels (and frames) in the strip.
    pub panel_count: usize,
    /// Canvas background.
    pub background: Rgb8,
    /// Optional sticker drawn at six anchors per panel.
    pub sticker: Option<Sticker>,
    /// Footer logo or caption.
    pub footer: FooterContent,
    /// Filter applied to each panel.
    pub filter: FilterKind,
}

impl StyleConfig {
    /// Plain style: white background, no sticker, blank footer, no filter.
    pub fn new(panel_count: usize) -> StripResult<Self> {
        if panel_count < 1 {
            return Err(StripError::invalid_config("panel count must be >= 1"));
        }
        Ok(Self {
            panel_count,
            background: Rgb8::WHITE,
            sticker: None,
            footer: FooterContent::None,
            filter: FilterKind::None,
        })
    }

    /// Style for a parsed design.
    pub fn for_design(design: StripDesign) -> Self {
        Self {
            panel_count: design.panel_count(),
            background: Rgb8::WHITE,
            sticker: None,
            footer: FooterContent::None,
            filter: FilterKind::None,
        }
    }

    /// Set the background colour.
    pub fn with_background(mut self, background: Rgb8) -> Self {
        self.background = background;
        self
    }

    /// Set the sticker.
    pub fn with_sticker(mut self, sticker: Sticker) -> Self {
        self.sticker = Some(sticker);
        self
    }

    /// Set the footer content.
    pub fn with_footer(mut self, footer: FooterContent) -> Self {
        self.footer = footer;
        self
    }

    /// Set the filter.
    pub fn with_filter(mut self, filter: FilterKind) -> Self {
        self.filter = filter;
        self
    }
}

/// Sticker as written in a style file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickerSpec {
    /// Text glyph.
    Glyph(String),
    /// Image asset id for the [`AssetResolver`].
    Image(String),
}

/// Serializable style selection, as produced by the selection wizard.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleSpec {
    /// Strip design, e.g. `"4x1"`.
    pub design: String,
    /// Background colour (`#rrggbb`), white when absent.
    #[serde(default)]
    pub background: Option<Rgb8>,
    /// Filter name (`none`, `grayscale` or `smoothing`); `none` when absent.
    #[serde(default)]
    pub filter: Option<String>,
    /// Optional sticker.
    #[serde(default)]
    pub sticker: Option<StickerSpec>,
    /// Pattern catalogue name or asset id for the footer.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Footer caption, used when no pattern is set.
    #[serde(default)]
    pub caption: Option<String>,
}

impl StyleSpec {
    /// Parse a style from JSON text.
    pub fn from_json_str(s: &str) -> StripResult<Self> {
        let spec: Self = serde_json::from_str(s).context("parse style JSON")?;
        spec.filter()?;
        Ok(spec)
    }

    /// Read and parse a style JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> StripResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read style '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parsed design.
    pub fn design(&self) -> StripResult<StripDesign> {
        self.design.parse()
    }

    /// Parsed filter.
    pub fn filter(&self) -> StripResult<FilterKind> {
        self.filter
            .as_deref()
            .map_or(Ok(FilterKind::None), |f| f.parse())
    }

    /// Resolve assets once and produce the immutable [`StyleConfig`].
    ///
    /// A pattern that cannot be fetched leaves the footer blank; a sticker image that cannot be
    /// fetched or decoded is dropped. Both are logged as warnings.
    pub fn resolve(&self, assets: &dyn AssetResolver) -> StripResult<StyleConfig> {
        let design = self.design()?;
        let filter = self.filter()?;

        let footer = match &self.pattern {
            Some(id) => match assets.resolve(id) {
                Ok(bytes) => FooterContent::Logo(Arc::new(bytes)),
                Err(err) => {
                    tracing::warn!(pattern = %id, error = %err, "pattern unavailable, footer left blank");
                    FooterContent::None
                }
            },
            None => FooterContent::from_parts(None, self.caption.clone()),
        };

        let sticker = match &self.sticker {
            None => None,
            Some(StickerSpec::Glyph(g)) if g.trim().is_empty() => None,
            Some(StickerSpec::Glyph(g)) => Some(Sticker::Glyph(g.clone())),
            Some(StickerSpec::Image(id)) => {
                match assets.resolve(id).and_then(|b| decode_image(&b)) {
                    Ok(img) => Some(Sticker::Image(img)),
                    Err(err) => {
                        tracing::warn!(sticker = %id, error = %err, "sticker unavailable, skipped");
                        None
                    }
                }
            }
        };

        Ok(StyleConfig {
            panel_count: design.panel_count(),
            background: self.background.unwrap_or_default(),
            sticker,
            footer,
            filter,
        })
    }
}

/// File name offered when the user downloads the strip: `{design}-{pattern}-photo.{ext}`.
pub fn download_filename(
    design: Option<&str>,
    pattern: Option<&str>,
    format: OutputFormat,
) -> String {
    fn part(v: Option<&str>, fallback: &str) -> String {
        let cleaned: String = v
            .unwrap_or("")
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if cleaned.is_empty() {
            fallback.to_string()
        } else {
            cleaned
        }
    }
    format!(
        "{}-{}-photo.{}",
        part(design, "photo"),
        part(pattern, "default"),
        format.extension()
    )
}

#[cfg(test)]
#[path = "../../tests/unit/composition/style.rs"]
mod tests;
