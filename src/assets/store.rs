use std::path::{Path, PathBuf};

use crate::foundation::error::{StripError, StripResult};

/// Resolves a pattern, logo or sticker identifier to encoded image bytes.
///
/// Failures are recoverable: the composition falls back to a blank footer or no sticker.
pub trait AssetResolver: Send + Sync {
    /// Fetch the bytes behind `id`.
    fn resolve(&self, id: &str) -> StripResult<Vec<u8>>;
}

/// Reads assets from files below a root directory.
#[derive(Clone, Debug)]
pub struct DirAssetResolver {
    root: PathBuf,
    catalog: PatternCatalog,
}

impl DirAssetResolver {
    /// Resolve relative paths below `root` using the built-in pattern catalogue.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            catalog: PatternCatalog::builtin(),
        }
    }

    /// Replace the pattern catalogue.
    pub fn with_catalog(mut self, catalog: PatternCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Directory the resolver reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetResolver for DirAssetResolver {
    fn resolve(&self, id: &str) -> StripResult<Vec<u8>> {
        let rel = self.catalog.source_for(id).unwrap_or(id);
        let norm = normalize_rel_path(rel)?;
        let p = self.root.join(Path::new(&norm));
        std::fs::read(&p).map_err(|e| {
            StripError::asset_load(format!("failed to read asset '{}': {e}", p.display()))
        })
    }
}

/// A named pattern offered by the selection wizard.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PatternEntry {
    /// Display name, also accepted as the pattern id.
    pub name: String,
    /// Relative image path.
    pub source: String,
}

/// Maps pattern display names to image files.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PatternCatalog {
    entries: Vec<PatternEntry>,
}

impl PatternCatalog {
    /// The three footer patterns shipped with the booth.
    pub fn builtin() -> Self {
        let entry = |name: &str, source: &str| PatternEntry {
            name: name.to_string(),
            source: source.to_string(),
        };
        Self {
            entries: vec![
                entry("Saved by Grace", "patterns/pattern-1.png"),
                entry("Happy Sunday", "patterns/pattern-2.png"),
                entry("Joy Blessings", "patterns/pattern-3.png"),
            ],
        }
    }

    /// Build a catalogue from explicit entries.
    pub fn new(entries: Vec<PatternEntry>) -> Self {
        Self { entries }
    }

    /// Entries in presentation order.
    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    /// Relative source for a pattern name (case-insensitive).
    pub fn source_for(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.source.as_str())
    }
}

/// Normalize and validate asset paths relative to a resolver root.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> StripResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StripError::asset_load("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(StripError::asset_load("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StripError::asset_load("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StripError::asset_load("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape `text` on a single unbroken line in bold.
    pub(crate) fn layout_single_line_bold(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> StripResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StripError::invalid_config(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| StripError::asset_load("no font families registered from font bytes"))?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StripError::asset_load("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
