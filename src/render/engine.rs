use std::sync::Arc;

use kurbo::Shape;

use crate::assets::decode::{RasterImage, decode_image};
use crate::assets::store::{TextBrushRgba8, TextLayoutEngine};
use crate::composition::frame::{Composite, Frame, OutputFormat};
use crate::composition::style::{FooterContent, Sticker, StyleConfig};
use crate::effects::composite::over_in_place;
use crate::effects::filter::{FilterKind, apply_filter};
use crate::foundation::core::{Affine, PixelRect, Point, Rect, Rgb8, Vec2};
use crate::foundation::error::{StripError, StripResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::layout::fit::{cover_fit, fit_within};
use crate::layout::stickers::{StickerAnchor, sticker_anchors};
use crate::layout::strip::{Layout, LayoutParams, compute_layout};
use crate::render::encode::encode_rgba8;

/// Geometry, scale and output settings for [`CompositionEngine`].
///
/// All lengths are layout units; the output raster is `scale_factor` times larger.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    /// Panel width.
    pub panel_width: f64,
    /// Panel width divided by panel height.
    pub aspect_ratio: f64,
    /// Vertical gap above each panel and above the footer.
    pub spacing: f64,
    /// Left and right canvas margin.
    pub horizontal_padding: f64,
    /// Footer height.
    pub footer_height: f64,
    /// Panel corner radius.
    pub corner_radius: f64,
    /// Edge of the square box a sticker is fitted into.
    pub sticker_size: f64,
    /// Caption font size.
    pub caption_size: f64,
    /// Caption colour.
    pub caption_color: Rgb8,
    /// Output pixels per layout unit.
    pub scale_factor: f64,
    /// Encoding of the composite.
    pub format: OutputFormat,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            panel_width: 640.0,
            aspect_ratio: 4.0 / 3.0,
            spacing: 20.0,
            horizontal_padding: 20.0,
            footer_height: 160.0,
            corner_radius: 12.0,
            sticker_size: 40.0,
            caption_size: 48.0,
            caption_color: Rgb8::new(0, 0, 0),
            scale_factor: 2.0,
            format: OutputFormat::default(),
        }
    }
}

impl EngineOptions {
    /// Layout parameters for `panel_count` panels.
    pub fn layout_params(&self, panel_count: usize) -> LayoutParams {
        LayoutParams {
            panel_count,
            panel_width: self.panel_width,
            aspect_ratio: self.aspect_ratio,
            spacing: self.spacing,
            horizontal_padding: self.horizontal_padding,
            footer_height: self.footer_height,
        }
    }

    fn validate(&self) -> StripResult<()> {
        for (name, v) in [
            ("scale factor", self.scale_factor),
            ("sticker size", self.sticker_size),
            ("caption size", self.caption_size),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(StripError::invalid_config(format!(
                    "{name} must be finite and > 0, got {v}"
                )));
            }
        }
        if !self.corner_radius.is_finite() || self.corner_radius < 0.0 {
            return Err(StripError::invalid_config(format!(
                "corner radius must be finite and >= 0, got {}",
                self.corner_radius
            )));
        }
        // Geometry is checked by compute_layout.
        compute_layout(self.layout_params(1)).map(|_| ())
    }
}

/// Renders frames and a [`StyleConfig`] into a finished [`Composite`].
///
/// The engine holds no per-call state; every `compose` allocates its own surfaces.
#[derive(Clone, Debug)]
pub struct CompositionEngine {
    options: EngineOptions,
    font: Option<Arc<Vec<u8>>>,
}

impl Default for CompositionEngine {
    fn default() -> Self {
        Self {
            options: EngineOptions::default(),
            font: None,
        }
    }
}

impl CompositionEngine {
    /// Engine with validated options and no font.
    pub fn new(options: EngineOptions) -> StripResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            font: None,
        })
    }

    /// Use `font_bytes` (TTF/OTF) for captions and glyph stickers.
    pub fn with_font(mut self, font_bytes: Vec<u8>) -> Self {
        self.font = Some(Arc::new(font_bytes));
        self
    }

    /// Active options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Layout for `panel_count` panels under these options.
    pub fn layout(&self, panel_count: usize) -> StripResult<Layout> {
        compute_layout(self.options.layout_params(panel_count))
    }

    /// Output raster size for `layout`.
    pub fn canvas_size(&self, layout: &Layout) -> StripResult<(u32, u32)> {
        let (w, h) = canvas_px(layout, self.options.scale_factor)?;
        Ok((u32::from(w), u32::from(h)))
    }

    /// Compose `frames` (in capture order, one per panel) with `style`.
    #[tracing::instrument(
        skip_all,
        fields(frames = frames.len(), panels = style.panel_count, filter = %style.filter)
    )]
    pub fn compose(&self, frames: &[Frame], style: &StyleConfig) -> StripResult<Composite> {
        if frames.len() != style.panel_count {
            return Err(StripError::FrameCountMismatch {
                expected: style.panel_count,
                actual: frames.len(),
            });
        }
        let layout = self.layout(style.panel_count)?;
        let (w, h) = canvas_px(&layout, self.options.scale_factor)?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let mut base = vello_cpu::Pixmap::new(w, h);
        self.draw_base(&mut ctx, &layout, frames, style.background)?;
        ctx.flush();
        ctx.render_to_pixmap(&mut base);

        if style.filter != FilterKind::None {
            let data = base.data_as_u8_slice_mut();
            for rect in layout.panel_rects() {
                let region = PixelRect::covering(rect, self.options.scale_factor);
                apply_filter(data, u32::from(w), region, style.filter)?;
            }
        }

        ctx.reset();
        if self.draw_overlay(&mut ctx, &layout, style)? {
            let mut overlay = vello_cpu::Pixmap::new(w, h);
            ctx.flush();
            ctx.render_to_pixmap(&mut overlay);
            over_in_place(base.data_as_u8_slice_mut(), overlay.data_as_u8_slice())?;
        }

        let mut rgba8 = base.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut rgba8);
        let (width, height) = (u32::from(w), u32::from(h));
        let encoded = encode_rgba8(&rgba8, width, height, self.options.format)?;
        tracing::debug!(width, height, bytes = encoded.len(), "composite encoded");

        Ok(Composite {
            width,
            height,
            rgba8,
            encoded,
            format: self.options.format,
        })
    }

    fn scale(&self) -> Affine {
        Affine::scale(self.options.scale_factor)
    }

    fn draw_base(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &Layout,
        frames: &[Frame],
        background: Rgb8,
    ) -> StripResult<()> {
        ctx.set_transform(affine_to_cpu(self.scale()));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            255,
        ));
        ctx.fill_rect(&rect_to_cpu(layout.canvas_rect()));

        for (frame, rect) in frames.iter().zip(layout.panel_rects()) {
            let img = &frame.image;
            let placement = cover_fit(f64::from(img.width), f64::from(img.height), rect);
            ctx.set_paint(image_paint(img)?);
            ctx.set_paint_transform(affine_to_cpu(placement.to_affine()));
            ctx.fill_path(&rounded_rect_path(rect, self.options.corner_radius));
        }
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    /// Draw stickers and footer. Returns `false` when nothing was drawn.
    fn draw_overlay(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &Layout,
        style: &StyleConfig,
    ) -> StripResult<bool> {
        let mut text = TextLayoutEngine::new();
        let mut drew = false;

        if let Some(sticker) = &style.sticker {
            drew |= self.draw_stickers(ctx, &mut text, layout, sticker)?;
        }

        match &style.footer {
            FooterContent::None => {}
            FooterContent::Logo(bytes) => match decode_image(bytes) {
                Ok(logo) => {
                    let placement = fit_within(
                        f64::from(logo.width),
                        f64::from(logo.height),
                        layout.footer_rect(),
                    );
                    ctx.set_transform(affine_to_cpu(self.scale() * placement.to_affine()));
                    ctx.set_paint(image_paint(&logo)?);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        f64::from(logo.width),
                        f64::from(logo.height),
                    ));
                    drew = true;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "footer logo failed to decode, footer left blank");
                }
            },
            FooterContent::Caption(caption) => {
                drew |= self.draw_caption(ctx, &mut text, layout.footer_rect(), caption)?;
            }
        }
        Ok(drew)
    }

    fn draw_stickers(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        text: &mut TextLayoutEngine,
        layout: &Layout,
        sticker: &Sticker,
    ) -> StripResult<bool> {
        let size = self.options.sticker_size;
        let anchors = sticker_anchors(layout.panel_width, layout.panel_height);

        // Each sticker is drawn in a local box centred on the origin, then rotated and moved.
        let place = |origin: Point, anchor: &StickerAnchor| {
            self.scale()
                * Affine::translate(Vec2::new(origin.x + anchor.x, origin.y + anchor.y))
                * Affine::rotate(anchor.rotation_deg.to_radians())
        };

        match sticker {
            Sticker::Image(img) => {
                let (iw, ih) = (f64::from(img.width), f64::from(img.height));
                let k = size / iw.max(ih);
                let local =
                    Affine::translate(Vec2::new(-iw * k * 0.5, -ih * k * 0.5)) * Affine::scale(k);
                let paint = image_paint(img)?;
                for origin in &layout.panel_origins {
                    for anchor in &anchors {
                        ctx.set_transform(affine_to_cpu(place(*origin, anchor) * local));
                        ctx.set_paint(paint.clone());
                        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
                    }
                }
                Ok(true)
            }
            Sticker::Glyph(glyph) => {
                let Some(font) = &self.font else {
                    tracing::warn!(glyph = %glyph, "glyph sticker needs a font, stickers skipped");
                    return Ok(false);
                };
                let shaped = match text.layout_single_line_bold(
                    glyph,
                    font,
                    size as f32,
                    TextBrushRgba8 {
                        r: 0,
                        g: 0,
                        b: 0,
                        a: 255,
                    },
                ) {
                    Ok(l) => l,
                    Err(err) => {
                        tracing::warn!(error = %err, "glyph sticker layout failed, stickers skipped");
                        return Ok(false);
                    }
                };
                let local = Affine::translate(Vec2::new(
                    -f64::from(shaped.width()) * 0.5,
                    -f64::from(shaped.height()) * 0.5,
                ));
                let font_data = font_data(font);
                for origin in &layout.panel_origins {
                    for anchor in &anchors {
                        ctx.set_transform(affine_to_cpu(place(*origin, anchor) * local));
                        fill_layout(ctx, &shaped, &font_data);
                    }
                }
                Ok(true)
            }
        }
    }

    fn draw_caption(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        text: &mut TextLayoutEngine,
        footer: Rect,
        caption: &str,
    ) -> StripResult<bool> {
        let Some(font) = &self.font else {
            tracing::warn!("caption needs a font, footer left blank");
            return Ok(false);
        };
        let c = self.options.caption_color;
        let brush = TextBrushRgba8 {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        };

        let mut size = self.options.caption_size as f32;
        let mut shaped = match text.layout_single_line_bold(caption, font, size, brush) {
            Ok(l) => l,
            Err(err) => {
                tracing::warn!(error = %err, "caption layout failed, footer left blank");
                return Ok(false);
            }
        };
        // Single line: shrink instead of wrapping when the caption is wider than the footer.
        let max_w = footer.width() as f32;
        if shaped.width() > max_w && shaped.width() > 0.0 {
            size *= max_w / shaped.width();
            shaped = text.layout_single_line_bold(caption, font, size, brush)?;
        }

        let origin = Vec2::new(
            footer.center().x - f64::from(shaped.width()) * 0.5,
            footer.center().y - f64::from(shaped.height()) * 0.5,
        );
        ctx.set_transform(affine_to_cpu(self.scale() * Affine::translate(origin)));
        fill_layout(ctx, &shaped, &font_data(font));
        Ok(true)
    }
}

fn canvas_px(layout: &Layout, scale: f64) -> StripResult<(u16, u16)> {
    let dim = |v: f64, name: &str| -> StripResult<u16> {
        let px = (v * scale - 1e-6).ceil();
        if !px.is_finite() || px < 1.0 || px > f64::from(u16::MAX) {
            return Err(StripError::invalid_config(format!(
                "canvas {name} {px} px is outside 1..={}",
                u16::MAX
            )));
        }
        Ok(px as u16)
    };
    Ok((
        dim(layout.total_width, "width")?,
        dim(layout.total_height, "height")?,
    ))
}

fn rounded_rect_path(rect: Rect, radius: f64) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let rr = kurbo::RoundedRect::from_rect(rect, radius);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in rr.path_elements(0.1) {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn fill_layout(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn font_data(bytes: &Arc<Vec<u8>>) -> vello_cpu::peniko::FontData {
    vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes.as_ref().clone()), 0)
}

fn image_paint(img: &RasterImage) -> StripResult<vello_cpu::Image> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| StripError::render("image width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| StripError::render("image height exceeds u16"))?;
    let pixels = img
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
