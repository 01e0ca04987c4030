use crate::foundation::core::{Affine, Rect, Vec2};

/// Where a source image lands inside a target box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitPlacement {
    /// Uniform scale applied to the source.
    pub scale: f64,
    /// Top-left corner of the scaled source, in target coordinates.
    pub origin: Vec2,
    /// Scaled source width.
    pub width: f64,
    /// Scaled source height.
    pub height: f64,
}

impl FitPlacement {
    /// Transform mapping source pixel space onto the placement.
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.origin) * Affine::scale(self.scale)
    }

    /// Placed rectangle.
    pub fn rect(self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }
}

/// Scale uniformly so the source covers `target` completely, centring the overflow.
///
/// Wider sources are scaled by the target height and centred horizontally; everything else is
/// scaled by the target width and centred vertically.
pub fn cover_fit(src_w: f64, src_h: f64, target: Rect) -> FitPlacement {
    let (tw, th) = (target.width(), target.height());
    let scale = if src_w / src_h > tw / th {
        th / src_h
    } else {
        tw / src_w
    };
    place_centred(src_w, src_h, scale, target)
}

/// Scale uniformly so the source fits inside `target`, centred. Never upscales.
pub fn fit_within(src_w: f64, src_h: f64, target: Rect) -> FitPlacement {
    let scale = (target.width() / src_w)
        .min(target.height() / src_h)
        .min(1.0);
    place_centred(src_w, src_h, scale, target)
}

fn place_centred(src_w: f64, src_h: f64, scale: f64, target: Rect) -> FitPlacement {
    let width = src_w * scale;
    let height = src_h * scale;
    FitPlacement {
        scale,
        origin: Vec2::new(
            target.x0 + (target.width() - width) * 0.5,
            target.y0 + (target.height() - height) * 0.5,
        ),
        width,
        height,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
