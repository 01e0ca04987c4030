/// One component of a sticker anchor, relative to the panel origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Offset {
    /// Fixed distance in layout units, independent of panel size.
    Px(f64),
    /// Fraction (in percent) of the panel dimension, plus a fixed nudge.
    Percent(f64, f64),
}

impl Offset {
    fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Percent(pct, nudge) => extent * pct / 100.0 + nudge,
        }
    }
}

/// Resolved sticker position: centre of the sticker box and its rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StickerAnchor {
    /// Centre x, relative to the panel origin.
    pub x: f64,
    /// Centre y, relative to the panel origin.
    pub y: f64,
    /// Clockwise rotation applied to the sticker before drawing.
    pub rotation_deg: f64,
}

struct AnchorSpec {
    x: Offset,
    y: Offset,
    rotation_deg: f64,
}

const ANCHORS: [AnchorSpec; 6] = [
    // top-left, above the border
    AnchorSpec {
        x: Offset::Px(28.0),
        y: Offset::Px(-6.0),
        rotation_deg: -15.0,
    },
    // right, middle, outside
    AnchorSpec {
        x: Offset::Percent(100.0, 8.0),
        y: Offset::Percent(45.0, 0.0),
        rotation_deg: 12.0,
    },
    // left, lower, outside
    AnchorSpec {
        x: Offset::Px(-8.0),
        y: Offset::Percent(72.0, 0.0),
        rotation_deg: -8.0,
    },
    // bottom-right, below the border
    AnchorSpec {
        x: Offset::Percent(82.0, 0.0),
        y: Offset::Percent(100.0, 6.0),
        rotation_deg: 18.0,
    },
    // top-right, near the edge
    AnchorSpec {
        x: Offset::Percent(100.0, -22.0),
        y: Offset::Px(18.0),
        rotation_deg: 25.0,
    },
    // bottom, centre
    AnchorSpec {
        x: Offset::Percent(50.0, 0.0),
        y: Offset::Percent(100.0, -4.0),
        rotation_deg: -5.0,
    },
];

/// The six decorative sticker positions around a `panel_width x panel_height` panel.
///
/// Order: top-left, right-middle, left-lower, bottom-right, top-right, bottom-centre.
pub fn sticker_anchors(panel_width: f64, panel_height: f64) -> [StickerAnchor; 6] {
    ANCHORS.map(|a| StickerAnchor {
        x: a.x.resolve(panel_width),
        y: a.y.resolve(panel_height),
        rotation_deg: a.rotation_deg,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/stickers.rs"]
mod tests;
