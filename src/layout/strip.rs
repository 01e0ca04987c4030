use std::str::FromStr;

use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{StripError, StripResult};

/// Inputs to [`compute_layout`], in unscaled layout units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    /// Number of panels, at least 1.
    pub panel_count: usize,
    /// Width of every panel.
    pub panel_width: f64,
    /// Panel width divided by panel height.
    pub aspect_ratio: f64,
    /// Vertical gap above the first panel and between consecutive panels and the footer.
    pub spacing: f64,
    /// Left and right margin.
    pub horizontal_padding: f64,
    /// Height reserved for the footer.
    pub footer_height: f64,
}

impl LayoutParams {
    /// Default geometry for `panel_count` panels (640 wide, 4:3).
    pub fn for_panels(panel_count: usize) -> Self {
        Self {
            panel_count,
            panel_width: 640.0,
            aspect_ratio: 4.0 / 3.0,
            spacing: 20.0,
            horizontal_padding: 20.0,
            footer_height: 160.0,
        }
    }
}

/// Strip geometry derived from [`LayoutParams`]. Read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Panel width.
    pub panel_width: f64,
    /// Panel height (`panel_width / aspect_ratio`).
    pub panel_height: f64,
    /// Vertical spacing.
    pub spacing: f64,
    /// Horizontal padding.
    pub horizontal_padding: f64,
    /// Footer height.
    pub footer_height: f64,
    /// Canvas width.
    pub total_width: f64,
    /// Canvas height.
    pub total_height: f64,
    /// Top-left corner of each panel, in capture order.
    pub panel_origins: Vec<Point>,
    /// Top-left corner of the footer.
    pub footer_origin: Point,
}

impl Layout {
    /// Number of panels.
    pub fn panel_count(&self) -> usize {
        self.panel_origins.len()
    }

    /// Rectangle of panel `i`.
    pub fn panel_rect(&self, i: usize) -> Option<Rect> {
        self.panel_origins.get(i).map(|o| {
            Rect::new(o.x, o.y, o.x + self.panel_width, o.y + self.panel_height)
        })
    }

    /// Iterate over all panel rectangles in order.
    pub fn panel_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        (0..self.panel_count()).filter_map(|i| self.panel_rect(i))
    }

    /// Footer rectangle; as wide as a panel.
    pub fn footer_rect(&self) -> Rect {
        Rect::new(
            self.footer_origin.x,
            self.footer_origin.y,
            self.footer_origin.x + self.panel_width,
            self.footer_origin.y + self.footer_height,
        )
    }

    /// Whole canvas.
    pub fn canvas_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.total_width, self.total_height)
    }
}

/// Compute panel, footer and canvas geometry for a vertical strip.
pub fn compute_layout(p: LayoutParams) -> StripResult<Layout> {
    if p.panel_count < 1 {
        return Err(StripError::invalid_config("panel count must be >= 1"));
    }
    for (name, v) in [
        ("panel width", p.panel_width),
        ("aspect ratio", p.aspect_ratio),
        ("spacing", p.spacing),
        ("horizontal padding", p.horizontal_padding),
        ("footer height", p.footer_height),
    ] {
        if !v.is_finite() || v <= 0.0 {
            return Err(StripError::invalid_config(format!(
                "{name} must be finite and > 0, got {v}"
            )));
        }
    }

    let panel_height = p.panel_width / p.aspect_ratio;
    let stride = panel_height + p.spacing;
    let n = p.panel_count as f64;

    let panel_origins = (0..p.panel_count)
        .map(|i| Point::new(p.horizontal_padding, (i as f64) * stride + p.spacing))
        .collect();

    Ok(Layout {
        panel_width: p.panel_width,
        panel_height,
        spacing: p.spacing,
        horizontal_padding: p.horizontal_padding,
        footer_height: p.footer_height,
        total_width: p.panel_width + 2.0 * p.horizontal_padding,
        total_height: n * stride + p.footer_height + p.spacing,
        panel_origins,
        footer_origin: Point::new(p.horizontal_padding, n * stride + p.spacing),
    })
}

/// A strip design such as `"4x1"`: `N` panels in one column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StripDesign {
    panels: usize,
}

impl StripDesign {
    /// Designs offered by the booth, largest first.
    pub const OFFERED: [&'static str; 3] = ["4x1", "3x1", "2x1"];

    /// A design with `panels` panels.
    pub fn new(panels: usize) -> StripResult<Self> {
        if panels < 1 {
            return Err(StripError::invalid_config("design needs at least one panel"));
        }
        Ok(Self { panels })
    }

    /// Number of panels.
    pub fn panel_count(self) -> usize {
        self.panels
    }

    /// Label shown to users (`"4 in 1"` for the four-panel strip).
    pub fn display_label(self) -> String {
        if self.panels == 4 {
            "4 in 1".to_string()
        } else {
            self.to_string()
        }
    }
}

impl FromStr for StripDesign {
    type Err = StripError;

    fn from_str(s: &str) -> StripResult<Self> {
        let bad = || StripError::invalid_config(format!("invalid design '{s}', expected '<N>x1'"));
        let (rows, cols) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
        if cols.trim() != "1" {
            return Err(bad());
        }
        let panels: usize = rows.trim().parse().map_err(|_| bad())?;
        Self::new(panels)
    }
}

impl std::fmt::Display for StripDesign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x1", self.panels)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/strip.rs"]
mod tests;
