use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::region::CropRect;

/// How a detection's four normalized box values are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxLayout {
    /// `[x0, y0, extent, _]`: the third value sizes both axes, scaled by
    /// width and height respectively. Matches crops produced by earlier
    /// deployments.
    #[default]
    Legacy,
    /// `[x0, y0, width, height]`.
    Extent,
    /// `[ymin, xmin, ymax, xmax]`, the TensorFlow object detection layout.
    Corners,
}

impl BoxLayout {
    pub const ALL: &[BoxLayout] = &[BoxLayout::Legacy, BoxLayout::Extent, BoxLayout::Corners];
}

impl fmt::Display for BoxLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxLayout::Legacy => write!(f, "legacy"),
            BoxLayout::Extent => write!(f, "extent"),
            BoxLayout::Corners => write!(f, "corners"),
        }
    }
}

impl FromStr for BoxLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoxLayout::ALL
            .iter()
            .copied()
            .find(|layout| layout.to_string() == s)
            .ok_or_else(|| format!("Box layout must be 'legacy', 'extent' or 'corners', got '{s}'"))
    }
}

/// Maps normalized detection boxes to pixel rectangles.
///
/// All products are computed in `f32` and truncated toward zero, so a given
/// box and frame size always yield the same rectangle. The result is not
/// clamped to the frame; sums saturate at the `i32` limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoxMapper {
    layout: BoxLayout,
}

impl BoxMapper {
    pub fn new(layout: BoxLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> BoxLayout {
        self.layout
    }

    pub fn map(&self, bbox: [f32; 4], width: u32, height: u32) -> CropRect {
        let w = width as f32;
        let h = height as f32;
        let [v0, v1, v2, v3] = bbox;

        match self.layout {
            BoxLayout::Legacy => {
                let x0 = scale(v0, w);
                let y0 = scale(v1, h);
                CropRect::new(
                    x0,
                    y0,
                    x0.saturating_add(scale(v2, w)),
                    y0.saturating_add(scale(v2, h)),
                )
            }
            BoxLayout::Extent => {
                let x0 = scale(v0, w);
                let y0 = scale(v1, h);
                CropRect::new(
                    x0,
                    y0,
                    x0.saturating_add(scale(v2, w)),
                    y0.saturating_add(scale(v3, h)),
                )
            }
            BoxLayout::Corners => {
                CropRect::new(scale(v1, w), scale(v0, h), scale(v3, w), scale(v2, h))
            }
        }
    }
}

/// `value * dim` truncated toward zero (saturating, NaN maps to 0).
fn scale(value: f32, dim: f32) -> i32 {
    (value * dim) as i32
}
