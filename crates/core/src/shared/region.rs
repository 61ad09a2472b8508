/// Axis-aligned pixel rectangle `(x0, y0)`..`(x1, y1)` produced by the box
/// mapper.
///
/// Coordinates are not clamped: a detection near the frame edge may map
/// partly (or entirely) outside the frame. Use [`CropRect::clamp_to`] to get
/// the visible part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

/// The part of a [`CropRect`] that lies inside a frame, as `image` crop
/// arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClampedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> i32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> i32 {
        self.y1.saturating_sub(self.y0)
    }

    /// Intersects the rectangle with a `frame_width` x `frame_height` frame.
    ///
    /// Returns `None` when the intersection is empty.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<ClampedRect> {
        let fw = i64::from(frame_width);
        let fh = i64::from(frame_height);
        let x0 = i64::from(self.x0).clamp(0, fw);
        let y0 = i64::from(self.y0).clamp(0, fh);
        let x1 = i64::from(self.x1).clamp(0, fw);
        let y1 = i64::from(self.y1).clamp(0, fh);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(ClampedRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

impl std::fmt::Display for CropRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x0, self.y0, self.x1, self.y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_width_and_height() {
        let r = CropRect::new(10, 20, 40, 80);
        assert_eq!(r.width(), 30);
        assert_eq!(r.height(), 60);
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        let r = CropRect::new(10, 20, 40, 80);
        assert_eq!(
            r.clamp_to(100, 100),
            Some(ClampedRect {
                x: 10,
                y: 20,
                width: 30,
                height: 60
            })
        );
    }

    #[test]
    fn test_clamp_trims_overhang() {
        let r = CropRect::new(-5, 90, 20, 130);
        assert_eq!(
            r.clamp_to(100, 100),
            Some(ClampedRect {
                x: 0,
                y: 90,
                width: 20,
                height: 10
            })
        );
    }

    // ── Empty intersections ───────────────────────────────────────────

    #[rstest]
    #[case::zero_width(CropRect::new(10, 10, 10, 50))]
    #[case::inverted(CropRect::new(50, 50, 10, 10))]
    #[case::right_of_frame(CropRect::new(120, 10, 150, 50))]
    #[case::above_frame(CropRect::new(10, -50, 50, -1))]
    fn test_clamp_empty(#[case] r: CropRect) {
        assert_eq!(r.clamp_to(100, 100), None);
    }

    #[test]
    fn test_extreme_extents_saturate() {
        let r = CropRect::new(i32::MIN, i32::MAX, i32::MAX, i32::MIN);
        assert_eq!(r.width(), i32::MAX);
        assert_eq!(r.height(), i32::MIN);
        assert_eq!(r.clamp_to(100, 100), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CropRect::new(1, 2, 3, 4).to_string(), "(1, 2)-(3, 4)");
    }
}
