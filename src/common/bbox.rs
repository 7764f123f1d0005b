//! Bounding-box geometry
//!
//! Two box representations are used across the crate:
//! - [`CornerBox`] - `(x1, y1, x2, y2)`, the form detectors emit and callers read back
//! - [`BBox`] - `(x, y, w, h)` top-left/width/height, the form the motion model tracks

use serde::{Deserialize, Serialize};

/// Box in corner form, as produced by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CornerBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CornerBox {
    /// Create a new corner box
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// True if all corners are finite and the box is not inverted.
    ///
    /// Zero-area boxes are accepted; they simply never overlap anything.
    pub fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
            && self.x2 >= self.x1
            && self.y2 >= self.y1
    }

    /// Convert to top-left/width/height form
    #[inline]
    pub fn to_tlwh(&self) -> BBox {
        BBox::new(self.x1, self.y1, self.x2 - self.x1, self.y2 - self.y1)
    }
}

/// Box in top-left/width/height form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BBox {
    /// Create a new box
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Convert to corner form
    #[inline]
    pub fn to_corners(&self) -> CornerBox {
        CornerBox::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    /// Box area; negative extents count as empty
    #[inline]
    pub fn area(&self) -> f32 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    /// Intersection-over-Union with another box, in `[0, 1]`.
    ///
    /// Returns 0 when the union is empty.
    pub fn iou(&self, other: &BBox) -> f32 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.w).min(other.x + other.w);
        let iy2 = (self.y + self.h).min(other.y + other.h);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        (inter / union).clamp(0.0, 1.0)
    }
}

impl From<CornerBox> for BBox {
    fn from(c: CornerBox) -> Self {
        c.to_tlwh()
    }
}

impl From<BBox> for CornerBox {
    fn from(b: BBox) -> Self {
        b.to_corners()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_roundtrip() {
        let c = CornerBox::new(10.0, 20.0, 50.0, 80.0);
        let b = c.to_tlwh();
        assert_eq!(b, BBox::new(10.0, 20.0, 40.0, 60.0));
        assert_eq!(b.to_corners(), c);
    }

    #[test]
    fn test_iou_identical() {
        let b = BBox::new(10.0, 10.0, 40.0, 40.0);
        assert!((b.iou(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint_and_partial() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(20.0, 20.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);

        // Half overlap along x: inter = 50, union = 150
        let c = BBox::new(5.0, 0.0, 10.0, 10.0);
        assert!((a.iou(&c) - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_degenerate() {
        let a = BBox::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(a.iou(&a), 0.0);
    }

    #[test]
    fn test_well_formed() {
        assert!(CornerBox::new(0.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!CornerBox::new(2.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!CornerBox::new(f32::NAN, 0.0, 1.0, 1.0).is_well_formed());
    }
}
