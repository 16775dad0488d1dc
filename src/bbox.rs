use serde_derive::{Deserialize, Serialize};
use std::marker::PhantomData;

pub trait BBoxFormat: std::fmt::Debug + Copy + PartialEq {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

/// X-y-scale-ratio format, contains coordinates of the center of bbox,
/// its area (scale) and width/height aspect ratio
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Xysr;
impl BBoxFormat for Xysr {}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(bound = "")]
pub struct BBox<F: BBoxFormat>([f32; 4], PhantomData<F>);

impl<F: BBoxFormat> From<BBox<F>> for [f32; 4] {
    fn from(bbox: BBox<F>) -> Self {
        bbox.0
    }
}

impl<F: BBoxFormat> BBox<F> {
    #[inline]
    pub fn as_slice(&self) -> &[f32; 4] {
        &self.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], Default::default())
    }

    #[inline]
    pub fn as_xysr(&self) -> BBox<Xysr> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.0[3]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.0[2] - self.0[0]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.0[3] - self.0[1]
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Integer centroid of the box.
    ///
    /// Rounding policy: the exact corner midpoint is floored (towards negative
    /// infinity), so `(0, 0, 3, 3)` gives `(1, 1)` and `(-3, -3, 0, 0)` gives
    /// `(-2, -2)`. Values outside the `i32` range saturate.
    #[inline]
    pub fn centroid(&self) -> (i32, i32) {
        let cx = (self.0[0] + self.0[2]) / 2.0;
        let cy = (self.0[1] + self.0[3]) / 2.0;

        (cx.floor() as i32, cy.floor() as i32)
    }

    /// Intersection-over-union of two axis-aligned boxes, always in `[0, 1]`.
    pub fn iou(&self, other: &BBox<Ltrb>) -> f32 {
        let i_w = (self.right().min(other.right()) - self.left().max(other.left())).max(0.0);
        let i_h = (self.bottom().min(other.bottom()) - self.top().max(other.top())).max(0.0);
        let i_area = i_w * i_h;
        let union = self.area() + other.area() - i_area;

        if union > 0.0 && i_area > 0.0 {
            (i_area / union).min(1.0)
        } else {
            0.0
        }
    }
}

impl BBox<Xysr> {
    #[inline]
    pub fn xysr(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], Default::default())
    }

    #[inline(always)]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }

    #[inline(always)]
    pub fn cx(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn cy(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn scale(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn aspect_ratio(&self) -> f32 {
        self.0[3]
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Xysr> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        let w = v.0[2] - v.0[0];
        let h = v.0[3] - v.0[1];

        Self(
            [v.0[0] + w / 2.0, v.0[1] + h / 2.0, w * h, w / h],
            Default::default(),
        )
    }
}

impl<'a> From<&'a BBox<Xysr>> for BBox<Ltrb> {
    // not exactly invertible once the filter adds noise to scale and ratio,
    // a negative scale turns into NaN here
    #[inline]
    fn from(v: &'a BBox<Xysr>) -> Self {
        let w = (v.0[2] * v.0[3]).sqrt();
        let h = v.0[2] / w;

        Self(
            [
                v.0[0] - w / 2.0,
                v.0[1] - h / 2.0,
                v.0[0] + w / 2.0,
                v.0[1] + h / 2.0,
            ],
            Default::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_iou_identity_and_disjoint() {
        let a = BBox::ltrb(0.0, 0.0, 10.0, 10.0);
        let b = BBox::ltrb(20.0, 20.0, 30.0, 30.0);

        assert_abs_diff_eq!(a.iou(&a), 1.0, epsilon = 1e-6);
        assert_eq!(a.iou(&b), 0.0);

        // touching edges do not overlap
        let c = BBox::ltrb(10.0, 0.0, 20.0, 10.0);
        assert_eq!(a.iou(&c), 0.0);
    }

    #[test]
    fn test_iou_symmetric() {
        let a = BBox::ltrb(0.0, 0.0, 10.0, 10.0);
        let b = BBox::ltrb(5.0, 0.0, 15.0, 10.0);

        assert_abs_diff_eq!(a.iou(&b), b.iou(&a), epsilon = 1e-7);
        // 50 / (100 + 100 - 50)
        assert_abs_diff_eq!(a.iou(&b), 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_iou_nested() {
        let outer = BBox::ltrb(0.0, 0.0, 10.0, 10.0);
        let inner = BBox::ltrb(2.5, 2.5, 7.5, 7.5);

        assert_abs_diff_eq!(outer.iou(&inner), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_xysr_conversion() {
        let bbox = BBox::ltrb(10.0, 20.0, 30.0, 60.0);
        let z = bbox.as_xysr();

        assert_abs_diff_eq!(z.cx(), 20.0);
        assert_abs_diff_eq!(z.cy(), 40.0);
        assert_abs_diff_eq!(z.scale(), 800.0);
        assert_abs_diff_eq!(z.aspect_ratio(), 0.5);

        let back = z.as_ltrb();
        for (a, b) in bbox.as_slice().iter().zip(back.as_slice()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_negative_scale_is_not_finite() {
        let z = BBox::xysr(5.0, 5.0, -4.0, 1.0);

        assert!(!z.as_ltrb().is_finite());
    }

    #[test]
    fn test_centroid_floors() {
        assert_eq!(BBox::ltrb(0.0, 0.0, 3.0, 3.0).centroid(), (1, 1));
        assert_eq!(BBox::ltrb(-3.0, -3.0, 0.0, 0.0).centroid(), (-2, -2));
        assert_eq!(BBox::ltrb(0.0, 0.0, 10.0, 10.0).centroid(), (5, 5));
    }
}
