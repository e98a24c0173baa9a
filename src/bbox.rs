use serde_derive::{Deserialize, Serialize};
use std::marker::PhantomData;

pub trait BBoxFormat: std::fmt::Debug + Clone {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

/// Left-top-width-height format, contains left top corner and width-height
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

/// Four coordinates tagged with their layout. Units are whatever the producer
/// used: normalized fractions for parsed detections, pixels after projection.
/// Serialized as a bare `[f32; 4]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox<F: BBoxFormat>([f32; 4], PhantomData<F>);

impl<F: BBoxFormat> From<BBox<F>> for [f32; 4] {
    fn from(bbox: BBox<F>) -> Self {
        bbox.0
    }
}

// Use carefully: the slice must already be in format `F`
impl<F: BBoxFormat> From<[f32; 4]> for BBox<F> {
    fn from(slice: [f32; 4]) -> Self {
        BBox(slice, PhantomData)
    }
}

impl<F: BBoxFormat> BBox<F> {
    #[inline]
    pub fn as_slice(&self) -> &[f32; 4] {
        &self.0
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        BBox([left, top, right, bottom], PhantomData)
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

    #[inline]
    pub fn width(&self) -> f32 {
        self.right() - self.left()
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom() - self.top()
    }

    /// `left <= right` and `top <= bottom`, with no NaN coordinates.
    pub fn is_well_formed(&self) -> bool {
        self.left() <= self.right() && self.top() <= self.bottom()
    }

    /// Swaps inverted corners so the box is well formed.
    /// NaN coordinates are replaced by zero.
    pub fn ordered(&self) -> Self {
        let [l, t, r, b] = self.0.map(|v| if v.is_nan() { 0.0 } else { v });

        Self::ltrb(l.min(r), t.min(b), l.max(r), t.max(b))
    }

    #[inline]
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self::ltrb(
            self.left() * sx,
            self.top() * sy,
            self.right() * sx,
            self.bottom() * sy,
        )
    }

    /// Restricts every coordinate to `[0, width] x [0, height]`.
    pub fn clamped(&self, width: f32, height: f32) -> Self {
        Self::ltrb(
            self.left().clamp(0.0, width),
            self.top().clamp(0.0, height),
            self.right().clamp(0.0, width),
            self.bottom().clamp(0.0, height),
        )
    }

    #[inline]
    pub fn as_ltwh(&self) -> BBox<Ltwh> {
        self.into()
    }
}

impl BBox<Ltwh> {
    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.0[3]
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Ltwh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        Self(
            [v.0[0], v.0[1], v.0[2] - v.0[0], v.0[3] - v.0[1]],
            PhantomData,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_swaps_inverted_corners() {
        let bbox = BBox::ltrb(0.8, 0.6, 0.2, 0.1).ordered();

        assert_eq!(bbox.as_slice(), &[0.2, 0.1, 0.8, 0.6]);
        assert!(bbox.is_well_formed());
    }

    #[test]
    fn clamped_stays_inside_frame() {
        let bbox = BBox::ltrb(-12.0, 5.0, 700.0, 500.0).clamped(640.0, 480.0);

        assert_eq!(bbox.as_slice(), &[0.0, 5.0, 640.0, 480.0]);
    }

    #[test]
    fn ltrb_to_ltwh() {
        let ltwh = BBox::ltrb(10.0, 20.0, 110.0, 70.0).as_ltwh();

        assert_eq!(ltwh.as_slice(), &[10.0, 20.0, 100.0, 50.0]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let bbox = BBox::ltrb(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&bbox).unwrap();

        assert_eq!(json, "[1.0,2.0,3.0,4.0]");
        assert_eq!(serde_json::from_str::<BBox<Ltrb>>(&json).unwrap(), bbox);
    }
}
