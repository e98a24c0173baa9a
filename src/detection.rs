use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};

/// One detected object inside a frame. Coordinates are normalized to the
/// frame size recorded in the owning [`FrameRecord`](crate::FrameRecord).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub id: u32,
    pub confidence: f32,
    pub detection_count: u32,
    pub center_x: f32,
    pub center_y: f32,
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl Detection {
    /// Normalized corners as parsed, possibly inverted.
    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltrb> {
        BBox::ltrb(self.xmin, self.ymin, self.xmax, self.ymax)
    }

    #[inline(always)]
    pub fn center(&self) -> (f32, f32) {
        (self.center_x, self.center_y)
    }

    /// Projects the normalized box onto a `width` x `height` pixel frame.
    /// Inverted corners are swapped and the result is clamped to the frame.
    pub fn pixel_bounds(&self, width: u32, height: u32) -> BBox<Ltrb> {
        let (w, h) = (width as f32, height as f32);
        let bounds = self.bbox().ordered().scaled(w, h).clamped(w, h);
        debug_assert!(bounds.is_well_formed());

        bounds
    }

    /// `"<label> <confidence>"` with two decimals, as drawn above a box.
    pub fn caption(&self) -> String {
        format!("{} {:.2}", self.label, self.confidence)
    }
}

#[cfg(test)]
pub(crate) fn detection(label: &str, confidence: f32) -> Detection {
    Detection {
        label: label.to_string(),
        id: 0,
        confidence,
        detection_count: 1,
        center_x: 0.5,
        center_y: 0.5,
        xmin: 0.25,
        ymin: 0.25,
        xmax: 0.75,
        ymax: 0.75,
    }
}
