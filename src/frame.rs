use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::detection::Detection;

/// All detections of one video frame, in the order they appeared in the file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub frame_number: u32,
    /// (width, height) the detection coordinates were normalized against.
    pub size: (u32, u32),
    pub detections: Vec<Detection>,
}

/// A detection projected onto a pixel frame, ready to be drawn.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Overlay {
    pub label: String,
    pub caption: String,
    pub bounds: BBox<Ltrb>,
}

impl FrameRecord {
    pub fn new(frame_number: u32, width: u32, height: u32) -> Self {
        Self {
            frame_number,
            size: (width, height),
            detections: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    #[inline]
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.detections.iter().map(|d| d.label.as_str())
    }

    /// Highest confidence among detections carrying exactly `label`.
    pub fn max_confidence(&self, label: &str) -> Option<f32> {
        self.detections
            .iter()
            .filter(|d| d.label == label)
            .map(|d| d.confidence)
            .fold(None, |best, c| match best {
                Some(b) if b >= c => Some(b),
                _ => Some(c),
            })
    }

    /// Boxes for a frame decoded at `width` x `height` pixels, which may
    /// differ from the recorded `size`.
    pub fn overlays(&self, width: u32, height: u32) -> Vec<Overlay> {
        self.detections
            .iter()
            .map(|d| Overlay {
                label: d.label.clone(),
                caption: d.caption(),
                bounds: d.pixel_bounds(width, height),
            })
            .collect()
    }
}
