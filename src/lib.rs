//! Parses per-frame object-detection annotation files into a frame-indexed
//! store and diffs two such stores label by label.

pub mod bbox;
pub mod catalog;
pub mod compare;
pub mod detection;
pub mod error;
pub mod format;
pub mod frame;
pub mod store;

pub use catalog::{distinct_labels, label_counts, sorted_labels};
pub use compare::{compare, Change, ComparisonRow, ComparisonSummary};
pub use detection::Detection;
pub use error::{Error, Result};
pub use frame::{FrameRecord, Overlay};
pub use store::{annotation_path_for, AnnotationStore, ParseStats};
