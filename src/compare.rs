//! Frame-by-frame, label-by-label confidence diff of two annotation stores.
//!
//! Rows are emitted frame-major (ascending frame number) and label-minor
//! (lexicographic label order). A `(frame, label)` pair produces a row only
//! when at least one side has that label in that frame. When a label occurs
//! several times in a frame only its best confidence takes part.

use std::collections::BTreeSet;
use std::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::AnnotationStore;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Improved,
    Regressed,
    Unchanged,
    /// Present only in the second store.
    Added,
    /// Present only in the first store.
    Removed,
}

impl Change {
    fn classify(a: Option<f32>, b: Option<f32>) -> Option<(Self, Option<f32>)> {
        match (a, b) {
            (None, None) => None,
            (Some(_), None) => Some((Change::Removed, None)),
            (None, Some(_)) => Some((Change::Added, None)),
            (Some(a), Some(b)) => {
                let delta = b - a;
                let change = if delta > 0.0 {
                    Change::Improved
                } else if delta < 0.0 {
                    Change::Regressed
                } else {
                    Change::Unchanged
                };

                Some((change, Some(delta)))
            }
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Change::Improved => "improved",
            Change::Regressed => "regressed",
            Change::Unchanged => "unchanged",
            Change::Added => "added",
            Change::Removed => "removed",
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub frame_number: u32,
    pub label: String,
    pub confidence_a: Option<f32>,
    pub confidence_b: Option<f32>,
    /// `confidence_b - confidence_a`, only when both sides are present.
    pub delta: Option<f32>,
    pub change: Change,
}

impl ComparisonRow {
    /// Table cells: frame, label, both confidences and the signed delta.
    /// Missing values render as `-`.
    pub fn cells(&self) -> [String; 5] {
        let conf = |c: Option<f32>| c.map_or_else(|| "-".to_string(), |c| format!("{:.2}", c));

        [
            self.frame_number.to_string(),
            self.label.clone(),
            conf(self.confidence_a),
            conf(self.confidence_b),
            self.delta
                .map_or_else(|| "-".to_string(), |d| format!("{:+.2}", d)),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparisonSummary {
    pub rows: usize,
    pub frames: usize,
    pub improved: usize,
    pub regressed: usize,
    pub unchanged: usize,
    pub added: usize,
    pub removed: usize,
}

impl ComparisonSummary {
    pub fn from_rows(rows: &[ComparisonRow]) -> Self {
        let mut summary = Self {
            rows: rows.len(),
            ..Self::default()
        };

        let mut last_frame = None;
        for row in rows {
            if last_frame != Some(row.frame_number) {
                summary.frames += 1;
                last_frame = Some(row.frame_number);
            }

            match row.change {
                Change::Improved => summary.improved += 1,
                Change::Regressed => summary.regressed += 1,
                Change::Unchanged => summary.unchanged += 1,
                Change::Added => summary.added += 1,
                Change::Removed => summary.removed += 1,
            }
        }

        summary
    }
}

/// Compares `a` (baseline) against `b` for the selected `labels`.
///
/// Fails with [`Error::InvalidInput`] when no label is selected or when
/// either store was never loaded.
pub fn compare<I>(
    a: &AnnotationStore,
    b: &AnnotationStore,
    labels: I,
) -> Result<Vec<ComparisonRow>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    if !a.is_loaded() || !b.is_loaded() {
        return Err(Error::InvalidInput(
            "both annotation stores must be loaded".into(),
        ));
    }

    let labels: BTreeSet<String> = labels
        .into_iter()
        .map(|l| l.as_ref().to_owned())
        .collect();
    if labels.is_empty() {
        return Err(Error::InvalidInput("no labels selected".into()));
    }

    let frames: BTreeSet<u32> = a
        .frame_numbers()
        .into_iter()
        .chain(b.frame_numbers())
        .collect();

    let frame_count = frames.len();
    let mut rows = Vec::new();
    for frame_number in frames {
        let frame_a = a.get(frame_number);
        let frame_b = b.get(frame_number);

        for label in &labels {
            let conf_a = frame_a.and_then(|f| f.max_confidence(label));
            let conf_b = frame_b.and_then(|f| f.max_confidence(label));

            if let Some((change, delta)) = Change::classify(conf_a, conf_b) {
                rows.push(ComparisonRow {
                    frame_number,
                    label: label.clone(),
                    confidence_a: conf_a,
                    confidence_b: conf_b,
                    delta,
                    change,
                });
            }
        }
    }

    log::debug!(
        "compared {} labels over {} frames: {} rows",
        labels.len(),
        frame_count,
        rows.len()
    );

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(frames: Vec<(u32, Vec<(&str, f32)>)>) -> AnnotationStore {
        let mut text = String::new();
        for (n, dets) in &frames {
            text.push_str(&format!("Frame count: {} Width: 640 Heigth: 480\n", n));
            for (label, conf) in dets {
                text.push_str(&format!(
                    "Label: {} ID: 0 Confidence: {} Detection count: 1 \
                     Position: center=(0.5, 0.5) Bounds: xmin=0.1, ymin=0.1, xmax=0.9, ymax=0.9\n",
                    label, conf
                ));
            }
        }
        AnnotationStore::parse_str(&text)
    }

    fn assert_close(actual: Option<f32>, expected: f32) {
        let actual = actual.expect("value present");
        assert!(
            (actual - expected).abs() < 1e-5,
            "{} != {}",
            actual,
            expected
        );
    }

    #[test]
    fn label_missing_on_one_side_is_removed() {
        let a = store(vec![(5, vec![("car", 0.7)])]);
        let b = store(vec![(5, vec![])]);

        let rows = compare(&a, &b, ["car"]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].frame_number, 5);
        assert_eq!(rows[0].confidence_a, Some(0.7));
        assert_eq!(rows[0].confidence_b, None);
        assert_eq!(rows[0].delta, None);
        assert_eq!(rows[0].change, Change::Removed);
    }

    #[test]
    fn frame_missing_from_first_store_is_added() {
        let a = store(vec![]);
        let b = store(vec![(3, vec![("car", 0.7)])]);

        let rows = compare(&a, &b, ["car"]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].change, Change::Added);
    }

    #[test]
    fn delta_sign_follows_store_order() {
        let a = store(vec![(1, vec![("car", 0.40)])]);
        let b = store(vec![(1, vec![("car", 0.90)])]);

        let forward = compare(&a, &b, ["car"]).unwrap();
        assert_close(forward[0].delta, 0.5);
        assert_eq!(forward[0].change, Change::Improved);

        let backward = compare(&b, &a, ["car"]).unwrap();
        assert_close(backward[0].delta, -0.5);
        assert_eq!(backward[0].change, Change::Regressed);
    }

    #[test]
    fn best_instance_per_frame_is_used() {
        let a = store(vec![(10, vec![("dog", 0.55)])]);
        let b = store(vec![(10, vec![("dog", 0.80), ("dog", 0.60)])]);

        let rows = compare(&a, &b, ["dog"]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "dog");
        assert_eq!(rows[0].confidence_a, Some(0.55));
        assert_eq!(rows[0].confidence_b, Some(0.80));
        assert_close(rows[0].delta, 0.25);
        assert_eq!(rows[0].change, Change::Improved);
    }

    #[test]
    fn equal_confidence_is_unchanged() {
        let a = store(vec![(2, vec![("car", 0.3), ("car", 0.8)])]);
        let b = store(vec![(2, vec![("car", 0.8)])]);

        let rows = compare(&a, &b, ["car"]).unwrap();
        assert_eq!(rows[0].confidence_a, Some(0.8));
        assert_eq!(rows[0].delta, Some(0.0));
        assert_eq!(rows[0].change, Change::Unchanged);
    }

    #[test]
    fn rows_are_frame_major_then_label_sorted() {
        let a = store(vec![(20, vec![("dog", 0.5), ("car", 0.5)]), (3, vec![("car", 0.1)])]);
        let b = store(vec![(7, vec![("person", 0.9)]), (20, vec![("car", 0.6)])]);

        let rows = compare(&a, &b, ["person", "dog", "car", "dog"]).unwrap();
        let keys: Vec<(u32, &str)> = rows
            .iter()
            .map(|r| (r.frame_number, r.label.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![(3, "car"), (7, "person"), (20, "car"), (20, "dog")]
        );
    }

    #[test]
    fn unselected_labels_are_ignored() {
        let a = store(vec![(1, vec![("cat", 0.5)])]);
        let b = store(vec![(1, vec![("cat", 0.6)])]);

        assert!(compare(&a, &b, ["car"]).unwrap().is_empty());
    }

    #[test]
    fn empty_selection_is_rejected() {
        let a = store(vec![(1, vec![("car", 0.5)])]);
        let none: [&str; 0] = [];

        assert!(matches!(
            compare(&a, &a, none),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn unloaded_store_is_rejected() {
        let a = store(vec![(1, vec![("car", 0.5)])]);

        assert!(matches!(
            compare(&a, &AnnotationStore::new(), ["car"]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn cells_render_missing_values_as_dash() {
        let row = ComparisonRow {
            frame_number: 12,
            label: "car".into(),
            confidence_a: Some(0.4),
            confidence_b: None,
            delta: None,
            change: Change::Removed,
        };
        assert_eq!(row.cells(), ["12", "car", "0.40", "-", "-"].map(String::from));

        let row = ComparisonRow {
            confidence_b: Some(0.65),
            delta: Some(0.25),
            change: Change::Improved,
            ..row
        };
        assert_eq!(row.cells()[4], "+0.25");
    }

    #[test]
    fn summary_counts_changes_and_frames() {
        let a = store(vec![(1, vec![("car", 0.5), ("dog", 0.5)]), (2, vec![("car", 0.9)])]);
        let b = store(vec![(1, vec![("car", 0.6)]), (2, vec![("car", 0.8)]), (4, vec![("dog", 0.1)])]);

        let rows = compare(&a, &b, ["car", "dog"]).unwrap();
        let summary = ComparisonSummary::from_rows(&rows);

        assert_eq!(
            summary,
            ComparisonSummary {
                rows: 4,
                frames: 3,
                improved: 1,
                regressed: 1,
                unchanged: 0,
                added: 1,
                removed: 1,
            }
        );
    }
}
