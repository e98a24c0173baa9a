use std::collections::{BTreeMap, HashSet};

use crate::store::AnnotationStore;

/// Every label that occurs in any frame of any of `stores`.
pub fn distinct_labels<'a, I>(stores: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a AnnotationStore>,
{
    stores
        .into_iter()
        .flat_map(|store| store.iter())
        .flat_map(|frame| frame.labels())
        .map(str::to_owned)
        .collect()
}

/// [`distinct_labels`] in lexicographic order, for display.
pub fn sorted_labels<'a, I>(stores: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a AnnotationStore>,
{
    let mut labels: Vec<String> = distinct_labels(stores).into_iter().collect();
    labels.sort_unstable();
    labels
}

/// Number of detections per label across `stores`.
pub fn label_counts<'a, I>(stores: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a AnnotationStore>,
{
    let mut counts = BTreeMap::new();

    for label in stores
        .into_iter()
        .flat_map(|store| store.iter())
        .flat_map(|frame| frame.labels())
    {
        *counts.entry(label.to_owned()).or_insert(0) += 1;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "Frame count: 1 Width: 10 Heigth: 10
Label: dog ID: 1 Confidence: 0.5 Detection count: 1 Position: center=(0.5, 0.5) Bounds: xmin=0.1, ymin=0.1, xmax=0.9, ymax=0.9
Label: car ID: 2 Confidence: 0.5 Detection count: 2 Position: center=(0.5, 0.5) Bounds: xmin=0.1, ymin=0.1, xmax=0.9, ymax=0.9
Frame count: 2 Width: 10 Heigth: 10
Label: car ID: 2 Confidence: 0.7 Detection count: 1 Position: center=(0.5, 0.5) Bounds: xmin=0.1, ymin=0.1, xmax=0.9, ymax=0.9";

    const B: &str = "Frame count: 1 Width: 10 Heigth: 10
Label: person ID: 0 Confidence: 0.9 Detection count: 1 Position: center=(0.5, 0.5) Bounds: xmin=0.1, ymin=0.1, xmax=0.9, ymax=0.9
Label: car ID: 2 Confidence: 0.4 Detection count: 2 Position: center=(0.5, 0.5) Bounds: xmin=0.1, ymin=0.1, xmax=0.9, ymax=0.9";

    #[test]
    fn union_over_both_stores() {
        let a = AnnotationStore::parse_str(A);
        let b = AnnotationStore::parse_str(B);

        assert_eq!(sorted_labels([&a, &b]), vec!["car", "dog", "person"]);
        assert_eq!(distinct_labels([&a]).len(), 2);
    }

    #[test]
    fn empty_store_has_no_labels() {
        assert!(distinct_labels([&AnnotationStore::new()]).is_empty());
    }

    #[test]
    fn counts_every_detection() {
        let a = AnnotationStore::parse_str(A);
        let b = AnnotationStore::parse_str(B);
        let counts = label_counts([&a, &b]);

        assert_eq!(counts.get("car"), Some(&3));
        assert_eq!(counts.get("dog"), Some(&1));
        assert_eq!(counts.get("person"), Some(&1));
    }
}
