//! Label Sets
//!
//! Sorted, de-duplicated string sets used for user tiers, countries and cart categories.

use std::{cmp::Ordering, fmt, iter, slice};

use serde::Deserialize;
use smallvec::SmallVec;

/// A sorted set of labels backed by a `SmallVec<[String; 5]>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct LabelSet {
    labels: SmallVec<[String; 5]>,
}

impl LabelSet {
    /// Create a label set, sorting and removing duplicates.
    #[must_use]
    pub fn new(labels: SmallVec<[String; 5]>) -> Self {
        let mut set = Self { labels };

        set.labels.sort();
        set.labels.dedup();

        set
    }

    /// Create an empty label set.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            labels: SmallVec::new(),
        }
    }

    /// Create a label set from string slices.
    pub fn from_strs(labels: &[&str]) -> Self {
        Self::new(labels.iter().map(ToString::to_string).collect())
    }

    /// Whether the set contains `label`. Matching is case-sensitive.
    pub fn contains(&self, label: &str) -> bool {
        self.labels
            .binary_search_by(|probe| probe.as_str().cmp(label))
            .is_ok()
    }

    /// Whether the two sets share at least one label.
    pub fn intersects(&self, other: &Self) -> bool {
        let mut left = self.labels.iter();
        let mut right = other.labels.iter();
        let mut left_label = left.next();
        let mut right_label = right.next();

        while let (Some(l), Some(r)) = (left_label, right_label) {
            match l.cmp(r) {
                Ordering::Equal => return true,
                Ordering::Less => left_label = left.next(),
                Ordering::Greater => right_label = right.next(),
            }
        }

        false
    }

    /// Add a label, keeping the set sorted.
    pub fn insert(&mut self, label: &str) {
        if let Err(pos) = self
            .labels
            .binary_search_by(|probe| probe.as_str().cmp(label))
        {
            self.labels.insert(pos, label.to_string());
        }
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of labels in the set.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Iterate over the labels in sorted order.
    pub fn iter(&self) -> LabelIter<'_> {
        self.into_iter()
    }
}

/// Iterator over the labels of a [`LabelSet`].
pub type LabelIter<'s> = iter::Map<slice::Iter<'s, String>, fn(&String) -> &str>;

impl<'s> IntoIterator for &'s LabelSet {
    type Item = &'s str;
    type IntoIter = LabelIter<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter().map(String::as_str as fn(&String) -> &str)
    }
}

impl From<Vec<String>> for LabelSet {
    fn from(labels: Vec<String>) -> Self {
        Self::new(labels.into_iter().collect())
    }
}

impl<'s> FromIterator<&'s str> for LabelSet {
    fn from_iter<I: IntoIterator<Item = &'s str>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(ToString::to_string).collect())
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        for label in &self.labels {
            if !first {
                f.write_str(", ")?;
            }

            f.write_str(label)?;
            first = false;
        }

        Ok(())
    }
}
