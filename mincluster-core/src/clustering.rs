//! Clustering data model.
//!
//! A [`Clustering`] stores one optional label per vertex together with the
//! number of clusters. Labels are dense: every identifier in
//! `0..cluster_count` is carried by at least one vertex, and a vertex without
//! a label is unassigned.

use std::collections::HashSet;

use thiserror::Error;

/// Identifier assigned to a cluster.
///
/// # Examples
/// ```
/// use mincluster_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(usize);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: usize) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> usize { self.0 }
}

/// Error returned when cluster labels are not contiguous starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousClusterIds {
    /// Labels were present but none of them was `0`.
    #[error("cluster identifiers must include 0")]
    MissingZero,
    /// The labels skip identifiers.
    #[error("cluster identifiers must be contiguous without gaps")]
    Gap,
    /// The labels require identifiers beyond the host pointer width.
    #[error("cluster identifiers exceed or reach the host pointer-width limit")]
    Overflow,
}

/// A label per vertex (or unassigned) plus the number of clusters.
///
/// # Examples
/// ```
/// use mincluster_core::{ClusterId, Clustering};
///
/// let clustering = Clustering::try_from_labels(vec![
///     Some(ClusterId::new(0)),
///     None,
///     Some(ClusterId::new(1)),
///     Some(ClusterId::new(0)),
/// ])
/// .expect("labels are contiguous");
/// assert_eq!(clustering.cluster_count(), 2);
/// assert_eq!(clustering.assigned_count(), 3);
/// assert_eq!(clustering.cluster_sizes(), vec![2, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    labels: Vec<Option<ClusterId>>,
    cluster_count: usize,
}

impl Clustering {
    /// Creates a clustering over `vertices` vertices with every vertex
    /// unassigned and no clusters.
    #[must_use]
    pub fn unassigned(vertices: usize) -> Self {
        Self {
            labels: vec![None; vertices],
            cluster_count: 0,
        }
    }

    /// Builds a clustering from explicit labels.
    ///
    /// The assigned labels must start at zero and be contiguous. An input with
    /// no assigned labels yields `cluster_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousClusterIds::MissingZero`] when cluster `0` is
    /// absent, [`NonContiguousClusterIds::Gap`] when identifiers skip values,
    /// and [`NonContiguousClusterIds::Overflow`] when identifiers reach the
    /// host pointer width.
    pub fn try_from_labels(
        labels: Vec<Option<ClusterId>>,
    ) -> Result<Self, NonContiguousClusterIds> {
        let mut seen = HashSet::new();
        let mut max_id = None::<usize>;
        for id in labels.iter().flatten() {
            seen.insert(id.get());
            max_id = Some(max_id.map_or(id.get(), |max| max.max(id.get())));
        }

        let Some(max_id) = max_id else {
            return Ok(Self {
                labels,
                cluster_count: 0,
            });
        };

        if !seen.contains(&0) {
            return Err(NonContiguousClusterIds::MissingZero);
        }
        let expected = max_id
            .checked_add(1)
            .ok_or(NonContiguousClusterIds::Overflow)?;
        if seen.len() != expected {
            return Err(NonContiguousClusterIds::Gap);
        }

        Ok(Self {
            labels,
            cluster_count: expected,
        })
    }

    /// Returns the per-vertex labels in vertex order.
    #[must_use]
    pub fn labels(&self) -> &[Option<ClusterId>] {
        &self.labels
    }

    /// Returns the label of `vertex`, or `None` when it is unassigned or out
    /// of range.
    #[must_use]
    pub fn label(&self, vertex: usize) -> Option<ClusterId> {
        self.labels.get(vertex).copied().flatten()
    }

    /// Returns `true` when `vertex` carries a label.
    #[must_use]
    pub fn is_assigned(&self, vertex: usize) -> bool {
        self.label(vertex).is_some()
    }

    /// Number of vertices covered by the clustering.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` when the clustering covers no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of clusters.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Number of vertices that carry a label.
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.labels.iter().filter(|label| label.is_some()).count()
    }

    /// Iterates over unassigned vertices in ascending order.
    pub fn unassigned_vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(vertex, label)| label.is_none().then_some(vertex))
    }

    /// Returns the number of members of every cluster, indexed by label.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.cluster_count];
        for id in self.labels.iter().flatten() {
            if let Some(size) = sizes.get_mut(id.get()) {
                *size += 1;
            }
        }
        sizes
    }

    /// Opens a new, still empty cluster and returns its identifier.
    ///
    /// Callers must assign at least one vertex to the returned label before
    /// handing the clustering out.
    pub(crate) fn open_cluster(&mut self) -> ClusterId {
        let id = ClusterId::new(self.cluster_count);
        self.cluster_count += 1;
        id
    }

    pub(crate) fn assign(&mut self, vertex: usize, id: ClusterId) {
        debug_assert!(id.get() < self.cluster_count, "label {id:?} was never opened");
        if let Some(slot) = self.labels.get_mut(vertex) {
            *slot = Some(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn labels(raw: &[Option<usize>]) -> Vec<Option<ClusterId>> {
        raw.iter().map(|label| label.map(ClusterId::new)).collect()
    }

    #[rstest]
    #[case::missing_zero(&[Some(1), Some(2)], NonContiguousClusterIds::MissingZero)]
    #[case::gap(&[Some(0), None, Some(2)], NonContiguousClusterIds::Gap)]
    #[case::overflow(&[Some(0), Some(usize::MAX)], NonContiguousClusterIds::Overflow)]
    fn try_from_labels_rejects_sparse_labels(
        #[case] raw: &[Option<usize>],
        #[case] expected: NonContiguousClusterIds,
    ) {
        let err = Clustering::try_from_labels(labels(raw)).expect_err("labels must be rejected");
        assert_eq!(err, expected);
    }

    #[test]
    fn all_unassigned_labels_form_an_empty_clustering() {
        let clustering = Clustering::try_from_labels(labels(&[None, None])).expect("valid");
        assert_eq!(clustering.cluster_count(), 0);
        assert_eq!(clustering.unassigned_vertices().collect::<Vec<_>>(), [0, 1]);
    }

    #[test]
    fn opened_clusters_receive_consecutive_labels() {
        let mut clustering = Clustering::unassigned(3);
        let first = clustering.open_cluster();
        let second = clustering.open_cluster();
        clustering.assign(2, first);
        clustering.assign(0, second);

        assert_eq!(first, ClusterId::new(0));
        assert_eq!(second, ClusterId::new(1));
        assert_eq!(clustering.labels(), labels(&[Some(1), None, Some(0)]).as_slice());
        assert_eq!(clustering.cluster_sizes(), vec![1, 1]);
    }
}
