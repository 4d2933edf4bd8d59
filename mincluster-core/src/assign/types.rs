//! Per-type minimum membership constraints.

use std::sync::Arc;

use crate::{
    clustering::{ClusterId, Clustering},
    error::ClusteringError,
};

/// Assigns every vertex a type and requires each cluster to hold at least
/// `minimums[t]` vertices of type `t`.
///
/// # Examples
/// ```
/// use mincluster_core::TypeConstraints;
///
/// let constraints = TypeConstraints::new(vec![0, 1, 1, 0], vec![1, 1])?;
/// assert_eq!(constraints.type_count(), 2);
/// assert_eq!(constraints.type_of(2), Some(1));
/// assert_eq!(constraints.total_minimum(), 2);
/// # Ok::<(), mincluster_core::ClusteringError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeConstraints {
    type_labels: Vec<usize>,
    minimums: Vec<usize>,
}

impl TypeConstraints {
    /// Validates and stores the per-vertex types and per-type minimums.
    ///
    /// # Errors
    /// Returns [`ClusteringError::InvalidTypeConstraints`] when no type is
    /// defined or a vertex refers to an undefined type.
    pub fn new(type_labels: Vec<usize>, minimums: Vec<usize>) -> Result<Self, ClusteringError> {
        if minimums.is_empty() {
            return Err(invalid("at least one type must be defined"));
        }
        if let Some((vertex, &label)) = type_labels
            .iter()
            .enumerate()
            .find(|&(_, &label)| label >= minimums.len())
        {
            return Err(invalid(&format!(
                "vertex {vertex} has type {label} but only {} types are defined",
                minimums.len()
            )));
        }
        Ok(Self {
            type_labels,
            minimums,
        })
    }

    /// Number of labelled vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.type_labels.len()
    }

    /// Returns `true` when no vertex is labelled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_labels.is_empty()
    }

    /// Number of distinct types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.minimums.len()
    }

    /// Type of `vertex`, or `None` when out of range.
    #[must_use]
    pub fn type_of(&self, vertex: usize) -> Option<usize> {
        self.type_labels.get(vertex).copied()
    }

    /// Minimum member count per type.
    #[must_use]
    pub fn minimums(&self) -> &[usize] {
        &self.minimums
    }

    /// Sum of all per-type minimums, saturating at `usize::MAX`.
    #[must_use]
    pub fn total_minimum(&self) -> usize {
        self.minimums
            .iter()
            .fold(0usize, |total, &minimum| total.saturating_add(minimum))
    }

    /// Lists the clusters of `clustering` that miss at least one type
    /// minimum, in ascending label order.
    ///
    /// # Errors
    /// Returns [`ClusteringError::TypeLabelCountMismatch`] when the
    /// clustering covers a different number of vertices.
    pub fn unsatisfied_clusters(
        &self,
        clustering: &Clustering,
    ) -> Result<Vec<ClusterId>, ClusteringError> {
        self.ensure_covers(clustering.len())?;
        let counts = self.type_counts(clustering);
        let types = self.type_count();
        Ok((0..clustering.cluster_count())
            .filter(|&cluster| {
                self.minimums
                    .iter()
                    .enumerate()
                    .any(|(kind, &minimum)| counts[cluster * types + kind] < minimum)
            })
            .map(ClusterId::new)
            .collect())
    }

    pub(crate) fn ensure_covers(&self, vertices: usize) -> Result<(), ClusteringError> {
        if self.len() == vertices {
            Ok(())
        } else {
            Err(ClusteringError::TypeLabelCountMismatch {
                labels: self.len(),
                vertices,
            })
        }
    }

    /// Members per cluster and type, flattened as `cluster * types + type`.
    pub(crate) fn type_counts(&self, clustering: &Clustering) -> Vec<usize> {
        let types = self.type_count();
        let mut counts = vec![0; clustering.cluster_count() * types];
        for (vertex, label) in clustering.labels().iter().enumerate() {
            if let (Some(id), Some(kind)) = (label, self.type_of(vertex)) {
                counts[id.get() * types + kind] += 1;
            }
        }
        counts
    }
}

fn invalid(reason: &str) -> ClusteringError {
    ClusteringError::InvalidTypeConstraints {
        reason: Arc::from(reason),
    }
}
