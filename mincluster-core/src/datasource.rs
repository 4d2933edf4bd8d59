//! Distance oracle abstraction consumed by the greedy splitter.

use crate::error::DataSourceError;

/// Abstraction over a collection of items that can yield pairwise distances.
///
/// Distances must be symmetric, non-negative and finite. The clustering
/// engines treat the source as a pure function and never cache results.
///
/// # Examples
/// ```
/// use mincluster_core::{DataSource, DataSourceError};
///
/// struct Line(Vec<f64>);
///
/// impl DataSource for Line {
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "line" }
///     fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError> {
///         let a = self.0.get(i).ok_or(DataSourceError::OutOfBounds { index: i })?;
///         let b = self.0.get(j).ok_or(DataSourceError::OutOfBounds { index: j })?;
///         Ok((a - b).abs())
///     }
/// }
///
/// let src = Line(vec![1.0, 2.0, 4.0]);
/// assert_eq!(src.len(), 3);
/// assert_eq!(src.distance(0, 2)?, 3.0);
///
/// let batched = src.batch_distances(0, &[1, 2])?;
/// assert_eq!(batched, [1.0, 3.0]);
/// # Ok::<(), DataSourceError>(())
/// ```
pub trait DataSource {
    /// Returns number of items in the source.
    fn len(&self) -> usize;

    /// Returns whether the source contains no items.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Computes the distance between two items.
    ///
    /// # Errors
    /// Implementations return [`DataSourceError::OutOfBounds`] for invalid
    /// indices.
    fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError>;

    /// Computes the distances from `query` to every entry in `candidates`.
    ///
    /// Implementations can override this method with a vectorised kernel. The
    /// default implementation calls [`DataSource::distance`] repeatedly.
    ///
    /// # Errors
    /// Returns any [`DataSourceError`] surfaced by [`DataSource::distance`].
    fn batch_distances(
        &self,
        query: usize,
        candidates: &[usize],
    ) -> Result<Vec<f64>, DataSourceError> {
        candidates
            .iter()
            .map(|&candidate| self.distance(query, candidate))
            .collect()
    }

    /// Computes several distances at once, storing results in `out`.
    ///
    /// # Errors
    /// Returns [`DataSourceError::OutputLengthMismatch`] if
    /// `pairs.len() != out.len()`. If any pair fails, `out` is left unmodified.
    fn distance_batch(
        &self,
        pairs: &[(usize, usize)],
        out: &mut [f64],
    ) -> Result<(), DataSourceError> {
        if pairs.len() != out.len() {
            return Err(DataSourceError::OutputLengthMismatch {
                out: out.len(),
                expected: pairs.len(),
            });
        }
        let tmp = pairs
            .iter()
            .map(|&(i, j)| self.distance(i, j))
            .collect::<Result<Vec<_>, _>>()?;
        out.copy_from_slice(&tmp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CountingSource;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn batch_distances_invokes_scalar_distance() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource::new(vec![0.0, 1.0, 3.0], Arc::clone(&calls));

        let distances = source
            .batch_distances(0, &[1, 2])
            .expect("batch distances should succeed");

        assert_eq!(distances, vec![1.0, 3.0]);
        assert_eq!(source.calls().load(Ordering::Relaxed), 2);
    }

    #[test]
    fn distance_batch_leaves_output_untouched_on_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource::new(vec![0.0, 1.0], calls);
        let mut out = [7.0, 7.0];

        let err = source
            .distance_batch(&[(0, 1), (0, 9)], &mut out)
            .expect_err("out-of-range pair must fail");

        assert_eq!(err, DataSourceError::OutOfBounds { index: 9 });
        assert_eq!(out, [7.0, 7.0]);
    }

    #[test]
    fn distance_batch_rejects_mismatched_output() {
        let source = CountingSource::new(vec![0.0, 1.0], Arc::new(AtomicUsize::new(0)));
        let mut out = [0.0];

        let err = source
            .distance_batch(&[(0, 1), (1, 0)], &mut out)
            .expect_err("length mismatch must fail");

        assert!(matches!(
            err,
            DataSourceError::OutputLengthMismatch {
                out: 1,
                expected: 2
            }
        ));
    }
}
