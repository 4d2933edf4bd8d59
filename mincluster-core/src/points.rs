//! Dense row-major point sets measured with Euclidean distance.

use crate::{datasource::DataSource, error::DataSourceError};

/// A dense matrix of points implementing [`DataSource`] with Euclidean
/// distance.
///
/// # Examples
/// ```
/// use mincluster_core::{DataSource, PointMatrix};
///
/// let points = PointMatrix::from_rows("demo", vec![vec![0.0, 0.0], vec![3.0, 4.0]])?;
/// assert_eq!(points.len(), 2);
/// assert_eq!(points.dimension(), 2);
/// assert_eq!(points.distance(0, 1)?, 5.0);
/// # Ok::<(), mincluster_core::DataSourceError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PointMatrix {
    name: String,
    dimension: usize,
    values: Vec<f64>,
}

impl PointMatrix {
    /// Builds a matrix from individual rows.
    ///
    /// # Errors
    /// Returns [`DataSourceError::EmptyData`] when `rows` is empty,
    /// [`DataSourceError::ZeroDimension`] when the rows have no columns,
    /// [`DataSourceError::DimensionMismatch`] when row widths differ, and
    /// [`DataSourceError::NonFinite`] when a value is NaN or infinite.
    pub fn from_rows(
        name: impl Into<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, DataSourceError> {
        let dimension = rows.first().map(Vec::len).ok_or(DataSourceError::EmptyData)?;
        if dimension == 0 {
            return Err(DataSourceError::ZeroDimension);
        }

        let mut values = Vec::with_capacity(rows.len() * dimension);
        for (row, coordinates) in rows.iter().enumerate() {
            if coordinates.len() != dimension {
                return Err(DataSourceError::DimensionMismatch {
                    left: dimension,
                    right: coordinates.len(),
                });
            }
            if let Some(column) = coordinates.iter().position(|value| !value.is_finite()) {
                return Err(DataSourceError::NonFinite { row, column });
            }
            values.extend_from_slice(coordinates);
        }

        Ok(Self {
            name: name.into(),
            dimension,
            values,
        })
    }

    /// Number of coordinates per point.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the coordinates of `index`, if present.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.values.get(start..end)
    }

    fn checked_row(&self, index: usize) -> Result<&[f64], DataSourceError> {
        self.row(index).ok_or(DataSourceError::OutOfBounds { index })
    }
}

fn euclidean(left: &[f64], right: &[f64]) -> f64 {
    left.iter()
        .zip(right)
        .map(|(l, r)| (l - r) * (l - r))
        .sum::<f64>()
        .sqrt()
}

impl DataSource for PointMatrix {
    fn len(&self) -> usize {
        self.values.len() / self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError> {
        Ok(euclidean(self.checked_row(i)?, self.checked_row(j)?))
    }

    fn batch_distances(
        &self,
        query: usize,
        candidates: &[usize],
    ) -> Result<Vec<f64>, DataSourceError> {
        let origin = self.checked_row(query)?;
        candidates
            .iter()
            .map(|&candidate| Ok(euclidean(origin, self.checked_row(candidate)?)))
            .collect()
    }
}
