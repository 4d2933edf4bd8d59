//! Helpers shared by the integration suites.
#![allow(dead_code)]

use mincluster_core::{ClusterId, Clustering, DataSource, DataSourceError, Digraph};

/// Points on a line, measured by absolute difference.
#[derive(Clone)]
pub struct Line {
    data: Vec<f64>,
}

impl Line {
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }
}

impl DataSource for Line {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn name(&self) -> &str {
        "line"
    }

    fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError> {
        let a = self
            .data
            .get(i)
            .ok_or(DataSourceError::OutOfBounds { index: i })?;
        let b = self
            .data
            .get(j)
            .ok_or(DataSourceError::OutOfBounds { index: j })?;
        Ok((a - b).abs())
    }
}

/// Ten vertices, one nearest neighbour each.
#[must_use]
pub fn one_nn() -> Digraph {
    ".*......../...*....../*........./.*......../.....*..../\
     ...*....../....*...../......*.../......*.../......*.../"
        .parse()
        .expect("fixture parses")
}

#[must_use]
pub fn raw_labels(clustering: &Clustering) -> Vec<Option<usize>> {
    clustering
        .labels()
        .iter()
        .map(|label| label.map(ClusterId::get))
        .collect()
}
