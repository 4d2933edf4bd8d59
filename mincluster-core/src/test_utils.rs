//! Shared test utilities for `mincluster-core`.

use proptest::{prelude::*, test_runner::Config as ProptestConfig};

use crate::{datasource::DataSource, digraph::Digraph, error::DataSourceError};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Environment variable overriding the number of cases per property.
const PROPTEST_CASES_ENV: &str = "PROPTEST_CASES";

/// Builds the proptest configuration shared by every property suite.
///
/// `PROPTEST_CASES` overrides `default_cases` when it holds a positive
/// integer.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let cases = std::env::var(PROPTEST_CASES_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|&cases| cases > 0)
        .unwrap_or(default_cases);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

/// Parses a digraph fixture written in the compact text format.
#[track_caller]
pub(crate) fn digraph(text: &str) -> Digraph {
    text.parse()
        .unwrap_or_else(|err| panic!("fixture {text:?} must parse: {err}"))
}

/// Generates digraphs with one to `max_vertices` vertices, self-arcs and
/// parallel arcs included.
pub(crate) fn arb_digraph(max_vertices: usize) -> impl Strategy<Value = Digraph> {
    (1..=max_vertices).prop_flat_map(|vertices| {
        prop::collection::vec(prop::collection::vec(0..vertices, 0..=vertices), vertices)
            .prop_map(|rows| Digraph::from_adjacency(&rows).expect("heads are in range"))
    })
}

/// Generates nearest-neighbour style digraphs: every vertex points at up to
/// `max_k` distinct other vertices, optionally including itself.
pub(crate) fn arb_nng(max_vertices: usize, max_k: usize) -> impl Strategy<Value = Digraph> {
    (2..=max_vertices, 1..=max_k, any::<bool>()).prop_flat_map(|(vertices, k, self_loops)| {
        let row = prop::sample::subsequence((0..vertices).collect::<Vec<_>>(), 0..=k.min(vertices))
            .prop_shuffle();
        prop::collection::vec(row, vertices).prop_map(move |rows| {
            let rows: Vec<Vec<usize>> = rows
                .into_iter()
                .enumerate()
                .map(|(tail, mut heads)| {
                    heads.retain(|&head| head != tail);
                    if self_loops {
                        heads.insert(0, tail);
                    }
                    heads
                })
                .collect();
            Digraph::from_adjacency(&rows).expect("heads are in range")
        })
    })
}

/// [`DataSource`] over scalar values that records distance invocations.
#[derive(Clone)]
pub(crate) struct CountingSource {
    data: Vec<f64>,
    calls: Arc<AtomicUsize>,
    name: &'static str,
}

impl CountingSource {
    /// Creates a counting source with the default "counting" name.
    #[must_use]
    pub(crate) fn new(data: Vec<f64>, calls: Arc<AtomicUsize>) -> Self {
        Self::with_name("counting", data, calls)
    }

    /// Creates a counting source with a specific display name.
    #[must_use]
    pub(crate) fn with_name(name: &'static str, data: Vec<f64>, calls: Arc<AtomicUsize>) -> Self {
        Self { data, calls, name }
    }

    /// Returns the backing distance counter for assertions.
    #[must_use]
    pub(crate) fn calls(&self) -> &Arc<AtomicUsize> {
        &self.calls
    }
}

impl DataSource for CountingSource {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn name(&self) -> &str {
        self.name
    }

    fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
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

/// Source returning a fixed distance matrix, used to exercise failure paths.
pub(crate) struct MatrixSource {
    rows: Vec<Vec<f64>>,
}

impl MatrixSource {
    pub(crate) fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }
}

impl DataSource for MatrixSource {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn name(&self) -> &str {
        "matrix"
    }

    fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError> {
        self.rows
            .get(i)
            .ok_or(DataSourceError::OutOfBounds { index: i })?
            .get(j)
            .copied()
            .ok_or(DataSourceError::OutOfBounds { index: j })
    }
}
