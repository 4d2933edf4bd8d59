//! Structural operations producing new digraphs: copy, transpose, union and
//! adjacency product.
//!
//! Arc storage is reserved in two phases. Each operation first tries to
//! reserve a cheap upper bound on the result size; when that fails, or the
//! bound overflows, it counts the exact number of arcs with a dry run and
//! reserves exactly that. Only the second failure is reported.

use tracing::debug;

use super::Digraph;
use crate::error::DigraphError;

/// Marker value meaning "no tail has emitted this head yet".
const NO_TAIL: usize = usize::MAX;

/// Diagonal handling for [`Digraph::adjacency_product`].
///
/// The two flags are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProductOptions {
    /// Treat every vertex as adjacent to itself in the left operand, so the
    /// right operand's row for `v` joins row `v` of the product.
    pub force_diagonal: bool,
    /// Skip self-arcs of the left operand when composing.
    pub ignore_diagonal: bool,
}

impl Digraph {
    /// Returns a deep copy whose arc storage is sized exactly.
    ///
    /// # Errors
    /// Returns [`DigraphError::AllocationFailed`] when storage for the copy
    /// cannot be reserved.
    pub fn try_clone(&self) -> Result<Self, DigraphError> {
        let mut heads = reserve_arc_storage(Some(self.arc_count()), || self.arc_count())?;
        heads.extend_from_slice(&self.heads);
        Ok(Self::from_sound_parts(
            self.vertices,
            self.tail_offset.clone(),
            heads,
        ))
    }

    /// Reverses every arc.
    ///
    /// Row `v` of the result lists the tails of the arcs entering `v` in
    /// ascending order.
    ///
    /// # Errors
    /// Returns [`DigraphError::AllocationFailed`] when arc storage cannot be
    /// reserved.
    pub fn transpose(&self) -> Result<Self, DigraphError> {
        let mut tail_offset = vec![0; self.vertices + 1];
        for &head in &self.heads {
            tail_offset[head + 1] += 1;
        }
        for vertex in 0..self.vertices {
            tail_offset[vertex + 1] += tail_offset[vertex];
        }

        let mut heads = reserve_arc_storage(Some(self.arc_count()), || self.arc_count())?;
        heads.resize(self.arc_count(), 0);
        let mut cursor = tail_offset[..self.vertices].to_vec();
        for (tail, head) in self.iter_arcs() {
            heads[cursor[head]] = tail;
            cursor[head] += 1;
        }

        Ok(Self::from_sound_parts(self.vertices, tail_offset, heads))
    }

    /// Merges the arcs of several digraphs over the same vertex set.
    ///
    /// Row `v` of the result lists the heads of `graphs[0]` row `v` first,
    /// then new heads from `graphs[1]`, and so on; repeated heads keep their
    /// first position. With `ignore_self_loops`, arcs `v -> v` are dropped.
    /// An empty slice produces an empty digraph on zero vertices.
    ///
    /// # Errors
    /// Returns [`DigraphError::VertexCountMismatch`] when the inputs disagree
    /// on the vertex count and [`DigraphError::AllocationFailed`] when arc
    /// storage cannot be reserved.
    pub fn union(graphs: &[&Digraph], ignore_self_loops: bool) -> Result<Self, DigraphError> {
        let Some(first) = graphs.first() else {
            return Ok(Self::empty(0));
        };
        let vertices = first.vertices;
        for graph in graphs {
            graph.ensure_vertices(vertices)?;
        }

        let upper_bound = graphs
            .iter()
            .try_fold(0usize, |total, graph| total.checked_add(graph.arc_count()));
        let rows = move |tail: usize| graphs.iter().map(move |graph| graph.arcs(tail));
        let mut merger = RowMerger::new(vertices, ignore_self_loops);
        merger.collect(upper_bound, rows)
    }

    /// Composes two digraphs: the result has an arc `v -> x` whenever `a`
    /// has `v -> w` and `b` has `w -> x`.
    ///
    /// Row `v` visits `b`'s rows in the order of `a`'s row `v`, preceded by
    /// `b`'s own row `v` under [`ProductOptions::force_diagonal`]. Repeated
    /// heads keep their first position.
    ///
    /// # Errors
    /// Returns [`DigraphError::ConflictingDiagonalOptions`] when both
    /// diagonal flags are set, [`DigraphError::VertexCountMismatch`] when the
    /// operands differ in size, and [`DigraphError::AllocationFailed`] when arc
    /// storage cannot be reserved.
    pub fn adjacency_product(
        a: &Digraph,
        b: &Digraph,
        options: ProductOptions,
    ) -> Result<Self, DigraphError> {
        if options.force_diagonal && options.ignore_diagonal {
            return Err(DigraphError::ConflictingDiagonalOptions);
        }
        b.ensure_vertices(a.vertices)?;

        let rows = move |tail: usize| {
            let forced = options.force_diagonal.then(|| b.arcs(tail));
            let composed = a
                .arcs(tail)
                .iter()
                .filter(move |&&middle| !(options.ignore_diagonal && middle == tail))
                .map(move |&middle| b.arcs(middle));
            forced.into_iter().chain(composed)
        };
        let upper_bound = (0..a.vertices).try_fold(0usize, |total, tail| {
            rows(tail).try_fold(total, |total, row| total.checked_add(row.len()))
        });
        let mut merger = RowMerger::new(a.vertices, false);
        merger.collect(upper_bound, rows)
    }
}

/// Deduplicating row builder shared by union and product.
///
/// `marker[h]` records the last tail that emitted head `h`, so a head is
/// written at most once per row without clearing state between rows.
struct RowMerger {
    vertices: usize,
    skip_self_loops: bool,
    marker: Vec<usize>,
}

impl RowMerger {
    fn new(vertices: usize, skip_self_loops: bool) -> Self {
        Self {
            vertices,
            skip_self_loops,
            marker: vec![NO_TAIL; vertices],
        }
    }

    fn collect<'g, F, I>(
        &mut self,
        upper_bound: Option<usize>,
        rows: F,
    ) -> Result<Digraph, DigraphError>
    where
        F: Fn(usize) -> I,
        I: Iterator<Item = &'g [usize]>,
    {
        let mut heads = reserve_arc_storage(upper_bound, || self.count(&rows))?;
        self.marker.fill(NO_TAIL);

        let mut tail_offset = Vec::with_capacity(self.vertices + 1);
        tail_offset.push(0);
        for tail in 0..self.vertices {
            self.merge_row(tail, rows(tail), |head| heads.push(head));
            tail_offset.push(heads.len());
        }
        heads.shrink_to_fit();
        Ok(Digraph::from_sound_parts(self.vertices, tail_offset, heads))
    }

    fn count<'g, F, I>(&mut self, rows: &F) -> usize
    where
        F: Fn(usize) -> I,
        I: Iterator<Item = &'g [usize]>,
    {
        let mut arcs = 0;
        for tail in 0..self.vertices {
            self.merge_row(tail, rows(tail), |_| arcs += 1);
        }
        arcs
    }

    fn merge_row<'g>(
        &mut self,
        tail: usize,
        rows: impl Iterator<Item = &'g [usize]>,
        mut emit: impl FnMut(usize),
    ) {
        for &head in rows.flatten() {
            if self.skip_self_loops && head == tail {
                continue;
            }
            if self.marker[head] != tail {
                self.marker[head] = tail;
                emit(head);
            }
        }
    }
}

/// Reserves arc storage, trying `upper_bound` first and falling back to the
/// count produced by `exact` when that reservation fails or the bound
/// overflowed.
pub(crate) fn reserve_arc_storage(
    upper_bound: Option<usize>,
    exact: impl FnOnce() -> usize,
) -> Result<Vec<usize>, DigraphError> {
    let mut heads = Vec::new();
    if let Some(upper) = upper_bound {
        if heads.try_reserve_exact(upper).is_ok() {
            return Ok(heads);
        }
        debug!(upper, "optimistic arc reservation failed, counting exact arcs");
    }
    let arcs = exact();
    heads
        .try_reserve_exact(arcs)
        .map_err(|_| DigraphError::AllocationFailed { arcs })?;
    Ok(heads)
}
