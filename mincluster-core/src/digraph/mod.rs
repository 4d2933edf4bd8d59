//! Compressed sparse row storage for directed graphs.
//!
//! A [`Digraph`] groups arc heads by tail: the arcs leaving `v` occupy
//! `heads[tail_offset[v]..tail_offset[v + 1]]`. Row order is significant for
//! consumers that break ties by arc position (first listed wins), so every
//! structural operation documents the order it produces.
//!
//! Every constructor validates the layout, so a `Digraph` value is always
//! sound: offsets start at zero, never decrease, end at the arc count, and
//! every head is a valid vertex.

mod ops;
mod text;

use crate::error::DigraphError;

pub use self::ops::ProductOptions;

/// A sparse directed graph over the vertices `0..vertices`.
///
/// Equality compares vertex counts and the *set* of heads in every row; use
/// [`Digraph::arcs`] when the order within a row matters.
///
/// # Examples
/// ```
/// use mincluster_core::Digraph;
///
/// let graph = Digraph::from_adjacency(&[vec![1], vec![0, 2], vec![]])?;
/// assert_eq!(graph.vertices(), 3);
/// assert_eq!(graph.arc_count(), 3);
/// assert_eq!(graph.arcs(1), &[0, 2]);
/// assert_eq!(graph.to_string(), ".*./*.*/.../");
/// # Ok::<(), mincluster_core::DigraphError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Digraph {
    vertices: usize,
    tail_offset: Vec<usize>,
    heads: Vec<usize>,
}

impl Digraph {
    /// Creates a digraph with `vertices` vertices and no arcs.
    #[must_use]
    pub fn empty(vertices: usize) -> Self {
        Self {
            vertices,
            tail_offset: vec![0; vertices + 1],
            heads: Vec::new(),
        }
    }

    /// Creates a digraph from raw CSR arrays.
    ///
    /// # Errors
    /// Returns [`DigraphError::InvalidOffsets`] when `tail_offset` does not
    /// have `vertices + 1` entries starting at zero, non-decreasing, and ending
    /// at `heads.len()`, and [`DigraphError::HeadOutOfRange`] when a head is not
    /// a vertex.
    pub fn from_parts(
        vertices: usize,
        tail_offset: Vec<usize>,
        heads: Vec<usize>,
    ) -> Result<Self, DigraphError> {
        validate_layout(vertices, &tail_offset, &heads)?;
        Ok(Self {
            vertices,
            tail_offset,
            heads,
        })
    }

    /// Creates a digraph whose row `v` lists the heads in `rows[v]`, in order.
    ///
    /// # Errors
    /// Returns [`DigraphError::HeadOutOfRange`] when a head is not below
    /// `rows.len()`.
    pub fn from_adjacency(rows: &[Vec<usize>]) -> Result<Self, DigraphError> {
        let vertices = rows.len();
        let mut tail_offset = Vec::with_capacity(vertices + 1);
        let mut heads = Vec::with_capacity(rows.iter().map(Vec::len).sum());
        tail_offset.push(0);
        for row in rows {
            if let Some(&head) = row.iter().find(|&&head| head >= vertices) {
                return Err(DigraphError::HeadOutOfRange { head, vertices });
            }
            heads.extend_from_slice(row);
            tail_offset.push(heads.len());
        }
        Ok(Self {
            vertices,
            tail_offset,
            heads,
        })
    }

    /// Assembles a digraph produced by an internal operation, checking the
    /// layout in debug builds only.
    pub(crate) fn from_sound_parts(
        vertices: usize,
        tail_offset: Vec<usize>,
        heads: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(validate_layout(vertices, &tail_offset, &heads), Ok(()));
        Self {
            vertices,
            tail_offset,
            heads,
        }
    }

    /// Number of vertices.
    #[rustfmt::skip]
    #[must_use]
    pub fn vertices(&self) -> usize { self.vertices }

    /// Number of stored arcs.
    #[rustfmt::skip]
    #[must_use]
    pub fn arc_count(&self) -> usize { self.heads.len() }

    /// Number of arcs the digraph can hold without reallocating.
    #[rustfmt::skip]
    #[must_use]
    pub fn arc_capacity(&self) -> usize { self.heads.capacity() }

    /// The tail offsets (`vertices + 1` entries).
    #[rustfmt::skip]
    #[must_use]
    pub fn tail_offsets(&self) -> &[usize] { &self.tail_offset }

    /// All heads grouped by tail.
    #[rustfmt::skip]
    #[must_use]
    pub fn heads(&self) -> &[usize] { &self.heads }

    /// Heads of the arcs leaving `tail`, in priority order. Out-of-range
    /// tails have no arcs.
    #[must_use]
    pub fn arcs(&self, tail: usize) -> &[usize] {
        match (self.tail_offset.get(tail), self.tail_offset.get(tail + 1)) {
            (Some(&start), Some(&end)) => self.heads.get(start..end).unwrap_or(&[]),
            _ => &[],
        }
    }

    /// Number of arcs leaving `tail`.
    #[must_use]
    pub fn out_degree(&self, tail: usize) -> usize {
        self.arcs(tail).len()
    }

    /// Returns `true` when the arc `tail -> head` exists.
    #[must_use]
    pub fn has_arc(&self, tail: usize, head: usize) -> bool {
        self.arcs(tail).contains(&head)
    }

    /// Iterates over every arc as `(tail, head)`, grouped by ascending tail.
    pub fn iter_arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.vertices)
            .flat_map(move |tail| self.arcs(tail).iter().map(move |&head| (tail, head)))
    }

    /// Number of arcs entering each vertex, self-arcs included.
    #[must_use]
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.vertices];
        for &head in &self.heads {
            degrees[head] += 1;
        }
        degrees
    }

    /// Returns `true` when at least one vertex has an arc to itself.
    #[must_use]
    pub fn has_self_loops(&self) -> bool {
        self.iter_arcs().any(|(tail, head)| tail == head)
    }

    /// Deletes every self-arc in place, keeping the order of remaining arcs.
    pub fn remove_self_loops(&mut self) {
        let mut write = 0;
        let mut read_start = 0;
        for tail in 0..self.vertices {
            let read_end = self.tail_offset[tail + 1];
            for read in read_start..read_end {
                let head = self.heads[read];
                if head != tail {
                    self.heads[write] = head;
                    write += 1;
                }
            }
            read_start = read_end;
            self.tail_offset[tail + 1] = write;
        }
        self.heads.truncate(write);
    }

    /// Releases spare arc capacity.
    pub fn shrink_to_fit(&mut self) {
        self.heads.shrink_to_fit();
    }

    fn ensure_vertices(&self, expected: usize) -> Result<(), DigraphError> {
        if self.vertices == expected {
            Ok(())
        } else {
            Err(DigraphError::VertexCountMismatch {
                expected,
                got: self.vertices,
            })
        }
    }
}

impl PartialEq for Digraph {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && (0..self.vertices).all(|tail| arc_set(self.arcs(tail)) == arc_set(other.arcs(tail)))
    }
}

impl Eq for Digraph {}

fn arc_set(arcs: &[usize]) -> Vec<usize> {
    let mut set = arcs.to_vec();
    set.sort_unstable();
    set.dedup();
    set
}

fn validate_layout(
    vertices: usize,
    tail_offset: &[usize],
    heads: &[usize],
) -> Result<(), DigraphError> {
    if tail_offset.len() != vertices + 1 {
        return Err(DigraphError::InvalidOffsets {
            vertex: tail_offset.len().min(vertices),
        });
    }
    if tail_offset.first() != Some(&0) {
        return Err(DigraphError::InvalidOffsets { vertex: 0 });
    }
    if let Some(vertex) = tail_offset
        .windows(2)
        .position(|window| window[0] > window[1])
    {
        return Err(DigraphError::InvalidOffsets { vertex });
    }
    if tail_offset.last() != Some(&heads.len()) {
        return Err(DigraphError::InvalidOffsets { vertex: vertices });
    }
    if let Some(&head) = heads.iter().find(|&&head| head >= vertices) {
        return Err(DigraphError::HeadOutOfRange { head, vertices });
    }
    Ok(())
}
