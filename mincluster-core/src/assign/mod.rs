//! Assignment of the vertices left unlabelled by seed selection.
//!
//! A *priority digraph* decides which clusters may claim an unassigned
//! vertex: vertex `v` may join the cluster of any head in its row that was
//! labelled before the pass started, and earlier arcs take precedence. Arcs
//! beyond a caliper are expected to be filtered out by whoever builds the
//! priority digraph, so a vertex without an eligible head simply stays
//! unassigned.

mod types;

use std::{cmp::Reverse, collections::BinaryHeap, num::NonZeroUsize};

use tracing::{debug, instrument};

use crate::{
    clustering::{ClusterId, Clustering},
    digraph::Digraph,
    error::{ClusteringError, DigraphError},
};

pub use self::types::TypeConstraints;

/// Gives every unassigned vertex the label of the first head in its
/// priority row that was labelled before the call, visiting vertices in
/// ascending id order. Labels handed out during the pass are not followed.
///
/// Returns the number of vertices that received a label.
///
/// # Errors
/// Returns [`ClusteringError::Digraph`] wrapping
/// [`DigraphError::VertexCountMismatch`] when `priority` and `clustering`
/// cover different vertex counts. The clustering is left untouched.
///
/// # Examples
/// ```
/// use mincluster_core::{ClusterId, Clustering, Digraph, assign_remaining_lexical};
///
/// let mut clustering = Clustering::try_from_labels(vec![Some(ClusterId::new(0)), None, None])
///     .expect("labels are contiguous");
/// let priority: Digraph = ".../*../.*./".parse()?;
///
/// let assigned = assign_remaining_lexical(&mut clustering, &priority)?;
/// assert_eq!(assigned, 1);
/// assert_eq!(clustering.label(1), Some(ClusterId::new(0)));
/// assert_eq!(clustering.label(2), None);
/// # Ok::<(), mincluster_core::ClusteringError>(())
/// ```
#[instrument(
    name = "core.assign_remaining",
    err,
    skip_all,
    fields(mode = "lexical", vertices = clustering.len(), clusters = clustering.cluster_count()),
)]
pub fn assign_remaining_lexical(
    clustering: &mut Clustering,
    priority: &Digraph,
) -> Result<usize, ClusteringError> {
    ensure_same_vertices(clustering, priority)?;
    let frozen = clustering.labels().to_vec();
    let mut assigned = 0;
    for (vertex, label) in frozen.iter().enumerate() {
        if label.is_some() {
            continue;
        }
        let adopted = priority
            .arcs(vertex)
            .iter()
            .find_map(|&head| frozen.get(head).copied().flatten());
        if let Some(id) = adopted {
            clustering.assign(vertex, id);
            assigned += 1;
        }
    }
    debug!(assigned, "lexical assignment finished");
    Ok(assigned)
}

/// Grows clusters towards `target` members, smallest cluster first.
///
/// Candidates follow the same rule as [`assign_remaining_lexical`]. While
/// some cluster is below `target`, the smallest such cluster (ties: lowest
/// label) claims its lowest-id claimable vertex, so a vertex eligible for
/// several clusters goes to the smaller one. Vertices still claimable
/// afterwards join their smallest candidate cluster, ties broken by arc
/// order.
///
/// With `types`, each type is first given its own growth pass (ascending
/// type id) in which clusters below that type's minimum claim vertices of
/// that type only.
///
/// Returns the number of vertices that received a label.
///
/// # Errors
/// Returns [`ClusteringError::Digraph`] when the vertex counts of `priority`
/// and `clustering` differ and [`ClusteringError::TypeLabelCountMismatch`]
/// when `types` labels a different number of vertices. The clustering is
/// left untouched on error.
#[instrument(
    name = "core.assign_remaining",
    err,
    skip_all,
    fields(
        mode = "desired_size",
        target = target.get(),
        typed = types.is_some(),
        vertices = clustering.len(),
        clusters = clustering.cluster_count(),
    ),
)]
pub fn assign_remaining_desired_size(
    clustering: &mut Clustering,
    priority: &Digraph,
    target: NonZeroUsize,
    types: Option<&TypeConstraints>,
) -> Result<usize, ClusteringError> {
    ensure_same_vertices(clustering, priority)?;
    if let Some(constraints) = types {
        constraints.ensure_covers(clustering.len())?;
    }

    let mut pass = DesiredSizePass::new(clustering, priority, types);
    if let Some(constraints) = types {
        for kind in 0..constraints.type_count() {
            pass.grow(Phase::Type(kind));
        }
    }
    pass.grow(Phase::Target(target.get()));
    pass.place_leftovers();

    debug!(assigned = pass.assigned, "desired-size assignment finished");
    Ok(pass.assigned)
}

fn ensure_same_vertices(
    clustering: &Clustering,
    priority: &Digraph,
) -> Result<(), ClusteringError> {
    if priority.vertices() == clustering.len() {
        Ok(())
    } else {
        Err(DigraphError::VertexCountMismatch {
            expected: clustering.len(),
            got: priority.vertices(),
        }
        .into())
    }
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    /// Fill each cluster's deficit for one type.
    Type(usize),
    /// Fill each cluster up to the overall target size.
    Target(usize),
}

struct TypeTally<'a> {
    constraints: &'a TypeConstraints,
    counts: Vec<usize>,
}

struct DesiredSizePass<'a> {
    clustering: &'a mut Clustering,
    /// Candidate clusters per vertex in arc order; empty for vertices that
    /// were labelled before the pass or have no labelled head.
    candidates: Vec<Vec<ClusterId>>,
    /// Vertices each cluster may claim, ascending.
    claimable: Vec<Vec<usize>>,
    sizes: Vec<usize>,
    tally: Option<TypeTally<'a>>,
    assigned: usize,
}

impl<'a> DesiredSizePass<'a> {
    fn new(
        clustering: &'a mut Clustering,
        priority: &Digraph,
        types: Option<&'a TypeConstraints>,
    ) -> Self {
        let frozen = clustering.labels();
        let mut candidates = vec![Vec::new(); frozen.len()];
        let mut claimable = vec![Vec::new(); clustering.cluster_count()];
        for (vertex, label) in frozen.iter().enumerate() {
            if label.is_some() {
                continue;
            }
            let found: &mut Vec<ClusterId> = &mut candidates[vertex];
            for id in priority.arcs(vertex).iter().filter_map(|&head| frozen[head]) {
                if !found.contains(&id) {
                    found.push(id);
                    claimable[id.get()].push(vertex);
                }
            }
        }

        let tally = types.map(|constraints| TypeTally {
            constraints,
            counts: constraints.type_counts(clustering),
        });
        Self {
            sizes: clustering.cluster_sizes(),
            clustering,
            candidates,
            claimable,
            tally,
            assigned: 0,
        }
    }

    fn deficit(&self, cluster: usize, phase: Phase) -> usize {
        match (phase, &self.tally) {
            (Phase::Target(target), _) => target.saturating_sub(self.sizes[cluster]),
            (Phase::Type(kind), Some(tally)) => {
                let types = tally.constraints.type_count();
                tally.constraints.minimums()[kind]
                    .saturating_sub(tally.counts[cluster * types + kind])
            }
            (Phase::Type(_), None) => 0,
        }
    }

    fn admits(&self, vertex: usize, phase: Phase) -> bool {
        match (phase, &self.tally) {
            (Phase::Type(kind), Some(tally)) => tally.constraints.type_of(vertex) == Some(kind),
            _ => true,
        }
    }

    /// Lets the smallest cluster with a deficit claim one vertex at a time
    /// until every deficit is met or no cluster can claim anything.
    fn grow(&mut self, phase: Phase) {
        let mut cursors = vec![0; self.claimable.len()];
        let mut heap: BinaryHeap<Reverse<(usize, usize)>> = (0..self.claimable.len())
            .filter(|&cluster| self.deficit(cluster, phase) > 0)
            .map(|cluster| Reverse((self.sizes[cluster], cluster)))
            .collect();

        while let Some(Reverse((_, cluster))) = heap.pop() {
            let Some(vertex) = self.next_claimable(cluster, &mut cursors[cluster], phase) else {
                continue;
            };
            self.claim(vertex, cluster);
            if self.deficit(cluster, phase) > 0 {
                heap.push(Reverse((self.sizes[cluster], cluster)));
            }
        }
    }

    fn next_claimable(&self, cluster: usize, cursor: &mut usize, phase: Phase) -> Option<usize> {
        let list = &self.claimable[cluster];
        while let Some(&vertex) = list.get(*cursor) {
            *cursor += 1;
            if !self.clustering.is_assigned(vertex) && self.admits(vertex, phase) {
                return Some(vertex);
            }
        }
        None
    }

    fn place_leftovers(&mut self) {
        for vertex in 0..self.candidates.len() {
            if self.clustering.is_assigned(vertex) {
                continue;
            }
            let smallest = self.candidates[vertex]
                .iter()
                .min_by_key(|id| self.sizes[id.get()])
                .map(|id| id.get());
            if let Some(cluster) = smallest {
                self.claim(vertex, cluster);
            }
        }
    }

    fn claim(&mut self, vertex: usize, cluster: usize) {
        self.clustering.assign(vertex, ClusterId::new(cluster));
        self.sizes[cluster] += 1;
        if let Some(tally) = &mut self.tally
            && let Some(kind) = tally.constraints.type_of(vertex)
        {
            tally.counts[cluster * tally.constraints.type_count() + kind] += 1;
        }
        self.assigned += 1;
    }
}
