//! Seed selection over a nearest-neighbour digraph.
//!
//! A seed claims itself and its out-neighbours as a new cluster, so two seeds
//! must never reach a common vertex. Every policy produces a maximal set of
//! such seeds; they differ in the order candidates are tried.

mod bucket;

use std::num::NonZeroUsize;

use tracing::{debug, instrument};

use self::bucket::{BucketQueue, PopOrder};
use crate::{
    clustering::Clustering,
    digraph::{Digraph, ProductOptions},
    error::DigraphError,
};

/// Order in which [`find_seeds`] tries candidate seeds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SeedMethod {
    /// Ascending vertex id.
    Lexical,
    /// Ascending in-degree in the digraph, computed once.
    InwardsOrder,
    /// Ascending in-degree counting only arcs from unassigned vertices,
    /// refreshed after every selection.
    #[default]
    InwardsUpdating,
    /// Descending number of conflicting vertices, computed once.
    ExclusionOrder,
    /// Descending number of conflicting vertices that are still selectable,
    /// refreshed after every selection.
    ExclusionUpdating,
}

impl SeedMethod {
    /// Every policy, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Lexical,
        Self::InwardsOrder,
        Self::InwardsUpdating,
        Self::ExclusionOrder,
        Self::ExclusionUpdating,
    ];

    /// Stable lowercase name used in logs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::InwardsOrder => "inwards_order",
            Self::InwardsUpdating => "inwards_updating",
            Self::ExclusionOrder => "exclusion_order",
            Self::ExclusionUpdating => "exclusion_updating",
        }
    }

    const fn is_updating(self) -> bool {
        matches!(self, Self::InwardsUpdating | Self::ExclusionUpdating)
    }
}

/// Selected seeds in selection order plus the partial clustering they imply.
///
/// Seed `i` carries label `i`; its out-neighbours share that label and every
/// other vertex is unassigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedSet {
    seeds: Vec<usize>,
    clustering: Clustering,
}

impl SeedSet {
    /// Seeds in the order they were selected.
    #[must_use]
    pub fn seeds(&self) -> &[usize] {
        &self.seeds
    }

    /// The partial clustering built from the seeds.
    #[must_use]
    pub fn clustering(&self) -> &Clustering {
        &self.clustering
    }

    /// Consumes the set, returning the partial clustering.
    #[must_use]
    pub fn into_clustering(self) -> Clustering {
        self.clustering
    }

    /// Consumes the set, returning seeds and clustering.
    #[must_use]
    pub fn into_parts(self) -> (Vec<usize>, Clustering) {
        (self.seeds, self.clustering)
    }
}

/// Chooses seeds from `nng` with the given policy.
///
/// A vertex is a candidate when it has at least one out-arc, its closed
/// neighbourhood (itself plus its distinct out-neighbours) has at least
/// `min_cluster_size` members, and neither it nor any of its out-neighbours
/// is assigned. Vertices whose neighbourhood is too small never seed a
/// cluster. A self-arc makes a vertex its own out-neighbour and counts
/// toward every degree.
///
/// # Errors
/// Returns [`DigraphError::AllocationFailed`] when the exclusion policies
/// cannot build their conflict digraph.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use mincluster_core::{Digraph, SeedMethod, find_seeds};
///
/// let nng: Digraph = ".*../*.../...*/..*./".parse()?;
/// let seeds = find_seeds(&nng, SeedMethod::Lexical, NonZeroUsize::MIN)?;
/// assert_eq!(seeds.seeds(), &[0, 2]);
/// assert_eq!(seeds.clustering().cluster_count(), 2);
///
/// // Pairs cannot satisfy a minimum of three.
/// let min = NonZeroUsize::new(3).ok_or("zero")?;
/// assert!(find_seeds(&nng, SeedMethod::Lexical, min)?.seeds().is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.find_seeds",
    err,
    skip(nng),
    fields(
        vertices = nng.vertices(),
        arcs = nng.arc_count(),
        method = method.as_str(),
        min_cluster_size = min_cluster_size.get(),
    ),
)]
pub fn find_seeds(
    nng: &Digraph,
    method: SeedMethod,
    min_cluster_size: NonZeroUsize,
) -> Result<SeedSet, DigraphError> {
    let mut selection = Selection::new(nng, min_cluster_size.get());
    match method {
        SeedMethod::Lexical => lexical(nng, &mut selection),
        SeedMethod::InwardsOrder | SeedMethod::InwardsUpdating => {
            inwards(nng, method.is_updating(), &mut selection);
        }
        SeedMethod::ExclusionOrder | SeedMethod::ExclusionUpdating => {
            exclusion(nng, method.is_updating(), &mut selection)?;
        }
    }
    debug!(
        seeds = selection.seeds.len(),
        assigned = selection.clustering.assigned_count(),
        "seed selection finished"
    );
    Ok(SeedSet {
        seeds: selection.seeds,
        clustering: selection.clustering,
    })
}

/// Seeds chosen so far and the labels they imply.
struct Selection {
    seeds: Vec<usize>,
    clustering: Clustering,
    /// Whether the closed neighbourhood of each vertex is large enough.
    large_enough: Vec<bool>,
}

impl Selection {
    fn new(nng: &Digraph, min_cluster_size: usize) -> Self {
        let vertices = nng.vertices();
        let mut last_seen = vec![usize::MAX; vertices];
        let large_enough = (0..vertices)
            .map(|vertex| {
                last_seen[vertex] = vertex;
                let mut members = 1;
                for &head in nng.arcs(vertex) {
                    if last_seen[head] != vertex {
                        last_seen[head] = vertex;
                        members += 1;
                    }
                }
                members >= min_cluster_size
            })
            .collect();
        Self {
            seeds: Vec::new(),
            clustering: Clustering::unassigned(vertices),
            large_enough,
        }
    }

    /// Whether `vertex` may ever seed a cluster.
    fn may_seed(&self, nng: &Digraph, vertex: usize) -> bool {
        self.large_enough[vertex] && nng.out_degree(vertex) > 0
    }

    fn is_candidate(&self, nng: &Digraph, vertex: usize) -> bool {
        self.may_seed(nng, vertex)
            && !self.clustering.is_assigned(vertex)
            && nng.arcs(vertex).iter().all(|&head| !self.clustering.is_assigned(head))
    }

    /// Labels `seed` and its out-neighbours with a fresh cluster and returns
    /// the vertices that were newly assigned, seed first.
    fn select(&mut self, nng: &Digraph, seed: usize) -> Vec<usize> {
        let label = self.clustering.open_cluster();
        self.seeds.push(seed);
        let mut claimed = Vec::with_capacity(nng.out_degree(seed) + 1);
        for vertex in std::iter::once(seed).chain(nng.arcs(seed).iter().copied()) {
            if !self.clustering.is_assigned(vertex) {
                self.clustering.assign(vertex, label);
                claimed.push(vertex);
            }
        }
        claimed
    }
}

fn lexical(nng: &Digraph, selection: &mut Selection) {
    for vertex in 0..nng.vertices() {
        if selection.is_candidate(nng, vertex) {
            selection.select(nng, vertex);
        }
    }
}

/// Pops vertices by ascending in-degree. In updating mode a newly assigned
/// vertex no longer points into the candidate pool, so each of its heads
/// loses one from its score.
fn inwards(nng: &Digraph, updating: bool, selection: &mut Selection) {
    let mut queue = BucketQueue::new(nng.in_degrees(), PopOrder::LowestFirst);
    while let Some(vertex) = queue.pop() {
        if !selection.is_candidate(nng, vertex) {
            continue;
        }
        let claimed = selection.select(nng, vertex);
        for &assigned in &claimed {
            queue.remove(assigned);
        }
        if updating {
            for &assigned in &claimed {
                for &head in nng.arcs(assigned) {
                    queue.decrease(head);
                }
            }
        }
    }
}

/// Builds the conflict digraph: `u` and `v` are adjacent when one points at
/// the other or both point at a common vertex.
fn exclusion_graph(nng: &Digraph) -> Result<Digraph, DigraphError> {
    let reverse = nng.transpose()?;
    let shared = Digraph::adjacency_product(
        nng,
        &reverse,
        ProductOptions {
            force_diagonal: true,
            ignore_diagonal: false,
        },
    )?;
    Digraph::union(&[nng, &shared], true)
}

/// Pops vertices by descending conflict count. Selecting a seed excludes it
/// and all of its conflicts; in updating mode every exclusion lowers the
/// score of the conflicts that are still selectable.
fn exclusion(
    nng: &Digraph,
    updating: bool,
    selection: &mut Selection,
) -> Result<(), DigraphError> {
    let conflicts = exclusion_graph(nng)?;
    let vertices = nng.vertices();
    let mut eligible: Vec<bool> = (0..vertices)
        .map(|vertex| selection.may_seed(nng, vertex))
        .collect();
    let scores = (0..vertices)
        .map(|vertex| {
            conflicts
                .arcs(vertex)
                .iter()
                .filter(|&&other| eligible[other])
                .count()
        })
        .collect();

    let mut queue = BucketQueue::new(scores, PopOrder::HighestFirst);
    for vertex in (0..vertices).filter(|&vertex| !eligible[vertex]) {
        queue.remove(vertex);
    }

    while let Some(vertex) = queue.pop() {
        if !eligible[vertex] || !selection.is_candidate(nng, vertex) {
            continue;
        }
        selection.select(nng, vertex);

        let mut excluded = vec![vertex];
        eligible[vertex] = false;
        for &other in conflicts.arcs(vertex) {
            if eligible[other] {
                eligible[other] = false;
                queue.remove(other);
                excluded.push(other);
            }
        }
        if updating {
            for &gone in &excluded {
                for &other in conflicts.arcs(gone) {
                    if eligible[other] {
                        queue.decrease(other);
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
