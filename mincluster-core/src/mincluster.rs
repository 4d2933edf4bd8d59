//! Clustering orchestration for the mincluster library.
//!
//! Provides the [`MinCluster`] runtime entry points that chain seed
//! selection with remaining-vertex assignment, or run the greedy splitter
//! over a [`DataSource`].

use std::num::NonZeroUsize;

use tracing::{info, instrument, warn};

use crate::{
    Result,
    assign::{TypeConstraints, assign_remaining_desired_size, assign_remaining_lexical},
    builder::UnassignedMethod,
    clustering::Clustering,
    datasource::DataSource,
    digraph::Digraph,
    error::DigraphError,
    greedy::greedy_clustering,
    seeds::{SeedMethod, find_seeds},
};

/// Entry point for running a size-constrained clustering.
///
/// # Examples
/// ```
/// use mincluster_core::{Digraph, MinClusterBuilder, SeedMethod};
///
/// let nng: Digraph = "
///     *.*...../
///     **....../
///     *.*...../
///     ...**.../
///     ....**../
///     ...*.*../
///     .....**./
///     ......**/
/// ".parse()?;
/// let runner = MinClusterBuilder::new()
///     .with_seed_method(SeedMethod::Lexical)
///     .build()?;
/// let clustering = runner.run_nng(&nng)?;
/// assert_eq!(clustering.cluster_count(), 3);
/// assert_eq!(clustering.assigned_count(), 8);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct MinCluster {
    min_cluster_size: NonZeroUsize,
    seed_method: SeedMethod,
    unassigned_method: UnassignedMethod,
    desired_cluster_size: NonZeroUsize,
    type_constraints: Option<TypeConstraints>,
}

impl MinCluster {
    pub(crate) fn new(
        min_cluster_size: NonZeroUsize,
        seed_method: SeedMethod,
        unassigned_method: UnassignedMethod,
        desired_cluster_size: NonZeroUsize,
        type_constraints: Option<TypeConstraints>,
    ) -> Self {
        Self {
            min_cluster_size,
            seed_method,
            unassigned_method,
            desired_cluster_size,
            type_constraints,
        }
    }

    /// Returns the minimum cluster size configured for this instance.
    #[rustfmt::skip]
    #[must_use]
    pub fn min_cluster_size(&self) -> NonZeroUsize { self.min_cluster_size }

    #[rustfmt::skip]
    #[must_use]
    pub fn seed_method(&self) -> SeedMethod { self.seed_method }

    #[rustfmt::skip]
    #[must_use]
    pub fn unassigned_method(&self) -> UnassignedMethod { self.unassigned_method }

    #[rustfmt::skip]
    #[must_use]
    pub fn desired_cluster_size(&self) -> NonZeroUsize { self.desired_cluster_size }

    #[rustfmt::skip]
    #[must_use]
    pub fn type_constraints(&self) -> Option<&TypeConstraints> { self.type_constraints.as_ref() }

    /// Clusters the vertices of `nng`, using `nng` itself to decide where
    /// leftover vertices may go.
    ///
    /// # Errors
    /// See [`MinCluster::run_nng_with_priority`].
    pub fn run_nng(&self, nng: &Digraph) -> Result<Clustering> {
        self.run_nng_with_priority(nng, nng)
    }

    /// Selects seeds from `nng`, then assigns the remaining vertices along
    /// the arcs of `priority` with the configured [`UnassignedMethod`].
    ///
    /// Only vertices whose closed neighbourhood in `nng` holds at least
    /// `min_cluster_size` vertices seed a cluster, and assignment only grows
    /// clusters, so every cluster meets the minimum. Vertices that cannot
    /// reach a labelled vertex stay unassigned. An empty `nng` yields an
    /// empty clustering.
    ///
    /// # Errors
    /// Returns [`crate::ClusteringError::Digraph`] when the two digraphs
    /// cover different vertex counts or the seed policy cannot allocate its
    /// working digraph, and
    /// [`crate::ClusteringError::TypeLabelCountMismatch`] when the type
    /// constraints label a different number of vertices.
    #[instrument(
        name = "core.run_nng",
        err,
        skip(self, nng, priority),
        fields(
            vertices = nng.vertices(),
            arcs = nng.arc_count(),
            priority_arcs = priority.arc_count(),
            seed_method = self.seed_method.as_str(),
            unassigned_method = self.unassigned_method.as_str(),
        ),
    )]
    pub fn run_nng_with_priority(&self, nng: &Digraph, priority: &Digraph) -> Result<Clustering> {
        if priority.vertices() != nng.vertices() {
            return Err(DigraphError::VertexCountMismatch {
                expected: nng.vertices(),
                got: priority.vertices(),
            }
            .into());
        }
        if let Some(constraints) = &self.type_constraints {
            constraints.ensure_covers(nng.vertices())?;
        }
        if nng.vertices() == 0 {
            warn!("nearest-neighbour digraph is empty, returning an empty clustering");
            return Ok(Clustering::unassigned(0));
        }

        let seeds = find_seeds(nng, self.seed_method, self.min_cluster_size)?;
        record_seeds(seeds.seeds().len());
        let mut clustering = seeds.into_clustering();
        let assigned = match self.unassigned_method {
            UnassignedMethod::Ignore => 0,
            UnassignedMethod::Lexical => assign_remaining_lexical(&mut clustering, priority)?,
            UnassignedMethod::DesiredSize => assign_remaining_desired_size(
                &mut clustering,
                priority,
                self.desired_cluster_size,
                self.type_constraints.as_ref(),
            )?,
        };
        record_assigned(assigned);

        let unassigned = clustering.len() - clustering.assigned_count();
        if let Some(constraints) = &self.type_constraints {
            let unsatisfied = constraints.unsatisfied_clusters(&clustering)?;
            if !unsatisfied.is_empty() {
                warn!(clusters = unsatisfied.len(), "clusters miss a type minimum");
            }
        }
        info!(
            clusters = clustering.cluster_count(),
            assigned,
            unassigned,
            "nng clustering completed"
        );
        Ok(clustering)
    }

    /// Runs the greedy splitter over `source` with the configured minimum
    /// cluster size.
    ///
    /// # Errors
    /// Propagates every error of [`crate::greedy_clustering`].
    ///
    /// # Examples
    /// ```
    /// use mincluster_core::{MinClusterBuilder, PointMatrix};
    ///
    /// let rows = vec![vec![0.0], vec![0.2], vec![9.0], vec![9.1]];
    /// let points = PointMatrix::from_rows("pairs", rows)?;
    /// let runner = MinClusterBuilder::new().build()?;
    /// let clustering = runner.run_greedy(&points)?;
    /// assert_eq!(clustering.cluster_sizes(), vec![2, 2]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[instrument(
        name = "core.run_greedy",
        err,
        skip(self, source),
        fields(
            data_source = %source.name(),
            items = source.len(),
            min_cluster_size = %self.min_cluster_size,
        ),
    )]
    pub fn run_greedy<D: DataSource>(&self, source: &D) -> Result<Clustering> {
        let clustering = greedy_clustering(source, self.min_cluster_size)?;
        info!(
            clusters = clustering.cluster_count(),
            "greedy clustering completed"
        );
        Ok(clustering)
    }
}

#[cfg(feature = "metrics")]
fn record_seeds(count: usize) {
    metrics::counter!("mincluster_seeds_selected").increment(count as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_seeds(_count: usize) {}

#[cfg(feature = "metrics")]
fn record_assigned(count: usize) {
    metrics::counter!("mincluster_vertices_assigned").increment(count as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_assigned(_count: usize) {}
