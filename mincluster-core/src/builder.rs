//! Builder utilities for configuring clustering runs.
//!
//! Exposes the policy selection surface and the validation performed before
//! constructing [`MinCluster`] instances.

use std::{num::NonZeroUsize, sync::Arc};

use crate::{
    Result, assign::TypeConstraints, error::ClusteringError, mincluster::MinCluster,
    seeds::SeedMethod,
};

/// Selects what [`MinCluster::run_nng`] does with vertices that seed
/// selection left unassigned.
///
/// # Examples
/// ```
/// use mincluster_core::UnassignedMethod;
///
/// assert_eq!(UnassignedMethod::default(), UnassignedMethod::Lexical);
/// assert_eq!(UnassignedMethod::DesiredSize.as_str(), "desired_size");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnassignedMethod {
    /// Leave them unassigned.
    Ignore,
    /// Join the cluster of the first eligible priority arc.
    #[default]
    Lexical,
    /// Grow clusters towards the desired size, smallest cluster first.
    DesiredSize,
}

impl UnassignedMethod {
    /// Stable lowercase name used in logs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Lexical => "lexical",
            Self::DesiredSize => "desired_size",
        }
    }
}

/// Configures and constructs [`MinCluster`] instances.
///
/// # Examples
/// ```
/// use mincluster_core::{MinClusterBuilder, SeedMethod, UnassignedMethod};
///
/// let runner = MinClusterBuilder::new()
///     .with_min_cluster_size(3)
///     .with_seed_method(SeedMethod::ExclusionUpdating)
///     .with_unassigned_method(UnassignedMethod::DesiredSize)
///     .with_desired_cluster_size(4)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(runner.min_cluster_size().get(), 3);
/// assert_eq!(runner.desired_cluster_size().get(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct MinClusterBuilder {
    min_cluster_size: usize,
    seed_method: SeedMethod,
    unassigned_method: UnassignedMethod,
    desired_cluster_size: Option<usize>,
    type_constraints: Option<TypeConstraints>,
}

impl Default for MinClusterBuilder {
    fn default() -> Self {
        Self {
            min_cluster_size: 2,
            seed_method: SeedMethod::default(),
            unassigned_method: UnassignedMethod::default(),
            desired_cluster_size: None,
            type_constraints: None,
        }
    }
}

impl MinClusterBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use mincluster_core::{MinClusterBuilder, SeedMethod, UnassignedMethod};
    ///
    /// let builder = MinClusterBuilder::new();
    /// assert_eq!(builder.min_cluster_size(), 2);
    /// assert_eq!(builder.seed_method(), SeedMethod::InwardsUpdating);
    /// assert_eq!(builder.unassigned_method(), UnassignedMethod::Lexical);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the minimum cluster size.
    #[must_use]
    pub fn with_min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = size;
        self
    }

    #[rustfmt::skip]
    #[must_use]
    pub fn min_cluster_size(&self) -> usize { self.min_cluster_size }

    /// Sets the seed selection policy.
    #[must_use]
    pub fn with_seed_method(mut self, method: SeedMethod) -> Self {
        self.seed_method = method;
        self
    }

    #[rustfmt::skip]
    #[must_use]
    pub fn seed_method(&self) -> SeedMethod { self.seed_method }

    /// Sets how vertices left over by seed selection are handled.
    #[must_use]
    pub fn with_unassigned_method(mut self, method: UnassignedMethod) -> Self {
        self.unassigned_method = method;
        self
    }

    #[rustfmt::skip]
    #[must_use]
    pub fn unassigned_method(&self) -> UnassignedMethod { self.unassigned_method }

    /// Sets the size [`UnassignedMethod::DesiredSize`] grows clusters
    /// towards. Defaults to the minimum cluster size.
    ///
    /// # Examples
    /// ```
    /// use mincluster_core::MinClusterBuilder;
    ///
    /// let builder = MinClusterBuilder::new().with_min_cluster_size(3);
    /// assert_eq!(builder.desired_cluster_size(), 3);
    /// assert_eq!(builder.with_desired_cluster_size(5).desired_cluster_size(), 5);
    /// ```
    #[must_use]
    pub fn with_desired_cluster_size(mut self, size: usize) -> Self {
        self.desired_cluster_size = Some(size);
        self
    }

    /// Returns the configured desired size, falling back to the minimum.
    #[must_use]
    pub fn desired_cluster_size(&self) -> usize {
        self.desired_cluster_size.unwrap_or(self.min_cluster_size)
    }

    /// Attaches per-type minimums used by [`UnassignedMethod::DesiredSize`].
    #[must_use]
    pub fn with_type_constraints(mut self, constraints: TypeConstraints) -> Self {
        self.type_constraints = Some(constraints);
        self
    }

    #[rustfmt::skip]
    #[must_use]
    pub fn type_constraints(&self) -> Option<&TypeConstraints> { self.type_constraints.as_ref() }

    /// Validates the configuration and constructs a [`MinCluster`] instance.
    ///
    /// # Errors
    /// Returns [`ClusteringError::InvalidMinClusterSize`] for a zero minimum,
    /// [`ClusteringError::InvalidDesiredClusterSize`] when the desired size
    /// is below the minimum, and [`ClusteringError::InvalidTypeConstraints`]
    /// when the type minimums add up to more than the minimum cluster size.
    ///
    /// # Examples
    /// ```
    /// use mincluster_core::{ClusteringError, MinClusterBuilder};
    ///
    /// let err = MinClusterBuilder::new()
    ///     .with_min_cluster_size(4)
    ///     .with_desired_cluster_size(3)
    ///     .build()
    ///     .expect_err("desired size below the minimum");
    /// assert_eq!(
    ///     err,
    ///     ClusteringError::InvalidDesiredClusterSize { got: 3, min_cluster_size: 4 }
    /// );
    /// ```
    pub fn build(self) -> Result<MinCluster> {
        let min_cluster_size = NonZeroUsize::new(self.min_cluster_size).ok_or(
            ClusteringError::InvalidMinClusterSize {
                got: self.min_cluster_size,
            },
        )?;
        let desired = self.desired_cluster_size();
        let desired_cluster_size = NonZeroUsize::new(desired)
            .filter(|size| *size >= min_cluster_size)
            .ok_or(ClusteringError::InvalidDesiredClusterSize {
                got: desired,
                min_cluster_size: min_cluster_size.get(),
            })?;
        if let Some(constraints) = &self.type_constraints
            && constraints.total_minimum() > min_cluster_size.get()
        {
            return Err(ClusteringError::InvalidTypeConstraints {
                reason: Arc::from(format!(
                    "type minimums add up to {} but min_cluster_size is {min_cluster_size}",
                    constraints.total_minimum()
                )),
            });
        }

        Ok(MinCluster::new(
            min_cluster_size,
            self.seed_method,
            self.unassigned_method,
            desired_cluster_size,
            self.type_constraints,
        ))
    }
}
