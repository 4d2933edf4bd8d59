//! Size-constrained clustering core library.
//!
//! Clusters either a nearest-neighbour [`Digraph`] (seed selection followed
//! by assignment of the remaining vertices) or a [`DataSource`] (greedy
//! recursive bisection), guaranteeing every cluster at least
//! `min_cluster_size` members.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod assign;
mod builder;
mod clustering;
mod datasource;
mod digraph;
mod error;
mod greedy;
mod mincluster;
mod points;
mod seeds;

#[cfg(test)]
mod test_utils;

pub use crate::{
    assign::{TypeConstraints, assign_remaining_desired_size, assign_remaining_lexical},
    builder::{MinClusterBuilder, UnassignedMethod},
    clustering::{ClusterId, Clustering, NonContiguousClusterIds},
    datasource::DataSource,
    digraph::{Digraph, ProductOptions},
    error::{
        ClusteringError, ClusteringErrorCode, DataSourceError, DataSourceErrorCode, DigraphError,
        DigraphErrorCode, Result,
    },
    greedy::{greedy_clustering, refine},
    mincluster::MinCluster,
    points::PointMatrix,
    seeds::{SeedMethod, SeedSet, find_seeds},
};
