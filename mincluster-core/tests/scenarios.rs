//! End-to-end clustering scenarios over the public API.

mod common;

use std::num::NonZeroUsize;

use common::{Line, one_nn, raw_labels};
use mincluster_core::{
    Clustering, Digraph, MinClusterBuilder, PointMatrix, ProductOptions, SeedMethod,
    UnassignedMethod, find_seeds, greedy_clustering, refine,
};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rstest::rstest;

fn priority_preferring_later_seed() -> Digraph {
    Digraph::from_adjacency(&[
        vec![1],
        vec![3],
        vec![0],
        vec![1],
        vec![5],
        vec![3],
        vec![4],
        vec![6],
        vec![6, 4],
        vec![6],
    ])
    .expect("rows are in range")
}

#[rstest]
fn lexical_seeds_then_lexical_assignment() {
    let nng = one_nn();
    let seeds = find_seeds(&nng, SeedMethod::Lexical, NonZeroUsize::MIN).expect("seeding succeeds");
    assert_eq!(seeds.seeds(), &[0, 4, 7]);

    let runner = MinClusterBuilder::new()
        .with_seed_method(SeedMethod::Lexical)
        .build()
        .expect("configuration is valid");
    let clustering = runner.run_nng(&nng).expect("run succeeds");

    assert_eq!(
        raw_labels(&clustering),
        vec![
            Some(0),
            Some(0),
            Some(0),
            Some(0),
            Some(1),
            Some(1),
            Some(2),
            Some(2),
            Some(2),
            Some(2)
        ]
    );
    assert_eq!(clustering.cluster_sizes(), vec![4, 2, 4]);
}

#[rstest]
fn ignoring_leftovers_keeps_only_seed_neighbourhoods() {
    let runner = MinClusterBuilder::new()
        .with_seed_method(SeedMethod::Lexical)
        .with_unassigned_method(UnassignedMethod::Ignore)
        .build()
        .expect("configuration is valid");

    let clustering = runner.run_nng(&one_nn()).expect("run succeeds");

    assert_eq!(
        raw_labels(&clustering),
        vec![Some(0), Some(0), None, None, Some(1), Some(1), Some(2), Some(2), None, None]
    );
}

#[rstest]
#[case::lexical(UnassignedMethod::Lexical, Some(2))]
#[case::desired_size(UnassignedMethod::DesiredSize, Some(1))]
fn priority_digraph_steers_leftovers(
    #[case] method: UnassignedMethod,
    #[case] label_of_eight: Option<usize>,
) {
    let runner = MinClusterBuilder::new()
        .with_seed_method(SeedMethod::Lexical)
        .with_unassigned_method(method)
        .with_desired_cluster_size(3)
        .build()
        .expect("configuration is valid");

    let clustering = runner
        .run_nng_with_priority(&one_nn(), &priority_preferring_later_seed())
        .expect("run succeeds");

    assert_eq!(clustering.assigned_count(), 10);
    assert_eq!(raw_labels(&clustering)[8], label_of_eight);
    assert_eq!(raw_labels(&clustering)[9], Some(2));
}

#[rstest]
fn inwards_order_prefers_rarely_chosen_vertices() {
    let seeds = find_seeds(&one_nn(), SeedMethod::InwardsOrder, NonZeroUsize::MIN)
        .expect("seeding succeeds");
    assert_eq!(seeds.seeds(), &[2, 7, 4, 1]);
}

#[rstest]
#[case::plain(ProductOptions::default(), "**.*./..*../...*./.*.../..*../")]
#[case::ignore_diagonal(
    ProductOptions { force_diagonal: false, ignore_diagonal: true },
    "...*./..*../...*./.*.../..*../"
)]
fn product_follows_two_hop_paths(#[case] options: ProductOptions, #[case] expected: &str) {
    let graph: Digraph = "##.../...#./.#.../..#../...#./".parse().expect("graph parses");

    let product = Digraph::adjacency_product(&graph, &graph, options).expect("product succeeds");

    assert_eq!(product.to_string(), expected);
}

#[rstest]
fn every_policy_yields_a_total_clustering_on_one_nn() {
    let nng = one_nn();
    for method in SeedMethod::ALL {
        let clustering = MinClusterBuilder::new()
            .with_seed_method(method)
            .build()
            .expect("configuration is valid")
            .run_nng(&nng)
            .expect("run succeeds");
        assert_eq!(clustering.assigned_count(), 10, "{}", method.as_str());
        assert!(clustering.cluster_sizes().iter().all(|&size| size >= 2));
    }
}

fn assert_clusters_meet_minimum(clustering: &Clustering, min: usize) {
    let sizes = clustering.cluster_sizes();
    assert!(sizes.iter().all(|&size| size >= min), "cluster below {min}: {sizes:?}");
}

#[rstest]
fn one_nearest_neighbour_cannot_meet_a_minimum_of_three(
    #[values(UnassignedMethod::Ignore, UnassignedMethod::Lexical, UnassignedMethod::DesiredSize)]
    unassigned: UnassignedMethod,
) {
    let runner = MinClusterBuilder::new()
        .with_min_cluster_size(3)
        .with_seed_method(SeedMethod::Lexical)
        .with_unassigned_method(unassigned)
        .build()
        .expect("configuration is valid");

    let clustering = runner.run_nng(&one_nn()).expect("run succeeds");

    assert_clusters_meet_minimum(&clustering, 3);
    assert_eq!(clustering.cluster_count(), 0);
    assert_eq!(clustering.assigned_count(), 0);
}

#[rstest]
fn nng_clusters_respect_the_minimum_size(
    #[values(
        SeedMethod::Lexical,
        SeedMethod::InwardsOrder,
        SeedMethod::InwardsUpdating,
        SeedMethod::ExclusionOrder,
        SeedMethod::ExclusionUpdating
    )]
    seed_method: SeedMethod,
    #[values(UnassignedMethod::Ignore, UnassignedMethod::Lexical, UnassignedMethod::DesiredSize)]
    unassigned: UnassignedMethod,
) {
    // Two nearest neighbours per vertex; 8 and 9 only point at each other.
    let nng = Digraph::from_adjacency(&[
        vec![1, 2],
        vec![0, 2],
        vec![1, 3],
        vec![2, 4],
        vec![5, 3],
        vec![4, 6],
        vec![5, 7],
        vec![6, 5],
        vec![9],
        vec![8],
    ])
    .expect("rows are in range");
    let runner = MinClusterBuilder::new()
        .with_min_cluster_size(3)
        .with_seed_method(seed_method)
        .with_unassigned_method(unassigned)
        .build()
        .expect("configuration is valid");

    let clustering = runner.run_nng(&nng).expect("run succeeds");

    assert!(clustering.cluster_count() > 0);
    assert_clusters_meet_minimum(&clustering, 3);
    assert_eq!(clustering.label(8), None);
    assert_eq!(clustering.label(9), None);
}

#[rstest]
fn greedy_clusters_random_points_above_minimum() {
    let mut rng = SmallRng::seed_from_u64(2024);
    let rows = (0..100)
        .map(|_| (0..3).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect();
    let points = PointMatrix::from_rows("cube", rows).expect("points are valid");
    let min = NonZeroUsize::new(20).expect("non-zero");

    let clustering = greedy_clustering(&points, min).expect("clustering succeeds");

    assert_eq!(clustering.assigned_count(), 100);
    assert!(clustering.cluster_sizes().iter().all(|&size| size >= 20));
    Clustering::try_from_labels(clustering.labels().to_vec()).expect("labels are contiguous");
}

#[rstest]
fn refine_splits_coarse_clusters_in_place() {
    let line = Line::new(vec![0.0, 0.1, 0.2, 0.3, 10.0, 10.1, 10.2, 10.3]);
    let coarse = greedy_clustering(&line, NonZeroUsize::new(4).expect("non-zero"))
        .expect("clustering succeeds");
    assert_eq!(coarse.cluster_count(), 2);

    let fine = refine(&line, NonZeroUsize::new(2).expect("non-zero"), &coarse)
        .expect("refinement succeeds");

    assert_eq!(fine.cluster_sizes(), vec![2, 2, 2, 2]);
}
