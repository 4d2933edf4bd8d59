//! Tests for the seed selection policies.

use std::{collections::BTreeSet, num::NonZeroUsize};

use proptest::prelude::*;
use rstest::{fixture, rstest};

use super::{SeedMethod, SeedSet, exclusion_graph, find_seeds};
use crate::clustering::ClusterId;
use crate::digraph::Digraph;
use crate::test_utils::{arb_nng, digraph, suite_proptest_config};

/// Ten vertices, one nearest neighbour each.
#[fixture]
fn one_nn() -> Digraph {
    digraph(
        ".*......../...*....../*........./.*......../.....*..../\
         ...*....../....*...../......*.../......*.../......*.../",
    )
}

fn closed_neighbourhood(nng: &Digraph, vertex: usize) -> BTreeSet<usize> {
    std::iter::once(vertex).chain(nng.arcs(vertex).iter().copied()).collect()
}

fn assigned_vertices(seeds: &SeedSet) -> Vec<usize> {
    (0..seeds.clustering().len())
        .filter(|&vertex| seeds.clustering().is_assigned(vertex))
        .collect()
}

fn size(min: usize) -> NonZeroUsize {
    NonZeroUsize::new(min).expect("fixture sizes are non-zero")
}

/// Checks that seeds claim disjoint neighbourhoods of at least `min`
/// vertices under their own labels and that no further seed could be added.
fn check_seed_set(nng: &Digraph, seeds: &SeedSet, min: usize) -> Result<(), TestCaseError> {
    let clustering = seeds.clustering();
    prop_assert_eq!(clustering.cluster_count(), seeds.seeds().len());

    let mut claimed = BTreeSet::new();
    for (label, &seed) in seeds.seeds().iter().enumerate() {
        prop_assert!(nng.out_degree(seed) > 0);
        prop_assert!(closed_neighbourhood(nng, seed).len() >= min);
        for vertex in closed_neighbourhood(nng, seed) {
            prop_assert!(claimed.insert(vertex), "vertex {} claimed twice", vertex);
            prop_assert_eq!(clustering.label(vertex), Some(ClusterId::new(label)));
        }
    }
    prop_assert_eq!(claimed.len(), clustering.assigned_count());

    for vertex in 0..nng.vertices() {
        let neighbourhood = closed_neighbourhood(nng, vertex);
        let open = nng.out_degree(vertex) > 0
            && neighbourhood.len() >= min
            && neighbourhood.iter().all(|&member| !clustering.is_assigned(member));
        prop_assert!(!open, "vertex {} could still become a seed", vertex);
    }
    Ok(())
}

#[rstest]
fn lexical_seeds_follow_vertex_order(one_nn: Digraph) {
    let seeds =
        find_seeds(&one_nn, SeedMethod::Lexical, NonZeroUsize::MIN).expect("seeding succeeds");

    assert_eq!(seeds.seeds(), &[0, 4, 7]);
    assert_eq!(seeds.clustering().cluster_count(), 3);
    assert_eq!(assigned_vertices(&seeds), vec![0, 1, 4, 5, 6, 7]);
}

#[rstest]
#[case::inwards_order(SeedMethod::InwardsOrder, &[2, 7, 4, 1])]
#[case::inwards_updating(SeedMethod::InwardsUpdating, &[2, 7, 4, 1])]
#[case::exclusion_order(SeedMethod::ExclusionOrder, &[6, 0, 5])]
#[case::exclusion_updating(SeedMethod::ExclusionUpdating, &[6, 0, 5])]
fn priority_policies_on_one_nn(
    one_nn: Digraph,
    #[case] method: SeedMethod,
    #[case] expected: &[usize],
) {
    let seeds = find_seeds(&one_nn, method, NonZeroUsize::MIN).expect("seeding succeeds");

    assert_eq!(seeds.seeds(), expected);
    check_seed_set(&one_nn, &seeds, 1).expect("seed set is valid");
}

#[rstest]
#[case::order(SeedMethod::InwardsOrder, &[0, 5])]
#[case::updating(SeedMethod::InwardsUpdating, &[0, 2])]
fn updating_promotes_vertices_whose_sources_were_claimed(
    #[case] method: SeedMethod,
    #[case] expected: &[usize],
) {
    let nng = digraph(".*.*../..*.../....*./..*.../.....*/....*./");
    let seeds = find_seeds(&nng, method, NonZeroUsize::MIN).expect("seeding succeeds");
    assert_eq!(seeds.seeds(), expected);
}

// Scores: 0, 2, 4 and 5 conflict with three vertices, 1 and 3 with two.
// Both policies start with 0, which excludes 1, 2 and 4. Static scores then
// favour 5, while rescoring leaves 3 and 5 with one remaining conflict each
// and the tie goes to 3.
#[rstest]
#[case::order(SeedMethod::ExclusionOrder, &[0, 5])]
#[case::updating(SeedMethod::ExclusionUpdating, &[0, 3])]
fn exclusion_updating_rescores_after_each_seed(
    #[case] method: SeedMethod,
    #[case] expected: &[usize],
) {
    let nng = digraph(".*..../..*.../.*...*/....*./*..*../...*../");
    let seeds = find_seeds(&nng, method, NonZeroUsize::MIN).expect("seeding succeeds");

    assert_eq!(seeds.seeds(), expected);
    check_seed_set(&nng, &seeds, 1).expect("seed set is valid");
}

#[rstest]
fn neighbourhoods_below_the_minimum_never_seed(
    #[values(
        SeedMethod::Lexical,
        SeedMethod::InwardsOrder,
        SeedMethod::InwardsUpdating,
        SeedMethod::ExclusionOrder,
        SeedMethod::ExclusionUpdating
    )]
    method: SeedMethod,
) {
    // Two triangles plus vertex 6 pointing into the first, and a pair 7-8.
    let nng = Digraph::from_adjacency(&[
        vec![1, 2],
        vec![0, 2],
        vec![0, 1],
        vec![4, 5],
        vec![3, 5],
        vec![3, 4],
        vec![0, 1],
        vec![8],
        vec![7],
    ])
    .expect("rows are in range");

    let seeds = find_seeds(&nng, method, size(3)).expect("seeding succeeds");

    assert_eq!(seeds.seeds().len(), 2);
    assert!(seeds.clustering().cluster_sizes().iter().all(|&members| members == 3));
    assert!(!seeds.clustering().is_assigned(7));
    assert!(!seeds.clustering().is_assigned(8));
    check_seed_set(&nng, &seeds, 3).expect("seed set is valid");
}

#[rstest]
#[case::lexical(SeedMethod::Lexical, &[0])]
#[case::inwards_order(SeedMethod::InwardsOrder, &[1])]
#[case::inwards_updating(SeedMethod::InwardsUpdating, &[1])]
#[case::exclusion_order(SeedMethod::ExclusionOrder, &[0])]
#[case::exclusion_updating(SeedMethod::ExclusionUpdating, &[0])]
fn self_arc_makes_a_vertex_its_own_neighbour(
    #[case] method: SeedMethod,
    #[case] expected: &[usize],
) {
    let nng = digraph("*./*./");
    let seeds = find_seeds(&nng, method, NonZeroUsize::MIN).expect("seeding succeeds");

    assert_eq!(seeds.seeds(), expected);
    check_seed_set(&nng, &seeds, 1).expect("seed set is valid");
}

#[rstest]
fn mutual_pairs_with_self_arcs_give_one_seed_per_pair(
    #[values(
        SeedMethod::Lexical,
        SeedMethod::InwardsOrder,
        SeedMethod::InwardsUpdating,
        SeedMethod::ExclusionOrder,
        SeedMethod::ExclusionUpdating
    )]
    method: SeedMethod,
) {
    let nng = digraph("**../**../..**/..**/");
    let seeds = find_seeds(&nng, method, NonZeroUsize::MIN).expect("seeding succeeds");

    assert_eq!(seeds.seeds(), &[0, 2]);
    assert_eq!(seeds.clustering().assigned_count(), 4);
}

#[rstest]
#[case::no_vertices(0)]
#[case::no_arcs(4)]
fn graphs_without_arcs_have_no_seeds(
    #[case] vertices: usize,
    #[values(SeedMethod::Lexical, SeedMethod::InwardsUpdating, SeedMethod::ExclusionUpdating)]
    method: SeedMethod,
) {
    let seeds = find_seeds(&Digraph::empty(vertices), method, NonZeroUsize::MIN)
        .expect("seeding succeeds");

    assert!(seeds.seeds().is_empty());
    assert_eq!(seeds.clustering().cluster_count(), 0);
    assert_eq!(seeds.clustering().len(), vertices);
}

#[test]
fn exclusion_graph_is_symmetric_and_loop_free() {
    let nng = digraph("*.*./.*../...*/.*../");
    let conflicts = exclusion_graph(&nng).expect("conflict digraph builds");

    assert!(!conflicts.has_self_loops());
    for (tail, head) in conflicts.iter_arcs() {
        assert!(conflicts.has_arc(head, tail), "{tail} -> {head} has no reverse arc");
    }
    // 0 and 1 neither point at each other nor share a head.
    assert!(!conflicts.has_arc(0, 1));
    // 1 and 3 share the head 1.
    assert!(conflicts.has_arc(1, 3));
}

#[test]
fn into_parts_returns_selection_order() {
    let nng = digraph(".*/*./");
    let (seeds, clustering) = find_seeds(&nng, SeedMethod::Lexical, NonZeroUsize::MIN)
        .expect("seeding succeeds")
        .into_parts();

    assert_eq!(seeds, vec![0]);
    assert_eq!(clustering.cluster_sizes(), vec![2]);
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn every_policy_yields_independent_maximal_seeds(
        nng in arb_nng(24, 4),
        method in prop::sample::select(SeedMethod::ALL.to_vec()),
        min in 1usize..5,
    ) {
        let seeds = find_seeds(&nng, method, size(min)).expect("seeding succeeds");
        check_seed_set(&nng, &seeds, min)?;
    }
}
