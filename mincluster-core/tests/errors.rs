use std::{num::NonZeroUsize, sync::Arc};

use mincluster_core::{
    ClusteringError, ClusteringErrorCode, DataSourceError, DataSourceErrorCode, Digraph,
    DigraphError, DigraphErrorCode,
};
use rstest::rstest;

#[rstest]
#[case(DataSourceError::OutOfBounds { index: 0 }, DataSourceErrorCode::OutOfBounds)]
#[case(
    DataSourceError::OutputLengthMismatch { out: 1, expected: 2 },
    DataSourceErrorCode::OutputLengthMismatch,
)]
#[case(
    DataSourceError::DimensionMismatch { left: 1, right: 2 },
    DataSourceErrorCode::DimensionMismatch,
)]
#[case(DataSourceError::EmptyData, DataSourceErrorCode::EmptyData)]
#[case(DataSourceError::ZeroDimension, DataSourceErrorCode::ZeroDimension)]
#[case(DataSourceError::NonFinite { row: 0, column: 1 }, DataSourceErrorCode::NonFinite)]
fn returns_expected_data_source_code(
    #[case] error: DataSourceError,
    #[case] expected: DataSourceErrorCode,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), expected.as_str());
}

#[rstest]
#[case("*.", "DIGRAPH_UNTERMINATED_ROW")]
#[case("*x/", "DIGRAPH_UNEXPECTED_CHARACTER")]
#[case("*./", "DIGRAPH_NON_SQUARE_ROW")]
fn parse_failures_carry_stable_codes(#[case] text: &str, #[case] code: &str) {
    let err = text.parse::<Digraph>().expect_err("text is malformed");
    assert_eq!(err.code().as_str(), code);
}

#[rstest]
fn product_flag_conflict_has_its_own_code() {
    let graph = Digraph::empty(2);
    let options = mincluster_core::ProductOptions {
        force_diagonal: true,
        ignore_diagonal: true,
    };
    let err = Digraph::adjacency_product(&graph, &graph, options).expect_err("flags conflict");
    assert_eq!(err.code(), DigraphErrorCode::ConflictingDiagonalOptions);
}

#[rstest]
#[case(
    ClusteringError::InvalidMinClusterSize { got: 0 },
    ClusteringErrorCode::InvalidMinClusterSize,
    None,
    None,
)]
#[case(
    ClusteringError::EmptySource { data_source: Arc::from("empty") },
    ClusteringErrorCode::EmptySource,
    None,
    None,
)]
#[case(
    ClusteringError::InsufficientItems {
        data_source: Arc::from("small"),
        items: 3,
        min_cluster_size: NonZeroUsize::new(5).expect("non-zero"),
    },
    ClusteringErrorCode::InsufficientItems,
    None,
    None,
)]
#[case(
    ClusteringError::NonFiniteDistance { left: 0, right: 1 },
    ClusteringErrorCode::NonFiniteDistance,
    None,
    None,
)]
#[case(
    ClusteringError::DataSource {
        data_source: Arc::from("source"),
        error: DataSourceError::OutOfBounds { index: 1 },
    },
    ClusteringErrorCode::DataSourceFailure,
    Some(DataSourceErrorCode::OutOfBounds),
    None,
)]
#[case(
    ClusteringError::from(DigraphError::AllocationFailed { arcs: 9 }),
    ClusteringErrorCode::DigraphFailure,
    None,
    Some(DigraphErrorCode::AllocationFailed),
)]
fn returns_expected_clustering_code(
    #[case] error: ClusteringError,
    #[case] expected: ClusteringErrorCode,
    #[case] data_source_code: Option<DataSourceErrorCode>,
    #[case] digraph_code: Option<DigraphErrorCode>,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), expected.as_str());
    assert_eq!(error.data_source_code(), data_source_code);
    assert_eq!(error.digraph_code(), digraph_code);
}
