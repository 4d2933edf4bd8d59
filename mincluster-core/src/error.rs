//! Error types for the mincluster core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::{fmt, num::NonZeroUsize, sync::Arc};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by [`crate::DataSource`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DataSourceError {
    /// Requested index was outside the source's bounds.
    #[error("index {index} is out of bounds")]
    OutOfBounds {
        /// The requested row that exceeded the source bounds.
        index: usize,
    },
    /// Provided output buffer length did not match number of pairs.
    #[error("output buffer has length {out} but {expected} pairs were given")]
    OutputLengthMismatch {
        /// Caller-provided buffer length.
        out: usize,
        /// Expected number of vector pairs required for the operation.
        expected: usize,
    },
    /// Compared vectors had different dimensions.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Dimensionality of the left-hand vector.
        left: usize,
        /// Dimensionality of the right-hand vector.
        right: usize,
    },
    /// Data source contained no rows.
    #[error("data source contains no rows")]
    EmptyData,
    /// Data source rows must have positive dimension.
    #[error("data source vectors must have positive dimension")]
    ZeroDimension,
    /// A coordinate was NaN or infinite.
    #[error("row {row} contains a non-finite value at column {column}")]
    NonFinite {
        /// Row holding the offending value.
        row: usize,
        /// Column of the offending value.
        column: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`DataSourceError`] variants.
    enum DataSourceErrorCode for DataSourceError {
        /// Requested index was outside the source's bounds.
        OutOfBounds => OutOfBounds { .. } => "DATA_SOURCE_OUT_OF_BOUNDS",
        /// Provided output buffer length did not match number of pairs.
        OutputLengthMismatch => OutputLengthMismatch { .. } => "DATA_SOURCE_OUTPUT_LENGTH_MISMATCH",
        /// Compared vectors had different dimensions.
        DimensionMismatch => DimensionMismatch { .. } => "DATA_SOURCE_DIMENSION_MISMATCH",
        /// Data source contained no rows.
        EmptyData => EmptyData => "DATA_SOURCE_EMPTY",
        /// Data source rows must have positive dimension.
        ZeroDimension => ZeroDimension => "DATA_SOURCE_ZERO_DIMENSION",
        /// A coordinate was NaN or infinite.
        NonFinite => NonFinite { .. } => "DATA_SOURCE_NON_FINITE",
    }
}

/// Errors raised while constructing, parsing, or combining [`crate::Digraph`]s.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DigraphError {
    /// The tail offsets were not a non-decreasing prefix sum over the arcs.
    #[error("tail offsets are unsound at vertex {vertex}")]
    InvalidOffsets {
        /// First vertex whose offset range is malformed.
        vertex: usize,
    },
    /// An arc pointed at a vertex outside the graph.
    #[error("arc head {head} is out of range for a digraph with {vertices} vertices")]
    HeadOutOfRange {
        /// The offending head id.
        head: usize,
        /// Number of vertices in the digraph.
        vertices: usize,
    },
    /// Two cooperating digraphs (or a digraph and a clustering) disagree on the
    /// number of vertices.
    #[error("vertex count mismatch: expected {expected}, got {got}")]
    VertexCountMismatch {
        /// Vertex count required by the operation.
        expected: usize,
        /// Vertex count that was supplied.
        got: usize,
    },
    /// `force_diagonal` and `ignore_diagonal` were both requested.
    #[error("force_diagonal and ignore_diagonal are mutually exclusive")]
    ConflictingDiagonalOptions,
    /// Arc storage could not be reserved.
    #[error("failed to allocate storage for {arcs} arcs")]
    AllocationFailed {
        /// Number of arcs that could not be reserved.
        arcs: usize,
    },
    /// The text form contained a character other than `*`, `#`, `.`, `/`, or
    /// whitespace.
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// Byte offset of the character in the input.
        offset: usize,
    },
    /// A row of the text form had a different width than the number of rows.
    #[error("row {row} has {columns} columns but the digraph has {rows} rows")]
    NonSquareRow {
        /// Zero-based row index.
        row: usize,
        /// Columns found on that row.
        columns: usize,
        /// Total number of rows.
        rows: usize,
    },
    /// The text form ended in the middle of a row.
    #[error("row {row} is not terminated by '/'")]
    UnterminatedRow {
        /// Zero-based index of the unterminated row.
        row: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`DigraphError`] variants.
    enum DigraphErrorCode for DigraphError {
        /// Tail offsets were malformed.
        InvalidOffsets => InvalidOffsets { .. } => "DIGRAPH_INVALID_OFFSETS",
        /// An arc head exceeded the vertex count.
        HeadOutOfRange => HeadOutOfRange { .. } => "DIGRAPH_HEAD_OUT_OF_RANGE",
        /// Vertex counts of cooperating inputs differed.
        VertexCountMismatch => VertexCountMismatch { .. } => "DIGRAPH_VERTEX_COUNT_MISMATCH",
        /// Mutually exclusive product flags were set.
        ConflictingDiagonalOptions => ConflictingDiagonalOptions =>
            "DIGRAPH_CONFLICTING_DIAGONAL_OPTIONS",
        /// Arc storage could not be reserved.
        AllocationFailed => AllocationFailed { .. } => "DIGRAPH_ALLOCATION_FAILED",
        /// The text form contained an unknown character.
        UnexpectedCharacter => UnexpectedCharacter { .. } => "DIGRAPH_UNEXPECTED_CHARACTER",
        /// The text form was not square.
        NonSquareRow => NonSquareRow { .. } => "DIGRAPH_NON_SQUARE_ROW",
        /// The text form ended mid-row.
        UnterminatedRow => UnterminatedRow { .. } => "DIGRAPH_UNTERMINATED_ROW",
    }
}

/// Error type produced when configuring or running a clustering.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ClusteringError {
    /// Minimum cluster size must be greater than zero.
    #[error("min_cluster_size must be at least 1 (got {got})")]
    InvalidMinClusterSize {
        /// The invalid minimum cluster size supplied by the caller.
        got: usize,
    },
    /// Desired cluster size must be at least the minimum cluster size.
    #[error("desired_cluster_size {got} must be at least min_cluster_size {min_cluster_size}")]
    InvalidDesiredClusterSize {
        /// The rejected desired size.
        got: usize,
        /// The configured minimum cluster size.
        min_cluster_size: usize,
    },
    /// Type constraints were internally inconsistent.
    #[error("invalid type constraints: {reason}")]
    InvalidTypeConstraints {
        /// Human-readable explanation.
        reason: Arc<str>,
    },
    /// Type labels did not cover every vertex.
    #[error("type constraints label {labels} vertices but the input has {vertices}")]
    TypeLabelCountMismatch {
        /// Number of type labels supplied.
        labels: usize,
        /// Number of vertices in the input.
        vertices: usize,
    },
    /// A clustering covered a different number of items than the data source.
    #[error("clustering labels {labels} items but the data source has {items}")]
    LabelCountMismatch {
        /// Number of labels in the clustering.
        labels: usize,
        /// Number of items in the data source.
        items: usize,
    },
    /// The supplied [`crate::DataSource`] contained no items.
    #[error("data source `{data_source}` contains no items")]
    EmptySource {
        /// Identifier for the empty data source.
        data_source: Arc<str>,
    },
    /// The input did not contain enough items for the configured
    /// `min_cluster_size`.
    #[error(
        "data source `{data_source}` has {items} items but min_cluster_size requires \
         {min_cluster_size}"
    )]
    InsufficientItems {
        /// Identifier for the data source that lacked sufficient items.
        data_source: Arc<str>,
        /// Number of items available.
        items: usize,
        /// Minimum cluster size required by the algorithm.
        min_cluster_size: NonZeroUsize,
    },
    /// The data source returned a NaN or infinite distance.
    #[error("data source returned a non-finite distance for ({left}, {right})")]
    NonFiniteDistance {
        /// First item of the pair.
        left: usize,
        /// Second item of the pair.
        right: usize,
    },
    /// Working storage could not be reserved.
    #[error("failed to allocate {what}")]
    AllocationFailed {
        /// The structure whose allocation failed.
        what: &'static str,
    },
    /// A digraph operation failed.
    #[error("digraph operation failed: {error}")]
    Digraph {
        #[from]
        /// Underlying digraph error.
        error: DigraphError,
    },
    /// A [`crate::DataSource`] operation failed while running the algorithm.
    #[error("data source `{data_source}` failed: {error}")]
    DataSource {
        /// Identifier for the data source that produced the error.
        data_source: Arc<str>,
        #[source]
        /// Underlying data source error bubbled up by the algorithm.
        error: DataSourceError,
    },
}

define_error_codes! {
    /// Stable codes describing [`ClusteringError`] variants.
    enum ClusteringErrorCode for ClusteringError {
        /// Minimum cluster size must be greater than zero.
        InvalidMinClusterSize => InvalidMinClusterSize { .. } =>
            "MINCLUSTER_INVALID_MIN_CLUSTER_SIZE",
        /// Desired cluster size was below the minimum.
        InvalidDesiredClusterSize => InvalidDesiredClusterSize { .. } =>
            "MINCLUSTER_INVALID_DESIRED_CLUSTER_SIZE",
        /// Type constraints were inconsistent.
        InvalidTypeConstraints => InvalidTypeConstraints { .. } =>
            "MINCLUSTER_INVALID_TYPE_CONSTRAINTS",
        /// Type labels did not cover every vertex.
        TypeLabelCountMismatch => TypeLabelCountMismatch { .. } =>
            "MINCLUSTER_TYPE_LABEL_COUNT_MISMATCH",
        /// A clustering did not match the data source length.
        LabelCountMismatch => LabelCountMismatch { .. } => "MINCLUSTER_LABEL_COUNT_MISMATCH",
        /// The data source was empty.
        EmptySource => EmptySource { .. } => "MINCLUSTER_EMPTY_SOURCE",
        /// The input was smaller than the minimum cluster size.
        InsufficientItems => InsufficientItems { .. } => "MINCLUSTER_INSUFFICIENT_ITEMS",
        /// A distance was NaN or infinite.
        NonFiniteDistance => NonFiniteDistance { .. } => "MINCLUSTER_NON_FINITE_DISTANCE",
        /// Working storage could not be reserved.
        AllocationFailed => AllocationFailed { .. } => "MINCLUSTER_ALLOCATION_FAILED",
        /// A digraph operation failed.
        DigraphFailure => Digraph { .. } => "MINCLUSTER_DIGRAPH_FAILURE",
        /// A data source operation failed.
        DataSourceFailure => DataSource { .. } => "MINCLUSTER_DATA_SOURCE_FAILURE",
    }
}

impl ClusteringError {
    /// Retrieve the inner [`DataSourceErrorCode`] when the error originated in a
    /// [`crate::DataSource`].
    #[must_use]
    pub const fn data_source_code(&self) -> Option<DataSourceErrorCode> {
        match self {
            Self::DataSource { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Retrieve the inner [`DigraphErrorCode`] when the error originated in a
    /// digraph operation.
    #[must_use]
    pub const fn digraph_code(&self) -> Option<DigraphErrorCode> {
        match self {
            Self::Digraph { error } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, ClusteringError>;
