//! Command implementations and argument parsing for the mincluster CLI.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use mincluster_core::{
    Clustering, ClusteringError, DataSource, DataSourceError, Digraph, DigraphError, MinCluster,
    MinClusterBuilder, PointMatrix, SeedMethod, UnassignedMethod,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "mincluster", about = "Cluster items under a minimum cluster size.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster the vertices of a nearest-neighbour digraph.
    Nng(NngCommand),
    /// Cluster points by recursive bisection.
    Greedy(GreedyCommand),
}

/// Options accepted by the `nng` command.
#[derive(Debug, Args, Clone)]
pub struct NngCommand {
    /// Path to the nearest-neighbour digraph in the `*./` text format.
    pub path: PathBuf,

    /// Digraph deciding where leftover vertices may go (defaults to the
    /// nearest-neighbour digraph).
    #[arg(long)]
    pub priority: Option<PathBuf>,

    /// Seed selection policy.
    #[arg(long = "seed-method", value_enum, default_value_t = SeedMethodArg::InwardsUpdating)]
    pub seed_method: SeedMethodArg,

    /// How vertices left over by seed selection are handled.
    #[arg(long = "unassigned", value_enum, default_value_t = UnassignedArg::Lexical)]
    pub unassigned: UnassignedArg,

    /// Minimum number of vertices per cluster.
    #[arg(long = "min-cluster-size", default_value_t = DEFAULT_MIN_CLUSTER_SIZE)]
    pub min_cluster_size: usize,

    /// Size `--unassigned desired-size` grows clusters towards.
    #[arg(long = "desired-size")]
    pub desired_size: Option<usize>,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Options accepted by the `greedy` command.
#[derive(Debug, Args, Clone)]
pub struct GreedyCommand {
    /// Path to a file with one point per line, coordinates separated by
    /// whitespace or commas.
    pub path: PathBuf,

    /// Minimum number of points per cluster.
    #[arg(long = "min-cluster-size", default_value_t = DEFAULT_MIN_CLUSTER_SIZE)]
    pub min_cluster_size: usize,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Seed selection policies exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedMethodArg {
    /// Ascending vertex id.
    Lexical,
    /// Ascending in-degree, computed once.
    InwardsOrder,
    /// Ascending in-degree, refreshed after every selection.
    InwardsUpdating,
    /// Most conflicting vertices first, computed once.
    ExclusionOrder,
    /// Most conflicting vertices first, refreshed after every selection.
    ExclusionUpdating,
}

impl From<SeedMethodArg> for SeedMethod {
    fn from(value: SeedMethodArg) -> Self {
        match value {
            SeedMethodArg::Lexical => Self::Lexical,
            SeedMethodArg::InwardsOrder => Self::InwardsOrder,
            SeedMethodArg::InwardsUpdating => Self::InwardsUpdating,
            SeedMethodArg::ExclusionOrder => Self::ExclusionOrder,
            SeedMethodArg::ExclusionUpdating => Self::ExclusionUpdating,
        }
    }
}

/// Leftover handling exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnassignedArg {
    /// Leave leftovers unassigned.
    Ignore,
    /// Join the first labelled priority neighbour.
    Lexical,
    /// Grow clusters towards the desired size.
    DesiredSize,
}

impl From<UnassignedArg> for UnassignedMethod {
    fn from(value: UnassignedArg) -> Self {
        match value {
            UnassignedArg::Ignore => Self::Ignore,
            UnassignedArg::Lexical => Self::Lexical,
            UnassignedArg::DesiredSize => Self::DesiredSize,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading an input file failed.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A digraph file was malformed.
    #[error("failed to parse digraph `{path}`: {source}")]
    Digraph {
        /// Path of the malformed file.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: DigraphError,
    },
    /// A coordinate could not be read as a number.
    #[error("`{path}` line {line}: `{value}` is not a number")]
    InvalidCoordinate {
        /// Path of the malformed file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// The offending token.
        value: String,
    },
    /// The points did not form a valid matrix.
    #[error("invalid points in `{path}`: {source}")]
    Points {
        /// Path of the point file.
        path: PathBuf,
        /// Validation failure.
        #[source]
        source: DataSourceError,
    },
    /// Core orchestration failed.
    #[error(transparent)]
    Core(#[from] ClusteringError),
}

impl CliError {
    /// Stable machine-readable code of the underlying library error, if
    /// any.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::Digraph { source, .. } => Some(source.code().as_str()),
            Self::Points { source, .. } => Some(source.code().as_str()),
            Self::Core(core) => Some(core.code().as_str()),
            Self::Io { .. } | Self::InvalidCoordinate { .. } => None,
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the clustered input.
    pub data_source: String,
    /// Labels produced by the command.
    pub clustering: Clustering,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading the input or clustering fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use mincluster_cli::cli::{Cli, Command, GreedyCommand, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0 0\n0 1\n9 9\n9 8\n")?;
/// let cli = Cli {
///     command: Command::Greedy(GreedyCommand {
///         path: file.path().to_path_buf(),
///         min_cluster_size: 2,
///         name: None,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.clustering.cluster_count(), 2);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let summary = match cli.command {
        Command::Nng(command) => {
            Span::current().record("command", field::display("nng"));
            run_nng(command)?
        }
        Command::Greedy(command) => {
            Span::current().record("command", field::display("greedy"));
            run_greedy(command)?
        }
    };
    info!(
        data_source = summary.data_source.as_str(),
        clusters = summary.clustering.cluster_count(),
        "command completed"
    );
    Ok(summary)
}

#[instrument(
    name = "cli.nng",
    err,
    skip(command),
    fields(
        path = %command.path.display(),
        seed_method = ?command.seed_method,
        unassigned = ?command.unassigned,
        min_cluster_size = command.min_cluster_size,
        priority = field::Empty,
    ),
)]
pub(super) fn run_nng(command: NngCommand) -> Result<ExecutionSummary, CliError> {
    let mut builder = MinClusterBuilder::new()
        .with_min_cluster_size(command.min_cluster_size)
        .with_seed_method(command.seed_method.into())
        .with_unassigned_method(command.unassigned.into());
    if let Some(size) = command.desired_size {
        builder = builder.with_desired_cluster_size(size);
    }
    let runner: MinCluster = builder.build()?;

    let nng = read_digraph(&command.path)?;
    let clustering = match &command.priority {
        Some(path) => {
            Span::current().record("priority", field::display(path.display()));
            let priority = read_digraph(path)?;
            runner.run_nng_with_priority(&nng, &priority)?
        }
        None => runner.run_nng(&nng)?,
    };
    Ok(ExecutionSummary {
        data_source: derive_data_source_name(&command.path, command.name.as_deref()),
        clustering,
    })
}

#[instrument(
    name = "cli.greedy",
    err,
    skip(command),
    fields(path = %command.path.display(), min_cluster_size = command.min_cluster_size),
)]
pub(super) fn run_greedy(command: GreedyCommand) -> Result<ExecutionSummary, CliError> {
    let runner = MinClusterBuilder::new()
        .with_min_cluster_size(command.min_cluster_size)
        .build()?;
    let name = derive_data_source_name(&command.path, command.name.as_deref());
    let points = read_points(&command.path, name)?;
    let clustering = runner.run_greedy(&points)?;
    Ok(ExecutionSummary {
        data_source: points.name().to_owned(),
        clustering,
    })
}

fn read_input(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[instrument(name = "cli.read_digraph", err, fields(path = %path.display()))]
pub(super) fn read_digraph(path: &Path) -> Result<Digraph, CliError> {
    read_input(path)?
        .parse()
        .map_err(|source| CliError::Digraph {
            path: path.to_path_buf(),
            source,
        })
}

/// Parses one point per line. Blank lines and lines starting with `#` are
/// skipped.
#[instrument(name = "cli.read_points", err, skip(name), fields(path = %path.display()))]
pub(super) fn read_points(path: &Path, name: String) -> Result<PointMatrix, CliError> {
    let text = read_input(path)?;
    let mut rows = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<f64>().map_err(|_| CliError::InvalidCoordinate {
                    path: path.to_path_buf(),
                    line: index + 1,
                    value: token.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    PointMatrix::from_rows(name, rows).map_err(|source| CliError::Points {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "data_source".to_owned())
}

/// Renders `summary` to `writer` as a header followed by one
/// `index<TAB>label` line per item, `-` marking unassigned items.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use mincluster_cli::cli::{ExecutionSummary, render_summary};
/// # use mincluster_core::{ClusterId, Clustering};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     data_source: "demo".into(),
///     clustering: Clustering::try_from_labels(vec![Some(ClusterId::new(0)), None])?,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "data source: demo\nclusters: 1\n0\t0\n1\t-\n");
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "clusters: {}", summary.clustering.cluster_count())?;
    for (index, label) in summary.clustering.labels().iter().enumerate() {
        match label {
            Some(id) => writeln!(writer, "{index}\t{}", id.get())?,
            None => writeln!(writer, "{index}\t-")?,
        }
    }
    Ok(())
}
