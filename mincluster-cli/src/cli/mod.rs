//! Command-line interface orchestration for mincluster.
//!
//! The `nng` command clusters a nearest-neighbour digraph read from the
//! compact text format; the `greedy` command clusters a file of points by
//! recursive bisection.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, GreedyCommand, NngCommand, SeedMethodArg,
    UnassignedArg, render_summary, run_cli,
};
