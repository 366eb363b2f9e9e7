#![allow(clippy::uninlined_format_args)] // Named args are clearer

//! pexplore command line front end
//!
//! Builds automata from Presburger formulas through a remote solver and lets
//! the user page through example solutions and reorder variables.
//!
//! Solver location comes from `--solver-url`, falling back to the
//! `PEXPLORE_SOLVER_URL` environment variable and then to a local default.

mod commands;

use clap::{Args, Parser, Subcommand};
use pexplore::{DisplayOptions, SolverConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Explore automata built from Presburger arithmetic formulas
#[derive(Parser, Debug)]
#[command(name = "pexplore")]
#[command(about = "Explore automata built from Presburger arithmetic formulas")]
struct Cli {
    /// Solver base URL (overrides PEXPLORE_SOLVER_URL)
    #[arg(long, global = true)]
    solver_url: Option<String>,

    /// Request timeout in seconds (overrides PEXPLORE_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an automaton and print its example solutions
    Build(BuildArgs),
    /// Interactive session: reveal examples, reorder variables, export
    Interactive(InteractiveArgs),
}

#[derive(Args, Debug, Clone, Copy)]
struct DisplayArgs {
    /// Hide transition labels in the diagram
    #[arg(long)]
    hide_labels: bool,

    /// Show the atomic construction (recomputed from the formula source)
    #[arg(long)]
    atomic_construction: bool,
}

impl From<DisplayArgs> for DisplayOptions {
    fn from(args: DisplayArgs) -> Self {
        DisplayOptions {
            display_labels: !args.hide_labels,
            display_atomic_construction: args.atomic_construction,
        }
    }
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Formula text (may include macro definitions)
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    formula: Option<String>,

    /// Read the formula from a file instead
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Additional examples to reveal after the build
    #[arg(short = 'n', long, default_value = "0")]
    examples: usize,

    /// Variable order to switch to, comma-separated (e.g. "y,x,z")
    #[arg(long, value_delimiter = ',')]
    order: Option<Vec<String>>,

    /// Directory to write automaton.dot and automaton.mata into
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print the diagram (DOT) after the examples
    #[arg(long)]
    dot: bool,

    #[command(flatten)]
    display: DisplayArgs,
}

#[derive(Args, Debug)]
struct InteractiveArgs {
    /// Formula file to build on start
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[command(flatten)]
    display: DisplayArgs,
}

fn solver_config(cli: &Cli) -> SolverConfig {
    let mut config = SolverConfig::from_env();
    if let Some(url) = &cli.solver_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout_secs(timeout);
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = solver_config(&cli);

    match cli.command {
        Command::Build(args) => {
            commands::run_build(commands::BuildCmdConfig {
                solver: config,
                display: args.display.into(),
                formula: args.formula,
                file: args.file,
                examples: args.examples,
                order: args.order,
                export: args.export,
                print_dot: args.dot,
            })
            .await
        }
        Command::Interactive(args) => {
            commands::run_interactive(commands::InteractiveCmdConfig {
                solver: config,
                display: args.display.into(),
                file: args.file,
            })
            .await
        }
    }
}
