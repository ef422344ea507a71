//! drillbook CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "drillbook",
    version,
    about = "Adaptive drills for function tables and mental arithmetic"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the two quiz commands.
#[derive(Args, Clone, Debug, Default)]
pub struct SessionArgs {
    /// Record file of this quiz (overrides config and environment)
    #[arg(long)]
    notes: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decimal places used to compare numeric answers
    #[arg(long)]
    round_level: Option<u32>,

    /// Questions per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Fixed random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON session report into this directory
    #[arg(long)]
    report_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Practise function-table lookups in both directions
    Tables {
        /// Custom table catalog (.toml) replacing the built-in tables
        #[arg(long)]
        tables: Option<PathBuf>,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Practise multiplication
    Arith {
        /// Left operand spec, e.g. "(2~9, 12)"
        #[arg(long, requires = "right", conflicts_with = "digits")]
        left: Option<String>,

        /// Right operand spec
        #[arg(long, requires = "left", conflicts_with = "digits")]
        right: Option<String>,

        /// Operand digit counts, e.g. "2x3"
        #[arg(long)]
        digits: Option<String>,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Check whether an operand spec is accepted
    CheckSpec {
        /// The spec to check, e.g. "(1, 3~5)"
        spec: String,
    },

    /// Show or clear the stored error and timeout records
    Notes {
        /// Record file
        #[arg(long)]
        notes: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use the arithmetic quiz's records instead of the table quiz's
        #[arg(long)]
        arith: bool,

        /// Remove all stored records
        #[arg(long)]
        clear: bool,
    },

    /// Validate a table catalog TOML file
    Validate {
        /// Path to the catalog
        #[arg(long)]
        tables: PathBuf,
    },

    /// Create starter config and example table catalog
    Init,
}

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("drillbook=warn,drillbook_core=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tables { tables, session } => commands::tables::execute(tables, session),
        Commands::Arith {
            left,
            right,
            digits,
            session,
        } => commands::arith::execute(left, right, digits, session),
        Commands::CheckSpec { spec } => commands::check_spec::execute(&spec),
        Commands::Notes {
            notes,
            config,
            arith,
            clear,
        } => commands::notes::execute(notes, config, arith, clear),
        Commands::Validate { tables } => commands::validate::execute(tables),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
