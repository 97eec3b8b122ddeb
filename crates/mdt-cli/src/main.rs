mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, cr::CrSubcommand};
use mdt_core::MdtError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mdt",
    about = "Architecture decision and size-governance workflow for markdown change requests",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .mdt/ or .git/)
    #[arg(long, global = true, env = "MDT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize mdt in the current project
    Init,

    /// Manage change requests
    Cr {
        #[command(subcommand)]
        subcommand: CrSubcommand,
    },

    /// Surface architecture decisions for a CR, or complete a design pass
    Design {
        /// CR key (e.g. MDT-066; lowercase and short numbers are normalized)
        key: String,

        /// Option index per surfaced decision, comma-separated (e.g. 0,1,0).
        /// Omit to list the decision points without completing the pass.
        #[arg(long, value_delimiter = ',')]
        select: Option<Vec<usize>>,
    },

    /// Show the role size thresholds in effect (defaults merged with project overrides)
    Thresholds,

    /// Inspect and validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Cr { subcommand } => cmd::cr::run(&root, subcommand, cli.json),
        Commands::Design { key, select } => {
            cmd::design::run(&root, &key, select.as_deref(), cli.json)
        }
        Commands::Thresholds => cmd::thresholds::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        // Unclassified failures exit 6, the general-error code.
        let code = e
            .downcast_ref::<MdtError>()
            .map(MdtError::exit_code)
            .unwrap_or(6);
        std::process::exit(code);
    }
}
