//! Cohort command-line interface

use clap::{Parser, Subcommand};
use octofhir_cohort::cli::{catalog, chips, compile, decompile, join, output};
use std::path::PathBuf;

/// Cohort query command-line tool
#[derive(Parser)]
#[command(name = "cohort")]
#[command(author, version, about = "Cohort query compiler tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pretty: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a criteria tree into a query engine request
    Compile {
        /// Criteria tree file (JSON)
        tree: PathBuf,

        /// Population records file (JSON array)
        #[arg(short = 'P', long = "population")]
        populations: Option<PathBuf>,

        /// Version written into the request
        #[arg(long)]
        request_version: Option<String>,
    },

    /// Decompile a query engine request into a criteria tree
    Decompile {
        /// Request file (JSON)
        request: PathBuf,

        /// Population records file (JSON array)
        #[arg(short = 'P', long = "population")]
        populations: Option<PathBuf>,
    },

    /// Graft a request under a group of another request
    Join {
        /// Request receiving the other one
        host: PathBuf,

        /// Request to graft
        incoming: PathBuf,

        /// Host group id (0 for the root, 1 for the first group, ...)
        #[arg(long, default_value_t = 0)]
        parent: u32,

        /// Population records file (JSON array)
        #[arg(short = 'P', long = "population")]
        populations: Option<PathBuf>,

        /// Fixed id offset for the grafted request
        #[arg(long)]
        offset: Option<u32>,
    },

    /// List the criterion catalog
    Catalog {
        /// Print definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize the criteria of a tree
    Chips {
        /// Criteria tree file (JSON)
        tree: PathBuf,

        /// Summarize for a de-identified population
        #[arg(short, long)]
        deidentified: bool,

        /// Print summaries as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    let result = match cli.command {
        Commands::Compile {
            tree,
            populations,
            request_version,
        } => {
            let config = compile::CompileConfig {
                tree,
                populations,
                request_version,
                pretty: cli.pretty,
                output_file: cli.output.clone(),
            };
            compile::compile(config).await
        }

        Commands::Decompile { request, populations } => {
            let config = decompile::DecompileConfig {
                request,
                populations,
                pretty: cli.pretty,
                output_file: cli.output.clone(),
            };
            decompile::decompile(config).await
        }

        Commands::Join {
            host,
            incoming,
            parent,
            populations,
            offset,
        } => {
            let config = join::JoinConfig {
                host,
                incoming,
                parent,
                populations,
                join_offset: offset,
                pretty: cli.pretty,
                output_file: cli.output.clone(),
            };
            join::join(config).await
        }

        Commands::Catalog { json } => {
            let config = catalog::CatalogConfig {
                json,
                pretty: cli.pretty,
                output_file: cli.output.clone(),
            };
            catalog::catalog(config).await
        }

        Commands::Chips {
            tree,
            deidentified,
            json,
        } => {
            let config = chips::ChipsConfig {
                tree,
                deidentified,
                json,
                pretty: cli.pretty,
                output_file: cli.output.clone(),
            };
            chips::chips(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
