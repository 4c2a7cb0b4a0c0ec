use clap::{Parser, Subcommand};
use docquery_schema::cli::{self as prog_cli, Command};
use docquery_schema::{GeneratorConfig, SchemaError, logger};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docquery-schema", version, about = "Derive strict and query JSON Schemas from a document declaration", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). If omitted, DOCQUERY_SCHEMA_CONFIG or ./docquery-schema.toml is used.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace (overrides config)")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Print the strict (document data) schema")]
    Strict {
        #[arg(help = "Declaration file (.json or .toml)")]
        declaration: PathBuf,
    },
    #[command(about = "Print the query (filter expression) schema")]
    Query {
        #[arg(help = "Declaration file (.json or .toml)")]
        declaration: PathBuf,
    },
    #[command(about = "Print both schemas as {\"strict\": ..., \"query\": ...}")]
    Both {
        #[arg(help = "Declaration file (.json or .toml)")]
        declaration: PathBuf,
    },
    #[command(about = "Validate a document or a filter against the generated schemas")]
    Validate {
        #[arg(help = "Declaration file (.json or .toml)")]
        declaration: PathBuf,
        #[arg(long, conflicts_with = "filter", required_unless_present = "filter", help = "JSON document to check against the strict schema")]
        document: Option<PathBuf>,
        #[arg(long, help = "JSON filter to check against the query schema")]
        filter: Option<PathBuf>,
    },
}

fn to_command(c: Commands) -> Command {
    match c {
        Commands::Strict { declaration } => Command::Strict { declaration },
        Commands::Query { declaration } => Command::Query { declaration },
        Commands::Both { declaration } => Command::Both { declaration },
        Commands::Validate { declaration, document: Some(document), .. } => {
            Command::ValidateDocument { declaration, document }
        }
        Commands::Validate { declaration, document: None, filter } => Command::ValidateFilter {
            declaration,
            filter: filter.unwrap_or_default(),
        },
    }
}

fn main() {
    let cli = Cli::parse();
    let cfg = match GeneratorConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    logger::configure_logging(cli.log_level.as_deref().or(cfg.log_level.as_deref()));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match prog_cli::run(cfg, to_command(cli.command), &mut out) {
        Ok(()) => {}
        Err(SchemaError::ValidationFailed { violations }) => {
            eprintln!("invalid:\n{violations}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    }
}
