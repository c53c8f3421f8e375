//! The `query-criteria` command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use query_criteria_cli::{run, Command, Context};

/// The environment variable that holds the configuration directory.
const CONFIGURATION_ENV_VAR: &str = "QUERY_CRITERIA_CONFIGURATION";

/// Compile request parameters into SQL predicates, according to a declaration
/// of filterable fields.
#[derive(Parser)]
#[command(name = "query-criteria", version)]
struct Args {
    /// The directory holding the configuration.
    #[arg(
        long = "configuration",
        value_name = "DIRECTORY",
        env = CONFIGURATION_ENV_VAR,
        default_value = ".",
        global = true
    )]
    configuration: PathBuf,
    /// The command to invoke.
    #[command(subcommand)]
    subcommand: Command,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
pub async fn main() -> ExitCode {
    init_logging();

    let args = Args::parse();
    let context = Context {
        context_path: args.configuration,
    };
    match run(args.subcommand, &context).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
