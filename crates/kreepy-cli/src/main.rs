//! Kreepy CLI - clean up CustomResourceDefinitions declared by CRDCleanupPolicy objects

use clap::{Parser, Subcommand};

mod commands;
mod display;
mod error;
mod exit_codes;
mod logging;

use error::Result;
use logging::LogFormat;

#[derive(Parser)]
#[command(name = "kreepy")]
#[command(version)]
#[command(about = "Deletes CRDs and CRD versions once no instances remain", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, env = "KREEPY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output encoding
    #[arg(long, global = true, env = "KREEPY_LOG_FORMAT", value_enum, default_value_t)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the controller until interrupted
    Run {
        /// Only watch policies in this namespace (default: all namespaces)
        #[arg(short, long, env = "KREEPY_NAMESPACE")]
        namespace: Option<String>,

        /// Seconds between passes while targets remain pending
        #[arg(long, env = "KREEPY_REQUEUE_INTERVAL", default_value_t = 60)]
        requeue_interval: u64,

        /// Seconds before retrying a failed pass
        #[arg(long, env = "KREEPY_ERROR_BACKOFF", default_value_t = 30)]
        error_backoff: u64,
    },

    /// Print the CRDCleanupPolicy CustomResourceDefinition as YAML
    Crd,

    /// Run a single cleanup pass for one policy
    Reconcile {
        /// Policy name
        policy: String,

        /// Policy namespace
        #[arg(short, long, default_value = "default")]
        namespace: String,

        /// Print the resulting status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the progress of a policy
    Status {
        /// Policy name
        policy: String,

        /// Policy namespace
        #[arg(short, long, default_value = "default")]
        namespace: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level, cli.log_format);

    match dispatch(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(code);
        }
    }
}

async fn dispatch(command: Commands) -> Result<i32> {
    match command {
        Commands::Run {
            namespace,
            requeue_interval,
            error_backoff,
        } => commands::run::run(namespace, requeue_interval, error_backoff)
            .await
            .map(|()| exit_codes::SUCCESS),

        Commands::Crd => commands::crd::run().map(|()| exit_codes::SUCCESS),

        Commands::Reconcile {
            policy,
            namespace,
            json,
        } => commands::reconcile::run(&namespace, &policy, json).await,

        Commands::Status {
            policy,
            namespace,
            json,
        } => commands::status::run(&namespace, &policy, json)
            .await
            .map(|()| exit_codes::SUCCESS),
    }
}
