#![deny(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "snuts",
    about = "Detect test smells in JavaScript and TypeScript test suites",
    long_about = None,
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug logging, and a status line for files without smells.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Explicit `.snuts` config file (default: discovered upward from the
    /// first path).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan test files, then re-check them on every save until Ctrl-C.
    Watch(WatchArgs),

    /// Scan test files once and exit.
    Scan(ScanArgs),
}

#[derive(Args)]
struct WatchArgs {
    /// Files or directories, comma-separated.
    #[arg(value_delimiter = ',', required = true)]
    paths: Vec<PathBuf>,

    /// Quiet period per file before it is re-analyzed (default: 200).
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Maximum files analyzed at once (default: 10).
    #[arg(long)]
    concurrency: Option<usize>,
}

#[derive(Args)]
struct ScanArgs {
    /// Files or directories, comma-separated.
    #[arg(value_delimiter = ',', required = true)]
    paths: Vec<PathBuf>,

    /// Output format: pretty, text, or json.
    #[arg(long, default_value = "pretty")]
    format: String,

    /// Exit 1 if any smell was found.
    #[arg(long)]
    fail_on_smell: bool,

    /// Maximum files analyzed at once (default: 10).
    #[arg(long)]
    concurrency: Option<usize>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let global = commands::GlobalOpts {
        verbose: cli.verbose,
        config: cli.config,
    };

    match cli.command {
        Command::Watch(a) => commands::watch::run(&a.paths, a.debounce_ms, a.concurrency, &global).await,

        Command::Scan(a) => {
            let found = commands::scan::run(&a.paths, &a.format, a.concurrency, &global).await?;
            if a.fail_on_smell && found > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Logs go to stderr so reports on stdout stay machine-readable.
/// `RUST_LOG` overrides the default filter.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "snuts=debug,snuts_core=debug"
    } else {
        "snuts=info,snuts_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
