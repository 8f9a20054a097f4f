//! ragsql-rs binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ragsql_rs::cli::{Cli, execute};

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "ragsql_rs=debug,tower_http=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = execute(&cli).await?;
    if !output.is_empty() {
        #[allow(clippy::print_stdout)]
        {
            println!("{output}");
        }
    }
    Ok(())
}
