use clap::Parser;
use tracing_subscriber::EnvFilter;

use ref_reconcile::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("ref_reconcile=debug,info")
    } else {
        EnvFilter::new("ref_reconcile=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Reconcile(args) => {
            cli::reconcile::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Rename(args) => {
            cli::rename::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Sites(args) => {
            cli::sites::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
