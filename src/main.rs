use anyhow::Result;
use clap::Parser;
use model_serve::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("model_serve=info".parse()?))
        .init();

    let cli = Cli::parse();
    cli.run()
}
