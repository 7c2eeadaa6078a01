//! reportdeck CLI binary entry point
//!
//! Installs logging on stderr, then hands over to the library's `run_cli()`.

use anyhow::Result;
use reportdeck_cli::run_cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run_cli()
}
