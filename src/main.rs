//! CarryLink CLI binary

use anyhow::Context;
use carrylink::cli::{CarryLinkApp, Cli};
use carrylink::config::Config;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter()?)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?config, "configuration loaded");

    let app = CarryLinkApp::new(&config);
    let output = app
        .execute(cli.command)
        .await
        .context("command failed")?;

    println!("{}", output);
    Ok(())
}
