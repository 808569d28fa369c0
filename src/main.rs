//! DoubleTrust CLI entry point.

use clap::Parser;

use doubletrust::cli::{self, Cli};
use doubletrust::infrastructure::config::ConfigLoader;
use doubletrust::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match ConfigLoader::load_with(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => cli::handle_error(&err, cli.json),
    };
    if let Some(api_url) = &cli.api_url {
        config.api.base_url.clone_from(api_url);
        if let Err(err) = ConfigLoader::validate(&config) {
            cli::handle_error(&err.into(), cli.json);
        }
    }

    // Held for the life of the process so buffered file logs are flushed.
    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => cli::handle_error(&err, cli.json),
    };

    let result = match cli::build_context(&config, cli.json) {
        Ok(ctx) => cli::run(cli.command, &ctx).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        cli::handle_error(&err, cli.json);
    }
}
