mod cli;
mod config;
mod executor;
mod logging;
mod request;
mod resources;
mod response;
mod security;
mod server;
mod system;

use std::sync::Arc;

use rmcp::{transport::stdio, ServiceExt};
use tracing::{info, warn};

use cli::Cli;
use config::ShellConfig;
use server::ShellServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cli, parse_error) = Cli::parse_lenient();
    let log_file = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    let _guard = logging::init(&log_file);

    if let Some(e) = parse_error {
        warn!(error = %e, "Error parsing command line options, using defaults");
    }

    let config = Arc::new(ShellConfig::from_env(&cli));

    info!("MCP Shell Server started");
    info!(shell = %config.shell_path, "Shell");
    match config.default_working_dir {
        Some(ref dir) => {
            info!(working_dir = %dir.display(), "Working Directory");
            if !security::is_under_home(dir) {
                warn!(
                    working_dir = %dir.display(),
                    "Default working directory is outside $HOME; requests without workingDir will be rejected"
                );
            }
        }
        None => info!("Working Directory: none"),
    }
    info!(platform = system::platform(), "Platform");
    info!(hostname = %system::hostname(), "Hostname");
    info!(username = %system::username(), "Username");

    let service = ShellServer::new(config)?.serve(stdio()).await?;
    info!("MCP Shell Server ready");
    service.waiting().await?;
    Ok(())
}
