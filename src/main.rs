use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use task_control::{config::AppConfig, server, telemetry};

#[derive(Parser)]
#[command(name = "task-control")]
#[command(about = "Task management HTTP API backed by a single JSON file")]
struct Cli {
    /// Interface to bind (overrides APP_HOST)
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (overrides APP_PORT)
    #[arg(long)]
    port: Option<u16>,
    /// Directory holding the database file (overrides DB_DIRECTORY)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Database file name (overrides DB_FILENAME)
    #[arg(long)]
    db_file: Option<String>,
}

impl Cli {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.data_dir {
            config.db_directory = dir;
        }
        if let Some(file) = self.db_file {
            config.db_filename = file;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing()?;

    let cli = Cli::parse();
    let config = cli.apply(AppConfig::from_env().context("failed to load application configuration")?);

    server::serve(&config, server::shutdown_signal()).await
}
