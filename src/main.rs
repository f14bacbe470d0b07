//! Polyrelay Server
//!
//! Runs the relay as a standalone HTTP server.

use anyhow::Result;
use clap::Parser;
use polyrelay::logging::{self, DEFAULT_LOG_DIR};
use polyrelay::rotation::DEFAULT_STATE_FILE;
use polyrelay::server::{self, AppState};
use polyrelay::Relay;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "polyrelay-server")]
#[command(about = "Fan chat messages and image prompts out to several LLM providers")]
struct Args {
    /// Server port
    #[arg(short, long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Server host
    #[arg(long, default_value = "0.0.0.0", env = "POLYRELAY_HOST")]
    host: String,

    /// Rotation state file
    #[arg(long, default_value = DEFAULT_STATE_FILE, env = "POLYRELAY_STATE_FILE")]
    state_file: PathBuf,

    /// Provider catalogue overriding the built-in one
    #[arg(long, env = "POLYRELAY_PROVIDERS_PATH")]
    providers: Option<PathBuf>,

    /// Per-provider timeout in seconds (0 disables)
    #[arg(long, default_value = "120", env = "POLYRELAY_TIMEOUT_SECS")]
    timeout_secs: u64,

    /// Directory for the daily-rolling log file
    #[arg(long, default_value = DEFAULT_LOG_DIR, env = "POLYRELAY_LOG_DIR")]
    log_dir: PathBuf,

    /// Log to the console only
    #[arg(long)]
    no_log_file: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let _log_guard = logging::init((!args.no_log_file).then_some(args.log_dir.as_path()))?;

    let timeout = (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs));

    info!("Starting polyrelay");
    info!("  State file: {}", args.state_file.display());
    if !args.no_log_file {
        info!("  Log dir: {}", args.log_dir.display());
    }
    info!("  Timeout: {:?}", timeout);

    let relay = Relay::from_environment(args.providers.as_deref(), &args.state_file, timeout)?;

    server::serve(AppState::new(relay), &args.host, args.port).await
}
