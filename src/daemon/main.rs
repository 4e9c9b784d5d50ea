//! EcoSync server daemon
//!
//! Serves the bill analysis and chat API over HTTP.

use ecosync::{Config, GeminiClient, GenerativeModel};

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// EcoSync server
#[derive(Parser, Debug)]
#[command(name = "ecosync-server")]
#[command(about = "Utility bill analysis and carbon budget service")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// HTTP server port
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Log level, or a full `RUST_LOG` style filter
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON log format
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Disable telemetry counters
    #[arg(long)]
    no_telemetry: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting {} server v{}", ecosync::NAME, ecosync::VERSION);

    let mut config = Config::load(args.config.as_deref()).context("failed to load configuration")?;

    // Command line overrides
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_telemetry {
        config.telemetry.enabled = false;
    }

    config.validate().context("invalid configuration")?;

    let model = GeminiClient::new(&config.model).context("failed to create model client")?;
    info!(
        model = model.name(),
        address = %config.server.bind_address(),
        max_upload_bytes = config.uploads.max_bytes,
        telemetry = config.telemetry.enabled,
        "Configuration loaded"
    );

    ecosync::server::serve(&config, Arc::new(model))
        .await
        .context("server failed")?;

    info!("EcoSync server shut down");
    Ok(())
}

/// Initialize the logging system.
///
/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str, json_format: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level '{}'", level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let result = if json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow::anyhow!("failed to set logging subscriber: {}", e))
}
