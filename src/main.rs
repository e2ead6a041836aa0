//! mosaic - Terminal renderer for streamed generative UI surfaces
//!
//! Connects to a generation backend that streams GenUI messages (flat
//! component lists plus a shared JSON data model), rebuilds each surface's
//! component forest, and renders the surfaces into the terminal viewport.

mod app;
mod binding;
mod config;
mod forest;
mod layout;
mod measure;
mod network;
mod render;
mod schema;
mod store;
mod theme;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "mosaic")]
#[command(about = "Terminal renderer for streamed generative UI surfaces", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend host to connect to
    #[arg(long)]
    host: Option<String>,

    /// Backend port to connect to
    #[arg(short, long)]
    port: Option<u16>,

    /// Start in fullscreen (packed) mode
    #[arg(short, long)]
    fullscreen: bool,

    /// Log file path (default: mosaic.log)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a file of GenUI messages without rendering anything
    Validate {
        /// JSON file holding an array of GenUI messages
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle subcommands before touching the terminal.
    if let Some(Commands::Validate { file }) = cli.command {
        return validate_messages(&file);
    }

    // Initialize logging to file (use RUST_LOG env var to control level).
    // A TUI can't log to stdout, so everything goes to a file.
    let log_path = cli.log_file.clone().unwrap_or_else(|| PathBuf::from("mosaic.log"));
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // No color codes in the log file
        .init();

    let mut config = config::Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.connection.host = host;
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }
    if cli.fullscreen {
        config.ui.fullscreen = true;
    }

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let host = config.connection.host.clone();
    let port = config.connection.port;
    tokio::spawn(async move {
        if let Err(e) = network::BackendConnection::start(&host, port, event_tx).await {
            tracing::error!("Backend connection failed: {:#}", e);
        }
    });

    app::run(config, event_rx).await
}

/// Parse and cross-check a message file, reporting what the renderer
/// would build from it.
fn validate_messages(path: &PathBuf) -> Result<()> {
    println!("Validating message file: {:?}", path);
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let raw: serde_json::Value =
        serde_json::from_str(&contents).context("File is not valid JSON")?;
    let Some(items) = raw.as_array() else {
        anyhow::bail!("Expected a JSON array of GenUI messages");
    };

    let mut errors = 0usize;
    let mut data = serde_json::Value::Null;
    let mut messages = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match schema::Message::parse(&item.to_string()) {
            Ok(message) => messages.push(message),
            Err(e) => {
                eprintln!("✗ Error: message {} does not validate: {}", index, e);
                errors += 1;
            }
        }
    }

    let mut saw_surface_update = false;
    let mut saw_data_update = false;
    for message in &messages {
        if let schema::Message::DataModelUpdate { data: update, .. } = message {
            saw_data_update = true;
            data = update.clone();
        }
    }
    for message in &messages {
        if let schema::Message::SurfaceUpdate { surface, components, .. } = message {
            saw_surface_update = true;
            let parsed = schema::parse_components(components);
            let dropped = components.len() - parsed.len();
            let forest = forest::build(&parsed, &data);
            println!(
                "  surface '{}': {} records, {} roots",
                surface,
                parsed.len(),
                forest.len()
            );
            if dropped > 0 {
                println!("⚠ Warning: surface '{}' dropped {} malformed record(s)", surface, dropped);
            }
            if forest.is_empty() && !parsed.is_empty() {
                eprintln!("✗ Error: surface '{}' resolves to an empty forest", surface);
                errors += 1;
            }
        }
    }
    for required in ["surfaceUpdate", "dataModelUpdate"] {
        let present = match required {
            "surfaceUpdate" => saw_surface_update,
            _ => saw_data_update,
        };
        if !present {
            eprintln!("✗ Error: missing required message type {}", required);
            errors += 1;
        }
    }

    if errors == 0 {
        println!("✓ {} message(s) valid", messages.len());
        Ok(())
    } else {
        anyhow::bail!("{} validation error(s)", errors);
    }
}
