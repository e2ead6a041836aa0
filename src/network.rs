use crate::schema::Message;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events delivered from the generation backend to the UI loop.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    Message(Message),
    Connected,
    Disconnected,
}

/// Line-delimited JSON connection to the generation backend.
///
/// The client is read-only: it never writes to the backend. A line that
/// fails to parse is logged and skipped, so a garbled message can never
/// corrupt the last-known-good surface state.
pub struct BackendConnection;

impl BackendConnection {
    pub async fn start(
        host: &str,
        port: u16,
        event_tx: mpsc::UnboundedSender<BackendEvent>,
    ) -> Result<()> {
        info!("Connecting to backend at {}:{}...", host, port);

        let stream = TcpStream::connect(format!("{}:{}", host, port))
            .await
            .context("Failed to connect to backend")?;

        info!("Connected successfully");
        let _ = event_tx.send(BackendEvent::Connected);

        let mut reader = BufReader::new(stream);
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("Connection closed by backend");
                    let _ = event_tx.send(BackendEvent::Disconnected);
                    break;
                }
                Ok(_) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match Message::parse(line) {
                        Ok(message) => {
                            debug!("Received message: {:?}", message);
                            let _ = event_tx.send(BackendEvent::Message(message));
                        }
                        Err(e) => {
                            warn!("Skipping unparsable message: {}", e);
                        }
                    }
                }
                Err(e) => {
                    error!("Error reading from backend: {}", e);
                    let _ = event_tx.send(BackendEvent::Disconnected);
                    break;
                }
            }
        }

        Ok(())
    }
}
