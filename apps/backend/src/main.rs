//! # Sales Backend
//!
//! JSON-lines front end: one request per stdin line, one response per
//! stdout line.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sales Backend Process                            │
//! │                                                                         │
//! │  stdin ──► Request ──► Backend::dispatch ──► Response ──► stdout       │
//! │                              │                                          │
//! │                              ├──► SQLite (SALES_DB_PATH)               │
//! │                              └──► LoggingEventPublisher (stderr)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```bash
//! echo '{"op":"create_branch","payload":{"name":"Centro"}}' | sales-backend
//! ```

use std::sync::Arc;

use sales_backend::{init_tracing, AppConfig, Argon2Hasher, Backend, LoggingEventPublisher};
use sales_db::Database;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.log_filter);

    info!(
        db_path = %config.db_path,
        max_connections = config.db_max_connections,
        topic_prefix = %config.event_topic_prefix,
        "Starting sales backend"
    );

    let db = Database::new(config.db_config()).await?;
    if !db.health_check().await {
        return Err("database health check failed".into());
    }
    info!("Database ready");

    let backend = Backend::new(
        db.clone(),
        Arc::new(LoggingEventPublisher::new(config.event_topic_prefix.clone())),
        Arc::new(Argon2Hasher),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = backend.dispatch_line(&line).await;
        if !response.is_success() {
            warn!(status = response.status, "Request returned an error");
        }

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
        handled += 1;
    }

    info!(handled, "Input closed, shutting down");
    db.close().await;
    Ok(())
}
