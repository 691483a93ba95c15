//! # sales-backend
//!
//! Application layer of the retail sales backend.
//!
//! ## Module Organization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        sales-backend                                    │
//! │                                                                         │
//! │  dispatch   Request → Backend::dispatch → Response                     │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  handlers   validate → check → repositories → commit → map/publish     │
//! │     │            │                                   │                  │
//! │     │            ▼                                   ▼                  │
//! │     │        mapping (command ↔ entity ↔ result)   events (sink)       │
//! │     ▼                                                                   │
//! │  sales-db   UnitOfWork + repositories                                   │
//! │                                                                         │
//! │  error      AppError with status and error codes                       │
//! │  config     AppConfig from environment variables                       │
//! │  hashing    Argon2 password hashing                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod handlers;
pub mod hashing;
pub mod mapping;

pub use config::{AppConfig, ConfigError};
pub use dispatch::{Backend, Request, Response};
pub use error::{AppError, AppResult, ErrorCode};
pub use events::{DomainEvent, EventPublisher, LoggingEventPublisher, PublishError};
pub use hashing::{Argon2Hasher, HashError, PasswordHashing};

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Logs go to stderr so stdout stays
/// reserved for responses. Calling this twice is a no-op.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
