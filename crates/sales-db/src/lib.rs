//! # sales-db: Database Layer for the Sales Backend
//!
//! This crate provides database access for the sales backend.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sales Backend Data Flow                          │
//! │                                                                         │
//! │  Handler (create_sale)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     sales-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  UnitOfWork   │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (one tx)      │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │───►│ BranchRepo    │    │ 001_initial_ │  │   │
//! │  │   │ begin()       │    │ CustomerRepo  │    │ schema.sql   │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │               │    │ SaleRepo      │    │              │  │   │
//! │  │   │               │    │ UserRepo      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (SALES_DB_PATH)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository traits and SQLite implementations
//! - [`unit_of_work`] - Transaction scope shared by the repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sales_db::{Database, DbConfig, UnitOfWork};
//!
//! let db = Database::new(DbConfig::new("./sales.db")).await?;
//!
//! let mut uow = db.begin().await?;
//! let product = uow.products().get_by_id(&id).await?;
//! uow.commit().await.into_result()?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use unit_of_work::{Commit, SqliteUnitOfWork, UnitOfWork};

// Repository re-exports for convenience
pub use repository::branch::BranchRepository;
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::{generate_sale_number, SaleRepository};
pub use repository::user::UserRepository;
