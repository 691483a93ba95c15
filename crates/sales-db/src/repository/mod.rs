//! # Repository Module
//!
//! Storage contracts per aggregate and their SQLite implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Handler                                                               │
//! │       │                                                                 │
//! │       │  uow.products().get_by_id(id)                                  │
//! │       ▼                                                                 │
//! │  dyn ProductRepository (trait)                                         │
//! │  ├── create(entity)          → stored entity                           │
//! │  ├── get_by_id(id)           → Option<entity>                          │
//! │  ├── update(entity)          → stored entity                           │
//! │  ├── delete(id)              → bool (false when absent)                │
//! │  └── get_paged(page, filter) → Page<entity>                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteProductRepository ── runs on the unit of work's transaction     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Absence is never an error at this layer. Handlers decide whether a
//! missing row is a `NotFound`.
//!
//! ## Available Repositories
//!
//! - [`branch::BranchRepository`]
//! - [`customer::CustomerRepository`]
//! - [`product::ProductRepository`]
//! - [`sale::SaleRepository`] - Sale plus its items
//! - [`user::UserRepository`]

pub mod branch;
pub mod customer;
pub mod product;
pub mod sale;
pub mod user;

use sales_core::commands::ListFilter;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::error::{DbError, DbResult};
use crate::unit_of_work::SqliteTx;

/// The live connection behind a unit of work, or `TransactionFailed` once
/// it has been committed.
pub(crate) fn connection(tx: &mut Option<SqliteTx>) -> DbResult<&mut SqliteConnection> {
    tx.as_deref_mut().ok_or_else(|| {
        DbError::TransactionFailed("unit of work already completed".to_string())
    })
}

/// Appends `WHERE` clauses for the shared name/active filter.
pub(crate) fn push_list_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ListFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(name) = filter
        .name_contains
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        // LIKE is case-insensitive for ASCII in SQLite
        qb.push(" AND name LIKE ")
            .push_bind(format!("%{}%", escape_like(name)))
            .push(" ESCAPE '\\'");
    }

    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
}

/// Escapes LIKE wildcards with a backslash so the text matches literally.
pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::pool::{Database, DbConfig};

    pub async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database")
    }
}
