//! # Unit of Work
//!
//! One transaction per inbound operation, with every repository bound to it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Unit of Work Lifecycle                             │
//! │                                                                         │
//! │  db.begin().await?            ← BEGIN                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  uow.customers().get_by_id()  ┐                                        │
//! │  uow.sales().create()         ├ all on the same transaction            │
//! │  uow.products().update()      ┘                                        │
//! │       │                                                                 │
//! │       ├── uow.commit().await  → Commit::Committed                      │
//! │       │                       → Commit::Failed(DbError)  (logged)      │
//! │       │                                                                 │
//! │       └── dropped without commit → ROLLBACK                            │
//! │           (early return on error, or the caller's future was dropped)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commit never returns `Err`. It reports a [`Commit`] that carries the
//! cause on failure, so callers that only need "did it commit" can check
//! [`Commit::is_committed`] and callers that report errors keep the detail.

use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};
use tracing::{debug, error};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::branch::{BranchRepository, SqliteBranchRepository};
use crate::repository::customer::{CustomerRepository, SqliteCustomerRepository};
use crate::repository::product::{ProductRepository, SqliteProductRepository};
use crate::repository::sale::{SaleRepository, SqliteSaleRepository};
use crate::repository::user::{SqliteUserRepository, UserRepository};

/// The transaction type every SQLite repository runs on.
pub type SqliteTx = Transaction<'static, Sqlite>;

// =============================================================================
// Commit Outcome
// =============================================================================

/// Outcome of [`UnitOfWork::commit`].
#[derive(Debug)]
#[must_use]
pub enum Commit {
    /// Every change is durable.
    Committed,
    /// Nothing was persisted; the cause is kept for the caller.
    Failed(DbError),
}

impl Commit {
    pub fn is_committed(&self) -> bool {
        matches!(self, Commit::Committed)
    }

    pub fn into_result(self) -> DbResult<()> {
        match self {
            Commit::Committed => Ok(()),
            Commit::Failed(err) => Err(err),
        }
    }
}

// =============================================================================
// Unit of Work Trait
// =============================================================================

/// Repositories sharing one transaction, plus the commit that ends it.
///
/// Repository handles borrow the unit of work mutably, so only one is
/// alive at a time and all of them see each other's uncommitted writes.
#[async_trait]
pub trait UnitOfWork: Send {
    fn branches(&mut self) -> Box<dyn BranchRepository + '_>;

    fn customers(&mut self) -> Box<dyn CustomerRepository + '_>;

    fn products(&mut self) -> Box<dyn ProductRepository + '_>;

    fn sales(&mut self) -> Box<dyn SaleRepository + '_>;

    fn users(&mut self) -> Box<dyn UserRepository + '_>;

    /// Commits the transaction. Using the unit of work afterwards fails
    /// with [`DbError::TransactionFailed`].
    async fn commit(&mut self) -> Commit;
}

// =============================================================================
// SQLite Implementation
// =============================================================================

/// Unit of work over a SQLite transaction.
///
/// ## Usage
/// ```rust,ignore
/// let mut uow = db.begin().await?;
/// let branch = uow.branches().create(branch).await?;
/// uow.commit().await.into_result()?;
/// ```
#[derive(Debug)]
pub struct SqliteUnitOfWork {
    /// `None` once committed.
    tx: Option<SqliteTx>,
}

impl SqliteUnitOfWork {
    pub fn new(tx: SqliteTx) -> Self {
        SqliteUnitOfWork { tx: Some(tx) }
    }

    /// Checks out a connection and issues `BEGIN`.
    pub async fn begin(db: &Database) -> DbResult<Self> {
        let tx = db
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work started");
        Ok(SqliteUnitOfWork::new(tx))
    }

    pub fn is_open(&self) -> bool {
        self.tx.is_some()
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    fn branches(&mut self) -> Box<dyn BranchRepository + '_> {
        Box::new(SqliteBranchRepository::new(&mut self.tx))
    }

    fn customers(&mut self) -> Box<dyn CustomerRepository + '_> {
        Box::new(SqliteCustomerRepository::new(&mut self.tx))
    }

    fn products(&mut self) -> Box<dyn ProductRepository + '_> {
        Box::new(SqliteProductRepository::new(&mut self.tx))
    }

    fn sales(&mut self) -> Box<dyn SaleRepository + '_> {
        Box::new(SqliteSaleRepository::new(&mut self.tx))
    }

    fn users(&mut self) -> Box<dyn UserRepository + '_> {
        Box::new(SqliteUserRepository::new(&mut self.tx))
    }

    async fn commit(&mut self) -> Commit {
        let Some(tx) = self.tx.take() else {
            let err = DbError::TransactionFailed("unit of work already completed".to_string());
            error!(error = %err, "Commit called twice");
            return Commit::Failed(err);
        };

        match tx.commit().await {
            Ok(()) => {
                debug!("Unit of work committed");
                Commit::Committed
            }
            Err(err) => {
                let err = DbError::from(err);
                error!(error = %err, "Unit of work commit failed");
                Commit::Failed(err)
            }
        }
    }
}

impl Drop for SqliteUnitOfWork {
    fn drop(&mut self) {
        // The transaction's own Drop issues the ROLLBACK.
        if self.tx.is_some() {
            debug!("Unit of work dropped without commit, rolling back");
        }
    }
}
