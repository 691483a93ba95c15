//! # Handlers
//!
//! One function per operation, each generic over the unit of work.
//!
//! ## Handler Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Every Handler                                    │
//! │                                                                         │
//! │  1. cmd.validate()            → AppError::Validation (all fields)      │
//! │  2. existence checks          → AppError::NotFound                     │
//! │  3. repository calls          (same transaction)                       │
//! │  4. uow.commit()              → AppError::Transaction (cause kept)     │
//! │  5. entity → result, publish event (after commit only)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An early `?` return drops nothing but the borrow: the caller owns the
//! unit of work, and dropping it uncommitted rolls the transaction back.

pub mod branch;
pub mod customer;
pub mod product;
pub mod sale;
pub mod user;

use sales_core::Validate;
use sales_db::{Commit, UnitOfWork};

use crate::error::{AppError, AppResult};

/// Step 1: rejects the command with every failed rule.
pub(crate) fn validate(cmd: &impl Validate) -> AppResult<()> {
    cmd.validate().map_err(AppError::Validation)
}

/// Step 4: commits, keeping the storage cause on failure.
pub(crate) async fn commit<U: UnitOfWork + ?Sized>(uow: &mut U) -> AppResult<()> {
    match uow.commit().await {
        Commit::Committed => Ok(()),
        Commit::Failed(source) => Err(AppError::Transaction { source }),
    }
}

pub use branch::{create_branch, delete_branch, get_branch, list_branches, update_branch};
pub use customer::{create_customer, delete_customer, get_customer, list_customers, update_customer};
pub use product::{create_product, delete_product, get_product, list_products, update_product};
pub use sale::{cancel_sale_item, create_sale, delete_sale, get_sale, list_sales, update_sale_status};
pub use user::{create_user, delete_user, get_user, list_users};
