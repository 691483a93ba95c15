//! # sales-core: Pure Domain Logic for the Sales Backend
//!
//! Entities, money arithmetic, validation rules, paging and the command
//! types every handler accepts. Nothing in this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sales Backend Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Dispatcher (apps/backend)                          │   │
//! │  │    Request ──► Command ──► Handler ──► Result ──► Response      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sales-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ commands  │  │ validation│  │   │
//! │  │   │  Branch   │  │   Money   │  │ Create*   │  │ Validator │  │   │
//! │  │   │  Sale     │  │ Discounts │  │ Update*   │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                sales-db (Database Layer)                        │   │
//! │  │        SQLite queries, migrations, repositories, unit of work   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Branch, Customer, Product, Sale, SaleItem, User)
//! - [`money`] - Integer-cent money type
//! - [`error`] - Domain and validation errors
//! - [`validation`] - Field rules and the `Validator` collector
//! - [`paging`] - Page requests and paged slices
//! - [`commands`] - Inbound commands with their validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use sales_core::money::Money;
//!
//! let unit_price = Money::from_cents(1099); // $10.99
//! let line = unit_price.multiply_quantity(3).apply_percentage_discount(1000); // 10% off
//! assert_eq!(line.cents(), 2967);
//! ```

pub mod commands;
pub mod error;
pub mod money;
pub mod paging;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use money::Money;
pub use paging::{Page, PageRequest};
pub use types::*;
pub use validation::{Validate, Validator};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum length of a display name (branch, customer, product).
pub const MIN_NAME_LENGTH: usize = 2;

/// Maximum length of a display name (branch, customer, product).
pub const MAX_NAME_LENGTH: usize = 100;

/// Highest allowed product price: 999,999.99.
pub const MAX_PRICE_CENTS: i64 = 99_999_999;

/// Maximum quantity of a single sale item.
pub const MAX_ITEM_QUANTITY: i64 = 20;

/// Maximum number of items on one sale.
pub const MAX_SALE_ITEMS: usize = 100;

/// 100% expressed in basis points.
pub const MAX_DISCOUNT_BPS: u32 = 10_000;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;
