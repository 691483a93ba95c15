//! # Domain Types
//!
//! Entities of the sales domain and the `Sale` aggregate rules.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Branch       │   │    Customer     │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  name           │   │  name           │       │
//! │  │  is_active      │   │  email / phone  │   │  price_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Sale (root)    │──►│    SaleItem     │   │      User       │       │
//! │  │  ─────────────  │1:N│  ─────────────  │   │  ─────────────  │       │
//! │  │  sale_number    │   │  quantity 1-20  │   │  email (unique) │       │
//! │  │  status         │   │  discount_bps   │   │  password_hash  │       │
//! │  │  total_amount   │   │  is_cancelled   │   │  role / status  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sale Status Machine
//! ```text
//!   Active ──────► Completed
//!     │                │
//!     └──► Cancelled ◄─┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Branch
// =============================================================================

/// A store location where sales happen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Branch {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub name: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer a sale is billed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,

    /// Display name.
    pub name: String,

    pub description: Option<String>,

    /// Price in cents. Bounded to 1..=99_999_999 by validation.
    pub price_cents: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale is open; items may still be cancelled.
    #[default]
    Active,
    /// Sale has been finalized.
    Completed,
    /// Sale was cancelled. Terminal.
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Active => "active",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a sale in this status may move to `next`.
    ///
    /// ## Rules
    /// - active → completed
    /// - active → cancelled
    /// - completed → cancelled
    /// - anything else, including staying put, is rejected
    pub fn can_transition_to(&self, next: SaleStatus) -> bool {
        matches!(
            (self, next),
            (SaleStatus::Active, SaleStatus::Completed)
                | (SaleStatus::Active, SaleStatus::Cancelled)
                | (SaleStatus::Completed, SaleStatus::Cancelled)
        )
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale and the items it owns.
///
/// `items` is loaded separately from the `sale_items` table, so the row
/// mapping skips it and leaves it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Human-readable number, unique across sales.
    pub sale_number: String,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub customer_id: String,
    pub branch_id: String,
    /// Sum of non-cancelled item totals, in cents.
    pub total_amount_cents: i64,
    pub status: SaleStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Recomputes the total from the non-cancelled items.
    pub fn recalculate_total(&mut self) {
        self.total_amount_cents = self
            .items
            .iter()
            .filter(|item| !item.is_cancelled)
            .map(SaleItem::total_amount)
            .sum::<Money>()
            .cents();
    }

    /// Moves the sale to `next`, rejecting transitions the status machine
    /// does not allow.
    pub fn transition_to(&mut self, next: SaleStatus, now: DateTime<Utc>) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidSaleStatus {
                sale_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Cancels one item and recomputes the sale total.
    ///
    /// ## Rules
    /// - The sale must be active
    /// - The item must belong to the sale
    /// - An item can only be cancelled once
    pub fn cancel_item(&mut self, item_id: &str, now: DateTime<Utc>) -> CoreResult<&SaleItem> {
        if self.status != SaleStatus::Active {
            return Err(CoreError::SaleNotActive {
                sale_id: self.id.clone(),
                status: self.status,
            });
        }

        let index = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| CoreError::SaleItemNotFound {
                sale_id: self.id.clone(),
                item_id: item_id.to_string(),
            })?;

        if self.items[index].is_cancelled {
            return Err(CoreError::ItemAlreadyCancelled {
                item_id: item_id.to_string(),
            });
        }

        self.items[index].is_cancelled = true;
        self.items[index].updated_at = now;
        self.recalculate_total();
        self.updated_at = now;

        Ok(&self.items[index])
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// One line of a sale.
/// Uses snapshot pattern to freeze the product price at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Quantity sold (1-20).
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Discount in basis points (1000 = 10%).
    pub discount_bps: u32,
    /// unit_price × quantity − discount.
    pub total_amount_cents: i64,
    pub is_cancelled: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl SaleItem {
    /// Builds an item, computing its total from the price snapshot.
    pub fn new(
        id: String,
        sale_id: String,
        product_id: String,
        quantity: i64,
        unit_price_cents: i64,
        discount_bps: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let total = Self::compute_total(unit_price_cents, quantity, discount_bps);
        SaleItem {
            id,
            sale_id,
            product_id,
            quantity,
            unit_price_cents,
            discount_bps,
            total_amount_cents: total.cents(),
            is_cancelled: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// unit_price × quantity, less the discount rounded half-up to the cent.
    pub fn compute_total(unit_price_cents: i64, quantity: i64, discount_bps: u32) -> Money {
        Money::from_cents(unit_price_cents)
            .multiply_quantity(quantity)
            .apply_percentage_discount(discount_bps)
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    Manager,
    Admin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// A user account.
///
/// `password_hash` is a PHC string and is skipped when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Unique across users.
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
