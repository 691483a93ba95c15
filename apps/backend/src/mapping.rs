//! # Mapping
//!
//! Explicit conversions between commands, entities and results.
//!
//! ```text
//!   CreateProduct ──product_from_command()──► Product ──From──► ProductResult
//!   UpdateProduct ──apply_product_update()──► Product ──From──► ProductResult
//!   Page<Product> ──PagedResult::from()─────────────────────► PagedResult<ProductResult>
//! ```
//!
//! Results are what callers see. They never carry a password hash and
//! always expose money as integer cents.

use chrono::{DateTime, Utc};
use sales_core::commands::{
    CreateBranch, CreateCustomer, CreateProduct, CreateSale, CreateSaleItem, CreateUser,
    UpdateBranch, UpdateCustomer, UpdateProduct,
};
use sales_core::{
    Branch, Customer, Page, Product, Sale, SaleItem, SaleStatus, User, UserRole, UserStatus,
};
use serde::{Deserialize, Serialize};

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

/// Trims, and treats blank as absent.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Command → Entity
// =============================================================================

pub fn branch_from_command(cmd: CreateBranch, id: String, now: DateTime<Utc>) -> Branch {
    Branch {
        id,
        name: trimmed(&cmd.name),
        is_active: cmd.is_active,
        created_at: now,
        updated_at: now,
    }
}

pub fn apply_branch_update(branch: &mut Branch, cmd: UpdateBranch, now: DateTime<Utc>) {
    branch.name = trimmed(&cmd.name);
    branch.is_active = cmd.is_active;
    branch.updated_at = now;
}

pub fn customer_from_command(cmd: CreateCustomer, id: String, now: DateTime<Utc>) -> Customer {
    Customer {
        id,
        name: trimmed(&cmd.name),
        email: optional(cmd.email),
        phone: optional(cmd.phone),
        is_active: cmd.is_active,
        created_at: now,
        updated_at: now,
    }
}

pub fn apply_customer_update(customer: &mut Customer, cmd: UpdateCustomer, now: DateTime<Utc>) {
    customer.name = trimmed(&cmd.name);
    customer.email = optional(cmd.email);
    customer.phone = optional(cmd.phone);
    customer.is_active = cmd.is_active;
    customer.updated_at = now;
}

pub fn product_from_command(cmd: CreateProduct, id: String, now: DateTime<Utc>) -> Product {
    Product {
        id,
        name: trimmed(&cmd.name),
        description: optional(cmd.description),
        price_cents: cmd.price_cents,
        is_active: cmd.is_active,
        created_at: now,
        updated_at: now,
    }
}

pub fn apply_product_update(product: &mut Product, cmd: UpdateProduct, now: DateTime<Utc>) {
    product.name = trimmed(&cmd.name);
    product.description = optional(cmd.description);
    product.price_cents = cmd.price_cents;
    product.is_active = cmd.is_active;
    product.updated_at = now;
}

/// Builds an item from the request line and the product's current price.
pub fn sale_item_from_command(
    cmd: &CreateSaleItem,
    id: String,
    sale_id: &str,
    unit_price_cents: i64,
    now: DateTime<Utc>,
) -> SaleItem {
    SaleItem::new(
        id,
        sale_id.to_string(),
        cmd.product_id.clone(),
        cmd.quantity,
        unit_price_cents,
        cmd.discount_bps,
        now,
    )
}

/// Builds an active sale around already-priced items and computes its total.
pub fn sale_from_command(
    cmd: &CreateSale,
    id: String,
    sale_number: String,
    items: Vec<SaleItem>,
    now: DateTime<Utc>,
) -> Sale {
    let mut sale = Sale {
        id,
        sale_number,
        sale_date: cmd.sale_date.unwrap_or(now),
        customer_id: cmd.customer_id.clone(),
        branch_id: cmd.branch_id.clone(),
        total_amount_cents: 0,
        status: SaleStatus::Active,
        created_at: now,
        updated_at: now,
        items,
    };
    sale.recalculate_total();
    sale
}

/// Builds a user. The plaintext password in `cmd` is not copied.
pub fn user_from_command(
    cmd: &CreateUser,
    id: String,
    password_hash: String,
    now: DateTime<Utc>,
) -> User {
    User {
        id,
        username: trimmed(&cmd.username),
        email: cmd.email.trim().to_lowercase(),
        phone: trimmed(&cmd.phone),
        password_hash,
        role: cmd.role,
        status: cmd.status,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Entity → Result
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchResult {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Branch> for BranchResult {
    fn from(b: Branch) -> Self {
        BranchResult {
            id: b.id,
            name: b.name,
            is_active: b.is_active,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerResult {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResult {
    fn from(c: Customer) -> Self {
        CustomerResult {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResult {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    /// Display form, e.g. `$10.99`.
    pub price: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResult {
    fn from(p: Product) -> Self {
        ProductResult {
            price: p.price().to_string(),
            id: p.id,
            name: p.name,
            description: p.description,
            price_cents: p.price_cents,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItemResult {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_bps: u32,
    pub total_amount_cents: i64,
    pub is_cancelled: bool,
}

impl From<SaleItem> for SaleItemResult {
    fn from(i: SaleItem) -> Self {
        SaleItemResult {
            id: i.id,
            product_id: i.product_id,
            quantity: i.quantity,
            unit_price_cents: i.unit_price_cents,
            discount_bps: i.discount_bps,
            total_amount_cents: i.total_amount_cents,
            is_cancelled: i.is_cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleResult {
    pub id: String,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: String,
    pub branch_id: String,
    pub total_amount_cents: i64,
    /// Display form, e.g. `$45.00`.
    pub total_amount: String,
    pub status: SaleStatus,
    pub items: Vec<SaleItemResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Sale> for SaleResult {
    fn from(s: Sale) -> Self {
        SaleResult {
            total_amount: s.total_amount().to_string(),
            id: s.id,
            sale_number: s.sale_number,
            sale_date: s.sale_date,
            customer_id: s.customer_id,
            branch_id: s.branch_id,
            total_amount_cents: s.total_amount_cents,
            status: s.status,
            items: s.items.into_iter().map(SaleItemResult::from).collect(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResult {
    pub id: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResult {
    fn from(u: User) -> Self {
        UserResult {
            id: u.id,
            username: u.username,
            email: u.email,
            phone: u.phone,
            role: u.role,
            status: u.status,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// A page of results plus the paging figures callers need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub size: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<E, T: From<E>> From<Page<E>> for PagedResult<T> {
    fn from(page: Page<E>) -> Self {
        let total_pages = page.total_pages();
        let has_next = page.has_next();
        let has_previous = page.has_previous();
        let page = page.map(T::from);

        PagedResult {
            items: page.items,
            total_count: page.total_count,
            page: page.page,
            size: page.size,
            total_pages,
            has_next,
            has_previous,
        }
    }
}
