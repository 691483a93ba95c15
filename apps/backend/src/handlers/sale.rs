//! # Sale Handlers
//!
//! ## Create Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CreateSale { customer_id, branch_id, items[] }                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate()  ── items 1..=100, quantity 1..=20, discount 0..=10000     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  customer? branch? every product?  ── missing → NotFound               │
//! │       │                                   inactive product → Conflict  │
//! │       ▼                                                                 │
//! │  SaleItem per line: product price snapshot, discount, total            │
//! │  Sale: generated number, total = Σ item totals                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sales().create()  →  commit  →  publish SaleCreated                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sales_core::commands::{
    CancelSaleItem, CreateSale, EntityId, ListQuery, SaleFilter, UpdateSaleStatus,
};
use sales_core::Sale;
use sales_db::{generate_sale_number, UnitOfWork};
use tracing::{debug, info};
use uuid::Uuid;

use super::{commit, validate};
use crate::error::{AppError, AppResult};
use crate::events::{publish_event, DomainEvent, EventPublisher};
use crate::mapping::{sale_from_command, sale_item_from_command, PagedResult, SaleResult};

pub async fn create_sale<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    publisher: &dyn EventPublisher,
    cmd: CreateSale,
) -> AppResult<SaleResult> {
    debug!(
        customer_id = %cmd.customer_id,
        branch_id = %cmd.branch_id,
        items = cmd.items.len(),
        "create_sale"
    );
    validate(&cmd)?;

    if uow.customers().get_by_id(&cmd.customer_id).await?.is_none() {
        return Err(AppError::not_found("Customer", &cmd.customer_id));
    }
    if uow.branches().get_by_id(&cmd.branch_id).await?.is_none() {
        return Err(AppError::not_found("Branch", &cmd.branch_id));
    }

    // product id → price snapshot
    let mut prices: HashMap<String, i64> = HashMap::new();
    for line in &cmd.items {
        if prices.contains_key(&line.product_id) {
            continue;
        }
        let product = uow
            .products()
            .get_by_id(&line.product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Product", &line.product_id))?;
        if !product.is_active {
            return Err(AppError::Conflict(format!(
                "Product {} is inactive",
                product.id
            )));
        }
        prices.insert(product.id, product.price_cents);
    }

    let now = Utc::now();
    let sale_id = Uuid::new_v4().to_string();
    let sale_number = generate_sale_number(&sale_id, cmd.sale_date.unwrap_or(now));

    let items = cmd
        .items
        .iter()
        .map(|line| {
            let unit_price = prices.get(&line.product_id).copied().unwrap_or_default();
            sale_item_from_command(line, Uuid::new_v4().to_string(), &sale_id, unit_price, now)
        })
        .collect();

    let sale = sale_from_command(&cmd, sale_id, sale_number, items, now);
    let sale = uow.sales().create(sale).await?;

    commit(uow).await?;

    info!(
        sale_id = %sale.id,
        sale_number = %sale.sale_number,
        total = %sale.total_amount(),
        items = sale.items.len(),
        "Sale created"
    );

    publish_event(publisher, &DomainEvent::sale_created(&sale)).await?;
    Ok(sale.into())
}

pub async fn get_sale<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    query: EntityId,
) -> AppResult<SaleResult> {
    debug!(id = %query.id, "get_sale");
    validate(&query)?;

    let sale = load_sale(uow, &query.id).await?;

    commit(uow).await?;
    Ok(sale.into())
}

pub async fn list_sales<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    query: ListQuery<SaleFilter>,
) -> AppResult<PagedResult<SaleResult>> {
    debug!(page = query.page.page, size = query.page.size, filter = ?query.filter, "list_sales");
    validate(&query)?;

    let page = uow.sales().get_paged(&query.page, &query.filter).await?;

    commit(uow).await?;
    Ok(page.into())
}

/// Moves a sale through its status machine.
///
/// Emits `SaleCancelled` when the sale ends up cancelled and
/// `SaleModified` for any other accepted change.
pub async fn update_sale_status<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    publisher: &dyn EventPublisher,
    cmd: UpdateSaleStatus,
) -> AppResult<SaleResult> {
    debug!(id = %cmd.id, status = %cmd.status, "update_sale_status");
    validate(&cmd)?;

    let mut sale = load_sale(uow, &cmd.id).await?;
    let previous_status = sale.status;

    sale.transition_to(cmd.status, Utc::now())?;
    let sale = uow.sales().update(sale).await?;

    commit(uow).await?;

    info!(sale_id = %sale.id, from = %previous_status, to = %sale.status, "Sale status changed");

    publish_event(publisher, &DomainEvent::sale_status_changed(&sale, previous_status)).await?;
    Ok(sale.into())
}

/// Cancels one item of an active sale and recomputes the sale total.
pub async fn cancel_sale_item<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    publisher: &dyn EventPublisher,
    cmd: CancelSaleItem,
) -> AppResult<SaleResult> {
    debug!(sale_id = %cmd.sale_id, item_id = %cmd.item_id, "cancel_sale_item");
    validate(&cmd)?;

    let mut sale = load_sale(uow, &cmd.sale_id).await?;

    sale.cancel_item(&cmd.item_id, Utc::now())?;
    let sale = uow.sales().update(sale).await?;

    commit(uow).await?;

    info!(
        sale_id = %sale.id,
        item_id = %cmd.item_id,
        total = %sale.total_amount(),
        "Sale item cancelled"
    );

    publish_event(publisher, &DomainEvent::item_cancelled(&sale, &cmd.item_id)).await?;
    Ok(sale.into())
}

/// Removes the sale and its items.
pub async fn delete_sale<U: UnitOfWork + ?Sized>(uow: &mut U, cmd: EntityId) -> AppResult<()> {
    debug!(id = %cmd.id, "delete_sale");
    validate(&cmd)?;

    if !uow.sales().delete(&cmd.id).await? {
        return Err(AppError::not_found("Sale", &cmd.id));
    }

    commit(uow).await?;

    info!(id = %cmd.id, "Sale deleted");
    Ok(())
}

async fn load_sale<U: UnitOfWork + ?Sized>(uow: &mut U, id: &str) -> AppResult<Sale> {
    uow.sales()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Sale", id))
}
