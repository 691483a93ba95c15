//! Product handlers.
//!
//! Price changes only affect future sales; existing sale items keep the
//! price they were sold at.

use chrono::Utc;
use sales_core::commands::{CreateProduct, EntityId, ListFilter, ListQuery, UpdateProduct};
use sales_db::UnitOfWork;
use tracing::{debug, info};
use uuid::Uuid;

use super::{commit, validate};
use crate::error::{AppError, AppResult};
use crate::mapping::{apply_product_update, product_from_command, PagedResult, ProductResult};

pub async fn create_product<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    cmd: CreateProduct,
) -> AppResult<ProductResult> {
    debug!(name = %cmd.name, price_cents = cmd.price_cents, "create_product");
    validate(&cmd)?;

    let product = product_from_command(cmd, Uuid::new_v4().to_string(), Utc::now());
    let product = uow.products().create(product).await?;

    commit(uow).await?;

    info!(id = %product.id, price = %product.price(), "Product created");
    Ok(product.into())
}

pub async fn get_product<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    query: EntityId,
) -> AppResult<ProductResult> {
    debug!(id = %query.id, "get_product");
    validate(&query)?;

    let product = uow
        .products()
        .get_by_id(&query.id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", &query.id))?;

    commit(uow).await?;
    Ok(product.into())
}

/// Loads the stored product, applies the command and writes it back.
pub async fn update_product<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    cmd: UpdateProduct,
) -> AppResult<ProductResult> {
    debug!(id = %cmd.id, price_cents = cmd.price_cents, "update_product");
    validate(&cmd)?;

    let mut product = uow
        .products()
        .get_by_id(&cmd.id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", &cmd.id))?;

    let previous_price = product.price();
    apply_product_update(&mut product, cmd, Utc::now());
    let product = uow.products().update(product).await?;

    commit(uow).await?;

    info!(
        id = %product.id,
        previous_price = %previous_price,
        price = %product.price(),
        "Product updated"
    );
    Ok(product.into())
}

/// Products referenced by a sale item cannot be deleted (`Conflict`).
pub async fn delete_product<U: UnitOfWork + ?Sized>(uow: &mut U, cmd: EntityId) -> AppResult<()> {
    debug!(id = %cmd.id, "delete_product");
    validate(&cmd)?;

    if !uow.products().delete(&cmd.id).await? {
        return Err(AppError::not_found("Product", &cmd.id));
    }

    commit(uow).await?;

    info!(id = %cmd.id, "Product deleted");
    Ok(())
}

pub async fn list_products<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    query: ListQuery<ListFilter>,
) -> AppResult<PagedResult<ProductResult>> {
    debug!(
        page = query.page.page,
        size = query.page.size,
        name_contains = ?query.filter.name_contains,
        "list_products"
    );
    validate(&query)?;

    let page = uow.products().get_paged(&query.page, &query.filter).await?;
    debug!(total = page.total_count, "Products listed");

    commit(uow).await?;
    Ok(page.into())
}
