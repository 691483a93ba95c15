//! Customer handlers.

use chrono::Utc;
use sales_core::commands::{CreateCustomer, EntityId, ListFilter, ListQuery, UpdateCustomer};
use sales_db::UnitOfWork;
use tracing::{debug, info};
use uuid::Uuid;

use super::{commit, validate};
use crate::error::{AppError, AppResult};
use crate::mapping::{apply_customer_update, customer_from_command, CustomerResult, PagedResult};

pub async fn create_customer<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    cmd: CreateCustomer,
) -> AppResult<CustomerResult> {
    debug!(name = %cmd.name, "create_customer");
    validate(&cmd)?;

    let customer = customer_from_command(cmd, Uuid::new_v4().to_string(), Utc::now());
    let customer = uow.customers().create(customer).await?;

    commit(uow).await?;

    info!(id = %customer.id, name = %customer.name, "Customer created");
    Ok(customer.into())
}

pub async fn get_customer<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    query: EntityId,
) -> AppResult<CustomerResult> {
    debug!(id = %query.id, "get_customer");
    validate(&query)?;

    let customer = uow
        .customers()
        .get_by_id(&query.id)
        .await?
        .ok_or_else(|| AppError::not_found("Customer", &query.id))?;

    commit(uow).await?;
    Ok(customer.into())
}

pub async fn update_customer<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    cmd: UpdateCustomer,
) -> AppResult<CustomerResult> {
    debug!(id = %cmd.id, "update_customer");
    validate(&cmd)?;

    let mut customer = uow
        .customers()
        .get_by_id(&cmd.id)
        .await?
        .ok_or_else(|| AppError::not_found("Customer", &cmd.id))?;

    apply_customer_update(&mut customer, cmd, Utc::now());
    let customer = uow.customers().update(customer).await?;

    commit(uow).await?;

    info!(id = %customer.id, "Customer updated");
    Ok(customer.into())
}

pub async fn delete_customer<U: UnitOfWork + ?Sized>(uow: &mut U, cmd: EntityId) -> AppResult<()> {
    debug!(id = %cmd.id, "delete_customer");
    validate(&cmd)?;

    if !uow.customers().delete(&cmd.id).await? {
        return Err(AppError::not_found("Customer", &cmd.id));
    }

    commit(uow).await?;

    info!(id = %cmd.id, "Customer deleted");
    Ok(())
}

pub async fn list_customers<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    query: ListQuery<ListFilter>,
) -> AppResult<PagedResult<CustomerResult>> {
    debug!(page = query.page.page, size = query.page.size, "list_customers");
    validate(&query)?;

    let page = uow.customers().get_paged(&query.page, &query.filter).await?;

    commit(uow).await?;
    Ok(page.into())
}
