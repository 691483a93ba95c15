//! Branch handlers.

use chrono::Utc;
use sales_core::commands::{CreateBranch, EntityId, ListFilter, ListQuery, UpdateBranch};
use sales_db::UnitOfWork;
use tracing::{debug, info};
use uuid::Uuid;

use super::{commit, validate};
use crate::error::{AppError, AppResult};
use crate::mapping::{apply_branch_update, branch_from_command, BranchResult, PagedResult};

pub async fn create_branch<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    cmd: CreateBranch,
) -> AppResult<BranchResult> {
    debug!(name = %cmd.name, "create_branch");
    validate(&cmd)?;

    let branch = branch_from_command(cmd, Uuid::new_v4().to_string(), Utc::now());
    let branch = uow.branches().create(branch).await?;

    commit(uow).await?;

    info!(id = %branch.id, name = %branch.name, "Branch created");
    Ok(branch.into())
}

pub async fn get_branch<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    query: EntityId,
) -> AppResult<BranchResult> {
    debug!(id = %query.id, "get_branch");
    validate(&query)?;

    let branch = uow
        .branches()
        .get_by_id(&query.id)
        .await?
        .ok_or_else(|| AppError::not_found("Branch", &query.id))?;

    commit(uow).await?;
    Ok(branch.into())
}

pub async fn update_branch<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    cmd: UpdateBranch,
) -> AppResult<BranchResult> {
    debug!(id = %cmd.id, "update_branch");
    validate(&cmd)?;

    let mut branch = uow
        .branches()
        .get_by_id(&cmd.id)
        .await?
        .ok_or_else(|| AppError::not_found("Branch", &cmd.id))?;

    apply_branch_update(&mut branch, cmd, Utc::now());
    let branch = uow.branches().update(branch).await?;

    commit(uow).await?;

    info!(id = %branch.id, "Branch updated");
    Ok(branch.into())
}

pub async fn delete_branch<U: UnitOfWork + ?Sized>(uow: &mut U, cmd: EntityId) -> AppResult<()> {
    debug!(id = %cmd.id, "delete_branch");
    validate(&cmd)?;

    if !uow.branches().delete(&cmd.id).await? {
        return Err(AppError::not_found("Branch", &cmd.id));
    }

    commit(uow).await?;

    info!(id = %cmd.id, "Branch deleted");
    Ok(())
}

pub async fn list_branches<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    query: ListQuery<ListFilter>,
) -> AppResult<PagedResult<BranchResult>> {
    debug!(page = query.page.page, size = query.page.size, "list_branches");
    validate(&query)?;

    let page = uow.branches().get_paged(&query.page, &query.filter).await?;

    commit(uow).await?;
    Ok(page.into())
}
