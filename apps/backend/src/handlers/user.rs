//! User handlers.
//!
//! Emails are unique ignoring case. The plaintext password is hashed
//! before anything is stored and is never logged.

use chrono::Utc;
use sales_core::commands::{CreateUser, EntityId, ListQuery, UserFilter};
use sales_db::UnitOfWork;
use tracing::{debug, info};
use uuid::Uuid;

use super::{commit, validate};
use crate::error::{AppError, AppResult};
use crate::events::{publish_event, DomainEvent, EventPublisher};
use crate::hashing::PasswordHashing;
use crate::mapping::{user_from_command, PagedResult, UserResult};

pub async fn create_user<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    publisher: &dyn EventPublisher,
    hasher: &dyn PasswordHashing,
    cmd: CreateUser,
) -> AppResult<UserResult> {
    debug!(username = %cmd.username, role = ?cmd.role, "create_user");
    validate(&cmd)?;

    if uow.users().get_by_email(&cmd.email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "A user with email {} already exists",
            cmd.email.trim()
        )));
    }

    let password_hash = hasher.hash(&cmd.password)?;
    let user = user_from_command(&cmd, Uuid::new_v4().to_string(), password_hash, Utc::now());
    let user = uow.users().create(user).await?;

    commit(uow).await?;

    info!(id = %user.id, username = %user.username, role = ?user.role, "User registered");

    publish_event(publisher, &DomainEvent::user_registered(&user)).await?;
    Ok(user.into())
}

pub async fn get_user<U: UnitOfWork + ?Sized>(uow: &mut U, query: EntityId) -> AppResult<UserResult> {
    debug!(id = %query.id, "get_user");
    validate(&query)?;

    let user = uow
        .users()
        .get_by_id(&query.id)
        .await?
        .ok_or_else(|| AppError::not_found("User", &query.id))?;

    commit(uow).await?;
    Ok(user.into())
}

pub async fn delete_user<U: UnitOfWork + ?Sized>(uow: &mut U, cmd: EntityId) -> AppResult<()> {
    debug!(id = %cmd.id, "delete_user");
    validate(&cmd)?;

    if !uow.users().delete(&cmd.id).await? {
        return Err(AppError::not_found("User", &cmd.id));
    }

    commit(uow).await?;

    info!(id = %cmd.id, "User deleted");
    Ok(())
}

pub async fn list_users<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    query: ListQuery<UserFilter>,
) -> AppResult<PagedResult<UserResult>> {
    debug!(page = query.page.page, size = query.page.size, filter = ?query.filter, "list_users");
    validate(&query)?;

    let page = uow.users().get_paged(&query.page, &query.filter).await?;

    commit(uow).await?;
    Ok(page.into())
}
