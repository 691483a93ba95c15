//! # User Repository
//!
//! Database operations for user accounts.
//!
//! Emails are unique without regard to case (`COLLATE NOCASE` on the
//! column), so `get_by_email` and the unique index agree on what a
//! duplicate is.

use async_trait::async_trait;
use sales_core::commands::UserFilter;
use sales_core::{Page, PageRequest, User};
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use super::connection;
use crate::error::DbResult;
use crate::unit_of_work::SqliteTx;

const SELECT_USER: &str = r#"
    SELECT id, username, email, phone, password_hash, role, status, created_at, updated_at
    FROM users"#;

#[async_trait]
pub trait UserRepository: Send {
    async fn create(&mut self, user: User) -> DbResult<User>;

    async fn get_by_id(&mut self, id: &str) -> DbResult<Option<User>>;

    /// Case-insensitive lookup.
    async fn get_by_email(&mut self, email: &str) -> DbResult<Option<User>>;

    /// `false` when no user has this id.
    async fn delete(&mut self, id: &str) -> DbResult<bool>;

    async fn get_paged(&mut self, page: &PageRequest, filter: &UserFilter)
        -> DbResult<Page<User>>;
}

/// SQLite user repository bound to a unit of work.
pub struct SqliteUserRepository<'c> {
    tx: &'c mut Option<SqliteTx>,
}

impl<'c> SqliteUserRepository<'c> {
    pub fn new(tx: &'c mut Option<SqliteTx>) -> Self {
        SqliteUserRepository { tx }
    }
}

#[async_trait]
impl<'c> UserRepository for SqliteUserRepository<'c> {
    async fn create(&mut self, user: User) -> DbResult<User> {
        // Never log the hash
        debug!(id = %user.id, username = %user.username, role = ?user.role, "Inserting user");
        let conn = connection(self.tx)?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, phone, password_hash, role, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.status)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(user)
    }

    async fn get_by_id(&mut self, id: &str) -> DbResult<Option<User>> {
        let conn = connection(self.tx)?;

        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(user)
    }

    async fn get_by_email(&mut self, email: &str) -> DbResult<Option<User>> {
        let conn = connection(self.tx)?;

        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE email = ?1"))
            .bind(email.trim())
            .fetch_optional(&mut *conn)
            .await?;

        Ok(user)
    }

    async fn delete(&mut self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting user");
        let conn = connection(self.tx)?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_paged(
        &mut self,
        page: &PageRequest,
        filter: &UserFilter,
    ) -> DbResult<Page<User>> {
        let conn = connection(self.tx)?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
        push_user_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_USER);
        push_user_filter(&mut select, filter);
        select
            .push(" ORDER BY username, id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = select
            .build_query_as::<User>()
            .fetch_all(&mut *conn)
            .await?;

        debug!(count = items.len(), total, "Listed users");
        Ok(Page::new(items, total, page))
    }
}

fn push_user_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &UserFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
}
