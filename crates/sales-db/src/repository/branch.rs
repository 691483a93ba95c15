//! # Branch Repository
//!
//! Database operations for branches.

use async_trait::async_trait;
use sales_core::commands::ListFilter;
use sales_core::{Branch, Page, PageRequest};
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use super::{connection, push_list_filter};
use crate::error::{DbError, DbResult};
use crate::unit_of_work::SqliteTx;

const SELECT_BRANCH: &str = "SELECT id, name, is_active, created_at, updated_at FROM branches";

#[async_trait]
pub trait BranchRepository: Send {
    async fn create(&mut self, branch: Branch) -> DbResult<Branch>;

    async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Branch>>;

    async fn update(&mut self, branch: Branch) -> DbResult<Branch>;

    /// `false` when no branch has this id.
    async fn delete(&mut self, id: &str) -> DbResult<bool>;

    async fn get_paged(&mut self, page: &PageRequest, filter: &ListFilter)
        -> DbResult<Page<Branch>>;
}

/// SQLite branch repository bound to a unit of work.
pub struct SqliteBranchRepository<'c> {
    tx: &'c mut Option<SqliteTx>,
}

impl<'c> SqliteBranchRepository<'c> {
    pub fn new(tx: &'c mut Option<SqliteTx>) -> Self {
        SqliteBranchRepository { tx }
    }
}

#[async_trait]
impl<'c> BranchRepository for SqliteBranchRepository<'c> {
    async fn create(&mut self, branch: Branch) -> DbResult<Branch> {
        debug!(id = %branch.id, name = %branch.name, "Inserting branch");
        let conn = connection(self.tx)?;

        sqlx::query(
            r#"
            INSERT INTO branches (id, name, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&branch.id)
        .bind(&branch.name)
        .bind(branch.is_active)
        .bind(branch.created_at)
        .bind(branch.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(branch)
    }

    async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Branch>> {
        let conn = connection(self.tx)?;

        let branch = sqlx::query_as::<_, Branch>(&format!("{SELECT_BRANCH} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(branch)
    }

    async fn update(&mut self, branch: Branch) -> DbResult<Branch> {
        debug!(id = %branch.id, "Updating branch");
        let conn = connection(self.tx)?;

        let result = sqlx::query(
            r#"
            UPDATE branches
            SET name = ?2, is_active = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&branch.id)
        .bind(&branch.name)
        .bind(branch.is_active)
        .bind(branch.updated_at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Branch", &branch.id));
        }

        Ok(branch)
    }

    async fn delete(&mut self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting branch");
        let conn = connection(self.tx)?;

        let result = sqlx::query("DELETE FROM branches WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_paged(
        &mut self,
        page: &PageRequest,
        filter: &ListFilter,
    ) -> DbResult<Page<Branch>> {
        let conn = connection(self.tx)?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM branches");
        push_list_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_BRANCH);
        push_list_filter(&mut select, filter);
        select
            .push(" ORDER BY name, id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = select
            .build_query_as::<Branch>()
            .fetch_all(&mut *conn)
            .await?;

        debug!(count = items.len(), total, "Listed branches");
        Ok(Page::new(items, total, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::memory_db;
    use crate::unit_of_work::UnitOfWork;
    use chrono::Utc;
    use uuid::Uuid;

    fn branch(name: &str, is_active: bool) -> Branch {
        let now = Utc::now();
        Branch {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let db = memory_db().await;
        let mut uow = db.begin().await.unwrap();

        let created = uow.branches().create(branch("Centro", true)).await.unwrap();
        let loaded = uow.branches().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Centro");

        let mut renamed = loaded.clone();
        renamed.name = "Centro Histórico".to_string();
        uow.branches().update(renamed).await.unwrap();
        let loaded = uow.branches().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Centro Histórico");

        assert!(uow.branches().delete(&created.id).await.unwrap());
        assert!(!uow.branches().delete(&created.id).await.unwrap());
        assert!(uow.branches().get_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = memory_db().await;
        let mut uow = db.begin().await.unwrap();

        let err = uow.branches().update(branch("Ghost", true)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_paged_with_filter() {
        let db = memory_db().await;
        let mut uow = db.begin().await.unwrap();

        for name in ["North A", "North B", "North C", "South"] {
            uow.branches().create(branch(name, true)).await.unwrap();
        }
        uow.branches().create(branch("North Closed", false)).await.unwrap();

        let filter = ListFilter {
            name_contains: Some("north".to_string()),
            is_active: Some(true),
        };
        let page = uow
            .branches()
            .get_paged(&PageRequest::new(2, 2), &filter)
            .await
            .unwrap();

        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages(), 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "North C");
        assert!(!page.has_next());
        assert!(page.has_previous());
    }
}
