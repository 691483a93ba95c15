//! # Product Repository
//!
//! Database operations for products.
//!
//! Sale items keep a snapshot of the unit price, so updating a product's
//! price never changes existing sales.

use async_trait::async_trait;
use sales_core::commands::ListFilter;
use sales_core::{Page, PageRequest, Product};
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use super::{connection, push_list_filter};
use crate::error::{DbError, DbResult};
use crate::unit_of_work::SqliteTx;

const SELECT_PRODUCT: &str =
    "SELECT id, name, description, price_cents, is_active, created_at, updated_at FROM products";

#[async_trait]
pub trait ProductRepository: Send {
    async fn create(&mut self, product: Product) -> DbResult<Product>;

    async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Product>>;

    async fn update(&mut self, product: Product) -> DbResult<Product>;

    /// `false` when no product has this id.
    async fn delete(&mut self, id: &str) -> DbResult<bool>;

    async fn get_paged(
        &mut self,
        page: &PageRequest,
        filter: &ListFilter,
    ) -> DbResult<Page<Product>>;

    /// Total number of products (used by the seed binary).
    async fn count(&mut self) -> DbResult<i64>;
}

/// SQLite product repository bound to a unit of work.
///
/// ## Usage
/// ```rust,ignore
/// let mut uow = db.begin().await?;
/// let product = uow.products().get_by_id("uuid-here").await?;
/// ```
pub struct SqliteProductRepository<'c> {
    tx: &'c mut Option<SqliteTx>,
}

impl<'c> SqliteProductRepository<'c> {
    pub fn new(tx: &'c mut Option<SqliteTx>) -> Self {
        SqliteProductRepository { tx }
    }
}

#[async_trait]
impl<'c> ProductRepository for SqliteProductRepository<'c> {
    async fn create(&mut self, product: Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");
        let conn = connection(self.tx)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(product)
    }

    async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Product>> {
        let conn = connection(self.tx)?;

        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(product)
    }

    async fn update(&mut self, product: Product) -> DbResult<Product> {
        debug!(id = %product.id, price_cents = product.price_cents, "Updating product");
        let conn = connection(self.tx)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?2, description = ?3, price_cents = ?4, is_active = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(product.updated_at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(product)
    }

    async fn delete(&mut self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting product");
        let conn = connection(self.tx)?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_paged(
        &mut self,
        page: &PageRequest,
        filter: &ListFilter,
    ) -> DbResult<Page<Product>> {
        let conn = connection(self.tx)?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        push_list_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_PRODUCT);
        push_list_filter(&mut select, filter);
        select
            .push(" ORDER BY name, id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = select
            .build_query_as::<Product>()
            .fetch_all(&mut *conn)
            .await?;

        debug!(count = items.len(), total, "Listed products");
        Ok(Page::new(items, total, page))
    }

    async fn count(&mut self) -> DbResult<i64> {
        let conn = connection(self.tx)?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}
