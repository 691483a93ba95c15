//! # Sale Repository
//!
//! Database operations for sales and their items.
//!
//! ## Aggregate Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Aggregate Storage                            │
//! │                                                                         │
//! │  create(sale)                                                          │
//! │     └── INSERT sales       (one row)                                   │
//! │     └── INSERT sale_items  (one row per item)                          │
//! │                                                                         │
//! │  get_by_id(id)                                                         │
//! │     └── SELECT sales       → Sale { items: [] }                        │
//! │     └── SELECT sale_items  → items ordered by created_at, id           │
//! │                                                                         │
//! │  update(sale)                                                          │
//! │     └── UPDATE sales       status, total, updated_at                   │
//! │     └── UPDATE sale_items  is_cancelled, total, updated_at             │
//! │                                                                         │
//! │  delete(id)                                                            │
//! │     └── DELETE sales       (items go with ON DELETE CASCADE)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items are immutable apart from cancellation, so `update` never inserts
//! or removes item rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sales_core::commands::SaleFilter;
use sales_core::{Page, PageRequest, Sale, SaleItem};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::debug;

use super::connection;
use crate::error::{DbError, DbResult};
use crate::unit_of_work::SqliteTx;

const SELECT_SALE: &str = r#"
    SELECT id, sale_number, sale_date, customer_id, branch_id,
           total_amount_cents, status, created_at, updated_at
    FROM sales"#;

const SELECT_ITEMS: &str = r#"
    SELECT id, sale_id, product_id, quantity, unit_price_cents, discount_bps,
           total_amount_cents, is_cancelled, created_at, updated_at
    FROM sale_items
    WHERE sale_id = ?1
    ORDER BY created_at, id"#;

#[async_trait]
pub trait SaleRepository: Send {
    /// Inserts the sale together with all of its items.
    async fn create(&mut self, sale: Sale) -> DbResult<Sale>;

    /// Loads the sale with its items.
    async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Sale>>;

    /// Persists status, total and item cancellations.
    async fn update(&mut self, sale: Sale) -> DbResult<Sale>;

    /// `false` when no sale has this id.
    async fn delete(&mut self, id: &str) -> DbResult<bool>;

    /// Newest sales first, each with its items.
    async fn get_paged(&mut self, page: &PageRequest, filter: &SaleFilter)
        -> DbResult<Page<Sale>>;
}

/// SQLite sale repository bound to a unit of work.
pub struct SqliteSaleRepository<'c> {
    tx: &'c mut Option<SqliteTx>,
}

impl<'c> SqliteSaleRepository<'c> {
    pub fn new(tx: &'c mut Option<SqliteTx>) -> Self {
        SqliteSaleRepository { tx }
    }
}

#[async_trait]
impl<'c> SaleRepository for SqliteSaleRepository<'c> {
    async fn create(&mut self, sale: Sale) -> DbResult<Sale> {
        debug!(
            id = %sale.id,
            sale_number = %sale.sale_number,
            items = sale.items.len(),
            "Inserting sale"
        );
        let conn = connection(self.tx)?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number, sale_date, customer_id, branch_id,
                total_amount_cents, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.sale_number)
        .bind(sale.sale_date)
        .bind(&sale.customer_id)
        .bind(&sale.branch_id)
        .bind(sale.total_amount_cents)
        .bind(sale.status)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *conn)
        .await?;

        for item in &sale.items {
            insert_item(conn, item).await?;
        }

        Ok(sale)
    }

    async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Sale>> {
        let conn = connection(self.tx)?;

        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match sale {
            Some(mut sale) => {
                sale.items = load_items(conn, &sale.id).await?;
                Ok(Some(sale))
            }
            None => Ok(None),
        }
    }

    async fn update(&mut self, sale: Sale) -> DbResult<Sale> {
        debug!(id = %sale.id, status = %sale.status, total = sale.total_amount_cents, "Updating sale");
        let conn = connection(self.tx)?;

        let result = sqlx::query(
            r#"
            UPDATE sales
            SET status = ?2, total_amount_cents = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&sale.id)
        .bind(sale.status)
        .bind(sale.total_amount_cents)
        .bind(sale.updated_at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", &sale.id));
        }

        for item in &sale.items {
            sqlx::query(
                r#"
                UPDATE sale_items
                SET is_cancelled = ?3, total_amount_cents = ?4, updated_at = ?5
                WHERE id = ?1 AND sale_id = ?2
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(item.is_cancelled)
            .bind(item.total_amount_cents)
            .bind(item.updated_at)
            .execute(&mut *conn)
            .await?;
        }

        Ok(sale)
    }

    async fn delete(&mut self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting sale");
        let conn = connection(self.tx)?;

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_paged(
        &mut self,
        page: &PageRequest,
        filter: &SaleFilter,
    ) -> DbResult<Page<Sale>> {
        let conn = connection(self.tx)?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM sales");
        push_sale_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_SALE);
        push_sale_filter(&mut select, filter);
        select
            .push(" ORDER BY sale_date DESC, id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let mut sales = select
            .build_query_as::<Sale>()
            .fetch_all(&mut *conn)
            .await?;

        for sale in &mut sales {
            sale.items = load_items(conn, &sale.id).await?;
        }

        debug!(count = sales.len(), total, "Listed sales");
        Ok(Page::new(sales, total, page))
    }
}

async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, quantity, unit_price_cents, discount_bps,
            total_amount_cents, is_cancelled, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.discount_bps)
    .bind(item.total_amount_cents)
    .bind(item.is_cancelled)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn load_items(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(SELECT_ITEMS)
        .bind(sale_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(items)
}

fn push_sale_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &SaleFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(customer_id) = &filter.customer_id {
        qb.push(" AND customer_id = ").push_bind(customer_id.clone());
    }
    if let Some(branch_id) = &filter.branch_id {
        qb.push(" AND branch_id = ").push_bind(branch_id.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(from) = filter.from {
        qb.push(" AND sale_date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND sale_date <= ").push_bind(to);
    }
}

/// Generates a sale number in format: S-YYYYMMDD-XXXXXXXX
///
/// The suffix is the first eight hex digits of the sale id, so two sales
/// share a number only if their ids collide.
///
/// ## Example
/// `S-20240115-3F2A9C01`
pub fn generate_sale_number(sale_id: &str, sale_date: DateTime<Utc>) -> String {
    let date_part = sale_date.format("%Y%m%d");
    let suffix: String = sale_id
        .chars()
        .filter(char::is_ascii_hexdigit)
        .take(8)
        .collect::<String>()
        .to_ascii_uppercase();

    format!("S-{}-{}", date_part, suffix)
}
