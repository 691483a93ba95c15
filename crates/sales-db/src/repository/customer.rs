//! # Customer Repository
//!
//! Database operations for customers.

use async_trait::async_trait;
use sales_core::commands::ListFilter;
use sales_core::{Customer, Page, PageRequest};
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use super::{connection, push_list_filter};
use crate::error::{DbError, DbResult};
use crate::unit_of_work::SqliteTx;

const SELECT_CUSTOMER: &str =
    "SELECT id, name, email, phone, is_active, created_at, updated_at FROM customers";

#[async_trait]
pub trait CustomerRepository: Send {
    async fn create(&mut self, customer: Customer) -> DbResult<Customer>;

    async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Customer>>;

    async fn update(&mut self, customer: Customer) -> DbResult<Customer>;

    /// `false` when no customer has this id.
    async fn delete(&mut self, id: &str) -> DbResult<bool>;

    async fn get_paged(
        &mut self,
        page: &PageRequest,
        filter: &ListFilter,
    ) -> DbResult<Page<Customer>>;
}

/// SQLite customer repository bound to a unit of work.
pub struct SqliteCustomerRepository<'c> {
    tx: &'c mut Option<SqliteTx>,
}

impl<'c> SqliteCustomerRepository<'c> {
    pub fn new(tx: &'c mut Option<SqliteTx>) -> Self {
        SqliteCustomerRepository { tx }
    }
}

#[async_trait]
impl<'c> CustomerRepository for SqliteCustomerRepository<'c> {
    async fn create(&mut self, customer: Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");
        let conn = connection(self.tx)?;

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, phone, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(customer)
    }

    async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Customer>> {
        let conn = connection(self.tx)?;

        let customer =
            sqlx::query_as::<_, Customer>(&format!("{SELECT_CUSTOMER} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(customer)
    }

    async fn update(&mut self, customer: Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, "Updating customer");
        let conn = connection(self.tx)?;

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = ?2, email = ?3, phone = ?4, is_active = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.is_active)
        .bind(customer.updated_at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(customer)
    }

    async fn delete(&mut self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting customer");
        let conn = connection(self.tx)?;

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_paged(
        &mut self,
        page: &PageRequest,
        filter: &ListFilter,
    ) -> DbResult<Page<Customer>> {
        let conn = connection(self.tx)?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM customers");
        push_list_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_CUSTOMER);
        push_list_filter(&mut select, filter);
        select
            .push(" ORDER BY name, id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = select
            .build_query_as::<Customer>()
            .fetch_all(&mut *conn)
            .await?;

        debug!(count = items.len(), total, "Listed customers");
        Ok(Page::new(items, total, page))
    }
}
