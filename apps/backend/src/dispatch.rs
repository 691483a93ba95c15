//! # Dispatcher
//!
//! Boundary composition: one request in, one response out, one unit of
//! work in between.
//!
//! ## Wire Format
//! ```text
//! request   {"op": "create_product", "payload": {"name": "Latte", "price_cents": 450}}
//! response  {"status": 201, "body": {"id": "…", "name": "Latte", …}}
//!
//! error     {"status": 400, "body": {"code": "VALIDATION_ERROR",
//!                                    "message": "Validation failed: …",
//!                                    "errors": {"price_cents": ["…"]}}}
//! ```
//!
//! ## Status Codes
//! - 200 success, 201 created
//! - 400 validation or malformed request
//! - 404 not found
//! - 409 conflict
//! - 500 transaction, database, publish or hashing failure
//!
//! Dropping the future returned by [`Backend::dispatch`] drops its unit of
//! work, which rolls back anything not yet committed.

use std::sync::Arc;

use sales_core::commands::{
    CancelSaleItem, CreateBranch, CreateCustomer, CreateProduct, CreateSale, CreateUser, EntityId,
    ListFilter, ListQuery, SaleFilter, UpdateBranch, UpdateCustomer, UpdateProduct,
    UpdateSaleStatus, UserFilter,
};
use sales_db::{Database, SqliteUnitOfWork};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::events::EventPublisher;
use crate::handlers;
use crate::hashing::PasswordHashing;

/// Every operation the backend accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "payload", rename_all = "snake_case")]
pub enum Request {
    CreateBranch(CreateBranch),
    GetBranch(EntityId),
    UpdateBranch(UpdateBranch),
    DeleteBranch(EntityId),
    ListBranches(ListQuery<ListFilter>),

    CreateCustomer(CreateCustomer),
    GetCustomer(EntityId),
    UpdateCustomer(UpdateCustomer),
    DeleteCustomer(EntityId),
    ListCustomers(ListQuery<ListFilter>),

    CreateProduct(CreateProduct),
    GetProduct(EntityId),
    UpdateProduct(UpdateProduct),
    DeleteProduct(EntityId),
    ListProducts(ListQuery<ListFilter>),

    CreateSale(CreateSale),
    GetSale(EntityId),
    ListSales(ListQuery<SaleFilter>),
    UpdateSaleStatus(UpdateSaleStatus),
    CancelSaleItem(CancelSaleItem),
    DeleteSale(EntityId),

    CreateUser(CreateUser),
    GetUser(EntityId),
    DeleteUser(EntityId),
    ListUsers(ListQuery<UserFilter>),
}

/// HTTP-style outcome of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn ok(value: impl Serialize) -> Self {
        Self::with_status(200, value)
    }

    pub fn created(value: impl Serialize) -> Self {
        Self::with_status(201, value)
    }

    fn deleted(id: &str) -> Self {
        Response {
            status: 200,
            body: json!({ "id": id, "deleted": true }),
        }
    }

    fn with_status(status: u16, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Response { status, body },
            Err(e) => {
                warn!(error = %e, "Failed to serialize response body");
                Response {
                    status: 500,
                    body: json!({ "code": ErrorCode::Internal, "message": "Internal error" }),
                }
            }
        }
    }

    /// Error envelope. Validation failures list every field.
    pub fn from_error(err: &AppError) -> Self {
        let mut body = json!({
            "code": err.error_code(),
            "message": err.public_message(),
        });
        if let AppError::Validation(errors) = err {
            body["errors"] = json!(errors.field_map());
        }

        Response {
            status: err.status_code(),
            body,
        }
    }

    pub fn malformed(reason: impl std::fmt::Display) -> Self {
        Response {
            status: 400,
            body: json!({
                "code": ErrorCode::MalformedRequest,
                "message": format!("Malformed request: {}", reason),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The composed backend: storage, event sink and password hasher.
#[derive(Clone)]
pub struct Backend {
    db: Database,
    publisher: Arc<dyn EventPublisher>,
    hasher: Arc<dyn PasswordHashing>,
}

impl Backend {
    pub fn new(
        db: Database,
        publisher: Arc<dyn EventPublisher>,
        hasher: Arc<dyn PasswordHashing>,
    ) -> Self {
        Backend {
            db,
            publisher,
            hasher,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Parses one JSON line and dispatches it.
    pub async fn dispatch_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                debug!(error = %e, "Rejected malformed request");
                Response::malformed(e)
            }
        }
    }

    /// Runs one request inside its own unit of work.
    pub async fn dispatch(&self, request: Request) -> Response {
        let mut uow = match self.db.begin().await {
            Ok(uow) => uow,
            Err(e) => return Response::from_error(&AppError::from(e)),
        };

        match self.route(&mut uow, request).await {
            Ok(response) => response,
            Err(err) => {
                debug!(status = err.status_code(), error = %err, "Request failed");
                Response::from_error(&err)
            }
        }
    }

    async fn route(&self, uow: &mut SqliteUnitOfWork, request: Request) -> AppResult<Response> {
        let publisher = self.publisher.as_ref();
        let hasher = self.hasher.as_ref();

        let response = match request {
            Request::CreateBranch(cmd) => Response::created(handlers::create_branch(uow, cmd).await?),
            Request::GetBranch(q) => Response::ok(handlers::get_branch(uow, q).await?),
            Request::UpdateBranch(cmd) => Response::ok(handlers::update_branch(uow, cmd).await?),
            Request::DeleteBranch(cmd) => {
                handlers::delete_branch(uow, cmd.clone()).await?;
                Response::deleted(&cmd.id)
            }
            Request::ListBranches(q) => Response::ok(handlers::list_branches(uow, q).await?),

            Request::CreateCustomer(cmd) => {
                Response::created(handlers::create_customer(uow, cmd).await?)
            }
            Request::GetCustomer(q) => Response::ok(handlers::get_customer(uow, q).await?),
            Request::UpdateCustomer(cmd) => {
                Response::ok(handlers::update_customer(uow, cmd).await?)
            }
            Request::DeleteCustomer(cmd) => {
                handlers::delete_customer(uow, cmd.clone()).await?;
                Response::deleted(&cmd.id)
            }
            Request::ListCustomers(q) => Response::ok(handlers::list_customers(uow, q).await?),

            Request::CreateProduct(cmd) => {
                Response::created(handlers::create_product(uow, cmd).await?)
            }
            Request::GetProduct(q) => Response::ok(handlers::get_product(uow, q).await?),
            Request::UpdateProduct(cmd) => Response::ok(handlers::update_product(uow, cmd).await?),
            Request::DeleteProduct(cmd) => {
                handlers::delete_product(uow, cmd.clone()).await?;
                Response::deleted(&cmd.id)
            }
            Request::ListProducts(q) => Response::ok(handlers::list_products(uow, q).await?),

            Request::CreateSale(cmd) => {
                Response::created(handlers::create_sale(uow, publisher, cmd).await?)
            }
            Request::GetSale(q) => Response::ok(handlers::get_sale(uow, q).await?),
            Request::ListSales(q) => Response::ok(handlers::list_sales(uow, q).await?),
            Request::UpdateSaleStatus(cmd) => {
                Response::ok(handlers::update_sale_status(uow, publisher, cmd).await?)
            }
            Request::CancelSaleItem(cmd) => {
                Response::ok(handlers::cancel_sale_item(uow, publisher, cmd).await?)
            }
            Request::DeleteSale(cmd) => {
                handlers::delete_sale(uow, cmd.clone()).await?;
                Response::deleted(&cmd.id)
            }

            Request::CreateUser(cmd) => {
                Response::created(handlers::create_user(uow, publisher, hasher, cmd).await?)
            }
            Request::GetUser(q) => Response::ok(handlers::get_user(uow, q).await?),
            Request::DeleteUser(cmd) => {
                handlers::delete_user(uow, cmd.clone()).await?;
                Response::deleted(&cmd.id)
            }
            Request::ListUsers(q) => Response::ok(handlers::list_users(uow, q).await?),
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request: Request = serde_json::from_str(
            r#"{"op": "list_products", "payload": {"page": 2, "size": 5, "name_contains": "latte"}}"#,
        )
        .unwrap();

        match request {
            Request::ListProducts(q) => {
                assert_eq!(q.page.page, 2);
                assert_eq!(q.page.size, 5);
                assert_eq!(q.filter.name_contains.as_deref(), Some("latte"));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_list_defaults_when_paging_omitted() {
        let request: Request =
            serde_json::from_str(r#"{"op": "list_users", "payload": {}}"#).unwrap();

        match request {
            Request::ListUsers(q) => {
                assert_eq!(q.page.page, 1);
                assert_eq!(q.page.size, 10);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_error_envelope() {
        let response = Response::from_error(&AppError::not_found("Sale", "s1"));
        assert_eq!(response.status, 404);
        assert_eq!(response.body["code"], "NOT_FOUND");
        assert_eq!(response.body["message"], "Sale not found: s1");
        assert!(response.body.get("errors").is_none());
    }

    #[test]
    fn test_malformed() {
        let response = Response::malformed("expected value");
        assert_eq!(response.status, 400);
        assert_eq!(response.body["code"], "MALFORMED_REQUEST");
        assert!(!response.is_success());
    }
}
