//! Handler tests against an in-memory database.
//!
//! Every step runs in its own unit of work, scoped to a block so the single
//! in-memory connection is released before the next one begins.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sales_backend::handlers;
use sales_backend::{
    AppError, Argon2Hasher, Backend, DomainEvent, ErrorCode, EventPublisher, PasswordHashing,
    PublishError, Response,
};
use sales_core::commands::{
    CancelSaleItem, CreateBranch, CreateCustomer, CreateProduct, CreateSale, CreateSaleItem,
    CreateUser, EntityId, ListFilter, ListQuery, SaleFilter, UpdateProduct, UpdateSaleStatus,
};
use sales_core::{PageRequest, SaleStatus, UserRole, UserStatus};
use sales_db::{
    BranchRepository, Commit, CustomerRepository, Database, DbConfig, DbError, ProductRepository,
    SaleRepository, SqliteUnitOfWork, UnitOfWork, UserRepository,
};
use uuid::Uuid;

// =============================================================================
// Test Doubles
// =============================================================================

#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<(String, DomainEvent)>>,
}

impl RecordingPublisher {
    fn topics(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    fn last(&self) -> Option<DomainEvent> {
        self.events.lock().unwrap().last().map(|(_, e)| e.clone())
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, event: &DomainEvent) -> Result<(), PublishError> {
        self.events
            .lock()
            .unwrap()
            .push((topic.to_string(), event.clone()));
        Ok(())
    }
}

/// Rejects every event, as an unreachable broker would.
struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, topic: &str, _event: &DomainEvent) -> Result<(), PublishError> {
        Err(PublishError::Delivery {
            topic: topic.to_string(),
            reason: "broker unavailable".to_string(),
        })
    }
}

/// Delegates to a real unit of work but refuses to commit.
struct FailingCommitUow {
    inner: SqliteUnitOfWork,
}

#[async_trait]
impl UnitOfWork for FailingCommitUow {
    fn branches(&mut self) -> Box<dyn BranchRepository + '_> {
        self.inner.branches()
    }

    fn customers(&mut self) -> Box<dyn CustomerRepository + '_> {
        self.inner.customers()
    }

    fn products(&mut self) -> Box<dyn ProductRepository + '_> {
        self.inner.products()
    }

    fn sales(&mut self) -> Box<dyn SaleRepository + '_> {
        self.inner.sales()
    }

    fn users(&mut self) -> Box<dyn UserRepository + '_> {
        self.inner.users()
    }

    async fn commit(&mut self) -> Commit {
        Commit::Failed(DbError::TransactionFailed("disk full".to_string()))
    }
}

// =============================================================================
// Fixtures
// =============================================================================

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn product_cmd(name: &str, price_cents: i64) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        description: None,
        price_cents,
        is_active: true,
    }
}

fn user_cmd(email: &str) -> CreateUser {
    CreateUser {
        username: "ana.souza".to_string(),
        email: email.to_string(),
        phone: "+55 11 99999-0000".to_string(),
        password: "S3cure!pass".to_string(),
        role: UserRole::Manager,
        status: UserStatus::Active,
    }
}

struct Catalog {
    customer_id: String,
    branch_id: String,
    latte_id: String,
    bagel_id: String,
}

async fn seed_catalog(db: &Database) -> Catalog {
    let mut uow = db.begin().await.unwrap();

    let customer = handlers::create_customer(
        &mut uow,
        CreateCustomer {
            name: "Maria Lima".to_string(),
            email: Some("maria@example.com".to_string()),
            phone: None,
            is_active: true,
        },
    )
    .await
    .unwrap();

    let mut uow = db.begin().await.unwrap();
    let branch = handlers::create_branch(
        &mut uow,
        CreateBranch {
            name: "Centro".to_string(),
            is_active: true,
        },
    )
    .await
    .unwrap();

    let mut uow = db.begin().await.unwrap();
    let latte = handlers::create_product(&mut uow, product_cmd("Latte", 1000))
        .await
        .unwrap();

    let mut uow = db.begin().await.unwrap();
    let bagel = handlers::create_product(&mut uow, product_cmd("Bagel", 500))
        .await
        .unwrap();

    Catalog {
        customer_id: customer.id,
        branch_id: branch.id,
        latte_id: latte.id,
        bagel_id: bagel.id,
    }
}

fn sale_cmd(catalog: &Catalog) -> CreateSale {
    CreateSale {
        customer_id: catalog.customer_id.clone(),
        branch_id: catalog.branch_id.clone(),
        sale_date: None,
        items: vec![
            // 3 × 10.00 at 10% off = 27.00
            CreateSaleItem {
                product_id: catalog.latte_id.clone(),
                quantity: 3,
                discount_bps: 1000,
            },
            // 2 × 5.00 = 10.00
            CreateSaleItem {
                product_id: catalog.bagel_id.clone(),
                quantity: 2,
                discount_bps: 0,
            },
        ],
    }
}

fn id(value: &str) -> EntityId {
    EntityId {
        id: value.to_string(),
    }
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_create_product_reports_every_invalid_field() {
    let db = test_db().await;
    let mut uow = db.begin().await.unwrap();

    let err = handlers::create_product(&mut uow, product_cmd("A", 0))
        .await
        .unwrap_err();

    match err {
        AppError::Validation(errors) => {
            let fields = errors.field_map();
            assert!(fields.contains_key("name"));
            assert!(fields.contains_key("price_cents"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_product_persists() {
    let db = test_db().await;

    let created = {
        let mut uow = db.begin().await.unwrap();
        handlers::create_product(&mut uow, product_cmd("Latte", 450))
            .await
            .unwrap()
    };

    {
        let mut uow = db.begin().await.unwrap();
        let updated = handlers::update_product(
            &mut uow,
            UpdateProduct {
                id: created.id.clone(),
                name: "Oat Latte".to_string(),
                description: Some("with oat milk".to_string()),
                price_cents: 525,
                is_active: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, "$5.25");
    }

    let mut uow = db.begin().await.unwrap();
    let fetched = handlers::get_product(&mut uow, id(&created.id))
        .await
        .unwrap();
    assert_eq!(fetched.name, "Oat Latte");
    assert_eq!(fetched.price_cents, 525);
    assert_eq!(fetched.description.as_deref(), Some("with oat milk"));
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let db = test_db().await;
    let missing = Uuid::new_v4().to_string();

    {
        let mut uow = db.begin().await.unwrap();
        let err = handlers::get_product(&mut uow, id(&missing))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { ref entity, .. } if entity == "Product"));
    }

    let mut uow = db.begin().await.unwrap();
    let err = handlers::delete_product(&mut uow, id(&missing))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_list_products_paging() {
    let db = test_db().await;

    for i in 0..5 {
        let mut uow = db.begin().await.unwrap();
        handlers::create_product(&mut uow, product_cmd(&format!("Item {i}"), 100 + i))
            .await
            .unwrap();
    }

    let mut uow = db.begin().await.unwrap();
    let page = handlers::list_products(
        &mut uow,
        ListQuery {
            page: PageRequest::new(2, 2),
            filter: ListFilter::default(),
        },
    )
    .await
    .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_count, 5);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next);
    assert!(page.has_previous);
    assert_eq!(page.items[0].name, "Item 2");
}

#[tokio::test]
async fn test_list_products_rejects_page_past_offset_range() {
    let db = test_db().await;

    {
        let mut uow = db.begin().await.unwrap();
        let err = handlers::list_products(
            &mut uow,
            ListQuery {
                page: PageRequest::new(i64::MAX, 100),
                filter: ListFilter::default(),
            },
        )
        .await
        .unwrap_err();

        match err {
            AppError::Validation(errors) => {
                assert!(errors.has_field("page"));
                assert!(!errors.has_field("size"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    let mut uow = db.begin().await.unwrap();
    let page = handlers::list_products(
        &mut uow,
        ListQuery {
            page: PageRequest::new(i64::MAX, 1),
            filter: ListFilter::default(),
        },
    )
    .await
    .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn test_blank_customer_contact_is_stored_as_absent() {
    let db = test_db().await;

    let created = {
        let mut uow = db.begin().await.unwrap();
        handlers::create_customer(
            &mut uow,
            CreateCustomer {
                name: "  Joana Reis ".to_string(),
                email: Some("  ".to_string()),
                phone: Some(String::new()),
                is_active: true,
            },
        )
        .await
        .unwrap()
    };
    assert_eq!(created.name, "Joana Reis");

    let mut uow = db.begin().await.unwrap();
    let fetched = handlers::get_customer(&mut uow, id(&created.id))
        .await
        .unwrap();
    assert_eq!(fetched.email, None);
    assert_eq!(fetched.phone, None);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_create_sale_totals_and_event() {
    let db = test_db().await;
    let catalog = seed_catalog(&db).await;
    let publisher = RecordingPublisher::default();

    let sale = {
        let mut uow = db.begin().await.unwrap();
        handlers::create_sale(&mut uow, &publisher, sale_cmd(&catalog))
            .await
            .unwrap()
    };

    assert_eq!(sale.total_amount_cents, 3700);
    assert_eq!(sale.total_amount, "$37.00");
    assert_eq!(sale.status, SaleStatus::Active);
    assert_eq!(sale.items.len(), 2);
    assert!(sale.sale_number.starts_with("S-"));

    assert_eq!(publisher.topics(), vec!["sale.created".to_string()]);
    match publisher.last() {
        Some(DomainEvent::SaleCreated {
            sale_id,
            total_amount_cents,
            item_count,
            ..
        }) => {
            assert_eq!(sale_id, sale.id);
            assert_eq!(total_amount_cents, 3700);
            assert_eq!(item_count, 2);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let mut uow = db.begin().await.unwrap();
    let fetched = handlers::get_sale(&mut uow, id(&sale.id)).await.unwrap();
    assert_eq!(fetched.total_amount_cents, 3700);
}

#[tokio::test]
async fn test_sale_keeps_price_snapshot() {
    let db = test_db().await;
    let catalog = seed_catalog(&db).await;
    let publisher = RecordingPublisher::default();

    let sale = {
        let mut uow = db.begin().await.unwrap();
        handlers::create_sale(&mut uow, &publisher, sale_cmd(&catalog))
            .await
            .unwrap()
    };

    {
        let mut uow = db.begin().await.unwrap();
        handlers::update_product(
            &mut uow,
            UpdateProduct {
                id: catalog.latte_id.clone(),
                name: "Latte".to_string(),
                description: None,
                price_cents: 9900,
                is_active: true,
            },
        )
        .await
        .unwrap();
    }

    let mut uow = db.begin().await.unwrap();
    let fetched = handlers::get_sale(&mut uow, id(&sale.id)).await.unwrap();
    let latte = fetched
        .items
        .iter()
        .find(|item| item.product_id == catalog.latte_id)
        .unwrap();
    assert_eq!(latte.unit_price_cents, 1000);
    assert_eq!(fetched.total_amount_cents, 3700);
}

#[tokio::test]
async fn test_create_sale_with_unknown_product_persists_nothing() {
    let db = test_db().await;
    let catalog = seed_catalog(&db).await;
    let publisher = RecordingPublisher::default();

    let mut cmd = sale_cmd(&catalog);
    cmd.items[1].product_id = Uuid::new_v4().to_string();

    {
        let mut uow = db.begin().await.unwrap();
        let err = handlers::create_sale(&mut uow, &publisher, cmd)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { ref entity, .. } if entity == "Product"));
    }

    assert!(publisher.topics().is_empty());

    let mut uow = db.begin().await.unwrap();
    let page = handlers::list_sales(&mut uow, ListQuery::<SaleFilter>::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn test_create_sale_with_inactive_product_conflicts() {
    let db = test_db().await;
    let catalog = seed_catalog(&db).await;
    let publisher = RecordingPublisher::default();

    {
        let mut uow = db.begin().await.unwrap();
        handlers::update_product(
            &mut uow,
            UpdateProduct {
                id: catalog.bagel_id.clone(),
                name: "Bagel".to_string(),
                description: None,
                price_cents: 500,
                is_active: false,
            },
        )
        .await
        .unwrap();
    }

    let mut uow = db.begin().await.unwrap();
    let err = handlers::create_sale(&mut uow, &publisher, sale_cmd(&catalog))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_cancel_item_recalculates_total() {
    let db = test_db().await;
    let catalog = seed_catalog(&db).await;
    let publisher = RecordingPublisher::default();

    let sale = {
        let mut uow = db.begin().await.unwrap();
        handlers::create_sale(&mut uow, &publisher, sale_cmd(&catalog))
            .await
            .unwrap()
    };
    let bagel_line = sale
        .items
        .iter()
        .find(|item| item.product_id == catalog.bagel_id)
        .unwrap()
        .id
        .clone();

    let cancel = CancelSaleItem {
        sale_id: sale.id.clone(),
        item_id: bagel_line,
    };

    {
        let mut uow = db.begin().await.unwrap();
        let updated = handlers::cancel_sale_item(&mut uow, &publisher, cancel.clone())
            .await
            .unwrap();
        assert_eq!(updated.total_amount_cents, 2700);
    }

    match publisher.last() {
        Some(DomainEvent::ItemCancelled {
            total_amount_cents, ..
        }) => assert_eq!(total_amount_cents, 2700),
        other => panic!("unexpected event: {other:?}"),
    }

    {
        let mut uow = db.begin().await.unwrap();
        let fetched = handlers::get_sale(&mut uow, id(&sale.id)).await.unwrap();
        assert_eq!(fetched.total_amount_cents, 2700);
        assert_eq!(fetched.items.iter().filter(|i| i.is_cancelled).count(), 1);
    }

    let mut uow = db.begin().await.unwrap();
    let err = handlers::cancel_sale_item(&mut uow, &publisher, cancel)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
    assert_eq!(publisher.topics().len(), 2);
}

#[tokio::test]
async fn test_cancel_item_on_completed_sale_conflicts() {
    let db = test_db().await;
    let catalog = seed_catalog(&db).await;
    let publisher = RecordingPublisher::default();

    let sale = {
        let mut uow = db.begin().await.unwrap();
        handlers::create_sale(&mut uow, &publisher, sale_cmd(&catalog))
            .await
            .unwrap()
    };

    {
        let mut uow = db.begin().await.unwrap();
        handlers::update_sale_status(
            &mut uow,
            &publisher,
            UpdateSaleStatus {
                id: sale.id.clone(),
                status: SaleStatus::Completed,
            },
        )
        .await
        .unwrap();
    }

    let mut uow = db.begin().await.unwrap();
    let err = handlers::cancel_sale_item(
        &mut uow,
        &publisher,
        CancelSaleItem {
            sale_id: sale.id.clone(),
            item_id: sale.items[0].id.clone(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert!(err.to_string().contains("completed"));
    assert!(!err.to_string().contains("move to"));
    assert_eq!(publisher.topics().len(), 2);
}

#[tokio::test]
async fn test_status_transitions() {
    let db = test_db().await;
    let catalog = seed_catalog(&db).await;
    let publisher = RecordingPublisher::default();

    let sale = {
        let mut uow = db.begin().await.unwrap();
        handlers::create_sale(&mut uow, &publisher, sale_cmd(&catalog))
            .await
            .unwrap()
    };

    let to = |status| UpdateSaleStatus {
        id: sale.id.clone(),
        status,
    };

    {
        let mut uow = db.begin().await.unwrap();
        let updated = handlers::update_sale_status(&mut uow, &publisher, to(SaleStatus::Completed))
            .await
            .unwrap();
        assert_eq!(updated.status, SaleStatus::Completed);
    }
    assert!(matches!(
        publisher.last(),
        Some(DomainEvent::SaleModified {
            previous_status: SaleStatus::Active,
            status: SaleStatus::Completed,
            ..
        })
    ));

    {
        let mut uow = db.begin().await.unwrap();
        let err = handlers::update_sale_status(&mut uow, &publisher, to(SaleStatus::Active))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    {
        let mut uow = db.begin().await.unwrap();
        handlers::update_sale_status(&mut uow, &publisher, to(SaleStatus::Cancelled))
            .await
            .unwrap();
    }
    assert!(matches!(
        publisher.last(),
        Some(DomainEvent::SaleCancelled { .. })
    ));

    let mut uow = db.begin().await.unwrap();
    let err = handlers::update_sale_status(&mut uow, &publisher, to(SaleStatus::Completed))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_delete_sale() {
    let db = test_db().await;
    let catalog = seed_catalog(&db).await;
    let publisher = RecordingPublisher::default();

    let sale = {
        let mut uow = db.begin().await.unwrap();
        handlers::create_sale(&mut uow, &publisher, sale_cmd(&catalog))
            .await
            .unwrap()
    };

    {
        let mut uow = db.begin().await.unwrap();
        handlers::delete_sale(&mut uow, id(&sale.id)).await.unwrap();
    }

    let mut uow = db.begin().await.unwrap();
    let err = handlers::get_sale(&mut uow, id(&sale.id))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

// =============================================================================
// Commit Failures
// =============================================================================

#[tokio::test]
async fn test_failed_commit_keeps_cause_and_skips_event() {
    let db = test_db().await;
    let catalog = seed_catalog(&db).await;
    let publisher = RecordingPublisher::default();

    {
        let mut uow = FailingCommitUow {
            inner: db.begin().await.unwrap(),
        };
        let err = handlers::create_sale(&mut uow, &publisher, sale_cmd(&catalog))
            .await
            .unwrap_err();

        match err {
            AppError::Transaction { source } => {
                assert!(matches!(source, DbError::TransactionFailed(ref m) if m == "disk full"));
            }
            other => panic!("expected transaction error, got {other:?}"),
        }
    }

    assert!(publisher.topics().is_empty());

    let mut uow = db.begin().await.unwrap();
    let page = handlers::list_sales(&mut uow, ListQuery::<SaleFilter>::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 0);
}

// =============================================================================
// Publish Failures
// =============================================================================

#[tokio::test]
async fn test_publish_failure_after_commit_keeps_sale() {
    let db = test_db().await;
    let catalog = seed_catalog(&db).await;

    {
        let mut uow = db.begin().await.unwrap();
        let err = handlers::create_sale(&mut uow, &FailingPublisher, sale_cmd(&catalog))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Publish(PublishError::Delivery { ref topic, .. }) if topic == "sale.created"
        ));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), ErrorCode::PublishFailed);

        let response = Response::from_error(&err);
        assert_eq!(response.status, 500);
        assert_eq!(response.body["code"], "PUBLISH_FAILED");
    }

    let mut uow = db.begin().await.unwrap();
    let page = handlers::list_sales(&mut uow, ListQuery::<SaleFilter>::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].total_amount_cents, 3700);
}

#[tokio::test]
async fn test_publish_failure_after_commit_keeps_user() {
    let db = test_db().await;
    let backend = Backend::new(db, Arc::new(FailingPublisher), Arc::new(Argon2Hasher));

    let created = backend
        .dispatch_line(
            r#"{"op": "create_user", "payload": {"username": "bruno", "email": "bruno@shop.com",
                "phone": "+55 21 98888-1111", "password": "An0ther!pass", "role": "customer"}}"#,
        )
        .await;
    assert_eq!(created.status, 500);
    assert_eq!(created.body["code"], "PUBLISH_FAILED");

    let listed = backend
        .dispatch_line(r#"{"op": "list_users", "payload": {}}"#)
        .await;
    assert_eq!(listed.status, 200);
    assert_eq!(listed.body["total_count"], 1);
    assert_eq!(listed.body["items"][0]["email"], "bruno@shop.com");
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_create_user_hashes_and_rejects_duplicate_email() {
    let db = test_db().await;
    let publisher = RecordingPublisher::default();
    let hasher = Argon2Hasher;

    let user = {
        let mut uow = db.begin().await.unwrap();
        handlers::create_user(&mut uow, &publisher, &hasher, user_cmd("Ana@Shop.com"))
            .await
            .unwrap()
    };
    assert_eq!(user.email, "ana@shop.com");
    assert_eq!(publisher.topics(), vec!["user.registered".to_string()]);

    {
        let mut uow = db.begin().await.unwrap();
        let stored = uow.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "S3cure!pass");
        assert!(hasher.verify("S3cure!pass", &stored.password_hash));
        uow.commit().await.into_result().unwrap();
    }

    let mut uow = db.begin().await.unwrap();
    let err = handlers::create_user(&mut uow, &publisher, &hasher, user_cmd("ANA@shop.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(publisher.topics().len(), 1);
}

// =============================================================================
// Dispatcher
// =============================================================================

#[tokio::test]
async fn test_dispatch_round_trip() {
    let db = test_db().await;
    let backend = Backend::new(
        db,
        Arc::new(RecordingPublisher::default()),
        Arc::new(Argon2Hasher),
    );

    let created = backend
        .dispatch_line(r#"{"op": "create_branch", "payload": {"name": "Centro"}}"#)
        .await;
    assert_eq!(created.status, 201);
    let branch_id = created.body["id"].as_str().unwrap().to_string();

    let fetched = backend
        .dispatch_line(&format!(
            r#"{{"op": "get_branch", "payload": {{"id": "{branch_id}"}}}}"#
        ))
        .await;
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body["name"], "Centro");

    let invalid = backend
        .dispatch_line(r#"{"op": "create_product", "payload": {"name": "", "price_cents": -1}}"#)
        .await;
    assert_eq!(invalid.status, 400);
    assert_eq!(invalid.body["code"], "VALIDATION_ERROR");
    assert!(invalid.body["errors"].get("name").is_some());
    assert!(invalid.body["errors"].get("price_cents").is_some());

    let listed = backend
        .dispatch_line(r#"{"op": "list_branches", "payload": {"page": 1, "size": 10}}"#)
        .await;
    assert_eq!(listed.status, 200);
    assert_eq!(listed.body["total_count"], 1);
    assert_eq!(listed.body["total_pages"], 1);

    let deleted = backend
        .dispatch_line(&format!(
            r#"{{"op": "delete_branch", "payload": {{"id": "{branch_id}"}}}}"#
        ))
        .await;
    assert_eq!(deleted.status, 200);
    assert_eq!(deleted.body["deleted"], true);

    let garbage = backend.dispatch_line("{not json").await;
    assert_eq!(garbage.status, 400);
    assert_eq!(garbage.body["code"], "MALFORMED_REQUEST");

    let bad_page = backend
        .dispatch_line(r#"{"op": "list_users", "payload": {"page": 0, "size": 10}}"#)
        .await;
    assert_eq!(bad_page.status, 400);
}
