//! # Commands
//!
//! Inbound operations as plain data, each with its validation rules.
//!
//! ```text
//!   JSON payload ──serde──► Command ──validate()──► handler
//!                                        │
//!                                        └── Err(ValidationErrors)
//!                                            every failed field, not just the first
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationErrors};
use crate::paging::PageRequest;
use crate::types::{SaleStatus, UserRole, UserStatus};
use crate::validation::{
    validate_discount_bps, validate_email, validate_item_count, validate_name,
    validate_optional_text, validate_password, validate_phone, validate_price_cents,
    validate_quantity, validate_username, validate_uuid, Validate, Validator,
};
use crate::MAX_NAME_LENGTH;

const MAX_DESCRIPTION_LENGTH: usize = 500;

fn default_true() -> bool {
    true
}

// =============================================================================
// Shared
// =============================================================================

/// Addresses a single entity (get, delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityId {
    pub id: String,
}

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        EntityId { id: id.into() }
    }
}

impl Validate for EntityId {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_uuid("id", &self.id));
        v.finish()
    }
}

/// A paged list request with an entity-specific filter.
///
/// Both parts are flattened, so the wire form is a single object:
/// `{"page": 2, "size": 20, "name_contains": "north"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery<F> {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(flatten)]
    pub filter: F,
}

impl<F: Validate> Validate for ListQuery<F> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.merge(self.page.validate()).merge(self.filter.validate());
        v.finish()
    }
}

/// Filter for branches, customers and products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    /// Case-insensitive substring of the name.
    #[serde(default)]
    pub name_contains: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for ListFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_optional_text(
            "name_contains",
            self.name_contains.as_deref(),
            MAX_NAME_LENGTH,
        ));
        v.finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

impl Validate for UserFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Filter for sales. The date range is inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleFilter {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub status: Option<SaleStatus>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl Validate for SaleFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(id) = &self.customer_id {
            v.check(validate_uuid("customer_id", id));
        }
        if let Some(id) = &self.branch_id {
            v.check(validate_uuid("branch_id", id));
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                v.check(Err(ValidationError::InvalidFormat {
                    field: "from".to_string(),
                    reason: "must not be after 'to'".to_string(),
                }));
            }
        }
        v.finish()
    }
}

// =============================================================================
// Branch
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBranch {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for CreateBranch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_name("name", &self.name));
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBranch {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for UpdateBranch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_uuid("id", &self.id))
            .check(validate_name("name", &self.name));
        v.finish()
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Blank contact fields count as absent, matching how they are stored.
fn check_contact(v: &mut Validator, email: Option<&str>, phone: Option<&str>) {
    fn present(value: Option<&str>) -> Option<&str> {
        value.filter(|s| !s.trim().is_empty())
    }

    if let Some(email) = present(email) {
        v.check(validate_email("email", email));
    }
    if let Some(phone) = present(phone) {
        v.check(validate_phone("phone", phone));
    }
}

impl Validate for CreateCustomer {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_name("name", &self.name));
        check_contact(&mut v, self.email.as_deref(), self.phone.as_deref());
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCustomer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for UpdateCustomer {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_uuid("id", &self.id))
            .check(validate_name("name", &self.name));
        check_contact(&mut v, self.email.as_deref(), self.phone.as_deref());
        v.finish()
    }
}

// =============================================================================
// Product
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for CreateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_name("name", &self.name))
            .check(validate_optional_text(
                "description",
                self.description.as_deref(),
                MAX_DESCRIPTION_LENGTH,
            ))
            .check(validate_price_cents("price_cents", self.price_cents));
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for UpdateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_uuid("id", &self.id))
            .check(validate_name("name", &self.name))
            .check(validate_optional_text(
                "description",
                self.description.as_deref(),
                MAX_DESCRIPTION_LENGTH,
            ))
            .check(validate_price_cents("price_cents", self.price_cents));
        v.finish()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One requested line of a new sale. The unit price is not accepted from
/// the caller; it is read from the product when the sale is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSaleItem {
    pub product_id: String,
    pub quantity: i64,
    /// Discount in basis points (1000 = 10%).
    #[serde(default)]
    pub discount_bps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSale {
    pub customer_id: String,
    pub branch_id: String,
    /// Defaults to the time the sale is recorded.
    #[serde(default)]
    pub sale_date: Option<DateTime<Utc>>,
    pub items: Vec<CreateSaleItem>,
}

impl Validate for CreateSale {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_uuid("customer_id", &self.customer_id))
            .check(validate_uuid("branch_id", &self.branch_id))
            .check(validate_item_count("items", self.items.len()));

        for (i, item) in self.items.iter().enumerate() {
            v.check(validate_uuid(
                &format!("items[{i}].product_id"),
                &item.product_id,
            ))
            .check(validate_quantity(
                &format!("items[{i}].quantity"),
                item.quantity,
            ))
            .check(validate_discount_bps(
                &format!("items[{i}].discount_bps"),
                item.discount_bps,
            ));
        }

        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSaleStatus {
    pub id: String,
    pub status: SaleStatus,
}

impl Validate for UpdateSaleStatus {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_uuid("id", &self.id));
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelSaleItem {
    pub sale_id: String,
    pub item_id: String,
}

impl Validate for CancelSaleItem {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_uuid("sale_id", &self.sale_id))
            .check(validate_uuid("item_id", &self.item_id));
        v.finish()
    }
}

// =============================================================================
// User
// =============================================================================

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
}

// Keeps the plaintext password out of logs.
impl std::fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"********")
            .field("role", &self.role)
            .field("status", &self.status)
            .finish()
    }
}

impl Validate for CreateUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(validate_username("username", &self.username))
            .check(validate_email("email", &self.email))
            .check(validate_phone("phone", &self.phone))
            .check(validate_password("password", &self.password));
        v.finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn item(quantity: i64, discount_bps: u32) -> CreateSaleItem {
        CreateSaleItem {
            product_id: ID.to_string(),
            quantity,
            discount_bps,
        }
    }

    fn sale(items: Vec<CreateSaleItem>) -> CreateSale {
        CreateSale {
            customer_id: ID.to_string(),
            branch_id: ID.to_string(),
            sale_date: None,
            items,
        }
    }

    #[test]
    fn test_create_branch_names_field() {
        let long = "x".repeat(101);
        for name in ["", "A", long.as_str()] {
            let cmd = CreateBranch {
                name: name.to_string(),
                is_active: true,
            };
            let errors = cmd.validate().unwrap_err();
            assert!(errors.has_field("name"), "name {name:?} should fail");
        }
    }

    #[test]
    fn test_customer_blank_contact_is_absent() {
        let mut cmd = CreateCustomer {
            name: "Maria Lima".to_string(),
            email: Some("   ".to_string()),
            phone: Some(String::new()),
            is_active: true,
        };
        assert!(cmd.validate().is_ok());

        cmd.email = Some("maria@".to_string());
        cmd.phone = Some("12".to_string());
        let errors = cmd.validate().unwrap_err();
        assert!(errors.has_field("email"));
        assert!(errors.has_field("phone"));
    }

    #[test]
    fn test_create_product_price_bounds() {
        let mut cmd = CreateProduct {
            name: "Espresso".to_string(),
            description: None,
            price_cents: 99_999_999,
            is_active: true,
        };
        assert!(cmd.validate().is_ok());

        cmd.price_cents = 0;
        assert!(cmd.validate().unwrap_err().has_field("price_cents"));

        cmd.price_cents = 100_000_000;
        assert!(cmd.validate().unwrap_err().has_field("price_cents"));
    }

    #[test]
    fn test_create_sale_item_paths() {
        let errors = sale(vec![item(20, 10_000), item(21, 10_001)])
            .validate()
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("items[1].quantity"));
        assert!(errors.has_field("items[1].discount_bps"));
        assert!(!errors.has_field("items[0].quantity"));
    }

    #[test]
    fn test_create_sale_requires_items() {
        let errors = sale(Vec::new()).validate().unwrap_err();
        assert!(errors.has_field("items"));
    }

    #[test]
    fn test_create_sale_rejects_too_many_items() {
        let errors = sale((0..101).map(|_| item(1, 0)).collect())
            .validate()
            .unwrap_err();
        assert!(errors.has_field("items"));
    }

    #[test]
    fn test_create_user_reports_every_field() {
        let cmd = CreateUser {
            username: "ab".to_string(),
            email: "nope".to_string(),
            phone: "1".to_string(),
            password: "weak".to_string(),
            role: UserRole::Customer,
            status: UserStatus::Active,
        };
        let map = cmd.validate().unwrap_err().field_map();
        assert_eq!(
            map.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["email", "password", "phone", "username"]
        );
    }

    #[test]
    fn test_create_user_debug_hides_password() {
        let cmd = CreateUser {
            username: "ana".to_string(),
            email: "ana@shop.com".to_string(),
            phone: "5551234".to_string(),
            password: "Secr3t!pass".to_string(),
            role: UserRole::Admin,
            status: UserStatus::Active,
        };
        assert!(!format!("{cmd:?}").contains("Secr3t"));
    }

    #[test]
    fn test_list_query_flattens_page_and_filter() {
        let query: ListQuery<ListFilter> =
            serde_json::from_str(r#"{"page": 2, "size": 5, "name_contains": "north"}"#).unwrap();
        assert_eq!(query.page, PageRequest::new(2, 5));
        assert_eq!(query.filter.name_contains.as_deref(), Some("north"));

        let query: ListQuery<ListFilter> = serde_json::from_str(r#"{"size": 0}"#).unwrap();
        assert!(query.validate().unwrap_err().has_field("size"));
    }

    #[test]
    fn test_sale_filter_range_order() {
        let now = Utc::now();
        let filter = SaleFilter {
            from: Some(now),
            to: Some(now - chrono::Duration::days(1)),
            ..SaleFilter::default()
        };
        assert!(filter.validate().unwrap_err().has_field("from"));
    }

    #[test]
    fn test_defaults_on_deserialize() {
        let cmd: CreateBranch = serde_json::from_str(r#"{"name": "Centro"}"#).unwrap();
        assert!(cmd.is_active);

        let item: CreateSaleItem =
            serde_json::from_str(&format!(r#"{{"product_id": "{ID}", "quantity": 1}}"#)).unwrap();
        assert_eq!(item.discount_bps, 0);
    }
}
