//! # Validation Module
//!
//! Field rules and the collector that runs them.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Types and required JSON keys                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Command validation (THIS MODULE)                             │
//! │  ├── Every rule runs, no short-circuit across fields                   │
//! │  └── All failures returned together as ValidationErrors                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints (sale_number, user email)                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sales_core::validation::{validate_name, validate_price_cents, Validator};
//!
//! let mut v = Validator::new();
//! v.check(validate_name("name", "X"))
//!     .check(validate_price_cents("price_cents", 0));
//!
//! let errors = v.finish().unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```
//!
//! Each rule takes the field name so nested values can be reported with a
//! path such as `items[2].quantity`.

use crate::error::{ValidationError, ValidationErrors};
use crate::paging::PageRequest;
use crate::{
    MAX_DISCOUNT_BPS, MAX_ITEM_QUANTITY, MAX_NAME_LENGTH, MAX_PAGE_SIZE, MAX_PRICE_CENTS,
    MAX_SALE_ITEMS, MIN_NAME_LENGTH,
};

/// Result type for a single rule.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 254;
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

// =============================================================================
// Collector
// =============================================================================

/// Collects the outcome of every rule for one command.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Validator::default()
    }

    /// Records a rule outcome. Failures are kept, successes ignored.
    pub fn check(&mut self, result: ValidationResult<()>) -> &mut Self {
        if let Err(error) = result {
            self.errors.push(error);
        }
        self
    }

    /// Merges the failures of a nested validation.
    pub fn merge(&mut self, result: Result<(), ValidationErrors>) -> &mut Self {
        if let Err(errors) = result {
            self.errors.extend(errors.errors().iter().cloned());
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ok when no rule failed, otherwise the full error set.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(self.errors))
        }
    }
}

/// Implemented by every inbound command.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be between 2 and 100 characters (counted in chars, not bytes)
///
/// ## Example
/// ```rust
/// use sales_core::validation::validate_name;
///
/// assert!(validate_name("name", "Downtown").is_ok());
/// assert!(validate_name("name", "").is_err());
/// assert!(validate_name("name", "A").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    validate_length(field, value, MIN_NAME_LENGTH, MAX_NAME_LENGTH)
}

/// Validates a username.
///
/// ## Rules
/// - Required, 3 to 50 characters
pub fn validate_username(field: &str, value: &str) -> ValidationResult<()> {
    validate_length(field, value, MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH)
}

fn validate_length(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }

    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates optional free text. Absent is fine.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(text) if text.trim().chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates an email address.
///
/// ## Rules
/// - Required, at most 254 characters
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot and neither starts nor ends with one
/// - No whitespace
///
/// ## Example
/// ```rust
/// use sales_core::validation::validate_email;
///
/// assert!(validate_email("email", "ana@shop.com").is_ok());
/// assert!(validate_email("email", "ana@shop").is_err());
/// assert!(validate_email("email", "not an email").is_err());
/// ```
pub fn validate_email(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_EMAIL_LENGTH,
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    if value.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = value
        .split_once('@')
        .ok_or_else(|| invalid("must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must be a valid email address"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("must have a valid domain"));
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Required
/// - Optional leading `+`, then 7 to 15 digits
/// - Spaces and dashes between digits are ignored
pub fn validate_phone(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let number = value.strip_prefix('+').unwrap_or(value);
    let valid_chars = number
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
    let digits = number.chars().filter(char::is_ascii_digit).count();

    if !valid_chars || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!(
                "must contain {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits, optionally prefixed with '+'"
            ),
        });
    }

    Ok(())
}

/// Validates a plaintext password before hashing.
///
/// ## Rules
/// - At least 8 characters
/// - At least one uppercase letter, one lowercase letter, one digit
///   and one symbol
pub fn validate_password(field: &str, value: &str) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    let has_upper = value.chars().any(char::is_uppercase);
    let has_lower = value.chars().any(char::is_lowercase);
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_symbol = value.chars().any(|c| !c.is_alphanumeric());

    if !(has_upper && has_lower && has_digit && has_symbol) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain an uppercase letter, a lowercase letter, a digit and a symbol"
                .to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a product price in cents.
///
/// ## Rules
/// - Must be positive (free items are not sold)
/// - Must not exceed 99_999_999 (999,999.99)
///
/// ## Example
/// ```rust
/// use sales_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price_cents", 99_999_999).is_ok());
/// assert!(validate_price_cents("price_cents", 0).is_err());
/// assert!(validate_price_cents("price_cents", 100_000_000).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a sale item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (20)
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a discount in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_discount_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > MAX_DISCOUNT_BPS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_DISCOUNT_BPS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of items on a sale.
///
/// ## Rules
/// - At least one item
/// - At most MAX_SALE_ITEMS (100)
pub fn validate_item_count(field: &str, count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if count > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates paging parameters.
///
/// ## Rules
/// - `page` must be positive
/// - `size` must be between 1 and 100
/// - the row offset `(page - 1) * size` must fit in i64
pub fn validate_page(page: &PageRequest) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    let size_ok = page.size > 0 && page.size <= MAX_PAGE_SIZE;

    if page.page <= 0 {
        v.check(Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        }));
    } else if size_ok && page.checked_offset().is_none() {
        v.check(Err(ValidationError::OutOfRange {
            field: "page".to_string(),
            min: 1,
            max: page.max_page(),
        }));
    }

    if !size_ok {
        v.check(Err(ValidationError::OutOfRange {
            field: "size".to_string(),
            min: 1,
            max: MAX_PAGE_SIZE,
        }));
    }

    v.finish()
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use sales_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_bounds() {
        assert!(validate_name("name", "Ab").is_ok());
        assert!(validate_name("name", &"a".repeat(100)).is_ok());

        assert_eq!(
            validate_name("name", "   "),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );
        assert!(matches!(
            validate_name("name", "A"),
            Err(ValidationError::TooShort { min: 2, .. })
        ));
        assert!(matches!(
            validate_name("name", &"a".repeat(101)),
            Err(ValidationError::TooLong { max: 100, .. })
        ));
    }

    #[test]
    fn test_validate_name_counts_chars() {
        // 50 two-byte chars is 100 bytes but only 50 characters
        assert!(validate_name("name", &"é".repeat(50)).is_ok());
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price_cents("price_cents", 1).is_ok());
        assert!(validate_price_cents("price_cents", 99_999_999).is_ok());
        assert!(validate_price_cents("price_cents", 0).is_err());
        assert!(validate_price_cents("price_cents", -5).is_err());
        assert!(validate_price_cents("price_cents", 100_000_000).is_err());
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(validate_quantity("quantity", 1).is_ok());
        assert!(validate_quantity("quantity", 20).is_ok());
        assert!(validate_quantity("quantity", 0).is_err());
        assert!(validate_quantity("quantity", 21).is_err());
    }

    #[test]
    fn test_validate_discount_bounds() {
        assert!(validate_discount_bps("discount_bps", 0).is_ok());
        assert!(validate_discount_bps("discount_bps", 10_000).is_ok());
        assert!(validate_discount_bps("discount_bps", 10_001).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "ana@shop.com").is_ok());
        assert!(validate_email("email", "").is_err());
        assert!(validate_email("email", "@shop.com").is_err());
        assert!(validate_email("email", "ana@@shop.com").is_err());
        assert!(validate_email("email", "ana@shop.").is_err());
        assert!(validate_email("email", "ana smith@shop.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("phone", "+55 11 99999-0000").is_ok());
        assert!(validate_phone("phone", "5551234").is_ok());
        assert!(validate_phone("phone", "123").is_err());
        assert!(validate_phone("phone", "call me").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password", "Str0ng!pass").is_ok());
        assert!(validate_password("password", "Sh0rt!").is_err());
        assert!(validate_password("password", "alllowercase1!").is_err());
        assert!(validate_password("password", "NoDigits!!").is_err());
        assert!(validate_password("password", "NoSymbol123").is_err());
    }

    #[test]
    fn test_validate_item_count() {
        assert!(validate_item_count("items", 1).is_ok());
        assert!(validate_item_count("items", 100).is_ok());
        assert!(validate_item_count("items", 0).is_err());
        assert!(validate_item_count("items", 101).is_err());
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(&PageRequest::new(1, 10)).is_ok());
        assert!(validate_page(&PageRequest::new(3, 100)).is_ok());

        let errors = validate_page(&PageRequest::new(0, 0)).unwrap_err();
        assert!(errors.has_field("page"));
        assert!(errors.has_field("size"));

        let errors = validate_page(&PageRequest::new(1, 101)).unwrap_err();
        assert!(!errors.has_field("page"));
        assert!(errors.has_field("size"));

        assert!(validate_page(&PageRequest::new(-1, 10)).is_err());
    }

    #[test]
    fn test_validate_page_offset_overflow() {
        let last = PageRequest::new(i64::MAX / 100 + 1, 100);
        assert!(validate_page(&last).is_ok());
        assert_eq!(last.checked_offset(), Some(i64::MAX / 100 * 100));

        let errors = validate_page(&PageRequest::new(i64::MAX, 100)).unwrap_err();
        assert!(errors.has_field("page"));
        assert!(!errors.has_field("size"));

        // size 1 never overflows
        assert!(validate_page(&PageRequest::new(i64::MAX, 1)).is_ok());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "12345").is_err());
    }

    #[test]
    fn test_validator_collects_all_failures() {
        let mut v = Validator::new();
        v.check(validate_name("name", ""))
            .check(validate_price_cents("price_cents", 0))
            .check(validate_quantity("items[0].quantity", 5));

        assert!(!v.is_valid());
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("name"));
        assert!(errors.has_field("price_cents"));
    }

    #[test]
    fn test_validator_passes_when_clean() {
        let mut v = Validator::new();
        v.check(validate_name("name", "Downtown"));
        assert!(v.finish().is_ok());
    }
}
