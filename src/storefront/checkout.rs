//! Checkout: order summary, shipping form validation and (simulated) order
//! placement.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::catalog::{Catalog, Locations};
use crate::domain::aggregates::{Address, LineItem, Order, OrderError};
use crate::domain::value_objects::Money;
use crate::pricing::CheckoutBlocker;
use crate::storefront::cart::{CartRow, CartView};
use crate::storefront::session::{log_event, Session};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static COUNTRY_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+[0-9]{1,4}$").expect("country code pattern"));

// =============================================================================
// Shipping form
// =============================================================================

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CheckoutForm {
    #[validate(custom = "not_blank")]
    pub first_name: String,
    #[validate(custom = "not_blank")]
    pub last_name: String,
    #[validate(custom = "email_address")]
    pub email: String,
    #[validate(custom = "country_code")]
    pub phone_country_code: String,
    /// Anything that is not a digit is ignored.
    #[validate(custom = "phone_digits")]
    pub phone_number: String,
    #[validate(custom = "not_blank")]
    pub address: String,
    #[validate(custom = "not_blank")]
    pub country: String,
    #[validate(custom = "not_blank")]
    pub province: String,
    #[validate(custom = "not_blank")]
    pub city: String,
    #[validate(custom = "not_blank")]
    pub postal_code: String,
    pub company: Option<String>,
    pub tax_id: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { Err(ValidationError::new("required")) } else { Ok(()) }
}

fn email_address(value: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(value.trim()) { Ok(()) } else { Err(issue("email", "Enter a valid email address.")) }
}

fn country_code(value: &str) -> Result<(), ValidationError> {
    if COUNTRY_CODE_RE.is_match(value.trim()) { Ok(()) } else { Err(issue("country_code", "Use a country code like +62.")) }
}

fn phone_digits(value: &str) -> Result<(), ValidationError> {
    let digits = sanitize_phone(value);
    if (6..=15).contains(&digits.len()) { Ok(()) } else { Err(issue("phone", "Phone number must be 6 to 15 digits.")) }
}

fn sanitize_phone(value: &str) -> String { value.chars().filter(char::is_ascii_digit).collect() }

fn issue(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Form fields in display order; issues are reported in this order.
const FIELDS: [&str; 12] = [
    "first_name", "last_name", "email", "phone_country_code", "phone_number", "address",
    "country", "province", "city", "postal_code", "company", "tax_id",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl CheckoutForm {
    /// Field rules plus the country → province → city cascade.
    pub fn check(&self, locations: &Locations) -> Result<(), Vec<FieldIssue>> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        let has = |errors: &ValidationErrors, field: &str| errors.field_errors().contains_key(field);

        if !has(&errors, "country") && locations.country(self.country.trim()).is_none() {
            errors.add("country", issue("location", "Unknown country."));
        }
        if !has(&errors, "country") && !has(&errors, "province") && !locations.has_province(self.country.trim(), self.province.trim()) {
            errors.add("province", issue("location", "Province does not belong to the selected country."));
        }
        if !has(&errors, "province") && !has(&errors, "city") && !locations.has_city(self.province.trim(), self.city.trim()) {
            errors.add("city", issue("location", "City does not belong to the selected province."));
        }

        if errors.errors().is_empty() { Ok(()) } else { Err(field_issues(&errors)) }
    }

    pub fn to_address(&self) -> Address {
        let optional = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Address {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: format!("{} {}", self.phone_country_code.trim(), sanitize_phone(&self.phone_number)),
            street: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            province: self.province.trim().to_string(),
            country: self.country.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            company: optional(&self.company),
            tax_id: optional(&self.tax_id),
        }
    }
}

fn field_issues(errors: &ValidationErrors) -> Vec<FieldIssue> {
    let by_field = errors.field_errors();
    FIELDS
        .iter()
        .filter_map(|field| by_field.get(field).map(|errs| (*field, errs)))
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldIssue {
                field: field.to_string(),
                code: e.code.to_string(),
                message: e.message.as_deref().map(str::to_string).unwrap_or_else(|| format!("{} is required.", field_label(field))),
            })
        })
        .collect()
}

fn field_label(field: &str) -> &'static str {
    match field {
        "first_name" => "First name",
        "last_name" => "Last name",
        "address" => "Address",
        "country" => "Country",
        "province" => "Province",
        "city" => "City",
        "postal_code" => "Postal code",
        _ => "This field",
    }
}

// =============================================================================
// Summary
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct CheckoutSummary {
    pub session_label: String,
    pub rows: Vec<CartRow>,
    pub subtotal: Money,
    pub subtotal_display: String,
    pub shipping: Money,
    pub total: Money,
    pub total_display: String,
    pub authenticated: bool,
    pub is_empty: bool,
    pub all_in_stock: bool,
    pub all_minimums_met: bool,
    pub checkout_eligible: bool,
    pub messages: Vec<String>,
    pub default_country: String,
    pub default_dial: Option<String>,
}

impl CheckoutSummary {
    pub fn build(catalog: &Catalog, locations: &Locations, session: &Session, currency: &str, default_country: &str) -> Self {
        let view = CartView::build(catalog, session.cart(), session.shopper(), currency);
        let shipping = Money::zero(currency);
        let total = view.total.add(&shipping).unwrap_or_else(|_| view.total.clone());
        Self {
            session_label: session.role().session_label(),
            subtotal_display: view.total.to_string(),
            subtotal: view.total,
            shipping,
            total_display: total.to_string(),
            total,
            authenticated: session.role().is_authenticated(),
            is_empty: view.is_empty,
            all_in_stock: view.all_in_stock,
            all_minimums_met: view.all_minimums_met,
            checkout_eligible: view.checkout_eligible,
            messages: view.messages,
            rows: view.rows,
            default_country: default_country.to_string(),
            default_dial: locations.country(default_country).map(|c| c.dial.clone()),
        }
    }
}

// =============================================================================
// Placement
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckoutError {
    #[error("Please login to continue checkout.")]
    NotAuthenticated,
    #[error("Please complete the form and fix issues before placing the order.")]
    Blocked(Vec<CheckoutBlocker>),
    #[error("Please complete the form and fix issues before placing the order.")]
    InvalidForm(Vec<FieldIssue>),
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Places an order for the session's cart. Nothing is charged and no stock
/// moves; the cart is emptied on success.
pub fn place_order(
    catalog: &Catalog,
    locations: &Locations,
    session: &mut Session,
    form: &CheckoutForm,
    currency: &str,
    now: DateTime<Utc>,
) -> Result<Order, CheckoutError> {
    if !session.role().is_authenticated() {
        return Err(CheckoutError::NotAuthenticated);
    }
    let view = CartView::build(catalog, session.cart(), session.shopper(), currency);
    if !view.blockers.is_empty() {
        return Err(CheckoutError::Blocked(view.blockers));
    }
    form.check(locations).map_err(CheckoutError::InvalidForm)?;

    let items: Vec<LineItem> = view.rows.iter().map(CartRow::to_line_item).collect();
    let mut order = Order::place(items, form.to_address(), currency, now)?;
    session.cart_mut().clear();
    session.flush_events();
    for event in order.take_events() {
        log_event(session.id(), &event);
    }
    Ok(order)
}
