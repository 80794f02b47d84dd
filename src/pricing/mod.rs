//! Pricing and eligibility rules.
//!
//! Every surface that shows a price or validates a quantity (store listing,
//! product detail, cart, checkout) goes through these functions, so the
//! "can I buy this many at this price" answer is the same everywhere.
//!
//! Nothing here fails: optional catalog fields get explicit defaults and
//! dangling cart references are dropped by [`resolve_lines`] before any rule
//! runs.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::domain::aggregates::{CartLine, Product, RoleState, Variant};
use crate::domain::value_objects::StockLimit;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Retail,
    Wholesale,
}

impl PriceTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Retail => "Retail",
            Self::Wholesale => "Wholesale (retailer)",
        }
    }

    /// Minimum that applies when the product sets none.
    pub fn default_minimum(&self) -> u32 {
        match self {
            Self::Retail => 1,
            Self::Wholesale => 0,
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Self::Retail => "retail", Self::Wholesale => "wholesale" })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub tier: PriceTier,
    pub amount: Decimal,
}

/// The two role-derived inputs the rules need. Built from [`RoleState`] so
/// the engine never looks at badges itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shopper {
    pub authenticated: bool,
    pub wholesale_visible: bool,
}

impl From<&RoleState> for Shopper {
    fn from(role: &RoleState) -> Self {
        Self { authenticated: role.is_authenticated(), wholesale_visible: role.can_see_wholesale() }
    }
}

pub fn select_price(product: &Product, wholesale_visible: bool) -> PriceQuote {
    if wholesale_visible {
        PriceQuote { tier: PriceTier::Wholesale, amount: product.prices().reseller }
    } else {
        PriceQuote { tier: PriceTier::Retail, amount: product.prices().retail }
    }
}

/// Variant stock wins when the variant carries a figure; otherwise the
/// product's; otherwise unbounded.
pub fn resolve_stock(product: &Product, variant: Option<&Variant>) -> StockLimit {
    StockLimit::from_option(variant.and_then(|v| v.stock).or(product.stock()))
}

pub fn is_out_of_stock(limit: StockLimit) -> bool { limit.is_exhausted() }

/// Only a finite limit can be exceeded.
pub fn is_over_stock(quantity: u32, limit: StockLimit) -> bool { limit.exceeded_by(quantity) }

pub fn resolve_minimum(product: &Product, tier: PriceTier) -> u32 {
    match tier {
        PriceTier::Wholesale => product.moq_wholesale(),
        PriceTier::Retail => product.moq_retail(),
    }
    .unwrap_or(tier.default_minimum())
}

pub fn meets_minimum(quantity: u32, min_required: u32) -> bool { quantity >= min_required }

/// Raises `requested` to at least `max(1, min_required)`, then caps it at a
/// finite stock limit. Applying it twice gives the same result.
pub fn clamp_quantity(requested: i64, min_required: u32, max_stock: StockLimit) -> u32 {
    let floor = min_required.max(1);
    let lowered = u32::try_from(requested.max(i64::from(floor))).unwrap_or(u32::MAX);
    match max_stock {
        StockLimit::Finite(units) => lowered.min(units),
        StockLimit::Unbounded => lowered,
    }
}

/// Everything the rules say about one product/variant at one quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LineAssessment {
    pub quote: PriceQuote,
    pub quantity: u32,
    pub min_required: u32,
    pub stock: StockLimit,
    pub out_of_stock: bool,
    pub over_stock: bool,
    pub meets_minimum: bool,
}

impl LineAssessment {
    pub fn stock_ok(&self) -> bool { !self.out_of_stock && !self.over_stock }

    /// Quantity this line would be clamped to.
    pub fn clamped(&self, requested: i64) -> u32 { clamp_quantity(requested, self.min_required, self.stock) }

    pub fn stock_warning(&self) -> Option<String> {
        if self.out_of_stock {
            Some("Out of stock".to_string())
        } else if self.over_stock {
            self.stock.finite().map(|max| format!("Exceeds stock (max {max})"))
        } else {
            None
        }
    }

    /// Only raised when the product asks for more than the tier's default.
    pub fn minimum_warning(&self) -> Option<String> {
        if self.meets_minimum || self.min_required <= self.quote.tier.default_minimum() {
            return None;
        }
        Some(match self.quote.tier {
            PriceTier::Wholesale => format!("Below Wholesale MOQ ({})", self.min_required),
            PriceTier::Retail => format!("Below Retail minimum ({})", self.min_required),
        })
    }
}

pub fn assess_line(product: &Product, variant: Option<&Variant>, wholesale_visible: bool, quantity: u32) -> LineAssessment {
    let quote = select_price(product, wholesale_visible);
    let stock = resolve_stock(product, variant);
    let min_required = resolve_minimum(product, quote.tier);
    LineAssessment {
        quote,
        quantity,
        min_required,
        stock,
        out_of_stock: is_out_of_stock(stock),
        over_stock: is_over_stock(quantity, stock),
        meets_minimum: meets_minimum(quantity, min_required),
    }
}

/// Read access to catalog records by id.
pub trait ProductLookup {
    fn product(&self, id: &str) -> Option<&Product>;
}

impl ProductLookup for [Product] {
    fn product(&self, id: &str) -> Option<&Product> { self.iter().find(|p| p.id() == id) }
}

impl ProductLookup for Vec<Product> {
    fn product(&self, id: &str) -> Option<&Product> { self.as_slice().product(id) }
}

/// A cart line joined with its catalog records.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedLine<'a> {
    pub product: &'a Product,
    pub variant: Option<&'a Variant>,
    pub quantity: u32,
}

impl<'a> ResolvedLine<'a> {
    pub fn assess(&self, wholesale_visible: bool) -> LineAssessment {
        assess_line(self.product, self.variant, wholesale_visible, self.quantity)
    }
}

/// Joins cart lines with the catalog, silently dropping lines whose product
/// or variant no longer exists.
pub fn resolve_lines<'a, L>(lines: &[CartLine], lookup: &'a L) -> Vec<ResolvedLine<'a>>
where
    L: ProductLookup + ?Sized,
{
    lines
        .iter()
        .filter_map(|line| {
            let product = lookup.product(&line.product_id)?;
            let variant = match line.variant_id.as_deref() {
                Some(id) => Some(product.find_variant(id)?),
                None => None,
            };
            Some(ResolvedLine { product, variant, quantity: line.quantity })
        })
        .collect()
}

/// Why checkout cannot proceed, in the order a shopper is told about them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutBlocker {
    #[error("Cart is empty.")]
    EmptyCart,
    #[error("Please login to continue checkout.")]
    NotAuthenticated,
    #[error("Some items are out of stock or exceed stock. Please adjust.")]
    StockIssue,
    #[error("Please meet the minimum quantity requirements.")]
    BelowMinimum,
}

pub fn checkout_blockers(lines: &[ResolvedLine<'_>], shopper: Shopper) -> Vec<CheckoutBlocker> {
    let mut blockers = Vec::new();
    if lines.is_empty() {
        blockers.push(CheckoutBlocker::EmptyCart);
    }
    if !shopper.authenticated {
        blockers.push(CheckoutBlocker::NotAuthenticated);
    }
    let assessed: Vec<LineAssessment> = lines.iter().map(|l| l.assess(shopper.wholesale_visible)).collect();
    if !assessed.iter().all(LineAssessment::stock_ok) {
        blockers.push(CheckoutBlocker::StockIssue);
    }
    if !assessed.iter().all(|a| a.meets_minimum) {
        blockers.push(CheckoutBlocker::BelowMinimum);
    }
    blockers
}

/// The single checkout gate used by the cart, checkout and product views.
pub fn checkout_eligible<L>(lines: &[CartLine], lookup: &L, shopper: Shopper) -> bool
where
    L: ProductLookup + ?Sized,
{
    checkout_blockers(&resolve_lines(lines, lookup), shopper).is_empty()
}
