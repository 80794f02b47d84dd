//! Cart and order-summary rows.
//!
//! The cart page and the checkout summary render the same rows and the same
//! checkout gate, both produced here from [`crate::pricing`].

use serde::Serialize;

use crate::catalog::Catalog;
use crate::domain::aggregates::{Cart, LineItem, Product};
use crate::domain::value_objects::Money;
use crate::pricing::{self, CheckoutBlocker, LineAssessment, PriceTier, ResolvedLine, Shopper};

#[derive(Clone, Debug, Serialize)]
pub struct CartRow {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub title: String,
    pub variant_label: String,
    pub quantity: u32,
    pub tier: PriceTier,
    pub tier_label: &'static str,
    pub unit_price: Money,
    pub unit_price_display: String,
    pub subtotal: Money,
    pub subtotal_display: String,
    pub min_required: u32,
    /// Only present when the stock figure is finite.
    pub stock: Option<u32>,
    pub out_of_stock: bool,
    pub over_stock: bool,
    pub meets_minimum: bool,
    pub stock_warning: Option<String>,
    pub minimum_warning: Option<String>,
    /// Bounds for the quantity input.
    pub quantity_min: u32,
    pub quantity_max: Option<u32>,
    pub quantity_editable: bool,
}

impl CartRow {
    fn build(line: &ResolvedLine<'_>, assessment: &LineAssessment, currency: &str) -> Self {
        let unit_price = Money::new(assessment.quote.amount, currency);
        let subtotal = unit_price.multiply(line.quantity);
        Self {
            product_id: line.product.id().to_string(),
            variant_id: line.variant.map(|v| v.id.clone()),
            title: line.product.title().to_string(),
            variant_label: Product::variant_label(line.variant),
            quantity: line.quantity,
            tier: assessment.quote.tier,
            tier_label: assessment.quote.tier.label(),
            unit_price_display: unit_price.to_string(),
            unit_price,
            subtotal_display: subtotal.to_string(),
            subtotal,
            min_required: assessment.min_required,
            stock: assessment.stock.finite(),
            out_of_stock: assessment.out_of_stock,
            over_stock: assessment.over_stock,
            meets_minimum: assessment.meets_minimum,
            stock_warning: assessment.stock_warning(),
            minimum_warning: assessment.minimum_warning(),
            quantity_min: assessment.min_required.max(1),
            quantity_max: assessment.stock.finite(),
            quantity_editable: !assessment.out_of_stock,
        }
    }

    pub fn to_line_item(&self) -> LineItem {
        LineItem {
            product_id: self.product_id.clone(),
            variant_id: self.variant_id.clone(),
            title: self.title.clone(),
            variant_label: self.variant_label.clone(),
            tier: self.tier,
            quantity: self.quantity,
            unit_price: self.unit_price.clone(),
            total: self.subtotal.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CartView {
    pub rows: Vec<CartRow>,
    pub total: Money,
    pub total_display: String,
    pub total_units: u64,
    pub is_empty: bool,
    pub all_in_stock: bool,
    pub all_minimums_met: bool,
    pub checkout_eligible: bool,
    pub blockers: Vec<CheckoutBlocker>,
    pub messages: Vec<String>,
}

impl CartView {
    pub fn build(catalog: &Catalog, cart: &Cart, shopper: Shopper, currency: &str) -> Self {
        let resolved = pricing::resolve_lines(cart.lines(), catalog);
        let rows: Vec<CartRow> = resolved
            .iter()
            .map(|line| CartRow::build(line, &line.assess(shopper.wholesale_visible), currency))
            .collect();
        let total = rows.iter().fold(Money::zero(currency), |acc, r| acc.add(&r.subtotal).unwrap_or(acc));
        let blockers = pricing::checkout_blockers(&resolved, shopper);
        Self {
            total_display: total.to_string(),
            total,
            total_units: rows.iter().map(|r| u64::from(r.quantity)).sum(),
            is_empty: rows.is_empty(),
            all_in_stock: rows.iter().all(|r| !r.out_of_stock && !r.over_stock),
            all_minimums_met: rows.iter().all(|r| r.meets_minimum),
            checkout_eligible: blockers.is_empty(),
            messages: blockers.iter().map(ToString::to_string).collect(),
            blockers,
            rows,
        }
    }

    /// "Proceed to checkout": the first reason the shopper is held back.
    pub fn proceed(&self) -> Result<(), CheckoutBlocker> {
        match self.blockers.first() {
            Some(blocker) => Err(*blocker),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Badge, RoleState};

    fn signed_in() -> Shopper { Shopper { authenticated: true, wholesale_visible: false } }

    #[test]
    fn test_rows_and_totals() {
        let catalog = Catalog::builtin();
        let mut cart = Cart::new();
        cart.add_item("P-001", Some("P-001-BLK-S"), 2).unwrap();
        cart.add_item("P-002", Some("P-002-NAT-OS"), 2).unwrap();
        cart.add_item("P-404", None, 9).unwrap();
        let view = CartView::build(&catalog, &cart, signed_in(), "IDR");
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].variant_label, "Black / S");
        assert_eq!(view.rows[0].unit_price_display, "Rp 199.000");
        assert_eq!(view.rows[0].stock, Some(10));
        assert_eq!(view.total_display, "Rp 696.000");
        assert_eq!(view.total_units, 4);
        assert!(view.checkout_eligible);
        assert_eq!(view.proceed(), Ok(()));
    }

    #[test]
    fn test_blocked_rows_explain_themselves() {
        let catalog = Catalog::builtin();
        let mut cart = Cart::new();
        cart.add_item("P-001", Some("P-001-BLK-S"), 15).unwrap();
        cart.add_item("P-002", Some("P-002-BLK-OS"), 1).unwrap();
        let view = CartView::build(&catalog, &cart, signed_in(), "IDR");
        assert_eq!(view.rows[0].stock_warning.as_deref(), Some("Exceeds stock (max 10)"));
        assert_eq!(view.rows[1].minimum_warning.as_deref(), Some("Below Retail minimum (2)"));
        assert_eq!(view.blockers, vec![CheckoutBlocker::StockIssue, CheckoutBlocker::BelowMinimum]);
        assert_eq!(view.proceed(), Err(CheckoutBlocker::StockIssue));
        assert_eq!(view.messages[0], "Some items are out of stock or exceed stock. Please adjust.");
    }

    #[test]
    fn test_login_is_checked_first() {
        let catalog = Catalog::builtin();
        let mut cart = Cart::new();
        cart.add_item("P-001", Some("P-001-BLK-S"), 15).unwrap();
        let view = CartView::build(&catalog, &cart, Shopper::default(), "IDR");
        assert_eq!(view.proceed(), Err(CheckoutBlocker::NotAuthenticated));
    }

    #[test]
    fn test_wholesale_rows() {
        let catalog = Catalog::builtin();
        let mut role = RoleState::new();
        role.login();
        role.set_badge(Badge::Retailer, true).unwrap();
        let mut cart = Cart::new();
        cart.add_item("P-001", Some("P-001-WHT-M"), 12).unwrap();
        let view = CartView::build(&catalog, &cart, Shopper::from(&role), "IDR");
        assert_eq!(view.rows[0].tier, PriceTier::Wholesale);
        assert_eq!(view.rows[0].tier_label, "Wholesale (retailer)");
        assert_eq!(view.total_display, "Rp 1.668.000");
        assert_eq!(view.rows[0].quantity_min, 12);
        assert!(view.checkout_eligible);
    }

    #[test]
    fn test_empty_cart_cannot_proceed() {
        let view = CartView::build(&Catalog::builtin(), &Cart::new(), signed_in(), "IDR");
        assert!(view.is_empty);
        assert_eq!(view.proceed(), Err(CheckoutBlocker::EmptyCart));
    }
}
