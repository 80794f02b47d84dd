//! Cart Aggregate
//!
//! An ordered list of lines keyed by `(product_id, variant_id)`. The cart
//! never knows about prices or stock; callers clamp quantities through the
//! pricing engine and feed the result back through [`Cart::set_quantity`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::domain::events::{CartEvent, DomainEvent};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(rename = "qty")]
    pub quantity: u32,
}

impl CartLine {
    pub fn key(&self) -> LineKey<'_> { LineKey { product_id: &self.product_id, variant_id: self.variant_id.as_deref() } }
}

/// Identity of a cart line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineKey<'a> {
    pub product_id: &'a str,
    pub variant_id: Option<&'a str>,
}

impl<'a> LineKey<'a> {
    pub fn new(product_id: &'a str, variant_id: Option<&'a str>) -> Self { Self { product_id, variant_id } }
}

/// Persisted shape of a cart: `{ "version": 1, "items": [...] }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub version: u32,
    pub items: Vec<CartLine>,
}

#[derive(Clone, Debug)]
pub struct Cart {
    lines: Vec<CartLine>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Default for Cart {
    fn default() -> Self { Self::new() }
}

impl Cart {
    pub fn new() -> Self { Self { lines: vec![], updated_at: Utc::now(), events: vec![] } }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn line_count(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Total units across all lines.
    pub fn total_units(&self) -> u64 { self.lines.iter().map(|l| u64::from(l.quantity)).sum() }

    pub fn quantity_of(&self, key: LineKey<'_>) -> u32 {
        self.position(key).map_or(0, |idx| self.lines[idx].quantity)
    }

    /// Adds units, merging into an existing line with the same key.
    pub fn add_item(&mut self, product_id: &str, variant_id: Option<&str>, quantity: u32) -> Result<(), CartError> {
        if product_id.is_empty() { return Err(CartError::MissingProduct); }
        if quantity == 0 { return Err(CartError::InvalidQuantity); }
        match self.position(LineKey::new(product_id, variant_id)) {
            Some(idx) => {
                let line = &mut self.lines[idx];
                line.quantity = line.quantity.saturating_add(quantity);
            }
            None => self.lines.push(CartLine {
                product_id: product_id.to_string(),
                variant_id: variant_id.map(str::to_string),
                quantity,
            }),
        }
        self.raise_event(CartEvent::ItemAdded { product_id: product_id.to_string(), variant_id: variant_id.map(str::to_string), quantity });
        self.touch();
        Ok(())
    }

    /// Overwrites a line's quantity. Zero or negative removes the line.
    pub fn set_quantity(&mut self, product_id: &str, variant_id: Option<&str>, quantity: i64) -> Result<(), CartError> {
        let idx = self.position(LineKey::new(product_id, variant_id)).ok_or(CartError::ItemNotFound)?;
        if quantity <= 0 {
            self.lines.remove(idx);
            self.raise_event(CartEvent::ItemRemoved { product_id: product_id.to_string(), variant_id: variant_id.map(str::to_string) });
        } else {
            let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            self.lines[idx].quantity = quantity;
            self.raise_event(CartEvent::QuantitySet { product_id: product_id.to_string(), variant_id: variant_id.map(str::to_string), quantity });
        }
        self.touch();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str, variant_id: Option<&str>) -> Result<(), CartError> {
        let idx = self.position(LineKey::new(product_id, variant_id)).ok_or(CartError::ItemNotFound)?;
        self.lines.remove(idx);
        self.raise_event(CartEvent::ItemRemoved { product_id: product_id.to_string(), variant_id: variant_id.map(str::to_string) });
        self.touch();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.raise_event(CartEvent::Cleared);
        self.touch();
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot { version: SNAPSHOT_VERSION, items: self.lines.clone() }
    }

    /// Rebuilds a cart from untrusted persisted JSON. Anything that is not a
    /// usable line is dropped; snapshots written by other versions are still
    /// read as long as they carry an `items` array.
    pub fn restore(raw: &Value) -> Self {
        let mut cart = Self::new();
        cart.lines = sanitize(raw.get("items").unwrap_or(&Value::Null));
        let lines = cart.lines.len();
        cart.raise_event(CartEvent::Restored { lines });
        cart
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: CartEvent) { self.events.push(DomainEvent::Cart(e)); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }

    fn position(&self, key: LineKey<'_>) -> Option<usize> {
        self.lines.iter().position(|l| l.key() == key)
    }
}

fn sanitize(raw: &Value) -> Vec<CartLine> {
    let Some(entries) = raw.as_array() else { return vec![] };
    let mut merged: Vec<CartLine> = Vec::new();
    for entry in entries.iter().filter_map(sanitize_line) {
        match merged.iter_mut().find(|l| l.key() == entry.key()) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(entry.quantity),
            None => merged.push(entry),
        }
    }
    merged
}

fn sanitize_line(raw: &Value) -> Option<CartLine> {
    let obj = raw.as_object()?;
    let product_id = obj.get("productId")?.as_str().filter(|s| !s.is_empty())?;
    let variant_id = obj.get("variantId").and_then(Value::as_str).map(str::to_string);
    let quantity = obj.get("qty").and_then(parse_quantity).filter(|q| *q > 0)?;
    Some(CartLine {
        product_id: product_id.to_string(),
        variant_id,
        quantity: u32::try_from(quantity).unwrap_or(u32::MAX),
    })
}

/// Numbers and numeric strings are accepted and floored.
fn parse_quantity(raw: &Value) -> Option<i64> {
    let n = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then(|| n.floor() as i64)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Item not found")]
    ItemNotFound,
    #[error("Product id is required")]
    MissingProduct,
    #[error("Quantity must be positive")]
    InvalidQuantity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new();
        cart.add_item("P-001", Some("P-001-BLK-S"), 2).unwrap();
        cart.add_item("P-001", Some("P-001-BLK-S"), 3).unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].quantity, 5); // Merged
        cart.add_item("P-001", None, 1).unwrap();
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total_units(), 6);
    }

    #[test]
    fn test_rejects_empty_adds() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_item("", None, 1), Err(CartError::MissingProduct));
        assert_eq!(cart.add_item("P-001", None, 0), Err(CartError::InvalidQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = Cart::new();
        cart.add_item("P-002", Some("P-002-NAT-OS"), 4).unwrap();
        cart.set_quantity("P-002", Some("P-002-NAT-OS"), 7).unwrap();
        assert_eq!(cart.quantity_of(LineKey::new("P-002", Some("P-002-NAT-OS"))), 7);
        cart.set_quantity("P-002", Some("P-002-NAT-OS"), 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.set_quantity("P-002", None, 1), Err(CartError::ItemNotFound));
        assert_eq!(cart.remove_item("P-002", None), Err(CartError::ItemNotFound));

        cart.add_item("P-003", None, 1).unwrap();
        cart.remove_item("P-003", None).unwrap();
        cart.add_item("P-003", None, 1).unwrap();
        cart.clear();
        assert_eq!(cart.total_units(), 0);
    }

    #[test]
    fn test_restore_sanitizes() {
        let raw = json!({
            "version": 1,
            "items": [
                { "productId": "P-001", "variantId": "A", "qty": 2 },
                { "productId": "P-001", "variantId": "A", "qty": "3" },
                { "productId": "", "qty": 1 },
                { "variantId": "A", "qty": 1 },
                { "productId": "P-002", "qty": 0 },
                { "productId": "P-003", "qty": 2.9, "variantId": 7 },
                "garbage"
            ]
        });
        let cart = Cart::restore(&raw);
        assert_eq!(cart.lines(), &[
            CartLine { product_id: "P-001".into(), variant_id: Some("A".into()), quantity: 5 },
            CartLine { product_id: "P-003".into(), variant_id: None, quantity: 2 },
        ]);
    }

    #[test]
    fn test_restore_other_versions_and_garbage() {
        let old = json!({ "version": 0, "items": [{ "productId": "P-001", "qty": 1 }] });
        assert_eq!(Cart::restore(&old).line_count(), 1);
        assert!(Cart::restore(&json!("nope")).is_empty());
        assert!(Cart::restore(&json!({ "items": {} })).is_empty());
    }

    #[test]
    fn test_snapshot_shape() {
        let mut cart = Cart::new();
        cart.add_item("P-001", None, 2).unwrap();
        let json = serde_json::to_value(cart.snapshot()).unwrap();
        assert_eq!(json, json!({ "version": 1, "items": [{ "productId": "P-001", "qty": 2 }] }));
        assert_eq!(Cart::restore(&json).lines(), cart.lines());
    }

    #[test]
    fn test_events_are_raised() {
        let mut cart = Cart::new();
        cart.add_item("P-001", None, 1).unwrap();
        cart.clear();
        assert_eq!(cart.take_events().len(), 2);
        assert!(cart.take_events().is_empty());
    }
}
