//! Order Aggregate
//!
//! Orders are simulated: placing one records the priced lines and the
//! shipping details, nothing is charged and no stock moves.

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Money;
use crate::pricing::PriceTier;

#[derive(Clone, Debug, Serialize)]
pub struct Order {
    id: String,
    status: OrderStatus,
    items: Vec<LineItem>,
    subtotal: Money,
    shipping: Money,
    total: Money,
    shipping_address: Address,
    placed_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineItem {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub title: String,
    pub variant_label: String,
    pub tier: PriceTier,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
    pub company: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Placed }

impl Order {
    pub fn place(items: Vec<LineItem>, shipping_address: Address, currency: &str, placed_at: DateTime<Utc>) -> Result<Self, OrderError> {
        if items.is_empty() { return Err(OrderError::NoItems); }
        let subtotal = items.iter().try_fold(Money::zero(currency), |acc, i| acc.add(&i.total)).map_err(|_| OrderError::CurrencyMismatch)?;
        let shipping = Money::zero(currency);
        let total = subtotal.add(&shipping).map_err(|_| OrderError::CurrencyMismatch)?;
        let mut order = Self {
            id: order_id(placed_at), status: OrderStatus::Placed, items, subtotal, shipping, total,
            shipping_address, placed_at, events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed {
            order_id: order.id.clone(), total: order.total.amount(), lines: order.items.len(),
        }));
        Ok(order)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn total(&self) -> &Money { &self.total }
    pub fn shipping_address(&self) -> &Address { &self.shipping_address }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

/// `ORD-` followed by the placement time in epoch millis, base 36, upper case.
pub fn order_id(at: DateTime<Utc>) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
    let mut buf = Vec::new();
    loop {
        buf.push(DIGITS[(millis % 36) as usize]);
        millis /= 36;
        if millis == 0 { break; }
    }
    buf.reverse();
    format!("ORD-{}", String::from_utf8_lossy(&buf))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("No items")]
    NoItems,
    #[error("Currency mismatch")]
    CurrencyMismatch,
}
