//! Domain events
use rust_decimal::Decimal;

use crate::domain::aggregates::role::{BaseRole, Badge};

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Session(SessionEvent),
    Cart(CartEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
    BaseRoleChanged { role: BaseRole },
    BadgeChanged { badge: Badge, enabled: bool },
    BadgeRemovalRefused { badge: Badge },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartEvent {
    ItemAdded { product_id: String, variant_id: Option<String>, quantity: u32 },
    QuantitySet { product_id: String, variant_id: Option<String>, quantity: u32 },
    ItemRemoved { product_id: String, variant_id: Option<String> },
    Cleared,
    Restored { lines: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrderEvent {
    Placed { order_id: String, total: Decimal, lines: usize },
}
