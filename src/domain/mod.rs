//! Storefront domain: catalog records, cart, role state and orders.
pub mod aggregates;
pub mod events;
pub mod value_objects;
