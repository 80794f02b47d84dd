//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod role;

pub use product::{Prices, Product, Variant, VariantAttrs};
pub use order::{Address, LineItem, Order, OrderError, OrderStatus};
pub use cart::{Cart, CartError, CartLine, CartSnapshot, LineKey};
pub use role::{BaseRole, Badge, Capability, RoleError, RoleState};
