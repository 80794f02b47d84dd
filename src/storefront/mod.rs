//! Session-scoped storefront views: store listing, product detail, cart and
//! checkout, each rendered from the pricing rules for one session.

pub mod cart;
pub mod checkout;
pub mod product;
pub mod session;
pub mod store;

pub use cart::{CartRow, CartView};
pub use checkout::{place_order, CheckoutError, CheckoutForm, CheckoutSummary, FieldIssue};
pub use product::{add_selection, AddRefusal, ProductView, Selection};
pub use session::{Session, SessionStore, SessionSummary};
pub use store::{ProductCard, StoreView};
