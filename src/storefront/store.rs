//! Store listing.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::domain::value_objects::Money;
use crate::media;
use crate::pricing::{self, PriceTier};
use crate::storefront::session::Session;

#[derive(Clone, Debug, Serialize)]
pub struct ProductCard {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub price: Money,
    pub price_display: String,
    pub tier: PriceTier,
    pub tier_label: &'static str,
    pub variant_summary: String,
    pub sold_out: bool,
    pub image: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct StoreView {
    pub session_label: String,
    pub can_see_wholesale: bool,
    pub cart_units: u64,
    pub products: Vec<ProductCard>,
}

impl StoreView {
    pub fn build(catalog: &Catalog, session: &Session, currency: &str) -> Self {
        let wholesale = session.role().can_see_wholesale();
        let products = catalog
            .products()
            .iter()
            .map(|product| {
                let quote = pricing::select_price(product, wholesale);
                let price = Money::new(quote.amount, currency);
                ProductCard {
                    id: product.id().to_string(),
                    slug: product.slug().to_string(),
                    title: product.title().to_string(),
                    price_display: price.to_string(),
                    price,
                    tier: quote.tier,
                    tier_label: quote.tier.label(),
                    variant_summary: match product.variants().len() {
                        0 => "Standard".to_string(),
                        n => format!("{n} variants"),
                    },
                    sold_out: product.is_sold_out(),
                    image: media::primary_image(product),
                }
            })
            .collect();

        Self {
            session_label: session.role().session_label(),
            can_see_wholesale: wholesale,
            cart_units: session.cart().total_units(),
            products,
        }
    }
}
