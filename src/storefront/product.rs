//! Product detail page: variant picking, remaining stock and the add-to-cart
//! gate.

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::domain::aggregates::{Cart, LineKey, Product, Variant};
use crate::domain::value_objects::{Money, StockLimit};
use crate::media;
use crate::pricing::{self, PriceTier, Shopper};

/// What the shopper has picked so far. Quantity defaults to 1; blank
/// values (`?color=&quantity=`) count as not chosen.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Selection {
    pub color: Option<String>,
    pub size: Option<String>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: Option<i64>,
}

impl Selection {
    pub fn color(&self) -> Option<&str> { chosen(&self.color) }
    pub fn size(&self) -> Option<&str> { chosen(&self.size) }
}

fn chosen(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Numbers from JSON bodies, strings from query strings.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(t)) if t.trim().is_empty() => Ok(None),
        Some(Raw::Text(t)) => t.trim().parse().map(Some).map_err(|_| de::Error::custom(format!("invalid quantity: {t:?}"))),
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct OptionChoice {
    pub value: String,
    pub available: bool,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct SelectedVariant {
    pub id: String,
    pub sku: Option<String>,
    pub label: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProductView {
    pub product_id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub session_label: String,
    pub tier: PriceTier,
    pub tier_label: &'static str,
    pub price: Money,
    pub price_display: String,
    pub colors: Vec<OptionChoice>,
    pub sizes: Vec<OptionChoice>,
    pub selected_variant: Option<SelectedVariant>,
    /// `Please select` until a variant is chosen, `Standard` without variants.
    pub variant_label: String,
    pub in_cart: u32,
    /// Finite stock left after what is already in the cart.
    pub remaining: Option<u32>,
    pub min_required: u32,
    pub quantity_min: u32,
    pub quantity: i64,
    pub suggested_quantity: u32,
    pub meets_minimum: bool,
    pub minimum_note: Option<String>,
    pub out_of_stock: bool,
    pub gallery: Vec<String>,
    pub can_add: bool,
    pub reason: Option<String>,
}

/// Reasons the add-to-cart button stays disabled.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AddRefusal {
    #[error("Please select a variant.")]
    SelectVariant,
    #[error("Out of stock for the selected option.")]
    OutOfStock,
    #[error("Quantity must be at least 1.")]
    NonPositive,
    #[error("Only {0} left.")]
    ExceedsRemaining(u32),
    #[error("{label}: {min} (below minimum)")]
    BelowMinimum { label: &'static str, min: u32 },
}

fn minimum_label(tier: PriceTier) -> &'static str {
    match tier {
        PriceTier::Wholesale => "Wholesale MOQ",
        PriceTier::Retail => "Retail minimum",
    }
}

struct Judgment<'a> {
    variant: Option<&'a Variant>,
    tier: PriceTier,
    in_cart: u32,
    remaining: StockLimit,
    min_required: u32,
    quantity: i64,
    meets_minimum: bool,
    out_of_stock: bool,
    refusal: Option<AddRefusal>,
}

fn judge<'a>(product: &'a Product, cart: &Cart, shopper: Shopper, selection: &Selection) -> Judgment<'a> {
    let tier = pricing::select_price(product, shopper.wholesale_visible).tier;
    let variant = product.select_variant(selection.color(), selection.size());
    let in_cart = cart.quantity_of(LineKey::new(product.id(), variant.map(|v| v.id.as_str())));
    let stock = pricing::resolve_stock(product, variant);
    let remaining = stock.remaining_after(in_cart);
    let min_required = pricing::resolve_minimum(product, tier);
    let quantity = selection.quantity.unwrap_or(1);
    let units = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
    let meets_minimum = units > 0 && pricing::meets_minimum(units, min_required);

    let picked = !product.has_variants() || variant.is_some();
    let out_of_stock = picked && (pricing::is_out_of_stock(stock) || remaining.is_exhausted());

    let refusal = if !picked {
        Some(AddRefusal::SelectVariant)
    } else if out_of_stock {
        Some(AddRefusal::OutOfStock)
    } else if quantity <= 0 {
        Some(AddRefusal::NonPositive)
    } else if pricing::is_over_stock(units, remaining) {
        Some(AddRefusal::ExceedsRemaining(remaining.finite().unwrap_or_default()))
    } else if !meets_minimum {
        Some(AddRefusal::BelowMinimum { label: minimum_label(tier), min: min_required })
    } else {
        None
    };

    Judgment { variant, tier, in_cart, remaining, min_required, quantity, meets_minimum, out_of_stock, refusal }
}

impl ProductView {
    pub fn build(product: &Product, cart: &Cart, shopper: Shopper, session_label: String, selection: &Selection, currency: &str) -> Self {
        let quote = pricing::select_price(product, shopper.wholesale_visible);
        let j = judge(product, cart, shopper, selection);
        let price = Money::new(quote.amount, currency);
        let sel_color = selection.color();
        let sel_size = selection.size();

        let colors = product
            .colors()
            .into_iter()
            .map(|c| OptionChoice { value: c.to_string(), available: product.has_stock_for(Some(c), sel_size), selected: sel_color == Some(c) })
            .collect();
        let sizes = product
            .sizes()
            .into_iter()
            .map(|s| OptionChoice { value: s.to_string(), available: product.has_stock_for(sel_color, Some(s)), selected: sel_size == Some(s) })
            .collect();

        let variant_label = match j.variant {
            Some(v) => Product::variant_label(Some(v)),
            None if product.has_variants() => "Please select".to_string(),
            None => "Standard".to_string(),
        };
        let meets_minimum = j.meets_minimum;
        let minimum_note = (j.min_required > j.tier.default_minimum()).then(|| {
            let suffix = if meets_minimum { "" } else { " (below minimum)" };
            format!("{}: {}{}", minimum_label(j.tier), j.min_required, suffix)
        });

        Self {
            product_id: product.id().to_string(),
            slug: product.slug().to_string(),
            title: product.title().to_string(),
            description: product.description().map(str::to_string),
            session_label,
            tier: quote.tier,
            tier_label: quote.tier.label(),
            price_display: price.to_string(),
            price,
            colors,
            sizes,
            selected_variant: j.variant.map(|v| SelectedVariant {
                id: v.id.clone(),
                sku: v.sku.as_ref().map(|s| s.to_string()),
                label: v.label(),
            }),
            variant_label,
            in_cart: j.in_cart,
            remaining: j.remaining.finite(),
            min_required: j.min_required,
            quantity_min: j.min_required.max(1),
            quantity: j.quantity,
            suggested_quantity: pricing::clamp_quantity(j.quantity, j.min_required, j.remaining),
            meets_minimum,
            minimum_note,
            out_of_stock: j.out_of_stock,
            gallery: media::images_for_selection(product, j.variant),
            can_add: j.refusal.is_none(),
            reason: j.refusal.map(|r| r.to_string()),
        }
    }
}

/// Adds the selection to the cart when the product page would allow it.
/// Returns the variant id that was added.
pub fn add_selection(product: &Product, cart: &mut Cart, shopper: Shopper, selection: &Selection) -> Result<Option<String>, AddRefusal> {
    let j = judge(product, cart, shopper, selection);
    if let Some(refusal) = j.refusal {
        return Err(refusal);
    }
    let variant_id = j.variant.map(|v| v.id.clone());
    let quantity = u32::try_from(j.quantity).map_err(|_| AddRefusal::NonPositive)?;
    cart.add_item(product.id(), variant_id.as_deref(), quantity).map_err(|_| AddRefusal::NonPositive)?;
    Ok(variant_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::domain::aggregates::Prices;

    fn pick(color: Option<&str>, size: Option<&str>, quantity: Option<i64>) -> Selection {
        Selection { color: color.map(Into::into), size: size.map(Into::into), quantity }
    }

    fn retail() -> Shopper { Shopper { authenticated: true, wholesale_visible: false } }
    fn retailer() -> Shopper { Shopper { authenticated: true, wholesale_visible: true } }

    #[test]
    fn test_requires_variant_selection() {
        let catalog = Catalog::builtin();
        let tee = catalog.find_by_slug("principle-tee-core-logo").unwrap();
        let view = ProductView::build(tee, &Cart::new(), retail(), "guest".into(), &Selection::default(), "IDR");
        assert_eq!(view.variant_label, "Please select");
        assert!(!view.can_add);
        assert_eq!(view.reason.as_deref(), Some("Please select a variant."));
        assert!(!view.out_of_stock);
        assert_eq!(view.gallery, vec!["/images/products/0.jpeg".to_string()]);
        assert_eq!(view.price_display, "Rp 199.000");
    }

    #[test]
    fn test_remaining_accounts_for_cart() {
        let catalog = Catalog::builtin();
        let tee = catalog.find_by_slug("principle-tee-core-logo").unwrap();
        let mut cart = Cart::new();
        cart.add_item("P-001", Some("P-001-BLK-S"), 8).unwrap();
        let view = ProductView::build(tee, &cart, retail(), "guest".into(), &pick(Some("Black"), Some("S"), Some(5)), "IDR");
        assert_eq!(view.in_cart, 8);
        assert_eq!(view.remaining, Some(2));
        assert_eq!(view.suggested_quantity, 2);
        assert_eq!(view.reason.as_deref(), Some("Only 2 left."));
        assert_eq!(view.gallery, vec!["/images/products/1.png".to_string()]);
    }

    #[test]
    fn test_sold_through_selection_is_out_of_stock() {
        let catalog = Catalog::builtin();
        let tee = catalog.find_by_slug("principle-tee-core-logo").unwrap();
        let mut cart = Cart::new();
        cart.add_item("P-001", Some("P-001-WHT-S"), 10).unwrap();
        let view = ProductView::build(tee, &cart, retail(), "guest".into(), &pick(Some("White"), Some("S"), None), "IDR");
        assert!(view.out_of_stock);
        assert_eq!(view.reason.as_deref(), Some("Out of stock for the selected option."));
    }

    #[test]
    fn test_wholesale_moq_note() {
        let catalog = Catalog::builtin();
        let cap = catalog.find_by_slug("principle-cap-minimal").unwrap();
        let view = ProductView::build(cap, &Cart::new(), retailer(), "guest".into(), &pick(Some("Navy"), None, Some(3)), "IDR");
        assert_eq!(view.tier, PriceTier::Wholesale);
        assert_eq!(view.minimum_note.as_deref(), Some("Wholesale MOQ: 12 (below minimum)"));
        assert_eq!(view.suggested_quantity, 12);
        assert!(!view.can_add);
        let ok = ProductView::build(cap, &Cart::new(), retailer(), "guest".into(), &pick(Some("Navy"), None, Some(12)), "IDR");
        assert!(ok.can_add);
        assert_eq!(ok.minimum_note.as_deref(), Some("Wholesale MOQ: 12"));
    }

    #[test]
    fn test_option_availability() {
        let product = Product::new("P-9", "Sock", "sock", Prices::new(10, 5))
            .with_variant(Variant::new("R-S").with_color("Red").with_size("S").with_stock(0))
            .with_variant(Variant::new("R-M").with_color("Red").with_size("M").with_stock(3));
        let view = ProductView::build(&product, &Cart::new(), retail(), "visitor".into(), &pick(None, Some("S"), None), "IDR");
        assert!(!view.colors[0].available);
        assert!(view.sizes.iter().any(|s| s.value == "M" && s.available));
        assert!(view.sizes.iter().any(|s| s.value == "S" && s.selected));
    }

    #[test]
    fn test_add_selection() {
        let catalog = Catalog::builtin();
        let tote = catalog.find_by_slug("principle-tote-everyday").unwrap();
        let mut cart = Cart::new();
        assert_eq!(
            add_selection(tote, &mut cart, retail(), &pick(Some("Natural"), None, Some(1))),
            Err(AddRefusal::BelowMinimum { label: "Retail minimum", min: 2 })
        );
        assert_eq!(add_selection(tote, &mut cart, retail(), &pick(Some("Natural"), None, Some(2))), Ok(Some("P-002-NAT-OS".into())));
        assert_eq!(add_selection(tote, &mut cart, retail(), &pick(Some("Natural"), None, Some(3))), Ok(Some("P-002-NAT-OS".into())));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_units(), 5);
    }

    #[test]
    fn test_plain_product_without_stock_is_unbounded() {
        let product = Product::new("P-9", "Sticker", "sticker", Prices::new(5_000, 3_000));
        let mut cart = Cart::new();
        let view = ProductView::build(&product, &cart, retail(), "visitor".into(), &pick(None, None, Some(500)), "IDR");
        assert_eq!(view.variant_label, "Standard");
        assert_eq!(view.remaining, None);
        assert!(view.can_add);
        assert_eq!(add_selection(&product, &mut cart, retail(), &pick(None, None, Some(500))), Ok(None));
    }

    fn from_query(query: &str) -> Selection {
        let uri: axum::http::Uri = format!("/p?{query}").parse().unwrap();
        axum::extract::Query::<Selection>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_blank_query_values_are_not_choices() {
        let selection = from_query("color=&size=S&quantity=");
        assert_eq!(selection.color(), None);
        assert_eq!(selection.size(), Some("S"));
        assert_eq!(selection.quantity, None);

        let catalog = Catalog::builtin();
        let tee = catalog.find_by_slug("principle-tee-core-logo").unwrap();
        let view = ProductView::build(tee, &Cart::new(), retail(), "guest".into(), &selection, "IDR");
        assert_eq!(view.selected_variant.as_ref().map(|v| v.id.as_str()), Some("P-001-BLK-S"));
        assert!(view.sizes.iter().all(|s| s.available));
        assert!(view.colors.iter().all(|c| !c.selected));
        assert_eq!(view.quantity, 1);
        assert!(view.can_add);
    }

    #[test]
    fn test_quantity_from_query_and_json() {
        assert_eq!(from_query("quantity=12").quantity, Some(12));
        assert!(axum::extract::Query::<Selection>::try_from_uri(&"/p?quantity=lots".parse().unwrap()).is_err());
        let body: Selection = serde_json::from_str(r#"{"color": "Navy", "quantity": 3}"#).unwrap();
        assert_eq!(body.quantity, Some(3));
        let blank: Selection = serde_json::from_str(r#"{"color": " ", "quantity": null}"#).unwrap();
        assert_eq!((blank.color(), blank.quantity), (None, None));
    }
}
