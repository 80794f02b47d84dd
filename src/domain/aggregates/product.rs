//! Product Aggregate
//!
//! Catalog records are immutable once loaded; everything here is a read-side
//! helper over a product and its variants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Sku;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: String,
    title: String,
    slug: String,
    #[serde(rename = "desc", default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    prices: Prices,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    moq_wholesale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    moq_retail: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    variants: Vec<Variant>,
}

/// List prices. `reseller` is the wholesale price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prices {
    #[serde(with = "rust_decimal::serde::float")]
    pub retail: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reseller: Decimal,
}

impl Prices {
    pub fn new(retail: i64, reseller: i64) -> Self {
        Self { retail: Decimal::from(retail), reseller: Decimal::from(reseller) }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub attrs: VariantAttrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swatch_hex: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Variant {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), sku: None, attrs: VariantAttrs::default(), stock: None, images: vec![], swatch_hex: None }
    }

    pub fn with_sku(mut self, sku: Sku) -> Self { self.sku = Some(sku); self }
    pub fn with_color(mut self, color: impl Into<String>) -> Self { self.attrs.color = Some(color.into()); self }
    pub fn with_size(mut self, size: impl Into<String>) -> Self { self.attrs.size = Some(size.into()); self }
    pub fn with_stock(mut self, stock: u32) -> Self { self.stock = Some(stock); self }
    pub fn with_image(mut self, url: impl Into<String>) -> Self { self.images.push(url.into()); self }
    pub fn with_swatch(mut self, hex: impl Into<String>) -> Self { self.swatch_hex = Some(hex.into()); self }

    /// `Black / S`, or just whichever attribute is present.
    pub fn label(&self) -> String {
        [self.attrs.color.as_deref(), self.attrs.size.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    fn matches(&self, color: Option<&str>, size: Option<&str>) -> bool {
        let color_ok = color.map_or(true, |c| self.attrs.color.as_deref() == Some(c));
        let size_ok = size.map_or(true, |s| self.attrs.size.as_deref() == Some(s));
        color_ok && size_ok
    }
}

impl Product {
    pub fn new(id: impl Into<String>, title: impl Into<String>, slug: impl Into<String>, prices: Prices) -> Self {
        Self {
            id: id.into(), title: title.into(), slug: slug.into(), description: None, prices,
            images: vec![], stock: None, moq_wholesale: None, moq_retail: None, variants: vec![],
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self { self.description = Some(desc.into()); self }
    pub fn with_image(mut self, url: impl Into<String>) -> Self { self.images.push(url.into()); self }
    pub fn with_stock(mut self, stock: u32) -> Self { self.stock = Some(stock); self }
    pub fn with_moq(mut self, wholesale: Option<u32>, retail: Option<u32>) -> Self {
        self.moq_wholesale = wholesale;
        self.moq_retail = retail;
        self
    }
    pub fn with_variant(mut self, variant: Variant) -> Self { self.variants.push(variant); self }

    pub fn id(&self) -> &str { &self.id }
    pub fn title(&self) -> &str { &self.title }
    pub fn slug(&self) -> &str { &self.slug }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn prices(&self) -> &Prices { &self.prices }
    pub fn images(&self) -> &[String] { &self.images }
    pub fn stock(&self) -> Option<u32> { self.stock }
    pub fn moq_wholesale(&self) -> Option<u32> { self.moq_wholesale }
    pub fn moq_retail(&self) -> Option<u32> { self.moq_retail }
    pub fn variants(&self) -> &[Variant] { &self.variants }
    pub fn has_variants(&self) -> bool { !self.variants.is_empty() }

    pub fn find_variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Label shown on cart/checkout rows.
    pub fn variant_label(variant: Option<&Variant>) -> String {
        match variant.map(Variant::label) {
            Some(label) if !label.is_empty() => label,
            _ => "Standard".to_string(),
        }
    }

    /// Distinct colours in catalog order.
    pub fn colors(&self) -> Vec<&str> {
        distinct(self.variants.iter().filter_map(|v| v.attrs.color.as_deref()))
    }

    /// Distinct sizes in catalog order.
    pub fn sizes(&self) -> Vec<&str> {
        distinct(self.variants.iter().filter_map(|v| v.attrs.size.as_deref()))
    }

    /// Whether any variant matching the (partial) selection has stock.
    /// A variant without a stock figure counts as empty here.
    pub fn has_stock_for(&self, color: Option<&str>, size: Option<&str>) -> bool {
        self.variants.iter().any(|v| v.matches(color, size) && v.stock.unwrap_or(0) > 0)
    }

    /// Resolves a colour/size pick to a variant. Nothing is selected until the
    /// shopper has chosen at least one attribute.
    pub fn select_variant(&self, color: Option<&str>, size: Option<&str>) -> Option<&Variant> {
        if self.variants.is_empty() || (color.is_none() && size.is_none()) {
            return None;
        }
        self.variants.iter().find(|v| v.matches(color, size))
    }

    /// Units across all variants, or the product figure when there are none.
    pub fn total_stock(&self) -> u32 {
        if self.variants.is_empty() {
            self.stock.unwrap_or(0)
        } else {
            self.variants.iter().map(|v| v.stock.unwrap_or(0)).sum()
        }
    }

    pub fn is_sold_out(&self) -> bool { self.total_stock() == 0 }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for v in values {
        if !v.is_empty() && !out.contains(&v) { out.push(v); }
    }
    out
}
