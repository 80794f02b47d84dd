//! Static catalog and location tables.
//!
//! Both are built once at startup and shared read-only behind an `Arc`.

pub mod locations;

use crate::domain::aggregates::{Prices, Product, Variant};
use crate::domain::value_objects::Sku;
use crate::pricing::ProductLookup;

pub use locations::{Country, Locations};

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self { Self { products } }

    /// The PRINCIPLE merchandise line.
    pub fn builtin() -> Self {
        Self::new(vec![tee(), tote(), cap()])
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug() == slug)
    }
}

impl ProductLookup for Catalog {
    fn product(&self, id: &str) -> Option<&Product> { self.find_by_id(id) }
}

const GENERIC_IMAGE: &str = "/images/products/0.jpeg";
const DARK_IMAGE: &str = "/images/products/1.png";
const LIGHT_IMAGE: &str = "/images/products/2.png";

fn variant(id: &str, sku: &str, color: &str, size: &str, stock: u32, image: &str, swatch: &str) -> Variant {
    let v = Variant::new(id).with_color(color).with_size(size).with_stock(stock).with_image(image).with_swatch(swatch);
    match Sku::new(sku) {
        Ok(sku) => v.with_sku(sku),
        Err(_) => v,
    }
}

fn tee() -> Product {
    Product::new("P-001", "PRINCIPLE Tee — Core Logo", "principle-tee-core-logo", Prices::new(199_000, 139_000))
        .with_description("200 gsm cotton tee with the PRINCIPLE core logotype.")
        .with_image(GENERIC_IMAGE)
        .with_stock(120)
        .with_moq(Some(12), Some(1))
        .with_variant(variant("P-001-BLK-S", "TEE-CORE-BLK-S", "Black", "S", 10, DARK_IMAGE, "#111827"))
        .with_variant(variant("P-001-BLK-M", "TEE-CORE-BLK-M", "Black", "M", 20, DARK_IMAGE, "#111827"))
        .with_variant(variant("P-001-BLK-L", "TEE-CORE-BLK-L", "Black", "L", 20, DARK_IMAGE, "#111827"))
        .with_variant(variant("P-001-WHT-S", "TEE-CORE-WHT-S", "White", "S", 10, LIGHT_IMAGE, "#ffffff"))
        .with_variant(variant("P-001-WHT-M", "TEE-CORE-WHT-M", "White", "M", 30, LIGHT_IMAGE, "#ffffff"))
        .with_variant(variant("P-001-WHT-L", "TEE-CORE-WHT-L", "White", "L", 30, LIGHT_IMAGE, "#ffffff"))
}

fn tote() -> Product {
    Product::new("P-002", "PRINCIPLE Tote — Everyday", "principle-tote-everyday", Prices::new(149_000, 99_000))
        .with_description("Heavy canvas tote for daily carry.")
        .with_image(GENERIC_IMAGE)
        .with_stock(80)
        .with_moq(Some(6), Some(2))
        .with_variant(variant("P-002-NAT-OS", "TOTE-NAT-OS", "Natural", "OS", 50, LIGHT_IMAGE, "#E5E7EB"))
        .with_variant(variant("P-002-BLK-OS", "TOTE-BLK-OS", "Black", "OS", 30, DARK_IMAGE, "#111827"))
}

fn cap() -> Product {
    Product::new("P-003", "PRINCIPLE Cap — Minimal", "principle-cap-minimal", Prices::new(229_000, 159_000))
        .with_description("Unstructured 6-panel cap with subtle embroidery.")
        .with_image(GENERIC_IMAGE)
        .with_stock(60)
        .with_moq(Some(12), Some(1))
        .with_variant(variant("P-003-OLV-OS", "CAP-OLV-OS", "Olive", "OS", 25, LIGHT_IMAGE, "#4B5563"))
        .with_variant(variant("P-003-NVY-OS", "CAP-NVY-OS", "Navy", "OS", 35, DARK_IMAGE, "#1F2937"))
}
