//! Product imagery: gallery fallbacks and generated SVG placeholders.

use url::form_urlencoded;

use crate::domain::aggregates::{Product, Variant};

pub const PLACEHOLDER_PATH: &str = "/media/placeholder.svg";
pub const DEFAULT_BG: &str = "#f3f4f6";
pub const DEFAULT_FG: &str = "#111827";

/// Swatch colour for a named colour, case-insensitive.
pub fn color_hex(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "black" => Some("#111827"),
        "white" => Some("#ffffff"),
        "natural" => Some("#e5e7eb"),
        "olive" => Some("#4b5563"),
        "navy" => Some("#1f2937"),
        "grey" | "gray" => Some("#9ca3af"),
        _ => None,
    }
}

/// URL of a generated placeholder tile.
pub fn placeholder_url(label: &str, bg: &str, fg: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("label", label)
        .append_pair("bg", bg)
        .append_pair("fg", fg)
        .finish();
    format!("{PLACEHOLDER_PATH}?{query}")
}

/// 800×800 tile with the label centred.
pub fn render_placeholder(label: &str, bg: &str, fg: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="800" height="800">
  <rect width="100%" height="100%" fill="{bg}"/>
  <text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle"
        font-size="28" font-family="sans-serif" fill="{fg}">
    {label}
  </text>
</svg>"#,
        bg = escape_attr(bg),
        fg = escape_attr(fg),
        label = escape_text(label),
    )
}

fn escape_text(s: &str) -> String { s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;") }

fn escape_attr(s: &str) -> String { escape_text(s).replace('"', "&quot;") }

/// Gallery for the current selection: the variant's own images, then the
/// product's, then a placeholder tinted with the variant colour.
pub fn images_for_selection(product: &Product, variant: Option<&Variant>) -> Vec<String> {
    if let Some(v) = variant {
        if !v.images.is_empty() { return v.images.clone(); }
    }
    if !product.images().is_empty() {
        return product.images().to_vec();
    }

    let label = match variant {
        Some(v) => {
            let attrs = format!(
                "{} {}",
                v.attrs.color.as_deref().unwrap_or_default(),
                v.attrs.size.as_deref().unwrap_or_default()
            );
            format!("{} • {}", product.title(), attrs.trim())
        }
        None => product.title().to_string(),
    };
    let bg = variant
        .and_then(|v| v.swatch_hex.clone().or_else(|| v.attrs.color.as_deref().and_then(color_hex).map(str::to_string)))
        .unwrap_or_else(|| DEFAULT_BG.to_string());
    let fg = if bg.eq_ignore_ascii_case("#111827") { "#ffffff" } else { DEFAULT_FG };
    vec![placeholder_url(&label, &bg, fg)]
}

/// Card image on the store listing.
pub fn primary_image(product: &Product) -> String {
    if let Some(first) = product.images().first() {
        return first.clone();
    }
    product
        .variants()
        .iter()
        .find_map(|v| v.images.first().cloned())
        .unwrap_or_else(|| placeholder_url(product.title(), DEFAULT_BG, DEFAULT_FG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Prices;

    fn bare() -> Product { Product::new("P-9", "Mug & Co", "mug", Prices::new(1, 1)) }

    #[test]
    fn test_color_hex() {
        assert_eq!(color_hex("Navy"), Some("#1f2937"));
        assert_eq!(color_hex("GRAY"), color_hex("grey"));
        assert_eq!(color_hex("teal"), None);
    }

    #[test]
    fn test_gallery_fallbacks() {
        let with_images = bare().with_image("/a.png");
        let v = Variant::new("V").with_color("Black").with_image("/v.png");
        assert_eq!(images_for_selection(&with_images, Some(&v)), vec!["/v.png".to_string()]);
        assert_eq!(images_for_selection(&with_images, Some(&Variant::new("W"))), vec!["/a.png".to_string()]);
        assert_eq!(images_for_selection(&with_images, None), vec!["/a.png".to_string()]);
    }

    #[test]
    fn test_placeholder_tinted_by_variant() {
        let v = Variant::new("V").with_color("Black").with_size("S");
        let gallery = images_for_selection(&bare(), Some(&v));
        assert_eq!(gallery.len(), 1);
        assert!(gallery[0].starts_with(PLACEHOLDER_PATH));
        assert!(gallery[0].contains("bg=%23111827"));
        assert!(gallery[0].contains("fg=%23ffffff"));
    }

    #[test]
    fn test_primary_image() {
        let p = bare().with_variant(Variant::new("V").with_image("/v.png"));
        assert_eq!(primary_image(&p), "/v.png");
        assert!(primary_image(&bare()).starts_with(PLACEHOLDER_PATH));
    }

    #[test]
    fn test_render_escapes_label() {
        let svg = render_placeholder("Mug & <Co>", DEFAULT_BG, DEFAULT_FG);
        assert!(svg.contains("Mug &amp; &lt;Co&gt;"));
        assert!(svg.contains(r##"fill="#f3f4f6""##));
    }
}
