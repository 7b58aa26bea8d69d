//! Catalog product as exposed by the storefront's public product feed
//!
//! Shape follows `GET /products.json`. Numeric fields that some stores emit as
//! strings (prices, weights) are normalized to strings; tags may arrive either
//! as a JSON array or as one comma-separated string.

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level feed document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFeed {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
    /// Raw HTML description
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub compare_at_price: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub weight: Option<String>,
    #[serde(default)]
    pub grams: Option<u64>,
    #[serde(default)]
    pub weight_unit: Option<String>,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    #[serde(default)]
    pub inventory_management: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: u64,
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub values: Vec<String>,
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Joined(String),
        Missing(()),
    }

    Ok(match Tags::deserialize(deserializer)? {
        Tags::List(tags) => tags,
        Tags::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect(),
        Tags::Missing(()) => Vec::new(),
    })
}

fn deserialize_loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_maps_known_shape() {
        let feed: ProductFeed = serde_json::from_str(
            r#"{
                "products": [{
                    "id": 101,
                    "title": "Linen Shirt",
                    "handle": "linen-shirt",
                    "body_html": "<p>Breathable.</p>",
                    "vendor": "Brand",
                    "product_type": "Shirts",
                    "tags": ["linen", "summer"],
                    "published_at": "2024-03-01T10:00:00-05:00",
                    "variants": [{
                        "id": 9001,
                        "title": "M",
                        "price": "49.00",
                        "compare_at_price": null,
                        "sku": "LS-M",
                        "grams": 250,
                        "available": true
                    }],
                    "images": [{"id": 1, "src": "https://cdn.example.com/a.jpg", "width": 800, "height": 600, "position": 1}],
                    "options": [{"name": "Size", "position": 1, "values": ["S", "M", "L"]}]
                }]
            }"#,
        )
        .expect("feed parses");

        let product = &feed.products[0];
        assert_eq!(product.handle, "linen-shirt");
        assert_eq!(product.tags, vec!["linen", "summer"]);
        assert_eq!(product.variants[0].price.as_deref(), Some("49.00"));
        assert_eq!(product.variants[0].grams, Some(250));
        assert_eq!(product.variants[0].compare_at_price, None);
        assert_eq!(product.images[0].width, Some(800));
        assert_eq!(product.options[0].values.len(), 3);
    }

    #[test]
    fn test_comma_separated_tags() {
        let product: Product =
            serde_json::from_str(r#"{"id": 7, "tags": "eco, cotton ,, kids"}"#).expect("parses");
        assert_eq!(product.tags, vec!["eco", "cotton", "kids"]);
        assert!(product.variants.is_empty());
    }

    #[test]
    fn test_numeric_price_is_normalized() {
        let variant: ProductVariant =
            serde_json::from_str(r#"{"id": 1, "price": 12.5}"#).expect("parses");
        assert_eq!(variant.price.as_deref(), Some("12.5"));
    }
}
