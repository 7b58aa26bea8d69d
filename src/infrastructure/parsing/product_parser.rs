//! Product feed mapping and hero product heuristics

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector, node::Node};

use super::document::{
    attr, char_len, compile_pattern, compile_selector, compile_selectors, normalized_text,
    select_first,
};
use super::error::{ParsingError, ParsingResult};
use crate::domain::{HeroProduct, Product, ProductFeed, StoreUrl};
use crate::infrastructure::config::defaults::{MAX_HERO_PRODUCTS, MAX_PRODUCT_LINKS_SCANNED};

const MIN_DESCRIPTION_CHARS: usize = 10;

static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_selectors(&[
        r#"[class*="hero"] [class*="product"]"#,
        r#"[class*="featured"] [class*="product"]"#,
        r#"[class*="banner"] [class*="product"]"#,
        r#"[class*="slider"] [class*="product"]"#,
        r#"[class*="carousel"] [class*="product"]"#,
        ".product-item",
        ".product-card",
        ".product-tile",
        "[data-product-id]",
        "[data-product-handle]",
    ])
});

static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_selectors(&[
        r#"[class*="title"]"#,
        r#"[class*="name"]"#,
        "h1",
        "h2",
        "h3",
        "h4",
    ])
});

static PRICE_SELECTORS: Lazy<Vec<Selector>> =
    Lazy::new(|| compile_selectors(&[r#"[class*="price"]"#, "[data-price]"]));

static DESCRIPTION_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_selectors(&[r#"[class*="description"]"#, r#"[class*="summary"]"#, "p"])
});

static IMAGE: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("img"));
static ANCHOR: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("a[href]"));
static PRODUCT_LINKS: Lazy<Option<Selector>> =
    Lazy::new(|| compile_selector(r#"a[href*="/products/"]"#));

static PRICE: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern(r"[$₹€£]?\s*\d[\d,]*(?:\.\d+)?"));
static CURRENCY_PRICE: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern(r"[$₹€£]\s*\d[\d,]*(?:\.\d+)?"));

/// Maps a `/products.json` body onto the catalog
pub fn parse_product_feed(body: &str) -> ParsingResult<Vec<Product>> {
    serde_json::from_str::<ProductFeed>(body)
        .map(|feed| feed.products)
        .map_err(|e| ParsingError::malformed_json("products.json", e))
}

/// Featured products from homepage markup: product containers first, then
/// product links. Deduplicated and capped.
pub fn extract_hero_products(html: &str, base: &StoreUrl) -> Vec<HeroProduct> {
    let document = Html::parse_document(html);
    let mut heroes: Vec<HeroProduct> = Vec::new();

    let from_containers = CONTAINERS
        .iter()
        .flat_map(|selector| document.select(selector))
        .filter_map(|container| hero_from_container(container, base));

    let from_links = PRODUCT_LINKS
        .as_ref()
        .into_iter()
        .flat_map(|selector| document.select(selector).take(MAX_PRODUCT_LINKS_SCANNED))
        .filter_map(|link| hero_from_link(link, base));

    for hero in from_containers.chain(from_links) {
        if heroes.len() >= MAX_HERO_PRODUCTS {
            break;
        }
        if !heroes.contains(&hero) {
            heroes.push(hero);
        }
    }
    heroes
}

fn image_source(element: ElementRef<'_>) -> Option<&str> {
    attr(element, "src").or_else(|| attr(element, "data-src"))
}

fn hero_from_container(container: ElementRef<'_>, base: &StoreUrl) -> Option<HeroProduct> {
    let title = select_first(container, &TITLE_SELECTORS)
        .map(normalized_text)
        .filter(|text| !text.is_empty());

    let price = select_first(container, &PRICE_SELECTORS).and_then(|element| {
        let text = normalized_text(element);
        PRICE
            .as_ref()
            .and_then(|pattern| pattern.find(&text))
            .map(|found| found.as_str().trim().to_string())
    });

    let image = IMAGE
        .as_ref()
        .and_then(|selector| container.select(selector).next())
        .and_then(image_source)
        .and_then(|src| base.join(src));

    let url = ANCHOR
        .as_ref()
        .and_then(|selector| container.select(selector).next())
        .and_then(|link| attr(link, "href"))
        .and_then(|href| base.join(href));

    let description = DESCRIPTION_SELECTORS.iter().find_map(|selector| {
        container
            .select(selector)
            .next()
            .map(normalized_text)
            .filter(|text| char_len(text) > MIN_DESCRIPTION_CHARS)
    });

    let hero = HeroProduct {
        title,
        price,
        image,
        url,
        description,
    };
    hero.is_acceptable().then_some(hero)
}

fn hero_from_link(link: ElementRef<'_>, base: &StoreUrl) -> Option<HeroProduct> {
    let img = IMAGE
        .as_ref()
        .and_then(|selector| link.select(selector).next());

    let title = Some(normalized_text(link))
        .filter(|text| !text.is_empty())
        .or_else(|| img.and_then(|img| attr(img, "alt")).map(str::to_string));

    let price = link
        .parent()
        .and_then(ElementRef::wrap)
        .and_then(sibling_price);

    let hero = HeroProduct {
        title,
        price,
        image: img.and_then(image_source).and_then(|src| base.join(src)),
        url: attr(link, "href").and_then(|href| base.join(href)),
        description: None,
    };
    hero.is_acceptable().then_some(hero)
}

/// First currency-prefixed amount among the text nodes under `parent`
fn sibling_price(parent: ElementRef<'_>) -> Option<String> {
    let pattern = CURRENCY_PRICE.as_ref()?;
    parent.descendants().find_map(|node| match node.value() {
        Node::Text(text) => pattern.find(text).map(|found| found.as_str().trim().to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> StoreUrl {
        StoreUrl::parse("https://brand.example.com").expect("valid")
    }

    #[test]
    fn test_parse_product_feed() {
        let products = parse_product_feed(
            r#"{"products": [
                {"id": 1, "title": "Canvas Tote", "handle": "canvas-tote", "tags": ["bags"],
                 "variants": [{"id": 11, "title": "Default", "price": "24.00", "available": true}],
                 "images": [], "options": []}
            ]}"#,
        )
        .expect("valid feed");

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].handle, "canvas-tote");
        assert_eq!(products[0].variants[0].price.as_deref(), Some("24.00"));
    }

    #[test]
    fn test_malformed_feed_is_an_error() {
        let err = parse_product_feed("<html>not json</html>").expect_err("html is not a feed");
        assert!(matches!(err, ParsingError::MalformedJson { .. }));
    }

    #[test]
    fn test_hero_products_from_featured_section() {
        let heroes = extract_hero_products(
            r#"
            <html><body>
              <section class="featured-collection">
                <div class="product-card">
                  <a href="/products/canvas-tote"><img src="//cdn.example.com/tote.jpg" alt="Tote"></a>
                  <h3 class="product-card__title">Canvas Tote</h3>
                  <span class="price">Sale $24.00 USD</span>
                  <p>Heavyweight organic canvas with inner pocket.</p>
                </div>
              </section>
            </body></html>
            "#,
            &base(),
        );

        assert_eq!(heroes.len(), 2);
        let card = &heroes[0];
        assert_eq!(card.title.as_deref(), Some("Canvas Tote"));
        assert_eq!(card.price.as_deref(), Some("$24.00"));
        assert_eq!(card.image.as_deref(), Some("https://cdn.example.com/tote.jpg"));
        assert_eq!(
            card.url.as_deref(),
            Some("https://brand.example.com/products/canvas-tote")
        );
        assert_eq!(
            card.description.as_deref(),
            Some("Heavyweight organic canvas with inner pocket.")
        );

        let link = &heroes[1];
        assert_eq!(link.title.as_deref(), Some("Tote"));
        assert_eq!(link.url, card.url);
        assert_eq!(link.price.as_deref(), Some("$24.00"));
    }

    #[test]
    fn test_product_link_price_needs_currency() {
        let heroes = extract_hero_products(
            r#"<html><body><ul>
                 <li><a href="/products/mug">Enamel Mug</a> <span>€18,50</span></li>
                 <li><a href="/products/cap">Cap</a> <span>Only 3 left</span></li>
               </ul></body></html>"#,
            &base(),
        );

        assert_eq!(heroes.len(), 2);
        assert_eq!(heroes[0].price.as_deref(), Some("€18,50"));
        assert_eq!(heroes[1].price, None);
    }

    #[test]
    fn test_hero_cap_and_dedupe() {
        let cards: String = (0..30)
            .map(|i| {
                format!(r#"<div class="product-item"><a href="/products/item-{i}">Item {i}</a></div>"#)
            })
            .collect();
        let duplicated = format!("<html><body>{cards}{cards}</body></html>");

        let heroes = extract_hero_products(&duplicated, &base());
        assert_eq!(heroes.len(), MAX_HERO_PRODUCTS);
        assert_eq!(heroes[0].title.as_deref(), None);
        assert_eq!(
            heroes[0].url.as_deref(),
            Some("https://brand.example.com/products/item-0")
        );
    }
}
