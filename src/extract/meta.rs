//! Microdata and Open Graph `<meta>` price tags

use crate::extract::{Page, RawPrice};
use scraper::Selector;

/// Finds a price in `<meta>` tags
///
/// Recognized tags:
/// - `itemprop="price"` / `itemprop="priceCurrency"`
/// - `property="product:price:amount"` / `property="product:price:currency"`
/// - `property="og:price:amount"` / `property="og:price:currency"`
///
/// The first price tag decides the price; an empty one makes the strategy
/// decline. The first non-empty currency tag is attached to it whether it
/// appears before or after the price tag.
pub(crate) fn extract_from_meta(page: &Page) -> Option<RawPrice> {
    if !page.has_tag("meta") {
        return None;
    }

    let selector = Selector::parse("meta").ok()?;
    let mut price: Option<String> = None;
    let mut currency = String::new();

    for element in page.document().select(&selector) {
        let attrs = element.value();
        let content = attrs.attr("content").map(str::trim).unwrap_or_default();

        match classify(attrs.attr("itemprop"), attrs.attr("property")) {
            Some(MetaTag::Price) if price.is_none() => {
                if content.is_empty() {
                    return None;
                }
                price = Some(content.to_string());
            }
            Some(MetaTag::Currency) if currency.is_empty() && !content.is_empty() => {
                currency = content.to_string();
            }
            _ => {}
        }

        if price.is_some() && !currency.is_empty() {
            break;
        }
    }

    price.map(|price| RawPrice { price, currency })
}

enum MetaTag {
    Price,
    Currency,
}

/// Classifies a `<meta>` tag by its `itemprop` or `property` attribute
fn classify(itemprop: Option<&str>, property: Option<&str>) -> Option<MetaTag> {
    let itemprop = itemprop.map(|v| v.trim().to_lowercase()).unwrap_or_default();
    match itemprop.as_str() {
        "price" => return Some(MetaTag::Price),
        "pricecurrency" => return Some(MetaTag::Currency),
        _ => {}
    }

    let property = property.map(|v| v.trim().to_lowercase()).unwrap_or_default();
    match property.as_str() {
        "product:price:amount" | "og:price:amount" => Some(MetaTag::Price),
        "product:price:currency" | "og:price:currency" => Some(MetaTag::Currency),
        _ => None,
    }
}
