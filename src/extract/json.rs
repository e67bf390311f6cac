//! JSON-based strategies: JSON-LD blocks and ad-hoc JSON embedded in scripts
//!
//! Both strategies share one depth-first search over `serde_json::Value`.
//! Malformed JSON is never an error; the candidate simply contributes nothing.

use crate::extract::{Page, RawPrice};
use scraper::Selector;
use serde_json::{Map, Value};

/// Key aliases consulted while searching a JSON graph
pub(crate) struct KeySet {
    pub price: &'static [&'static str],
    pub currency: &'static [&'static str],
}

/// schema.org keys used by JSON-LD product markup
pub(crate) const JSON_LD_KEYS: KeySet = KeySet {
    price: &["price"],
    currency: &["priceCurrency", "price_currency", "currency"],
};

/// Broader aliases seen in storefront state blobs
pub(crate) const EMBEDDED_KEYS: KeySet = KeySet {
    price: &[
        "price",
        "priceValue",
        "price_value",
        "priceNumeric",
        "price_num",
        "amount",
        "value",
    ],
    currency: &[
        "priceCurrency",
        "price_currency",
        "currency",
        "currencyCode",
        "currency_code",
        "currencyId",
        "currency_id",
    ],
};

/// Finds a price in `<script type="application/ld+json">` blocks
pub(crate) fn extract_from_json_ld(page: &Page) -> Option<RawPrice> {
    if !page.has_tag("script") {
        return None;
    }
    let selector = Selector::parse("script").ok()?;

    page.document()
        .select(&selector)
        .filter(|element| {
            element
                .value()
                .attr("type")
                .map(|t| t.to_lowercase().contains("ld+json"))
                .unwrap_or(false)
        })
        .find_map(|element| {
            let raw = element.text().collect::<String>();
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            let value: Value = serde_json::from_str(raw).ok()?;
            find_price_currency(&value, &JSON_LD_KEYS)
        })
}

/// Finds a price in JSON embedded in any `<script>` body
pub(crate) fn extract_from_script_json(page: &Page) -> Option<RawPrice> {
    if !page.has_tag("script") {
        return None;
    }
    let selector = Selector::parse("script").ok()?;

    page.document().select(&selector).find_map(|element| {
        let raw = element.text().collect::<String>();
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        parse_embedded_json(raw)
    })
}

/// Parses a script body as JSON, falling back to its outermost `{...}` fragment
pub(crate) fn parse_embedded_json(raw: &str) -> Option<RawPrice> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        if let Some(found) = find_price_currency(&value, &EMBEDDED_KEYS) {
            return Some(found);
        }
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }

    let fragment = raw[start..=end].trim();
    let value: Value = serde_json::from_str(fragment).ok()?;
    find_price_currency(&value, &EMBEDDED_KEYS)
}

/// Depth-first search for a price and its sibling currency
///
/// An object holding a price key answers for itself: a scalar price is
/// returned with the first currency alias present, anything else ends the
/// search of that object. Otherwise `offers` is searched before the remaining
/// members, in document order.
pub(crate) fn find_price_currency(value: &Value, keys: &KeySet) -> Option<RawPrice> {
    match value {
        Value::Object(map) => {
            if let Some(price) = first_key(map, keys.price) {
                let price = scalar_to_string(price);
                if price.is_empty() {
                    return None;
                }
                let currency = first_key(map, keys.currency)
                    .map(scalar_to_string)
                    .unwrap_or_default();
                return Some(RawPrice { price, currency });
            }

            if let Some(found) = map
                .get("offers")
                .and_then(|offers| find_price_currency(offers, keys))
            {
                return Some(found);
            }

            map.iter()
                .filter(|(key, _)| key.as_str() != "offers")
                .find_map(|(_, child)| find_price_currency(child, keys))
        }
        Value::Array(items) => items
            .iter()
            .find_map(|item| find_price_currency(item, keys)),
        _ => None,
    }
}

fn first_key<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

/// Renders a JSON scalar as a price or currency string
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
