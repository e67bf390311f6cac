//! Regex strategies over the raw page text

use crate::extract::{Page, RawPrice};
use regex::Regex;
use std::sync::LazyLock;

/// Currency-anchored patterns in the order they are tried
///
/// Each currency is tried with the token before the number, then after it.
static CURRENCY_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)(?:rub|rur)\s*([0-9][0-9\s.,]{0,20})", "RUB"),
        (r"(?i)([0-9][0-9\s.,]{0,20})\s*(?:rub|rur)", "RUB"),
        (r"(?i)(?:usd|\$|dollars?)\s*([0-9][0-9\s.,]{0,20})", "USD"),
        (r"(?i)([0-9][0-9\s.,]{0,20})\s*(?:usd|\$|dollars?)", "USD"),
        (r"(?i)(?:eur|euros?)\s*([0-9][0-9\s.,]{0,20})", "EUR"),
        (r"(?i)([0-9][0-9\s.,]{0,20})\s*(?:eur|euros?)", "EUR"),
    ]
    .into_iter()
    .map(|(pattern, currency)| {
        (
            Regex::new(pattern).expect("currency pattern is a valid regex"),
            currency,
        )
    })
    .collect()
});

/// `price`/`amount` followed closely by a numeric run
static KEYWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:price|amount)[^0-9]{0,20}([0-9][0-9\s.,]{0,20})")
        .expect("keyword pattern is a valid regex")
});

/// Finds a number adjacent to a RUB, USD or EUR token
pub(crate) fn extract_from_currency_text(page: &Page) -> Option<RawPrice> {
    CURRENCY_PATTERNS.iter().find_map(|(pattern, currency)| {
        let captures = pattern.captures(&page.text)?;
        Some(RawPrice {
            price: captures.get(1)?.as_str().to_string(),
            currency: currency.to_string(),
        })
    })
}

/// Last resort: a number following a `price` or `amount` keyword, without currency
pub(crate) fn extract_from_keyword(page: &Page) -> Option<RawPrice> {
    let captures = KEYWORD_PATTERN.captures(&page.text)?;
    Some(RawPrice {
        price: captures.get(1)?.as_str().to_string(),
        currency: String::new(),
    })
}
