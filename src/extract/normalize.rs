//! Price and currency normalization
//!
//! Both functions are pure and accept the raw strings produced by the
//! extraction strategies.

/// Tokens removed from a raw price before digits are collected
///
/// `руб.` must precede `руб` so the abbreviation's dot is not mistaken for a
/// decimal separator.
const PRICE_NOISE: &[&str] = &[
    "\u{00A0}", " ", "₽", "руб.", "руб", "RUB", "RUR", "USD", "EUR", "$", "€",
];

/// Parses a raw price string into a whole number of major currency units
///
/// # Normalization Steps
///
/// 1. Trim; reject if empty
/// 2. Strip non-breaking spaces, spaces and known currency tokens
/// 3. Convert commas to dots
/// 4. Keep only digits and dots
/// 5. If several dots remain, every dot but the last is a thousands separator
/// 6. Parse as a float; reject failures and values <= 0
/// 7. Round half up to the nearest integer; reject results that round to 0
///
/// # Examples
///
/// ```
/// use price_harvest::extract::parse_price;
///
/// assert_eq!(parse_price(" 1 234,56 "), Some(1235));
/// assert_eq!(parse_price("1.234.56"), Some(1235));
/// assert_eq!(parse_price("RUB 2 000"), Some(2000));
/// assert_eq!(parse_price("0"), None);
/// ```
pub fn parse_price(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut stripped = trimmed.to_string();
    for token in PRICE_NOISE {
        stripped = stripped.replace(token, "");
    }
    let stripped = stripped.replace(',', ".");

    let mut clean: String = stripped
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if clean.is_empty() {
        return None;
    }

    if let Some(last_dot) = clean.rfind('.') {
        if clean[..last_dot].contains('.') {
            let integer: String = clean[..last_dot].chars().filter(|c| *c != '.').collect();
            clean = format!("{}{}", integer, &clean[last_dot..]);
        }
    }

    let value: f64 = clean.parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    let rounded = (value + 0.5).floor() as i64;
    (rounded > 0).then_some(rounded)
}

/// Maps a raw currency string to its canonical code
///
/// Empty input stays empty. `RUR` and anything carrying a ruble marker become
/// `RUB`; everything else is returned trimmed and uppercased.
///
/// # Examples
///
/// ```
/// use price_harvest::extract::normalize_currency;
///
/// assert_eq!(normalize_currency("RUR"), "RUB");
/// assert_eq!(normalize_currency("usd"), "USD");
/// assert_eq!(normalize_currency(""), "");
/// ```
pub fn normalize_currency(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return upper;
    }

    if upper == "RUR" || upper.contains("RUB") || upper.contains('₽') || upper.contains("РУБ") {
        return "RUB".to_string();
    }

    upper
}
