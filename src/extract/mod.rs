//! Price extraction from raw page bytes
//!
//! This module contains the extraction side of the pipeline:
//! - `<meta>` microdata and Open Graph tags
//! - JSON-LD blocks
//! - JSON embedded in arbitrary scripts
//! - Currency-anchored text
//! - A keyword regex as last resort
//!
//! Strategies run in that order and the first one whose raw price survives
//! normalization decides the result.

mod json;
mod meta;
mod normalize;
mod text;

pub use normalize::{normalize_currency, parse_price};

use scraper::Html;
use std::borrow::Cow;
use std::cell::OnceCell;

/// Outcome of an extraction
///
/// When `found` is false, `price` is 0 and `currency` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Whole amount in the currency's major unit
    pub price: i64,

    /// Canonical currency code, or empty if none was detected
    pub currency: String,

    /// Whether any strategy produced a usable price
    pub found: bool,
}

impl ExtractionResult {
    /// The result returned when no strategy succeeds
    pub fn not_found() -> Self {
        Self {
            price: 0,
            currency: String::new(),
            found: false,
        }
    }
}

/// Raw price and currency strings as found in the markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawPrice {
    pub price: String,
    pub currency: String,
}

/// A page prepared once and shared by every strategy
///
/// The HTML tree is built on first use. Tag strategies consult
/// [`Page::has_tag`] first, so a page without `<meta>` or `<script>` tags is
/// never parsed.
pub(crate) struct Page<'a> {
    /// Lossily decoded page text, used by the regex strategies
    pub text: Cow<'a, str>,

    document: OnceCell<Html>,
}

impl<'a> Page<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            text: String::from_utf8_lossy(bytes),
            document: OnceCell::new(),
        }
    }

    /// Parsed HTML tree, used by the tag-based strategies
    pub fn document(&self) -> &Html {
        self.document
            .get_or_init(|| Html::parse_document(&self.text))
    }

    /// Returns true if the raw text contains an opening `<name` tag, ignoring case
    pub fn has_tag(&self, name: &str) -> bool {
        let needle = format!("<{}", name);
        self.text
            .as_bytes()
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
    }
}

type Strategy = fn(&Page<'_>) -> Option<RawPrice>;

/// Extraction strategies in priority order
const STRATEGIES: &[(&str, Strategy)] = &[
    ("meta", meta::extract_from_meta),
    ("json-ld", json::extract_from_json_ld),
    ("script-json", json::extract_from_script_json),
    ("currency-text", text::extract_from_currency_text),
    ("keyword", text::extract_from_keyword),
];

/// Extracts a normalized price and currency from HTML
///
/// The extractor is stateless and cheap to share across tasks.
///
/// # Example
///
/// ```
/// use price_harvest::extract::PriceExtractor;
///
/// let html = br#"<meta itemprop="priceCurrency" content="RUB"><meta itemprop="price" content="12 345">"#;
/// let result = PriceExtractor::new().extract(html);
/// assert!(result.found);
/// assert_eq!(result.price, 12345);
/// assert_eq!(result.currency, "RUB");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceExtractor;

impl PriceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Runs the strategy chain over `html`
    ///
    /// A strategy whose raw price fails normalization is skipped and the next
    /// one is tried. Empty input is never found.
    pub fn extract(&self, html: &[u8]) -> ExtractionResult {
        if html.is_empty() {
            return ExtractionResult::not_found();
        }

        let page = Page::new(html);

        for (name, strategy) in STRATEGIES {
            let Some(raw) = strategy(&page) else {
                continue;
            };

            match parse_price(&raw.price) {
                Some(price) => {
                    tracing::debug!("Price {} found by {} strategy", price, name);
                    return ExtractionResult {
                        price,
                        currency: normalize_currency(&raw.currency),
                        found: true,
                    };
                }
                None => {
                    tracing::trace!(
                        "Strategy {} produced unusable price {:?}",
                        name,
                        raw.price
                    );
                }
            }
        }

        ExtractionResult::not_found()
    }
}
