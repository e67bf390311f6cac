use crate::UrlError;
use url::{ParseError, Url};

/// Scheme assumed when a request URL carries none
const DEFAULT_SCHEME: &str = "https";

/// Prepares a raw request URL for fetching
///
/// # Preparation Steps
///
/// 1. Trim surrounding whitespace; reject if empty
/// 2. Parse the URL; a URL without a scheme is re-parsed as `https://...`
/// 3. Reject schemes other than HTTP and HTTPS
/// 4. Remove fragment (everything after #)
/// 5. Reject URLs without a host
///
/// # Examples
///
/// ```
/// use price_harvest::url::prepare_fetch_url;
///
/// let url = prepare_fetch_url("  example.com/item#reviews ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/item");
/// ```
pub fn prepare_fetch_url(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            let without_slashes = trimmed.trim_start_matches('/');
            Url::parse(&format!("{}://{}", DEFAULT_SCHEME, without_slashes))?
        }
        Err(e) => return Err(UrlError::Parse(e)),
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);

    if extract_host(&url).is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Extracts the lowercase host of a URL, used as the rate limiting key
///
/// Returns None if the URL has no host or the host is empty.
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}
