//! Trackable-URL predicate and hostname extraction.
//!
//! The background coordinator and every page timer decide "is this page
//! tracked, and under which domain" through [`trackable_domain`], so the two
//! sides can never disagree about a URL.

use url::Url;

use crate::types::{Domain, ValidationError};

/// URL prefixes of internal browser and extension pages.
const INTERNAL_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "edge://",
    "about:",
    "moz-extension://",
];

/// Returns `true` unless the URL is empty or points at an internal browser page.
pub fn is_trackable_url(url: &str) -> bool {
    !url.is_empty() && !INTERNAL_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
}

/// Extracts the hostname of a URL as a [`Domain`].
pub fn domain_from_url(url: &str) -> Result<Domain, ValidationError> {
    let malformed = || ValidationError::MalformedUrl {
        url: url.to_string(),
    };
    let parsed = Url::parse(url).map_err(|_| malformed())?;
    let host = parsed.host_str().filter(|h| !h.is_empty()).ok_or_else(malformed)?;
    Domain::new(host)
}

/// Resolves the domain to track for a URL, or `None` when it must not be tracked.
///
/// Malformed URLs and URLs without a hostname are treated as "do not track".
pub fn trackable_domain(url: &str) -> Option<Domain> {
    if !is_trackable_url(url) {
        return None;
    }
    domain_from_url(url).ok()
}
