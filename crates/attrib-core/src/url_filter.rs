//! Navigation filtering for ad and tracking traffic.

use std::sync::LazyLock;

use regex::Regex;

/// Hosts whose navigations are never logged (substring match on the host).
const FILTERED_DOMAINS: &[&str] = &[
    "doubleclick.net",
    "googleadservices.com",
    "googlesyndication.com",
    "google-analytics.com",
    "googletagmanager.com",
    "facebook.com",
    "facebook.net",
    "fbcdn.net",
    "twitter.com",
    "t.co",
    "linkedin.com",
    "adnxs.com",
    "adsrvr.org",
    "rubiconproject.com",
    "amazon-adsystem.com",
    "criteo.com",
    "outbrain.com",
    "taboola.com",
];

/// Scheme-and-authority prefix of an absolute URL. Group 1 is the host.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://(?:[^/?#@]*@)?(\[[^\]]*\]|[^/?#:]+)").unwrap()
});

/// Beacon-style endpoints that carry a query string.
static TRACKING_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:pixel|track|analytics|ads|ad|beacon|collect|log|stats|metrics)\?").unwrap()
});

/// Returns `true` when a navigation to `url` should be logged.
///
/// Unparseable URLs and `about:` pages are never logged.
pub fn should_log_navigation(url: &str) -> bool {
    let Some(host) = host_of(url) else {
        return false;
    };

    if let Some(domain) = FILTERED_DOMAINS.iter().copied().find(|d| host.contains(d)) {
        tracing::trace!(url, domain, "filtered navigation by domain");
        return false;
    }

    if TRACKING_PATH_RE.is_match(url) {
        tracing::trace!(url, "filtered navigation by tracking path");
        return false;
    }

    true
}

/// Lowercased host of an absolute URL.
fn host_of(url: &str) -> Option<String> {
    let caps = URL_RE.captures(url.trim())?;
    let host = caps.get(1)?.as_str();
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}
