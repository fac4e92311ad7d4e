// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pingback endpoint discovery.
//!
//! A pingable resource advertises its endpoint either with an `X-Pingback`
//! response header or with `<link rel="pingback" href="...">` in its markup.
//! Only the first few KB of the target are fetched, once.

use crate::codec::unescape;
use crate::transport::HttpClient;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Response header naming the endpoint.
pub const PINGBACK_HEADER: &str = "X-Pingback";

static LINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("invalid link tag pattern"));

static REL_PINGBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\brel\s*=\s*(?:"pingback"|'pingback'|pingback\b)"#)
        .expect("invalid rel pattern")
});

static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("invalid href pattern")
});

/// Find the pingback endpoint advertised by `target_uri`.
pub fn discover<C: HttpClient + ?Sized>(client: &C, target_uri: &str) -> Option<String> {
    let page = match client.fetch_partial(target_uri) {
        Ok(page) => page,
        Err(e) => {
            debug!(target = %target_uri, error = %e, "Discovery fetch failed");
            return None;
        }
    };

    if let Some(endpoint) = page.header(PINGBACK_HEADER).map(str::trim) {
        if !endpoint.is_empty() {
            debug!(target = %target_uri, endpoint = %endpoint, "Endpoint found in header");
            return Some(endpoint.to_string());
        }
    }

    let endpoint = endpoint_from_markup(&page.body);
    match &endpoint {
        Some(endpoint) => {
            debug!(target = %target_uri, endpoint = %endpoint, "Endpoint found in link element")
        }
        None => debug!(target = %target_uri, "No pingback endpoint advertised"),
    }
    endpoint
}

/// Extract the href of the first `<link rel="pingback">` element.
pub fn endpoint_from_markup(html: &str) -> Option<String> {
    LINK_TAG
        .find_iter(html)
        .map(|m| m.as_str())
        .filter(|tag| REL_PINGBACK.is_match(tag))
        .find_map(|tag| {
            let caps = HREF.captures(tag)?;
            let href = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
            let href = unescape(href.as_str().trim()).into_owned();
            (!href.is_empty()).then_some(href)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_attribute_order_and_quoting() {
        assert_eq!(
            endpoint_from_markup(r#"<head><link rel="pingback" href="http://e/y" /></head>"#),
            Some("http://e/y".to_string())
        );
        assert_eq!(
            endpoint_from_markup("<LINK HREF='http://e/z?a=1&amp;b=2' REL='pingback'>"),
            Some("http://e/z?a=1&b=2".to_string())
        );
        assert_eq!(
            endpoint_from_markup("<link rel=pingback href=http://e/w>"),
            Some("http://e/w".to_string())
        );
    }

    #[test]
    fn test_markup_ignores_other_links() {
        let html = r#"<link rel="stylesheet" href="/s.css"><link rel="pingbacks" href="/no">"#;
        assert_eq!(endpoint_from_markup(html), None);
    }
}
