// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound link scanning for the sender side.

use crate::codec::unescape;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?\bhref\s*=\s*(?:"([^"]+)"|'([^']+)'|([^\s"'>]+))"#)
        .expect("invalid anchor pattern")
});

/// Collect the distinct `href` values of all anchors, in first-seen order.
pub fn extract_links(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| unescape(m.as_str().trim()).into_owned())
        .filter(|href| !href.is_empty() && seen.insert(href.clone()))
        .collect()
}
