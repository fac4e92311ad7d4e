// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Author and excerpt extraction for accepted pingbacks.
//!
//! Both are display-only heuristics over the fetched source page. They never
//! influence validation, so plain substring and pattern scans are enough.

use regex::Regex;
use std::sync::LazyLock;

/// Bytes taken on each side of the link offset.
pub const EXCERPT_WINDOW: usize = 512;

/// Longest excerpt, in characters, before ellipsis markers are added.
pub const EXCERPT_MAX_CHARS: usize = 120;

/// Marker replacing a cut-off word at either end of an excerpt.
pub const ELLIPSIS: &str = "[...]";

static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("invalid title pattern")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<[a-zA-Z/!?][^>]*(?:>|$)").expect("invalid tag pattern")
});

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t]+").expect("invalid line break pattern"));

/// The page title, used as the pingback's author. Empty when there is none.
pub fn author(html: &str) -> String {
    TITLE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Plain-text excerpt of the markup surrounding byte offset `offset`.
pub fn excerpt(html: &str, offset: usize) -> String {
    let offset = floor_boundary(html, offset);
    let start = left_edge(html, offset);
    let end = right_edge(html, offset);

    let text = TAG.replace_all(&html[start..end], "");
    let text = LINE_BREAKS.replace_all(&text, " ");

    let text = center(&text, EXCERPT_MAX_CHARS);
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    mark_partial_words(text)
}

/// Start of the excerpt window, widened to the nearest tag end before it.
///
/// Looks at most one more window back. Failing that the cut edge stays,
/// skipping the tail of a tag it may have landed in.
fn left_edge(html: &str, offset: usize) -> usize {
    if offset <= EXCERPT_WINDOW {
        return 0;
    }
    let cut = floor_boundary(html, offset - EXCERPT_WINDOW);
    let reach = floor_boundary(html, cut.saturating_sub(EXCERPT_WINDOW));
    if let Some(i) = html[reach..cut].rfind('>') {
        return reach + i + 1;
    }

    let window = &html[cut..offset];
    match (window.find('>'), window.find('<')) {
        (Some(close), open) if open.map_or(true, |open| close < open) => cut + close + 1,
        _ => cut,
    }
}

/// End of the excerpt window, widened to the nearest tag start after it.
///
/// A tag left open at the cut edge is removed by tag stripping.
fn right_edge(html: &str, offset: usize) -> usize {
    let cut = ceil_boundary(html, offset.saturating_add(EXCERPT_WINDOW));
    if cut >= html.len() {
        return html.len();
    }
    let reach = ceil_boundary(html, cut.saturating_add(EXCERPT_WINDOW));
    html[cut..reach].find('<').map_or(cut, |i| cut + i)
}

/// Keep the middle `max` characters. Odd excess is taken from the left.
fn center(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    let excess = count - max;
    let cut_left = excess - excess / 2;
    text.chars().skip(cut_left).take(max).collect()
}

/// Replace the first and last words with [`ELLIPSIS`].
fn mark_partial_words(text: &str) -> String {
    let mut spaces = text.char_indices().filter(|(_, c)| c.is_whitespace());
    let Some((first, _)) = spaces.next() else {
        return text.to_string();
    };
    let (last, last_char) = spaces
        .last()
        .unwrap_or((first, text[first..].chars().next().unwrap_or(' ')));

    if last == first {
        return format!("{ELLIPSIS}{}", &text[first..]);
    }
    let middle = &text[first..last + last_char.len_utf8()];
    format!("{ELLIPSIS}{middle}{ELLIPSIS}")
}

fn floor_boundary(s: &str, i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let mut i = i;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(s: &str, i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let mut i = i;
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "http://x/t";

    fn offset_of(html: &str) -> usize {
        html.find(TARGET).unwrap()
    }

    #[test]
    fn test_author_from_title() {
        assert_eq!(author("<html><TITLE>\n  My   Blog\n</TITLE>"), "My Blog");
        assert_eq!(author("<p>untitled</p>"), "");
    }

    #[test]
    fn test_short_page_excerpt() {
        let html = r#"<p>Hello <a href="http://x/t">world</a> nice to see you here today friend</p>"#;
        let text = excerpt(html, offset_of(html));
        assert_eq!(text, "[...] world nice to see you here today [...]");
    }

    #[test]
    fn test_long_page_is_bounded_and_tag_free() {
        let filler = "<div>lorem ipsum dolor sit amet consectetur</div>\n\t".repeat(40);
        let html = format!(
            "{filler}<p>Hello <a href=\"http://x/t\">world</a> nice to see you here today friend</p>{filler}"
        );
        let text = excerpt(&html, offset_of(&html));

        assert!(!text.is_empty());
        assert!(!text.contains('<') && !text.contains('>'));
        assert!(!text.contains('\n') && !text.contains('\t'));
        assert!(text.contains("world"));
        assert!(text.starts_with(ELLIPSIS) && text.ends_with(ELLIPSIS));
        let body_len = text.chars().count() - 2 * ELLIPSIS.len();
        assert!(body_len <= EXCERPT_MAX_CHARS, "excerpt too long: {text}");
    }

    #[test]
    fn test_long_text_run_keeps_context() {
        let words: Vec<String> = (0..300).map(|i| format!("filler{i}")).collect();
        let words = words.join(" ");
        let html = format!(
            "<html><body>{words} <p>Hello <a href=\"http://x/t\">world</a> nice</p> {words}</body></html>"
        );
        let text = excerpt(&html, offset_of(&html));
        assert!(text.contains("filler299 Hello world nice filler0"), "lost context: {text}");
    }

    #[test]
    fn test_cut_inside_tag_is_skipped() {
        let attr = "x".repeat(600);
        let html = format!(r#"<div title="{attr}">Hello <a href="http://x/t">world</a> nice</div>"#);
        let text = excerpt(&html, offset_of(&html));
        assert!(!text.contains('x') && !text.contains('>'), "tag leaked: {text}");
        assert!(text.contains("world"));
    }

    #[test]
    fn test_center_takes_odd_excess_from_left() {
        assert_eq!(center("abcdefg", 4), "cdef");
        assert_eq!(center("abcdef", 4), "bcde");
        assert_eq!(center("abc", 4), "abc");
    }

    #[test]
    fn test_mark_partial_words() {
        assert_eq!(mark_partial_words("solo"), "solo");
        assert_eq!(mark_partial_words("two words"), "[...] words");
        assert_eq!(mark_partial_words("lo rem ip"), "[...] rem [...]");
    }

    #[test]
    fn test_multibyte_windows() {
        let html = format!("{}<a href=\"http://x/t\">ü</a>{}", "é".repeat(600), "ß".repeat(600));
        let text = excerpt(&html, offset_of(&html));
        assert!(text.chars().count() <= EXCERPT_MAX_CHARS);
    }
}
