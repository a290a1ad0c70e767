//! Rewrites applied to stylesheet text.
//!
//! Both `<style>` contents and `style` attribute values pass through here.
//! Each rewrite returns the new text and the number of replacements.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::rules::{SYSTEM_FONT_STACK, mentions_font_cdn};

pub const FONT_FACE_MARKER: &str = "/* @font-face removed */";

#[allow(clippy::expect_used)]
static FONT_FACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)@font-face\s*\{[^}]*\}").expect("FONT_FACE_RE: hardcoded regex is valid")
});

// `regex` has no backreferences, so the quotes are matched independently.
#[allow(clippy::expect_used)]
static FONT_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*['"]?[^)'"]*\.(?:woff2|woff|ttf|otf|eot)(?:[?#][^)'"]*)?['"]?\s*\)"#)
        .expect("FONT_URL_RE: hardcoded regex is valid")
});

#[allow(clippy::expect_used)]
static FONT_FAMILY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(font-family\s*:\s*)([^;}]*)")
        .expect("FONT_FAMILY_RE: hardcoded regex is valid")
});

/// Replace every literal `http://` with `https://`.
pub fn upgrade_protocol(text: &str) -> (String, usize) {
    let count = text.matches("http://").count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    (text.replace("http://", "https://"), count)
}

/// Replace `@font-face { ... }` blocks with a marker comment.
pub fn remove_font_faces(css: &str) -> (String, usize) {
    let count = FONT_FACE_RE.find_iter(css).count();
    if count == 0 {
        return (css.to_string(), 0);
    }
    let out = FONT_FACE_RE.replace_all(css, FONT_FACE_MARKER).into_owned();
    (out, count)
}

/// Empty out `url(...)` references to font files.
pub fn neutralize_font_urls(css: &str) -> (String, usize) {
    let count = FONT_URL_RE.find_iter(css).count();
    if count == 0 {
        return (css.to_string(), 0);
    }
    let out = FONT_URL_RE.replace_all(css, "url()").into_owned();
    (out, count)
}

/// Swap `font-family` values that name a remote font CDN for the system stack.
pub fn rewrite_remote_font_families(css: &str) -> (String, usize) {
    let mut count = 0;
    let out = FONT_FAMILY_RE.replace_all(css, |caps: &Captures<'_>| {
        let value = &caps[2];
        if !mentions_font_cdn(value) {
            return caps[0].to_string();
        }
        count += 1;
        let important = if value.to_ascii_lowercase().contains("!important") {
            " !important"
        } else {
            ""
        };
        format!("{}{SYSTEM_FONT_STACK}{important}", &caps[1])
    });
    (out.into_owned(), count)
}
