//! End-to-end tests of the string pipeline.
//!
//! Raw newsletter HTML goes through encoding repair and sanitization into
//! the standalone iframe document.

use mailframe::dom::{Selectors, parse_document};
use mailframe::{Newsletter, build_sanitized_document, render_newsletter, repair_encoding};

// ============================================================================
// Encoding Repair
// ============================================================================

#[test]
fn test_repair_signatures() {
    let cases = [
        ("Ã¸", "ø"),
        ("Ã¦", "æ"),
        ("Ã…", "Å"),
        ("Ã˜", "Ø"),
        ("Ã†", "Æ"),
        ("Ã¥", "å"),
    ];
    for (broken, fixed) in cases {
        let out = repair_encoding(Some(&format!("x {broken} y")));
        assert_eq!(out, format!("x {fixed} y"));
        assert!(!out.contains('Ã'));
    }
}

#[test]
fn test_repair_missing_content() {
    assert_eq!(repair_encoding(None), "");
    assert_eq!(repair_encoding(Some("")), "");
}

#[test]
fn test_repair_entities() {
    assert_eq!(
        repair_encoding(Some("bl&aring;b&aelig;r &#216;l &#xE5;")),
        "blåbær Øl å"
    );
}

// ============================================================================
// Sanitization
// ============================================================================

#[test]
fn test_input_scripts_never_survive() {
    let html = build_sanitized_document(
        Some("<script>steal()</script><p>Hi</p><SCRIPT type=module>x()</SCRIPT>"),
        false,
    );
    let dom = parse_document(&html);
    let scripts = dom.select(&Selectors::compile("script").unwrap());

    // The only script left is the injected error handler in the body
    assert_eq!(scripts.len(), 1);
    assert!(!html.contains("steal()"));
    assert!(!html.contains("x()"));
    assert!(html.contains("<!-- script removed -->"));
}

/// Number of `<script` tags in the output and script elements after a
/// scripting-disabled re-parse, as the sandboxed iframe sees them.
fn script_counts(html: &str) -> (usize, usize) {
    let dom = parse_document(html);
    let elements = dom.select(&Selectors::compile("script").unwrap()).len();
    (html.matches("<script").count(), elements)
}

#[test]
fn test_foreign_style_text_stays_text() {
    for content in [
        "<svg><style>&lt;script&gt;alert(1)&lt;/script&gt;</style></svg>",
        "<math><style>&lt;script&gt;alert(1)&lt;/script&gt;</style></math>",
    ] {
        let html = build_sanitized_document(Some(content), false);

        assert_eq!(script_counts(&html), (1, 1), "{content}");
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }
}

#[test]
fn test_noscript_scripts_removed() {
    for content in [
        "<noscript><script>x()</script></noscript>",
        "<p>x</p><noscript><script>alert(1)</script><img src=x></noscript>",
    ] {
        let html = build_sanitized_document(Some(content), false);

        assert_eq!(script_counts(&html), (1, 1), "{content}");
        assert!(!html.contains("alert(1)") && !html.contains("x()"));
        assert!(html.contains("<!-- script removed -->"));
    }
}

#[test]
fn test_protocol_upgrade() {
    let html = build_sanitized_document(
        Some(r#"<a href="http://example.com/x">link</a><img src="http://cdn.example.com/a.png">"#),
        false,
    );
    assert!(html.contains("https://example.com/x"));
    assert!(html.contains("https://cdn.example.com/a.png"));
    assert!(!html.contains("http://"));
}

#[test]
fn test_tracking_pixel_replaced() {
    let html = build_sanitized_document(
        Some(r#"<p>Hi</p><img src="https://mail.trackopen.example.com/pixel.gif">"#),
        false,
    );
    assert!(!html.contains("trackopen"));
    assert!(html.contains("<!-- tracking pixel removed -->"));
    assert!(html.contains("<p>Hi</p>"));
}

#[test]
fn test_remote_fonts_removed() {
    let html = build_sanitized_document(
        Some(
            r#"<html><head>
<link href="https://fonts.googleapis.com/css2?family=Inter" rel="stylesheet">
<style>@font-face { font-family: Brand; src: url("https://cdn.example.com/brand.woff2"); }
h1 { font-family: Brand, googleapis, sans-serif; background: url(https://cdn.example.com/bg.ttf); }</style>
</head><body><h1>Sale</h1></body></html>"#,
        ),
        false,
    );

    assert!(!html.contains("@font-face {"));
    assert!(html.contains("/* @font-face removed */"));
    assert!(!html.contains("fonts.googleapis.com"));
    assert!(!html.contains("bg.ttf"));
    assert!(!html.contains("Brand, googleapis"));
}

#[test]
fn test_document_head() {
    let html = build_sanitized_document(Some("<p>x</p>"), false);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"<meta charset="utf-8">"#));
    assert!(html.contains(r#"content="text/html; charset=utf-8""#));
    assert!(html.contains(r#"name="viewport""#));
    assert!(html.contains("Content-Security-Policy"));
    assert!(html.contains("frame-src 'none'"));
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_missing_content() {
    let html = build_sanitized_document(None, false);

    assert!(html.contains("<html>") && html.contains("</html>"));
    assert!(html.contains(r#"<meta charset="utf-8">"#));

    let dom = parse_document(&html);
    let body = dom.body().unwrap();
    assert!(
        dom.collect_text(body)
            .to_lowercase()
            .contains("no content available")
    );
}

#[test]
fn test_scenario_nordic_price() {
    let repaired = repair_encoding(Some("<p>Pris: 10 kr Ã¸re</p>"));
    assert!(repaired.contains("øre"));

    let html = build_sanitized_document(Some(&repaired), false);
    let dom = parse_document(&html);
    let body = dom.body().unwrap();
    let wrapper = dom.select(&Selectors::compile(".newsletter-wrapper").unwrap());

    assert_eq!(dom.get_attr(body, "data-has-nordic-chars"), Some("true"));
    assert_eq!(wrapper.len(), 1);
    assert_eq!(dom.inner_html(wrapper[0]), "<p>Pris: 10 kr øre</p>");
}

#[test]
fn test_render_newsletter() {
    let newsletter = Newsletter::new("<h1>Ukens tilbud</h1><p>Sm&oslash;r</p>").with_title("Tilbud");
    let html = render_newsletter(&newsletter, true);

    assert!(html.contains("<title>Tilbud</title>"));
    assert!(html.contains("Smør"));
    assert!(html.contains("transform:scale(0.85)"));

    let empty = render_newsletter(&Newsletter::default(), false);
    assert!(empty.contains("No content available"));
}

// ============================================================================
// Real-world Newsletter
// ============================================================================

const NEWSLETTER: &str = include_str!("fixtures/newsletter.html");

#[test]
fn test_fixture_newsletter() {
    let repaired = repair_encoding(Some(NEWSLETTER));
    let report = mailframe::sanitize_html(&repaired).report;
    let html = build_sanitized_document(Some(&repaired), false);

    // Encoding
    for word in ["øre", "Små", "Æbler", "Øl", "smør", "på"] {
        assert!(html.contains(word), "missing {word}");
    }
    assert!(html.contains(r#"<body data-has-nordic-chars="true">"#));

    // Active content
    assert!(!html.contains("_gaq"));
    assert!(!html.contains("onclick"));
    assert!(!html.contains("javascript:"));
    assert!(html.contains("<!-- embedded frame removed -->"));

    // Fonts and trackers
    assert!(!html.contains("googleapis"));
    assert!(!html.contains("brand.woff2"));
    assert!(!html.contains("mailtracker"));
    assert!(!html.contains("http://"));

    assert_eq!(report.scripts_removed, 1);
    assert_eq!(report.frames_removed, 1);
    assert_eq!(report.font_links_removed, 1);
    assert_eq!(report.tracking_images_removed, 1);
    assert!(report.has_nordic_chars);
}
