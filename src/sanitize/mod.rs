//! Newsletter sanitization.
//!
//! The content is parsed into a [`Dom`] and a fixed sequence of passes strips
//! what must not reach the preview iframe: scripts and other active content,
//! remote fonts, tracking pixels and tracking links. Removed elements are
//! replaced by comments so the output still shows where something was.
//!
//! Pass order matters only for the report counters, and is kept stable:
//!
//! 1. `http://` → `https://` everywhere
//! 2. `@font-face` blocks
//! 3. remote font `<link>`s
//! 4. `url()` references to font files
//! 5. `font-family` values naming a font CDN
//! 6. scripts, frames, event handlers, `javascript:` URLs
//! 7. tracking images
//! 8. tracking `<link>`s

mod css;
pub mod rules;

pub use css::{
    FONT_FACE_MARKER, neutralize_font_urls, remove_font_faces, rewrite_remote_font_families,
    upgrade_protocol,
};

use tracing::debug;

use crate::dom::{Dom, NodeData, NodeId, parse_document};
use crate::encoding::contains_nordic;
use crate::style::Length;
use rules::{is_font_link, is_script_url, is_tracking_url};

pub const SCRIPT_MARKER: &str = " script removed ";
pub const FRAME_MARKER: &str = " embedded frame removed ";
pub const FONT_LINK_MARKER: &str = " font link removed ";
pub const TRACKING_IMAGE_MARKER: &str = " tracking pixel removed ";
pub const TRACKING_LINK_MARKER: &str = " tracking link removed ";

/// Elements that embed other documents or plugins.
const FRAME_ELEMENTS: &[&str] = &["iframe", "frame", "frameset", "object", "embed", "applet"];

/// Attributes that carry a navigable or fetchable URL.
const URL_ATTRIBUTES: &[&str] = &["href", "src", "action", "formaction", "background"];

/// What the sanitizer changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct SanitizeReport {
    pub protocol_upgrades: usize,
    pub font_faces_removed: usize,
    pub font_links_removed: usize,
    pub font_urls_neutralized: usize,
    pub font_families_rewritten: usize,
    pub scripts_removed: usize,
    pub frames_removed: usize,
    pub event_handlers_removed: usize,
    pub script_urls_removed: usize,
    pub tracking_images_removed: usize,
    pub tracking_links_removed: usize,
    pub has_nordic_chars: bool,
}

impl SanitizeReport {
    /// Total number of elements and attributes removed.
    pub fn removals(&self) -> usize {
        self.font_links_removed
            + self.scripts_removed
            + self.frames_removed
            + self.event_handlers_removed
            + self.script_urls_removed
            + self.tracking_images_removed
            + self.tracking_links_removed
    }
}

/// Sanitized newsletter, split for document assembly.
#[derive(Debug, Clone, Default)]
pub struct SanitizedContent {
    /// `<style>` and `<link>` elements found in the source `<head>`.
    pub head: String,
    /// Markup of the source `<body>`.
    pub body: String,
    pub report: SanitizeReport,
}

/// Parse and sanitize newsletter HTML.
pub fn sanitize_html(content: &str) -> SanitizedContent {
    let mut dom = parse_document(content);
    let mut report = sanitize_dom(&mut dom);

    let mut head = String::new();
    if let Some(head_id) = dom.head() {
        for child in dom.children(head_id) {
            if dom.is_tag(child, "style") || dom.is_tag(child, "link") {
                head.push_str(&dom.outer_html(child));
            }
        }
    }
    let body = dom.body().map(|b| dom.inner_html(b)).unwrap_or_default();

    report.has_nordic_chars = contains_nordic(&body) || contains_nordic(&head);

    SanitizedContent { head, body, report }
}

/// Run every sanitization pass over `dom`.
pub fn sanitize_dom(dom: &mut Dom) -> SanitizeReport {
    let mut report = SanitizeReport {
        protocol_upgrades: upgrade_protocols(dom),
        ..Default::default()
    };

    report.font_faces_removed = rewrite_stylesheets(dom, remove_font_faces);
    report.font_links_removed = replace_links(dom, is_font_link, FONT_LINK_MARKER);
    report.font_urls_neutralized = rewrite_stylesheets(dom, neutralize_font_urls);
    report.font_families_rewritten = rewrite_stylesheets(dom, rewrite_remote_font_families);

    report.scripts_removed = replace_elements(dom, &["script"], SCRIPT_MARKER);
    report.frames_removed = replace_elements(dom, FRAME_ELEMENTS, FRAME_MARKER);
    let (handlers, urls) = strip_active_attributes(dom);
    report.event_handlers_removed = handlers;
    report.script_urls_removed = urls;

    report.tracking_images_removed = remove_tracking_images(dom);
    report.tracking_links_removed = replace_links(dom, is_tracking_url, TRACKING_LINK_MARKER);

    report.has_nordic_chars = contains_nordic(&dom.collect_text(dom.document()));

    debug!(
        upgrades = report.protocol_upgrades,
        scripts = report.scripts_removed,
        frames = report.frames_removed,
        tracking_images = report.tracking_images_removed,
        tracking_links = report.tracking_links_removed,
        font_links = report.font_links_removed,
        "sanitized newsletter"
    );

    report
}

/// Pass 1: `http://` → `https://` in attributes, text and comments.
fn upgrade_protocols(dom: &mut Dom) -> usize {
    let mut count = 0;
    for id in dom.descendants(dom.document()) {
        let Some(node) = dom.get_mut(id) else {
            continue;
        };
        match &mut node.data {
            NodeData::Element { attrs, .. } => {
                for attr in attrs.iter_mut() {
                    count += upgrade_in_place(&mut attr.value);
                }
            }
            NodeData::Text(text) | NodeData::Comment(text) => {
                count += upgrade_in_place(text);
            }
            NodeData::Document | NodeData::Doctype { .. } => {}
        }
    }
    count
}

fn upgrade_in_place(text: &mut String) -> usize {
    let (upgraded, n) = upgrade_protocol(text);
    if n > 0 {
        *text = upgraded;
    }
    n
}

/// Apply a stylesheet rewrite to every `<style>` body and `style` attribute.
fn rewrite_stylesheets<F>(dom: &mut Dom, rewrite: F) -> usize
where
    F: Fn(&str) -> (String, usize),
{
    let mut count = 0;
    for id in dom.elements() {
        if dom.is_tag(id, "style") {
            let children: Vec<NodeId> = dom.children(id).collect();
            for child in children {
                if let Some(node) = dom.get_mut(child)
                    && let NodeData::Text(text) = &mut node.data
                {
                    let (out, n) = rewrite(text);
                    if n > 0 {
                        *text = out;
                        count += n;
                    }
                }
            }
        }

        if let Some(attrs) = dom.attrs_mut(id)
            && let Some(style) = attrs.iter_mut().find(|a| a.name.local.as_ref() == "style")
        {
            let (out, n) = rewrite(&style.value);
            if n > 0 {
                style.value = out;
                count += n;
            }
        }
    }
    count
}

/// Replace every element with one of `tags` by a marker comment.
fn replace_elements(dom: &mut Dom, tags: &[&str], marker: &str) -> usize {
    let targets: Vec<NodeId> = dom
        .elements()
        .into_iter()
        .filter(|&id| {
            dom.element_name(id)
                .is_some_and(|name| tags.contains(&name.as_ref()))
        })
        .collect();

    let mut count = 0;
    for id in targets {
        // A nested target already went with its ancestor.
        if dom.is_attached(id) {
            dom.replace_with_comment(id, marker);
            count += 1;
        }
    }
    count
}

/// Replace `<link>` elements whose `href` matches `predicate`.
fn replace_links<P>(dom: &mut Dom, predicate: P, marker: &str) -> usize
where
    P: Fn(&str) -> bool,
{
    let targets: Vec<NodeId> = dom
        .find_all_by_tag("link")
        .into_iter()
        .filter(|&id| dom.get_attr(id, "href").is_some_and(&predicate))
        .collect();

    for &id in &targets {
        dom.replace_with_comment(id, marker);
    }
    targets.len()
}

/// Drop `on*` handlers and `javascript:` URLs. Returns both counts.
fn strip_active_attributes(dom: &mut Dom) -> (usize, usize) {
    let mut handlers = 0;
    let mut urls = 0;
    for id in dom.elements() {
        handlers += dom.remove_attrs(id, |a| a.name.local.as_ref().starts_with("on"));
        urls += dom.remove_attrs(id, |a| {
            URL_ATTRIBUTES.contains(&a.name.local.as_ref()) && is_script_url(&a.value)
        });
    }
    (handlers, urls)
}

/// Pass 7: images served from tracking hosts, and 1×1 pixels.
fn remove_tracking_images(dom: &mut Dom) -> usize {
    let targets: Vec<NodeId> = dom
        .find_all_by_tag("img")
        .into_iter()
        .filter(|&id| {
            dom.get_attr(id, "src").is_some_and(is_tracking_url) || is_pixel_sized(dom, id)
        })
        .collect();

    for &id in &targets {
        dom.replace_with_comment(id, TRACKING_IMAGE_MARKER);
    }
    targets.len()
}

fn is_pixel_sized(dom: &Dom, id: NodeId) -> bool {
    let style = dom.inline_style(id);
    let dimension = |name: &str| {
        style
            .get(name)
            .or_else(|| dom.get_attr(id, name))
            .and_then(Length::parse)
            .and_then(Length::as_px)
    };
    matches!(
        (dimension("width"), dimension("height")),
        (Some(w), Some(h)) if w <= 1.0 && h <= 1.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(html: &str) -> SanitizedContent {
        sanitize_html(html)
    }

    #[test]
    fn test_scripts_become_comments() {
        let out = sanitize("<p>hi</p><script>alert(1)</script><script src=x.js></script>");
        assert!(!out.body.contains("<script"));
        assert_eq!(out.body.matches("<!-- script removed -->").count(), 2);
        assert_eq!(out.report.scripts_removed, 2);
    }

    #[test]
    fn test_frames_and_handlers() {
        let out = sanitize(
            r#"<iframe src="https://evil.example"></iframe><a href="javascript:go()" onclick="x()">a</a>"#,
        );
        assert!(!out.body.contains("<iframe"));
        assert!(!out.body.contains("onclick"));
        assert!(!out.body.contains("javascript:"));
        assert_eq!(out.report.frames_removed, 1);
        assert_eq!(out.report.event_handlers_removed, 1);
        assert_eq!(out.report.script_urls_removed, 1);
    }

    #[test]
    fn test_protocol_upgrade_everywhere() {
        let out = sanitize(
            r#"<a href="http://example.com/x">see http://example.com</a><!-- http://c --><div style="background:url(http://i/x.png)"></div>"#,
        );
        assert!(!out.body.contains("http://"));
        assert!(out.body.contains(r#"href="https://example.com/x""#));
        assert_eq!(out.report.protocol_upgrades, 4);
    }

    #[test]
    fn test_head_styles_are_kept_and_cleaned() {
        let out = sanitize(
            "<html><head><title>t</title><style>@font-face{src:url(a.woff)} p{color:red}</style>\
             <link rel=stylesheet href=\"https://fonts.googleapis.com/css?family=Lato\">\
             <link rel=stylesheet href=\"https://cdn.example.com/site.css\"></head><body>x</body></html>",
        );
        assert!(out.head.contains(FONT_FACE_MARKER));
        assert!(out.head.contains("p{color:red}"));
        assert!(out.head.contains("site.css"));
        assert!(!out.head.contains("googleapis"));
        assert!(!out.head.contains("<title>"));
        assert_eq!(out.report.font_faces_removed, 1);
        assert_eq!(out.report.font_links_removed, 1);
    }

    #[test]
    fn test_tracking_images() {
        let out = sanitize(
            r#"<img src="https://mail.trackopen.example.com/pixel.gif"><img src="https://cdn.example.com/hero.jpg"><img src="/p.gif" width="1" height="1">"#,
        );
        assert_eq!(out.report.tracking_images_removed, 2);
        assert!(out.body.contains("hero.jpg"));
        assert!(!out.body.contains("trackopen"));
        assert!(out.body.contains("<!-- tracking pixel removed -->"));
    }

    #[test]
    fn test_tracking_links() {
        let out = sanitize(
            r#"<link rel="preconnect" href="https://click.example.com"><p>x</p>"#,
        );
        assert_eq!(out.report.tracking_links_removed, 1);
        assert!(!out.body.contains("click.example.com") && !out.head.contains("click.example.com"));
    }

    #[test]
    fn test_inline_font_family() {
        let out = sanitize(r#"<p style="font-family: 'Lato', googleapis">x</p>"#);
        assert_eq!(out.report.font_families_rewritten, 1);
        assert!(out.body.contains("-apple-system"));
    }

    #[test]
    fn test_nordic_flag() {
        assert!(sanitize("<p>blåbær</p>").report.has_nordic_chars);
        assert!(!sanitize("<p>blueberry</p>").report.has_nordic_chars);
    }

    #[test]
    fn test_report_removals() {
        let out = sanitize("<script></script><img src=\"https://open.example.com/o.gif\">");
        assert_eq!(out.report.removals(), 2);
    }
}
