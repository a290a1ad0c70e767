//! Assembly of the standalone document written into the preview iframe.
//!
//! The sanitized newsletter is wrapped in a fixed shell: charset and CSP
//! meta tags, a fallback stylesheet, an error-swallowing script and a
//! hidden banner, and a `.newsletter-wrapper` container that the layout
//! engine later centers.
//!
//! ```
//! use mailframe::build_sanitized_document;
//!
//! let html = build_sanitized_document(Some("<p>Hello</p><script>x()</script>"), false);
//! assert!(html.contains(r#"<div class="newsletter-wrapper"><p>Hello</p>"#));
//! assert!(!html.contains("x()"));
//! ```

use std::fmt::Write;

use crate::sanitize::rules::SYSTEM_FONT_STACK;
use crate::sanitize::{SanitizeReport, sanitize_html};

/// Content-Security-Policy of every assembled document.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self' https: data:; \
     script-src 'none'; frame-src 'none'; connect-src 'none'; object-src 'none'; \
     img-src 'self' data: https:; style-src 'self' 'unsafe-inline' https:; \
     font-src 'self' data:";

/// Class of the element that holds the newsletter markup.
pub const WRAPPER_CLASS: &str = "newsletter-wrapper";

/// Text shown when there is nothing to render.
pub const EMPTY_PLACEHOLDER: &str = "No content available";

/// Scale applied to the wrapper on small screens.
pub const MOBILE_SCALE: f32 = 0.85;

/// Body attribute set when the content contains Nordic letters.
pub const NORDIC_ATTRIBUTE: &str = "data-has-nordic-chars";

const ERROR_BANNER: &str = "Some parts of this newsletter could not be displayed.";

// Swallows every error event. Failures that look like blocked trackers,
// fonts or network fetches stay silent; anything else reveals the banner.
const ERROR_SUPPRESSION_SCRIPT: &str = "(function(){\
var quiet=/track|pixel|beacon|analytics|font|woff|network|load|fetch|cors|blocked|csp/i;\
function onError(e){\
var msg=String((e&&e.message)||'');\
var t=e&&e.target;\
var src=(t&&(t.src||t.href))||'';\
if(!quiet.test(msg+' '+src)&&document.body){document.body.classList.add('has-error');}\
if(e&&e.preventDefault){e.preventDefault();}\
if(e&&e.stopPropagation){e.stopPropagation();}\
return true;}\
window.addEventListener('error',onError,true);\
window.addEventListener('unhandledrejection',function(e){e.preventDefault();});\
window.onerror=function(){return true;};\
})();";

/// Builder for the iframe document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentBuilder<'a> {
    title: Option<&'a str>,
    is_mobile: bool,
}

/// Assembled document and what sanitization changed on the way.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub html: String,
    /// `None` for the empty-content placeholder document.
    pub report: Option<SanitizeReport>,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a `<title>` in the head.
    pub fn title(mut self, title: Option<&'a str>) -> Self {
        self.title = title.filter(|t| !t.trim().is_empty());
        self
    }

    /// Add the mobile scale rule to the stylesheet.
    pub fn mobile(mut self, is_mobile: bool) -> Self {
        self.is_mobile = is_mobile;
        self
    }

    /// Sanitize `content` and wrap it in the document shell.
    pub fn build(&self, content: Option<&str>) -> AssembledDocument {
        let content = content.filter(|c| !c.trim().is_empty());
        let Some(content) = content else {
            return AssembledDocument {
                html: self.empty_document(),
                report: None,
            };
        };

        let sanitized = sanitize_html(content);

        let mut doc = String::with_capacity(content.len() + 4096);
        self.write_head(&mut doc, &sanitized.head);

        doc.push_str("<body");
        if sanitized.report.has_nordic_chars {
            let _ = write!(doc, " {NORDIC_ATTRIBUTE}=\"true\"");
        }
        doc.push_str(">\n");
        let _ = writeln!(doc, "<script>{ERROR_SUPPRESSION_SCRIPT}</script>");
        let _ = writeln!(doc, "<div class=\"newsletter-error\" role=\"status\">{ERROR_BANNER}</div>");
        let _ = write!(doc, "<div class=\"{WRAPPER_CLASS}\">");
        doc.push_str(&sanitized.body);
        doc.push_str("</div>\n</body>\n</html>\n");

        AssembledDocument {
            html: doc,
            report: Some(sanitized.report),
        }
    }

    fn empty_document(&self) -> String {
        let mut doc = String::new();
        self.write_head(&mut doc, "");
        let _ = write!(
            doc,
            "<body>\n<div class=\"newsletter-empty\"><p>{EMPTY_PLACEHOLDER}</p></div>\n</body>\n</html>\n"
        );
        doc
    }

    fn write_head(&self, doc: &mut String, extra: &str) {
        doc.push_str(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="Content-Type" content="text/html; charset=utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
"#,
        );
        let _ = writeln!(
            doc,
            "<meta http-equiv=\"Content-Security-Policy\" content=\"{CONTENT_SECURITY_POLICY}\">"
        );

        if let Some(title) = self.title {
            doc.push_str("<title>");
            escape_title(title, doc);
            doc.push_str("</title>\n");
        }

        let _ = writeln!(doc, "<style>{}</style>", fallback_stylesheet(self.is_mobile));
        if !extra.is_empty() {
            doc.push_str(extra);
            doc.push('\n');
        }
        doc.push_str("</head>\n");
    }
}

/// Sanitize `content` and assemble the iframe document.
///
/// Missing or blank content yields a placeholder document; this never fails.
pub fn build_sanitized_document(content: Option<&str>, is_mobile: bool) -> String {
    DocumentBuilder::new().mobile(is_mobile).build(content).html
}

fn fallback_stylesheet(is_mobile: bool) -> String {
    let mut css = String::new();
    css.push_str("*,*::before,*::after{box-sizing:border-box}");
    let _ = write!(
        css,
        "body{{margin:0;padding:16px;font-family:{SYSTEM_FONT_STACK};line-height:1.5;\
         color:#222222;background:#ffffff;-webkit-text-size-adjust:100%}}"
    );
    css.push_str("img{max-width:100%;height:auto}");
    css.push_str("table{border-collapse:collapse}");
    let _ = write!(
        css,
        "body[{NORDIC_ATTRIBUTE}=\"true\"]{{font-family:'Noto Sans','Segoe UI',Arial,sans-serif}}"
    );
    css.push_str(
        ".newsletter-error{display:none;margin:0 0 12px;padding:8px 12px;border-radius:4px;\
         background:#fff4e5;color:#8a4b00;font-size:13px}",
    );
    css.push_str("body.has-error .newsletter-error{display:block}");
    css.push_str(".newsletter-empty{padding:48px 16px;text-align:center;color:#888888}");
    let _ = write!(css, ".{WRAPPER_CLASS}{{margin:0 auto}}");
    if is_mobile {
        let _ = write!(
            css,
            ".{WRAPPER_CLASS}{{transform:scale({MOBILE_SCALE});transform-origin:top center}}"
        );
    }
    css
}

fn escape_title(title: &str, out: &mut String) {
    for c in title.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        for content in [None, Some(""), Some("  \n\t ")] {
            let html = build_sanitized_document(content, false);
            assert!(html.starts_with("<!DOCTYPE html>"));
            assert!(html.contains(r#"<meta charset="utf-8">"#));
            assert!(html.contains(CONTENT_SECURITY_POLICY));
            assert!(html.contains(EMPTY_PLACEHOLDER));
            assert!(html.trim_end().ends_with("</html>"));
        }
    }

    #[test]
    fn test_document_shell() {
        let html = build_sanitized_document(Some("<p>Hello</p>"), false);
        assert!(html.contains("Content-Security-Policy"));
        assert!(html.contains("script-src 'none'"));
        assert!(html.contains(r#"<div class="newsletter-wrapper"><p>Hello</p></div>"#));
        assert_eq!(html.matches("<script>").count(), 1);
        assert!(html.contains("<body>\n"));
    }

    #[test]
    fn test_nordic_body_attribute() {
        let html = build_sanitized_document(Some("<p>smørbrød</p>"), false);
        assert!(html.contains(r#"<body data-has-nordic-chars="true">"#));

        let html = build_sanitized_document(Some("<p>sandwich</p>"), false);
        assert!(html.contains("<body>\n"));
    }

    #[test]
    fn test_mobile_scale() {
        let mobile = build_sanitized_document(Some("<p>x</p>"), true);
        let desktop = build_sanitized_document(Some("<p>x</p>"), false);
        assert!(mobile.contains("transform:scale(0.85)"));
        assert!(!desktop.contains("transform:scale("));
    }

    #[test]
    fn test_title_is_escaped() {
        let doc = DocumentBuilder::new()
            .title(Some("Deals <today> & more"))
            .build(Some("<p>x</p>"));
        assert!(doc.html.contains("<title>Deals &lt;today&gt; &amp; more</title>"));
        assert!(doc.report.is_some());
    }

    #[test]
    fn test_head_styles_follow_fallback() {
        let html = build_sanitized_document(
            Some("<html><head><style>p{color:red}</style></head><body><p>x</p></body></html>"),
            false,
        );
        let fallback = html.find("box-sizing:border-box").unwrap_or(usize::MAX);
        let author = html.find("<style>p{color:red}</style>").unwrap_or(0);
        assert!(fallback < author);
    }
}
