//! Denylists and URL predicates shared by the sanitizer passes.
//!
//! The lists are plain substring/token matches. They will miss trackers
//! that use unremarkable domains and will occasionally catch a legitimate
//! host whose name happens to contain a token.

/// Tokens that mark a host as tracking/analytics infrastructure.
pub const TRACKING_HOST_TOKENS: &[&str] = &[
    "mail",
    "click",
    "url",
    "send",
    "analytics",
    "track",
    "open",
    "beacon",
    "pixel",
    "metrics",
    "list-manage",
    "doubleclick",
    "hubspot",
    "pardot",
];

/// Substrings that mark a `<link href>` as a remote font stylesheet.
pub const FONT_HOST_PATTERNS: &[&str] = &["fonts", "typekit", "fontawesome", "font-awesome"];

/// File extensions of downloadable fonts.
pub const FONT_EXTENSIONS: &[&str] = &["woff2", "woff", "ttf", "otf", "eot"];

/// Tokens in a `font-family` value that point at a remote font CDN.
pub const FONT_CDN_TOKENS: &[&str] = &["storage.googleapis", "googleapis", "google", "cloudfront"];

/// Font stack substituted for remote families.
pub const SYSTEM_FONT_STACK: &str = "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, \
     'Helvetica Neue', Arial, 'Noto Sans', sans-serif";

/// Host part of an absolute or protocol-relative URL, lowercased.
///
/// Relative URLs and `data:`/`cid:` URIs have no host.
pub fn url_host(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = if let Some(idx) = url.find("://") {
        let scheme = &url[..idx];
        if !scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) {
            return None;
        }
        &url[idx + 3..]
    } else if let Some(rest) = url.strip_prefix("//") {
        rest
    } else {
        return None;
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let host = host_port.split(':').next().unwrap_or_default();
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

/// Check whether the URL's host carries a tracking token.
pub fn is_tracking_url(url: &str) -> bool {
    url_host(url).is_some_and(|host| TRACKING_HOST_TOKENS.iter().any(|t| host.contains(t)))
}

/// Check whether a `<link href>` points at a remote font stylesheet or file.
pub fn is_font_link(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    FONT_HOST_PATTERNS.iter().any(|p| lower.contains(p)) || is_font_file(&lower)
}

/// Check whether a URL names a font file by extension.
pub fn is_font_file(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| FONT_EXTENSIONS.contains(&ext))
}

/// Check whether a `font-family` value references a remote font CDN.
pub fn mentions_font_cdn(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    FONT_CDN_TOKENS.iter().any(|t| lower.contains(t))
}

/// Check whether a URL would execute script when followed.
pub fn is_script_url(url: &str) -> bool {
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .take(11)
        .collect();
    compact.to_ascii_lowercase().starts_with("javascript:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_host() {
        assert_eq!(
            url_host("https://mail.trackopen.example.com/pixel.gif"),
            Some("mail.trackopen.example.com".to_string())
        );
        assert_eq!(url_host("//cdn.Example.com/a.png"), Some("cdn.example.com".to_string()));
        assert_eq!(url_host("https://user@host.com:8080/x"), Some("host.com".to_string()));
        assert_eq!(url_host("/images/logo.png"), None);
        assert_eq!(url_host("data:image/png;base64,AAAA"), None);
    }

    #[test]
    fn test_tracking_urls() {
        assert!(is_tracking_url("https://mail.trackopen.example.com/pixel.gif"));
        assert!(is_tracking_url("https://click.news.example.com/o?id=1"));
        assert!(is_tracking_url("https://email.beacon.io/b.gif"));
        assert!(!is_tracking_url("https://cdn.example.com/hero.jpg"));
        // Path tokens don't count, only the host
        assert!(!is_tracking_url("https://cdn.example.com/track/hero.jpg"));
        assert!(!is_tracking_url("images/open.png"));
    }

    #[test]
    fn test_font_links() {
        assert!(is_font_link("https://fonts.googleapis.com/css?family=Roboto"));
        assert!(is_font_link("https://use.typekit.net/abc.css"));
        assert!(is_font_link("https://cdn.example.com/brand.woff2?v=3"));
        assert!(!is_font_link("https://cdn.example.com/styles.css"));
    }

    #[test]
    fn test_font_cdn() {
        assert!(mentions_font_cdn("'Roboto', googleapis, sans-serif"));
        assert!(!mentions_font_cdn("Georgia, serif"));
    }

    #[test]
    fn test_script_url() {
        assert!(is_script_url("javascript:alert(1)"));
        assert!(is_script_url(" JavaScript:void(0)"));
        assert!(is_script_url("java\tscript:x"));
        assert!(!is_script_url("https://example.com"));
    }
}
