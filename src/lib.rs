//! # mailframe
//!
//! Safe, centered rendering of archived newsletter HTML inside a sandboxed
//! iframe.
//!
//! ## Features
//!
//! - Repair of double-encoded Nordic letters (`Ã¸` → `ø`)
//! - Sanitization: scripts, frames, remote fonts and tracking pixels removed
//! - A standalone document with a strict Content-Security-Policy
//! - Layout normalization that centers fixed-width email layouts and fits
//!   them into small previews
//!
//! ## Quick Start
//!
//! ```
//! use mailframe::{Newsletter, render_newsletter};
//!
//! let newsletter = Newsletter::new("<p>Pris: 10 kr Ã¸re</p>").with_title("Tilbud");
//! let html = render_newsletter(&newsletter, false);
//!
//! assert!(html.contains("øre"));
//! assert!(html.contains(r#"data-has-nordic-chars="true""#));
//! ```
//!
//! ## Normalizing a Rendered Document
//!
//! ```
//! use mailframe::dom::parse_document;
//! use mailframe::layout::{NormalizeMode, StaticProbe, normalize};
//!
//! let mut dom = parse_document(r#"<table width="600"><tr><td>Hi</td></tr></table>"#);
//! let report = normalize(&mut dom, NormalizeMode::Detail, &StaticProbe::default());
//! assert_eq!(report.failures().count(), 0);
//! ```

pub mod document;
pub mod dom;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod layout;
pub mod model;
pub mod sanitize;
pub mod style;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use document::{DocumentBuilder, build_sanitized_document};
pub use encoding::repair_encoding;
pub use error::{Error, Result};
pub use frame::{FrameConfig, FrameState, NewsletterFrame};
pub use layout::{LayoutProbe, NormalizeMode, NormalizeReport, StaticProbe, normalize};
pub use model::Newsletter;
pub use sanitize::{SanitizeReport, sanitize_html};

/// Repair and sanitize a stored newsletter into an iframe document.
pub fn render_newsletter(newsletter: &Newsletter, is_mobile: bool) -> String {
    let repaired = newsletter
        .content
        .as_deref()
        .map(|content| repair_encoding(Some(content)));

    DocumentBuilder::new()
        .title(newsletter.title.as_deref())
        .mobile(is_mobile)
        .build(repaired.as_deref())
        .html
}
