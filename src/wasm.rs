//! WASM bindings for rendering newsletters in the browser.
//!
//! The front-end writes the returned document into an iframe with
//! `sandbox="allow-same-origin"`.

use wasm_bindgen::prelude::*;

use crate::dom::parse_document;
use crate::layout::{NormalizeMode, StaticProbe, normalize};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Repair double-encoded Nordic letters.
#[wasm_bindgen(js_name = repairEncoding)]
pub fn repair_encoding(text: Option<String>) -> String {
    crate::encoding::repair_encoding(text.as_deref())
}

/// Sanitize newsletter HTML into a standalone iframe document.
#[wasm_bindgen(js_name = buildSanitizedDocument)]
pub fn build_sanitized_document(content: Option<String>, is_mobile: bool) -> String {
    crate::document::build_sanitized_document(content.as_deref(), is_mobile)
}

/// Build a card preview already fitted to `viewport_width`.
///
/// The layout rules run once over the markup, so a host that cannot run
/// them inside the frame still gets a centered, scaled snapshot.
#[wasm_bindgen(js_name = renderPreview)]
pub fn render_preview(content: Option<String>, viewport_width: f32) -> String {
    let repaired = crate::encoding::repair_encoding(content.as_deref());
    let html = crate::document::build_sanitized_document(Some(&repaired), false);

    let mut dom = parse_document(&html);
    let mode = NormalizeMode::Preview { viewport_width };
    normalize(&mut dom, mode, &StaticProbe::new(Some(viewport_width)));
    dom.to_html()
}
