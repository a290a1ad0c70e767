//! Rule 8: make a preview snapshot show the whole newsletter.
//!
//! Email templates clamp heights and hide their header blocks on small
//! screens. In a thumbnail that leaves an empty card, so clamps are lifted
//! and headers forced visible.

use super::{RuleContext, force_each, require_body, select};
use crate::document::WRAPPER_CLASS;
use crate::dom::{Dom, NodeId};
use crate::error::Result;

pub const HEADER_SELECTOR: &str =
    "header, .header, #header, [class*=\"header\"], [class*=\"preheader\"]";

const VISIBLE: &[(&str, &str)] = &[("display", "block"), ("visibility", "visible"), ("opacity", "1")];

const UNCLAMPED: &[(&str, &str)] = &[("max-height", "none")];

const FLUID_IMAGE: &[(&str, &str)] = &[("max-width", "100%"), ("height", "auto")];

const CENTERED_TABLE: &[(&str, &str)] = &[("margin-left", "auto"), ("margin-right", "auto")];

const OVERFLOW_VISIBLE: &[(&str, &str)] = &[("overflow", "visible"), ("overflow-x", "visible")];

pub(super) fn apply(dom: &mut Dom, cx: &mut RuleContext<'_>) -> Result<usize> {
    let body = require_body(dom)?;
    let mut styled = 0;

    let clamped: Vec<NodeId> = dom
        .elements()
        .into_iter()
        .filter(|&id| dom.inline_style(id).get("max-height").is_some())
        .collect();
    styled += force_each(dom, cx, &clamped, UNCLAMPED);

    let headers = select(dom, HEADER_SELECTOR)?;
    styled += force_each(dom, cx, &headers, VISIBLE);

    let images = select(dom, "img")?;
    styled += force_each(dom, cx, &images, FLUID_IMAGE);

    let tables = select(dom, "table")?;
    styled += force_each(dom, cx, &tables, CENTERED_TABLE);

    let mut frames = vec![body];
    frames.extend(select(dom, &format!(".{WRAPPER_CLASS}"))?);
    styled += force_each(dom, cx, &frames, OVERFLOW_VISIBLE);

    Ok(styled)
}
