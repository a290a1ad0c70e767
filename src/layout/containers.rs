//! Rules 2 and 3: the newsletter wrapper and common container elements.

use super::{RuleContext, force_each, select};
use crate::document::WRAPPER_CLASS;
use crate::dom::Dom;
use crate::error::Result;

/// Class names, ids and attributes email templates use for their outer boxes.
pub const CONTAINER_SELECTOR: &str = ".container, .wrapper, .email-body, .main, .content, \
     .inner, #container, #wrapper, #main, #content, \
     [class*=\"container\"], [class*=\"wrapper\"], [id*=\"container\"], [id*=\"wrapper\"], \
     div[width], div[align=\"center\"], center";

const WRAPPER_CENTERING: &[(&str, &str)] = &[
    ("width", "100%"),
    ("max-width", "100%"),
    ("margin", "0 auto"),
    ("overflow", "hidden"),
    ("text-align", "center"),
    ("background", "#ffffff"),
];

const CONTAINER_CENTERING: &[(&str, &str)] = &[
    ("margin-left", "auto"),
    ("margin-right", "auto"),
    ("float", "none"),
    ("width", "100%"),
    ("max-width", "100%"),
];

pub(super) fn center_wrapper(dom: &mut Dom, cx: &mut RuleContext<'_>) -> Result<usize> {
    let wrappers = select(dom, &format!(".{WRAPPER_CLASS}"))?;
    Ok(force_each(dom, cx, &wrappers, WRAPPER_CENTERING))
}

pub(super) fn center_containers(dom: &mut Dom, cx: &mut RuleContext<'_>) -> Result<usize> {
    let containers = select(dom, CONTAINER_SELECTOR)?;
    Ok(force_each(dom, cx, &containers, CONTAINER_CENTERING))
}
