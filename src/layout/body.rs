//! Rule 1: center the body.

use super::{RuleContext, force, require_body};
use crate::dom::Dom;
use crate::error::Result;

/// Smallest font size left alone on the body.
pub const MIN_BODY_FONT_SIZE_PX: f32 = 12.0;

const BODY_CENTERING: &[(&str, &str)] = &[
    ("margin", "0 auto"),
    ("text-align", "center"),
    ("width", "100%"),
    ("max-width", "100%"),
    ("box-sizing", "border-box"),
    ("overflow-x", "hidden"),
    ("display", "flex"),
    ("flex-direction", "column"),
    ("align-items", "center"),
];

pub(super) fn apply(dom: &mut Dom, cx: &mut RuleContext<'_>) -> Result<usize> {
    let body = require_body(dom)?;
    force(dom, body, BODY_CENTERING)?;

    let too_small = cx
        .probe
        .computed_font_size(dom, body)
        .is_some_and(|size| size < MIN_BODY_FONT_SIZE_PX);
    if too_small {
        force(dom, body, &[("font-size", "12px")])?;
    }
    Ok(1)
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_document;
    use crate::layout::{NormalizeMode, StaticProbe, normalize};

    #[test]
    fn test_body_is_centered() {
        let mut dom = parse_document("<p>x</p>");
        normalize(&mut dom, NormalizeMode::Detail, &StaticProbe::default());
        let body = dom.body().unwrap();
        let style = dom.inline_style(body);

        assert_eq!(style.get("margin"), Some("0 auto"));
        assert_eq!(style.get("align-items"), Some("center"));
        assert!(style.is_important("display"));
        assert_eq!(style.get("font-size"), None);
    }

    #[test]
    fn test_small_font_is_raised() {
        let mut dom = parse_document(r#"<body style="font-size: 9px"><p>x</p></body>"#);
        normalize(&mut dom, NormalizeMode::Detail, &StaticProbe::default());
        let body = dom.body().unwrap();
        assert_eq!(dom.inline_style(body).get("font-size"), Some("12px"));
    }
}
