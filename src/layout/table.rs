//! Rule 4: tables.
//!
//! Layout tables are the backbone of email markup and nearly always carry a
//! fixed `width`. That width becomes a `max-width`, so the table is never
//! wider than the frame yet never grows past what the author designed for.

use tracing::warn;

use super::{RuleContext, force, select};
use crate::dom::{Dom, NodeId};
use crate::error::Result;
use crate::style::{Length, format_px};

const TABLE_CENTERING: &[(&str, &str)] = &[
    ("margin-left", "auto"),
    ("margin-right", "auto"),
    ("float", "none"),
    ("max-width", "100%"),
    ("table-layout", "auto"),
];

pub(super) fn apply(dom: &mut Dom, cx: &mut RuleContext<'_>) -> Result<usize> {
    let tables = select(dom, "table")?;
    let mut styled = 0;
    for id in tables {
        match center_table(dom, id) {
            Ok(()) => styled += 1,
            Err(err) => warn!(rule = cx.rule.name(), %err, "skipping table"),
        }
    }
    Ok(styled)
}

fn center_table(dom: &mut Dom, id: NodeId) -> Result<()> {
    let width = declared_width(dom, id);

    dom.set_attr(id, "align", "center");
    force(dom, id, TABLE_CENTERING)?;

    match width {
        Some(Length::Percent(p)) => {
            let width = format!("{p}%");
            force(dom, id, &[("width", width.as_str())])?;
        }
        Some(Length::Px(px)) => {
            let max = format_px(px);
            force(dom, id, &[("width", "100%"), ("max-width", max.as_str())])?;
        }
        _ => {}
    }
    Ok(())
}

/// Width the author gave the table.
///
/// The `width` attribute wins. Otherwise an inline pixel width counts, and
/// on later passes the pixel `max-width` this rule wrote stands in for it.
fn declared_width(dom: &Dom, id: NodeId) -> Option<Length> {
    if let Some(length) = dom.get_attr(id, "width").and_then(Length::parse) {
        return match length {
            Length::Px(_) | Length::Percent(_) => Some(length),
            _ => None,
        };
    }

    let style = dom.inline_style(id);
    let inline_px = style
        .get("width")
        .and_then(Length::parse)
        .and_then(Length::as_px);
    if let Some(px) = inline_px {
        return Some(Length::Px(px));
    }

    if style.is_important("max-width") {
        return style
            .get("max-width")
            .and_then(Length::parse)
            .and_then(Length::as_px)
            .map(Length::Px);
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_document;
    use crate::layout::{NormalizeMode, StaticProbe, normalize};

    #[test]
    fn test_fixed_width_becomes_max_width() {
        let mut dom = parse_document(r#"<table width="600"><tr><td>x</td></tr></table>"#);
        normalize(&mut dom, NormalizeMode::Detail, &StaticProbe::default());
        let table = dom.find_by_tag("table").unwrap();
        let style = dom.inline_style(table);

        assert_eq!(style.get("max-width"), Some("600px"));
        assert_eq!(style.get("width"), Some("100%"));
        assert_eq!(style.get("margin-left"), Some("auto"));
        assert_eq!(style.get("margin-right"), Some("auto"));
        assert_eq!(dom.get_attr(table, "align"), Some("center"));
        assert_eq!(dom.get_attr(table, "width"), Some("600"));
    }

    #[test]
    fn test_percentage_width_is_kept() {
        let mut dom = parse_document(r#"<table width="80%"><tr><td>x</td></tr></table>"#);
        normalize(&mut dom, NormalizeMode::Detail, &StaticProbe::default());
        let table = dom.find_by_tag("table").unwrap();
        let style = dom.inline_style(table);

        assert_eq!(style.get("width"), Some("80%"));
        assert_eq!(style.get("max-width"), Some("100%"));
    }

    #[test]
    fn test_inline_pixel_width_is_stable() {
        let mut dom =
            parse_document(r#"<table style="width: 640px"><tr><td>x</td></tr></table>"#);
        let probe = StaticProbe::default();
        normalize(&mut dom, NormalizeMode::Detail, &probe);
        let table = dom.find_by_tag("table").unwrap();
        let first = dom.get_attr(table, "style").map(str::to_string);
        normalize(&mut dom, NormalizeMode::Detail, &probe);

        assert_eq!(dom.get_attr(table, "style").map(str::to_string), first);
        assert_eq!(dom.inline_style(table).get("max-width"), Some("640px"));
    }
}
