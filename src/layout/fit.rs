//! Rule 7: scale the whole body down when the content is wider than the
//! preview.

use tracing::debug;

use super::{RuleContext, force, require_body, select};
use crate::dom::Dom;
use crate::error::Result;

/// Elements whose width decides how wide the content is.
pub const MEASURED_SELECTOR: &str =
    "table, div, center, section, article, main, img, .newsletter-wrapper";

/// Margin left around scaled content.
const FIT_MARGIN: f32 = 0.95;

pub(super) fn apply(dom: &mut Dom, cx: &mut RuleContext<'_>) -> Result<usize> {
    let body = require_body(dom)?;
    let Some(available) = cx.available_width() else {
        return Ok(0);
    };

    let widest = select(dom, MEASURED_SELECTOR)?
        .into_iter()
        .filter_map(|id| cx.probe.box_width(dom, id))
        .reduce(f32::max);
    let Some(widest) = widest.filter(|&w| w > available) else {
        return Ok(0);
    };

    let scale = scale_factor(available, widest);
    debug!(available, widest, scale, "fitting content to viewport");

    let transform = format!("scale({scale})");
    force(
        dom,
        body,
        &[
            ("transform", transform.as_str()),
            ("transform-origin", "center top"),
        ],
    )?;
    cx.scale = Some(scale);
    Ok(1)
}

/// `available / widest` with a margin, rounded to three decimals.
pub fn scale_factor(available: f32, widest: f32) -> f32 {
    ((available / widest) * FIT_MARGIN * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;
    use crate::layout::{NormalizeMode, StaticProbe, normalize};

    #[test]
    fn test_scale_factor() {
        assert_eq!(scale_factor(400.0, 800.0), 0.475);
        assert_eq!(scale_factor(320.0, 600.0), 0.507);
    }

    #[test]
    fn test_wide_table_scales_body() {
        let mut dom = parse_document(r#"<table width="800"><tr><td>x</td></tr></table>"#);
        let mode = NormalizeMode::Preview {
            viewport_width: 400.0,
        };
        let report = normalize(&mut dom, mode, &StaticProbe::default());
        let body = dom.body().unwrap();
        let style = dom.inline_style(body);

        assert_eq!(report.scale, Some(0.475));
        assert_eq!(style.get("transform"), Some("scale(0.475)"));
        assert_eq!(style.get("transform-origin"), Some("center top"));
    }

    #[test]
    fn test_narrow_content_is_not_scaled() {
        let mut dom = parse_document(r#"<table width="300"><tr><td>x</td></tr></table>"#);
        let mode = NormalizeMode::Preview {
            viewport_width: 400.0,
        };
        let report = normalize(&mut dom, mode, &StaticProbe::default());
        let body = dom.body().unwrap();

        assert_eq!(report.scale, None);
        assert_eq!(dom.inline_style(body).get("transform"), None);
    }

    #[test]
    fn test_detail_mode_never_scales() {
        let mut dom = parse_document(r#"<table width="2000"><tr><td>x</td></tr></table>"#);
        let probe = StaticProbe::new(Some(400.0));
        let report = normalize(&mut dom, NormalizeMode::Detail, &probe);
        assert_eq!(report.scale, None);
    }
}
