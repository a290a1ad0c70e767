//! Rule 5: block and inline text elements.

use super::{RuleContext, force_each, select};
use crate::dom::Dom;
use crate::error::Result;

pub const TEXT_SELECTOR: &str =
    "div, p, h1, h2, h3, h4, h5, h6, span, section, article, header, footer, main";

const TEXT_CENTERING: &[(&str, &str)] = &[
    ("margin-left", "auto"),
    ("margin-right", "auto"),
    ("max-width", "100%"),
    ("word-break", "break-word"),
    ("overflow-wrap", "break-word"),
];

pub(super) fn apply(dom: &mut Dom, cx: &mut RuleContext<'_>) -> Result<usize> {
    let elements = select(dom, TEXT_SELECTOR)?;
    Ok(force_each(dom, cx, &elements, TEXT_CENTERING))
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_document;
    use crate::layout::{NormalizeMode, StaticProbe, normalize};

    #[test]
    fn test_long_words_break() {
        let mut dom = parse_document("<h1>Headline</h1><p>Body</p><td>cell</td>");
        normalize(&mut dom, NormalizeMode::Detail, &StaticProbe::default());

        for tag in ["h1", "p"] {
            let id = dom.find_by_tag(tag).unwrap();
            let style = dom.inline_style(id);
            assert_eq!(style.get("overflow-wrap"), Some("break-word"));
            assert!(style.is_important("word-break"));
        }
    }
}
