//! Inline styles on DOM elements.
//!
//! The layout engine never edits stylesheets; every correction is an
//! inline declaration with `!important`, which beats the author's inline
//! styles and presentational attributes alike.

mod inline;
mod values;

pub use inline::{InlineStyle, StyleDeclaration};
pub use values::{DEFAULT_FONT_SIZE_PX, Length, format_px};

use crate::dom::{Dom, NodeId};

impl Dom {
    /// Parsed `style` attribute of an element (empty when absent).
    pub fn inline_style(&self, id: NodeId) -> InlineStyle {
        self.get_attr(id, "style")
            .map(InlineStyle::parse)
            .unwrap_or_default()
    }

    /// Edit an element's inline style in place.
    ///
    /// Returns `false` when `id` is not an element.
    pub fn update_style<F>(&mut self, id: NodeId, edit: F) -> bool
    where
        F: FnOnce(&mut InlineStyle),
    {
        if !self.is_element(id) {
            return false;
        }
        let mut style = self.inline_style(id);
        edit(&mut style);
        if style.is_empty() {
            self.remove_attrs(id, |a| a.name.local.as_ref() == "style");
        } else {
            self.set_attr(id, "style", &style.to_css());
        }
        true
    }

    /// Force each `(property, value)` pair with `!important`.
    pub fn force_styles(&mut self, id: NodeId, properties: &[(&str, &str)]) -> bool {
        self.update_style(id, |style| {
            for (name, value) in properties {
                style.set_important(name, value);
            }
        })
    }
}
