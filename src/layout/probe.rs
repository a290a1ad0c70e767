//! Measurements the layout rules need from a rendering engine.

use crate::dom::{Dom, NodeId};
use crate::style::{DEFAULT_FONT_SIZE_PX, Length};

/// Source of computed sizes for elements of a rendered document.
///
/// A browser host answers from computed styles and bounding rects;
/// [`StaticProbe`] answers from the markup alone.
pub trait LayoutProbe {
    /// Width of the frame the document is displayed in.
    fn viewport_width(&self) -> Option<f32>;

    /// Computed `font-size` of an element in pixels.
    fn computed_font_size(&self, dom: &Dom, id: NodeId) -> Option<f32>;

    /// Rendered width of an element's box in pixels.
    fn box_width(&self, dom: &Dom, id: NodeId) -> Option<f32>;
}

/// Probe that reads sizes out of attributes and inline styles.
///
/// Widths come from `width` attributes and inline `width`/`min-width` in
/// absolute units; an element is as wide as its widest descendant. Font
/// sizes are resolved through inline `font-size` declarations up the tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProbe {
    viewport_width: Option<f32>,
}

impl StaticProbe {
    pub fn new(viewport_width: Option<f32>) -> Self {
        Self { viewport_width }
    }

    /// Width declared on the element itself.
    fn declared_width(dom: &Dom, id: NodeId) -> Option<f32> {
        let style = dom.inline_style(id);
        let from_style = ["width", "min-width"]
            .iter()
            .filter_map(|name| style.get(name))
            .filter_map(Length::parse)
            .filter_map(Length::as_px);
        let from_attr = dom
            .get_attr(id, "width")
            .and_then(Length::parse)
            .and_then(Length::as_px);

        from_style.chain(from_attr).reduce(f32::max)
    }
}

impl LayoutProbe for StaticProbe {
    fn viewport_width(&self) -> Option<f32> {
        self.viewport_width
    }

    fn computed_font_size(&self, dom: &Dom, id: NodeId) -> Option<f32> {
        if !dom.is_element(id) {
            return None;
        }

        let mut chain = vec![id];
        let mut current = dom.get(id).map_or(NodeId::NONE, |n| n.parent);
        while dom.is_element(current) {
            chain.push(current);
            current = dom.get(current).map_or(NodeId::NONE, |n| n.parent);
        }

        // Resolve from the root down so em/% compound.
        let mut size = DEFAULT_FONT_SIZE_PX;
        for &node in chain.iter().rev() {
            let declared = dom
                .inline_style(node)
                .get("font-size")
                .and_then(Length::parse_font_size);
            if let Some(px) = declared.and_then(|len| len.to_px(size, Some(size))) {
                size = px;
            }
        }
        Some(size)
    }

    fn box_width(&self, dom: &Dom, id: NodeId) -> Option<f32> {
        std::iter::once(id)
            .chain(dom.descendants(id))
            .filter(|&node| dom.is_element(node))
            .filter_map(|node| Self::declared_width(dom, node))
            .reduce(f32::max)
    }
}
