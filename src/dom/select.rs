//! Compiled selector lists and document queries.

use cssparser::{Parser, ParserInput};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::parser::{ParseRelative, Selector, SelectorList};

use super::arena::{Dom, NodeId};
use super::element_ref::{ElementRef, FrameSelectors};
use crate::error::{Error, Result};

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone)]
pub struct Selectors {
    source: String,
    selectors: Vec<Selector<FrameSelectors>>,
}

impl Selectors {
    /// Parse a selector list such as `".container, div[align=center]"`.
    pub fn compile(source: &str) -> Result<Self> {
        let mut input = ParserInput::new(source);
        let mut parser = Parser::new(&mut input);
        let list = SelectorList::parse(&FrameSelectors, &mut parser, ParseRelative::No)
            .map_err(|e| Error::Selector(format!("{source}: {:?}", e.kind)))?;

        Ok(Self {
            source: source.to_string(),
            selectors: list.slice().to_vec(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check whether the element matches any selector in the list.
    pub fn matches(&self, dom: &Dom, id: NodeId) -> bool {
        if !dom.is_element(id) {
            return false;
        }
        let mut caches = SelectorCaches::default();
        self.matches_with_caches(ElementRef::new(dom, id), &mut caches)
    }

    fn matches_with_caches(&self, elem: ElementRef<'_>, caches: &mut SelectorCaches) -> bool {
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );

        self.selectors.iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
        })
    }
}

impl Dom {
    /// All attached elements matching `selectors`, in document order.
    pub fn select(&self, selectors: &Selectors) -> Vec<NodeId> {
        let mut caches = SelectorCaches::default();
        self.elements()
            .into_iter()
            .filter(|&id| selectors.matches_with_caches(ElementRef::new(self, id), &mut caches))
            .collect()
    }
}
