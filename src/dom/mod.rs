//! Arena DOM for newsletter documents.
//!
//! Newsletters are parsed with html5ever into a [`Dom`], the sanitizer and
//! the layout engine edit it as a tree, and it is serialized back to HTML.
//!
//! ```
//! use mailframe::dom::{parse_document, Selectors};
//!
//! let dom = parse_document(r#"<table width="600"><tr><td>Hi</td></tr></table>"#);
//! let tables = dom.select(&Selectors::compile("table").unwrap());
//! assert_eq!(dom.get_attr(tables[0], "width"), Some("600"));
//! ```

mod arena;
mod element_ref;
mod select;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Dom, Node, NodeData, NodeId};
pub use element_ref::{ElementRef, FrameSelectors};
pub use select::Selectors;

use html5ever::driver::ParseOpts;
use html5ever::parse_document as html5ever_parse;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;

use tree_sink::DomSink;

/// Parse HTML into a [`Dom`].
///
/// Fragments are accepted: the parser supplies `html`, `head` and `body`
/// the way a browser does when content is written into an iframe. Scripting
/// is off, as in a sandboxed frame, so `<noscript>` content is parsed as
/// elements the sanitizer can see.
pub fn parse_document(html: &str) -> Dom {
    let sink = DomSink::new();
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    html5ever_parse(sink, opts)
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}
