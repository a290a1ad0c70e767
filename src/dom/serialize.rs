//! HTML serialization of a [`Dom`] through html5ever's serializer.
//!
//! Serialization runs with scripting disabled, matching how a sandboxed
//! iframe without `allow-scripts` parses the result: `<noscript>` children
//! are markup, not raw text. Raw-text handling only applies to elements in
//! the HTML namespace, so `<svg><style>` content is escaped.

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};
use tracing::warn;

use super::arena::{Dom, NodeData, NodeId};

/// A node handle html5ever can walk.
struct SerializableNode<'a> {
    dom: &'a Dom,
    id: NodeId,
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match traversal_scope {
            TraversalScope::IncludeNode => write_node(self.dom, self.id, serializer),
            TraversalScope::ChildrenOnly(_) => {
                for child in self.dom.children(self.id) {
                    write_node(self.dom, child, serializer)?;
                }
                Ok(())
            }
        }
    }
}

fn write_node<S: Serializer>(dom: &Dom, id: NodeId, serializer: &mut S) -> io::Result<()> {
    let Some(node) = dom.get(id) else {
        return Ok(());
    };

    match &node.data {
        NodeData::Document => {
            for child in dom.children(id) {
                write_node(dom, child, serializer)?;
            }
            Ok(())
        }
        NodeData::Doctype { name } => serializer.write_doctype(name),
        NodeData::Comment(text) => serializer.write_comment(text),
        NodeData::Text(text) => serializer.write_text(text),
        NodeData::Element { name, attrs } => {
            let attrs = attrs.iter().map(|attr| (&attr.name, attr.value.as_str()));
            serializer.start_elem(name.clone(), attrs)?;
            for child in dom.children(id) {
                write_node(dom, child, serializer)?;
            }
            serializer.end_elem(name.clone())
        }
    }
}

impl Dom {
    /// Serialize the whole document, doctype included.
    pub fn to_html(&self) -> String {
        self.serialize_scope(self.document(), TraversalScope::ChildrenOnly(None))
    }

    /// Serialize the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let parent = self.get(id).and_then(|node| match &node.data {
            NodeData::Element { name, .. } => Some(name.clone()),
            _ => None,
        });
        self.serialize_scope(id, TraversalScope::ChildrenOnly(parent))
    }

    /// Serialize `id` and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        self.serialize_scope(id, TraversalScope::IncludeNode)
    }

    fn serialize_scope(&self, id: NodeId, traversal_scope: TraversalScope) -> String {
        let mut bytes = Vec::new();
        let opts = SerializeOpts {
            scripting_enabled: false,
            traversal_scope,
            create_missing_parent: false,
        };

        if let Err(err) = serialize(&mut bytes, &SerializableNode { dom: self, id }, opts) {
            warn!(%err, "HTML serialization failed");
        }
        String::from_utf8(bytes).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use html5ever::ns;

    use crate::dom::parse_document;

    #[test]
    fn test_roundtrip_simple_document() {
        let dom = parse_document("<!DOCTYPE html><html><head></head><body><p>Hi</p></body></html>");
        assert_eq!(
            dom.to_html(),
            "<!DOCTYPE html><html><head></head><body><p>Hi</p></body></html>"
        );
    }

    #[test]
    fn test_void_and_escaping() {
        let dom = parse_document(r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2<br>x&nbsp;y</p>"#);
        let body = dom.body().unwrap();
        assert_eq!(
            dom.inner_html(body),
            r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2<br>x&nbsp;y</p>"#
        );
    }

    #[test]
    fn test_raw_text_not_escaped() {
        let dom = parse_document("<style>td > p { color: red; }</style><p>a</p>");
        assert!(dom.to_html().contains("<style>td > p { color: red; }</style>"));

        let style = dom.find_by_tag("style").unwrap();
        assert_eq!(dom.inner_html(style), "td > p { color: red; }");
    }

    #[test]
    fn test_foreign_style_is_escaped() {
        let dom = parse_document("<svg><style>&lt;b&gt;</style></svg>");
        let style = dom.find_by_tag("style").unwrap();

        assert_eq!(dom.element_namespace(style), Some(&ns!(svg)));
        assert_eq!(dom.outer_html(style), "<style>&lt;b&gt;</style>");
    }

    #[test]
    fn test_noscript_children_are_markup() {
        let dom = parse_document("<noscript><p>a &amp; b</p></noscript>");
        let noscript = dom.find_by_tag("noscript").unwrap();

        assert!(dom.find_by_tag("p").is_some());
        assert_eq!(dom.inner_html(noscript), "<p>a &amp; b</p>");
    }

    #[test]
    fn test_comments_kept() {
        let dom = parse_document("<p>a<!-- note -->b</p>");
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(dom.outer_html(p), "<p>a<!-- note -->b</p>");
    }
}
