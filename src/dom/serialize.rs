//! Serialize a DOM subtree back to HTML markup.
//!
//! Tables are passed through to the Markdown output untouched, so their
//! original markup is reproduced with html5ever's own serializer.

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};

use super::arena::{Dom, NodeData, NodeId};

/// A node together with the DOM it lives in.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    dom: &'a Dom,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn new(dom: &'a Dom, id: NodeId) -> Self {
        Self { dom, id }
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let Some(node) = self.dom.get(self.id) else {
            return Ok(());
        };

        match (&node.data, traversal_scope) {
            (NodeData::Element { name, attrs, .. }, TraversalScope::IncludeNode) => {
                serializer.start_elem(
                    name.clone(),
                    attrs.iter().map(|a| (&a.name, a.value.as_str())),
                )?;
                for child in self.dom.children(self.id) {
                    NodeRef::new(self.dom, child)
                        .serialize(serializer, TraversalScope::IncludeNode)?;
                }
                serializer.end_elem(name.clone())
            }
            (NodeData::Text(text), TraversalScope::IncludeNode) => serializer.write_text(text),
            (NodeData::Comment(text), TraversalScope::IncludeNode) => {
                serializer.write_comment(text)
            }
            (NodeData::Doctype(name), TraversalScope::IncludeNode) => {
                serializer.write_doctype(name)
            }
            (_, TraversalScope::ChildrenOnly(_)) => {
                for child in self.dom.children(self.id) {
                    NodeRef::new(self.dom, child)
                        .serialize(serializer, TraversalScope::IncludeNode)?;
                }
                Ok(())
            }
            (NodeData::Document, TraversalScope::IncludeNode) => Ok(()),
        }
    }
}

impl Dom {
    /// Markup of `id` including its own tags.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut buf = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        };
        // Writing into a Vec cannot fail.
        if serialize(&mut buf, &NodeRef::new(self, id), opts).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
