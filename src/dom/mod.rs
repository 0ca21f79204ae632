//! HTML parsing into an arena DOM.
//!
//! - [`arena`]: the node arena and read accessors
//! - [`tree_sink`]: html5ever `TreeSink` building the arena
//! - [`serialize`]: outer-HTML serialization of a subtree

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, Dom, Node, NodeData, NodeId};
pub use serialize::NodeRef;
pub use tree_sink::DomSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse an HTML string into a [`Dom`].
pub fn parse_html(html: &str) -> Dom {
    let sink = DomSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// Parse raw HTML bytes, decoding them first.
///
/// UTF-8 is tried first; a `<meta charset>` hint is honoured when the bytes
/// are not valid UTF-8, with Windows-1252 as the last resort.
pub fn parse_html_bytes(bytes: &[u8]) -> Dom {
    let hint = crate::util::extract_meta_charset(bytes);
    let html = crate::util::decode_text(bytes, hint);
    parse_html(&html)
}

/// Concatenated text of every `<style>` element in the document.
pub fn style_text(dom: &Dom) -> String {
    let mut css = String::new();
    for id in dom.descendants(dom.document()) {
        if !dom.is_tag(id, "style") {
            continue;
        }
        for child in dom.children(id) {
            if let Some(t) = dom.text(child) {
                css.push_str(t);
                css.push('\n');
            }
        }
    }
    css
}
