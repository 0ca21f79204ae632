//! Flat extraction of top-level content blocks.

use crate::dom::{Dom, NodeId};

/// Closed set of block kinds the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `h1`–`h4`; the level is kept for rendering.
    Heading(u8),
    Paragraph,
    OrderedList,
    UnorderedList,
    Table,
    Rule,
}

impl BlockKind {
    /// Map a tag name to a block kind, `None` outside the extracted set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "h1" => BlockKind::Heading(1),
            "h2" => BlockKind::Heading(2),
            "h3" => BlockKind::Heading(3),
            "h4" => BlockKind::Heading(4),
            "p" => BlockKind::Paragraph,
            "ol" => BlockKind::OrderedList,
            "ul" => BlockKind::UnorderedList,
            "table" => BlockKind::Table,
            "hr" => BlockKind::Rule,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading(_))
    }
}

/// One top-level block of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Position in the flat sequence.
    pub index: usize,
    pub kind: BlockKind,
    /// Source element in the DOM.
    pub node: NodeId,
}

fn is_block_element(dom: &Dom, id: NodeId) -> bool {
    dom.tag(id).and_then(BlockKind::from_tag).is_some()
}

/// Walk the document body and return every block element that has no block
/// element among its ancestors, in document order.
///
/// Elements whose parent is `<style>` are skipped. An empty result is not an
/// error here; segmentation reports the missing markers.
pub fn extract_blocks(dom: &Dom) -> Vec<Block> {
    let root = dom.find_by_tag("body").unwrap_or_else(|| dom.document());
    let mut blocks = Vec::new();

    for id in dom.descendants(root) {
        let Some(kind) = dom.tag(id).and_then(BlockKind::from_tag) else {
            continue;
        };
        let parent = dom.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE);
        if parent.is_none() || dom.is_tag(parent, "style") {
            continue;
        }
        if dom.ancestors(id).any(|a| is_block_element(dom, a)) {
            continue;
        }
        blocks.push(Block {
            index: blocks.len(),
            kind,
            node: id,
        });
    }

    blocks
}
