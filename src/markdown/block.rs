//! One content block → one Markdown chunk.

use crate::css::InlineStyle;
use crate::segment::{Block, BlockKind};
use crate::util::normalize_ws;

use super::inline::RenderContext;

impl RenderContext<'_> {
    /// Render a single block. An empty string means "emit nothing".
    pub fn block(&self, block: &Block) -> String {
        match block.kind {
            BlockKind::Heading(level) => self.heading(block, level),
            BlockKind::Rule => "---".to_string(),
            BlockKind::OrderedList => self.list(block, true),
            BlockKind::UnorderedList => self.list(block, false),
            BlockKind::Paragraph => self.paragraph(block),
            BlockKind::Table => self.dom.outer_html(block.node),
        }
    }

    fn normalized(&self, node: crate::dom::NodeId) -> String {
        normalize_ws(&self.inline(node, InlineStyle::PLAIN))
    }

    fn heading(&self, block: &Block, level: u8) -> String {
        let title = self.normalized(block.node);
        if title.is_empty() {
            return String::new();
        }
        format!("{} {title}", "#".repeat(usize::from(level.min(6))))
    }

    fn list(&self, block: &Block, ordered: bool) -> String {
        let items = self
            .dom
            .children(block.node)
            .filter(|&child| self.dom.is_tag(child, "li"))
            .map(|li| self.normalized(li))
            .filter(|item| !item.is_empty());

        let lines: Vec<String> = if ordered {
            items
                .enumerate()
                .map(|(i, item)| format!("{}. {item}", i + 1))
                .collect()
        } else {
            items.map(|item| format!("- {item}")).collect()
        };
        lines.join("\n")
    }

    fn paragraph(&self, block: &Block) -> String {
        let text = self.normalized(block.node);
        if !text.is_empty() {
            return text;
        }

        // Image-only paragraphs have no text once whitespace is dropped.
        let images: Vec<String> = self
            .dom
            .descendants(block.node)
            .into_iter()
            .filter(|&d| self.dom.is_tag(d, "img"))
            .map(|img| self.inline(img, InlineStyle::PLAIN))
            .filter(|md| !md.is_empty())
            .collect();
        images.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use crate::css::StyleRules;
    use crate::dom::parse_html;
    use crate::markdown::RenderContext;
    use crate::segment::extract_blocks;

    fn render(html: &str) -> Vec<String> {
        let dom = parse_html(html);
        let rules = StyleRules::from_dom(&dom);
        let ctx = RenderContext::new(&dom, &rules);
        extract_blocks(&dom).iter().map(|b| ctx.block(b)).collect()
    }

    #[test]
    fn test_headings() {
        assert_eq!(
            render("<h1>Title</h1><h2> Sub  title </h2><h4><b>Deep</b></h4><h3> </h3>"),
            vec!["# Title", "## Sub title", "#### **Deep**", ""]
        );
    }

    #[test]
    fn test_ordered_list_skips_empty_items() {
        assert_eq!(
            render("<ol><li></li><li>First</li><li> Second </li></ol>"),
            vec!["1. First\n2. Second"]
        );
    }

    #[test]
    fn test_unordered_list_direct_items_only() {
        assert_eq!(
            render("<ul><li>a</li><li><span class=\"c1\">b</span></li></ul><style>.c1{font-style:italic}</style>"),
            vec!["- a\n- *b*"]
        );
    }

    #[test]
    fn test_rule() {
        assert_eq!(render("<p>a</p><hr><p>b</p>"), vec!["a", "---", "b"]);
    }

    #[test]
    fn test_paragraph_whitespace_is_normalized() {
        assert_eq!(render("<p>  one \n\t two\u{a0} </p>"), vec!["one two"]);
    }

    #[test]
    fn test_image_only_paragraph() {
        assert_eq!(
            render(r#"<p><span><img src="images/a.png"></span> <img src="images/b.png" alt="B"></p>"#),
            vec!["![](../figures/a.png) ![B](../figures/b.png)"]
        );
        assert_eq!(render(r#"<p><img src=""></p>"#), vec![""]);
    }

    #[test]
    fn test_table_passes_through() {
        let out = render("<table><tr><td>x &amp; y</td></tr></table>");
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("<table>"));
        assert!(out[0].contains("<td>x &amp; y</td>"));
        assert!(out[0].ends_with("</table>"));
    }
}
