//! Inline content → Markdown.
//!
//! Emphasis is recovered from two sources: the element's own tag
//! (`<b>`, `<em>`, `<u>`, ...) and the element's CSS classes looked up in
//! [`StyleRules`]. Flags accumulate from ancestors and are applied only
//! when text is emitted, always in the same order: underline innermost,
//! then italic, then bold.

use percent_encoding::percent_decode_str;

use crate::css::{InlineStyle, StyleRules};
use crate::dom::{Dom, NodeData, NodeId};
use crate::util::normalize_ws;

/// Read-only context threaded through every render call.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub dom: &'a Dom,
    pub rules: &'a StyleRules,
}

impl<'a> RenderContext<'a> {
    pub fn new(dom: &'a Dom, rules: &'a StyleRules) -> Self {
        Self { dom, rules }
    }

    /// Render `node` and its subtree given the emphasis inherited from its
    /// ancestors.
    pub fn inline(&self, node: NodeId, inherited: InlineStyle) -> String {
        let Some(n) = self.dom.get(node) else {
            return String::new();
        };

        match &n.data {
            NodeData::Text(text) => format_inline(text, inherited),
            NodeData::Element { .. } => self.element(node, inherited),
            NodeData::Document => self.children(node, inherited),
            NodeData::Comment(_) | NodeData::Doctype(_) => String::new(),
        }
    }

    fn children(&self, node: NodeId, style: InlineStyle) -> String {
        self.dom
            .children(node)
            .map(|child| self.inline(child, style))
            .collect()
    }

    fn element(&self, node: NodeId, inherited: InlineStyle) -> String {
        let tag = self.dom.tag(node).unwrap_or_default();
        let current = inherited
            .union(tag_style(tag))
            .union(self.rules.resolve(self.dom.classes(node)));

        match tag {
            "br" => "  \n".to_string(),
            "a" => self.link(node, current),
            "img" => self.image(node),
            "style" | "script" | "head" | "title" => String::new(),
            _ => self.children(node, current),
        }
    }

    fn link(&self, node: NodeId, style: InlineStyle) -> String {
        let href = unwrap_redirect(self.dom.attr(node, "href").unwrap_or_default().trim());
        let label = self.children(node, style);
        let label = match label.trim() {
            "" => href.as_str(),
            trimmed => trimmed,
        };

        if href.is_empty() {
            label.to_string()
        } else {
            format!("[{label}]({href})")
        }
    }

    fn image(&self, node: NodeId) -> String {
        let src = normalize_image_src(self.dom.attr(node, "src").unwrap_or_default());
        if src.is_empty() {
            return String::new();
        }
        let alt = normalize_ws(self.dom.attr(node, "alt").unwrap_or_default());
        format!("![{alt}]({src})")
    }
}

/// Emphasis implied by the tag itself.
fn tag_style(tag: &str) -> InlineStyle {
    match tag {
        "strong" | "b" => InlineStyle::bold(),
        "em" | "i" => InlineStyle::italic(),
        "u" => InlineStyle::underline(),
        _ => InlineStyle::PLAIN,
    }
}

/// Wrap text in the markers for `style`: `<u>` innermost, then `*`, then `**`.
pub fn format_inline(text: &str, style: InlineStyle) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = text.to_string();
    if style.underline {
        out = format!("<u>{out}</u>");
    }
    if style.italic {
        out = format!("*{out}*");
    }
    if style.bold {
        out = format!("**{out}**");
    }
    out
}

/// Unwrap a Google redirect link (`https://www.google.com/url?q=<dest>&sa=D`)
/// to its destination. Any other URL is returned unchanged.
pub fn unwrap_redirect(url: &str) -> String {
    let Some((_, after_scheme)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = after_scheme
        .find(['/', '?', '#'])
        .unwrap_or(after_scheme.len());
    let host = &after_scheme[..authority_end];
    let rest = &after_scheme[authority_end..];

    let rest = rest.split('#').next().unwrap_or_default();
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

    if !host.ends_with("google.com") || path != "/url" {
        return url.to_string();
    }

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, value)| *key == "q" && !value.is_empty())
        .map(|(_, value)| {
            let value = value.replace('+', " ");
            percent_decode_str(&value).decode_utf8_lossy().into_owned()
        })
        .unwrap_or_else(|| url.to_string())
}

/// Point exported image paths at the project's figure directory.
pub fn normalize_image_src(src: &str) -> String {
    let src = src.trim();
    if let Some(rest) = src.strip_prefix("images/") {
        format!("../figures/{rest}")
    } else if let Some(rest) = src.strip_prefix("/images/") {
        format!("../figures/{rest}")
    } else {
        src.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn render_first(html: &str, tag: &str, css: &str) -> String {
        let dom = parse_html(html);
        let rules = StyleRules::parse(css);
        let ctx = RenderContext::new(&dom, &rules);
        let node = dom.find_by_tag(tag).expect("tag present");
        ctx.inline(node, InlineStyle::PLAIN)
    }

    #[test]
    fn test_format_order_is_fixed() {
        let all = InlineStyle {
            bold: true,
            italic: true,
            underline: true,
        };
        assert_eq!(format_inline("x", all), "***<u>x</u>***");
        assert_eq!(format_inline("", all), "");
        assert_eq!(format_inline("x", InlineStyle::PLAIN), "x");
    }

    #[test]
    fn test_nesting_order_does_not_matter() {
        let a = render_first("<p><em><strong>text</strong></em></p>", "p", "");
        let b = render_first("<p><strong><em>text</em></strong></p>", "p", "");
        assert_eq!(a, "***text***");
        assert_eq!(a, b);
    }

    #[test]
    fn test_class_rules_apply() {
        let css = ".c1{font-weight:700}.c2{font-style:italic}.c3{text-decoration:underline}";
        let out = render_first(
            r#"<p><span class="c1">bold</span> <span class="c2">it</span> <span class="c3">u</span></p>"#,
            "p",
            css,
        );
        assert_eq!(out, "**bold** *it* <u>u</u>");
    }

    #[test]
    fn test_flags_never_turn_off() {
        let css = ".c1{font-weight:700}.c4{font-weight:400}";
        let out = render_first(
            r#"<p><span class="c1">a<span class="c4">b</span></span></p>"#,
            "p",
            css,
        );
        assert_eq!(out, "**a****b**");
    }

    #[test]
    fn test_line_break() {
        assert_eq!(render_first("<p>a<br>b</p>", "p", ""), "a  \nb");
    }

    #[test]
    fn test_redirect_link() {
        let out = render_first(
            r#"<p><a href="https://google.com/url?q=https://example.com/page">text</a></p>"#,
            "p",
            "",
        );
        assert_eq!(out, "[text](https://example.com/page)");
    }

    #[test]
    fn test_link_without_label_uses_url() {
        let out = render_first(r#"<p><a href=" https://example.com "></a></p>"#, "p", "");
        assert_eq!(out, "[https://example.com](https://example.com)");
    }

    #[test]
    fn test_link_without_href_keeps_label() {
        assert_eq!(render_first(r#"<p><a id="x">anchor</a></p>"#, "p", ""), "anchor");
    }

    #[test]
    fn test_styled_link_label() {
        let out = render_first(
            r#"<p><a class="c3" href="https://x.org"><span class="c1">go</span></a></p>"#,
            "p",
            ".c1{font-weight:700}.c3{text-decoration:underline}",
        );
        assert_eq!(out, "[**<u>go</u>**](https://x.org)");
    }

    #[test]
    fn test_unwrap_redirect() {
        assert_eq!(
            unwrap_redirect("https://www.google.com/url?q=https://example.com/a%3Fb%3D1&sa=D&ust=1"),
            "https://example.com/a?b=1"
        );
        assert_eq!(
            unwrap_redirect("https://google.com/url?sa=D&q=https://x.org/a+b"),
            "https://x.org/a b"
        );
        assert_eq!(
            unwrap_redirect("https://www.google.com/url?q=https://example.com/a;jsessionid=1&sa=D"),
            "https://example.com/a;jsessionid=1"
        );
        assert_eq!(unwrap_redirect("https://google.com/url?q="), "https://google.com/url?q=");
        assert_eq!(unwrap_redirect("https://google.com/search?q=rust"), "https://google.com/search?q=rust");
        assert_eq!(unwrap_redirect("https://example.com/url?q=x"), "https://example.com/url?q=x");
        assert_eq!(unwrap_redirect("#h.abc"), "#h.abc");
        assert_eq!(unwrap_redirect(""), "");
    }

    #[test]
    fn test_image_paths() {
        assert_eq!(
            render_first(r#"<p><img src="images/diagram1.png"></p>"#, "p", ""),
            "![](../figures/diagram1.png)"
        );
        assert_eq!(
            render_first(r#"<p><img src="/images/a.png" alt=" Figure  1 "></p>"#, "p", ""),
            "![Figure 1](../figures/a.png)"
        );
        assert_eq!(render_first(r#"<p><img src=""></p>"#, "p", ""), "");
        assert_eq!(render_first(r#"<p><img></p>"#, "p", ""), "");
        assert_eq!(normalize_image_src(" https://cdn/x.png "), "https://cdn/x.png");
    }
}
