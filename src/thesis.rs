//! A parsed thesis document ready for segmentation and rendering.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::css::StyleRules;
use crate::dom::{self, Dom};
use crate::error::{Error, Result};
use crate::markdown::{self, RenderContext};
use crate::segment::{self, AppendixSection, Block, BlockTexts, NumberedSection, Segmentation};

/// The source document with its style table and flat block sequence.
///
/// Everything here is computed once at load time and never mutated, so any
/// number of sections can be rendered from the same value.
pub struct Thesis {
    dom: Dom,
    rules: StyleRules,
    blocks: Vec<Block>,
    texts: BlockTexts,
    source: String,
}

impl Thesis {
    /// Read and parse an HTML file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_dom(
            dom::parse_html_bytes(&bytes),
            path.display().to_string(),
        ))
    }

    /// Parse an in-memory document. `source` is how the input is named in
    /// generated placeholder text.
    pub fn from_html(html: &str, source: impl Into<String>) -> Self {
        Self::from_dom(dom::parse_html(html), source.into())
    }

    fn from_dom(dom: Dom, source: String) -> Self {
        let rules = StyleRules::from_dom(&dom);
        let blocks = segment::extract_blocks(&dom);
        let texts = BlockTexts::new(&dom, &blocks);
        debug!(
            nodes = dom.len(),
            classes = rules.len(),
            blocks = blocks.len(),
            "loaded document"
        );
        Self {
            dom,
            rules,
            blocks,
            texts,
            source,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn texts(&self) -> &BlockTexts {
        &self.texts
    }

    pub fn rules(&self) -> &StyleRules {
        &self.rules
    }

    pub fn context(&self) -> RenderContext<'_> {
        RenderContext::new(&self.dom, &self.rules)
    }

    /// Locate every chapter and appendix boundary.
    pub fn segment(&self) -> Result<Segmentation> {
        segment::segment(&self.texts)
    }

    pub fn chapter_markdown(&self, section: &NumberedSection) -> String {
        markdown::render_chapter(&self.context(), &self.blocks, &self.texts, section)
    }

    pub fn appendix_group_markdown(&self, sections: &[&AppendixSection]) -> String {
        markdown::render_appendix_group(&self.context(), &self.blocks, sections)
    }

    /// `index.qmd` content: the abstract found before chapter 1, or a
    /// placeholder.
    pub fn abstract_markdown(&self, segmentation: &Segmentation) -> String {
        let chapter1 = segmentation
            .chapter(1)
            .map_or(self.blocks.len(), |c| c.start);
        markdown::render_abstract(
            &self.context(),
            &self.blocks,
            &self.texts,
            chapter1,
            &self.source,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_html_collects_blocks_and_rules() {
        let thesis = Thesis::from_html(
            "<html><head><style>.c1{font-weight:700}</style></head>\
             <body><p class=\"c0\"><span class=\"c1\">Title</span></p><h1>Abstract</h1></body></html>",
            "inline.html",
        );
        assert_eq!(thesis.source(), "inline.html");
        assert_eq!(thesis.blocks().len(), 2);
        assert_eq!(thesis.texts().text, vec!["Title", "Abstract"]);
        assert_eq!(thesis.rules().len(), 1);
    }

    #[test]
    fn test_segment_without_markers_fails() {
        let thesis = Thesis::from_html("<p>Just a paragraph</p>", "x.html");
        assert!(thesis.segment().is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let err = Thesis::open("/nonexistent/thesis.html").err().unwrap();
        assert!(matches!(err, Error::Read { ref path, .. } if path.ends_with("thesis.html")));
        assert!(
            err.to_string()
                .starts_with("failed to read /nonexistent/thesis.html: ")
        );
    }
}
