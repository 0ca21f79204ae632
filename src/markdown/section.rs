//! Whole-section rendering: chapters, appendix groups and the abstract.

use std::ops::Range;
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::warn;

use super::inline::RenderContext;
use crate::segment::{AppendixSection, Block, BlockTexts, NumberedSection};

static LOOSE_BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+?)\s+\*\*").expect("valid bold regex"));
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank-line regex"));
static APPENDIX_LEAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\n)\*{0,2}A1:\s").expect("valid appendix leak regex"));

/// Render a run of blocks into one Markdown body.
///
/// Blocks are separated by a blank line, trailing spaces inside bold runs
/// are pulled out (`**text **` → `**text**`), and blank-line runs collapse
/// to one. A non-empty result ends in exactly one newline.
pub fn render_blocks(ctx: &RenderContext<'_>, blocks: &[Block]) -> String {
    let mut lines = Vec::with_capacity(blocks.len() * 2);
    for block in blocks {
        let md = ctx.block(block);
        if !md.is_empty() {
            lines.push(md);
            lines.push(String::new());
        }
    }

    let text = lines.join("\n");
    let text = LOOSE_BOLD_RE.replace_all(&text, "**$1**");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    let text = text.trim();
    if text.is_empty() {
        String::new()
    } else {
        format!("{text}\n")
    }
}

fn slice<'b>(blocks: &'b [Block], range: &Range<usize>) -> &'b [Block] {
    let end = range.end.min(blocks.len());
    &blocks[range.start.min(end)..end]
}

/// Render one chapter file.
///
/// The source heading is kept as a subtitle unless it only repeats the
/// chapter number or reads "Introduction".
pub fn render_chapter(
    ctx: &RenderContext<'_>,
    blocks: &[Block],
    texts: &BlockTexts,
    section: &NumberedSection,
) -> String {
    let mut lines = vec![format!("# Chapter {}", section.number), String::new()];

    let source = texts.canonical.get(section.start).map_or("", String::as_str);
    if source != format!("chapter {}", section.number) && source != "introduction" {
        lines.push(format!("## {}", section.source_title));
        lines.push(String::new());
    }

    let body = render_blocks(ctx, slice(blocks, &section.blocks));
    let mut body = body.trim();
    if section.number == crate::segment::CHAPTER_COUNT
        && let Some(m) = APPENDIX_LEAK_RE.find(body)
    {
        body = body[..m.start()].trim_end();
    }
    lines.push(body.to_string());

    format!("{}\n", lines.join("\n").trim())
}

/// Render one appendix entry: its full "A<n>: title" heading and body.
pub fn render_appendix(ctx: &RenderContext<'_>, blocks: &[Block], section: &AppendixSection) -> String {
    let body = render_blocks(ctx, slice(blocks, &section.blocks));
    format!("# {}\n\n{}", section.title, body)
}

/// Render several appendix entries into one file.
pub fn render_appendix_group(
    ctx: &RenderContext<'_>,
    blocks: &[Block],
    sections: &[&AppendixSection],
) -> String {
    let entries: Vec<String> = sections
        .iter()
        .map(|s| render_appendix(ctx, blocks, s).trim_end().to_string())
        .collect();
    format!("{}\n", entries.join("\n\n").trim())
}

/// Render `index.qmd` from the front matter before chapter 1.
///
/// The body is whatever follows the first "Abstract" block, starting at the
/// first block with text. Without one, a placeholder naming `input_name` is
/// produced instead.
pub fn render_abstract(
    ctx: &RenderContext<'_>,
    blocks: &[Block],
    texts: &BlockTexts,
    chapter1_start: usize,
    input_name: &str,
) -> String {
    let end = chapter1_start.min(blocks.len()).min(texts.len());

    if let Some(heading) = (0..end).find(|&i| texts.canonical[i] == "abstract")
        && let Some(first) = (heading + 1..end).find(|&i| !texts.text[i].is_empty())
    {
        let body = render_blocks(ctx, &blocks[first..end]);
        let body = body.trim();
        if !body.is_empty() {
            return format!("# Abstract\n\n{body}\n");
        }
    }

    warn!(input = input_name, "no abstract found; writing placeholder");
    format!(
        "# Abstract\n\nThis thesis was converted from `{input_name}`. \
         Add the final abstract text here if needed.\n"
    )
}
