//! Chapter and appendix boundary detection.
//!
//! Markers are matched by exact equality on the canonical block text
//! (whitespace-normalized, lowercased, trailing colon dropped). Body text
//! that merely mentions "chapter 3" never matches. A missing marker is an
//! error, never a default.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

use super::blocks::Block;
use crate::dom::Dom;
use crate::error::{Error, Result};
use crate::util::canonical;

static APPENDIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^A([1-7]):\s*(.+)$").expect("valid appendix regex"));

const CHAPTER_13_PREFERRED: [&str; 2] = ["conclusion and future work", "conclusion"];

/// How many blocks before a heading may hold an earlier copy of its marker.
const LOOKBACK: usize = 3;

/// Block texts computed once per segmentation run.
#[derive(Debug, Clone)]
pub struct BlockTexts {
    /// Whitespace-normalized text of each block.
    pub text: Vec<String>,
    /// Canonical form of each block's text.
    pub canonical: Vec<String>,
    /// Whether each block is a heading.
    pub heading: Vec<bool>,
}

impl BlockTexts {
    pub fn new(dom: &Dom, blocks: &[Block]) -> Self {
        let text: Vec<String> = blocks.iter().map(|b| dom.block_text(b.node)).collect();
        let canonical = text.iter().map(|t| canonical(t)).collect();
        let heading = blocks.iter().map(|b| b.kind.is_heading()).collect();
        Self {
            text,
            canonical,
            heading,
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn is(&self, i: usize, marker: &str) -> bool {
        self.canonical[i] == marker
    }
}

fn chapter_marker(n: u32) -> String {
    format!("chapter {n}")
}

/// Boundary of chapter `n` (2..=12).
///
/// The first heading reading exactly "chapter n" anchors the search; an
/// identical marker in any of the three preceding blocks takes precedence,
/// the earliest one winning.
pub fn find_chapter_start(texts: &BlockTexts, n: u32) -> Result<usize> {
    let marker = chapter_marker(n);
    let heading_idx = (0..texts.len())
        .find(|&i| texts.heading[i] && texts.is(i, &marker))
        .ok_or_else(|| Error::not_found(format!("Chapter {n}")))?;

    let start = (heading_idx.saturating_sub(LOOKBACK)..heading_idx)
        .find(|&i| texts.is(i, &marker))
        .unwrap_or(heading_idx);

    debug!(chapter = n, heading_idx, start, "chapter boundary");
    Ok(start)
}

/// Boundary of chapter 1, searched before chapter 2.
///
/// Prefers the first "introduction" block, falling back to the *last*
/// "chapter 1" block.
pub fn find_chapter1_start(texts: &BlockTexts, chapter2_start: usize) -> Result<usize> {
    let end = chapter2_start.min(texts.len());

    let start = (0..end)
        .find(|&i| texts.is(i, "introduction"))
        .or_else(|| (0..end).rev().find(|&i| texts.is(i, &chapter_marker(1))))
        .ok_or_else(|| Error::not_found("Chapter 1 (Introduction)"))?;

    debug!(chapter = 1, start, "chapter boundary");
    Ok(start)
}

/// Boundary of chapter 13, searched after chapter 12.
///
/// Prefers the first "conclusion and future work" or "conclusion" block,
/// falling back to the first "chapter 13".
pub fn find_chapter13_start(texts: &BlockTexts, chapter12_start: usize) -> Result<usize> {
    let after = chapter12_start + 1..texts.len();

    let start = after
        .clone()
        .find(|&i| CHAPTER_13_PREFERRED.contains(&texts.canonical[i].as_str()))
        .or_else(|| after.clone().find(|&i| texts.is(i, &chapter_marker(13))))
        .ok_or_else(|| Error::not_found("Chapter 13 (Conclusion)"))?;

    debug!(chapter = 13, start, "chapter boundary");
    Ok(start)
}

/// First block after chapter 12 carrying any chapter 13 marker.
///
/// Appendix scanning starts after this block, which can precede the chosen
/// chapter 13 boundary when both "chapter 13" and "conclusion" appear.
pub fn first_chapter13_marker(texts: &BlockTexts, chapter12_start: usize) -> Result<usize> {
    let marker = chapter_marker(13);
    (chapter12_start + 1..texts.len())
        .find(|&i| {
            let c = texts.canonical[i].as_str();
            CHAPTER_13_PREFERRED.contains(&c) || c == marker
        })
        .ok_or_else(|| Error::not_found("Chapter 13 (Conclusion)"))
}

/// Appendix boundary found in the block sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendixMarker {
    /// 1..=7
    pub number: u8,
    pub index: usize,
    /// Full literal text, e.g. "A2: Interview protocol".
    pub title: String,
}

/// Locate A1..A7 after block `after`.
///
/// The first occurrence of each label wins; later repeats (a second table of
/// contents, cross references) are ignored. Returned in label order.
pub fn find_appendix_markers(texts: &BlockTexts, after: usize) -> Result<Vec<AppendixMarker>> {
    let mut found: [Option<AppendixMarker>; 7] = Default::default();

    for i in after + 1..texts.len() {
        let Some(caps) = APPENDIX_RE.captures(&texts.text[i]) else {
            continue;
        };
        let Ok(number) = caps[1].parse::<u8>() else {
            continue;
        };
        let slot = &mut found[usize::from(number - 1)];
        if slot.is_none() {
            debug!(appendix = number, index = i, "appendix boundary");
            *slot = Some(AppendixMarker {
                number,
                index: i,
                title: texts.text[i].clone(),
            });
        }
    }

    let missing: Vec<String> = found
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_none())
        .map(|(i, _)| format!("A{}", i + 1))
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingAppendices(missing));
    }

    Ok(found.into_iter().flatten().collect())
}
