//! Splitting the flat block sequence into chapters and appendices.
//!
//! - [`blocks`]: the Block Extractor
//! - [`boundary`]: marker search for each chapter and appendix
//!
//! [`segment`] ties them together and enforces the structural invariants:
//! chapters 1..13 and appendices A1..A7 all present, boundaries strictly
//! increasing, and every block after chapter 1's boundary owned by exactly
//! one section.

pub mod blocks;
pub mod boundary;

use std::ops::Range;

use tracing::info;

pub use blocks::{Block, BlockKind, extract_blocks};
pub use boundary::{AppendixMarker, BlockTexts};

use crate::dom::Dom;
use crate::error::{Error, Result};

pub const CHAPTER_COUNT: u32 = 13;
pub const APPENDIX_COUNT: u8 = 7;

/// One chapter of the thesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedSection {
    pub number: u32,
    /// Index of the boundary block; the block itself becomes the heading.
    pub start: usize,
    /// Literal text of the boundary block.
    pub source_title: String,
    /// Body blocks, half-open, boundary excluded.
    pub blocks: Range<usize>,
}

/// One appendix entry (`A1`..`A7`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendixSection {
    pub label: String,
    pub start: usize,
    /// Literal "A<n>: <title>" text of the boundary block.
    pub title: String,
    pub blocks: Range<usize>,
}

/// Result of segmenting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    /// Chapters 1..=13 in order.
    pub chapters: Vec<NumberedSection>,
    /// Appendices A1..=A7 in order.
    pub appendices: Vec<AppendixSection>,
}

impl Segmentation {
    pub fn chapter(&self, number: u32) -> Option<&NumberedSection> {
        self.chapters.iter().find(|c| c.number == number)
    }

    pub fn appendix(&self, label: &str) -> Option<&AppendixSection> {
        self.appendices.iter().find(|a| a.label == label)
    }

    pub fn chapter_numbers(&self) -> Vec<u32> {
        self.chapters.iter().map(|c| c.number).collect()
    }

    pub fn appendix_labels(&self) -> Vec<&str> {
        self.appendices.iter().map(|a| a.label.as_str()).collect()
    }
}

/// Locate all 13 chapter boundaries and slice the sequence between them.
///
/// The last chapter runs to the end of the sequence; [`segment`] later cuts
/// it at the first appendix.
pub fn split_numbered_sections(texts: &BlockTexts) -> Result<Vec<NumberedSection>> {
    let mut starts: Vec<(u32, usize)> = Vec::with_capacity(CHAPTER_COUNT as usize);

    for n in 2..CHAPTER_COUNT {
        starts.push((n, boundary::find_chapter_start(texts, n)?));
    }
    let chapter2 = starts[0].1;
    let chapter12 = starts[starts.len() - 1].1;

    starts.push((1, boundary::find_chapter1_start(texts, chapter2)?));
    starts.push((
        CHAPTER_COUNT,
        boundary::find_chapter13_start(texts, chapter12)?,
    ));
    starts.sort_unstable();

    let numbers: Vec<u32> = starts.iter().map(|&(n, _)| n).collect();
    if numbers != (1..=CHAPTER_COUNT).collect::<Vec<_>>() {
        return Err(Error::ChapterSetMismatch(numbers));
    }

    for pair in starts.windows(2) {
        let ((a, a_idx), (b, b_idx)) = (pair[0], pair[1]);
        if b_idx <= a_idx {
            return Err(Error::BoundaryOrder {
                first: format!("Chapter {a}"),
                first_index: a_idx,
                second: format!("Chapter {b}"),
                second_index: b_idx,
            });
        }
    }

    Ok(starts
        .iter()
        .enumerate()
        .map(|(i, &(number, start))| {
            let end = starts.get(i + 1).map_or(texts.len(), |&(_, next)| next);
            NumberedSection {
                number,
                start,
                source_title: texts.text[start].clone(),
                blocks: start + 1..end,
            }
        })
        .collect())
}

/// Locate A1..A7 after block `after` and slice between them in label order.
pub fn split_appendices(texts: &BlockTexts, after: usize) -> Result<Vec<AppendixSection>> {
    let markers = boundary::find_appendix_markers(texts, after)?;

    for pair in markers.windows(2) {
        if pair[1].index <= pair[0].index {
            return Err(Error::BoundaryOrder {
                first: format!("A{}", pair[0].number),
                first_index: pair[0].index,
                second: format!("A{}", pair[1].number),
                second_index: pair[1].index,
            });
        }
    }

    Ok(markers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = markers.get(i + 1).map_or(texts.len(), |next| next.index);
            AppendixSection {
                label: format!("A{}", m.number),
                start: m.index,
                title: m.title.clone(),
                blocks: m.index + 1..end,
            }
        })
        .collect())
}

/// Segment a block sequence into chapters and appendices.
///
/// Chapter 13 is truncated at the first appendix boundary, since the export
/// has no structural separator between the conclusion and the appendices.
pub fn segment(texts: &BlockTexts) -> Result<Segmentation> {
    let mut chapters = split_numbered_sections(texts)?;

    let chapter12 = chapters[CHAPTER_COUNT as usize - 2].start;
    let marker = boundary::first_chapter13_marker(texts, chapter12)?;
    let appendices = split_appendices(texts, marker)?;

    let last = &mut chapters[CHAPTER_COUNT as usize - 1];
    let first_appendix = appendices
        .iter()
        .map(|a| a.start)
        .min()
        .unwrap_or(texts.len());
    if first_appendix <= last.start {
        return Err(Error::BoundaryOrder {
            first: format!("Chapter {CHAPTER_COUNT}"),
            first_index: last.start,
            second: "A1".to_string(),
            second_index: first_appendix,
        });
    }
    last.blocks = last.start + 1..first_appendix;

    info!(
        blocks = texts.len(),
        chapters = chapters.len(),
        appendices = appendices.len(),
        "segmented document"
    );

    Ok(Segmentation {
        chapters,
        appendices,
    })
}

/// Extract blocks from a parsed document and segment them.
pub fn segment_dom(dom: &Dom) -> Result<(Vec<Block>, BlockTexts, Segmentation)> {
    let blocks = extract_blocks(dom);
    let texts = BlockTexts::new(dom, &blocks);
    let segmentation = segment(&texts)?;
    Ok((blocks, texts, segmentation))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::util::canonical;

    /// `(text, is_heading)` pairs for a well-formed thesis with `filler`
    /// body blocks after every boundary.
    fn thesis_items(filler: &[usize]) -> Vec<(String, bool)> {
        let mut items: Vec<(String, bool)> = vec![
            ("Title page".into(), false),
            ("Abstract".into(), true),
            ("An abstract.".into(), false),
        ];
        let mut fill = filler.iter().copied().cycle();
        let mut push_body = |items: &mut Vec<(String, bool)>| {
            for k in 0..fill.next().unwrap_or(1) {
                items.push((format!("body {k}"), false));
            }
        };

        items.push(("Introduction".into(), true));
        push_body(&mut items);
        for n in 2..=12 {
            items.push((format!("Chapter {n}"), true));
            push_body(&mut items);
        }
        items.push(("Conclusion".into(), true));
        push_body(&mut items);
        for n in 1..=7 {
            items.push((format!("A{n}: Appendix {n}"), false));
            push_body(&mut items);
        }
        items
    }

    fn texts_of(items: &[(String, bool)]) -> BlockTexts {
        let text: Vec<String> = items.iter().map(|(t, _)| t.clone()).collect();
        BlockTexts {
            canonical: text.iter().map(|t| canonical(t)).collect(),
            heading: items.iter().map(|(_, h)| *h).collect(),
            text,
        }
    }

    fn thesis(filler: &[usize]) -> BlockTexts {
        texts_of(&thesis_items(filler))
    }

    fn without(texts: &BlockTexts, marker: &str) -> BlockTexts {
        let mut texts = texts.clone();
        for i in 0..texts.len() {
            if texts.text[i] == marker {
                texts.text[i] = "removed".into();
                texts.canonical[i] = "removed".into();
            }
        }
        texts
    }

    #[test]
    fn test_well_formed_thesis() {
        let texts = thesis(&[2]);
        let seg = segment(&texts).unwrap();

        assert_eq!(seg.chapter_numbers(), (1..=13).collect::<Vec<_>>());
        assert_eq!(
            seg.appendix_labels(),
            vec!["A1", "A2", "A3", "A4", "A5", "A6", "A7"]
        );

        let ch1 = seg.chapter(1).unwrap();
        assert_eq!(ch1.source_title, "Introduction");
        assert_eq!(ch1.start, 3);
        assert_eq!(ch1.blocks, 4..6);

        let ch13 = seg.chapter(13).unwrap();
        assert_eq!(ch13.source_title, "Conclusion");
        assert_eq!(ch13.blocks.end, seg.appendix("A1").unwrap().start);

        let a7 = seg.appendix("A7").unwrap();
        assert_eq!(a7.title, "A7: Appendix 7");
        assert_eq!(a7.blocks.end, texts.len());
    }

    #[test]
    fn test_each_missing_marker_is_fatal_and_named() {
        let texts = thesis(&[1]);
        for n in 2..=12 {
            let err = segment(&without(&texts, &format!("Chapter {n}"))).unwrap_err();
            assert_eq!(err.to_string(), format!("Could not find boundary for Chapter {n}"));
        }

        let err = segment(&without(&texts, "Introduction")).unwrap_err();
        assert!(err.to_string().contains("Chapter 1"));

        let err = segment(&without(&texts, "Conclusion")).unwrap_err();
        assert!(err.to_string().contains("Chapter 13"));

        for n in 1..=7 {
            let err = segment(&without(&texts, &format!("A{n}: Appendix {n}"))).unwrap_err();
            assert_eq!(err.to_string(), format!("Missing appendix headings: A{n}"));
        }
    }

    #[test]
    fn test_empty_sequence_fails_on_first_marker() {
        let texts = BlockTexts {
            text: vec![],
            canonical: vec![],
            heading: vec![],
        };
        assert!(matches!(
            segment(&texts),
            Err(Error::BoundaryNotFound { marker }) if marker == "Chapter 2"
        ));
    }

    #[test]
    fn test_out_of_order_chapters_are_fatal() {
        let mut texts = thesis(&[1]);
        // Swap the Chapter 4 and Chapter 5 headings.
        let i4 = texts.text.iter().position(|t| t == "Chapter 4").unwrap();
        let i5 = texts.text.iter().position(|t| t == "Chapter 5").unwrap();
        texts.text.swap(i4, i5);
        texts.canonical.swap(i4, i5);

        assert!(matches!(
            segment(&texts),
            Err(Error::BoundaryOrder { ref first, ref second, .. })
                if first == "Chapter 4" && second == "Chapter 5"
        ));
    }

    #[test]
    fn test_out_of_order_appendices_are_fatal() {
        let mut items = thesis_items(&[1]);
        let a2 = items.iter().position(|(t, _)| t == "A2: Appendix 2").unwrap();
        let a3 = items.iter().position(|(t, _)| t == "A3: Appendix 3").unwrap();
        items.swap(a2, a3);

        match segment(&texts_of(&items)) {
            Err(Error::BoundaryOrder {
                first,
                first_index,
                second,
                second_index,
            }) => {
                assert_eq!((first.as_str(), second.as_str()), ("A2", "A3"));
                assert_eq!((first_index, second_index), (a3, a2));
            }
            other => panic!("expected appendix ordering error, got {other:?}"),
        }
    }

    #[test]
    fn test_appendix_before_last_chapter_is_fatal() {
        // "Chapter 13" opens the appendix scan, but the preferred
        // "Conclusion" boundary only appears after A1.
        let mut items = thesis_items(&[1]);
        let conclusion = items.iter().position(|(t, _)| t == "Conclusion").unwrap();
        items[conclusion].0 = "Chapter 13".into();
        let a1 = items.iter().position(|(t, _)| t == "A1: Appendix 1").unwrap();
        items.insert(a1 + 1, ("Conclusion".into(), true));

        match segment(&texts_of(&items)) {
            Err(Error::BoundaryOrder {
                first,
                first_index,
                second,
                second_index,
            }) => {
                assert_eq!((first.as_str(), second.as_str()), ("Chapter 13", "A1"));
                assert_eq!((first_index, second_index), (a1 + 1, a1));
            }
            other => panic!("expected chapter 13 ordering error, got {other:?}"),
        }
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let texts = thesis(&[3, 1, 2]);
        assert_eq!(segment(&texts).unwrap(), segment(&texts).unwrap());
    }

    proptest! {
        #[test]
        fn sections_partition_the_sequence(filler in prop::collection::vec(0usize..4, 1..8)) {
            let texts = thesis(&filler);
            let seg = segment(&texts).unwrap();

            let mut owned = vec![0u32; texts.len()];
            let mut last_start = None;
            let starts = seg
                .chapters
                .iter()
                .map(|c| (c.start, c.blocks.clone()))
                .chain(seg.appendices.iter().map(|a| (a.start, a.blocks.clone())));
            for (start, body) in starts {
                if let Some(prev) = last_start {
                    prop_assert!(start > prev);
                }
                last_start = Some(start);
                prop_assert_eq!(body.start, start + 1);
                owned[start] += 1;
                for i in body {
                    owned[i] += 1;
                }
            }

            let first = seg.chapter(1).unwrap().start;
            prop_assert!(owned[..first].iter().all(|&c| c == 0));
            prop_assert!(owned[first..].iter().all(|&c| c == 1));
        }
    }
}
