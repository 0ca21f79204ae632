//! # thesis-qmd
//!
//! Split a single-file thesis HTML export (Google Docs style, with emphasis
//! carried by CSS classes) into a Quarto project of Markdown chapter files.
//!
//! ## Pipeline
//!
//! 1. [`dom`]: decode and parse the HTML into an arena DOM
//! 2. [`css`]: build the class → bold/italic/underline table
//! 3. [`segment`]: flatten the body into blocks and find the 13 chapter and
//!    7 appendix boundaries
//! 4. [`markdown`]: render blocks, sections and the abstract
//! 5. [`export`]: lay the files out and write them
//!
//! ## Quick Start
//!
//! ```no_run
//! use thesis_qmd::Thesis;
//!
//! let thesis = Thesis::open("thesis.html")?;
//! let segmentation = thesis.segment()?;
//! for chapter in &segmentation.chapters {
//!     let md = thesis.chapter_markdown(chapter);
//!     println!("chapter {}: {} bytes", chapter.number, md.len());
//! }
//! # Ok::<(), thesis_qmd::Error>(())
//! ```

pub mod css;
pub mod dom;
pub mod error;
pub mod export;
pub mod markdown;
pub mod segment;
mod thesis;
pub(crate) mod util;

pub use css::{InlineStyle, StyleRules};
pub use error::{Error, Result};
pub use export::{ConvertOptions, ConvertOutcome, DetectionReport, GeneratedFile, convert};
pub use segment::{AppendixSection, Block, BlockKind, NumberedSection, Segmentation};
pub use thesis::Thesis;
