//! Quarto project export.
//!
//! A run is split into two phases:
//! - planning: parse, segment and render every output file in memory
//! - writing: remove stale generated files, then write each file whole
//!
//! Any segmentation error surfaces during planning, so a failed run never
//! touches the project directory.
//!
//! # Example
//!
//! ```no_run
//! use thesis_qmd::export::{ConvertOptions, ConvertOutcome, convert};
//!
//! let options = ConvertOptions::new("thesis.html", "my-thesis");
//! if let ConvertOutcome::Generated(files) = convert(&options)? {
//!     for file in &files {
//!         println!("{}", file.path.display());
//!     }
//! }
//! # Ok::<(), thesis_qmd::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::segment::{CHAPTER_COUNT, Segmentation};
use crate::thesis::Thesis;

/// Directory under the project root holding chapter and appendix files.
pub const CHAPTERS_DIR: &str = "chapters";

/// Appendix files and the labels each one collects.
pub const APPENDIX_GROUPS: [(&str, &[&str]); 3] = [
    ("appendix-a.qmd", &["A1", "A2", "A3"]),
    ("appendix-b.qmd", &["A4", "A5"]),
    ("appendix-c.qmd", &["A6", "A7"]),
];

/// Prefixes of files this exporter owns inside [`CHAPTERS_DIR`].
const GENERATED_PREFIXES: [&str; 2] = ["chap-", "appendix-"];

/// What to convert and where.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Source HTML export.
    pub html: PathBuf,
    /// Quarto project root.
    pub project: PathBuf,
    /// Detect boundaries only; write nothing.
    pub dry_run: bool,
}

impl ConvertOptions {
    pub fn new(html: impl Into<PathBuf>, project: impl Into<PathBuf>) -> Self {
        Self {
            html: html.into(),
            project: project.into(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Boundary detection summary for one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ChapterReport {
    pub number: u32,
    pub start: usize,
    pub title: String,
}

/// Boundary detection summary for one appendix.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct AppendixReport {
    pub label: String,
    pub index: usize,
    pub title: String,
}

/// Everything a dry run detected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct DetectionReport {
    pub source: String,
    pub blocks: usize,
    pub chapters: Vec<ChapterReport>,
    pub appendices: Vec<AppendixReport>,
}

impl DetectionReport {
    pub fn new(thesis: &Thesis, segmentation: &Segmentation) -> Self {
        Self {
            source: thesis.source().to_string(),
            blocks: thesis.blocks().len(),
            chapters: segmentation
                .chapters
                .iter()
                .map(|c| ChapterReport {
                    number: c.number,
                    start: c.start,
                    title: c.source_title.clone(),
                })
                .collect(),
            appendices: segmentation
                .appendices
                .iter()
                .map(|a| AppendixReport {
                    label: a.label.clone(),
                    index: a.start,
                    title: a.title.clone(),
                })
                .collect(),
        }
    }

    /// "1, 2, ..., 13"
    pub fn chapter_list(&self) -> String {
        self.chapters
            .iter()
            .map(|c| c.number.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// "A1, A2, ..., A7"
    pub fn appendix_list(&self) -> String {
        self.appendices
            .iter()
            .map(|a| a.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One file of the generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the project root.
    pub path: PathBuf,
    /// Appendix range collected in the file, e.g. `A1-A3`.
    pub appendices: Option<String>,
    pub content: String,
}

impl GeneratedFile {
    /// Listing line without the leading marker, e.g.
    /// `chapters/appendix-a.qmd (A1-A3)`.
    pub fn describe(&self) -> String {
        let path = self.path.to_string_lossy().replace('\\', "/");
        match &self.appendices {
            Some(range) => format!("{path} ({range})"),
            None => path,
        }
    }
}

/// Result of a conversion run.
#[derive(Debug, Clone)]
pub enum ConvertOutcome {
    DryRun(DetectionReport),
    Generated(Vec<GeneratedFile>),
}

/// Convert the thesis at `options.html` into `options.project`.
pub fn convert(options: &ConvertOptions) -> Result<ConvertOutcome> {
    let thesis = Thesis::open(&options.html)?;
    let segmentation = thesis.segment()?;

    if options.dry_run {
        return Ok(ConvertOutcome::DryRun(DetectionReport::new(
            &thesis,
            &segmentation,
        )));
    }

    let files = plan(&thesis, &segmentation)?;
    write_project(&options.project, &files)?;
    info!(
        project = %options.project.display(),
        files = files.len(),
        "wrote project"
    );
    Ok(ConvertOutcome::Generated(files))
}

/// Render every output file in memory, in listing order.
pub fn plan(thesis: &Thesis, segmentation: &Segmentation) -> Result<Vec<GeneratedFile>> {
    let mut files = Vec::with_capacity(1 + CHAPTER_COUNT as usize + APPENDIX_GROUPS.len());

    files.push(GeneratedFile {
        path: PathBuf::from("index.qmd"),
        appendices: None,
        content: thesis.abstract_markdown(segmentation),
    });

    for chapter in &segmentation.chapters {
        files.push(GeneratedFile {
            path: Path::new(CHAPTERS_DIR).join(format!("chap-{}.qmd", chapter.number)),
            appendices: None,
            content: thesis.chapter_markdown(chapter),
        });
    }

    for (filename, labels) in APPENDIX_GROUPS {
        let sections = labels
            .iter()
            .map(|label| {
                segmentation
                    .appendix(label)
                    .ok_or_else(|| Error::MissingAppendices(vec![label.to_string()]))
            })
            .collect::<Result<Vec<_>>>()?;

        let range = match (labels.first(), labels.last()) {
            (Some(first), Some(last)) => Some(format!("{first}-{last}")),
            _ => None,
        };
        files.push(GeneratedFile {
            path: Path::new(CHAPTERS_DIR).join(filename),
            appendices: range,
            content: thesis.appendix_group_markdown(&sections),
        });
    }

    Ok(files)
}

/// Remove previously generated chapter and appendix files.
///
/// Only `chap-*.qmd` and `appendix-*.qmd` are touched; anything else a user
/// keeps in the directory survives.
pub fn remove_stale_files(chapters_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(chapters_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let generated = name.ends_with(".qmd")
            && GENERATED_PREFIXES.iter().any(|p| name.starts_with(p));
        if generated && entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
            debug!(file = name, "removed stale file");
            removed += 1;
        }
    }
    Ok(removed)
}

/// Write planned files under `project`, replacing stale generated files.
pub fn write_project(project: &Path, files: &[GeneratedFile]) -> Result<()> {
    let chapters_dir = project.join(CHAPTERS_DIR);
    fs::create_dir_all(&chapters_dir).map_err(|source| Error::Write {
        path: chapters_dir.clone(),
        source,
    })?;
    remove_stale_files(&chapters_dir)?;

    for file in files {
        let path = project.join(&file.path);
        fs::write(&path, &file.content).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = file.content.len(), "wrote file");
    }
    Ok(())
}
