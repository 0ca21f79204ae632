//! Pure Markdown generation from the parsed thesis.
//!
//! - [`inline`]: inline content, emphasis, links and images
//! - [`block`]: one content block at a time
//! - [`section`]: chapter, appendix and abstract documents
//!
//! No I/O is performed here; [`crate::export`] decides what goes where.
//!
//! ## Design Notes
//!
//! - **Explicit context**: the DOM and the class style table travel together
//!   in an immutable [`RenderContext`] passed by reference.
//! - **Fixed emphasis order**: nesting order in the source never changes the
//!   markers, so `<em><b>x</b></em>` and `<b><em>x</em></b>` both give
//!   `***x***`.
//! - **Tables pass through** as HTML; Quarto renders them directly.
//! - **No escaping**: source text is emitted as-is.

mod block;
mod inline;
mod section;

pub use inline::{RenderContext, format_inline, normalize_image_src, unwrap_redirect};
pub use section::{
    render_abstract, render_appendix, render_appendix_group, render_blocks, render_chapter,
};
