mod markdown;
mod pdf;

use std::path::Path;

pub use markdown::{to_markdown, MarkdownRenderer};
pub use pdf::PdfRenderer;

use crate::block::ReportBlock;
use crate::error::ReportError;

/// Lays out a block sequence into a document at `output`.
pub trait ReportRenderer {
    fn render(&self, blocks: &[ReportBlock], output: &Path) -> Result<(), ReportError>;
}
