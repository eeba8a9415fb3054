pub mod block;
pub mod compiler;
pub mod error;
pub mod layout;
pub mod render;

pub use block::{ImageBlock, ReportBlock, TableBlock};
pub use compiler::compile;
pub use error::ReportError;
pub use render::{MarkdownRenderer, PdfRenderer, ReportRenderer};
