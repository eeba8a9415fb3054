//! Rust SDK for asking questions about CSV data and exporting the
//! conversation as a report.
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//! use tabletalk_sdk::{
//!     ChatCompletionClient, HeadingGenerator, HttpAgent, PdfRenderer, Session, Settings,
//! };
//!
//! let settings = Settings::load(None).unwrap();
//! let mut session = Session::new(HttpAgent::from_settings(&settings.agent).unwrap());
//! session.load_dataset(Path::new("sales.csv")).unwrap();
//! session.ask("Show a table of revenue by region").unwrap();
//! session.ask("Plot monthly revenue as a line chart").unwrap();
//!
//! let headings = HeadingGenerator::new(ChatCompletionClient::from_settings(&settings.llm).unwrap());
//! let summary = session
//!     .export(&session.all_turns(), &headings, &PdfRenderer::default(), Path::new("report.pdf"))
//!     .unwrap();
//! println!("Wrote {} sections to {}", summary.turns, summary.path.display());
//! ```

mod error;
mod session;

pub use error::SessionError;
pub use session::{ExportSummary, Session};

// Re-export the types SDK users need to drive a session
pub use tabletalk_core::config::Settings;
pub use tabletalk_core::model::{Answer, AnswerKind, Dataset, Table, Turn};
pub use tabletalk_core::store::SessionFile;
pub use tabletalk_llm::{Agent, ChatCompletionClient, Completion, HeadingGenerator, HttpAgent};
pub use tabletalk_report::{MarkdownRenderer, PdfRenderer, ReportBlock, ReportRenderer};
