use tabletalk_core::CoreError;
use tabletalk_llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Please select at least one message.")]
    EmptySelection,

    #[error("Message {index} breaks the question/answer pairing")]
    Unpaired { index: usize },

    #[error("Heading generation failed: {0}")]
    Heading(#[from] LlmError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Cannot embed image {path}: {message}")]
    Image { path: String, message: String },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<printpdf::Error> for ReportError {
    fn from(e: printpdf::Error) -> Self {
        ReportError::Pdf(e.to_string())
    }
}
