use tabletalk_core::CoreError;
use tabletalk_llm::LlmError;
use tabletalk_report::ReportError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Please load a CSV file first.")]
    MissingDataset,

    #[error("Please select at least one message.")]
    EmptySelection,

    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Agent error: {0}")]
    Agent(#[from] LlmError),

    #[error("Report error: {0}")]
    Report(ReportError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl SessionError {
    /// User-facing warnings that abort an action without being failures.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            SessionError::MissingDataset | SessionError::EmptySelection
        )
    }
}

impl From<ReportError> for SessionError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::EmptySelection => SessionError::EmptySelection,
            other => SessionError::Report(other),
        }
    }
}
