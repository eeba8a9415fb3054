use tabletalk_core::model::Message;

use crate::completion::Completion;
use crate::error::LlmError;

const SERVICE: &str = "heading generator";

/// Writes short title-case headings for report sections by asking a
/// completion service.
#[derive(Debug, Clone)]
pub struct HeadingGenerator<C> {
    client: C,
}

impl<C: Completion> HeadingGenerator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Title for the whole report, written from every selected message.
    pub fn overview(&self, selection: &[Message<'_>]) -> Result<String, LlmError> {
        let text = selection
            .iter()
            .map(Message::to_plain_text)
            .collect::<Vec<_>>()
            .join("\n");
        self.generate(&overview_prompt(&text))
    }

    /// Heading for one question, with the full conversation as context.
    pub fn section(&self, question: &str, context: &str) -> Result<String, LlmError> {
        self.generate(&section_prompt(question, context))
    }

    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let reply = self.client.complete(prompt)?;
        let heading = normalize_heading(&reply);
        if heading.is_empty() {
            return Err(LlmError::EmptyResponse(SERVICE));
        }
        tracing::debug!(%heading, "Generated heading");
        Ok(heading)
    }
}

pub fn overview_prompt(selection: &str) -> String {
    format!(
        "Generate a concise title for this report in title case using the following information: {selection}"
    )
}

pub fn section_prompt(question: &str, context: &str) -> String {
    format!(
        "Rephrase this question into a concise heading in title case: {question}. \
         If needed, the context for the request is {context}. \
         Ensure the heading is not a question."
    )
}

/// Strip whitespace, Markdown heading markers and wrapping quotes that chat
/// models like to add.
fn normalize_heading(reply: &str) -> String {
    let mut s = reply.trim().trim_start_matches('#').trim();
    loop {
        let before = s;
        for (open, close) in [('"', '"'), ('\'', '\''), ('\u{201c}', '\u{201d}'), ('*', '*')] {
            if s.len() >= open.len_utf8() + close.len_utf8()
                && s.starts_with(open)
                && s.ends_with(close)
            {
                s = s[open.len_utf8()..s.len() - close.len_utf8()].trim();
            }
        }
        if s == before {
            return s.to_string();
        }
    }
}
