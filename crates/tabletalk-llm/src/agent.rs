use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use serde::Serialize;
use tabletalk_core::classify::{classify_answer_text, OutputType};
use tabletalk_core::config::AgentSettings;
use tabletalk_core::model::{Answer, Dataset, Turn};

use crate::completion::{build_http_client, post_json};
use crate::error::LlmError;

const SERVICE: &str = "data agent";

/// Guidance sent with every question so answers read well in a report.
pub const ANALYST_INSTRUCTIONS: &str = "\
Act as a senior data analyst and reason step by step. \
Never mention the technical names of the tables. \
You are talking to non-technical stakeholders, so answer in full sentences \
unless the user asks for a table or a chart. \
When asked for a chart, save it in the ./charts directory as img_<random number>.png \
and answer with only the chart path, not a sentence. \
When asked for a table, answer with a table, not a string, without an index column, \
and with title-case headers.";

/// One question sent to the agent, with everything it needs to answer.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRequest<'a> {
    pub question: &'a str,
    pub output_type: OutputType,
    pub datasets: &'a [Dataset],
    /// Most recent turns, oldest first.
    pub history: &'a [Turn],
    pub instructions: &'a str,
}

/// The natural-language-to-answer service.
pub trait Agent {
    fn chat(&mut self, request: &AgentRequest<'_>) -> Result<Answer, LlmError>;

    /// Forget any conversation memory held by the agent.
    fn reset(&mut self) {}
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn chat(&mut self, request: &AgentRequest<'_>) -> Result<Answer, LlmError> {
        (**self).chat(request)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Agent reached over HTTP: `POST <url>/chat` with an [`AgentRequest`]
/// body, answered by a tagged [`Answer`]. History travels with every
/// request, so the remote side keeps no memory of its own.
#[derive(Debug, Clone)]
pub struct HttpAgent {
    http: HttpClient,
    url: String,
}

impl HttpAgent {
    pub fn new(url: &str) -> Result<Self, LlmError> {
        Self::with_timeout(url, None)
    }

    pub fn from_settings(settings: &AgentSettings) -> Result<Self, LlmError> {
        Self::with_timeout(&settings.url, settings.timeout_secs.map(Duration::from_secs))
    }

    fn with_timeout(url: &str, timeout: Option<Duration>) -> Result<Self, LlmError> {
        Ok(Self {
            http: build_http_client(timeout)?,
            url: url.trim_end_matches('/').to_string(),
        })
    }
}

impl Agent for HttpAgent {
    fn chat(&mut self, request: &AgentRequest<'_>) -> Result<Answer, LlmError> {
        let url = format!("{}/chat", self.url);
        tracing::debug!(
            %url,
            output_type = %request.output_type,
            datasets = request.datasets.len(),
            history = request.history.len(),
            "Asking agent"
        );

        let body = post_json(&self.http, &url, None, request, SERVICE)?;
        let answer: Answer = serde_json::from_str(&body).map_err(|e| LlmError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;
        normalize_answer(answer)
    }
}

/// Validate table shape and promote text replies that are really chart
/// paths.
pub fn normalize_answer(answer: Answer) -> Result<Answer, LlmError> {
    match answer {
        Answer::Text { text } => {
            if text.trim().is_empty() {
                return Err(LlmError::EmptyResponse(SERVICE));
            }
            Ok(classify_answer_text(text))
        }
        Answer::Table(table) => {
            table.validate()?;
            Ok(Answer::Table(table))
        }
        image @ Answer::Image { .. } => Ok(image),
    }
}
