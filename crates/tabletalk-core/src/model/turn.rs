use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answer::Answer;

/// One question/answer pair in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub question: String,
    pub answer: Answer,
    pub asked_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(question: impl Into<String>, answer: Answer) -> Self {
        Self {
            question: question.into(),
            answer,
            asked_at: Utc::now(),
        }
    }
}

/// A flattened conversation message. Questions sit at even positions and
/// answers at odd positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message<'a> {
    Question(&'a str),
    Answer(&'a Answer),
}

impl Message<'_> {
    pub fn to_plain_text(&self) -> String {
        match self {
            Message::Question(q) => (*q).to_string(),
            Message::Answer(a) => a.to_plain_text(),
        }
    }
}
