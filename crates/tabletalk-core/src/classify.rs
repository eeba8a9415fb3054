use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::Answer;

/// Substring that marks an answer as a path to a rendered chart image.
pub const IMAGE_MARKER: &str = "img_";

/// Question keywords that ask for a chart. Any one of them is enough.
pub const CHART_KEYWORDS: [&str; 4] = ["chart", "graph", "plot", "histogram"];

pub const TABLE_KEYWORD: &str = "table";

/// The answer shape a question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionShape {
    Chart,
    Table,
    Text,
}

/// Output-type hint sent to the agent alongside the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    #[default]
    Auto,
    Text,
    Table,
}

impl QuestionShape {
    /// Charts come back from the agent as an image path string, so they are
    /// requested as text.
    pub fn output_type(self) -> OutputType {
        match self {
            QuestionShape::Chart => OutputType::Text,
            QuestionShape::Table => OutputType::Table,
            QuestionShape::Text => OutputType::Auto,
        }
    }
}

impl OutputType {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputType::Auto => "auto",
            OutputType::Text => "text",
            OutputType::Table => "table",
        }
    }
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide which answer shape a question asks for.
///
/// Chart keywords win over the table keyword; anything else is text.
pub fn classify_question(question: &str) -> QuestionShape {
    let lowered = question.to_lowercase();
    if CHART_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        QuestionShape::Chart
    } else if lowered.contains(TABLE_KEYWORD) {
        QuestionShape::Table
    } else {
        QuestionShape::Text
    }
}

pub fn is_image_reference(text: &str) -> bool {
    text.contains(IMAGE_MARKER)
}

/// Turn a plain-text agent reply into an [`Answer`], promoting chart paths
/// to [`Answer::Image`].
pub fn classify_answer_text(text: impl Into<String>) -> Answer {
    let text = text.into();
    if is_image_reference(&text) {
        Answer::Image {
            path: PathBuf::from(text.trim()),
        }
    } else {
        Answer::Text { text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_keywords_each_trigger() {
        for q in [
            "Draw a chart of revenue",
            "graph the monthly totals",
            "Plot age against income",
            "Show a HISTOGRAM of prices",
        ] {
            assert_eq!(classify_question(q), QuestionShape::Chart, "{q}");
        }
    }

    #[test]
    fn test_table_question() {
        let shape = classify_question("Give me a table of the top 5 customers");
        assert_eq!(shape, QuestionShape::Table);
        assert_eq!(shape.output_type(), OutputType::Table);
    }

    #[test]
    fn test_chart_wins_over_table() {
        assert_eq!(
            classify_question("plot the table of sales"),
            QuestionShape::Chart
        );
    }

    #[test]
    fn test_plain_question_is_text() {
        let shape = classify_question("What is the average order value?");
        assert_eq!(shape, QuestionShape::Text);
        assert_eq!(shape.output_type(), OutputType::Auto);
    }

    #[test]
    fn test_chart_requests_text_output() {
        assert_eq!(QuestionShape::Chart.output_type(), OutputType::Text);
    }

    #[test]
    fn test_image_marker_anywhere() {
        let answer = classify_answer_text("./charts/img_0.5123.png");
        assert_eq!(
            answer,
            Answer::Image {
                path: PathBuf::from("./charts/img_0.5123.png")
            }
        );

        let answer = classify_answer_text("  see table chart charts/img_42.png \n");
        assert!(matches!(answer, Answer::Image { .. }));
    }

    #[test]
    fn test_plain_text_answer() {
        let answer = classify_answer_text("The average is 42.");
        assert_eq!(
            answer,
            Answer::Text {
                text: "The average is 42.".into()
            }
        );
    }

    #[test]
    fn test_output_type_serde() {
        assert_eq!(
            serde_json::to_string(&OutputType::Table).unwrap(),
            "\"table\""
        );
        assert_eq!(OutputType::default().to_string(), "auto");
    }
}
