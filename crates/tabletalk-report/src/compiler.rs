use tabletalk_core::classify::is_image_reference;
use tabletalk_core::model::{Answer, Message};
use tabletalk_llm::{Completion, HeadingGenerator};

use crate::block::{ImageBlock, ReportBlock, TableBlock};
use crate::error::ReportError;

/// Compile selected messages into report blocks.
///
/// `messages` alternate question, answer (see
/// [`tabletalk_core::store::flatten`]). The output is one overview title,
/// then a heading per question and a body block per answer. `context` is the
/// whole conversation, handed to the heading generator so it can resolve
/// follow-up questions.
///
/// An empty selection fails with [`ReportError::EmptySelection`] before any
/// heading is requested.
pub fn compile<C: Completion>(
    messages: &[Message<'_>],
    context: &str,
    headings: &HeadingGenerator<C>,
) -> Result<Vec<ReportBlock>, ReportError> {
    if messages.is_empty() {
        return Err(ReportError::EmptySelection);
    }
    if let Some(index) = misplaced_message(messages) {
        return Err(ReportError::Unpaired { index });
    }

    let mut blocks = Vec::with_capacity(messages.len() + 1);
    blocks.push(ReportBlock::Title(headings.overview(messages)?));

    for message in messages {
        let block = match message {
            Message::Question(question) => {
                ReportBlock::Heading(headings.section(question, context)?)
            }
            Message::Answer(answer) => answer_block(answer),
        };
        blocks.push(block);
    }

    tracing::debug!(
        messages = messages.len(),
        blocks = blocks.len(),
        "Compiled report"
    );
    Ok(blocks)
}

/// Body block for one answer. Any text carrying the image marker is a chart
/// path, whatever else it says.
pub fn answer_block(answer: &Answer) -> ReportBlock {
    match answer {
        Answer::Table(table) => ReportBlock::Table(TableBlock::from_table(table)),
        Answer::Image { path } => ReportBlock::Image(ImageBlock::new(path.clone())),
        Answer::Text { text } if is_image_reference(text) => {
            ReportBlock::Image(ImageBlock::new(text.trim()))
        }
        Answer::Text { text } => ReportBlock::Paragraph(text.clone()),
    }
}

/// First position that breaks the question/answer alternation, including a
/// trailing question with no answer.
fn misplaced_message(messages: &[Message<'_>]) -> Option<usize> {
    let misplaced = messages.iter().enumerate().find_map(|(i, m)| {
        let ok = matches!(
            (i % 2, m),
            (0, Message::Question(_)) | (1, Message::Answer(_))
        );
        (!ok).then_some(i)
    });
    misplaced.or_else(|| (messages.len() % 2 == 1).then_some(messages.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;
    use tabletalk_core::model::Table;
    use tabletalk_core::store::{flatten, ConversationStore};
    use tabletalk_llm::LlmError;

    /// Answers every prompt with a fixed heading and counts calls.
    struct CountingCompletion {
        calls: Cell<usize>,
    }

    impl CountingCompletion {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
            }
        }
    }

    impl Completion for CountingCompletion {
        fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("Heading {}", self.calls.get()))
        }
    }

    struct Unreachable;

    impl Completion for Unreachable {
        fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyResponse("completion service"))
        }
    }

    fn store() -> ConversationStore {
        let mut store = ConversationStore::new();
        store.push("how many customers are there?", Answer::text("There are 42 customers."));
        store.push(
            "show a table of spend by region",
            Answer::Table(
                Table::new(
                    vec!["region".into(), "total_spend".into()],
                    vec![
                        vec!["North".into(), "1200".into()],
                        vec!["South".into(), "800".into()],
                        vec!["West".into(), "650".into()],
                    ],
                )
                .unwrap(),
            ),
        );
        store.push(
            "plot spend by month",
            Answer::text("The chart is at ./charts/img_0.77.png and shows a table-like trend"),
        );
        store.push(
            "histogram of order sizes",
            Answer::Image {
                path: PathBuf::from("charts/img_3.png"),
            },
        );
        store
    }

    #[test]
    fn test_block_count_is_one_plus_two_per_turn() {
        let store = store();
        let client = CountingCompletion::new();
        let headings = HeadingGenerator::new(&client);

        for n in 1..=store.len() {
            let indices: Vec<usize> = (0..n).collect();
            let selected = store.select(&indices).unwrap();
            let blocks = compile(&flatten(&selected), &store.as_context(), &headings).unwrap();
            assert_eq!(blocks.len(), 1 + 2 * n);
        }
    }

    #[test]
    fn test_block_order_and_kinds() {
        let store = store();
        let client = CountingCompletion::new();
        let headings = HeadingGenerator::new(&client);
        let selected = store.all();
        let blocks = compile(&flatten(&selected), &store.as_context(), &headings).unwrap();

        let kinds: Vec<&str> = blocks.iter().map(ReportBlock::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "title", "heading", "paragraph", "heading", "table", "heading", "image",
                "heading", "image"
            ]
        );
        assert_eq!(blocks[0], ReportBlock::Title("Heading 1".into()));
        assert_eq!(blocks[1], ReportBlock::Heading("Heading 2".into()));
        // overview + one per question
        assert_eq!(client.calls.get(), 1 + store.len());
    }

    #[test]
    fn test_table_block_preserves_shape() {
        let store = store();
        let client = CountingCompletion::new();
        let headings = HeadingGenerator::new(&client);
        let selected = store.select(&[1]).unwrap();
        let blocks = compile(&flatten(&selected), "", &headings).unwrap();

        match &blocks[2] {
            ReportBlock::Table(t) => {
                assert_eq!(t.column_count(), 2);
                assert_eq!(t.row_count(), 3);
                assert_eq!(t.columns, vec!["Region", "Total Spend"]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_image_marker_beats_text() {
        let block = answer_block(&Answer::text("  charts/img_9.png\n"));
        assert_eq!(block, ReportBlock::Image(ImageBlock::new("charts/img_9.png")));

        let block = answer_block(&Answer::text("plain chart table graph words"));
        assert!(matches!(block, ReportBlock::Paragraph(_)));
    }

    #[test]
    fn test_empty_selection_calls_nothing() {
        let client = CountingCompletion::new();
        let headings = HeadingGenerator::new(&client);
        let err = compile(&[], "", &headings).unwrap_err();
        assert!(matches!(err, ReportError::EmptySelection));
        assert_eq!(client.calls.get(), 0);
        assert_eq!(err.to_string(), "Please select at least one message.");
    }

    #[test]
    fn test_heading_failure_propagates() {
        let store = store();
        let headings = HeadingGenerator::new(Unreachable);
        let selected = store.all();
        let err = compile(&flatten(&selected), "", &headings).unwrap_err();
        assert!(matches!(err, ReportError::Heading(_)));
    }

    #[test]
    fn test_unpaired_messages_rejected() {
        let client = CountingCompletion::new();
        let headings = HeadingGenerator::new(&client);
        let answer = Answer::text("a");

        let err = compile(&[Message::Question("q")], "", &headings).unwrap_err();
        assert!(matches!(err, ReportError::Unpaired { index: 0 }));

        let err = compile(
            &[Message::Answer(&answer), Message::Question("q")],
            "",
            &headings,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Unpaired { index: 0 }));
        assert_eq!(client.calls.get(), 0);
    }
}
