use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Answer, Message, Turn};

/// Append-only log of question/answer turns, in the order they were asked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationStore {
    turns: Vec<Turn>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Append a turn and return it.
    pub fn push(&mut self, question: impl Into<String>, answer: Answer) -> &Turn {
        self.turns.push(Turn::new(question, answer));
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// The last `n` turns at or after position `since`, oldest first.
    pub fn recent(&self, since: usize, n: usize) -> &[Turn] {
        let visible = &self.turns[since.min(self.turns.len())..];
        &visible[visible.len().saturating_sub(n)..]
    }

    /// Pick turns by zero-based position. The result is always in
    /// conversation order, whatever order `indices` come in; duplicates
    /// collapse.
    pub fn select(&self, indices: &[usize]) -> Result<Vec<&Turn>, CoreError> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted
            .into_iter()
            .map(|index| {
                self.turns.get(index).ok_or(CoreError::TurnNotFound {
                    index,
                    len: self.turns.len(),
                })
            })
            .collect()
    }

    pub fn all(&self) -> Vec<&Turn> {
        self.turns.iter().collect()
    }

    /// Whole conversation as prompt context, one `question ;; answer` line
    /// per turn.
    pub fn as_context(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{} ;; {}", t.question, t.answer.to_plain_text()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize to JSONL bytes (one turn per line).
    pub fn to_jsonl(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        for turn in &self.turns {
            serde_json::to_writer(&mut buf, turn)?;
            buf.push(b'\n');
        }
        Ok(buf)
    }

    /// Deserialize from JSONL bytes.
    pub fn from_jsonl(data: &[u8]) -> Result<Self, CoreError> {
        let text = std::str::from_utf8(data).map_err(|e| CoreError::Parse(e.to_string()))?;
        let mut turns = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            turns.push(serde_json::from_str(line)?);
        }
        Ok(Self { turns })
    }
}

/// Flatten turns into alternating question/answer messages.
pub fn flatten<'a>(turns: &[&'a Turn]) -> Vec<Message<'a>> {
    let mut messages = Vec::with_capacity(turns.len() * 2);
    for &turn in turns {
        messages.push(Message::Question(&turn.question));
        messages.push(Message::Answer(&turn.answer));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;

    fn sample_store() -> ConversationStore {
        let mut store = ConversationStore::new();
        store.push("How many rows?", Answer::text("There are 3 rows."));
        store.push(
            "Show a table of revenue by region",
            Answer::Table(
                Table::new(
                    vec!["Region".into(), "Revenue".into()],
                    vec![vec!["North".into(), "215".into()]],
                )
                .unwrap(),
            ),
        );
        store.push(
            "Plot revenue by month",
            Answer::Image {
                path: "charts/img_7.png".into(),
            },
        );
        store
    }

    #[test]
    fn test_flatten_roundtrip_preserves_pairs() {
        let store = sample_store();
        let selected = store.all();
        let messages = flatten(&selected);
        assert_eq!(messages.len(), store.len() * 2);

        for (pair, turn) in messages.chunks(2).zip(store.turns()) {
            assert_eq!(pair[0], Message::Question(&turn.question));
            assert_eq!(pair[1], Message::Answer(&turn.answer));
        }
    }

    #[test]
    fn test_select_keeps_conversation_order() {
        let store = sample_store();
        let selected = store.select(&[2, 0, 2]).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].question, "How many rows?");
        assert_eq!(selected[1].question, "Plot revenue by month");
    }

    #[test]
    fn test_select_out_of_range() {
        let store = sample_store();
        let err = store.select(&[5]).unwrap_err();
        assert!(matches!(err, CoreError::TurnNotFound { index: 5, len: 3 }));
    }

    #[test]
    fn test_recent() {
        let store = sample_store();
        assert_eq!(store.recent(0, 2).len(), 2);
        assert_eq!(store.recent(0, 2)[0].question, "Show a table of revenue by region");
        assert_eq!(store.recent(0, 10).len(), 3);
        assert!(ConversationStore::new().recent(0, 5).is_empty());

        // Turns before `since` are never returned.
        assert_eq!(store.recent(2, 10).len(), 1);
        assert!(store.recent(3, 10).is_empty());
        assert!(store.recent(99, 10).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = sample_store();
        store.clear();
        assert!(store.is_empty());
        assert!(store.as_context().is_empty());
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let store = sample_store();
        let jsonl = store.to_jsonl().unwrap();
        assert_eq!(jsonl.iter().filter(|b| **b == b'\n').count(), 3);
        let parsed = ConversationStore::from_jsonl(&jsonl).unwrap();
        assert_eq!(parsed, store);
    }

    #[test]
    fn test_context_lines() {
        let store = sample_store();
        let ctx = store.as_context();
        assert!(ctx.starts_with("How many rows? ;; There are 3 rows.\n"));
        assert!(ctx.ends_with("Plot revenue by month ;; charts/img_7.png"));
    }
}
