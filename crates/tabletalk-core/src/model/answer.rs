use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// What the agent answered. Produced explicitly by the agent boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Answer {
    Text { text: String },
    Table(Table),
    /// Path to a chart image rendered by the agent.
    Image { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    Text,
    Table,
    Image,
}

impl Answer {
    pub fn text(text: impl Into<String>) -> Self {
        Answer::Text { text: text.into() }
    }

    pub fn kind(&self) -> AnswerKind {
        match self {
            Answer::Text { .. } => AnswerKind::Text,
            Answer::Table(_) => AnswerKind::Table,
            Answer::Image { .. } => AnswerKind::Image,
        }
    }

    /// Single-string rendering, used for prompts and terminal output.
    pub fn to_plain_text(&self) -> String {
        match self {
            Answer::Text { text } => text.clone(),
            Answer::Table(table) => table.to_markdown(),
            Answer::Image { path } => path.display().to_string(),
        }
    }
}

impl std::fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnswerKind::Text => "text",
            AnswerKind::Table => "table",
            AnswerKind::Image => "chart",
        };
        f.write_str(s)
    }
}

/// A tabular answer. Every row has one cell per column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, CoreError> {
        let table = Self { columns, rows };
        table.validate()?;
        Ok(table)
    }

    /// Check the column/row shape. Deserialized tables skip `new`, so callers
    /// at the wire boundary run this themselves.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.columns.is_empty() {
            return Err(CoreError::InvalidTable("table has no columns".into()));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(CoreError::InvalidTable(format!(
                    "row {i} has {} cells, expected {}",
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render as a GitHub-flavored Markdown pipe table.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&markdown_row(&self.columns));
        md.push('|');
        for _ in &self.columns {
            md.push_str(" --- |");
        }
        md.push('\n');
        for row in &self.rows {
            md.push_str(&markdown_row(row));
        }
        md
    }
}

fn markdown_row(cells: &[String]) -> String {
    let mut line = String::from("|");
    for cell in cells {
        line.push(' ');
        line.push_str(&cell.replace('|', "\\|").replace('\n', " "));
        line.push_str(" |");
    }
    line.push('\n');
    line
}
