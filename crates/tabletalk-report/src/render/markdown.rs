use std::path::Path;

use super::ReportRenderer;
use crate::block::{ReportBlock, TableBlock};
use crate::error::ReportError;

/// Writes the report as a Markdown document.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer;

impl ReportRenderer for MarkdownRenderer {
    fn render(&self, blocks: &[ReportBlock], output: &Path) -> Result<(), ReportError> {
        std::fs::write(output, to_markdown(blocks))?;
        tracing::info!(path = %output.display(), blocks = blocks.len(), "Wrote Markdown report");
        Ok(())
    }
}

pub fn to_markdown(blocks: &[ReportBlock]) -> String {
    let mut md = String::new();
    for block in blocks {
        match block {
            ReportBlock::Title(title) => {
                md.push_str(&format!("# {title}\n\n"));
            }
            ReportBlock::Heading(heading) => {
                md.push_str(&format!("## {heading}\n\n"));
            }
            ReportBlock::Paragraph(text) => {
                md.push_str(text.trim_end());
                md.push_str("\n\n");
            }
            ReportBlock::Table(table) => {
                md.push_str(&table_markdown(table));
                md.push('\n');
            }
            ReportBlock::Image(image) => {
                let path = image.path.display();
                md.push_str(&format!("![chart]({path})\n\n"));
            }
        }
    }
    md
}

fn table_markdown(table: &TableBlock) -> String {
    let row = |cells: &[String]| {
        let escaped: Vec<String> = cells
            .iter()
            .map(|c| c.replace('|', "\\|").replace('\n', "<br>"))
            .collect();
        format!("| {} |\n", escaped.join(" | "))
    };
    let mut md = row(&table.columns);
    md.push_str(&format!("|{}\n", " --- |".repeat(table.column_count())));
    for r in &table.rows {
        md.push_str(&row(r));
    }
    md
}
