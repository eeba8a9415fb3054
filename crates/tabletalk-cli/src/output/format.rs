use tabletalk_core::model::{Answer, Dataset, Turn};

use super::OutputFormat;

pub fn format_answer(turn: &Turn, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => serde_json::to_string_pretty(turn).unwrap_or_default(),
        OutputFormat::Text => answer_text(&turn.answer),
        OutputFormat::Markdown => answer_markdown(&turn.answer),
    }
}

pub fn format_history(turns: &[Turn], fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => serde_json::to_string_pretty(turns).unwrap_or_default(),
        OutputFormat::Text => format_history_text(turns),
        OutputFormat::Markdown => format_history_markdown(turns),
    }
}

pub fn format_datasets(datasets: &[Dataset], fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => {
            let summary: Vec<_> = datasets
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "name": d.name,
                        "source": d.source,
                        "rows": d.row_count(),
                        "columns": d.columns,
                    })
                })
                .collect();
            serde_json::to_string_pretty(&summary).unwrap_or_default()
        }
        OutputFormat::Text | OutputFormat::Markdown => {
            let mut out = String::new();
            for d in datasets {
                out.push_str(&format!(
                    "Loaded {} ({} rows, {} columns)\n",
                    d.name,
                    d.row_count(),
                    d.column_count()
                ));
            }
            out.trim_end().to_string()
        }
    }
}

fn answer_text(answer: &Answer) -> String {
    match answer {
        Answer::Text { text } => text.clone(),
        Answer::Table(table) => table.to_markdown().trim_end().to_string(),
        Answer::Image { path } => format!("Chart saved to {}", path.display()),
    }
}

fn answer_markdown(answer: &Answer) -> String {
    match answer {
        Answer::Image { path } => format!("![chart]({})", path.display()),
        other => answer_text(other),
    }
}

fn format_history_text(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "No conversation yet.".to_string();
    }

    let mut out = String::new();
    for (i, turn) in turns.iter().enumerate() {
        let time = turn.asked_at.format("%Y-%m-%d %H:%M");
        out.push_str(&format!("[{}] {}  ({time})\n", i + 1, turn.question));
        for line in answer_text(&turn.answer).lines() {
            out.push_str(&format!("    {line}\n"));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn format_history_markdown(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "_No conversation yet._".to_string();
    }

    let mut out = String::new();
    for (i, turn) in turns.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, turn.question));
        out.push_str(answer_markdown(&turn.answer).trim_end());
        out.push_str("\n\n");
    }
    out.trim_end().to_string()
}
