use std::io::{self, BufRead, Write};

use anyhow::{Context as _, Result};

use super::{notice_or_fail, Context};
use crate::output::format::format_answer;

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

pub fn run(ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&question.to_ascii_lowercase().as_str()) {
            break;
        }

        match session.ask(question) {
            Ok(turn) => {
                writeln!(stdout, "{}\n", format_answer(turn, ctx.format))?;
                stdout.flush()?;
                ctx.save(&session.to_file())?;
            }
            // A failed question ends that question, not the chat.
            Err(e) => {
                if let Err(e) = notice_or_fail(e) {
                    eprintln!("error: {e:#}");
                }
            }
        }
    }
    Ok(())
}
