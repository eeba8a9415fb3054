use anyhow::Result;
use clap::Args;

use super::{notice_or_fail, Context};
use crate::output::format::format_answer;

#[derive(Args)]
pub struct AskArgs {
    /// The question, e.g. "plot revenue by month as a bar chart"
    #[arg(required = true)]
    pub question: Vec<String>,
}

pub fn run(args: &AskArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let question = args.question.join(" ");

    let output = match session.ask(&question) {
        Ok(turn) => format_answer(turn, ctx.format),
        Err(e) => return notice_or_fail(e),
    };

    ctx.save(&session.to_file())?;
    println!("{output}");
    Ok(())
}
