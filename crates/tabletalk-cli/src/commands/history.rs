use anyhow::Result;

use super::Context;
use crate::output::format::format_history;

pub fn run(ctx: &Context) -> Result<()> {
    let file = ctx.session_file()?;
    println!("{}", format_history(file.conversation.turns(), ctx.format));
    Ok(())
}
