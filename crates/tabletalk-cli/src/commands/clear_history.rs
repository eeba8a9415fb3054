use anyhow::Result;

use super::Context;

/// Edits the stored session directly: forgetting the conversation does not
/// need the datasets, so a moved CSV must not block it.
pub fn run(ctx: &Context) -> Result<()> {
    let mut file = ctx.session_file()?;
    let count = file.conversation.len();
    file.conversation.clear();
    file.memory_start = 0;
    ctx.save(&file)?;

    tracing::info!(count, session = %file.id.short(), "History cleared");
    println!("Cleared {count} message(s).");
    Ok(())
}
