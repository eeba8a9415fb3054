use anyhow::Result;

use super::Context;

/// Works on the stored session directly so a dataset that has since moved
/// can still be unloaded.
pub fn run(ctx: &Context) -> Result<()> {
    let mut file = ctx.session_file()?;
    let count = file.datasets.len();
    file.datasets.clear();
    file.memory_start = file.conversation.len();
    ctx.save(&file)?;

    tracing::info!(count, "Datasets cleared");
    println!("Cleared {count} dataset(s).");
    Ok(())
}
