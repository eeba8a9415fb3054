use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;
use crate::output::format::format_datasets;

#[derive(Args)]
pub struct LoadArgs {
    /// CSV files with a header row
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub fn run(args: &LoadArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let before = session.datasets().len();

    for path in &args.paths {
        session
            .load_dataset(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    }

    ctx.save(&session.to_file())?;
    println!("{}", format_datasets(&session.datasets()[before..], ctx.format));
    Ok(())
}
