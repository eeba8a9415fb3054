pub mod ask;
pub mod chat;
pub mod clear_data;
pub mod clear_history;
pub mod export;
pub mod history;
pub mod load;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Subcommand;
use tabletalk_core::config::Settings;
use tabletalk_core::store::SessionFile;
use tabletalk_sdk::{HttpAgent, Session, SessionError};

use crate::output::OutputFormat;

#[derive(Subcommand)]
pub enum Commands {
    /// Load one or more CSV files for analysis
    Load(load::LoadArgs),
    /// Unload every dataset
    ClearData,
    /// Ask one question about the loaded data
    Ask(ask::AskArgs),
    /// Ask questions line by line from stdin until EOF or `exit`
    Chat,
    /// Show the conversation so far
    History,
    /// Forget the conversation
    ClearHistory,
    /// Export selected answers as a PDF (or Markdown) report
    Export(export::ExportArgs),
    /// Print version information
    Version,
}

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub settings: Settings,
    pub state_dir: PathBuf,
    pub format: OutputFormat,
}

impl Context {
    pub fn session_file(&self) -> Result<SessionFile> {
        SessionFile::load_or_new(&self.state_dir).with_context(|| {
            format!(
                "Failed to read session from {}",
                self.state_dir.display()
            )
        })
    }

    /// Restore the stored session around a fresh HTTP agent.
    pub fn open_session(&self) -> Result<Session<HttpAgent>> {
        let agent = HttpAgent::from_settings(&self.settings.agent)
            .context("Failed to set up the data agent client")?;
        let mut session = Session::restore(self.session_file()?, agent)
            .context("Failed to restore session (run `tabletalk clear-data` if a dataset moved)")?;
        session.memory_size(self.settings.agent.memory_size);
        Ok(session)
    }

    pub fn save(&self, file: &SessionFile) -> Result<()> {
        file.save(&self.state_dir).with_context(|| {
            format!("Failed to save session to {}", self.state_dir.display())
        })
    }
}

/// Print notices as warnings and carry on; anything else is a failure.
pub fn notice_or_fail(err: SessionError) -> Result<()> {
    if err.is_notice() {
        eprintln!("warning: {err}");
        Ok(())
    } else {
        Err(err.into())
    }
}
