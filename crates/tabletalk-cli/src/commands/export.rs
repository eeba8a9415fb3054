use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::Args;
use tabletalk_core::config::{LlmSettings, Settings};
use tabletalk_llm::{ChatCompletionClient, HeadingGenerator};
use tabletalk_report::{MarkdownRenderer, PdfRenderer, ReportRenderer};

use super::{notice_or_fail, Context};

#[derive(Args)]
pub struct ExportArgs {
    /// Message numbers to include, as shown by `history` (default: all)
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<usize>,

    /// Output file (default from settings: report.pdf)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write Markdown instead of PDF
    #[arg(long)]
    pub markdown: bool,

    /// PDF document title
    #[arg(long)]
    pub title: Option<String>,

    /// Write headings with a local LM Studio server instead of OpenAI
    #[arg(long)]
    pub lmstudio: bool,
}

pub fn run(args: &ExportArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;

    let selection = if args.select.is_empty() {
        session.all_turns()
    } else {
        to_indices(&args.select)?
    };

    let settings = heading_settings(&ctx.settings, args.lmstudio);
    // Only a real export needs the heading service.
    if !selection.is_empty() {
        settings.check_api_key()?;
    }
    let client = ChatCompletionClient::from_settings(&settings.llm)
        .context("Failed to set up the heading client")?;
    let headings = HeadingGenerator::new(client);

    let output = args.output.clone().unwrap_or_else(|| {
        let default = ctx.settings.report.output.clone();
        if args.markdown {
            default.with_extension("md")
        } else {
            default
        }
    });
    let renderer: Box<dyn ReportRenderer> = if args.markdown {
        Box::new(MarkdownRenderer)
    } else {
        let title = args.title.as_deref().unwrap_or(&ctx.settings.report.title);
        Box::new(PdfRenderer::new(title))
    };

    match session.export(&selection, &headings, renderer.as_ref(), &output) {
        Ok(summary) => {
            println!(
                "Exported {} answer(s) to {}",
                summary.turns,
                summary.path.display()
            );
            Ok(())
        }
        Err(e) => notice_or_fail(e),
    }
}

/// Configured settings, with the heading service swapped for the LM Studio
/// preset when asked. The configured timeout is kept.
fn heading_settings(settings: &Settings, lmstudio: bool) -> Settings {
    if !lmstudio {
        return settings.clone();
    }
    Settings {
        llm: LlmSettings {
            timeout_secs: settings.llm.timeout_secs,
            ..Settings::lmstudio().llm
        },
        ..settings.clone()
    }
}

/// `history` numbers messages from 1.
fn to_indices(numbers: &[usize]) -> Result<Vec<usize>> {
    numbers
        .iter()
        .map(|&n| match n.checked_sub(1) {
            Some(i) => Ok(i),
            None => bail!("Message numbers start at 1"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_indices() {
        assert_eq!(to_indices(&[1, 3]).unwrap(), vec![0, 2]);
        assert!(to_indices(&[0]).is_err());
    }

    #[test]
    fn test_lmstudio_swaps_heading_service() {
        let mut configured = Settings::default();
        configured.llm.timeout_secs = Some(30);
        configured.agent.url = "http://agent.internal:9000".into();

        let settings = heading_settings(&configured, true);
        assert_eq!(settings.llm.base_url, "http://localhost:1234/v1");
        assert_eq!(settings.llm.api_key, None);
        assert_eq!(settings.llm.timeout_secs, Some(30));
        assert_eq!(settings.agent, configured.agent);
        assert!(settings.check_api_key().is_ok());

        assert_eq!(heading_settings(&configured, false), configured);
        assert!(heading_settings(&configured, false).check_api_key().is_err());
    }
}
