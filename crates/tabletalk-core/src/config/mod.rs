pub mod settings;

pub use settings::{AgentSettings, LlmSettings, ReportSettings, Settings};
