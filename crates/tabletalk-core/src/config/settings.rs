use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DEFAULT_CONFIG_FILE: &str = "tabletalk.toml";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";
pub const DEFAULT_HEADING_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_AGENT_URL: &str = "http://localhost:8765";
pub const DEFAULT_MEMORY_SIZE: usize = 5;

/// Layered settings: defaults, then an optional TOML file, then environment
/// variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub agent: AgentSettings,
    pub report: ReportSettings,
}

/// Text-completion endpoint used for report headings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Remote data-analysis agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub url: String,
    /// Number of previous turns sent with each question.
    pub memory_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub output: PathBuf,
    pub title: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            model: DEFAULT_HEADING_MODEL.to_string(),
            api_key: None,
            timeout_secs: None,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_AGENT_URL.to_string(),
            memory_size: DEFAULT_MEMORY_SIZE,
            timeout_secs: None,
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("report.pdf"),
            title: "Analysis".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, overlaid with `path` (if given) and then the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CoreError> {
        toml::from_str(text).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Overlay environment variables, read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = non_empty("TABLETALK_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = non_empty("TABLETALK_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = non_empty("TABLETALK_AGENT_URL") {
            self.agent.url = url;
        }
        if let Some(secs) = non_empty("TABLETALK_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => {
                    self.llm.timeout_secs = Some(secs);
                    self.agent.timeout_secs = Some(secs);
                }
                Err(_) => tracing::warn!(value = %secs, "Ignoring invalid TABLETALK_TIMEOUT_SECS"),
            }
        }
    }

    /// Point heading generation at a local LM Studio server, which needs no
    /// key.
    pub fn lmstudio() -> Self {
        Self {
            llm: LlmSettings {
                base_url: LMSTUDIO_BASE_URL.to_string(),
                model: "local-model".to_string(),
                api_key: None,
                timeout_secs: None,
            },
            ..Self::default()
        }
    }

    /// The hosted OpenAI endpoint requires a key; local servers do not.
    pub fn check_api_key(&self) -> Result<(), CoreError> {
        let hosted = self
            .llm
            .base_url
            .trim_end_matches('/')
            .eq_ignore_ascii_case(OPENAI_BASE_URL);
        let has_key = self
            .llm
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if hosted && !has_key {
            return Err(CoreError::Config(
                "OPENAI_API_KEY is not set (add it to the environment or a .env file)".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.llm.base_url, OPENAI_BASE_URL);
        assert_eq!(s.llm.model, "gpt-3.5-turbo");
        assert_eq!(s.agent.memory_size, 5);
        assert_eq!(s.report.output, PathBuf::from("report.pdf"));
        assert_eq!(s.report.title, "Analysis");
    }

    #[test]
    fn test_partial_toml() {
        let s = Settings::from_toml_str(
            r#"
            [llm]
            model = "gpt-4o-mini"

            [agent]
            memory_size = 3
            "#,
        )
        .unwrap();
        assert_eq!(s.llm.model, "gpt-4o-mini");
        assert_eq!(s.llm.base_url, OPENAI_BASE_URL);
        assert_eq!(s.agent.memory_size, 3);
        assert_eq!(s.agent.url, DEFAULT_AGENT_URL);
    }

    #[test]
    fn test_bad_toml() {
        let err = Settings::from_toml_str("[llm\nmodel = 1").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[report]\ntitle = \"Q1 Review\"\n").unwrap();
        let s = Settings::from_file(&path).unwrap();
        assert_eq!(s.report.title, "Q1 Review");

        let missing = Settings::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(missing.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let mut s = Settings::default();
        s.apply_env(env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("TABLETALK_LLM_MODEL", "gpt-4o"),
            ("TABLETALK_AGENT_URL", "http://agent:9000"),
            ("TABLETALK_TIMEOUT_SECS", "30"),
            ("TABLETALK_LLM_BASE_URL", "  "),
        ]));
        assert_eq!(s.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(s.llm.model, "gpt-4o");
        assert_eq!(s.llm.base_url, OPENAI_BASE_URL);
        assert_eq!(s.agent.url, "http://agent:9000");
        assert_eq!(s.llm.timeout_secs, Some(30));
        assert_eq!(s.agent.timeout_secs, Some(30));
    }

    #[test]
    fn test_invalid_timeout_ignored() {
        let mut s = Settings::default();
        s.apply_env(env(&[("TABLETALK_TIMEOUT_SECS", "soon")]));
        assert_eq!(s.llm.timeout_secs, None);
    }

    #[test]
    fn test_check_api_key() {
        let s = Settings::default();
        assert!(s.check_api_key().is_err());

        let mut s = Settings::default();
        s.llm.api_key = Some("sk-test".into());
        assert!(s.check_api_key().is_ok());

        assert!(Settings::lmstudio().check_api_key().is_ok());
    }
}
