//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. environment variables
//! 2. quizbench.toml config file
//! 3. defaults
//!
//! `${VAR_NAME}` strings inside the config file are expanded from the
//! environment, so API keys never need to be written into the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// LLM Provider type
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI-compatible chat completions API (GLM, ModelScope, etc.)
    #[default]
    OpenAi,
    /// Anthropic Claude messages API
    Claude,
}

impl LlmProvider {
    fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "claude" | "anthropic" => LlmProvider::Claude,
            _ => LlmProvider::OpenAi,
        }
    }
}

/// Answer provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (injected, never hard-coded)
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,

    /// Sampling temperature in [0,1]; low values bias toward a
    /// deterministic single-token answer
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token cap; kept aggressively small since only a label is
    /// expected back
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,

    /// System instruction sent with every question
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: LlmProvider::OpenAi,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_model() -> String {
    "glm-4.6".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u64 {
    5
}

fn default_system_prompt() -> String {
    "只返回答案和选项，不需要任何解释。".to_string()
}

/// Session loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Expected number of questions in the run
    #[serde(default = "default_total_questions")]
    pub total_questions: usize,

    /// Fallback label alphabet when no options were extracted
    #[serde(default = "default_labels")]
    pub default_labels: Vec<String>,

    /// Seconds to let the page settle after the human advances it
    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: u64,

    /// Question preview length in the terminal report
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_questions: default_total_questions(),
            default_labels: default_labels(),
            settle_delay_secs: default_settle_delay(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_total_questions() -> usize {
    1
}

fn default_labels() -> Vec<String> {
    vec!["A".to_string(), "B".to_string()]
}

fn default_settle_delay() -> u64 {
    3
}

fn default_preview_chars() -> usize {
    500
}

/// Browser collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run the launched browser headless (the portal is normally driven
    /// visibly so the human can advance questions)
    #[serde(default)]
    pub headless: bool,

    /// WebSocket debug URL of an already-running Chrome instance; when
    /// set, quizbench attaches instead of launching
    pub debug_ws_url: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            debug_ws_url: None,
        }
    }
}

/// Run-log output paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Append-only log of extracted question content
    #[serde(default = "default_content_path")]
    pub content_path: String,

    /// Append-only log of question/answer pairs
    #[serde(default = "default_answers_path")]
    pub answers_path: String,

    /// Screenshot of the exam page taken at run start
    #[serde(default = "default_screenshot_path")]
    pub screenshot_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            content_path: default_content_path(),
            answers_path: default_answers_path(),
            screenshot_path: default_screenshot_path(),
        }
    }
}

fn default_content_path() -> String {
    "exam_content.txt".to_string()
}

fn default_answers_path() -> String {
    "exam_answers.txt".to_string()
}

fn default_screenshot_path() -> String {
    "exam_page.png".to_string()
}

/// Main configuration for quizbench
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Answer provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Session loop configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Browser collaborator configuration
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Run-log output paths
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` references against the environment.
    ///
    /// Unknown variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, with env expansion and env
    /// overrides applied on top.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let mut config: Config = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load from `./quizbench.toml` when present, otherwise from the
    /// environment only.
    pub fn load() -> crate::Result<Self> {
        if Path::new("quizbench.toml").exists() {
            return Self::from_toml_file("quizbench.toml");
        }

        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over file values
    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("LLM_API_KEY") {
            self.llm.api_key = api_key;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            if !model.is_empty() {
                self.llm.model = model;
            }
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            if !provider.is_empty() {
                self.llm.provider = LlmProvider::from_name(&provider);
            }
        }
        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            if !base_url.is_empty() {
                self.llm.base_url = Some(base_url);
            }
        }
        if let Ok(temperature) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(t) = temperature.parse() {
                self.llm.temperature = t;
            }
        }
        if let Ok(max_tokens) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = max_tokens.parse() {
                self.llm.max_tokens = n;
            }
        }

        if let Ok(total) = std::env::var("TOTAL_QUESTIONS") {
            if let Ok(n) = total.parse() {
                self.session.total_questions = n;
            }
        }

        if let Ok(headless) = std::env::var("BROWSER_HEADLESS") {
            self.browser.headless = headless.to_lowercase() == "true";
        }
        if let Ok(url) = std::env::var("BROWSER_DEBUG_WS_URL") {
            if !url.is_empty() {
                self.browser.debug_ws_url = Some(url);
            }
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.llm.api_key.is_empty() {
            return Err(Error::Config(
                "LLM_API_KEY not set (environment or [llm] api_key)".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.llm.temperature) {
            return Err(Error::Config(format!(
                "temperature must be in [0,1], got {}",
                self.llm.temperature
            )));
        }
        if self.session.total_questions == 0 {
            return Err(Error::Config(
                "total_questions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
