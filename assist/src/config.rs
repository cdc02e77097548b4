//! User configuration.
//!
//! Loaded from `~/.config/cmdscribe/config.yaml`. Every field has a
//! serde default so a missing or partial file still yields a working
//! configuration; a malformed file is an error the CLI reports once
//! and replaces with defaults.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cmdscribe_manpage::{DEFAULT_CONTEXT_CHARS, DEFAULT_MAX_SNIPPETS};

/// Typed error for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file missing at an explicitly requested path.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// Filesystem I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse failure.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Per-prompt overrides. Absent fields keep the built-in prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptOverride {
    /// Replacement system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Preamble prepended to the user payload.
    #[serde(default)]
    pub user_prompt: Option<String>,
}

/// Overrides for each prompt the assistant issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptsConfig {
    #[serde(default)]
    pub suggest: PromptOverride,
    #[serde(default)]
    pub explain: PromptOverride,
    #[serde(default)]
    pub generate: PromptOverride,
    #[serde(default)]
    pub describe: PromptOverride,
}

/// How to reach the LLM.
///
/// `command` is a shell command line; the assistant pipes a JSON
/// payload to its stdin and reads the completion from its stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// External command the prompts are piped through. `None` disables
    /// LLM-backed features.
    #[serde(default)]
    pub command: Option<String>,
    /// Completion timeout in milliseconds.
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_ms: default_llm_timeout_ms(),
        }
    }
}

fn default_llm_timeout_ms() -> u64 {
    30_000
}

/// Budget for assembled man-page context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    #[serde(default = "default_context_chars")]
    pub max_chars: usize,
    #[serde(default = "default_max_snippets")]
    pub max_snippets: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_chars: default_context_chars(),
            max_snippets: default_max_snippets(),
        }
    }
}

fn default_context_chars() -> usize {
    DEFAULT_CONTEXT_CHARS
}

fn default_max_snippets() -> usize {
    DEFAULT_MAX_SNIPPETS
}

/// Top-level user configuration.
///
/// # Example YAML
///
/// ```yaml
/// llm:
///   command: "my-llm --model small"
///   timeout_ms: 20000
/// context:
///   max_chars: 1500
///   max_snippets: 4
/// history_command: "fc -ln 1"
/// clipboard_command: "xclip -selection clipboard"
/// prompts:
///   explain:
///     user_prompt: "Prefer POSIX terminology."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    /// Command whose stdout replaces history-file reading.
    #[serde(default)]
    pub history_command: Option<String>,
    /// Command text is piped to for the clipboard output channel.
    #[serde(default)]
    pub clipboard_command: Option<String>,
    /// Override for the cache database path.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

impl Config {
    /// Default config file location
    /// (`$XDG_CONFIG_HOME`/cmdscribe/config.yaml or
    /// `~/.config/cmdscribe/config.yaml`).
    pub fn default_path() -> PathBuf {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(std::env::temp_dir);
        base.join("cmdscribe").join("config.yaml")
    }

    /// Loads the default config file, falling back to defaults when it
    /// does not exist.
    ///
    /// A file that exists but fails to parse is an error; silently
    /// ignoring a typo-ridden config is worse than failing loudly.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file is missing, or a
    /// parse/IO error otherwise.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Context options derived from this config.
    pub fn context_options(&self) -> cmdscribe_manpage::ContextOptions {
        cmdscribe_manpage::ContextOptions {
            max_chars: self.context.max_chars,
            max_snippets: self.context.max_snippets,
        }
    }
}
