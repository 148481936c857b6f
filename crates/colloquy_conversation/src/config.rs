//! Conversation configuration.
//!
//! Configuration is layered the same way for every conversation:
//! - Bundled defaults (include_str! from colloquy.toml)
//! - User overrides (~/.config/colloquy/colloquy.toml, then ./colloquy.toml)
//! - Later sources take precedence

use colloquy_error::{ColloquyError, ColloquyResult, ConfigError};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../colloquy.toml");

/// Runtime settings for a scripted conversation.
///
/// # Example
///
/// ```toml
/// prompt_id = "text_prompt"
/// default_thread = "default"
/// capture_separator = "\n"
/// prompt_failure_notice = "Failed to start prompt {prompt_id}"
/// max_steps_per_turn = 256
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ConversationConfig {
    /// Prompt registration the host supplies for asking questions
    prompt_id: String,
    /// Thread to start in when begin options don't name one
    #[serde(default = "default_thread")]
    default_thread: String,
    /// Joins repeated captures into one value
    #[serde(default = "default_separator")]
    capture_separator: String,
    /// Diagnostic sent when a prompt cannot be started
    #[serde(default = "default_notice")]
    prompt_failure_notice: String,
    /// Lines one turn may resolve before it is suspended
    #[serde(default = "default_max_steps")]
    max_steps_per_turn: usize,
}

fn default_thread() -> String {
    "default".to_string()
}

fn default_separator() -> String {
    "\n".to_string()
}

fn default_notice() -> String {
    "Failed to start prompt {prompt_id}".to_string()
}

fn default_max_steps() -> usize {
    256
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            prompt_id: "colloquy_text_prompt".to_string(),
            default_thread: default_thread(),
            capture_separator: default_separator(),
            prompt_failure_notice: default_notice(),
            max_steps_per_turn: default_max_steps(),
        }
    }
}

impl ConversationConfig {
    /// Defaults with a specific prompt registration.
    pub fn with_prompt_id(prompt_id: impl Into<String>) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            ..Self::default()
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or `prompt_id` is empty.
    pub fn from_toml_str(s: &str) -> ColloquyResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| {
            ColloquyError::from(ConfigError::new(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ColloquyResult<Self> {
        debug!("Loading conversation configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ColloquyError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ColloquyError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and are skipped when absent.
    #[instrument]
    pub fn load() -> ColloquyResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/colloquy/colloquy.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("colloquy").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                ColloquyError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ColloquyError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error if `prompt_id` or `default_thread` is blank, or if
    /// `max_steps_per_turn` is zero.
    pub fn validate(&self) -> ColloquyResult<()> {
        if self.prompt_id.trim().is_empty() {
            return Err(ConfigError::new("prompt_id cannot be empty").into());
        }
        if self.default_thread.trim().is_empty() {
            return Err(ConfigError::new("default_thread cannot be empty").into());
        }
        if self.max_steps_per_turn == 0 {
            return Err(ConfigError::new("max_steps_per_turn must be at least 1").into());
        }
        Ok(())
    }

    /// The diagnostic text sent when the prompt fails to start.
    pub fn prompt_failure_text(&self) -> String {
        self.prompt_failure_notice
            .replace("{prompt_id}", &self.prompt_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_defaults_match_default_impl() {
        let bundled = ConversationConfig::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(bundled, ConversationConfig::default());
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let config = ConversationConfig::from_toml_str(r#"prompt_id = "ask""#).unwrap();
        assert_eq!(config.prompt_id(), "ask");
        assert_eq!(config.default_thread(), "default");
        assert_eq!(config.capture_separator(), "\n");
        assert_eq!(*config.max_steps_per_turn(), 256);
    }

    #[test]
    fn blank_prompt_id_is_rejected() {
        assert!(ConversationConfig::from_toml_str(r#"prompt_id = "  ""#).is_err());
    }

    #[test]
    fn zero_step_budget_is_rejected() {
        let toml = "prompt_id = \"ask\"\nmax_steps_per_turn = 0";
        assert!(ConversationConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn failure_notice_names_the_prompt() {
        let config = ConversationConfig::with_prompt_id("ask_name");
        assert_eq!(config.prompt_failure_text(), "Failed to start prompt ask_name");
    }

    #[test]
    fn file_overrides_bundled_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "default_thread = \"intro\"").unwrap();

        let config = ConversationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_thread(), "intro");
        assert_eq!(config.prompt_id(), "colloquy_text_prompt");
    }
}
