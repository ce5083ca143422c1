//! Start-up configuration read from the environment.

use std::env;
use std::error::Error;
use std::fmt::{self, Display};
use std::num::ParseIntError;

use codemate_core::prompt::HistoryWindow;
use codemate_ollama_model::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, OllamaConfig, OllamaConfigBuilder,
};

/// Environment variable naming the model.
pub const MODEL_VAR: &str = "CODEMATE_MODEL";
/// Environment variable naming the server base URL.
pub const BASE_URL_VAR: &str = "CODEMATE_BASE_URL";
/// Environment variable bounding the history by turns.
pub const HISTORY_TURNS_VAR: &str = "CODEMATE_HISTORY_TURNS";
/// Environment variable bounding the history by characters.
pub const HISTORY_CHARS_VAR: &str = "CODEMATE_HISTORY_CHARS";

/// Errors found while reading the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable that must hold a number doesn't.
    InvalidNumber {
        /// The variable name.
        var: &'static str,
        /// The offending value.
        value: String,
        /// Why it failed to parse.
        source: ParseIntError,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { var, value, source } => {
                write!(
                    f,
                    "{var} must be a non-negative integer, got {value:?}: \
                     {source}"
                )
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::InvalidNumber { source, .. } => Some(source),
        }
    }
}

/// Settings for the terminal client and other hosts.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The model identifier.
    pub model: String,
    /// The server base URL.
    pub base_url: String,
    /// How much history to replay in each prompt.
    pub history_window: HistoryWindow,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            history_window: HistoryWindow::Unbounded,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(model) = lookup(MODEL_VAR) {
            config.model = model;
        }
        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config.base_url = base_url;
        }

        let turns = lookup(HISTORY_TURNS_VAR)
            .map(|v| parse_number(HISTORY_TURNS_VAR, v))
            .transpose()?;
        let chars = lookup(HISTORY_CHARS_VAR)
            .map(|v| parse_number(HISTORY_CHARS_VAR, v))
            .transpose()?;
        config.history_window = match (turns, chars) {
            (Some(turns), _) => HistoryWindow::MaxTurns(turns),
            (None, Some(chars)) => HistoryWindow::MaxChars(chars),
            (None, None) => HistoryWindow::Unbounded,
        };
        if turns.is_some() && chars.is_some() {
            warn!(
                "{HISTORY_CHARS_VAR} is ignored since {HISTORY_TURNS_VAR} is \
                 set"
            );
        }

        Ok(config)
    }

    /// Builds the provider configuration.
    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfigBuilder::new()
            .with_model(&self.model)
            .with_base_url(&self.base_url)
            .build()
    }
}

fn parse_number(
    var: &'static str,
    value: String,
) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidNumber { var, value, source })
}
