//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::fmt;
use std::time::Duration;

use arrrg_derive::CommandLine;

use super::commands::parse_f32_in_range;
use crate::client::DEFAULT_MODEL;
use crate::types::{DEFAULT_NUM_CTX, DEFAULT_TEMPERATURE, GenerateOptions};

/// Command-line arguments for the nexus-chat tool.
///
/// Sampling values are kept as text here and range-checked when the
/// arguments become a [`ChatConfig`].
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: deepseek-r1:8b)", "MODEL")]
    pub model: Option<String>,

    /// Base URL of the Ollama server.
    #[arrrg(
        optional,
        "Ollama server URL (default: $OLLAMA_HOST or http://localhost:11434)",
        "URL"
    )]
    pub host: Option<String>,

    /// Sampling temperature.
    #[arrrg(optional, "Sampling temperature, 0.0 to 2.0 (default: 0.7)", "TEMP")]
    pub temperature: Option<String>,

    /// Nucleus sampling threshold.
    #[arrrg(optional, "Top-p sampling threshold, 0.0 to 1.0 (default: server default)", "P")]
    pub top_p: Option<String>,

    /// Context window size.
    #[arrrg(optional, "Context window in tokens (default: 2048)", "TOKENS")]
    pub num_ctx: Option<u32>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 300)", "SECS")]
    pub timeout: Option<u64>,

    /// Wait for whole responses instead of streaming.
    #[arrrg(flag, "Disable streaming responses")]
    pub no_stream: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: String,

    /// Base URL of the server; `None` defers to `OLLAMA_HOST` and then the
    /// built-in default.
    pub host: Option<String>,

    /// Sampling temperature.  `None` falls back to the client default.
    pub temperature: Option<f32>,

    /// Optional top-p nucleus sampling value.
    pub top_p: Option<f32>,

    /// Context window size.  `None` falls back to the client default.
    pub num_ctx: Option<u32>,

    /// Whether replies stream in as they are generated.
    pub stream: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Per-request timeout; `None` uses the client default.
    pub timeout: Option<Duration>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: deepseek-r1:8b
    /// - Temperature: 0.7
    /// - Context window: 2048
    /// - Streaming: enabled
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            host: None,
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: None,
            num_ctx: Some(DEFAULT_NUM_CTX),
            stream: true,
            use_color: true,
            timeout: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the server URL.
    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the top-p value.
    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the context window size.
    pub fn with_num_ctx(mut self, num_ctx: Option<u32>) -> Self {
        self.num_ctx = num_ctx;
        self
    }

    /// Enables or disables streaming.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The sampling options to send with each request.
    pub fn options(&self) -> GenerateOptions {
        GenerateOptions::new()
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_num_ctx(self.num_ctx)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A command-line value that could not be turned into configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatArgsError {
    /// `--temperature` was not a number between 0.0 and 2.0.
    InvalidTemperature(String),
    /// `--top-p` was not a number between 0.0 and 1.0.
    InvalidTopP(String),
}

impl fmt::Display for ChatArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatArgsError::InvalidTemperature(reason) => write!(f, "--temperature {reason}"),
            ChatArgsError::InvalidTopP(reason) => write!(f, "--top-p {reason}"),
        }
    }
}

impl std::error::Error for ChatArgsError {}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = ChatArgsError;

    fn try_from(args: ChatArgs) -> Result<Self, Self::Error> {
        let defaults = ChatConfig::new();
        let temperature = match args.temperature.as_deref() {
            Some(value) => Some(
                parse_f32_in_range(value, 0.0, 2.0).map_err(ChatArgsError::InvalidTemperature)?,
            ),
            None => defaults.temperature,
        };
        let top_p = args
            .top_p
            .as_deref()
            .map(|value| parse_f32_in_range(value, 0.0, 1.0))
            .transpose()
            .map_err(ChatArgsError::InvalidTopP)?;
        Ok(ChatConfig {
            model: args.model.unwrap_or(defaults.model),
            host: args.host,
            temperature,
            top_p,
            num_ctx: args.num_ctx.or(defaults.num_ctx),
            stream: !args.no_stream,
            use_color: !args.no_color,
            timeout: args.timeout.map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, "deepseek-r1:8b");
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.num_ctx, Some(2048));
        assert!(config.top_p.is_none());
        assert!(config.host.is_none());
        assert!(config.timeout.is_none());
        assert!(config.stream);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("llama3.2".to_string()),
            host: Some("http://gpu-box:11434".to_string()),
            temperature: Some("0.2".to_string()),
            top_p: Some("0.9".to_string()),
            num_ctx: Some(8192),
            timeout: Some(30),
            no_stream: true,
            no_color: true,
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.host.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.top_p, Some(0.9));
        assert_eq!(config.num_ctx, Some(8192));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(!config.stream);
        assert!(!config.use_color);
    }

    #[test]
    fn out_of_range_sampling_args_are_rejected() {
        let args = ChatArgs {
            temperature: Some("2.5".to_string()),
            ..ChatArgs::default()
        };
        assert!(matches!(
            ChatConfig::try_from(args),
            Err(ChatArgsError::InvalidTemperature(_))
        ));

        let args = ChatArgs {
            temperature: Some("warm".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).is_err());

        let args = ChatArgs {
            top_p: Some("1.5".to_string()),
            ..ChatArgs::default()
        };
        let err = ChatConfig::try_from(args).unwrap_err();
        assert_eq!(err, ChatArgsError::InvalidTopP("expects a value between 0 and 1".to_string()));
        assert!(err.to_string().starts_with("--top-p"));
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model("qwen2.5")
            .with_host(Some("localhost:9999".to_string()))
            .with_temperature(None)
            .with_top_p(Some(0.5))
            .with_num_ctx(Some(4096))
            .with_stream(false)
            .without_color()
            .with_timeout(Some(Duration::from_secs(5)));

        assert_eq!(config.model, "qwen2.5");
        assert_eq!(config.host.as_deref(), Some("localhost:9999"));
        assert!(config.temperature.is_none());
        assert_eq!(config.top_p, Some(0.5));
        assert_eq!(config.num_ctx, Some(4096));
        assert!(!config.stream);
        assert!(!config.use_color);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn options_mirror_config() {
        let options = ChatConfig::new().with_top_p(Some(0.8)).options();
        assert_eq!(options.temperature, Some(0.7));
        assert_eq!(options.top_p, Some(0.8));
        assert_eq!(options.num_ctx, Some(2048));
    }
}
