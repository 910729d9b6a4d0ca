use serde::{Deserialize, Serialize};

use crate::types::GenerateOptions;

/// Body of a `POST /api/generate` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier, e.g. `deepseek-r1:8b`.
    pub model: String,

    /// The full prompt text.
    pub prompt: String,

    /// Whether the server should stream newline-delimited chunks.
    pub stream: bool,

    /// Sampling options.
    #[serde(default)]
    pub options: GenerateOptions,
}

impl GenerateRequest {
    /// Create a non-streaming request with no options set.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
            options: GenerateOptions::default(),
        }
    }

    /// Set whether the response is streamed.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set the sampling options.
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body() {
        let request = GenerateRequest::new("deepseek-r1:8b", "Hello")
            .with_stream(true)
            .with_options(GenerateOptions::client_defaults());
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"model":"deepseek-r1:8b","prompt":"Hello","stream":true,"options":{"temperature":0.7,"num_ctx":2048}}"#
        );
    }

    #[test]
    fn request_body_parses_back() {
        let request = GenerateRequest::new("llama3.2", "Hi")
            .with_options(GenerateOptions::new().with_top_p(Some(0.9)));
        let json = serde_json::to_string(&request).unwrap();
        let parsed: GenerateRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, request);
    }
}
