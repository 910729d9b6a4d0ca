use serde::{Deserialize, Serialize};

/// Default sampling temperature sent with every request.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default context window size sent with every request.
pub const DEFAULT_NUM_CTX: u32 = 2048;

/// Sampling options forwarded to the generation endpoint.
///
/// Unset fields are omitted from the request body so the server falls back to
/// the model's own defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Size of the context window in tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
}

impl GenerateOptions {
    /// Options with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The options the client sends when the caller sets nothing.
    pub fn client_defaults() -> Self {
        Self {
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: None,
            num_ctx: Some(DEFAULT_NUM_CTX),
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the top-p value.
    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set the context window size.
    pub fn with_num_ctx(mut self, num_ctx: Option<u32>) -> Self {
        self.num_ctx = num_ctx;
        self
    }

    /// Layer `self` over `defaults`: every field set here wins.
    pub fn or(self, defaults: GenerateOptions) -> Self {
        Self {
            temperature: self.temperature.or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
            num_ctx: self.num_ctx.or(defaults.num_ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn unset_fields_are_omitted() {
        let options = GenerateOptions::new().with_top_p(Some(0.5));
        assert_eq!(to_value(options).unwrap(), json!({"top_p": 0.5}));
    }

    #[test]
    fn explicit_options_override_defaults() {
        let options = GenerateOptions::new()
            .with_temperature(Some(0.25))
            .or(GenerateOptions::client_defaults());
        assert_eq!(options.temperature, Some(0.25));
        assert_eq!(options.num_ctx, Some(DEFAULT_NUM_CTX));
        assert_eq!(options.top_p, None);
    }
}
