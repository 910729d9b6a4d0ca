use serde::{Deserialize, Serialize};

use crate::types::Usage;

/// One response object from `/api/generate`.
///
/// A non-streaming call returns exactly one of these with `done = true`.  A
/// streaming call returns one per line; every line but the last carries a
/// fragment of the text in `response`.  A line carrying `error` reports a
/// failure mid-stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The model that produced the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Server-side creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Generated text, or a fragment of it when streaming.
    #[serde(default)]
    pub response: String,

    /// True on the final object.
    #[serde(default)]
    pub done: bool,

    /// Error reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Total time spent generating, in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,

    /// Time spent loading the model, in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,

    /// Number of tokens in the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,

    /// Time spent evaluating the prompt, in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_duration: Option<u64>,

    /// Number of tokens generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,

    /// Time spent generating tokens, in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_duration: Option<u64>,
}

impl GenerateResponse {
    /// Token counts reported by the server; zero when absent.
    pub fn usage(&self) -> Usage {
        Usage::new(
            self.prompt_eval_count.unwrap_or(0),
            self.eval_count.unwrap_or(0),
        )
    }
}

/// The result of a completed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// The complete generated text.
    pub text: String,

    /// Token counts for the call.
    pub usage: Usage,
}

impl Generation {
    /// Create a generation with no token counts.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
        }
    }
}

impl From<GenerateResponse> for Generation {
    fn from(response: GenerateResponse) -> Self {
        let usage = response.usage();
        Self {
            text: response.response,
            usage,
        }
    }
}

/// An item on a streaming generation.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// A fragment of text, in arrival order.
    Delta(String),

    /// The server signalled completion.  Always the final item.
    Done(Usage),
}
