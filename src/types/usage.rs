use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Token counts for one or more generation calls.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Tokens evaluated from the prompt.
    pub prompt_tokens: u64,

    /// Tokens generated.
    pub completion_tokens: u64,
}

impl Usage {
    /// Create a new `Usage` with the given prompt and completion tokens.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    /// Total tokens in both directions.
    pub fn total(&self) -> u64 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            prompt_tokens: self.prompt_tokens.saturating_add(rhs.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(rhs.completion_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_saturates() {
        let sum = Usage::new(u64::MAX, 1) + Usage::new(1, 2);
        assert_eq!(sum, Usage::new(u64::MAX, 3));
        assert_eq!(sum.total(), u64::MAX);
    }
}
