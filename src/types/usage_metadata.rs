use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Token accounting reported with each response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt, history and system instruction.
    #[serde(default)]
    pub prompt_token_count: u64,

    /// Tokens across the returned candidates.
    #[serde(default)]
    pub candidates_token_count: u64,

    /// Total tokens billed for the request.
    #[serde(default)]
    pub total_token_count: u64,
}

impl Add for UsageMetadata {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            prompt_token_count: self.prompt_token_count + rhs.prompt_token_count,
            candidates_token_count: self.candidates_token_count + rhs.candidates_token_count,
            total_token_count: self.total_token_count + rhs.total_token_count,
        }
    }
}
