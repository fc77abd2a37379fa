use serde::{Deserialize, Serialize};

/// Why the model stopped generating a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural stop point or stop sequence.
    Stop,

    /// The token limit was reached.
    MaxTokens,

    /// The candidate was flagged for safety.
    Safety,

    /// The candidate was flagged for recitation.
    Recitation,

    /// The candidate contained forbidden terms.
    Blocklist,

    /// The candidate contained prohibited content.
    ProhibitedContent,

    /// Any other reason.
    #[serde(other)]
    Other,
}

impl FinishReason {
    /// Returns true if the candidate was cut off by a content filter.
    pub fn is_filtered(&self) -> bool {
        matches!(
            self,
            FinishReason::Safety
                | FinishReason::Recitation
                | FinishReason::Blocklist
                | FinishReason::ProhibitedContent
        )
    }
}
