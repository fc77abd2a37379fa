//! The seam between the chat flow and the hosted model.
//!
//! A [`ChatProvider`] creates sessions; a [`ChatHandle`] is one live session
//! that remembers its turns.  [`GeminiProvider`] and [`GeminiChat`] are the
//! production implementations; tests substitute scripted ones.

use std::time::Duration;

use crate::Gemini;
use crate::error::Result;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Model, UsageMetadata};

/// The text payload of one remote reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    /// Reply text; may be empty.
    pub text: String,
    /// Token accounting for the request, when the provider reports it.
    pub usage: Option<UsageMetadata>,
}

impl Reply {
    /// Create a reply with text only.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

/// One live conversational session held by the remote provider.
#[async_trait::async_trait]
pub trait ChatHandle: Send {
    /// Send one user turn and return the reply.
    async fn send_message(&mut self, text: &str) -> Result<Reply>;
}

/// Entry point for creating remote sessions.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// The session type this provider hands out.
    type Handle: ChatHandle;

    /// Create a session for `model` steered by `system_instruction`.
    async fn create_session(&self, model: &Model, system_instruction: &str)
    -> Result<Self::Handle>;
}

/// Creates [`GeminiChat`] sessions.
///
/// Credentials are resolved at session creation, so a missing key surfaces as
/// a failed creation rather than a failure to build the provider.
#[derive(Debug, Clone, Default)]
pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    generation_config: GenerationConfig,
}

impl GeminiProvider {
    /// A provider that reads its key from the environment.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Use an explicit API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sampling controls applied to every session.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = config;
        self
    }
}

#[async_trait::async_trait]
impl ChatProvider for GeminiProvider {
    type Handle = GeminiChat;

    async fn create_session(
        &self,
        model: &Model,
        system_instruction: &str,
    ) -> Result<Self::Handle> {
        let client =
            Gemini::with_options(self.api_key.clone(), self.base_url.clone(), self.timeout)?;
        Ok(client
            .chat(model.clone(), system_instruction)
            .with_generation_config(self.generation_config.clone()))
    }
}

/// A multi-turn Gemini conversation.
///
/// The API is stateless, so the session keeps the history and resends it with
/// the system instruction on every turn.  History only grows on success.
#[derive(Debug, Clone)]
pub struct GeminiChat {
    client: Gemini,
    model: Model,
    system_instruction: String,
    generation_config: GenerationConfig,
    history: Vec<Content>,
    usage: UsageMetadata,
}

impl GeminiChat {
    pub(crate) fn new(client: Gemini, model: Model, system_instruction: String) -> Self {
        Self {
            client,
            model,
            system_instruction,
            generation_config: GenerationConfig::default(),
            history: Vec::new(),
            usage: UsageMetadata::default(),
        }
    }

    /// Sampling controls for this session.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = config;
        self
    }

    /// The model this session talks to.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Committed turns, oldest first.
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Token usage summed over the session.
    pub fn usage(&self) -> UsageMetadata {
        self.usage
    }

    fn request(&self) -> GenerateContentRequest {
        GenerateContentRequest::new(self.history.clone())
            .with_system_instruction(self.system_instruction.clone())
            .with_generation_config(self.generation_config.clone())
    }
}

#[async_trait::async_trait]
impl ChatHandle for GeminiChat {
    async fn send_message(&mut self, text: &str) -> Result<Reply> {
        let previous_len = self.history.len();
        self.history.push(Content::user(text));

        let outcome = self
            .client
            .generate_content(&self.model, &self.request())
            .await;

        match outcome {
            Ok(response) => {
                if let Some(usage) = response.usage_metadata {
                    self.usage = self.usage + usage;
                }
                if let Some(reason) = response.block_reason() {
                    log::warn!("prompt blocked by {}: {reason}", self.model);
                }
                let reply = response.text();
                if reply.is_empty() {
                    // An unanswered user turn would break role alternation.
                    self.history.truncate(previous_len);
                } else {
                    self.history.push(Content::model(reply.clone()));
                }
                Ok(Reply {
                    text: reply,
                    usage: response.usage_metadata,
                })
            }
            Err(err) => {
                self.history.truncate(previous_len);
                Err(err)
            }
        }
    }
}
