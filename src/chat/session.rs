//! Session ownership and the message exchange.
//!
//! [`SessionHolder`] owns at most one live provider session.  The session is
//! created lazily, and dropped whenever a send fails so that the next exchange
//! starts from a fresh one.  Exchanges never return an error: every failure
//! resolves to a fixed sentence the UI can append verbatim.

use std::time::Instant;

use time::OffsetDateTime;

use crate::chat::config::ChatConfig;
use crate::error::Error;
use crate::observability::{
    EXCHANGE_DURATION, EXCHANGE_EMPTY, EXCHANGE_FAILED, EXCHANGE_REPLIES, EXCHANGE_UNAVAILABLE,
    SESSION_CREATE_FAILURES, SESSION_CREATED, SESSION_RESETS,
};
use crate::provider::{ChatHandle, ChatProvider};
use crate::types::{Model, UsageMetadata};

/// Returned when no session could be created.
pub const CANNOT_CONNECT_REPLY: &str =
    "I'm currently having trouble connecting to my neural network. Please try again later.";

/// Returned when the provider answered with no text.
pub const EMPTY_REPLY: &str = "I processed that, but couldn't generate a text response.";

/// Returned when a send failed.
pub const CONNECTION_ISSUE_REPLY: &str =
    "I apologize, but I'm experiencing a temporary connection issue. Please try asking again.";

/// Outcome of one message exchange.
#[derive(Debug, Clone)]
pub enum Exchange {
    /// The provider replied with non-empty text.
    Reply(String),
    /// The provider replied without text, or there was nothing to send.
    Empty,
    /// No session could be created; nothing was sent.
    Unavailable,
    /// The send failed and the session was dropped.
    Failed(Error),
}

impl Exchange {
    /// The text to show the visitor: the reply, or the matching fallback.
    pub fn text(&self) -> &str {
        match self {
            Exchange::Reply(text) => text,
            Exchange::Empty => EMPTY_REPLY,
            Exchange::Unavailable => CANNOT_CONNECT_REPLY,
            Exchange::Failed(_) => CONNECTION_ISSUE_REPLY,
        }
    }

    /// Consume the outcome, yielding the text to show.
    pub fn into_text(self) -> String {
        match self {
            Exchange::Reply(text) => text,
            other => other.text().to_string(),
        }
    }

    /// Returns true if the provider produced a real reply.
    pub fn is_reply(&self) -> bool {
        matches!(self, Exchange::Reply(_))
    }
}

/// Counters for one holder, shown by `/stats`.
#[derive(Debug, Clone, Default)]
pub struct ExchangeStats {
    /// Sessions successfully created.
    pub sessions_created: u64,
    /// Session creations that failed.
    pub creation_failures: u64,
    /// Sessions dropped after a failed send or an explicit reset.
    pub resets: u64,
    /// Exchanges attempted.
    pub exchanges: u64,
    /// Exchanges that ended in a fallback sentence.
    pub fallbacks: u64,
    /// Token usage summed over all replies that reported it.
    pub usage: UsageMetadata,
    /// When the current session was created.
    pub session_started_at: Option<OffsetDateTime>,
}

/// Owns the remote session for one chat UI.
pub struct SessionHolder<P: ChatProvider> {
    provider: P,
    model: Model,
    system_instruction: String,
    session: Option<P::Handle>,
    stats: ExchangeStats,
}

impl<P: ChatProvider> SessionHolder<P> {
    /// Create a holder using the model and system instruction from `config`.
    pub fn new(provider: P, config: &ChatConfig) -> Self {
        Self::with_instruction(
            provider,
            config.model.clone(),
            config.system_instruction.clone(),
        )
    }

    /// Create a holder with an explicit model and instruction.
    pub fn with_instruction(
        provider: P,
        model: Model,
        system_instruction: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model,
            system_instruction: system_instruction.into(),
            session: None,
            stats: ExchangeStats::default(),
        }
    }

    /// The model new sessions are created for.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The instruction new sessions are created with.
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Returns true if a live session is held.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Counters for this holder.
    pub fn stats(&self) -> &ExchangeStats {
        &self.stats
    }

    /// Make sure a session exists, creating one if needed.
    ///
    /// Returns false if creation failed; the failure is logged and the holder
    /// stays without a session.
    pub async fn ensure_session(&mut self) -> bool {
        if self.session.is_some() {
            return true;
        }
        match self
            .provider
            .create_session(&self.model, &self.system_instruction)
            .await
        {
            Ok(handle) => {
                SESSION_CREATED.click();
                self.stats.sessions_created += 1;
                self.stats.session_started_at = Some(OffsetDateTime::now_utc());
                self.session = Some(handle);
                true
            }
            Err(err) => {
                SESSION_CREATE_FAILURES.click();
                self.stats.creation_failures += 1;
                log::warn!(
                    "failed to initialize chat session for {} ({}): {err}",
                    self.model,
                    err.kind()
                );
                false
            }
        }
    }

    /// Drop the current session; the next exchange creates a new one.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            SESSION_RESETS.click();
            self.stats.resets += 1;
            self.stats.session_started_at = None;
        }
    }

    /// Forward one user message and return the outcome.
    ///
    /// Blank input is never forwarded: it yields [`Exchange::Empty`] without
    /// creating a session or counting an exchange.  No retry happens within a
    /// call; after a failure the session is dropped and the next call recreates it.
    pub async fn send_message(&mut self, message: &str) -> Exchange {
        if message.trim().is_empty() {
            return Exchange::Empty;
        }
        self.stats.exchanges += 1;
        let start = Instant::now();
        let exchange = self.exchange(message).await;
        EXCHANGE_DURATION.add(start.elapsed().as_secs_f64());
        if !exchange.is_reply() {
            self.stats.fallbacks += 1;
        }
        exchange
    }

    async fn exchange(&mut self, message: &str) -> Exchange {
        if !self.ensure_session().await {
            EXCHANGE_UNAVAILABLE.click();
            return Exchange::Unavailable;
        }
        let Some(session) = self.session.as_mut() else {
            EXCHANGE_UNAVAILABLE.click();
            return Exchange::Unavailable;
        };

        match session.send_message(message).await {
            Ok(reply) => {
                if let Some(usage) = reply.usage {
                    self.stats.usage = self.stats.usage + usage;
                }
                if reply.text.is_empty() {
                    EXCHANGE_EMPTY.click();
                    Exchange::Empty
                } else {
                    EXCHANGE_REPLIES.click();
                    Exchange::Reply(reply.text)
                }
            }
            Err(err) => {
                EXCHANGE_FAILED.click();
                // Every failure kind resets the session.
                log::error!(
                    "error communicating with {} ({}, retryable: {}): {err}",
                    self.model,
                    err.kind(),
                    err.is_retryable()
                );
                self.reset();
                Exchange::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use crate::error::Result;
    use crate::provider::Reply;
    use crate::types::KnownModel;

    #[derive(Default)]
    struct Script {
        creations: usize,
        sends: Vec<String>,
        fail_creation: bool,
        replies: VecDeque<Result<Reply>>,
        instructions: Vec<String>,
    }

    #[derive(Clone, Default)]
    struct ScriptedProvider {
        script: Arc<Mutex<Script>>,
    }

    impl ScriptedProvider {
        fn replying(replies: Vec<Result<Reply>>) -> Self {
            let provider = Self::default();
            provider.script.lock().unwrap().replies = replies.into();
            provider
        }

        fn failing_creation() -> Self {
            let provider = Self::default();
            provider.script.lock().unwrap().fail_creation = true;
            provider
        }

        fn creations(&self) -> usize {
            self.script.lock().unwrap().creations
        }

        fn sends(&self) -> Vec<String> {
            self.script.lock().unwrap().sends.clone()
        }
    }

    struct ScriptedHandle {
        script: Arc<Mutex<Script>>,
    }

    #[async_trait::async_trait]
    impl ChatHandle for ScriptedHandle {
        async fn send_message(&mut self, text: &str) -> Result<Reply> {
            let mut script = self.script.lock().unwrap();
            script.sends.push(text.to_string());
            script
                .replies
                .pop_front()
                .unwrap_or_else(|| Ok(Reply::text("default reply")))
        }
    }

    #[async_trait::async_trait]
    impl ChatProvider for ScriptedProvider {
        type Handle = ScriptedHandle;

        async fn create_session(
            &self,
            _model: &Model,
            system_instruction: &str,
        ) -> Result<Self::Handle> {
            let mut script = self.script.lock().unwrap();
            script.creations += 1;
            script.instructions.push(system_instruction.to_string());
            if script.fail_creation {
                return Err(Error::authentication("no API key"));
            }
            Ok(ScriptedHandle {
                script: Arc::clone(&self.script),
            })
        }
    }

    fn holder(provider: &ScriptedProvider) -> SessionHolder<ScriptedProvider> {
        SessionHolder::with_instruction(
            provider.clone(),
            Model::Known(KnownModel::Gemini25Flash),
            "You are Kizazi AI.",
        )
    }

    #[tokio::test]
    async fn session_is_created_lazily_once() {
        let provider = ScriptedProvider::replying(vec![
            Ok(Reply::text("one")),
            Ok(Reply::text("two")),
        ]);
        let mut holder = holder(&provider);
        assert!(!holder.has_session());
        assert_eq!(provider.creations(), 0);

        assert_eq!(holder.send_message("first").await.text(), "one");
        assert_eq!(holder.send_message("second").await.text(), "two");
        assert_eq!(provider.creations(), 1);
        assert!(holder.has_session());
        assert_eq!(provider.sends(), vec!["first", "second"]);
        assert_eq!(
            provider.script.lock().unwrap().instructions,
            vec!["You are Kizazi AI."]
        );
    }

    #[tokio::test]
    async fn blank_message_is_never_forwarded() {
        let provider = ScriptedProvider::default();
        let mut holder = holder(&provider);
        for blank in ["", "   ", "\n\t"] {
            let exchange = holder.send_message(blank).await;
            assert!(matches!(exchange, Exchange::Empty));
        }
        assert_eq!(provider.creations(), 0);
        assert!(provider.sends().is_empty());
        assert!(!holder.has_session());
        assert_eq!(holder.stats().exchanges, 0);
        assert_eq!(holder.stats().fallbacks, 0);
    }

    #[tokio::test]
    async fn ensure_session_reuses_live_handle() {
        let provider = ScriptedProvider::default();
        let mut holder = holder(&provider);
        assert!(holder.ensure_session().await);
        assert!(holder.ensure_session().await);
        assert_eq!(provider.creations(), 1);
        assert!(holder.stats().session_started_at.is_some());
    }

    #[tokio::test]
    async fn send_failure_resets_and_recreates() {
        let provider = ScriptedProvider::replying(vec![
            Err(Error::connection("network down", None)),
            Ok(Reply::text("back online")),
        ]);
        let mut holder = holder(&provider);

        let exchange = holder.send_message("hello").await;
        assert!(matches!(exchange, Exchange::Failed(ref e) if e.is_connection()));
        assert_eq!(exchange.text(), CONNECTION_ISSUE_REPLY);
        assert!(!holder.has_session());
        assert_eq!(provider.creations(), 1);

        let exchange = holder.send_message("hello again").await;
        assert_eq!(exchange.into_text(), "back online");
        assert_eq!(provider.creations(), 2);
        assert_eq!(holder.stats().resets, 1);
    }

    #[tokio::test]
    async fn configuration_errors_also_reset() {
        let provider = ScriptedProvider::replying(vec![Err(Error::authentication("revoked"))]);
        let mut holder = holder(&provider);
        let exchange = holder.send_message("hello").await;
        assert_eq!(exchange.text(), CONNECTION_ISSUE_REPLY);
        assert!(!holder.has_session());
    }

    #[tokio::test]
    async fn creation_failure_never_sends() {
        let provider = ScriptedProvider::failing_creation();
        let mut holder = holder(&provider);
        for _ in 0..3 {
            let exchange = holder.send_message("anyone there?").await;
            assert!(matches!(exchange, Exchange::Unavailable));
            assert_eq!(exchange.text(), CANNOT_CONNECT_REPLY);
        }
        assert!(provider.sends().is_empty());
        assert_eq!(provider.creations(), 3);
        assert_eq!(holder.stats().creation_failures, 3);
        assert_eq!(holder.stats().fallbacks, 3);
    }

    #[tokio::test]
    async fn empty_reply_uses_fallback_and_keeps_session() {
        let provider = ScriptedProvider::replying(vec![Ok(Reply::text(""))]);
        let mut holder = holder(&provider);
        let exchange = holder.send_message("hello").await;
        assert!(matches!(exchange, Exchange::Empty));
        assert_eq!(exchange.text(), EMPTY_REPLY);
        assert!(holder.has_session());
    }

    #[tokio::test]
    async fn reply_is_returned_verbatim() {
        let provider = ScriptedProvider::replying(vec![Ok(Reply::text("  spaced\nreply  "))]);
        let mut holder = holder(&provider);
        assert_eq!(holder.send_message("hello").await.into_text(), "  spaced\nreply  ");
    }

    #[tokio::test]
    async fn usage_is_accumulated() {
        let usage = UsageMetadata {
            prompt_token_count: 10,
            candidates_token_count: 5,
            total_token_count: 15,
        };
        let provider = ScriptedProvider::replying(vec![
            Ok(Reply {
                text: "a".to_string(),
                usage: Some(usage),
            }),
            Ok(Reply {
                text: "b".to_string(),
                usage: Some(usage),
            }),
        ]);
        let mut holder = holder(&provider);
        holder.send_message("1").await;
        holder.send_message("2").await;
        assert_eq!(holder.stats().usage.total_token_count, 30);
        assert_eq!(holder.stats().exchanges, 2);
        assert_eq!(holder.stats().fallbacks, 0);
    }

    #[tokio::test]
    async fn explicit_reset_forces_new_session() {
        let provider = ScriptedProvider::default();
        let mut holder = holder(&provider);
        holder.send_message("hi").await;
        holder.reset();
        holder.reset();
        assert_eq!(holder.stats().resets, 1);
        holder.send_message("hi").await;
        assert_eq!(provider.creations(), 2);
    }
}
