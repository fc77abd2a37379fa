//! The chat UI state machine.
//!
//! [`ChatWidget`] owns the visible conversation and the draft input.  It moves
//! between [`WidgetState::Idle`] and [`WidgetState::AwaitingReply`]; while a
//! reply is outstanding the input and the send control are disabled, so at most
//! one exchange is in flight.

use crate::chat::session::SessionHolder;
use crate::provider::ChatProvider;

/// Who wrote a [`ChatMessage`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ChatRole {
    /// The site visitor.
    User,
    /// The assistant.
    Assistant,
}

/// One displayed turn.  Fields are private so a message cannot change after
/// it has been appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    role: ChatRole,
    text: String,
}

impl ChatMessage {
    /// A message from the visitor.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// A message from the assistant.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }

    /// Who wrote the message.
    pub fn role(&self) -> ChatRole {
        self.role
    }

    /// The message text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Whether a request is outstanding.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum WidgetState {
    /// Ready for input.
    #[default]
    Idle,
    /// One exchange is in flight; input is disabled.
    AwaitingReply,
}

/// The text of a submitted message, handed to the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    text: String,
}

impl PendingTurn {
    /// The text to forward.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The floating chat panel, minus the pixels.
#[derive(Debug, Clone, Default)]
pub struct ChatWidget {
    messages: Vec<ChatMessage>,
    input: String,
    state: WidgetState,
    open: bool,
}

impl ChatWidget {
    /// An empty, closed widget.
    pub fn new() -> Self {
        Self::default()
    }

    /// A widget whose conversation opens with `greeting` from the assistant.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(greeting)],
            ..Self::default()
        }
    }

    /// The conversation, in display order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The most recent message.
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The current draft.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The current state.
    pub fn state(&self) -> WidgetState {
        self.state
    }

    /// Returns true while a reply is outstanding.
    pub fn is_awaiting_reply(&self) -> bool {
        self.state == WidgetState::AwaitingReply
    }

    /// Returns true if the panel is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Show the panel.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Hide the panel.  The conversation and any outstanding exchange survive.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Replace the draft.  Ignored while a reply is outstanding.
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        if self.is_awaiting_reply() {
            return false;
        }
        self.input = text.into();
        true
    }

    /// Returns true if the send control is enabled.
    pub fn can_send(&self) -> bool {
        self.state == WidgetState::Idle && !self.input.trim().is_empty()
    }

    /// Submit the draft.
    ///
    /// Appends the user message, clears the draft and enters
    /// [`WidgetState::AwaitingReply`].  Returns `None`, changing nothing, if the
    /// draft is blank or a reply is already outstanding.
    pub fn submit(&mut self) -> Option<PendingTurn> {
        if !self.can_send() {
            return None;
        }
        let text = std::mem::take(&mut self.input);
        self.messages.push(ChatMessage::user(text.clone()));
        self.state = WidgetState::AwaitingReply;
        Some(PendingTurn { text })
    }

    /// Append the reply to the outstanding exchange and return to idle.
    ///
    /// Returns false, changing nothing, when no exchange is outstanding.
    pub fn resolve(&mut self, reply: impl Into<String>) -> bool {
        if !self.is_awaiting_reply() {
            return false;
        }
        self.messages.push(ChatMessage::assistant(reply));
        self.state = WidgetState::Idle;
        true
    }

    /// Submit the draft, run the exchange, and append the reply.
    ///
    /// Returns the appended assistant message, or `None` if nothing was sent.
    pub async fn send<P: ChatProvider>(
        &mut self,
        holder: &mut SessionHolder<P>,
    ) -> Option<&ChatMessage> {
        let pending = self.submit()?;
        let exchange = holder.send_message(pending.text()).await;
        self.resolve(exchange.into_text());
        self.messages.last()
    }

    /// Status line shown in the panel header.
    pub fn status_label(&self) -> &'static str {
        match self.state {
            WidgetState::Idle => "SYSTEM ONLINE",
            WidgetState::AwaitingReply => "PROCESSING...",
        }
    }

    /// Placeholder shown in the input box.
    pub fn placeholder(&self) -> &'static str {
        match self.state {
            WidgetState::Idle => "Input command or query...",
            WidgetState::AwaitingReply => "Waiting for response...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_moves_to_awaiting() {
        let mut widget = ChatWidget::new();
        assert!(widget.set_input("Hello"));
        assert!(widget.can_send());

        let pending = widget.submit().unwrap();
        assert_eq!(pending.text(), "Hello");
        assert_eq!(widget.state(), WidgetState::AwaitingReply);
        assert_eq!(widget.input(), "");
        assert_eq!(widget.messages(), &[ChatMessage::user("Hello")]);
        assert_eq!(widget.status_label(), "PROCESSING...");
        assert_eq!(widget.placeholder(), "Waiting for response...");
    }

    #[test]
    fn blank_input_does_nothing() {
        let mut widget = ChatWidget::new();
        for blank in ["", "   ", "\n\t "] {
            widget.set_input(blank);
            assert!(!widget.can_send());
            assert!(widget.submit().is_none());
        }
        assert!(widget.messages().is_empty());
        assert_eq!(widget.state(), WidgetState::Idle);
    }

    #[test]
    fn submit_while_awaiting_is_noop() {
        let mut widget = ChatWidget::new();
        widget.set_input("first");
        widget.submit().unwrap();

        assert!(!widget.set_input("second"));
        assert_eq!(widget.input(), "");
        assert!(widget.submit().is_none());
        assert_eq!(widget.messages().len(), 1);
    }

    #[test]
    fn resolve_appends_exactly_one_reply() {
        let mut widget = ChatWidget::new();
        assert!(!widget.resolve("stray"));
        assert!(widget.messages().is_empty());

        widget.set_input("Hi");
        widget.submit().unwrap();
        assert!(widget.resolve("Hello, visitor."));
        assert!(!widget.resolve("again"));
        assert_eq!(
            widget.messages(),
            &[ChatMessage::user("Hi"), ChatMessage::assistant("Hello, visitor.")]
        );
        assert_eq!(widget.state(), WidgetState::Idle);
        assert_eq!(widget.status_label(), "SYSTEM ONLINE");
    }

    #[test]
    fn user_text_is_kept_as_typed() {
        let mut widget = ChatWidget::new();
        widget.set_input("  padded  ");
        assert_eq!(widget.submit().unwrap().text(), "  padded  ");
        assert_eq!(widget.messages()[0].text(), "  padded  ");
    }

    #[test]
    fn greeting_is_first_message() {
        let widget = ChatWidget::with_greeting("Greetings.");
        assert_eq!(widget.messages().len(), 1);
        assert_eq!(widget.messages()[0].role(), ChatRole::Assistant);
        assert!(!widget.is_open());
    }

    #[test]
    fn closing_keeps_conversation() {
        let mut widget = ChatWidget::with_greeting("Greetings.");
        widget.open();
        assert!(widget.is_open());
        widget.set_input("Hi");
        widget.submit().unwrap();
        widget.close();
        assert!(!widget.is_open());
        assert!(widget.is_awaiting_reply());
        assert!(widget.resolve("Hello"));
        assert_eq!(widget.messages().len(), 3);
    }
}
