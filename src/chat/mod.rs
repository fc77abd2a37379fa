//! The site's chat assistant.
//!
//! This module provides the pieces behind the floating chat widget:
//!
//! - `session`: owns the remote session and performs message exchanges,
//!   mapping every failure to a fixed fallback sentence
//! - `widget`: the append-only conversation and the idle/awaiting state machine
//! - `config`: CLI arguments, YAML config file and resolved configuration
//! - `commands`: slash commands for the terminal front end

mod commands;
mod config;
mod session;
mod widget;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_GREETING, DEFAULT_SYSTEM_INSTRUCTION};
pub use session::{
    CANNOT_CONNECT_REPLY, CONNECTION_ISSUE_REPLY, EMPTY_REPLY, Exchange, ExchangeStats,
    SessionHolder,
};
pub use widget::{ChatMessage, ChatRole, ChatWidget, PendingTurn, WidgetState};
