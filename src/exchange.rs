//! # Exchange
//! One question and its framing instruction, turned into the chat request sent to the LLM.
//!
//! An exchange always becomes exactly two messages, in order:
//! 1. a [Role::System] message carrying the persona instruction
//! 2. a [Role::User] message carrying the user's text, untouched

use std::fmt;
use serde::{Deserialize, Serialize};

/// Sampling temperature of every exchange.
pub const TEMPERATURE: f32 = 0.7;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => f.write_str("system"),
            Role::User => f.write_str("user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// The pair of strings an exchange is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub instruction: String,
    pub user_text: String,
}

impl Exchange {
    pub fn new(instruction: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            user_text: user_text.into(),
        }
    }

    /// The two messages of the exchange: system instruction first, then the user text.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.instruction.clone()),
            ChatMessage::user(self.user_text.clone()),
        ]
    }

    /// Turn the exchange into a request for `model` at [TEMPERATURE].
    pub fn into_request(self, model: impl Into<String>) -> ChatRequest {
        ChatRequest {
            model: model.into(),
            messages: self.messages(),
            temperature: TEMPERATURE,
        }
    }
}

/// A chat completion request, readonly once built.
#[readonly::make]
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}
