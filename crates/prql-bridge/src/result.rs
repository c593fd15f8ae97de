//! Outcome of a single stage call

use serde::Serialize;

use crate::BridgeError;
use crate::diagnostic::{Message, has_errors};

/// Reason attached when a stage failed without saying why
pub const UNREPORTED_FAILURE: &str = "compiler core reported failure without diagnostics";

/// Output text or diagnostics, never neither.
///
/// - any `Error` message ⇒ `output` is `None`
/// - `output` is `None` ⇒ at least one `Error` message
/// - warnings and lints alone keep the output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileResult {
    output: Option<String>,
    messages: Vec<Message>,
}

impl CompileResult {
    /// Successful output, possibly with non-fatal messages.
    ///
    /// If `messages` contains an error the output is dropped.
    pub fn success(output: impl Into<String>, messages: Vec<Message>) -> Self {
        Self::from_parts(Some(output.into()), messages)
    }

    /// Failed stage. An error is appended if `messages` has none.
    pub fn failure(messages: Vec<Message>) -> Self {
        Self::from_parts(None, messages)
    }

    pub(crate) fn from_parts(output: Option<String>, mut messages: Vec<Message>) -> Self {
        if has_errors(&messages) {
            return Self {
                output: None,
                messages,
            };
        }
        if output.is_none() {
            messages.push(Message::error(UNREPORTED_FAILURE));
        }
        Self { output, messages }
    }

    /// Output of the stage; `None` when compilation failed.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Diagnostics in the order they were produced
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_error())
    }

    pub fn first_error(&self) -> Option<&Message> {
        self.errors().next()
    }

    pub fn into_parts(self) -> (Option<String>, Vec<Message>) {
        (self.output, self.messages)
    }

    /// Output on success, every message on failure. Warnings are discarded on success.
    pub fn into_result(self) -> Result<String, BridgeError> {
        match self.output {
            Some(output) => Ok(output),
            None => Err(BridgeError::Compile(self.messages)),
        }
    }

    pub fn to_json(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }
}
