//! Compiler diagnostics
//!
//! A [`Message`] always carries a `reason`. Every other field is independently
//! optional: a message can have a span without a location, a display without a
//! code, and so on.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Error,
    Warning,
    Lint,
}

impl MessageKind {
    fn label(self) -> &'static str {
        match self {
            MessageKind::Error => "Error",
            MessageKind::Warning => "Warning",
            MessageKind::Lint => "Lint",
        }
    }
}

/// Character offsets into the text a stage was given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Line/column decoding of a [`Span`] (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

/// One diagnostic produced by a compilation stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    /// Machine-readable identifier
    pub code: Option<String>,
    /// Human-readable text, always present
    pub reason: String,
    /// Suggestions, one per line
    pub hint: Option<String>,
    pub span: Option<Span>,
    /// Pre-rendered annotated source
    pub display: Option<String>,
    pub location: Option<SourceLocation>,
}

impl Message {
    pub fn new(kind: MessageKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            reason: reason.into(),
            hint: None,
            span: None,
            display: None,
            location: None,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, reason)
    }

    pub fn warning(reason: impl Into<String>) -> Self {
        Self::new(MessageKind::Warning, reason)
    }

    pub fn lint(reason: impl Into<String>) -> Self {
        Self::new(MessageKind::Lint, reason)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some(Span { start, end });
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ariadne pads its reports with trailing spaces
        if let Some(display) = &self.display {
            let trimmed = display
                .split('\n')
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n");
            return f.write_str(&trimmed);
        }

        if let Some(code) = &self.code {
            write!(f, "[{code}] ")?;
        }
        writeln!(f, "{}: {}", self.kind.label(), self.reason)?;
        for hint in self.hint.iter().flat_map(|h| h.lines()) {
            writeln!(f, "↳ Hint: {hint}")?;
        }
        Ok(())
    }
}

/// Whether any message in `messages` is an error
pub fn has_errors(messages: &[Message]) -> bool {
    messages.iter().any(Message::is_error)
}

/// Render messages one after another, in order
pub fn render(messages: &[Message]) -> String {
    messages.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_without_annotation_uses_code_and_hints() {
        let msg = Message::error("Unknown name `title`")
            .with_code("E0001")
            .with_hint("did you mean `tittle`?\nor `titles`?");

        assert_eq!(
            msg.to_string(),
            "[E0001] Error: Unknown name `title`\n↳ Hint: did you mean `tittle`?\n↳ Hint: or `titles`?\n"
        );
    }

    #[test]
    fn display_prefers_annotation_and_trims_lines() {
        let msg = Message::error("bad").with_display("Error:   \n  ╭─[ :1:1 ]  \n");
        assert_eq!(msg.to_string(), "Error:\n  ╭─[ :1:1 ]\n");
    }

    #[test]
    fn warning_label() {
        let msg = Message::warning("column is unused");
        assert_eq!(msg.to_string(), "Warning: column is unused\n");
        assert!(!msg.is_error());
    }

    #[test]
    fn has_errors_ignores_warnings_and_lints() {
        let messages = vec![Message::warning("w"), Message::lint("l")];
        assert!(!has_errors(&messages));

        let messages = vec![Message::lint("l"), Message::error("e")];
        assert!(has_errors(&messages));
    }

    #[test]
    fn optional_fields_are_independent() {
        let msg = Message::error("x").with_span(3, 7);
        assert_eq!(msg.span, Some(Span { start: 3, end: 7 }));
        assert!(msg.location.is_none());
        assert!(msg.display.is_none());
        assert!(msg.code.is_none());
    }

    #[test]
    fn empty_hint_is_present_not_absent() {
        let msg = Message::error("x").with_hint("");
        assert_eq!(msg.hint.as_deref(), Some(""));
    }

    #[test]
    fn serializes_kind_in_snake_case() {
        let json = serde_json::to_value(Message::lint("x")).unwrap();
        assert_eq!(json["kind"], "lint");
        assert!(json["span"].is_null());
    }
}
