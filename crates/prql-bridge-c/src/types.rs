//! `#[repr(C)]` views handed across the boundary
//!
//! Optional fields are nullable pointers: null means absent, a pointer to an
//! empty string means present and empty. Every pointer is owned by the result
//! arena and released by `result_destroy`.

use libc::{c_char, size_t};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Warning,
    Lint,
}

impl From<prql_bridge::MessageKind> for MessageKind {
    fn from(kind: prql_bridge::MessageKind) -> Self {
        match kind {
            prql_bridge::MessageKind::Error => MessageKind::Error,
            prql_bridge::MessageKind::Warning => MessageKind::Warning,
            prql_bridge::MessageKind::Lint => MessageKind::Lint,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: size_t,
    pub end: size_t,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub start_line: size_t,
    pub start_col: size_t,
    pub end_line: size_t,
    pub end_col: size_t,
}

/// Compile message
#[repr(C)]
pub struct Message {
    pub kind: MessageKind,
    /// Machine-readable identifier. Nullable.
    pub code: *const c_char,
    /// Never null
    pub reason: *const c_char,
    /// Nullable
    pub hint: *const c_char,
    /// Character offsets into the stage input. Nullable.
    pub span: *const Span,
    /// Annotated source. Nullable.
    pub display: *const c_char,
    /// Nullable
    pub location: *const SourceLocation,
}

/// Result of a stage call. Release with `result_destroy`.
#[repr(C)]
pub struct CompileResult {
    /// Null on failure
    pub output: *const c_char,
    /// Null when `messages_len` is zero
    pub messages: *const Message,
    pub messages_len: size_t,
}

/// Compilation options
#[repr(C)]
pub struct Options {
    /// Pass generated SQL string through a formatter that splits it
    /// into multiple lines and prettifies indentation and spacing.
    ///
    /// Defaults to true.
    pub format: bool,

    /// Target and dialect to compile to.
    ///
    /// Null or empty means `sql.any`, which uses the `target` argument from the
    /// query header to determine the SQL dialect.
    pub target: *const c_char,

    /// Emits the compiler signature as a comment after generated SQL
    ///
    /// Defaults to true.
    pub signature_comment: bool,
}
