//! Result arena
//!
//! A [`ResultArena`] owns every allocation a [`CompileResult`] view points
//! into. The view is the first field of a `#[repr(C)]` struct, so the pointer
//! handed out is also a pointer to the arena, and destroying it releases the
//! whole graph at once.

use std::ffi::CString;
use std::ptr;

use crate::types::{CompileResult, Message, MessageKind, SourceLocation, Span};

#[repr(C)]
pub(crate) struct ResultArena {
    view: CompileResult,
    // owners of everything `view` points into
    #[allow(dead_code)]
    messages: Vec<Message>,
    #[allow(dead_code)]
    owned: Vec<OwnedMessage>,
    #[allow(dead_code)]
    output: Option<CString>,
}

struct OwnedMessage {
    kind: MessageKind,
    code: Option<CString>,
    reason: CString,
    hint: Option<CString>,
    span: Option<Box<Span>>,
    display: Option<CString>,
    location: Option<Box<SourceLocation>>,
}

impl OwnedMessage {
    fn new(msg: prql_bridge::Message) -> Self {
        Self {
            kind: msg.kind.into(),
            code: msg.code.map(c_string),
            reason: c_string(msg.reason),
            hint: msg.hint.map(c_string),
            span: msg.span.map(|s| {
                Box::new(Span {
                    start: s.start,
                    end: s.end,
                })
            }),
            display: msg.display.map(c_string),
            location: msg.location.map(|l| {
                Box::new(SourceLocation {
                    start_line: l.start_line,
                    start_col: l.start_col,
                    end_line: l.end_line,
                    end_col: l.end_col,
                })
            }),
        }
    }

    fn view(&self) -> Message {
        Message {
            kind: self.kind,
            code: opt_ptr(&self.code),
            reason: self.reason.as_ptr(),
            hint: opt_ptr(&self.hint),
            span: self.span.as_deref().map_or(ptr::null(), ptr::from_ref),
            display: opt_ptr(&self.display),
            location: self.location.as_deref().map_or(ptr::null(), ptr::from_ref),
        }
    }
}

impl ResultArena {
    fn new(result: prql_bridge::CompileResult) -> Box<Self> {
        let (output, messages) = result.into_parts();
        let output = output.map(c_string);
        let owned: Vec<OwnedMessage> = messages.into_iter().map(OwnedMessage::new).collect();
        // heap contents stay put when the vectors and strings move into the arena
        let messages: Vec<Message> = owned.iter().map(OwnedMessage::view).collect();

        let view = CompileResult {
            output: opt_ptr(&output),
            messages: if messages.is_empty() {
                ptr::null()
            } else {
                messages.as_ptr()
            },
            messages_len: messages.len(),
        };

        Box::new(Self {
            view,
            messages,
            owned,
            output,
        })
    }
}

/// Move `result` into a fresh arena and hand out its view
pub(crate) fn into_raw(result: prql_bridge::CompileResult) -> *const CompileResult {
    Box::into_raw(ResultArena::new(result)).cast::<CompileResult>().cast_const()
}

/// Release an arena created by [`into_raw`]. Null is ignored.
///
/// # Safety
///
/// `result` must be null or come from [`into_raw`], and must not be used again.
pub(crate) unsafe fn destroy(result: *const CompileResult) {
    if result.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(result.cast::<ResultArena>().cast_mut()) });
}

fn opt_ptr(s: &Option<CString>) -> *const libc::c_char {
    s.as_ref().map_or(ptr::null(), |s| s.as_ptr())
}

/// C strings cannot hold NUL, so any interior ones are dropped
pub(crate) fn c_string(text: String) -> CString {
    CString::new(text).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|&b| b != 0);
        // SAFETY: every NUL byte was just removed
        unsafe { CString::from_vec_unchecked(bytes) }
    })
}
