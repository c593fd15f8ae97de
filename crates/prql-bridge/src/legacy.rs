//! Status-code adapter for integrations that predate structured results
//!
//! The caller owns a fixed buffer. Success writes the stage output; failure
//! writes the first error, rendered. Text is cut on a character boundary and
//! always NUL-terminated. Only pass/fail survives: warnings and any further
//! errors are dropped.

use crate::result::CompileResult;

pub const STATUS_OK: i32 = 0;
/// Compilation failed; the buffer holds the first error
pub const STATUS_FAILED: i32 = -1;
/// Compilation succeeded but the output did not fit
pub const STATUS_TRUNCATED: i32 = -2;
/// No usable buffer was supplied
pub const STATUS_NO_BUFFER: i32 = -3;

/// Status and full text the legacy form would write
pub fn legacy_text(result: &CompileResult) -> (i32, String) {
    match (result.output(), result.first_error()) {
        (Some(output), _) => (STATUS_OK, output.to_string()),
        (None, Some(error)) => (STATUS_FAILED, error.to_string()),
        (None, None) => (STATUS_FAILED, String::new()),
    }
}

/// Write `result` into `out` and return the status code.
///
/// A failed compilation reports [`STATUS_FAILED`] even if its text was cut.
pub fn write_status(result: &CompileResult, out: &mut [u8]) -> i32 {
    if out.is_empty() {
        return STATUS_NO_BUFFER;
    }

    let (status, text) = legacy_text(result);
    let written = write_truncated(&text, out);
    if status == STATUS_OK && written < text.len() {
        log::debug!(
            "legacy buffer of {} bytes truncated {} bytes of output",
            out.len(),
            text.len()
        );
        STATUS_TRUNCATED
    } else {
        status
    }
}

/// Copy as much of `text` as fits, leaving room for the terminator.
/// Returns the number of bytes copied, not counting the terminator.
pub fn write_truncated(text: &str, out: &mut [u8]) -> usize {
    let Some(capacity) = out.len().checked_sub(1) else {
        return 0;
    };

    let mut end = text.len().min(capacity);
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    out[..end].copy_from_slice(&text.as_bytes()[..end]);
    out[end] = 0;
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Message;

    fn c_text(buf: &[u8]) -> &str {
        let end = buf.iter().position(|&b| b == 0).unwrap();
        std::str::from_utf8(&buf[..end]).unwrap()
    }

    #[test]
    fn success_writes_output() {
        let res = CompileResult::success("SELECT 1", vec![]);
        let mut buf = [0xffu8; 32];
        assert_eq!(write_status(&res, &mut buf), STATUS_OK);
        assert_eq!(c_text(&buf), "SELECT 1");
    }

    #[test]
    fn failure_writes_first_error_only() {
        let res = CompileResult::failure(vec![
            Message::warning("ignored"),
            Message::error("first").with_code("E0001"),
            Message::error("second"),
        ]);
        let mut buf = [0u8; 128];
        assert_eq!(write_status(&res, &mut buf), STATUS_FAILED);
        assert_eq!(c_text(&buf), "[E0001] Error: first\n");
    }

    #[test]
    fn undersized_buffer_truncates() {
        let res = CompileResult::success("SELECT album_id FROM albums", vec![]);
        let mut buf = [0xffu8; 7];
        assert_eq!(write_status(&res, &mut buf), STATUS_TRUNCATED);
        assert_eq!(c_text(&buf), "SELECT");
    }

    #[test]
    fn truncated_failure_is_still_a_failure() {
        let res = CompileResult::failure(vec![Message::error("a long reason")]);
        let mut buf = [0u8; 4];
        assert_eq!(write_status(&res, &mut buf), STATUS_FAILED);
        assert_eq!(c_text(&buf), "Err");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut buf = [0xffu8; 4];
        // "é" is two bytes; three fit but the cut must land before it
        assert_eq!(write_truncated("abé", &mut buf), 2);
        assert_eq!(c_text(&buf), "ab");
    }

    #[test]
    fn empty_buffer_is_rejected() {
        let res = CompileResult::success("x", vec![]);
        assert_eq!(write_status(&res, &mut []), STATUS_NO_BUFFER);
    }

    #[test]
    fn single_byte_buffer_holds_only_terminator() {
        let mut buf = [0xffu8; 1];
        assert_eq!(write_truncated("abc", &mut buf), 0);
        assert_eq!(buf[0], 0);
    }
}
