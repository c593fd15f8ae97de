//! C interface to prql-bridge
//!
//! Structured functions return a `const CompileResult *` that the caller
//! releases with [`result_destroy`]. The `*_buffer` functions are the older
//! status-code form: they write into a caller-owned buffer and return one of
//! the `legacy::STATUS_*` codes.
//!
//! Nothing here panics across the boundary.
#![cfg(not(target_family = "wasm"))]

mod arena;
pub mod types;

use std::ffi::{CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use libc::{c_char, c_int, size_t};
use prql_bridge::legacy;
use prql_bridge::{Configuration, Message};

pub use types::{CompileResult, MessageKind, Options, SourceLocation, Span};

// ============ Structured results ============

/// Compile a PRQL string into a SQL string.
///
/// Equivalent to `prql_to_pl`, `pl_to_rq` and `rq_to_sql` without the JSON
/// round trip in between. A null `options` means defaults.
///
/// # Safety
///
/// `query` must be null or a NUL-terminated string. `options` must be null or
/// point to a valid `Options`. The result must be released with
/// `result_destroy` exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compile(
    query: *const c_char,
    options: *const Options,
) -> *const CompileResult {
    let result = guard(|| {
        let query = unsafe { read_input(query, "query") }?;
        let config = unsafe { read_options(options) };
        Ok(prql_bridge::compile(&query, Some(&config)))
    });
    arena::into_raw(result)
}

/// Build PL from a PRQL string. Output is PL serialized as JSON.
///
/// # Safety
///
/// `query` must be null or a NUL-terminated string. The result must be
/// released with `result_destroy` exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn prql_to_pl(query: *const c_char) -> *const CompileResult {
    let result = guard(|| {
        let query = unsafe { read_input(query, "query") }?;
        Ok(prql_bridge::parse_to_pl(&query))
    });
    arena::into_raw(result)
}

/// Resolve names and frames, converting PL JSON into RQ JSON.
///
/// # Safety
///
/// `pl_json` must be null or a NUL-terminated string. The result must be
/// released with `result_destroy` exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pl_to_rq(pl_json: *const c_char) -> *const CompileResult {
    let result = guard(|| {
        let pl = unsafe { read_input(pl_json, "pl_json") }?;
        Ok(prql_bridge::resolve_to_rq(&pl))
    });
    arena::into_raw(result)
}

/// Convert RQ JSON into SQL.
///
/// # Safety
///
/// `rq_json` must be null or a NUL-terminated string. `options` must be null
/// or point to a valid `Options`. The result must be released with
/// `result_destroy` exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rq_to_sql(
    rq_json: *const c_char,
    options: *const Options,
) -> *const CompileResult {
    let result = guard(|| {
        let rq = unsafe { read_input(rq_json, "rq_json") }?;
        let config = unsafe { read_options(options) };
        Ok(prql_bridge::generate_sql(&rq, Some(&config)))
    });
    arena::into_raw(result)
}

/// Regenerate PRQL source from PL JSON.
///
/// # Safety
///
/// `pl_json` must be null or a NUL-terminated string. The result must be
/// released with `result_destroy` exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pl_to_prql(pl_json: *const c_char) -> *const CompileResult {
    let result = guard(|| {
        let pl = unsafe { read_input(pl_json, "pl_json") }?;
        Ok(prql_bridge::pl_to_prql(&pl))
    });
    arena::into_raw(result)
}

/// Release a result and everything it points to. Null is ignored.
///
/// # Safety
///
/// `result` must be null or returned by one of the functions above, and must
/// not be used again afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn result_destroy(result: *const CompileResult) {
    unsafe { arena::destroy(result) }
}

/// Version of the underlying compiler. The string is static; do not free it.
#[unsafe(no_mangle)]
pub extern "C" fn compiler_version() -> *const c_char {
    static VERSION: OnceLock<CString> = OnceLock::new();
    VERSION
        .get_or_init(|| arena::c_string(prql_bridge::compiler_version()))
        .as_ptr()
}

// ============ Fixed buffers ============

/// Compile a PRQL string into SQL written to `out`.
///
/// Returns 0 on success, -1 on failure (the first error is written instead),
/// -2 if the SQL was truncated, -3 if `out` is null or `out_len` is zero.
///
/// # Safety
///
/// As for [`compile`]. `out` must be null or valid for `out_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compile_to_buffer(
    query: *const c_char,
    options: *const Options,
    out: *mut c_char,
    out_len: size_t,
) -> c_int {
    let Some(out) = (unsafe { out_buffer(out, out_len) }) else {
        return legacy::STATUS_NO_BUFFER;
    };
    let result = guard(|| {
        let query = unsafe { read_input(query, "query") }?;
        let config = unsafe { read_options(options) };
        Ok(prql_bridge::compile(&query, Some(&config)))
    });
    legacy::write_status(&result, out)
}

/// Build PL JSON from a PRQL string into `out`. Status codes as for
/// [`compile_to_buffer`].
///
/// # Safety
///
/// As for [`prql_to_pl`]. `out` must be null or valid for `out_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn prql_to_pl_buffer(
    query: *const c_char,
    out: *mut c_char,
    out_len: size_t,
) -> c_int {
    let Some(out) = (unsafe { out_buffer(out, out_len) }) else {
        return legacy::STATUS_NO_BUFFER;
    };
    let result = guard(|| {
        let query = unsafe { read_input(query, "query") }?;
        Ok(prql_bridge::parse_to_pl(&query))
    });
    legacy::write_status(&result, out)
}

/// Convert PL JSON into RQ JSON written to `out`. Status codes as for
/// [`compile_to_buffer`].
///
/// # Safety
///
/// As for [`pl_to_rq`]. `out` must be null or valid for `out_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pl_to_rq_buffer(
    pl_json: *const c_char,
    out: *mut c_char,
    out_len: size_t,
) -> c_int {
    let Some(out) = (unsafe { out_buffer(out, out_len) }) else {
        return legacy::STATUS_NO_BUFFER;
    };
    let result = guard(|| {
        let pl = unsafe { read_input(pl_json, "pl_json") }?;
        Ok(prql_bridge::resolve_to_rq(&pl))
    });
    legacy::write_status(&result, out)
}

/// Convert RQ JSON into SQL written to `out`. Status codes as for
/// [`compile_to_buffer`].
///
/// # Safety
///
/// As for [`rq_to_sql`]. `out` must be null or valid for `out_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rq_to_sql_buffer(
    rq_json: *const c_char,
    options: *const Options,
    out: *mut c_char,
    out_len: size_t,
) -> c_int {
    let Some(out) = (unsafe { out_buffer(out, out_len) }) else {
        return legacy::STATUS_NO_BUFFER;
    };
    let result = guard(|| {
        let rq = unsafe { read_input(rq_json, "rq_json") }?;
        let config = unsafe { read_options(options) };
        Ok(prql_bridge::generate_sql(&rq, Some(&config)))
    });
    legacy::write_status(&result, out)
}

// ============ Conversions ============

type Call = Result<prql_bridge::CompileResult, prql_bridge::CompileResult>;

/// Run a call, turning an early return or a panic into a failed result
fn guard(f: impl FnOnce() -> Call) -> prql_bridge::CompileResult {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(result) | Err(result)) => result,
        Err(_) => {
            log::warn!("panic caught at the C boundary");
            prql_bridge::CompileResult::failure(vec![Message::error(
                "internal compiler error: panic at the C boundary",
            )])
        }
    }
}

/// Read a required string argument, lossily
unsafe fn read_input(ptr: *const c_char, name: &str) -> Result<String, prql_bridge::CompileResult> {
    if ptr.is_null() {
        return Err(prql_bridge::CompileResult::failure(vec![Message::error(
            format!("`{name}` is a null pointer"),
        )]));
    }
    Ok(unsafe { c_str_to_string(ptr) })
}

unsafe fn c_str_to_string(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

unsafe fn read_options(options: *const Options) -> Configuration {
    let Some(o) = (unsafe { options.as_ref() }) else {
        return Configuration::default();
    };
    let target = if o.target.is_null() {
        String::new()
    } else {
        unsafe { c_str_to_string(o.target) }
    };

    // a blank target becomes sql.any when the driver resolves the configuration
    Configuration::default()
        .with_format(o.format)
        .with_signature_comment(o.signature_comment)
        .with_target(target)
}

unsafe fn out_buffer<'a>(out: *mut c_char, out_len: size_t) -> Option<&'a mut [u8]> {
    if out.is_null() || out_len == 0 {
        return None;
    }
    Some(unsafe { std::slice::from_raw_parts_mut(out.cast::<u8>(), out_len) })
}
