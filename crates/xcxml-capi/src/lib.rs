//! C ABI for `xcxml`.
//!
//! Exposes the classic `xml_get_value` call surface: a status code that is
//! `0` when the element was found and `-1` otherwise, with `errno` telling a
//! plain "not found" (errno `0`) apart from a failure (errno set).
//!
//! # Error Handling
//!
//! On failure the error kind and a message are also stored in thread-local
//! storage and can be retrieved via [`xml_last_error`] and
//! [`xml_last_error_message`]. Every call to [`xml_get_value`] resets them.
//!
//! # Safety
//!
//! All `extern "C"` functions accept raw pointers from C callers and are
//! unsafe to call from Rust.
#![allow(unsafe_code, clippy::missing_safety_doc)]

use std::{
    cell::RefCell,
    ffi::{CStr, CString, c_char, c_int},
    path::Path,
};

use xcxml::{Lookup, LookupError};

/// Status returned when the element was found.
pub const XML_FOUND: i8 = 0;
/// Status returned when the element was not found or the lookup failed.
pub const XML_NOT_FOUND: i8 = -1;

#[derive(Default)]
struct LastError {
    code: c_int,
    message: Option<CString>,
}

thread_local! {
    static LAST_ERROR: RefCell<LastError> = RefCell::new(LastError::default());
}

fn set_last_error(err: &LookupError) {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = LastError {
            code: c_int::from(err.kind().code()),
            message: CString::new(err.to_string()).ok(),
        };
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = LastError::default());
}

/// Copies the text of the element at `query` in the XML file at `path` into
/// `buf`, truncated to `size - 1` bytes and NUL-terminated.
///
/// Returns `0` if the element was found. Returns `-1` if it was not found,
/// with `errno` left at `0`, or if the lookup failed, with `errno` set to
/// `EINVAL` (bad arguments or query), the I/O error (or `EIO`), or `EILSEQ`
/// (malformed document).
///
/// # Safety
///
/// `path` and `query` must be null or point to NUL-terminated strings. `buf`
/// must be null or valid for writes of `size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xml_get_value(
    path: *const c_char,
    query: *const c_char,
    buf: *mut c_char,
    size: usize,
) -> i8 {
    clear_last_error();

    // SAFETY: the pointer requirements are forwarded from the caller.
    let result = unsafe { get_value(path, query, buf, size) };
    // successful library calls may still leave errno dirty
    set_errno(0);
    match result {
        Ok(Lookup::Found { .. }) => XML_FOUND,
        Ok(Lookup::NotFound) => XML_NOT_FOUND,
        Err(err) => {
            log::debug!("xml_get_value failed: {err}");
            set_errno(errno_for(&err));
            set_last_error(&err);
            XML_NOT_FOUND
        }
    }
}

unsafe fn get_value(
    path: *const c_char,
    query: *const c_char,
    buf: *mut c_char,
    size: usize,
) -> Result<Lookup, LookupError> {
    if path.is_null() || query.is_null() || buf.is_null() {
        return Err(LookupError::InvalidArgument("null pointer"));
    }
    if size == 0 {
        return Err(LookupError::InvalidArgument(
            "destination must hold at least the terminator",
        ));
    }

    // SAFETY: both are non-null and NUL-terminated per the caller contract.
    let (path, query) = unsafe { (CStr::from_ptr(path), CStr::from_ptr(query)) };
    let query = query
        .to_str()
        .map_err(|_| LookupError::InvalidArgument("query is not valid UTF-8"))?;
    // SAFETY: `buf` is non-null and valid for `size` bytes per the caller
    // contract; `c_char` and `u8` have the same layout.
    let dest = unsafe { std::slice::from_raw_parts_mut(buf.cast::<u8>(), size) };

    xcxml::lookup(c_path(path)?, query, dest)
}

#[cfg(unix)]
fn c_path(path: &CStr) -> Result<&Path, LookupError> {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    Ok(Path::new(OsStr::from_bytes(path.to_bytes())))
}

#[cfg(not(unix))]
fn c_path(path: &CStr) -> Result<&Path, LookupError> {
    path.to_str()
        .map(Path::new)
        .map_err(|_| LookupError::InvalidArgument("path is not valid UTF-8"))
}

fn errno_for(err: &LookupError) -> c_int {
    match err {
        LookupError::InvalidArgument(_) | LookupError::InvalidQuery(_) => libc::EINVAL,
        LookupError::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
        LookupError::Parse(_) => libc::EILSEQ,
    }
}

#[cfg(target_os = "linux")]
fn set_errno(value: c_int) {
    // SAFETY: `__errno_location` returns a valid pointer to this thread's errno.
    unsafe { *libc::__errno_location() = value };
}

#[cfg(target_os = "android")]
fn set_errno(value: c_int) {
    // SAFETY: `__errno` returns a valid pointer to this thread's errno.
    unsafe { *libc::__errno() = value };
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
fn set_errno(value: c_int) {
    // SAFETY: `__error` returns a valid pointer to this thread's errno.
    unsafe { *libc::__error() = value };
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
)))]
fn set_errno(_value: c_int) {}

/// Returns the kind of the last error on this thread: `0` for none, `1`
/// invalid argument, `2` invalid query, `3` I/O, `4` malformed document.
#[unsafe(no_mangle)]
pub extern "C" fn xml_last_error() -> c_int {
    LAST_ERROR.with(|cell| cell.borrow().code)
}

/// Returns the message of the last error on this thread, or null if the last
/// call succeeded.
///
/// The returned string is owned by the library and must NOT be freed by the
/// caller. It is valid until the next call to [`xml_get_value`] on the same
/// thread.
#[unsafe(no_mangle)]
pub extern "C" fn xml_last_error_message() -> *const c_char {
    LAST_ERROR.with(|cell| {
        cell.borrow()
            .message
            .as_ref()
            .map_or(std::ptr::null(), |message| message.as_ptr())
    })
}
