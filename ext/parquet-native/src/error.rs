//! The error descriptor and the catch boundary
//!
//! Every exported operation body runs inside [`ffi_catch`]: a `Result`
//! plus a panic guard. Failures become a heap-allocated `(kind, message)`
//! descriptor the caller must free exactly once; success is a null
//! pointer. Out-parameters are only written on the success path.

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use parquet_native_core::{CoreError, Result};

/// Owned (kind, message) failure record crossing the boundary
pub struct ErrorInfo {
    kind: CString,
    message: CString,
}

impl ErrorInfo {
    pub(crate) fn new(kind: &str, message: &str) -> Box<ErrorInfo> {
        Box::new(ErrorInfo {
            kind: CString::new(kind).unwrap_or_default(),
            // Interior NULs would truncate the diagnostic; strip them.
            message: CString::new(message.replace('\0', " ")).unwrap_or_default(),
        })
    }

    pub(crate) fn from_core(error: &CoreError) -> Box<ErrorInfo> {
        ErrorInfo::new(error.kind(), &error.to_string())
    }
}

/// Run an exported operation body, converting any failure into an owned
/// descriptor. This is the terminal handler: nothing escapes it.
pub(crate) fn ffi_catch<F>(body: F) -> *mut ErrorInfo
where
    F: FnOnce() -> Result<()>,
{
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => std::ptr::null_mut(),
        Ok(Err(error)) => Box::into_raw(ErrorInfo::from_core(&error)),
        Err(payload) => {
            // A panic is the closest analog of a non-standard foreign
            // exception; recover the payload text when there is one.
            let message = payload
                .downcast_ref::<&'static str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "uncaught exception".to_string());
            Box::into_raw(ErrorInfo::new("unknown", &message))
        }
    }
}

/// Frees an error descriptor. Passing null is a no-op; freeing twice is
/// undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn ErrorInfo_Free(error: *mut ErrorInfo) {
    if !error.is_null() {
        drop(Box::from_raw(error));
    }
}

/// The failure category. The pointer borrows the descriptor.
#[no_mangle]
pub unsafe extern "C" fn ErrorInfo_Kind(error: *const ErrorInfo) -> *const c_char {
    if error.is_null() {
        return std::ptr::null();
    }
    (*error).kind.as_ptr()
}

/// The human-readable diagnostic. The pointer borrows the descriptor.
#[no_mangle]
pub unsafe extern "C" fn ErrorInfo_Message(error: *const ErrorInfo) -> *const c_char {
    if error.is_null() {
        return std::ptr::null();
    }
    (*error).message.as_ptr()
}
