//! The out-of-band exception slot
//!
//! Host callbacks cannot throw; they report failure by writing a message
//! pointer into the slot passed as their last argument. The buffer
//! belongs to the host and is only guaranteed valid until the callback
//! returns, so the bridge copies it before doing anything else.

use std::ffi::CStr;
use std::os::raw::c_char;

use parquet_native_core::CoreError;
use thiserror::Error;

/// Slot type passed to every fallible host callback
pub type ExceptionSlot = *mut *const c_char;

/// Failure reported by a host callback through its exception slot
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl From<HostError> for CoreError {
    fn from(e: HostError) -> Self {
        CoreError::Host(e.0)
    }
}

impl From<HostError> for parquet::errors::ParquetError {
    fn from(e: HostError) -> Self {
        parquet::errors::ParquetError::External(Box::new(e))
    }
}

impl From<HostError> for std::io::Error {
    fn from(e: HostError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, e.0)
    }
}

/// Run a callback with a fresh exception slot.
///
/// Returns the callback's value if the slot stayed null, otherwise copies
/// the host's message out of the slot and returns it as a [`HostError`].
/// The callback's value is discarded on failure; by convention the host
/// leaves out-parameters unspecified once it sets the slot.
pub fn with_exception_slot<R>(f: impl FnOnce(ExceptionSlot) -> R) -> Result<R, HostError> {
    let mut exception: *const c_char = std::ptr::null();
    let value = f(&mut exception);
    if exception.is_null() {
        Ok(value)
    } else {
        let message = unsafe { CStr::from_ptr(exception) }
            .to_string_lossy()
            .into_owned();
        Err(HostError(message))
    }
}
