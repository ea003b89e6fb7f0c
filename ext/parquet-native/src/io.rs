//! Stream registration: files, in-memory buffers and managed (host
//! callback) streams
//!
//! Managed streams are where the host hands the engine behavior instead
//! of data: an opaque object reference, one function pointer per
//! operation and a release pointer. Callbacks must be thread-safe — the
//! engine invokes them from whatever thread it is on — and report
//! failure only through their exception slot.

use std::os::raw::{c_char, c_void};
use std::sync::Arc;

use parquet_host_adapter::input::{RafReadFn, RafSeekFn, RafSizeFn, RafTellFn};
use parquet_host_adapter::logger;
use parquet_host_adapter::output::{StreamCloseFn, StreamClosedFn, StreamFlushFn, StreamWriteFn};
use parquet_host_adapter::{HostOutputStream, HostRandomAccessFile, ReleaseHandleFn};
use parquet_native_core::sink::{OutputDest, SharedBuffer};
use parquet_native_core::source::InputSource;
use parquet_native_core::CoreError;

use crate::buffer::BufferHandle;
use crate::error::{ffi_catch, ErrorInfo};
use crate::handles;
use crate::strings;

/// An output sink waiting to be attached to a file writer
pub struct OutputStreamHandle {
    pub(crate) dest: Option<OutputDest>,
    buffer: Option<SharedBuffer>,
}

impl OutputStreamHandle {
    fn new(dest: OutputDest) -> Self {
        Self {
            dest: Some(dest),
            buffer: None,
        }
    }
}

/// A reusable input source; opening a reader clones it
pub struct InputStreamHandle {
    pub(crate) source: InputSource,
}

/// Creates an output stream writing to a file (truncating it).
///
/// # Safety
///
/// `path` must be a NUL-terminated string; `stream` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn OutputStream_FromPath(
    path: *const c_char,
    stream: *mut *mut OutputStreamHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let path = strings::str_from(path, "path")?;
        let dest = OutputDest::from_path(path)?;
        handles::emit(stream, OutputStreamHandle::new(dest))
    })
}

/// Creates an output stream accumulating into a native buffer; read it
/// back with `BufferOutputStream_Finish` after the writer is closed.
///
/// # Safety
///
/// `stream` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn BufferOutputStream_Create(
    stream: *mut *mut OutputStreamHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let shared = SharedBuffer::new();
        let handle = OutputStreamHandle {
            dest: Some(OutputDest::from_buffer(shared.clone())),
            buffer: Some(shared),
        };
        handles::emit(stream, handle)
    })
}

/// Snapshots the bytes accumulated by a buffer output stream.
///
/// # Safety
///
/// `stream` must be a live handle created by `BufferOutputStream_Create`.
#[no_mangle]
pub unsafe extern "C" fn BufferOutputStream_Finish(
    stream: *const OutputStreamHandle,
    buffer: *mut *mut BufferHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(stream, "output stream")?;
        let shared = handle.buffer.as_ref().ok_or_else(|| {
            CoreError::invalid_argument("output stream is not buffer-backed")
        })?;
        handles::emit(buffer, BufferHandle::new(shared.snapshot()))
    })
}

/// Registers a managed output stream backed by host callbacks.
///
/// If the stream is destroyed without an explicit close, close is invoked
/// exactly once during destruction and a failure there is logged and
/// swallowed.
///
/// # Safety
///
/// `handle` must be a valid host object reference (null is rejected);
/// the function pointers must be callable from any thread and stay valid
/// until `release` is invoked.
#[no_mangle]
pub unsafe extern "C" fn ManagedOutputStream_Create(
    handle: *mut c_void,
    release: ReleaseHandleFn,
    write: StreamWriteFn,
    flush: StreamFlushFn,
    close: StreamCloseFn,
    closed: StreamClosedFn,
    stream: *mut *mut OutputStreamHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        if handle.is_null() {
            return Err(CoreError::invalid_argument(
                "managed output stream requires a host object reference",
            ));
        }
        let bridge = HostOutputStream::new(handle, release, write, flush, close, closed);
        handles::emit(
            stream,
            OutputStreamHandle::new(OutputDest::from_stream(Box::new(bridge))),
        )
    })
}

/// # Safety
///
/// `stream` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn OutputStream_Free(stream: *mut OutputStreamHandle) {
    handles::free(stream);
}

/// Opens a file as an input source.
///
/// # Safety
///
/// `path` must be a NUL-terminated string; `stream` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn InputFile_FromPath(
    path: *const c_char,
    stream: *mut *mut InputStreamHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let path = strings::str_from(path, "path")?;
        let source = InputSource::from_path(path)?;
        handles::emit(stream, InputStreamHandle { source })
    })
}

/// Wraps a native buffer as an input source (the bytes are copied).
///
/// # Safety
///
/// `buffer` must be a live buffer handle.
#[no_mangle]
pub unsafe extern "C" fn BufferReader_Create(
    buffer: *const BufferHandle,
    stream: *mut *mut InputStreamHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(buffer, "buffer")?;
        let source = InputSource::from_bytes(bytes::Bytes::from(handle.data().to_vec()));
        handles::emit(stream, InputStreamHandle { source })
    })
}

/// Registers a managed random access input backed by host callbacks.
/// The stream size is queried once, during this call.
///
/// # Safety
///
/// Same contract as `ManagedOutputStream_Create`.
#[no_mangle]
pub unsafe extern "C" fn ManagedRandomAccessFile_Create(
    handle: *mut c_void,
    release: ReleaseHandleFn,
    read: RafReadFn,
    seek: RafSeekFn,
    tell: RafTellFn,
    get_size: RafSizeFn,
    close: StreamCloseFn,
    closed: StreamClosedFn,
    stream: *mut *mut InputStreamHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        if handle.is_null() {
            return Err(CoreError::invalid_argument(
                "managed random access file requires a host object reference",
            ));
        }
        let bridge =
            HostRandomAccessFile::new(handle, release, read, seek, tell, get_size, close, closed);
        let source = InputSource::from_stream(Arc::new(bridge))?;
        handles::emit(stream, InputStreamHandle { source })
    })
}

/// # Safety
///
/// `stream` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn InputStream_Free(stream: *mut InputStreamHandle) {
    handles::free(stream);
}

/// Registers a host logging callback for shim diagnostics; a null
/// `handle` restores the default stderr sink.
///
/// # Safety
///
/// When `handle` is non-null it must follow the bridge contract.
#[no_mangle]
pub unsafe extern "C" fn Logger_Register(
    handle: *mut c_void,
    release: ReleaseHandleFn,
    log: logger::LogFn,
    level: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        if handle.is_null() {
            logger::clear();
        } else {
            logger::install(handle, release, log, level);
        }
        Ok(())
    })
}
