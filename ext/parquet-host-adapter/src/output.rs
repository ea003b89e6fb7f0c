//! Output stream bridge
//!
//! Implements the core [`StreamOutput`] seam over four host callbacks.
//! The engine drives it through `std::io::Write` while writing a file;
//! `closed` is a pure host-side predicate with no exception path.

use std::os::raw::c_void;

use parquet_native_core::sink::StreamOutput;
use parquet_native_core::Result;

use crate::except::{with_exception_slot, ExceptionSlot};
use crate::handle::{HostHandle, ReleaseHandleFn};
use crate::logger;

pub type StreamWriteFn =
    unsafe extern "C" fn(handle: *mut c_void, data: *const u8, len: u64, exception: ExceptionSlot);
pub type StreamFlushFn = unsafe extern "C" fn(handle: *mut c_void, exception: ExceptionSlot);
pub type StreamCloseFn = unsafe extern "C" fn(handle: *mut c_void, exception: ExceptionSlot);
pub type StreamClosedFn = unsafe extern "C" fn(handle: *mut c_void) -> bool;

/// A host object behaving as the engine's output stream
pub struct HostOutputStream {
    handle: HostHandle,
    write: StreamWriteFn,
    flush: StreamFlushFn,
    close: StreamCloseFn,
    closed: StreamClosedFn,
    close_called: bool,
}

impl HostOutputStream {
    /// # Safety
    ///
    /// All pointers follow the bridge contract: the handle stays valid
    /// until released, the functions are callable from any thread, and a
    /// message written to the exception slot outlives the callback call.
    pub unsafe fn new(
        handle: *mut c_void,
        release: ReleaseHandleFn,
        write: StreamWriteFn,
        flush: StreamFlushFn,
        close: StreamCloseFn,
        closed: StreamClosedFn,
    ) -> Self {
        Self {
            handle: HostHandle::new(handle, release),
            write,
            flush,
            close,
            closed,
            close_called: false,
        }
    }
}

impl StreamOutput for HostOutputStream {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        with_exception_slot(|slot| unsafe {
            (self.write)(self.handle.raw(), data.as_ptr(), data.len() as u64, slot)
        })?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        with_exception_slot(|slot| unsafe { (self.flush)(self.handle.raw(), slot) })?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // Marked before the call: a failed close is still a close.
        self.close_called = true;
        with_exception_slot(|slot| unsafe { (self.close)(self.handle.raw(), slot) })?;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        unsafe { (self.closed)(self.handle.raw()) }
    }
}

impl Drop for HostOutputStream {
    fn drop(&mut self) {
        if !self.close_called {
            if let Err(e) = StreamOutput::close(self) {
                logger::warn(|| format!("ignoring error while closing output stream: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::raw::c_char;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    static SINK: Mutex<Vec<u8>> = Mutex::new(Vec::new());
    static CLOSES: AtomicUsize = AtomicUsize::new(0);
    static RELEASES: AtomicUsize = AtomicUsize::new(0);
    static FAIL_WRITES: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn release(_h: *mut c_void) {
        RELEASES.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "C" fn write(_h: *mut c_void, data: *const u8, len: u64, slot: ExceptionSlot) {
        if FAIL_WRITES.load(Ordering::SeqCst) > 0 {
            FAIL_WRITES.fetch_sub(1, Ordering::SeqCst);
            static MSG: &[u8] = b"write rejected by host\0";
            *slot = MSG.as_ptr() as *const c_char;
            return;
        }
        let slice = std::slice::from_raw_parts(data, len as usize);
        SINK.lock().unwrap().extend_from_slice(slice);
    }

    unsafe extern "C" fn flush(_h: *mut c_void, _slot: ExceptionSlot) {}

    unsafe extern "C" fn close(_h: *mut c_void, _slot: ExceptionSlot) {
        CLOSES.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "C" fn close_failing(_h: *mut c_void, slot: ExceptionSlot) {
        CLOSES.fetch_add(1, Ordering::SeqCst);
        static MSG: &[u8] = b"close failed\0";
        *slot = MSG.as_ptr() as *const c_char;
    }

    unsafe extern "C" fn closed(_h: *mut c_void) -> bool {
        false
    }

    fn make(close_fn: StreamCloseFn) -> HostOutputStream {
        unsafe {
            HostOutputStream::new(0x10 as *mut c_void, release, write, flush, close_fn, closed)
        }
    }

    #[test]
    fn test_write_reaches_host() {
        SINK.lock().unwrap().clear();
        let mut stream = make(close);
        stream.write(b"hello").unwrap();
        stream.write(b" world").unwrap();
        stream.flush().unwrap();
        stream.close().unwrap();
        assert_eq!(SINK.lock().unwrap().as_slice(), b"hello world");
    }

    #[test]
    fn test_host_error_carries_exact_message_and_stream_survives() {
        SINK.lock().unwrap().clear();
        let mut stream = make(close);
        FAIL_WRITES.store(1, Ordering::SeqCst);
        let err = stream.write(b"abc").unwrap_err();
        assert_eq!(err.to_string(), "write rejected by host");
        // The next write succeeds; the failure did not corrupt the bridge.
        stream.write(b"abc").unwrap();
        assert_eq!(SINK.lock().unwrap().as_slice(), b"abc");
        stream.close().unwrap();
    }

    #[test]
    fn test_drop_without_close_closes_once() {
        let before = CLOSES.load(Ordering::SeqCst);
        {
            let _stream = make(close);
        }
        assert_eq!(CLOSES.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_explicit_close_suppresses_drop_close() {
        let before = CLOSES.load(Ordering::SeqCst);
        {
            let mut stream = make(close);
            stream.close().unwrap();
        }
        assert_eq!(CLOSES.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_failing_implicit_close_is_swallowed() {
        let before = CLOSES.load(Ordering::SeqCst);
        let releases = RELEASES.load(Ordering::SeqCst);
        {
            let _stream = make(close_failing);
        }
        assert_eq!(CLOSES.load(Ordering::SeqCst), before + 1);
        assert_eq!(RELEASES.load(Ordering::SeqCst), releases + 1);
    }
}
