//! Random access input bridge
//!
//! Implements the core [`RandomAccessInput`] seam over host callbacks.
//! The host stream is positional (seek + read), so a mutex serializes
//! each seek/read pair; the engine may read from several threads.

use std::os::raw::c_void;
use std::sync::Mutex;

use parquet_native_core::source::{read_padded, RandomAccessInput};
use parquet_native_core::Result;

use crate::except::{with_exception_slot, ExceptionSlot};
use crate::handle::{HostHandle, ReleaseHandleFn};
use crate::logger;
use crate::output::{StreamCloseFn, StreamClosedFn};

pub type RafReadFn = unsafe extern "C" fn(
    handle: *mut c_void,
    nbytes: u64,
    buffer: *mut u8,
    bytes_read: *mut u64,
    exception: ExceptionSlot,
);
pub type RafSeekFn =
    unsafe extern "C" fn(handle: *mut c_void, position: u64, exception: ExceptionSlot);
pub type RafTellFn =
    unsafe extern "C" fn(handle: *mut c_void, position: *mut u64, exception: ExceptionSlot);
pub type RafSizeFn =
    unsafe extern "C" fn(handle: *mut c_void, size: *mut u64, exception: ExceptionSlot);

struct RafInner {
    handle: HostHandle,
    read: RafReadFn,
    seek: RafSeekFn,
    tell: RafTellFn,
    close: StreamCloseFn,
    close_called: bool,
}

/// A host object behaving as the engine's random access file
pub struct HostRandomAccessFile {
    inner: Mutex<RafInner>,
    get_size: RafSizeFn,
    closed: StreamClosedFn,
}

impl HostRandomAccessFile {
    /// # Safety
    ///
    /// All pointers follow the bridge contract: the handle stays valid
    /// until released, the functions are callable from any thread, and a
    /// message written to the exception slot outlives the callback call.
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn new(
        handle: *mut c_void,
        release: ReleaseHandleFn,
        read: RafReadFn,
        seek: RafSeekFn,
        tell: RafTellFn,
        get_size: RafSizeFn,
        close: StreamCloseFn,
        closed: StreamClosedFn,
    ) -> Self {
        Self {
            inner: Mutex::new(RafInner {
                handle: HostHandle::new(handle, release),
                read,
                seek,
                tell,
                close,
                close_called: false,
            }),
            get_size,
            closed,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RafInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The host stream's current position.
    pub fn position(&self) -> Result<u64> {
        let inner = self.lock();
        let mut position = 0u64;
        with_exception_slot(|slot| unsafe {
            (inner.tell)(inner.handle.raw(), &mut position, slot)
        })?;
        Ok(position)
    }

    /// Read `nbytes` at `offset` into an owned buffer.
    ///
    /// The buffer always has length `nbytes`; a short read (end of data)
    /// yields the actual count with the remainder zero-padded.
    pub fn read_owned(&self, offset: u64, nbytes: usize) -> Result<(Vec<u8>, usize)> {
        read_padded(self, offset, nbytes)
    }

    /// Forward the explicit close callback.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.close_called = true;
        with_exception_slot(|slot| unsafe { (inner.close)(inner.handle.raw(), slot) })?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        let inner = self.lock();
        unsafe { (self.closed)(inner.handle.raw()) }
    }
}

impl RandomAccessInput for HostRandomAccessFile {
    fn size(&self) -> Result<u64> {
        let inner = self.lock();
        let mut size = 0u64;
        with_exception_slot(|slot| unsafe { (self.get_size)(inner.handle.raw(), &mut size, slot) })?;
        Ok(size)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let inner = self.lock();
        with_exception_slot(|slot| unsafe { (inner.seek)(inner.handle.raw(), offset, slot) })?;
        let mut bytes_read = 0u64;
        with_exception_slot(|slot| unsafe {
            (inner.read)(
                inner.handle.raw(),
                buf.len() as u64,
                buf.as_mut_ptr(),
                &mut bytes_read,
                slot,
            )
        })?;
        Ok(bytes_read as usize)
    }
}

impl Drop for HostRandomAccessFile {
    fn drop(&mut self) {
        let close_called = self.lock().close_called;
        if !close_called {
            if let Err(e) = self.close() {
                logger::warn(|| format!("ignoring error while closing input stream: {}", e));
            }
        }
    }
}
