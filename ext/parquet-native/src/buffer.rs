//! Owned byte buffers crossing the boundary
//!
//! A `Buffer` owns its bytes on the native heap; the host reads them
//! through `Buffer_Data`/`Buffer_Size` and releases them with
//! `Buffer_Free`. Batch readers also use buffers as arenas for
//! variable-length values.

use std::os::raw::c_char;

use crate::error::{ffi_catch, ErrorInfo};
use crate::handles;
use crate::strings;

/// An owned, immutable byte buffer
pub struct BufferHandle {
    data: Vec<u8>,
}

impl BufferHandle {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Copies `len` bytes from host memory into a new buffer.
///
/// # Safety
///
/// `data` must point to `len` readable bytes; `buffer` must be a valid
/// out-pointer.
#[no_mangle]
pub unsafe extern "C" fn Buffer_Create(
    data: *const u8,
    len: u64,
    buffer: *mut *mut BufferHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let bytes = strings::slice_from(data, len, "buffer data")?;
        handles::emit(buffer, BufferHandle::new(bytes.to_vec()))
    })
}

/// Pointer to the buffer contents; borrows the buffer.
///
/// # Safety
///
/// `buffer` must be a live buffer handle.
#[no_mangle]
pub unsafe extern "C" fn Buffer_Data(
    buffer: *const BufferHandle,
    data: *mut *const u8,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(buffer, "buffer")?;
        handles::write(data, handle.data.as_ptr())
    })
}

/// Buffer length in bytes.
///
/// # Safety
///
/// `buffer` must be a live buffer handle.
#[no_mangle]
pub unsafe extern "C" fn Buffer_Size(
    buffer: *const BufferHandle,
    size: *mut u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(buffer, "buffer")?;
        handles::write(size, handle.data.len() as u64)
    })
}

/// # Safety
///
/// `buffer` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn Buffer_Free(buffer: *mut BufferHandle) {
    handles::free(buffer);
}

/// A span into an arena buffer, used by byte-array batch reads
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiByteSpan {
    pub data: *const u8,
    pub len: i32,
}

impl FfiByteSpan {
    pub const fn empty() -> Self {
        Self {
            data: std::ptr::null(),
            len: 0,
        }
    }
}

/// INT96 transport: three little-endian 32-bit words
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct FfiInt96 {
    pub elements: [u32; 3],
}

// Keeps the span/element layout in lockstep with the documented ABI.
const _: () = {
    assert!(std::mem::size_of::<FfiInt96>() == 12);
    assert!(std::mem::size_of::<*const u8>() + 8 >= std::mem::size_of::<FfiByteSpan>());
    assert!(std::mem::size_of::<c_char>() == 1);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_create_read_free() {
        let payload = [1u8, 2, 3, 4, 5];
        let mut buffer: *mut BufferHandle = std::ptr::null_mut();
        let err = unsafe { Buffer_Create(payload.as_ptr(), payload.len() as u64, &mut buffer) };
        assert!(err.is_null());

        let mut data: *const u8 = std::ptr::null();
        let mut size = 0u64;
        assert!(unsafe { Buffer_Data(buffer, &mut data) }.is_null());
        assert!(unsafe { Buffer_Size(buffer, &mut size) }.is_null());
        assert_eq!(size, 5);
        assert_eq!(unsafe { std::slice::from_raw_parts(data, 5) }, &payload);

        unsafe { Buffer_Free(buffer) };
    }

    #[test]
    fn test_null_data_with_nonzero_len_fails() {
        let mut buffer: *mut BufferHandle = std::ptr::null_mut();
        let err = unsafe { Buffer_Create(std::ptr::null(), 3, &mut buffer) };
        assert!(!err.is_null());
        unsafe { crate::error::ErrorInfo_Free(err) };
    }
}
