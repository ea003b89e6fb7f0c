//! Byte-string marshaling
//!
//! Strings returned to the host are allocated here and freed only through
//! `ParquetString_Free`; string collections travel as parallel arrays of
//! owned pointers plus a count, freed in bulk. Building an array is
//! all-or-nothing: a failure mid-way frees everything allocated so far
//! before the error propagates.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use parquet_native_core::{CoreError, Result};

/// Allocate an owned, NUL-terminated copy of `s` for the host.
pub(crate) fn alloc_cstring(s: &str) -> Result<*mut c_char> {
    CString::new(s)
        .map(CString::into_raw)
        .map_err(|_| CoreError::invalid_argument("string contains an interior NUL byte"))
}

/// Borrow a host-provided NUL-terminated string as UTF-8.
pub(crate) unsafe fn str_from<'a>(ptr: *const c_char, what: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(CoreError::invalid_argument(format!("{what} is null")));
    }
    let bytes = CStr::from_ptr(ptr).to_bytes();
    simdutf8::basic::from_utf8(bytes)
        .map_err(|_| CoreError::InvalidUtf8(format!("{what} is not valid UTF-8")))
}

/// Borrow a host-provided length-prefixed byte slice; null is only legal
/// when the length is zero.
pub(crate) unsafe fn slice_from<'a>(ptr: *const u8, len: u64, what: &str) -> Result<&'a [u8]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(CoreError::invalid_argument(format!("{what} is null")));
    }
    Ok(std::slice::from_raw_parts(ptr, len as usize))
}

/// Allocate a parallel array of owned strings. `None` entries become null
/// pointers. Rolls back fully on failure.
pub(crate) fn alloc_string_array(items: &[Option<&str>]) -> Result<*mut *mut c_char> {
    let mut out: Vec<*mut c_char> = Vec::with_capacity(items.len());
    for item in items {
        let allocated = match item {
            None => std::ptr::null_mut(),
            Some(s) => match alloc_cstring(s) {
                Ok(p) => p,
                Err(e) => {
                    for &p in &out {
                        if !p.is_null() {
                            unsafe { drop(CString::from_raw(p)) };
                        }
                    }
                    return Err(e);
                }
            },
        };
        out.push(allocated);
    }
    Ok(Box::into_raw(out.into_boxed_slice()) as *mut *mut c_char)
}

/// Free an array produced by [`alloc_string_array`].
pub(crate) unsafe fn free_string_array(ptr: *mut *mut c_char, len: usize) {
    if ptr.is_null() {
        return;
    }
    let slice: *mut [*mut c_char] = std::slice::from_raw_parts_mut(ptr, len);
    let boxed = Box::from_raw(slice);
    for &p in boxed.iter() {
        if !p.is_null() {
            drop(CString::from_raw(p));
        }
    }
}

/// Collect a host-provided array of NUL-terminated strings.
pub(crate) unsafe fn str_vec_from(
    ptr: *const *const c_char,
    len: i64,
    what: &str,
) -> Result<Vec<String>> {
    if len < 0 {
        return Err(CoreError::length(format!("{what} count is negative")));
    }
    if len == 0 {
        return Ok(Vec::new());
    }
    if ptr.is_null() {
        return Err(CoreError::invalid_argument(format!("{what} is null")));
    }
    let raw = std::slice::from_raw_parts(ptr, len as usize);
    let mut out = Vec::with_capacity(raw.len());
    for &entry in raw {
        out.push(str_from(entry, what)?.to_string());
    }
    Ok(out)
}

/// Frees a string allocated by this library. Null is a no-op; freeing
/// twice or freeing host memory is undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn ParquetString_Free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_free_roundtrip() {
        let p = alloc_cstring("metadata").unwrap();
        assert_eq!(unsafe { CStr::from_ptr(p) }.to_str().unwrap(), "metadata");
        unsafe { ParquetString_Free(p) };
    }

    #[test]
    fn test_interior_nul_rejected() {
        let err = alloc_cstring("a\0b").unwrap_err();
        assert_eq!(err.kind(), "ArgumentException");
    }

    #[test]
    fn test_string_array_with_null_entries() {
        let items = vec![Some("key"), None, Some("value")];
        let array = alloc_string_array(&items).unwrap();
        unsafe {
            let slice = std::slice::from_raw_parts(array, 3);
            assert_eq!(CStr::from_ptr(slice[0]).to_str().unwrap(), "key");
            assert!(slice[1].is_null());
            assert_eq!(CStr::from_ptr(slice[2]).to_str().unwrap(), "value");
            free_string_array(array, 3);
        }
    }

    #[test]
    fn test_string_array_rolls_back_on_failure() {
        // The second entry cannot be allocated; nothing must leak and the
        // call must fail as a whole.
        let items = vec![Some("fine"), Some("bad\0entry"), Some("unreached")];
        assert!(alloc_string_array(&items).is_err());
    }

    #[test]
    fn test_slice_from_empty_is_ok_with_null() {
        let slice = unsafe { slice_from(std::ptr::null(), 0, "aad") }.unwrap();
        assert!(slice.is_empty());
        assert!(unsafe { slice_from(std::ptr::null(), 4, "aad") }.is_err());
    }
}
