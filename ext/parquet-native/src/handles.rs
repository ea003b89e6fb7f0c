//! Opaque handle plumbing
//!
//! Every engine object the host sees lives in a heap cell created here
//! and destroyed by exactly one matching `*_Free` export. Dereferencing a
//! dangling or double-freed handle is undefined behavior by caller
//! contract; these helpers only guard against null.

use parquet_native_core::{CoreError, Result};

/// Move `value` into a fresh heap cell and hand it out through `out`.
pub(crate) unsafe fn emit<T>(out: *mut *mut T, value: T) -> Result<()> {
    if out.is_null() {
        return Err(CoreError::invalid_argument("output pointer is null"));
    }
    *out = Box::into_raw(Box::new(value));
    Ok(())
}

/// Write a plain value through an out-pointer.
pub(crate) unsafe fn write<T>(out: *mut T, value: T) -> Result<()> {
    if out.is_null() {
        return Err(CoreError::invalid_argument("output pointer is null"));
    }
    *out = value;
    Ok(())
}

/// Borrow a handle immutably for the duration of one exported call.
pub(crate) unsafe fn get<'a, T>(ptr: *const T, what: &str) -> Result<&'a T> {
    ptr.as_ref()
        .ok_or_else(|| CoreError::invalid_argument(format!("{what} handle is null")))
}

/// Borrow a handle mutably for the duration of one exported call.
pub(crate) unsafe fn get_mut<'a, T>(ptr: *mut T, what: &str) -> Result<&'a mut T> {
    ptr.as_mut()
        .ok_or_else(|| CoreError::invalid_argument(format!("{what} handle is null")))
}

/// Destroy one handle cell. Null is a no-op.
pub(crate) unsafe fn free<T>(ptr: *mut T) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

/// Extend a borrowing writer's lifetime so it can live in its own handle
/// cell.
///
/// # Safety
///
/// The value borrows its parent handle. The caller contract (documented
/// on the exports that use this) requires the parent to outlive the
/// child and the child to be closed and freed first; violating it is
/// undefined behavior, exactly as with any dangling handle.
pub(crate) unsafe fn detach_row_group<'a>(
    row_group: parquet::file::writer::SerializedRowGroupWriter<'a, parquet_native_core::sink::OutputDest>,
) -> parquet::file::writer::SerializedRowGroupWriter<'static, parquet_native_core::sink::OutputDest> {
    std::mem::transmute(row_group)
}

/// # Safety
///
/// Same contract as [`detach_row_group`].
pub(crate) unsafe fn detach_column<'a>(
    column: parquet::file::writer::SerializedColumnWriter<'a>,
) -> parquet::file::writer::SerializedColumnWriter<'static> {
    std::mem::transmute(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_free_pair() {
        let mut out: *mut String = std::ptr::null_mut();
        unsafe { emit(&mut out, "owned".to_string()) }.unwrap();
        assert!(!out.is_null());
        assert_eq!(unsafe { &*out }, "owned");
        unsafe { free(out) };
    }

    #[test]
    fn test_null_out_pointer_is_an_error() {
        let err = unsafe { emit(std::ptr::null_mut::<*mut u32>(), 1u32) }.unwrap_err();
        assert_eq!(err.kind(), "ArgumentException");
    }

    #[test]
    fn test_null_handle_is_an_error() {
        let err = unsafe { get(std::ptr::null::<u32>(), "buffer") }.unwrap_err();
        assert!(err.to_string().contains("buffer handle is null"));
    }
}
