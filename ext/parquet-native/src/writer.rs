//! File writers, row group writers and typed column writers
//!
//! Row group and column writer handles internally borrow their parent.
//! The caller contract, not the runtime, upholds the ordering: keep the
//! file writer alive and un-closed while any of its row group handles
//! exists, keep a row group alive while its column writer exists, and
//! close children before their parent. Violations are undefined
//! behavior, exactly as with any dangling handle.

use std::os::raw::c_char;
use std::sync::Arc;

use parquet::column::writer::ColumnWriter;
use parquet::data_type::{ByteArray, FixedLenByteArray, Int96};
use parquet::file::writer::{SerializedColumnWriter, SerializedRowGroupWriter};
use parquet_native_core::sink::OutputDest;
use parquet_native_core::writer::{close_writer, create_writer, NativeFileWriter};
use parquet_native_core::{CoreError, Result};

use crate::buffer::{FfiByteSpan, FfiInt96};
use crate::error::{ffi_catch, ErrorInfo};
use crate::handles;
use crate::io::OutputStreamHandle;
use crate::properties::WriterPropertiesHandle;
use crate::schema::NodeHandle;
use crate::strings;

pub struct FileWriterHandle {
    writer: Option<NativeFileWriter>,
}

pub struct RowGroupWriterHandle {
    row_group: Option<SerializedRowGroupWriter<'static, OutputDest>>,
}

pub struct ColumnWriterHandle {
    column: Option<SerializedColumnWriter<'static>>,
}

unsafe fn open_writer(
    sink: OutputDest,
    schema: *const NodeHandle,
    properties: *const WriterPropertiesHandle,
    writer: *mut *mut FileWriterHandle,
) -> Result<()> {
    let schema = handles::get(schema, "schema root node")?;
    if !schema.0.is_group() {
        return Err(CoreError::invalid_argument(
            "the schema root must be a group node",
        ));
    }
    let properties = handles::get(properties, "writer properties")?;
    let inner = create_writer(sink, Arc::clone(&schema.0), Arc::clone(&properties.0))?;
    handles::emit(
        writer,
        FileWriterHandle {
            writer: Some(inner),
        },
    )
}

/// Creates a file writer over a path (truncating the file).
///
/// # Safety
///
/// `path` must be NUL-terminated; `schema` and `properties` live
/// handles; `writer` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileWriter_OpenPath(
    path: *const c_char,
    schema: *const NodeHandle,
    properties: *const WriterPropertiesHandle,
    writer: *mut *mut FileWriterHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let path = strings::str_from(path, "path")?;
        open_writer(OutputDest::from_path(path)?, schema, properties, writer)
    })
}

/// Creates a file writer over an output stream handle, consuming the
/// stream: the handle still needs its free, but cannot be attached
/// again.
///
/// # Safety
///
/// All handles must be live; `writer` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileWriter_OpenStream(
    stream: *mut OutputStreamHandle,
    schema: *const NodeHandle,
    properties: *const WriterPropertiesHandle,
    writer: *mut *mut FileWriterHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let stream = handles::get_mut(stream, "output stream")?;
        let dest = stream.dest.take().ok_or_else(|| {
            CoreError::invalid_argument("output stream is already attached to a writer")
        })?;
        open_writer(dest, schema, properties, writer)
    })
}

/// Starts the next row group. Only one row group may be open per file
/// writer at a time (caller contract).
///
/// # Safety
///
/// `writer` must be a live handle that outlives the returned row group;
/// `row_group` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileWriter_AppendRowGroup(
    writer: *mut FileWriterHandle,
    row_group: *mut *mut RowGroupWriterHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(writer, "file writer")?;
        let inner = handle
            .writer
            .as_mut()
            .ok_or_else(|| CoreError::invalid_argument("file writer is already closed"))?;
        let next = inner.next_row_group()?;
        // The handle protocol pairs this with the caller contract above;
        // the borrow of the file writer outlives the cell only if the
        // host misuses the handles.
        let detached = handles::detach_row_group(next);
        handles::emit(
            row_group,
            RowGroupWriterHandle {
                row_group: Some(detached),
            },
        )
    })
}

/// Writes the footer and closes the underlying sink. The handle still
/// needs `FileWriter_Free`.
///
/// # Safety
///
/// `writer` must be a live handle with no open row group.
#[no_mangle]
pub unsafe extern "C" fn FileWriter_Close(writer: *mut FileWriterHandle) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(writer, "file writer")?;
        close_writer(&mut handle.writer)
    })
}

/// Frees the handle. Freeing without a prior `FileWriter_Close` abandons
/// the file without a footer.
///
/// # Safety
///
/// `writer` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn FileWriter_Free(writer: *mut FileWriterHandle) {
    handles::free(writer);
}

/// Starts the next column of the row group, closing nothing: close the
/// previous column writer first (caller contract). Fails when every
/// column has been written.
///
/// # Safety
///
/// `row_group` must be a live handle that outlives the returned column
/// writer; `column` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn RowGroupWriter_NextColumn(
    row_group: *mut RowGroupWriterHandle,
    column: *mut *mut ColumnWriterHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(row_group, "row group writer")?;
        let inner = handle
            .row_group
            .as_mut()
            .ok_or_else(|| CoreError::invalid_argument("row group writer is already closed"))?;
        let next = inner.next_column()?.ok_or_else(|| {
            CoreError::invalid_argument("all columns of the row group have been written")
        })?;
        let detached = handles::detach_column(next);
        handles::emit(
            column,
            ColumnWriterHandle {
                column: Some(detached),
            },
        )
    })
}

/// Closes the row group. The handle still needs `RowGroupWriter_Free`.
///
/// # Safety
///
/// `row_group` must be a live handle with no open column writer.
#[no_mangle]
pub unsafe extern "C" fn RowGroupWriter_Close(
    row_group: *mut RowGroupWriterHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(row_group, "row group writer")?;
        let inner = handle
            .row_group
            .take()
            .ok_or_else(|| CoreError::invalid_argument("row group writer is already closed"))?;
        inner.close()?;
        Ok(())
    })
}

/// # Safety
///
/// `row_group` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn RowGroupWriter_Free(row_group: *mut RowGroupWriterHandle) {
    handles::free(row_group);
}

/// Closes the column writer, flushing its pages into the row group.
///
/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnWriter_Close(column: *mut ColumnWriterHandle) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(column, "column writer")?;
        let inner = handle
            .column
            .take()
            .ok_or_else(|| CoreError::invalid_argument("column writer is already closed"))?;
        inner.close()?;
        Ok(())
    })
}

/// # Safety
///
/// `column` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn ColumnWriter_Free(column: *mut ColumnWriterHandle) {
    handles::free(column);
}

fn check_write_args(num_values: i64, values_null: bool, levels_count: i64) -> Result<usize> {
    if num_values < 0 || levels_count < 0 {
        return Err(CoreError::length("value or level count is negative"));
    }
    if values_null && num_values > 0 {
        return Err(CoreError::invalid_argument("values buffer is null"));
    }
    Ok(num_values as usize)
}

unsafe fn levels<'a>(ptr: *const i16, count: i64) -> Option<&'a [i16]> {
    if ptr.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts(ptr, count as usize))
    }
}

macro_rules! write_batch_export {
    ($export:ident, $variant:ident, $ffi:ty, $convert:expr) => {
        /// Writes a batch of values with optional definition and
        /// repetition levels (null when the column is required/flat).
        ///
        /// # Safety
        ///
        /// `values` must point to `num_values` entries and the non-null
        /// level buffers to `levels_count` entries; `column` must be a
        /// live handle of the matching physical type.
        #[no_mangle]
        pub unsafe extern "C" fn $export(
            column: *mut ColumnWriterHandle,
            values: *const $ffi,
            num_values: i64,
            def_levels: *const i16,
            rep_levels: *const i16,
            levels_count: i64,
            values_written: *mut i64,
        ) -> *mut ErrorInfo {
            ffi_catch(|| {
                let handle = handles::get_mut(column, "column writer")?;
                let inner = handle.column.as_mut().ok_or_else(|| {
                    CoreError::invalid_argument("column writer is already closed")
                })?;
                let num_values = check_write_args(num_values, values.is_null(), levels_count)?;
                let convert = $convert;
                let converted: Vec<_> = std::slice::from_raw_parts(values, num_values)
                    .iter()
                    .map(convert)
                    .collect();
                let written = match inner.untyped() {
                    ColumnWriter::$variant(writer) => writer.write_batch(
                        &converted,
                        levels(def_levels, levels_count),
                        levels(rep_levels, levels_count),
                    )?,
                    _ => {
                        return Err(CoreError::invalid_argument(
                            "column writer has a different physical type",
                        ))
                    }
                };
                handles::write(values_written, written as i64)
            })
        }
    };
}

write_batch_export!(
    TypedColumnWriter_WriteBatchBool,
    BoolColumnWriter,
    bool,
    |v: &bool| *v
);
write_batch_export!(
    TypedColumnWriter_WriteBatchInt32,
    Int32ColumnWriter,
    i32,
    |v: &i32| *v
);
write_batch_export!(
    TypedColumnWriter_WriteBatchInt64,
    Int64ColumnWriter,
    i64,
    |v: &i64| *v
);
write_batch_export!(
    TypedColumnWriter_WriteBatchInt96,
    Int96ColumnWriter,
    FfiInt96,
    |v: &FfiInt96| {
        let mut value = Int96::new();
        value.set_data(v.elements[0], v.elements[1], v.elements[2]);
        value
    }
);
write_batch_export!(
    TypedColumnWriter_WriteBatchFloat,
    FloatColumnWriter,
    f32,
    |v: &f32| *v
);
write_batch_export!(
    TypedColumnWriter_WriteBatchDouble,
    DoubleColumnWriter,
    f64,
    |v: &f64| *v
);
write_batch_export!(
    TypedColumnWriter_WriteBatchByteArray,
    ByteArrayColumnWriter,
    FfiByteSpan,
    |v: &FfiByteSpan| {
        let bytes = if v.data.is_null() || v.len <= 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(v.data, v.len as usize) }.to_vec()
        };
        ByteArray::from(bytes)
    }
);
write_batch_export!(
    TypedColumnWriter_WriteBatchFixedLenByteArray,
    FixedLenByteArrayColumnWriter,
    FfiByteSpan,
    |v: &FfiByteSpan| {
        let bytes = if v.data.is_null() || v.len <= 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(v.data, v.len as usize) }.to_vec()
        };
        FixedLenByteArray::from(ByteArray::from(bytes))
    }
);
