//! File readers, row group readers and typed column readers

use std::os::raw::c_char;
use std::sync::Arc;

use parquet::column::reader::{ColumnReader, ColumnReaderImpl};
use parquet::data_type::DataType;
use parquet::file::reader::{FileReader, RowGroupReader};
use parquet_native_core::error::check_index;
use parquet_native_core::reader::{open_reader, NativeFileReader, ReaderConfig};
use parquet_native_core::source::InputSource;
use parquet_native_core::{CoreError, Result};

use crate::buffer::{BufferHandle, FfiByteSpan, FfiInt96};
use crate::enums;
use crate::error::{ffi_catch, ErrorInfo};
use crate::handles;
use crate::io::InputStreamHandle;
use crate::metadata::{FileMetaDataHandle, RowGroupMetaDataHandle};
use crate::properties::ReaderConfigHandle;
use crate::strings;

pub struct FileReaderHandle(Arc<NativeFileReader>);

/// A row group addressed through its parent reader
pub struct RowGroupReaderHandle {
    file: Arc<NativeFileReader>,
    index: usize,
}

/// An open column reader; keeps the file reader alive
pub struct ColumnReaderHandle {
    reader: ColumnReader,
    _file: Arc<NativeFileReader>,
}

unsafe fn open_with_config(
    source: InputSource,
    config: *const ReaderConfigHandle,
    reader: *mut *mut FileReaderHandle,
) -> Result<()> {
    let config = if config.is_null() {
        ReaderConfig::new()
    } else {
        (*config).0.clone()
    };
    let opened = open_reader(source, &config)?;
    handles::emit(reader, FileReaderHandle(Arc::new(opened)))
}

/// Opens a file reader over a path. `config` may be null for defaults.
///
/// # Safety
///
/// `path` must be NUL-terminated; `config` null or live; `reader` a
/// valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileReader_OpenPath(
    path: *const c_char,
    config: *const ReaderConfigHandle,
    reader: *mut *mut FileReaderHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let path = strings::str_from(path, "path")?;
        open_with_config(InputSource::from_path(path)?, config, reader)
    })
}

/// Opens a file reader over an input stream handle (file, buffer or
/// managed stream). The stream handle stays reusable.
///
/// # Safety
///
/// `stream` must be a live handle; `config` null or live; `reader` a
/// valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileReader_OpenStream(
    stream: *const InputStreamHandle,
    config: *const ReaderConfigHandle,
    reader: *mut *mut FileReaderHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let stream = handles::get(stream, "input stream")?;
        open_with_config(stream.source.clone(), config, reader)
    })
}

/// File metadata; the handle owns an independent copy.
///
/// # Safety
///
/// `reader` must be a live handle; `metadata` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileReader_Metadata(
    reader: *const FileReaderHandle,
    metadata: *mut *mut FileMetaDataHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(reader, "file reader")?;
        handles::emit(
            metadata,
            FileMetaDataHandle(Arc::new(handle.0.metadata().clone())),
        )
    })
}

/// # Safety
///
/// `reader` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileReader_NumRowGroups(
    reader: *const FileReaderHandle,
    num_row_groups: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(reader, "file reader")?;
        handles::write(num_row_groups, handle.0.num_row_groups() as i32)
    })
}

/// Row group reader at `index`; shares ownership of the file reader, so
/// freeing the file reader handle first is allowed.
///
/// # Safety
///
/// `reader` must be a live handle; `row_group` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileReader_RowGroup(
    reader: *const FileReaderHandle,
    index: i32,
    row_group: *mut *mut RowGroupReaderHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(reader, "file reader")?;
        let index = check_index(index as i64, handle.0.num_row_groups())?;
        handles::emit(
            row_group,
            RowGroupReaderHandle {
                file: Arc::clone(&handle.0),
                index,
            },
        )
    })
}

/// # Safety
///
/// `reader` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn FileReader_Free(reader: *mut FileReaderHandle) {
    handles::free(reader);
}

/// Metadata of this row group; the handle owns an independent copy.
///
/// # Safety
///
/// `row_group` must be a live handle; `metadata` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn RowGroupReader_Metadata(
    row_group: *const RowGroupReaderHandle,
    metadata: *mut *mut RowGroupMetaDataHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(row_group, "row group reader")?;
        handles::emit(
            metadata,
            RowGroupMetaDataHandle(handle.file.metadata().row_group(handle.index).clone()),
        )
    })
}

/// # Safety
///
/// `row_group` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn RowGroupReader_NumColumns(
    row_group: *const RowGroupReaderHandle,
    num_columns: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(row_group, "row group reader")?;
        let columns = handle.file.metadata().row_group(handle.index).num_columns();
        handles::write(num_columns, columns as i32)
    })
}

/// Opens the column reader at `index`; the returned handle is
/// independent of the row group handle.
///
/// # Safety
///
/// `row_group` must be a live handle; `column` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn RowGroupReader_Column(
    row_group: *const RowGroupReaderHandle,
    index: i32,
    column: *mut *mut ColumnReaderHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(row_group, "row group reader")?;
        let metadata = handle.file.metadata().row_group(handle.index);
        let index = check_index(index as i64, metadata.num_columns())?;
        let group = handle.file.get_row_group(handle.index)?;
        let reader = group.get_column_reader(index)?;
        handles::emit(
            column,
            ColumnReaderHandle {
                reader,
                _file: Arc::clone(&handle.file),
            },
        )
    })
}

/// # Safety
///
/// `row_group` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn RowGroupReader_Free(row_group: *mut RowGroupReaderHandle) {
    handles::free(row_group);
}

/// Physical type this column reader produces.
///
/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnReader_Type(
    column: *const ColumnReaderHandle,
    physical_type: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column reader")?;
        let physical = match &handle.reader {
            ColumnReader::BoolColumnReader(_) => enums::PhysicalTypeId::Boolean,
            ColumnReader::Int32ColumnReader(_) => enums::PhysicalTypeId::Int32,
            ColumnReader::Int64ColumnReader(_) => enums::PhysicalTypeId::Int64,
            ColumnReader::Int96ColumnReader(_) => enums::PhysicalTypeId::Int96,
            ColumnReader::FloatColumnReader(_) => enums::PhysicalTypeId::Float,
            ColumnReader::DoubleColumnReader(_) => enums::PhysicalTypeId::Double,
            ColumnReader::ByteArrayColumnReader(_) => enums::PhysicalTypeId::ByteArray,
            ColumnReader::FixedLenByteArrayColumnReader(_) => {
                enums::PhysicalTypeId::FixedLenByteArray
            }
        };
        handles::write(physical_type, physical as i32)
    })
}

/// # Safety
///
/// `column` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn ColumnReader_Free(column: *mut ColumnReaderHandle) {
    handles::free(column);
}

struct BatchRead<V> {
    def_levels: Vec<i16>,
    rep_levels: Vec<i16>,
    values: Vec<V>,
    records: usize,
    value_count: usize,
    level_count: usize,
}

fn read_batch<T: DataType>(
    reader: &mut ColumnReaderImpl<T>,
    batch_size: usize,
    want_def: bool,
    want_rep: bool,
) -> Result<BatchRead<T::T>> {
    let mut def_levels: Vec<i16> = Vec::with_capacity(if want_def { batch_size } else { 0 });
    let mut rep_levels: Vec<i16> = Vec::with_capacity(if want_rep { batch_size } else { 0 });
    let mut values: Vec<T::T> = Vec::with_capacity(batch_size);

    let (records, value_count, level_count) = reader.read_records(
        batch_size,
        want_def.then_some(&mut def_levels),
        want_rep.then_some(&mut rep_levels),
        &mut values,
    )?;

    Ok(BatchRead {
        def_levels,
        rep_levels,
        values,
        records,
        value_count,
        level_count,
    })
}

unsafe fn copy_levels_out<V>(
    batch: &BatchRead<V>,
    def_levels: *mut i16,
    rep_levels: *mut i16,
    records_read: *mut i64,
    values_read: *mut i64,
    levels_read: *mut i64,
) -> Result<()> {
    if !def_levels.is_null() {
        std::ptr::copy_nonoverlapping(
            batch.def_levels.as_ptr(),
            def_levels,
            batch.def_levels.len(),
        );
    }
    if !rep_levels.is_null() {
        std::ptr::copy_nonoverlapping(
            batch.rep_levels.as_ptr(),
            rep_levels,
            batch.rep_levels.len(),
        );
    }
    handles::write(records_read, batch.records as i64)?;
    handles::write(values_read, batch.value_count as i64)?;
    handles::write(levels_read, batch.level_count as i64)
}

fn check_batch_args(batch_size: i64, values_null: bool) -> Result<usize> {
    if batch_size < 0 {
        return Err(CoreError::length("batch size is negative"));
    }
    if values_null && batch_size > 0 {
        return Err(CoreError::invalid_argument("values buffer is null"));
    }
    Ok(batch_size as usize)
}

macro_rules! read_batch_export {
    ($export:ident, $variant:ident, $ffi:ty, $copy:expr) => {
        /// Reads up to `batch_size` records into caller-provided buffers.
        /// `def_levels`/`rep_levels` may be null when the column is
        /// required/flat.
        ///
        /// # Safety
        ///
        /// `values` (and the non-null level buffers) must hold at least
        /// `batch_size` entries; `column` must be a live handle of the
        /// matching physical type.
        #[no_mangle]
        pub unsafe extern "C" fn $export(
            column: *mut ColumnReaderHandle,
            batch_size: i64,
            def_levels: *mut i16,
            rep_levels: *mut i16,
            values: *mut $ffi,
            records_read: *mut i64,
            values_read: *mut i64,
            levels_read: *mut i64,
        ) -> *mut ErrorInfo {
            ffi_catch(|| {
                let handle = handles::get_mut(column, "column reader")?;
                let batch_size = check_batch_args(batch_size, values.is_null())?;
                let reader = match &mut handle.reader {
                    ColumnReader::$variant(reader) => reader,
                    _ => {
                        return Err(CoreError::invalid_argument(
                            "column reader has a different physical type",
                        ))
                    }
                };
                let batch =
                    read_batch(reader, batch_size, !def_levels.is_null(), !rep_levels.is_null())?;
                let convert = $copy;
                for (i, value) in batch.values.iter().enumerate() {
                    *values.add(i) = convert(value);
                }
                copy_levels_out(
                    &batch,
                    def_levels,
                    rep_levels,
                    records_read,
                    values_read,
                    levels_read,
                )
            })
        }
    };
}

read_batch_export!(
    TypedColumnReader_ReadBatchBool,
    BoolColumnReader,
    bool,
    |v: &bool| *v
);
read_batch_export!(
    TypedColumnReader_ReadBatchInt32,
    Int32ColumnReader,
    i32,
    |v: &i32| *v
);
read_batch_export!(
    TypedColumnReader_ReadBatchInt64,
    Int64ColumnReader,
    i64,
    |v: &i64| *v
);
read_batch_export!(
    TypedColumnReader_ReadBatchInt96,
    Int96ColumnReader,
    FfiInt96,
    |v: &parquet::data_type::Int96| {
        let data = v.data();
        FfiInt96 {
            elements: [data[0], data[1], data[2]],
        }
    }
);
read_batch_export!(
    TypedColumnReader_ReadBatchFloat,
    FloatColumnReader,
    f32,
    |v: &f32| *v
);
read_batch_export!(
    TypedColumnReader_ReadBatchDouble,
    DoubleColumnReader,
    f64,
    |v: &f64| *v
);

unsafe fn emit_byte_array_batch(
    raw: Vec<&[u8]>,
    spans: *mut FfiByteSpan,
    arena_out: *mut *mut BufferHandle,
) -> Result<()> {
    let total: usize = raw.iter().map(|v| v.len()).sum();
    let mut arena = Vec::with_capacity(total);
    let mut offsets = Vec::with_capacity(raw.len());
    for value in &raw {
        offsets.push((arena.len(), value.len()));
        arena.extend_from_slice(value);
    }
    // The arena vector is never touched again, so the spans stay valid
    // until Buffer_Free.
    let buffer = BufferHandle::new(arena);
    let base = buffer.data().as_ptr();
    for (i, (offset, len)) in offsets.iter().enumerate() {
        *spans.add(i) = FfiByteSpan {
            data: base.add(*offset),
            len: *len as i32,
        };
    }
    handles::emit(arena_out, buffer)
}

macro_rules! read_byte_batch_export {
    ($export:ident, $variant:ident, $ffi_value:ty) => {
        /// Reads up to `batch_size` records of variable-length values.
        /// `spans` receives one entry per value, pointing into an arena
        /// buffer emitted through `arena`; the spans stay valid until
        /// the arena is freed with `Buffer_Free`.
        ///
        /// # Safety
        ///
        /// `spans` (and the non-null level buffers) must hold at least
        /// `batch_size` entries; `column` must be a live handle of the
        /// matching physical type.
        #[no_mangle]
        pub unsafe extern "C" fn $export(
            column: *mut ColumnReaderHandle,
            batch_size: i64,
            def_levels: *mut i16,
            rep_levels: *mut i16,
            spans: *mut FfiByteSpan,
            arena: *mut *mut BufferHandle,
            records_read: *mut i64,
            values_read: *mut i64,
            levels_read: *mut i64,
        ) -> *mut ErrorInfo {
            ffi_catch(|| {
                let handle = handles::get_mut(column, "column reader")?;
                let batch_size = check_batch_args(batch_size, spans.is_null())?;
                let reader = match &mut handle.reader {
                    ColumnReader::$variant(reader) => reader,
                    _ => {
                        return Err(CoreError::invalid_argument(
                            "column reader has a different physical type",
                        ))
                    }
                };
                let batch =
                    read_batch(reader, batch_size, !def_levels.is_null(), !rep_levels.is_null())?;
                let raw: Vec<&[u8]> = batch.values.iter().map(|v: &$ffi_value| v.data()).collect();
                emit_byte_array_batch(raw, spans, arena)?;
                copy_levels_out(
                    &batch,
                    def_levels,
                    rep_levels,
                    records_read,
                    values_read,
                    levels_read,
                )
            })
        }
    };
}

read_byte_batch_export!(
    TypedColumnReader_ReadBatchByteArray,
    ByteArrayColumnReader,
    parquet::data_type::ByteArray
);
read_byte_batch_export!(
    TypedColumnReader_ReadBatchFixedLenByteArray,
    FixedLenByteArrayColumnReader,
    parquet::data_type::FixedLenByteArray
);
