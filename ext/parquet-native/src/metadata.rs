//! File, row group, column chunk and statistics metadata accessors

use std::os::raw::c_char;
use std::sync::Arc;

use parquet::basic::Type as PhysicalType;
use parquet::file::metadata::{KeyValue, ParquetMetaData, RowGroupMetaData};
use parquet::file::statistics::Statistics;
use parquet_native_core::error::check_index;
use parquet_native_core::{CoreError, Result};

use crate::buffer::BufferHandle;
use crate::enums;
use crate::error::{ffi_catch, ErrorInfo};
use crate::handles;
use crate::properties::FfiSortingColumn;
use crate::schema::SchemaDescriptorHandle;
use crate::strings;

pub struct FileMetaDataHandle(pub(crate) Arc<ParquetMetaData>);
pub struct RowGroupMetaDataHandle(pub(crate) RowGroupMetaData);
pub struct ColumnChunkMetaDataHandle(pub(crate) parquet::file::metadata::ColumnChunkMetaData);
pub struct StatisticsHandle(pub(crate) Statistics);

/// Application key/value metadata attached to a file footer
pub struct KeyValueMetadataHandle(Vec<KeyValue>);

impl KeyValueMetadataHandle {
    pub(crate) fn entries(&self) -> &[KeyValue] {
        &self.0
    }
}

// ---------------------------------------------------------------------
// Key/value metadata
// ---------------------------------------------------------------------

/// Builds key/value metadata from parallel string arrays; a null entry
/// in `values` stores an absent value.
///
/// # Safety
///
/// `keys` must point to `size` NUL-terminated strings and `values` to
/// `size` NUL-terminated-or-null entries.
#[no_mangle]
pub unsafe extern "C" fn KeyValueMetadata_Make(
    size: i64,
    keys: *const *const c_char,
    values: *const *const c_char,
    key_value_metadata: *mut *mut KeyValueMetadataHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        if size < 0 {
            return Err(CoreError::length("metadata entry count is negative"));
        }
        let mut entries = Vec::with_capacity(size as usize);
        if size > 0 {
            if keys.is_null() || values.is_null() {
                return Err(CoreError::invalid_argument("keys or values is null"));
            }
            let keys = std::slice::from_raw_parts(keys, size as usize);
            let values = std::slice::from_raw_parts(values, size as usize);
            for (&key, &value) in keys.iter().zip(values) {
                let key = strings::str_from(key, "metadata key")?.to_string();
                let value = if value.is_null() {
                    None
                } else {
                    Some(strings::str_from(value, "metadata value")?.to_string())
                };
                entries.push(KeyValue { key, value });
            }
        }
        handles::emit(key_value_metadata, KeyValueMetadataHandle(entries))
    })
}

/// # Safety
///
/// `key_value_metadata` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn KeyValueMetadata_Size(
    key_value_metadata: *const KeyValueMetadataHandle,
    size: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(key_value_metadata, "key value metadata")?;
        handles::write(size, handle.0.len() as i64)
    })
}

/// Entries as parallel owned string arrays plus a count; absent values
/// come back as null pointers. Free with `KeyValueMetadata_FreeEntries`.
/// Allocation is all-or-nothing.
///
/// # Safety
///
/// `key_value_metadata` must be a live handle; the out-pointers valid.
#[no_mangle]
pub unsafe extern "C" fn KeyValueMetadata_Entries(
    key_value_metadata: *const KeyValueMetadataHandle,
    keys: *mut *mut *mut c_char,
    values: *mut *mut *mut c_char,
    count: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(key_value_metadata, "key value metadata")?;
        emit_entries(&handle.0, keys, values, count)
    })
}

/// # Safety
///
/// The arrays must come from `KeyValueMetadata_Entries` or
/// `FileMetaData_KeyValueMetadata_Entries`.
#[no_mangle]
pub unsafe extern "C" fn KeyValueMetadata_FreeEntries(
    keys: *mut *mut c_char,
    values: *mut *mut c_char,
    count: i64,
) {
    if count >= 0 {
        strings::free_string_array(keys, count as usize);
        strings::free_string_array(values, count as usize);
    }
}

/// # Safety
///
/// `key_value_metadata` must come from this library and not have been
/// freed.
#[no_mangle]
pub unsafe extern "C" fn KeyValueMetadata_Free(key_value_metadata: *mut KeyValueMetadataHandle) {
    handles::free(key_value_metadata);
}

unsafe fn emit_entries(
    entries: &[KeyValue],
    keys: *mut *mut *mut c_char,
    values: *mut *mut *mut c_char,
    count: *mut i64,
) -> Result<()> {
    if keys.is_null() || values.is_null() || count.is_null() {
        return Err(CoreError::invalid_argument("output pointer is null"));
    }
    let key_items: Vec<Option<&str>> = entries.iter().map(|e| Some(e.key.as_str())).collect();
    let value_items: Vec<Option<&str>> = entries.iter().map(|e| e.value.as_deref()).collect();

    let key_array = strings::alloc_string_array(&key_items)?;
    let value_array = match strings::alloc_string_array(&value_items) {
        Ok(array) => array,
        Err(e) => {
            // Roll the first allocation back so a partial failure leaks
            // nothing.
            strings::free_string_array(key_array, key_items.len());
            return Err(e);
        }
    };
    handles::write(keys, key_array)?;
    handles::write(values, value_array)?;
    handles::write(count, entries.len() as i64)
}

// ---------------------------------------------------------------------
// File metadata
// ---------------------------------------------------------------------

/// # Safety
///
/// `metadata` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileMetaData_NumRows(
    metadata: *const FileMetaDataHandle,
    num_rows: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(metadata, "file metadata")?;
        handles::write(num_rows, handle.0.file_metadata().num_rows())
    })
}

/// # Safety
///
/// `metadata` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileMetaData_NumRowGroups(
    metadata: *const FileMetaDataHandle,
    num_row_groups: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(metadata, "file metadata")?;
        handles::write(num_row_groups, handle.0.num_row_groups() as i32)
    })
}

/// # Safety
///
/// `metadata` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileMetaData_NumColumns(
    metadata: *const FileMetaDataHandle,
    num_columns: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(metadata, "file metadata")?;
        handles::write(
            num_columns,
            handle.0.file_metadata().schema_descr().num_columns() as i32,
        )
    })
}

/// Format version stored in the footer.
///
/// # Safety
///
/// `metadata` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileMetaData_Version(
    metadata: *const FileMetaDataHandle,
    version: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(metadata, "file metadata")?;
        handles::write(version, handle.0.file_metadata().version())
    })
}

/// Writer identification, or a null string when absent; free with
/// `ParquetString_Free`.
///
/// # Safety
///
/// `metadata` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileMetaData_CreatedBy(
    metadata: *const FileMetaDataHandle,
    created_by: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(metadata, "file metadata")?;
        match handle.0.file_metadata().created_by() {
            Some(s) => handles::write(created_by, strings::alloc_cstring(s)?),
            None => handles::write(created_by, std::ptr::null_mut()),
        }
    })
}

/// Schema descriptor of the file; the handle shares ownership.
///
/// # Safety
///
/// `metadata` must be a live handle; `schema` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileMetaData_Schema(
    metadata: *const FileMetaDataHandle,
    schema: *mut *mut SchemaDescriptorHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(metadata, "file metadata")?;
        handles::emit(
            schema,
            SchemaDescriptorHandle(handle.0.file_metadata().schema_descr_ptr()),
        )
    })
}

/// Footer key/value metadata entries; count is zero when there are none.
/// Free with `KeyValueMetadata_FreeEntries`.
///
/// # Safety
///
/// `metadata` must be a live handle; the out-pointers valid.
#[no_mangle]
pub unsafe extern "C" fn FileMetaData_KeyValueMetadata_Entries(
    metadata: *const FileMetaDataHandle,
    keys: *mut *mut *mut c_char,
    values: *mut *mut *mut c_char,
    count: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(metadata, "file metadata")?;
        let entries = handle
            .0
            .file_metadata()
            .key_value_metadata()
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        emit_entries(entries, keys, values, count)
    })
}

/// Row group metadata at `index`; the handle owns an independent copy.
///
/// # Safety
///
/// `metadata` must be a live handle; `row_group` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileMetaData_RowGroup(
    metadata: *const FileMetaDataHandle,
    index: i32,
    row_group: *mut *mut RowGroupMetaDataHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(metadata, "file metadata")?;
        let index = check_index(index as i64, handle.0.num_row_groups())?;
        handles::emit(
            row_group,
            RowGroupMetaDataHandle(handle.0.row_group(index).clone()),
        )
    })
}

/// # Safety
///
/// `metadata` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn FileMetaData_Free(metadata: *mut FileMetaDataHandle) {
    handles::free(metadata);
}

// ---------------------------------------------------------------------
// Row group metadata
// ---------------------------------------------------------------------

/// # Safety
///
/// `row_group` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn RowGroupMetaData_NumRows(
    row_group: *const RowGroupMetaDataHandle,
    num_rows: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(row_group, "row group metadata")?;
        handles::write(num_rows, handle.0.num_rows())
    })
}

/// # Safety
///
/// `row_group` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn RowGroupMetaData_NumColumns(
    row_group: *const RowGroupMetaDataHandle,
    num_columns: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(row_group, "row group metadata")?;
        handles::write(num_columns, handle.0.num_columns() as i32)
    })
}

/// # Safety
///
/// `row_group` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn RowGroupMetaData_TotalByteSize(
    row_group: *const RowGroupMetaDataHandle,
    total_byte_size: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(row_group, "row group metadata")?;
        handles::write(total_byte_size, handle.0.total_byte_size())
    })
}

/// # Safety
///
/// `row_group` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn RowGroupMetaData_CompressedSize(
    row_group: *const RowGroupMetaDataHandle,
    compressed_size: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(row_group, "row group metadata")?;
        handles::write(compressed_size, handle.0.compressed_size())
    })
}

/// Declared sort order, as an owned array plus count (zero when none).
/// Free with `RowGroupMetaData_SortingColumns_Free`.
///
/// # Safety
///
/// `row_group` must be a live handle; the out-pointers valid.
#[no_mangle]
pub unsafe extern "C" fn RowGroupMetaData_SortingColumns(
    row_group: *const RowGroupMetaDataHandle,
    columns: *mut *mut FfiSortingColumn,
    count: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(row_group, "row group metadata")?;
        let sorting: Vec<FfiSortingColumn> = handle
            .0
            .sorting_columns()
            .map(|v| {
                v.iter()
                    .map(|s| FfiSortingColumn {
                        column_idx: s.column_idx,
                        descending: s.descending,
                        nulls_first: s.nulls_first,
                    })
                    .collect()
            })
            .unwrap_or_default();
        handles::write(count, sorting.len() as i64)?;
        handles::write(
            columns,
            Box::into_raw(sorting.into_boxed_slice()) as *mut FfiSortingColumn,
        )
    })
}

/// # Safety
///
/// The array must come from `RowGroupMetaData_SortingColumns`.
#[no_mangle]
pub unsafe extern "C" fn RowGroupMetaData_SortingColumns_Free(
    columns: *mut FfiSortingColumn,
    count: i64,
) {
    if !columns.is_null() && count >= 0 {
        let slice: *mut [FfiSortingColumn] =
            std::slice::from_raw_parts_mut(columns, count as usize);
        drop(Box::from_raw(slice));
    }
}

/// Ordinal position of this row group in the file; `has_ordinal` is
/// false when the writer did not record one.
///
/// # Safety
///
/// `row_group` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn RowGroupMetaData_Ordinal(
    row_group: *const RowGroupMetaDataHandle,
    has_ordinal: *mut bool,
    ordinal: *mut i16,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(row_group, "row group metadata")?;
        let value = handle.0.ordinal();
        handles::write(has_ordinal, value.is_some())?;
        handles::write(ordinal, value.unwrap_or(0))
    })
}

/// Column chunk metadata at `index`; the handle owns an independent
/// copy.
///
/// # Safety
///
/// `row_group` must be a live handle; `column` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn RowGroupMetaData_Column(
    row_group: *const RowGroupMetaDataHandle,
    index: i32,
    column: *mut *mut ColumnChunkMetaDataHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(row_group, "row group metadata")?;
        let index = check_index(index as i64, handle.0.num_columns())?;
        handles::emit(
            column,
            ColumnChunkMetaDataHandle(handle.0.column(index).clone()),
        )
    })
}

/// # Safety
///
/// `row_group` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn RowGroupMetaData_Free(row_group: *mut RowGroupMetaDataHandle) {
    handles::free(row_group);
}

// ---------------------------------------------------------------------
// Column chunk metadata
// ---------------------------------------------------------------------

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_PhysicalType(
    column: *const ColumnChunkMetaDataHandle,
    physical_type: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        handles::write(
            physical_type,
            enums::physical_type_from_engine(handle.0.column_type()) as i32,
        )
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_NumValues(
    column: *const ColumnChunkMetaDataHandle,
    num_values: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        handles::write(num_values, handle.0.num_values())
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_Compression(
    column: *const ColumnChunkMetaDataHandle,
    codec: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        handles::write(
            codec,
            enums::compression_from_engine(handle.0.compression()) as i32,
        )
    })
}

/// Page encodings as an owned id array plus count; free with
/// `ColumnChunkMetaData_Encodings_Free`.
///
/// # Safety
///
/// `column` must be a live handle; the out-pointers valid.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_Encodings(
    column: *const ColumnChunkMetaDataHandle,
    encodings: *mut *mut i32,
    count: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        let ids: Vec<i32> = handle
            .0
            .encodings()
            .iter()
            .map(|e| enums::encoding_from_engine(*e) as i32)
            .collect();
        handles::write(count, ids.len() as i64)?;
        handles::write(encodings, Box::into_raw(ids.into_boxed_slice()) as *mut i32)
    })
}

/// # Safety
///
/// The array must come from `ColumnChunkMetaData_Encodings`.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_Encodings_Free(encodings: *mut i32, count: i64) {
    if !encodings.is_null() && count >= 0 {
        let slice: *mut [i32] = std::slice::from_raw_parts_mut(encodings, count as usize);
        drop(Box::from_raw(slice));
    }
}

/// Dot-joined column path; free with `ParquetString_Free`.
///
/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_PathDotString(
    column: *const ColumnChunkMetaDataHandle,
    dot_string: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        handles::write(
            dot_string,
            strings::alloc_cstring(&handle.0.column_path().string())?,
        )
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_DataPageOffset(
    column: *const ColumnChunkMetaDataHandle,
    offset: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        handles::write(offset, handle.0.data_page_offset())
    })
}

/// Dictionary page offset; `has_dictionary_page` is false when the chunk
/// has none and `offset` is then zero.
///
/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_DictionaryPageOffset(
    column: *const ColumnChunkMetaDataHandle,
    has_dictionary_page: *mut bool,
    offset: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        let dictionary = handle.0.dictionary_page_offset();
        handles::write(has_dictionary_page, dictionary.is_some())?;
        handles::write(offset, dictionary.unwrap_or(0))
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_CompressedSize(
    column: *const ColumnChunkMetaDataHandle,
    compressed_size: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        handles::write(compressed_size, handle.0.compressed_size())
    })
}

/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_UncompressedSize(
    column: *const ColumnChunkMetaDataHandle,
    uncompressed_size: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        handles::write(uncompressed_size, handle.0.uncompressed_size())
    })
}

/// Whether the chunk carries column crypto metadata.
///
/// # Safety
///
/// `column` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_IsEncrypted(
    column: *const ColumnChunkMetaDataHandle,
    is_encrypted: *mut bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        handles::write(is_encrypted, handle.0.crypto_metadata().is_some())
    })
}

/// Chunk statistics, or a null handle when the writer recorded none.
///
/// # Safety
///
/// `column` must be a live handle; `statistics` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_Statistics(
    column: *const ColumnChunkMetaDataHandle,
    statistics: *mut *mut StatisticsHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(column, "column chunk metadata")?;
        match handle.0.statistics() {
            Some(stats) => handles::emit(statistics, StatisticsHandle(stats.clone())),
            None => handles::write(statistics, std::ptr::null_mut()),
        }
    })
}

/// # Safety
///
/// `column` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn ColumnChunkMetaData_Free(column: *mut ColumnChunkMetaDataHandle) {
    handles::free(column);
}

// ---------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------

fn statistics_physical_type(statistics: &Statistics) -> PhysicalType {
    match statistics {
        Statistics::Boolean(_) => PhysicalType::BOOLEAN,
        Statistics::Int32(_) => PhysicalType::INT32,
        Statistics::Int64(_) => PhysicalType::INT64,
        Statistics::Int96(_) => PhysicalType::INT96,
        Statistics::Float(_) => PhysicalType::FLOAT,
        Statistics::Double(_) => PhysicalType::DOUBLE,
        Statistics::ByteArray(_) => PhysicalType::BYTE_ARRAY,
        Statistics::FixedLenByteArray(_) => PhysicalType::FIXED_LEN_BYTE_ARRAY,
    }
}

/// # Safety
///
/// `statistics` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Statistics_PhysicalType(
    statistics: *const StatisticsHandle,
    physical_type: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(statistics, "statistics")?;
        handles::write(
            physical_type,
            enums::physical_type_from_engine(statistics_physical_type(&handle.0)) as i32,
        )
    })
}

/// Null count; `has_null_count` is false when the writer omitted it.
///
/// # Safety
///
/// `statistics` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Statistics_NullCount(
    statistics: *const StatisticsHandle,
    has_null_count: *mut bool,
    null_count: *mut u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(statistics, "statistics")?;
        let count = handle.0.null_count_opt();
        handles::write(has_null_count, count.is_some())?;
        handles::write(null_count, count.unwrap_or(0))
    })
}

/// Distinct count; `has_distinct_count` is false when unknown.
///
/// # Safety
///
/// `statistics` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn Statistics_DistinctCount(
    statistics: *const StatisticsHandle,
    has_distinct_count: *mut bool,
    distinct_count: *mut u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(statistics, "statistics")?;
        let count = handle.0.distinct_count_opt();
        handles::write(has_distinct_count, count.is_some())?;
        handles::write(distinct_count, count.unwrap_or(0))
    })
}

/// Raw min bytes, or a null buffer handle when no min was recorded.
///
/// # Safety
///
/// `statistics` must be a live handle; `min` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn Statistics_MinBytes(
    statistics: *const StatisticsHandle,
    min: *mut *mut BufferHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(statistics, "statistics")?;
        match handle.0.min_bytes_opt() {
            Some(bytes) => handles::emit(min, BufferHandle::new(bytes.to_vec())),
            None => handles::write(min, std::ptr::null_mut()),
        }
    })
}

/// Raw max bytes, or a null buffer handle when no max was recorded.
///
/// # Safety
///
/// `statistics` must be a live handle; `max` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn Statistics_MaxBytes(
    statistics: *const StatisticsHandle,
    max: *mut *mut BufferHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(statistics, "statistics")?;
        match handle.0.max_bytes_opt() {
            Some(bytes) => handles::emit(max, BufferHandle::new(bytes.to_vec())),
            None => handles::write(max, std::ptr::null_mut()),
        }
    })
}

macro_rules! typed_min_max {
    ($min_export:ident, $max_export:ident, $variant:ident, $ffi:ty, $convert:expr) => {
        /// Typed minimum; fails when the statistics are a different
        /// physical type and reports absence through `has_value`.
        ///
        /// # Safety
        ///
        /// `statistics` must be a live handle.
        #[no_mangle]
        pub unsafe extern "C" fn $min_export(
            statistics: *const StatisticsHandle,
            has_value: *mut bool,
            value: *mut $ffi,
        ) -> *mut ErrorInfo {
            ffi_catch(|| {
                let handle = handles::get(statistics, "statistics")?;
                match &handle.0 {
                    Statistics::$variant(stats) => {
                        let min = stats.min_opt();
                        handles::write(has_value, min.is_some())?;
                        if let Some(min) = min {
                            handles::write(value, $convert(min))?;
                        }
                        Ok(())
                    }
                    _ => Err(CoreError::invalid_argument(
                        "statistics have a different physical type",
                    )),
                }
            })
        }

        /// Typed maximum; same contract as the minimum accessor.
        ///
        /// # Safety
        ///
        /// `statistics` must be a live handle.
        #[no_mangle]
        pub unsafe extern "C" fn $max_export(
            statistics: *const StatisticsHandle,
            has_value: *mut bool,
            value: *mut $ffi,
        ) -> *mut ErrorInfo {
            ffi_catch(|| {
                let handle = handles::get(statistics, "statistics")?;
                match &handle.0 {
                    Statistics::$variant(stats) => {
                        let max = stats.max_opt();
                        handles::write(has_value, max.is_some())?;
                        if let Some(max) = max {
                            handles::write(value, $convert(max))?;
                        }
                        Ok(())
                    }
                    _ => Err(CoreError::invalid_argument(
                        "statistics have a different physical type",
                    )),
                }
            })
        }
    };
}

typed_min_max!(Statistics_MinBool, Statistics_MaxBool, Boolean, bool, |v: &bool| *v);
typed_min_max!(Statistics_MinInt32, Statistics_MaxInt32, Int32, i32, |v: &i32| *v);
typed_min_max!(Statistics_MinInt64, Statistics_MaxInt64, Int64, i64, |v: &i64| *v);
typed_min_max!(Statistics_MinFloat, Statistics_MaxFloat, Float, f32, |v: &f32| *v);
typed_min_max!(Statistics_MinDouble, Statistics_MaxDouble, Double, f64, |v: &f64| *v);

/// # Safety
///
/// `statistics` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn Statistics_Free(statistics: *mut StatisticsHandle) {
    handles::free(statistics);
}
