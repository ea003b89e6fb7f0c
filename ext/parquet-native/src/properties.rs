//! Writer properties, their builder, and reader configuration

use std::os::raw::c_char;
use std::sync::Arc;

use parquet::file::properties::{WriterProperties, WriterPropertiesBuilder};
use parquet::format::SortingColumn;
use parquet_native_core::{CoreError, ReaderConfig, Result};

use crate::encryption::FileDecryptionPropertiesHandle;
use crate::enums;
use crate::error::{ffi_catch, ErrorInfo};
use crate::handles;
use crate::metadata::KeyValueMetadataHandle;
use crate::schema::ColumnPathHandle;
use crate::strings;

/// Builder cell; the builder is consumed by `Build` and by every setter,
/// so it lives in an `Option` that is taken and put back.
pub struct WriterPropertiesBuilderHandle(Option<WriterPropertiesBuilder>);

pub struct WriterPropertiesHandle(pub(crate) Arc<WriterProperties>);

/// Host-facing sorting column description
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiSortingColumn {
    pub column_idx: i32,
    pub descending: bool,
    pub nulls_first: bool,
}

fn apply(
    handle: &mut WriterPropertiesBuilderHandle,
    f: impl FnOnce(WriterPropertiesBuilder) -> Result<WriterPropertiesBuilder>,
) -> Result<()> {
    let builder = handle
        .0
        .take()
        .ok_or_else(|| CoreError::invalid_argument("writer properties builder already consumed"))?;
    handle.0 = Some(f(builder)?);
    Ok(())
}

/// # Safety
///
/// `builder` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_Create(
    builder: *mut *mut WriterPropertiesBuilderHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        handles::emit(
            builder,
            WriterPropertiesBuilderHandle(Some(WriterProperties::builder())),
        )
    })
}

/// Consumes the builder and emits immutable writer properties.
///
/// # Safety
///
/// `builder` must be a live handle; `properties` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_Build(
    builder: *mut WriterPropertiesBuilderHandle,
    properties: *mut *mut WriterPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let inner = handle.0.take().ok_or_else(|| {
            CoreError::invalid_argument("writer properties builder already consumed")
        })?;
        handles::emit(properties, WriterPropertiesHandle(Arc::new(inner.build())))
    })
}

/// # Safety
///
/// `builder` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_Free(builder: *mut WriterPropertiesBuilderHandle) {
    handles::free(builder);
}

/// Default compression for every column; `level` below zero keeps the
/// codec default.
///
/// # Safety
///
/// `builder` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_Compression(
    builder: *mut WriterPropertiesBuilderHandle,
    codec: i32,
    level: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let compression = enums::compression_to_engine(codec, level)?;
        apply(handle, |b| Ok(b.set_compression(compression)))
    })
}

/// # Safety
///
/// `builder` and `column_path` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_ColumnCompression(
    builder: *mut WriterPropertiesBuilderHandle,
    column_path: *const ColumnPathHandle,
    codec: i32,
    level: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let path = handles::get(column_path, "column path")?.0.clone();
        let compression = enums::compression_to_engine(codec, level)?;
        apply(handle, |b| Ok(b.set_column_compression(path, compression)))
    })
}

/// # Safety
///
/// `builder` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_DictionaryEnabled(
    builder: *mut WriterPropertiesBuilderHandle,
    enabled: bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        apply(handle, |b| Ok(b.set_dictionary_enabled(enabled)))
    })
}

/// # Safety
///
/// `builder` and `column_path` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_ColumnDictionaryEnabled(
    builder: *mut WriterPropertiesBuilderHandle,
    column_path: *const ColumnPathHandle,
    enabled: bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let path = handles::get(column_path, "column path")?.0.clone();
        apply(handle, |b| Ok(b.set_column_dictionary_enabled(path, enabled)))
    })
}

/// Fallback encoding. Dictionary encodings cannot be selected here; use
/// `DictionaryEnabled` instead.
///
/// # Safety
///
/// `builder` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_Encoding(
    builder: *mut WriterPropertiesBuilderHandle,
    encoding: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let encoding = checked_encoding(encoding)?;
        apply(handle, |b| Ok(b.set_encoding(encoding)))
    })
}

/// # Safety
///
/// `builder` and `column_path` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_ColumnEncoding(
    builder: *mut WriterPropertiesBuilderHandle,
    column_path: *const ColumnPathHandle,
    encoding: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let path = handles::get(column_path, "column path")?.0.clone();
        let encoding = checked_encoding(encoding)?;
        apply(handle, |b| Ok(b.set_column_encoding(path, encoding)))
    })
}

fn checked_encoding(encoding: i32) -> Result<parquet::basic::Encoding> {
    let encoding = enums::encoding_to_engine(encoding)?;
    if matches!(
        encoding,
        parquet::basic::Encoding::PLAIN_DICTIONARY | parquet::basic::Encoding::RLE_DICTIONARY
    ) {
        return Err(CoreError::invalid_argument(
            "dictionary encodings are controlled through DictionaryEnabled",
        ));
    }
    Ok(encoding)
}

/// # Safety
///
/// `builder` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_StatisticsEnabled(
    builder: *mut WriterPropertiesBuilderHandle,
    level: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let level = enums::statistics_level_to_engine(level)?;
        apply(handle, |b| Ok(b.set_statistics_enabled(level)))
    })
}

/// # Safety
///
/// `builder` and `column_path` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_ColumnStatisticsEnabled(
    builder: *mut WriterPropertiesBuilderHandle,
    column_path: *const ColumnPathHandle,
    level: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let path = handles::get(column_path, "column path")?.0.clone();
        let level = enums::statistics_level_to_engine(level)?;
        apply(handle, |b| Ok(b.set_column_statistics_enabled(path, level)))
    })
}

/// # Safety
///
/// `builder` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_MaxRowGroupSize(
    builder: *mut WriterPropertiesBuilderHandle,
    max_rows: i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        if max_rows <= 0 {
            return Err(CoreError::length("row group size must be positive"));
        }
        apply(handle, |b| Ok(b.set_max_row_group_size(max_rows as usize)))
    })
}

/// # Safety
///
/// `builder` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_DataPageSizeLimit(
    builder: *mut WriterPropertiesBuilderHandle,
    limit: i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        if limit <= 0 {
            return Err(CoreError::length("data page size must be positive"));
        }
        apply(handle, |b| Ok(b.set_data_page_size_limit(limit as usize)))
    })
}

/// # Safety
///
/// `builder` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_DictionaryPageSizeLimit(
    builder: *mut WriterPropertiesBuilderHandle,
    limit: i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        if limit <= 0 {
            return Err(CoreError::length("dictionary page size must be positive"));
        }
        apply(handle, |b| {
            Ok(b.set_dictionary_page_size_limit(limit as usize))
        })
    })
}

/// # Safety
///
/// `builder` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_WriteBatchSize(
    builder: *mut WriterPropertiesBuilderHandle,
    size: i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        if size <= 0 {
            return Err(CoreError::length("write batch size must be positive"));
        }
        apply(handle, |b| Ok(b.set_write_batch_size(size as usize)))
    })
}

/// # Safety
///
/// `builder` must be a live handle; `created_by` NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_CreatedBy(
    builder: *mut WriterPropertiesBuilderHandle,
    created_by: *const c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let created_by = strings::str_from(created_by, "created by")?.to_string();
        apply(handle, |b| Ok(b.set_created_by(created_by)))
    })
}

/// # Safety
///
/// `builder` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_WriterVersion(
    builder: *mut WriterPropertiesBuilderHandle,
    version: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let version = enums::writer_version_to_engine(version)?;
        apply(handle, |b| Ok(b.set_writer_version(version)))
    })
}

/// Attaches application key/value metadata; the entries are copied out of
/// the metadata handle.
///
/// # Safety
///
/// `builder` and `key_value_metadata` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_KeyValueMetadata(
    builder: *mut WriterPropertiesBuilderHandle,
    key_value_metadata: *const KeyValueMetadataHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let entries = handles::get(key_value_metadata, "key value metadata")?
            .entries()
            .to_vec();
        apply(handle, |b| Ok(b.set_key_value_metadata(Some(entries))))
    })
}

/// Declares the sort order the written row groups honor.
///
/// # Safety
///
/// `builder` must be a live handle; `columns` must point to `count`
/// entries.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_SortingColumns(
    builder: *mut WriterPropertiesBuilderHandle,
    columns: *const FfiSortingColumn,
    count: i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        if count < 0 {
            return Err(CoreError::length("sorting column count is negative"));
        }
        let mut sorting = Vec::with_capacity(count as usize);
        if count > 0 {
            if columns.is_null() {
                return Err(CoreError::invalid_argument("sorting columns is null"));
            }
            for entry in std::slice::from_raw_parts(columns, count as usize) {
                sorting.push(SortingColumn {
                    column_idx: entry.column_idx,
                    descending: entry.descending,
                    nulls_first: entry.nulls_first,
                });
            }
        }
        apply(handle, |b| Ok(b.set_sorting_columns(Some(sorting))))
    })
}

/// Enables modular encryption with the given file encryption properties.
///
/// # Safety
///
/// `builder` and `encryption` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn WriterPropertiesBuilder_Encryption(
    builder: *mut WriterPropertiesBuilderHandle,
    encryption: *const crate::encryption::FileEncryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(builder, "writer properties builder")?;
        let config = handles::get(encryption, "file encryption properties")?;
        let engine_properties = config.0.build()?;
        apply(handle, |b| {
            Ok(b.with_file_encryption_properties(engine_properties))
        })
    })
}

/// Writer properties with engine defaults.
///
/// # Safety
///
/// `properties` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn WriterProperties_Default(
    properties: *mut *mut WriterPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        handles::emit(
            properties,
            WriterPropertiesHandle(Arc::new(WriterProperties::builder().build())),
        )
    })
}

/// # Safety
///
/// `properties` and `column_path` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn WriterProperties_Compression(
    properties: *const WriterPropertiesHandle,
    column_path: *const ColumnPathHandle,
    codec: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(properties, "writer properties")?;
        let path = handles::get(column_path, "column path")?;
        handles::write(
            codec,
            enums::compression_from_engine(handle.0.compression(&path.0)) as i32,
        )
    })
}

/// # Safety
///
/// `properties` and `column_path` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn WriterProperties_DictionaryEnabled(
    properties: *const WriterPropertiesHandle,
    column_path: *const ColumnPathHandle,
    enabled: *mut bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(properties, "writer properties")?;
        let path = handles::get(column_path, "column path")?;
        handles::write(enabled, handle.0.dictionary_enabled(&path.0))
    })
}

/// # Safety
///
/// `properties` and `column_path` must be live handles.
#[no_mangle]
pub unsafe extern "C" fn WriterProperties_StatisticsEnabled(
    properties: *const WriterPropertiesHandle,
    column_path: *const ColumnPathHandle,
    level: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(properties, "writer properties")?;
        let path = handles::get(column_path, "column path")?;
        handles::write(
            level,
            enums::statistics_level_from_engine(handle.0.statistics_enabled(&path.0)) as i32,
        )
    })
}

/// # Safety
///
/// `properties` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterProperties_MaxRowGroupSize(
    properties: *const WriterPropertiesHandle,
    max_rows: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(properties, "writer properties")?;
        handles::write(max_rows, handle.0.max_row_group_size() as i64)
    })
}

/// # Safety
///
/// `properties` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterProperties_WriteBatchSize(
    properties: *const WriterPropertiesHandle,
    size: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(properties, "writer properties")?;
        handles::write(size, handle.0.write_batch_size() as i64)
    })
}

/// Free with `ParquetString_Free`.
///
/// # Safety
///
/// `properties` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterProperties_CreatedBy(
    properties: *const WriterPropertiesHandle,
    created_by: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(properties, "writer properties")?;
        handles::write(created_by, strings::alloc_cstring(handle.0.created_by())?)
    })
}

/// # Safety
///
/// `properties` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn WriterProperties_WriterVersion(
    properties: *const WriterPropertiesHandle,
    version: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(properties, "writer properties")?;
        handles::write(
            version,
            enums::writer_version_from_engine(handle.0.writer_version()) as i32,
        )
    })
}

/// # Safety
///
/// `properties` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn WriterProperties_Free(properties: *mut WriterPropertiesHandle) {
    handles::free(properties);
}

// ---------------------------------------------------------------------
// Reader configuration
// ---------------------------------------------------------------------

pub struct ReaderConfigHandle(pub(crate) ReaderConfig);

/// # Safety
///
/// `config` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn ReaderConfig_Create(
    config: *mut *mut ReaderConfigHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| handles::emit(config, ReaderConfigHandle(ReaderConfig::new())))
}

/// Attaches (or with a null handle clears) decryption properties.
///
/// # Safety
///
/// `config` must be a live handle; `decryption` null or live.
#[no_mangle]
pub unsafe extern "C" fn ReaderConfig_DecryptionProperties(
    config: *mut ReaderConfigHandle,
    decryption: *const FileDecryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(config, "reader config")?;
        if decryption.is_null() {
            handle.0.set_decryption(None);
        } else {
            handle.0.set_decryption(Some(Arc::clone(&(*decryption).0)));
        }
        Ok(())
    })
}

/// # Safety
///
/// `config` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ReaderConfig_ReadPageIndex(
    config: *mut ReaderConfigHandle,
    enabled: bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(config, "reader config")?;
        handle.0.set_read_page_index(enabled);
        Ok(())
    })
}

/// # Safety
///
/// `config` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn ReaderConfig_Free(config: *mut ReaderConfigHandle) {
    handles::free(config);
}
