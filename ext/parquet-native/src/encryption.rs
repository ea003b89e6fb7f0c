//! Encryption and decryption property builders
//!
//! Built properties are shared-ownership handles; the exported
//! `_DeepClone` operations duplicate the shared reference (the historical
//! deep copy was dropped — after `Build` the configuration is immutable,
//! so sharing is observable only through lifetime).

use std::os::raw::{c_char, c_void};
use std::sync::Arc;

use parquet_host_adapter::retriever::GetKeyFn;
use parquet_host_adapter::verifier::VerifyAadFn;
use parquet_host_adapter::{HostAadVerifier, HostKeyRetriever, ReleaseHandleFn};
use parquet_native_core::encryption::{ColumnKey, FileDecryptionConfig, FileEncryptionConfig};
use parquet_native_core::{CoreError, Result};

use crate::buffer::BufferHandle;
use crate::enums;
use crate::error::{ffi_catch, ErrorInfo};
use crate::handles;
use crate::strings;

pub struct FileEncryptionPropertiesBuilderHandle(Option<FileEncryptionConfig>);
pub struct FileEncryptionPropertiesHandle(pub(crate) Arc<FileEncryptionConfig>);
pub struct ColumnEncryptionPropertiesBuilderHandle(Option<ColumnKey>);
pub struct ColumnEncryptionPropertiesHandle(pub(crate) Arc<ColumnKey>);
pub struct FileDecryptionPropertiesBuilderHandle(Option<FileDecryptionConfig>);
pub struct FileDecryptionPropertiesHandle(pub(crate) Arc<FileDecryptionConfig>);
pub struct ColumnDecryptionPropertiesBuilderHandle(Option<ColumnDecryption>);
pub struct ColumnDecryptionPropertiesHandle(pub(crate) Arc<ColumnDecryption>);

pub(crate) struct ColumnDecryption {
    pub(crate) path: String,
    pub(crate) key: Vec<u8>,
}

fn builder<'a, T>(slot: &'a mut Option<T>, what: &str) -> Result<&'a mut T> {
    slot.as_mut()
        .ok_or_else(|| CoreError::invalid_argument(format!("{what} builder already consumed")))
}

fn take<T>(slot: &mut Option<T>, what: &str) -> Result<T> {
    slot.take()
        .ok_or_else(|| CoreError::invalid_argument(format!("{what} builder already consumed")))
}

// ---------------------------------------------------------------------
// File encryption
// ---------------------------------------------------------------------

/// Starts building file encryption properties around a footer key of 16,
/// 24 or 32 bytes.
///
/// # Safety
///
/// `footer_key` must point to `footer_key_len` bytes; `out` must be a
/// valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionPropertiesBuilder_Create(
    footer_key: *const u8,
    footer_key_len: u64,
    out: *mut *mut FileEncryptionPropertiesBuilderHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let key = strings::slice_from(footer_key, footer_key_len, "footer key")?;
        let config = FileEncryptionConfig::new(key.to_vec())?;
        handles::emit(out, FileEncryptionPropertiesBuilderHandle(Some(config)))
    })
}

/// # Safety
///
/// `handle` must be a live handle; `metadata` must point to `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionPropertiesBuilder_FooterKeyMetadata(
    handle: *mut FileEncryptionPropertiesBuilderHandle,
    metadata: *const u8,
    len: u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file encryption properties builder")?;
        let metadata = strings::slice_from(metadata, len, "footer key metadata")?;
        builder(&mut handle.0, "file encryption properties")?
            .set_footer_key_metadata(metadata.to_vec());
        Ok(())
    })
}

/// # Safety
///
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionPropertiesBuilder_PlaintextFooter(
    handle: *mut FileEncryptionPropertiesBuilderHandle,
    plaintext: bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file encryption properties builder")?;
        builder(&mut handle.0, "file encryption properties")?.set_plaintext_footer(plaintext);
        Ok(())
    })
}

/// # Safety
///
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionPropertiesBuilder_Cipher(
    handle: *mut FileEncryptionPropertiesBuilderHandle,
    cipher: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file encryption properties builder")?;
        let cipher = enums::cipher_to_core(cipher)?;
        builder(&mut handle.0, "file encryption properties")?.set_cipher(cipher);
        Ok(())
    })
}

/// # Safety
///
/// `handle` must be a live handle; `aad_prefix` must point to `len`
/// bytes.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionPropertiesBuilder_AadPrefix(
    handle: *mut FileEncryptionPropertiesBuilderHandle,
    aad_prefix: *const u8,
    len: u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file encryption properties builder")?;
        let aad = strings::slice_from(aad_prefix, len, "AAD prefix")?;
        builder(&mut handle.0, "file encryption properties")?.set_aad_prefix(aad.to_vec());
        Ok(())
    })
}

/// Whether the AAD prefix is stored in the file for readers.
///
/// # Safety
///
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionPropertiesBuilder_StoreAadPrefix(
    handle: *mut FileEncryptionPropertiesBuilderHandle,
    store: bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file encryption properties builder")?;
        builder(&mut handle.0, "file encryption properties")?.set_store_aad_prefix(store);
        Ok(())
    })
}

/// Adds per-column encryption keys.
///
/// # Safety
///
/// `handle` must be a live handle; `columns` must point to `count` live
/// column encryption property handles.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionPropertiesBuilder_ColumnKeys(
    handle: *mut FileEncryptionPropertiesBuilderHandle,
    columns: *const *const ColumnEncryptionPropertiesHandle,
    count: i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file encryption properties builder")?;
        if count < 0 {
            return Err(CoreError::length("column key count is negative"));
        }
        if count > 0 && columns.is_null() {
            return Err(CoreError::invalid_argument("column keys is null"));
        }
        let config = builder(&mut handle.0, "file encryption properties")?;
        if count > 0 {
            for &column in std::slice::from_raw_parts(columns, count as usize) {
                let column = handles::get(column, "column encryption properties")?;
                config.add_column_key(column.0.as_ref().clone())?;
            }
        }
        Ok(())
    })
}

/// Consumes the builder and emits immutable encryption properties.
///
/// # Safety
///
/// `handle` must be a live handle; `out` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionPropertiesBuilder_Build(
    handle: *mut FileEncryptionPropertiesBuilderHandle,
    out: *mut *mut FileEncryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file encryption properties builder")?;
        let config = take(&mut handle.0, "file encryption properties")?;
        // Surface configuration errors now rather than at writer open.
        config.build()?;
        handles::emit(out, FileEncryptionPropertiesHandle(Arc::new(config)))
    })
}

/// # Safety
///
/// `handle` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionPropertiesBuilder_Free(
    handle: *mut FileEncryptionPropertiesBuilderHandle,
) {
    handles::free(handle);
}

/// Footer key bytes as an owned buffer.
///
/// # Safety
///
/// `handle` must be a live handle; `key` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionProperties_FooterKey(
    handle: *const FileEncryptionPropertiesHandle,
    key: *mut *mut BufferHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "file encryption properties")?;
        handles::emit(key, BufferHandle::new(handle.0.footer_key().to_vec()))
    })
}

/// Footer key metadata as an owned buffer, or a null handle when unset.
///
/// # Safety
///
/// `handle` must be a live handle; `metadata` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionProperties_FooterKeyMetadata(
    handle: *const FileEncryptionPropertiesHandle,
    metadata: *mut *mut BufferHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "file encryption properties")?;
        match handle.0.footer_key_metadata() {
            Some(bytes) => handles::emit(metadata, BufferHandle::new(bytes.to_vec())),
            None => handles::write(metadata, std::ptr::null_mut()),
        }
    })
}

/// # Safety
///
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionProperties_PlaintextFooter(
    handle: *const FileEncryptionPropertiesHandle,
    plaintext: *mut bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "file encryption properties")?;
        handles::write(plaintext, handle.0.plaintext_footer())
    })
}

/// # Safety
///
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionProperties_Cipher(
    handle: *const FileEncryptionPropertiesHandle,
    cipher: *mut i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "file encryption properties")?;
        handles::write(cipher, enums::cipher_from_core(handle.0.cipher()) as i32)
    })
}

/// Duplicates the shared reference; both handles see the same immutable
/// configuration.
///
/// # Safety
///
/// `handle` must be a live handle; `clone` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionProperties_DeepClone(
    handle: *const FileEncryptionPropertiesHandle,
    clone: *mut *mut FileEncryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "file encryption properties")?;
        handles::emit(clone, FileEncryptionPropertiesHandle(Arc::clone(&handle.0)))
    })
}

/// # Safety
///
/// `handle` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn FileEncryptionProperties_Free(handle: *mut FileEncryptionPropertiesHandle) {
    handles::free(handle);
}

// ---------------------------------------------------------------------
// Column encryption
// ---------------------------------------------------------------------

/// # Safety
///
/// `column_path` must be NUL-terminated; `out` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn ColumnEncryptionPropertiesBuilder_Create(
    column_path: *const c_char,
    out: *mut *mut ColumnEncryptionPropertiesBuilderHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let path = strings::str_from(column_path, "column path")?.to_string();
        handles::emit(
            out,
            ColumnEncryptionPropertiesBuilderHandle(Some(ColumnKey {
                path,
                key: Vec::new(),
                key_metadata: None,
            })),
        )
    })
}

/// # Safety
///
/// `handle` must be a live handle; `key` must point to `key_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn ColumnEncryptionPropertiesBuilder_Key(
    handle: *mut ColumnEncryptionPropertiesBuilderHandle,
    key: *const u8,
    key_len: u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "column encryption properties builder")?;
        let key = strings::slice_from(key, key_len, "column key")?;
        parquet_native_core::encryption::check_key_length(key)?;
        builder(&mut handle.0, "column encryption properties")?.key = key.to_vec();
        Ok(())
    })
}

/// # Safety
///
/// `handle` must be a live handle; `metadata` must point to `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn ColumnEncryptionPropertiesBuilder_KeyMetadata(
    handle: *mut ColumnEncryptionPropertiesBuilderHandle,
    metadata: *const u8,
    len: u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "column encryption properties builder")?;
        let metadata = strings::slice_from(metadata, len, "column key metadata")?;
        builder(&mut handle.0, "column encryption properties")?.key_metadata =
            Some(metadata.to_vec());
        Ok(())
    })
}

/// # Safety
///
/// `handle` must be a live handle; `out` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn ColumnEncryptionPropertiesBuilder_Build(
    handle: *mut ColumnEncryptionPropertiesBuilderHandle,
    out: *mut *mut ColumnEncryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "column encryption properties builder")?;
        let column = take(&mut handle.0, "column encryption properties")?;
        parquet_native_core::encryption::check_key_length(&column.key)?;
        handles::emit(out, ColumnEncryptionPropertiesHandle(Arc::new(column)))
    })
}

/// # Safety
///
/// `handle` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn ColumnEncryptionPropertiesBuilder_Free(
    handle: *mut ColumnEncryptionPropertiesBuilderHandle,
) {
    handles::free(handle);
}

/// Free with `ParquetString_Free`.
///
/// # Safety
///
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnEncryptionProperties_ColumnPath(
    handle: *const ColumnEncryptionPropertiesHandle,
    column_path: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "column encryption properties")?;
        handles::write(column_path, strings::alloc_cstring(&handle.0.path)?)
    })
}

/// Duplicates the shared reference.
///
/// # Safety
///
/// `handle` must be a live handle; `clone` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn ColumnEncryptionProperties_DeepClone(
    handle: *const ColumnEncryptionPropertiesHandle,
    clone: *mut *mut ColumnEncryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "column encryption properties")?;
        handles::emit(
            clone,
            ColumnEncryptionPropertiesHandle(Arc::clone(&handle.0)),
        )
    })
}

/// # Safety
///
/// `handle` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn ColumnEncryptionProperties_Free(
    handle: *mut ColumnEncryptionPropertiesHandle,
) {
    handles::free(handle);
}

// ---------------------------------------------------------------------
// File decryption
// ---------------------------------------------------------------------

/// # Safety
///
/// `out` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionPropertiesBuilder_Create(
    out: *mut *mut FileDecryptionPropertiesBuilderHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        handles::emit(
            out,
            FileDecryptionPropertiesBuilderHandle(Some(FileDecryptionConfig::new())),
        )
    })
}

/// # Safety
///
/// `handle` must be a live handle; `key` must point to `key_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionPropertiesBuilder_FooterKey(
    handle: *mut FileDecryptionPropertiesBuilderHandle,
    key: *const u8,
    key_len: u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file decryption properties builder")?;
        let key = strings::slice_from(key, key_len, "footer key")?;
        builder(&mut handle.0, "file decryption properties")?.set_footer_key(key.to_vec())
    })
}

/// # Safety
///
/// `handle` must be a live handle; `columns` must point to `count` live
/// column decryption property handles.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionPropertiesBuilder_ColumnKeys(
    handle: *mut FileDecryptionPropertiesBuilderHandle,
    columns: *const *const ColumnDecryptionPropertiesHandle,
    count: i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file decryption properties builder")?;
        if count < 0 {
            return Err(CoreError::length("column key count is negative"));
        }
        if count > 0 && columns.is_null() {
            return Err(CoreError::invalid_argument("column keys is null"));
        }
        let config = builder(&mut handle.0, "file decryption properties")?;
        if count > 0 {
            for &column in std::slice::from_raw_parts(columns, count as usize) {
                let column = handles::get(column, "column decryption properties")?;
                config.add_column_key(column.0.path.clone(), column.0.key.clone())?;
            }
        }
        Ok(())
    })
}

/// # Safety
///
/// `handle` must be a live handle; `aad_prefix` must point to `len`
/// bytes.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionPropertiesBuilder_AadPrefix(
    handle: *mut FileDecryptionPropertiesBuilderHandle,
    aad_prefix: *const u8,
    len: u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file decryption properties builder")?;
        let aad = strings::slice_from(aad_prefix, len, "AAD prefix")?;
        builder(&mut handle.0, "file decryption properties")?.set_aad_prefix(aad.to_vec());
        Ok(())
    })
}

/// Registers a managed decryption key retriever; a null `retriever`
/// clears it.
///
/// # Safety
///
/// When `retriever` is non-null it must follow the bridge contract:
/// valid until released, callbacks usable from any thread.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionPropertiesBuilder_KeyRetriever(
    handle: *mut FileDecryptionPropertiesBuilderHandle,
    retriever: *mut c_void,
    release: ReleaseHandleFn,
    get_key: GetKeyFn,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file decryption properties builder")?;
        let config = builder(&mut handle.0, "file decryption properties")?;
        if retriever.is_null() {
            config.set_key_retriever(None);
        } else {
            config.set_key_retriever(Some(Arc::new(HostKeyRetriever::new(
                retriever, release, get_key,
            ))));
        }
        Ok(())
    })
}

/// Registers a managed AAD prefix verifier; a null `verifier` clears it.
///
/// # Safety
///
/// When `verifier` is non-null it must follow the bridge contract.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionPropertiesBuilder_AadPrefixVerifier(
    handle: *mut FileDecryptionPropertiesBuilderHandle,
    verifier: *mut c_void,
    release: ReleaseHandleFn,
    verify: VerifyAadFn,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file decryption properties builder")?;
        let config = builder(&mut handle.0, "file decryption properties")?;
        if verifier.is_null() {
            config.set_aad_prefix_verifier(None);
        } else {
            config.set_aad_prefix_verifier(Some(Arc::new(HostAadVerifier::new(
                verifier, release, verify,
            ))));
        }
        Ok(())
    })
}

/// Consumes the builder and emits immutable decryption properties.
///
/// # Safety
///
/// `handle` must be a live handle; `out` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionPropertiesBuilder_Build(
    handle: *mut FileDecryptionPropertiesBuilderHandle,
    out: *mut *mut FileDecryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "file decryption properties builder")?;
        let config = take(&mut handle.0, "file decryption properties")?;
        if config.footer_key().is_none() && !config.has_key_retriever() {
            return Err(CoreError::invalid_argument(
                "decryption requires a footer key or a key retriever",
            ));
        }
        handles::emit(out, FileDecryptionPropertiesHandle(Arc::new(config)))
    })
}

/// # Safety
///
/// `handle` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionPropertiesBuilder_Free(
    handle: *mut FileDecryptionPropertiesBuilderHandle,
) {
    handles::free(handle);
}

/// # Safety
///
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionProperties_HasKeyRetriever(
    handle: *const FileDecryptionPropertiesHandle,
    has_retriever: *mut bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "file decryption properties")?;
        handles::write(has_retriever, handle.0.has_key_retriever())
    })
}

/// # Safety
///
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionProperties_HasAadPrefixVerifier(
    handle: *const FileDecryptionPropertiesHandle,
    has_verifier: *mut bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "file decryption properties")?;
        handles::write(has_verifier, handle.0.has_aad_prefix_verifier())
    })
}

/// Duplicates the shared reference.
///
/// # Safety
///
/// `handle` must be a live handle; `clone` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionProperties_DeepClone(
    handle: *const FileDecryptionPropertiesHandle,
    clone: *mut *mut FileDecryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "file decryption properties")?;
        handles::emit(clone, FileDecryptionPropertiesHandle(Arc::clone(&handle.0)))
    })
}

/// # Safety
///
/// `handle` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn FileDecryptionProperties_Free(handle: *mut FileDecryptionPropertiesHandle) {
    handles::free(handle);
}

// ---------------------------------------------------------------------
// Column decryption
// ---------------------------------------------------------------------

/// # Safety
///
/// `column_path` must be NUL-terminated; `out` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn ColumnDecryptionPropertiesBuilder_Create(
    column_path: *const c_char,
    out: *mut *mut ColumnDecryptionPropertiesBuilderHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let path = strings::str_from(column_path, "column path")?.to_string();
        handles::emit(
            out,
            ColumnDecryptionPropertiesBuilderHandle(Some(ColumnDecryption {
                path,
                key: Vec::new(),
            })),
        )
    })
}

/// # Safety
///
/// `handle` must be a live handle; `key` must point to `key_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn ColumnDecryptionPropertiesBuilder_Key(
    handle: *mut ColumnDecryptionPropertiesBuilderHandle,
    key: *const u8,
    key_len: u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "column decryption properties builder")?;
        let key = strings::slice_from(key, key_len, "column key")?;
        parquet_native_core::encryption::check_key_length(key)?;
        builder(&mut handle.0, "column decryption properties")?.key = key.to_vec();
        Ok(())
    })
}

/// # Safety
///
/// `handle` must be a live handle; `out` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn ColumnDecryptionPropertiesBuilder_Build(
    handle: *mut ColumnDecryptionPropertiesBuilderHandle,
    out: *mut *mut ColumnDecryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(handle, "column decryption properties builder")?;
        let column = take(&mut handle.0, "column decryption properties")?;
        parquet_native_core::encryption::check_key_length(&column.key)?;
        handles::emit(out, ColumnDecryptionPropertiesHandle(Arc::new(column)))
    })
}

/// # Safety
///
/// `handle` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn ColumnDecryptionPropertiesBuilder_Free(
    handle: *mut ColumnDecryptionPropertiesBuilderHandle,
) {
    handles::free(handle);
}

/// Free with `ParquetString_Free`.
///
/// # Safety
///
/// `handle` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ColumnDecryptionProperties_ColumnPath(
    handle: *const ColumnDecryptionPropertiesHandle,
    column_path: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "column decryption properties")?;
        handles::write(column_path, strings::alloc_cstring(&handle.0.path)?)
    })
}

/// Duplicates the shared reference.
///
/// # Safety
///
/// `handle` must be a live handle; `clone` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn ColumnDecryptionProperties_DeepClone(
    handle: *const ColumnDecryptionPropertiesHandle,
    clone: *mut *mut ColumnDecryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(handle, "column decryption properties")?;
        handles::emit(
            clone,
            ColumnDecryptionPropertiesHandle(Arc::clone(&handle.0)),
        )
    })
}

/// # Safety
///
/// `handle` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn ColumnDecryptionProperties_Free(
    handle: *mut ColumnDecryptionPropertiesHandle,
) {
    handles::free(handle);
}
