//! KMS connection configuration and the crypto factory
//!
//! `KmsConnectionConfig` handles are shared references created with
//! `Arc`; during a `CreateKmsClient` callback the host receives a
//! *borrowed* pointer to the same type, usable with the accessors below
//! but only for the duration of the callback and never freed.

use std::collections::HashMap;
use std::os::raw::{c_char, c_void};
use std::sync::Arc;

use parquet_host_adapter::kms::{CreateKmsClientFn, UnwrapKeyFn, WrapKeyFn};
use parquet_host_adapter::{HostKmsClientFactory, ReleaseHandleFn};
use parquet_native_core::kms::{
    CryptoFactory, DecryptionConfiguration, EncryptionConfiguration, KmsConnectionConfig,
};
use parquet_native_core::{CoreError, Result};

use crate::encryption::{FileDecryptionPropertiesHandle, FileEncryptionPropertiesHandle};
use crate::enums;
use crate::error::{ffi_catch, ErrorInfo};
use crate::handles;
use crate::strings;

pub struct CryptoFactoryHandle(CryptoFactory);
pub struct EncryptionConfigurationHandle(EncryptionConfiguration);
pub struct DecryptionConfigurationHandle(DecryptionConfiguration);

unsafe fn config_ref<'a>(config: *const KmsConnectionConfig) -> Result<&'a KmsConnectionConfig> {
    config
        .as_ref()
        .ok_or_else(|| CoreError::invalid_argument("KMS connection config handle is null"))
}

/// # Safety
///
/// `config` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn KmsConnectionConfig_Create(
    config: *mut *const KmsConnectionConfig,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        if config.is_null() {
            return Err(CoreError::invalid_argument("output pointer is null"));
        }
        *config = Arc::into_raw(Arc::new(KmsConnectionConfig::new()));
        Ok(())
    })
}

/// Releases a configuration created by `KmsConnectionConfig_Create`.
/// Never call this on the borrowed pointer passed to a `CreateKmsClient`
/// callback.
///
/// # Safety
///
/// `config` must come from `KmsConnectionConfig_Create` and not have been
/// freed.
#[no_mangle]
pub unsafe extern "C" fn KmsConnectionConfig_Free(config: *const KmsConnectionConfig) {
    if !config.is_null() {
        drop(Arc::from_raw(config));
    }
}

macro_rules! config_string_accessors {
    ($getter:ident, $setter:ident, $get:ident, $set:ident, $what:literal) => {
        /// Free the returned string with `ParquetString_Free`.
        ///
        /// # Safety
        ///
        /// `config` must be a live or borrowed configuration pointer.
        #[no_mangle]
        pub unsafe extern "C" fn $getter(
            config: *const KmsConnectionConfig,
            value: *mut *mut c_char,
        ) -> *mut ErrorInfo {
            ffi_catch(|| {
                let config = config_ref(config)?;
                handles::write(value, strings::alloc_cstring(&config.$get())?)
            })
        }

        /// # Safety
        ///
        /// `config` must be a live or borrowed configuration pointer;
        /// `value` NUL-terminated.
        #[no_mangle]
        pub unsafe extern "C" fn $setter(
            config: *const KmsConnectionConfig,
            value: *const c_char,
        ) -> *mut ErrorInfo {
            ffi_catch(|| {
                let config = config_ref(config)?;
                config.$set(strings::str_from(value, $what)?.to_string());
                Ok(())
            })
        }
    };
}

config_string_accessors!(
    KmsConnectionConfig_GetKmsInstanceId,
    KmsConnectionConfig_SetKmsInstanceId,
    kms_instance_id,
    set_kms_instance_id,
    "KMS instance id"
);
config_string_accessors!(
    KmsConnectionConfig_GetKmsInstanceUrl,
    KmsConnectionConfig_SetKmsInstanceUrl,
    kms_instance_url,
    set_kms_instance_url,
    "KMS instance URL"
);
config_string_accessors!(
    KmsConnectionConfig_GetKeyAccessToken,
    KmsConnectionConfig_SetKeyAccessToken,
    key_access_token,
    refresh_key_access_token,
    "key access token"
);

/// Custom configuration entries as parallel owned string arrays; free
/// with `KmsConnectionConfig_CustomKmsConf_Free`.
///
/// # Safety
///
/// `config` must be a live or borrowed configuration pointer; the
/// out-pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn KmsConnectionConfig_GetCustomKmsConf(
    config: *const KmsConnectionConfig,
    keys: *mut *mut *mut c_char,
    values: *mut *mut *mut c_char,
    count: *mut i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        if keys.is_null() || values.is_null() || count.is_null() {
            return Err(CoreError::invalid_argument("output pointer is null"));
        }
        let config = config_ref(config)?;
        let conf = config.custom_kms_conf();
        let mut pairs: Vec<(&str, &str)> =
            conf.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        pairs.sort_unstable();

        let key_items: Vec<Option<&str>> = pairs.iter().map(|(k, _)| Some(*k)).collect();
        let value_items: Vec<Option<&str>> = pairs.iter().map(|(_, v)| Some(*v)).collect();

        let key_array = strings::alloc_string_array(&key_items)?;
        let value_array = match strings::alloc_string_array(&value_items) {
            Ok(array) => array,
            Err(e) => {
                strings::free_string_array(key_array, key_items.len());
                return Err(e);
            }
        };
        handles::write(keys, key_array)?;
        handles::write(values, value_array)?;
        handles::write(count, pairs.len() as i64)
    })
}

/// # Safety
///
/// The arrays must come from `KmsConnectionConfig_GetCustomKmsConf`.
#[no_mangle]
pub unsafe extern "C" fn KmsConnectionConfig_CustomKmsConf_Free(
    keys: *mut *mut c_char,
    values: *mut *mut c_char,
    count: i64,
) {
    if count >= 0 {
        strings::free_string_array(keys, count as usize);
        strings::free_string_array(values, count as usize);
    }
}

/// Replaces the custom configuration map.
///
/// # Safety
///
/// `keys` and `values` must each point to `count` NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn KmsConnectionConfig_SetCustomKmsConf(
    config: *const KmsConnectionConfig,
    keys: *const *const c_char,
    values: *const *const c_char,
    count: i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let config = config_ref(config)?;
        let keys = strings::str_vec_from(keys, count, "custom conf key")?;
        let values = strings::str_vec_from(values, count, "custom conf value")?;
        let map: HashMap<String, String> = keys.into_iter().zip(values).collect();
        config.set_custom_kms_conf(map);
        Ok(())
    })
}

// ---------------------------------------------------------------------
// Encryption / decryption configurations
// ---------------------------------------------------------------------

/// # Safety
///
/// `footer_key_id` must be NUL-terminated; `config` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn EncryptionConfiguration_Create(
    footer_key_id: *const c_char,
    config: *mut *mut EncryptionConfigurationHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let footer_key_id = strings::str_from(footer_key_id, "footer key id")?.to_string();
        handles::emit(
            config,
            EncryptionConfigurationHandle(EncryptionConfiguration::new(footer_key_id)),
        )
    })
}

/// Free with `ParquetString_Free`.
///
/// # Safety
///
/// `config` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn EncryptionConfiguration_GetFooterKeyId(
    config: *const EncryptionConfigurationHandle,
    footer_key_id: *mut *mut c_char,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get(config, "encryption configuration")?;
        handles::write(
            footer_key_id,
            strings::alloc_cstring(handle.0.footer_key_id())?,
        )
    })
}

/// # Safety
///
/// `config` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn EncryptionConfiguration_SetUniformEncryption(
    config: *mut EncryptionConfigurationHandle,
    uniform: bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(config, "encryption configuration")?;
        handle.0.set_uniform_encryption(uniform);
        Ok(())
    })
}

/// # Safety
///
/// `config` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn EncryptionConfiguration_SetPlaintextFooter(
    config: *mut EncryptionConfigurationHandle,
    plaintext: bool,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(config, "encryption configuration")?;
        handle.0.set_plaintext_footer(plaintext);
        Ok(())
    })
}

/// # Safety
///
/// `config` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn EncryptionConfiguration_SetCipher(
    config: *mut EncryptionConfigurationHandle,
    cipher: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(config, "encryption configuration")?;
        handle.0.set_cipher(enums::cipher_to_core(cipher)?);
        Ok(())
    })
}

/// # Safety
///
/// `config` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn EncryptionConfiguration_SetDataKeyLengthBits(
    config: *mut EncryptionConfigurationHandle,
    bits: i32,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(config, "encryption configuration")?;
        if bits < 0 {
            return Err(CoreError::length("data key length is negative"));
        }
        handle.0.set_data_key_length_bits(bits as u32)
    })
}

/// Maps columns to a master key. The engine cannot distribute KMS keys
/// per column, so configurations with column keys are rejected when the
/// properties are produced.
///
/// # Safety
///
/// `config` must be a live handle; `master_key_id` NUL-terminated;
/// `columns` must point to `column_count` NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn EncryptionConfiguration_AddColumnKeys(
    config: *mut EncryptionConfigurationHandle,
    master_key_id: *const c_char,
    columns: *const *const c_char,
    column_count: i64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(config, "encryption configuration")?;
        let master = strings::str_from(master_key_id, "master key id")?.to_string();
        let columns = strings::str_vec_from(columns, column_count, "column name")?;
        handle.0.add_column_key_id(master, columns);
        Ok(())
    })
}

/// # Safety
///
/// `config` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn EncryptionConfiguration_Free(config: *mut EncryptionConfigurationHandle) {
    handles::free(config);
}

/// # Safety
///
/// `config` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn DecryptionConfiguration_Create(
    config: *mut *mut DecryptionConfigurationHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        handles::emit(
            config,
            DecryptionConfigurationHandle(DecryptionConfiguration::new()),
        )
    })
}

/// # Safety
///
/// `config` must be a live handle; `aad_prefix` must point to `len`
/// bytes.
#[no_mangle]
pub unsafe extern "C" fn DecryptionConfiguration_SetAadPrefix(
    config: *mut DecryptionConfigurationHandle,
    aad_prefix: *const u8,
    len: u64,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(config, "decryption configuration")?;
        let aad = strings::slice_from(aad_prefix, len, "AAD prefix")?;
        handle.0.set_aad_prefix(aad.to_vec());
        Ok(())
    })
}

/// # Safety
///
/// `config` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn DecryptionConfiguration_Free(config: *mut DecryptionConfigurationHandle) {
    handles::free(config);
}

// ---------------------------------------------------------------------
// Crypto factory
// ---------------------------------------------------------------------

/// # Safety
///
/// `factory` must be a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn CryptoFactory_Create(
    factory: *mut *mut CryptoFactoryHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| handles::emit(factory, CryptoFactoryHandle(CryptoFactory::new())))
}

/// Registers a managed KMS client factory; a null `client_factory`
/// clears the registration. The wrap/unwrap/release pointers are shared
/// by every client the factory creates.
///
/// # Safety
///
/// When `client_factory` is non-null it must follow the bridge contract.
#[no_mangle]
pub unsafe extern "C" fn CryptoFactory_RegisterKmsClientFactory(
    factory: *mut CryptoFactoryHandle,
    client_factory: *mut c_void,
    release: ReleaseHandleFn,
    create_client: CreateKmsClientFn,
    wrap: WrapKeyFn,
    unwrap: UnwrapKeyFn,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let handle = handles::get_mut(factory, "crypto factory")?;
        if client_factory.is_null() {
            handle.0.register_kms_client_factory(None);
        } else {
            handle
                .0
                .register_kms_client_factory(Some(Arc::new(HostKmsClientFactory::new(
                    client_factory,
                    release,
                    create_client,
                    wrap,
                    unwrap,
                ))));
        }
        Ok(())
    })
}

/// Produces file encryption properties: generates a data key and wraps
/// it through the registered KMS client factory.
///
/// # Safety
///
/// All handles must be live; `out` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn CryptoFactory_FileEncryptionProperties(
    factory: *const CryptoFactoryHandle,
    connection: *const KmsConnectionConfig,
    config: *const EncryptionConfigurationHandle,
    out: *mut *mut FileEncryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let factory = handles::get(factory, "crypto factory")?;
        let connection = config_ref(connection)?;
        let config = handles::get(config, "encryption configuration")?;
        let properties = factory.0.file_encryption_properties(connection, &config.0)?;
        handles::emit(out, FileEncryptionPropertiesHandle(Arc::new(properties)))
    })
}

/// Produces file decryption properties whose key retriever unwraps key
/// material through the registered KMS client factory.
///
/// # Safety
///
/// All handles must be live; `out` a valid out-pointer.
#[no_mangle]
pub unsafe extern "C" fn CryptoFactory_FileDecryptionProperties(
    factory: *const CryptoFactoryHandle,
    connection: *const KmsConnectionConfig,
    config: *const DecryptionConfigurationHandle,
    out: *mut *mut FileDecryptionPropertiesHandle,
) -> *mut ErrorInfo {
    ffi_catch(|| {
        let factory = handles::get(factory, "crypto factory")?;
        let connection = config_ref(connection)?;
        let config = handles::get(config, "decryption configuration")?;
        let properties = factory.0.file_decryption_properties(connection, &config.0)?;
        handles::emit(out, FileDecryptionPropertiesHandle(Arc::new(properties)))
    })
}

/// # Safety
///
/// `factory` must come from this library and not have been freed.
#[no_mangle]
pub unsafe extern "C" fn CryptoFactory_Free(factory: *mut CryptoFactoryHandle) {
    handles::free(factory);
}
