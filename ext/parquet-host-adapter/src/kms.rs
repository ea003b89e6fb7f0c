//! KMS client and client factory bridges
//!
//! The factory bridge manufactures client bridges on demand: each
//! `create_client` call forwards the connection configuration to the host
//! and wraps the opaque client object it gets back. Wrap/unwrap/release
//! function pointers are capability-scoped — every client produced by a
//! factory shares them.

use std::os::raw::c_void;
use std::sync::Arc;

use parquet_native_core::kms::{KmsClient, KmsClientFactory, KmsConnectionConfig};
use parquet_native_core::{CoreError, Result};

use crate::except::{with_exception_slot, ExceptionSlot};
use crate::handle::{HostHandle, ReleaseHandleFn};
use crate::retriever::AesKeyMaterial;

/// Wraps `key_bytes` with the named master key.
///
/// The host sets `wrapped_out`/`wrapped_len_out` to a buffer it keeps
/// valid until the callback returns; the bridge copies it.
pub type WrapKeyFn = unsafe extern "C" fn(
    handle: *mut c_void,
    key_bytes: *const u8,
    key_len: u64,
    master_key_id: *const u8,
    master_key_id_len: u64,
    wrapped_out: *mut *const u8,
    wrapped_len_out: *mut u64,
    exception: ExceptionSlot,
);

/// Unwraps a wrapped key with the named master key into `key_out`.
pub type UnwrapKeyFn = unsafe extern "C" fn(
    handle: *mut c_void,
    wrapped_key: *const u8,
    wrapped_key_len: u64,
    master_key_id: *const u8,
    master_key_id_len: u64,
    key_out: *mut AesKeyMaterial,
    exception: ExceptionSlot,
);

/// Builds a host KMS client for a connection configuration.
///
/// `config` is an opaque borrow of the configuration, valid only for the
/// duration of the call; the host reads it through the exported
/// `KmsConnectionConfig_*` accessors.
pub type CreateKmsClientFn = unsafe extern "C" fn(
    handle: *mut c_void,
    config: *const c_void,
    client_out: *mut *mut c_void,
    exception: ExceptionSlot,
);

/// A host object behaving as a KMS client
pub struct HostKmsClient {
    handle: HostHandle,
    wrap: WrapKeyFn,
    unwrap: UnwrapKeyFn,
}

impl HostKmsClient {
    /// # Safety
    ///
    /// All pointers follow the bridge contract: the handle stays valid
    /// until released, the functions are callable from any thread, and
    /// buffers handed back through out-parameters or the exception slot
    /// outlive the callback call.
    pub unsafe fn new(
        handle: *mut c_void,
        release: ReleaseHandleFn,
        wrap: WrapKeyFn,
        unwrap: UnwrapKeyFn,
    ) -> Self {
        Self {
            handle: HostHandle::new(handle, release),
            wrap,
            unwrap,
        }
    }
}

impl KmsClient for HostKmsClient {
    fn wrap_key(&self, key_bytes: &[u8], master_key_identifier: &str) -> Result<String> {
        let mut wrapped: *const u8 = std::ptr::null();
        let mut wrapped_len = 0u64;
        with_exception_slot(|slot| unsafe {
            (self.wrap)(
                self.handle.raw(),
                key_bytes.as_ptr(),
                key_bytes.len() as u64,
                master_key_identifier.as_ptr(),
                master_key_identifier.len() as u64,
                &mut wrapped,
                &mut wrapped_len,
                slot,
            )
        })?;
        if wrapped.is_null() {
            return Err(CoreError::host(
                "KMS wrap callback returned neither a wrapped key nor an error",
            ));
        }
        let bytes = unsafe { std::slice::from_raw_parts(wrapped, wrapped_len as usize) };
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CoreError::host(format!("wrapped key is not valid UTF-8: {e}")))?;
        Ok(text.to_owned())
    }

    fn unwrap_key(&self, wrapped_key: &str, master_key_identifier: &str) -> Result<Vec<u8>> {
        let mut key = AesKeyMaterial::empty();
        with_exception_slot(|slot| unsafe {
            (self.unwrap)(
                self.handle.raw(),
                wrapped_key.as_ptr(),
                wrapped_key.len() as u64,
                master_key_identifier.as_ptr(),
                master_key_identifier.len() as u64,
                &mut key,
                slot,
            )
        })?;
        Ok(key.to_vec()?)
    }
}

/// A host object behaving as a KMS client factory
pub struct HostKmsClientFactory {
    handle: HostHandle,
    create_client: CreateKmsClientFn,
    release_client: ReleaseHandleFn,
    wrap: WrapKeyFn,
    unwrap: UnwrapKeyFn,
}

impl HostKmsClientFactory {
    /// # Safety
    ///
    /// All pointers follow the bridge contract. `release` is reused for
    /// the clients the factory produces; it must accept any host object
    /// reference this factory hands out.
    pub unsafe fn new(
        handle: *mut c_void,
        release: ReleaseHandleFn,
        create_client: CreateKmsClientFn,
        wrap: WrapKeyFn,
        unwrap: UnwrapKeyFn,
    ) -> Self {
        Self {
            handle: HostHandle::new(handle, release),
            create_client,
            release_client: release,
            wrap,
            unwrap,
        }
    }
}

impl KmsClientFactory for HostKmsClientFactory {
    fn create_client(&self, config: &KmsConnectionConfig) -> Result<Arc<dyn KmsClient>> {
        let mut client: *mut c_void = std::ptr::null_mut();
        with_exception_slot(|slot| unsafe {
            (self.create_client)(
                self.handle.raw(),
                config as *const KmsConnectionConfig as *const c_void,
                &mut client,
                slot,
            )
        })?;
        if client.is_null() {
            return Err(CoreError::host(
                "KMS client factory callback returned neither a client nor an error",
            ));
        }
        Ok(Arc::new(unsafe {
            HostKmsClient::new(client, self.release_client, self.wrap, self.unwrap)
        }))
    }
}
