//! Decryption key retriever bridge
//!
//! Implements the engine's `KeyRetriever` over a single host callback.
//! The engine invokes it while reading an encrypted file, passing the key
//! metadata stored in the footer; the host fills a fixed-size key buffer.

use std::os::raw::c_void;

use parquet::encryption::decrypt::KeyRetriever;

use crate::except::{with_exception_slot, ExceptionSlot, HostError};
use crate::handle::{HostHandle, ReleaseHandleFn};

/// Fixed-size AES key transport: up to 32 key bytes plus the real length.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct AesKeyMaterial {
    pub bytes: [u8; 32],
    pub length: i32,
}

impl AesKeyMaterial {
    pub const fn empty() -> Self {
        Self {
            bytes: [0; 32],
            length: 0,
        }
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, HostError> {
        match self.length {
            n @ 0..=32 => Ok(self.bytes[..n as usize].to_vec()),
            n => Err(HostError(format!(
                "host callback returned an invalid key length {n}"
            ))),
        }
    }
}

impl From<&[u8]> for AesKeyMaterial {
    fn from(key: &[u8]) -> Self {
        let mut material = Self::empty();
        let n = key.len().min(32);
        material.bytes[..n].copy_from_slice(&key[..n]);
        material.length = n as i32;
        material
    }
}

/// Fills `key` with the AES key for the given key metadata.
pub type GetKeyFn = unsafe extern "C" fn(
    handle: *mut c_void,
    key_metadata: *const u8,
    key_metadata_len: u64,
    key: *mut AesKeyMaterial,
    exception: ExceptionSlot,
);

/// A host object behaving as the engine's decryption key retriever
pub struct HostKeyRetriever {
    handle: HostHandle,
    get_key: GetKeyFn,
}

impl HostKeyRetriever {
    /// # Safety
    ///
    /// All pointers follow the bridge contract: the handle stays valid
    /// until released, the function is callable from any thread, and a
    /// message written to the exception slot outlives the callback call.
    pub unsafe fn new(handle: *mut c_void, release: ReleaseHandleFn, get_key: GetKeyFn) -> Self {
        Self {
            handle: HostHandle::new(handle, release),
            get_key,
        }
    }
}

impl KeyRetriever for HostKeyRetriever {
    fn retrieve_key(&self, key_metadata: &[u8]) -> parquet::errors::Result<Vec<u8>> {
        let mut key = AesKeyMaterial::empty();
        with_exception_slot(|slot| unsafe {
            (self.get_key)(
                self.handle.raw(),
                key_metadata.as_ptr(),
                key_metadata.len() as u64,
                &mut key,
                slot,
            )
        })?;
        Ok(key.to_vec()?)
    }
}
