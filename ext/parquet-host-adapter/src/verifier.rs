//! AAD prefix verifier bridge
//!
//! Implements the core [`AadPrefixVerifier`] seam over a single host
//! callback, invoked before decryption properties reach the engine.

use std::os::raw::c_void;

use parquet_native_core::encryption::AadPrefixVerifier;
use parquet_native_core::Result;

use crate::except::{with_exception_slot, ExceptionSlot};
use crate::handle::{HostHandle, ReleaseHandleFn};

/// Accepts or (through the slot) rejects an AAD prefix.
pub type VerifyAadFn = unsafe extern "C" fn(
    handle: *mut c_void,
    aad_prefix: *const u8,
    aad_prefix_len: u64,
    exception: ExceptionSlot,
);

/// A host object behaving as the shim's AAD prefix verifier
pub struct HostAadVerifier {
    handle: HostHandle,
    verify: VerifyAadFn,
}

impl HostAadVerifier {
    /// # Safety
    ///
    /// All pointers follow the bridge contract: the handle stays valid
    /// until released, the function is callable from any thread, and a
    /// message written to the exception slot outlives the callback call.
    pub unsafe fn new(handle: *mut c_void, release: ReleaseHandleFn, verify: VerifyAadFn) -> Self {
        Self {
            handle: HostHandle::new(handle, release),
            verify,
        }
    }
}

impl AadPrefixVerifier for HostAadVerifier {
    fn verify(&self, aad_prefix: &[u8]) -> Result<()> {
        with_exception_slot(|slot| unsafe {
            (self.verify)(
                self.handle.raw(),
                aad_prefix.as_ptr(),
                aad_prefix.len() as u64,
                slot,
            )
        })?;
        Ok(())
    }
}
