//! Host-side adapters for parquet-native-core
//!
//! This crate implements the capability traits the core defines —
//! output streams, random access input, decryption key retrieval, AAD
//! prefix verification, KMS clients and logging — by forwarding every
//! call to plain C function pointers supplied by the managed host.
//!
//! # The bridging protocol
//!
//! Each adapter holds an opaque host object reference plus one function
//! pointer per operation. Every fallible callback receives a trailing
//! *exception slot* (`*mut *const c_char`); setting it to a message
//! buffer is the host's only way to report failure, since foreign
//! exceptions cannot unwind through native frames in either direction.
//! The adapter copies the message immediately and converts it into an
//! ordinary engine error, which propagates back out through `Result`s.
//!
//! The host object reference is released exactly once, from the
//! adapter's `Drop`; the engine controls adapter lifetime through its
//! own ownership (usually an `Arc`), so no exported free call touches
//! the host reference directly.
//!
//! Callbacks are invoked synchronously on whatever thread the engine
//! happens to use; hosts must register thread-safe functions.

pub mod except;
pub mod handle;
pub mod input;
pub mod kms;
pub mod logger;
pub mod output;
pub mod retriever;
pub mod verifier;

pub use except::{with_exception_slot, ExceptionSlot, HostError};
pub use handle::{HostHandle, ReleaseHandleFn};
pub use input::HostRandomAccessFile;
pub use kms::{HostKmsClient, HostKmsClientFactory};
pub use logger::{HostLogger, LogLevel};
pub use output::HostOutputStream;
pub use retriever::{AesKeyMaterial, HostKeyRetriever};
pub use verifier::HostAadVerifier;
