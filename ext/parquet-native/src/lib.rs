//! # parquet-native
//!
//! Flat C ABI over the Apache `parquet` crate for managed-language hosts.
//!
//! Every exported function follows one shape: opaque handles and
//! primitives go in, results come back through out-pointers, and the
//! return value is an error descriptor pointer — null on success, owned
//! by the caller on failure (free it with `ErrorInfo_Free`). Nothing
//! unwinds across the boundary in either direction.
//!
//! Handle, string and array outputs each have a paired free export; the
//! host never frees memory this library did not allocate, and vice
//! versa. Host behavior (streams, key retrieval, AAD verification, KMS
//! clients, logging) enters through registration exports taking an
//! opaque object reference, one function pointer per capability and a
//! release function; passing a null object reference clears the
//! capability where clearing is meaningful.

// The exported catalog uses TypeName_Operation symbol names.
#![allow(non_snake_case)]

pub mod buffer;
pub mod encryption;
pub mod enums;
pub mod error;
pub mod handles;
pub mod io;
pub mod kms;
pub mod metadata;
pub mod properties;
pub mod reader;
pub mod schema;
pub mod strings;
pub mod writer;

#[cfg(target_os = "linux")]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;
