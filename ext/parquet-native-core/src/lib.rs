//! Language-agnostic core for the parquet-native shim
//!
//! `parquet-native-core` sits between the flat C catalog exported by
//! `parquet-native` and the Apache `parquet` crate (the engine). It holds
//! everything that does not need `unsafe` or C types:
//!
//! - **Errors**: the [`CoreError`] taxonomy with stable kind strings that
//!   the boundary turns into error descriptors
//! - **Sources**: [`source::InputSource`], a cloneable `ChunkReader` over
//!   files, in-memory bytes and host-backed random access streams
//! - **Sinks**: [`sink::OutputDest`], a `std::io::Write` over files,
//!   shared buffers and host-backed output streams
//! - **Encryption**: configuration models for the engine's modular
//!   encryption, plus the AAD prefix verification seam
//! - **KMS**: the [`kms::KmsClient`]/[`kms::KmsClientFactory`] capability
//!   traits and the [`kms::CryptoFactory`] key envelope
//! - **Reader/Writer**: thin open helpers over the engine's serialized
//!   (column-level) API
//!
//! # Design Philosophy
//!
//! This crate provides concrete implementations rather than abstract
//! traits wherever only one behavior exists. The host-specific adapters
//! (see `parquet-host-adapter`) implement the capability traits defined
//! here by forwarding to host function pointers.

pub mod encryption;
pub mod error;
pub mod kms;
pub mod reader;
pub mod sink;
pub mod source;
pub mod writer;

pub use encryption::{AadPrefixVerifier, CipherKind, FileDecryptionConfig, FileEncryptionConfig};
pub use error::{CoreError, Result};
pub use kms::{CryptoFactory, KmsClient, KmsClientFactory, KmsConnectionConfig};
pub use reader::{open_reader, NativeFileReader, ReaderConfig};
pub use sink::{OutputDest, SharedBuffer, StreamOutput};
pub use source::{InputSource, RandomAccessInput};
pub use writer::{close_writer, create_writer, NativeFileWriter};
