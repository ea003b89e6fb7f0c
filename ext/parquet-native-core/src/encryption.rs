//! Configuration models for the engine's modular encryption
//!
//! The C catalog builds these models field by field and only translates
//! them into engine properties when a reader or writer is opened. Keys are
//! raw AES key bytes (16, 24 or 32 of them); key metadata is an opaque
//! byte string the engine stores in the footer and hands back to the key
//! retriever on read.

use std::sync::Arc;

use parquet::encryption::decrypt::{FileDecryptionProperties, KeyRetriever};
use parquet::encryption::encrypt::FileEncryptionProperties;

use crate::{CoreError, Result};

/// Parquet modular encryption ciphers.
///
/// The engine implements AES-GCM only; GCM-CTR keeps its ABI value but is
/// rejected at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CipherKind {
    #[default]
    AesGcmV1,
    AesGcmCtrV1,
}

/// Checks an AES key length (128, 192 or 256 bits).
pub fn check_key_length(key: &[u8]) -> Result<()> {
    match key.len() {
        16 | 24 | 32 => Ok(()),
        n => Err(CoreError::length(format!(
            "encryption keys must be 16, 24 or 32 bytes, got {n}"
        ))),
    }
}

/// Per-column encryption key
#[derive(Debug, Clone)]
pub struct ColumnKey {
    pub path: String,
    pub key: Vec<u8>,
    pub key_metadata: Option<Vec<u8>>,
}

/// Accumulates file encryption settings before they become engine
/// properties.
#[derive(Debug, Clone)]
pub struct FileEncryptionConfig {
    footer_key: Vec<u8>,
    footer_key_metadata: Option<Vec<u8>>,
    plaintext_footer: bool,
    cipher: CipherKind,
    aad_prefix: Option<Vec<u8>>,
    store_aad_prefix: bool,
    column_keys: Vec<ColumnKey>,
}

impl FileEncryptionConfig {
    pub fn new(footer_key: Vec<u8>) -> Result<Self> {
        check_key_length(&footer_key)?;
        Ok(Self {
            footer_key,
            footer_key_metadata: None,
            plaintext_footer: false,
            cipher: CipherKind::default(),
            aad_prefix: None,
            store_aad_prefix: false,
            column_keys: Vec::new(),
        })
    }

    pub fn set_footer_key_metadata(&mut self, metadata: Vec<u8>) {
        self.footer_key_metadata = Some(metadata);
    }

    pub fn set_plaintext_footer(&mut self, plaintext: bool) {
        self.plaintext_footer = plaintext;
    }

    pub fn set_cipher(&mut self, cipher: CipherKind) {
        self.cipher = cipher;
    }

    pub fn set_aad_prefix(&mut self, aad_prefix: Vec<u8>) {
        self.aad_prefix = Some(aad_prefix);
    }

    pub fn set_store_aad_prefix(&mut self, store: bool) {
        self.store_aad_prefix = store;
    }

    pub fn add_column_key(&mut self, column: ColumnKey) -> Result<()> {
        check_key_length(&column.key)?;
        self.column_keys.push(column);
        Ok(())
    }

    pub fn footer_key(&self) -> &[u8] {
        &self.footer_key
    }

    pub fn footer_key_metadata(&self) -> Option<&[u8]> {
        self.footer_key_metadata.as_deref()
    }

    pub fn plaintext_footer(&self) -> bool {
        self.plaintext_footer
    }

    pub fn cipher(&self) -> CipherKind {
        self.cipher
    }

    pub fn aad_prefix(&self) -> Option<&[u8]> {
        self.aad_prefix.as_deref()
    }

    pub fn store_aad_prefix(&self) -> bool {
        self.store_aad_prefix
    }

    pub fn column_keys(&self) -> &[ColumnKey] {
        &self.column_keys
    }

    /// Translate into engine file encryption properties.
    pub fn build(&self) -> Result<FileEncryptionProperties> {
        if self.cipher == CipherKind::AesGcmCtrV1 {
            return Err(CoreError::unsupported(
                "the engine implements AES_GCM_V1 only; AES_GCM_CTR_V1 is not available",
            ));
        }
        let mut builder = FileEncryptionProperties::builder(self.footer_key.clone());
        if let Some(metadata) = &self.footer_key_metadata {
            builder = builder.with_footer_key_metadata(metadata.clone());
        }
        builder = builder.with_plaintext_footer(self.plaintext_footer);
        if let Some(aad) = &self.aad_prefix {
            builder = builder
                .with_aad_prefix(aad.clone())
                .with_aad_prefix_storage(self.store_aad_prefix);
        }
        for column in &self.column_keys {
            if column.key_metadata.is_some() {
                return Err(CoreError::unsupported(
                    "the engine does not store per-column key metadata",
                ));
            }
            builder = builder.with_column_key(column.path.as_str(), column.key.clone());
        }
        Ok(builder.build()?)
    }
}

/// Validates the AAD prefix of a file about to be decrypted.
///
/// Invoked synchronously while opening a reader, before decryption
/// properties reach the engine. An error aborts the open.
pub trait AadPrefixVerifier: Send + Sync {
    fn verify(&self, aad_prefix: &[u8]) -> Result<()>;
}

/// Accumulates file decryption settings before they become engine
/// properties.
#[derive(Clone, Default)]
pub struct FileDecryptionConfig {
    footer_key: Option<Vec<u8>>,
    column_keys: Vec<(String, Vec<u8>)>,
    aad_prefix: Option<Vec<u8>>,
    retriever: Option<Arc<dyn KeyRetriever>>,
    verifier: Option<Arc<dyn AadPrefixVerifier>>,
}

impl FileDecryptionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_footer_key(&mut self, key: Vec<u8>) -> Result<()> {
        check_key_length(&key)?;
        self.footer_key = Some(key);
        Ok(())
    }

    pub fn add_column_key(&mut self, path: String, key: Vec<u8>) -> Result<()> {
        check_key_length(&key)?;
        self.column_keys.push((path, key));
        Ok(())
    }

    pub fn set_aad_prefix(&mut self, aad_prefix: Vec<u8>) {
        self.aad_prefix = Some(aad_prefix);
    }

    /// Register (or with `None` clear) the key retriever.
    pub fn set_key_retriever(&mut self, retriever: Option<Arc<dyn KeyRetriever>>) {
        self.retriever = retriever;
    }

    /// Register (or with `None` clear) the AAD prefix verifier.
    pub fn set_aad_prefix_verifier(&mut self, verifier: Option<Arc<dyn AadPrefixVerifier>>) {
        self.verifier = verifier;
    }

    pub fn footer_key(&self) -> Option<&[u8]> {
        self.footer_key.as_deref()
    }

    pub fn aad_prefix(&self) -> Option<&[u8]> {
        self.aad_prefix.as_deref()
    }

    pub fn has_key_retriever(&self) -> bool {
        self.retriever.is_some()
    }

    pub fn has_aad_prefix_verifier(&self) -> bool {
        self.verifier.is_some()
    }

    /// Run the registered AAD verifier against the configured prefix.
    pub fn verify_aad(&self) -> Result<()> {
        if let Some(verifier) = &self.verifier {
            verifier.verify(self.aad_prefix.as_deref().unwrap_or_default())?;
        }
        Ok(())
    }

    /// Translate into engine file decryption properties.
    pub fn build(&self) -> Result<FileDecryptionProperties> {
        let mut builder = match (&self.retriever, &self.footer_key) {
            (Some(retriever), _) => {
                FileDecryptionProperties::with_key_retriever(Arc::clone(retriever))
            }
            (None, Some(key)) => FileDecryptionProperties::builder(key.clone()),
            (None, None) => {
                return Err(CoreError::invalid_argument(
                    "decryption requires a footer key or a key retriever",
                ))
            }
        };
        for (path, key) in &self.column_keys {
            builder = builder.with_column_key(path.as_str(), key.clone());
        }
        if let Some(aad) = &self.aad_prefix {
            builder = builder.with_aad_prefix(aad.clone());
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_length_validation() {
        assert!(check_key_length(&[0u8; 16]).is_ok());
        assert!(check_key_length(&[0u8; 24]).is_ok());
        assert!(check_key_length(&[0u8; 32]).is_ok());
        let err = check_key_length(&[0u8; 20]).unwrap_err();
        assert_eq!(err.kind(), "LengthException");
    }

    #[test]
    fn test_ctr_cipher_rejected() {
        let mut config = FileEncryptionConfig::new(vec![0u8; 16]).unwrap();
        config.set_cipher(CipherKind::AesGcmCtrV1);
        let err = config.build().unwrap_err();
        assert_eq!(err.kind(), "NotSupportedException");
    }

    #[test]
    fn test_encryption_config_builds() {
        let mut config = FileEncryptionConfig::new(vec![7u8; 16]).unwrap();
        config.set_footer_key_metadata(b"footer-key-id".to_vec());
        config.set_aad_prefix(b"my-file".to_vec());
        config.set_store_aad_prefix(true);
        config
            .add_column_key(ColumnKey {
                path: "secret".into(),
                key: vec![1u8; 16],
                key_metadata: None,
            })
            .unwrap();
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_decryption_needs_key_or_retriever() {
        let config = FileDecryptionConfig::new();
        let err = config.build().unwrap_err();
        assert_eq!(err.kind(), "ArgumentException");
    }

    struct RejectingVerifier;

    impl AadPrefixVerifier for RejectingVerifier {
        fn verify(&self, aad_prefix: &[u8]) -> Result<()> {
            Err(CoreError::host(format!(
                "unexpected AAD prefix: {:?}",
                aad_prefix
            )))
        }
    }

    #[test]
    fn test_verifier_failure_propagates() {
        let mut config = FileDecryptionConfig::new();
        config.set_footer_key(vec![0u8; 16]).unwrap();
        config.set_aad_prefix(b"abc".to_vec());
        config.set_aad_prefix_verifier(Some(Arc::new(RejectingVerifier)));
        let err = config.verify_aad().unwrap_err();
        assert!(err.to_string().contains("unexpected AAD prefix"));
    }
}
