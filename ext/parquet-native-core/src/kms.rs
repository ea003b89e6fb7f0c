//! Key-management envelope over host KMS clients
//!
//! The host supplies wrap/unwrap behavior through a [`KmsClientFactory`];
//! the [`CryptoFactory`] turns that capability into engine encryption and
//! decryption properties. On write it generates a fresh data key, has the
//! KMS wrap it and stores the resulting key material as footer key
//! metadata; on read a [`KeyRetriever`] parses the material back and asks
//! the KMS to unwrap it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use parquet::encryption::decrypt::KeyRetriever;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::encryption::{CipherKind, FileDecryptionConfig, FileEncryptionConfig};
use crate::{CoreError, Result};

/// A client able to wrap and unwrap data keys with a master key.
///
/// Wrapped keys are opaque printable strings produced by the client; the
/// shim never interprets them.
pub trait KmsClient: Send + Sync {
    fn wrap_key(&self, key_bytes: &[u8], master_key_identifier: &str) -> Result<String>;
    fn unwrap_key(&self, wrapped_key: &str, master_key_identifier: &str) -> Result<Vec<u8>>;
}

/// Manufactures KMS clients for a connection configuration.
pub trait KmsClientFactory: Send + Sync {
    fn create_client(&self, config: &KmsConnectionConfig) -> Result<Arc<dyn KmsClient>>;
}

#[derive(Default, Clone)]
struct KmsConnectionInner {
    kms_instance_id: String,
    kms_instance_url: String,
    key_access_token: String,
    custom_kms_conf: HashMap<String, String>,
}

/// Connection settings handed to the client factory.
///
/// All fields are interiorly mutable so the host can refresh the access
/// token on a configuration the engine already holds.
#[derive(Default)]
pub struct KmsConnectionConfig {
    inner: RwLock<KmsConnectionInner>,
}

impl KmsConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kms_instance_id(&self) -> String {
        self.read().kms_instance_id.clone()
    }

    pub fn set_kms_instance_id(&self, id: String) {
        self.write().kms_instance_id = id;
    }

    pub fn kms_instance_url(&self) -> String {
        self.read().kms_instance_url.clone()
    }

    pub fn set_kms_instance_url(&self, url: String) {
        self.write().kms_instance_url = url;
    }

    pub fn key_access_token(&self) -> String {
        self.read().key_access_token.clone()
    }

    /// Replace the access token in place.
    pub fn refresh_key_access_token(&self, token: String) {
        self.write().key_access_token = token;
    }

    pub fn custom_kms_conf(&self) -> HashMap<String, String> {
        self.read().custom_kms_conf.clone()
    }

    pub fn set_custom_kms_conf(&self, conf: HashMap<String, String>) {
        self.write().custom_kms_conf = conf;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, KmsConnectionInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, KmsConnectionInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// File encryption settings resolved through KMS master keys
#[derive(Debug, Clone)]
pub struct EncryptionConfiguration {
    footer_key_id: String,
    uniform_encryption: bool,
    plaintext_footer: bool,
    cipher: CipherKind,
    data_key_length_bits: u32,
    column_key_ids: Vec<(String, Vec<String>)>,
}

impl EncryptionConfiguration {
    pub fn new(footer_key_id: String) -> Self {
        Self {
            footer_key_id,
            uniform_encryption: true,
            plaintext_footer: false,
            cipher: CipherKind::default(),
            data_key_length_bits: 128,
            column_key_ids: Vec::new(),
        }
    }

    pub fn footer_key_id(&self) -> &str {
        &self.footer_key_id
    }

    pub fn set_footer_key_id(&mut self, id: String) {
        self.footer_key_id = id;
    }

    pub fn uniform_encryption(&self) -> bool {
        self.uniform_encryption
    }

    pub fn set_uniform_encryption(&mut self, uniform: bool) {
        self.uniform_encryption = uniform;
    }

    pub fn plaintext_footer(&self) -> bool {
        self.plaintext_footer
    }

    pub fn set_plaintext_footer(&mut self, plaintext: bool) {
        self.plaintext_footer = plaintext;
    }

    pub fn cipher(&self) -> CipherKind {
        self.cipher
    }

    pub fn set_cipher(&mut self, cipher: CipherKind) {
        self.cipher = cipher;
    }

    pub fn data_key_length_bits(&self) -> u32 {
        self.data_key_length_bits
    }

    pub fn set_data_key_length_bits(&mut self, bits: u32) -> Result<()> {
        match bits {
            128 | 192 | 256 => {
                self.data_key_length_bits = bits;
                Ok(())
            }
            _ => Err(CoreError::length(format!(
                "data key length must be 128, 192 or 256 bits, got {bits}"
            ))),
        }
    }

    /// Associate columns with a master key identifier.
    pub fn add_column_key_id(&mut self, master_key_id: String, columns: Vec<String>) {
        self.column_key_ids.push((master_key_id, columns));
    }

    pub fn column_key_ids(&self) -> &[(String, Vec<String>)] {
        &self.column_key_ids
    }
}

/// File decryption settings for KMS-managed keys
#[derive(Debug, Clone, Default)]
pub struct DecryptionConfiguration {
    aad_prefix: Option<Vec<u8>>,
}

impl DecryptionConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aad_prefix(&self) -> Option<&[u8]> {
        self.aad_prefix.as_deref()
    }

    pub fn set_aad_prefix(&mut self, aad_prefix: Vec<u8>) {
        self.aad_prefix = Some(aad_prefix);
    }
}

/// Key material stored as footer key metadata.
///
/// Single wrapping: the data key is wrapped directly by the master key
/// named here.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyMaterial {
    key_material_type: String,
    is_footer_key: bool,
    master_key_id: String,
    wrapped_dek: String,
}

const KEY_MATERIAL_TYPE: &str = "PKMT1";

/// Builds engine encryption and decryption properties from a registered
/// KMS client factory.
#[derive(Default)]
pub struct CryptoFactory {
    factory: RwLock<Option<Arc<dyn KmsClientFactory>>>,
}

impl CryptoFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or with `None` clear) the KMS client factory.
    pub fn register_kms_client_factory(&self, factory: Option<Arc<dyn KmsClientFactory>>) {
        *self.factory.write().unwrap_or_else(|e| e.into_inner()) = factory;
    }

    fn client(&self, config: &KmsConnectionConfig) -> Result<Arc<dyn KmsClient>> {
        let factory = self
            .factory
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| {
                CoreError::invalid_argument("no KMS client factory has been registered")
            })?;
        factory.create_client(config)
    }

    /// Generate and wrap a data key, producing encryption settings for a
    /// new file.
    pub fn file_encryption_properties(
        &self,
        connection: &KmsConnectionConfig,
        config: &EncryptionConfiguration,
    ) -> Result<FileEncryptionConfig> {
        if !config.uniform_encryption() || !config.column_key_ids().is_empty() {
            return Err(CoreError::unsupported(
                "KMS-managed column keys are not available; use uniform encryption \
                 or explicit column keys",
            ));
        }
        let client = self.client(connection)?;

        let mut data_key = vec![0u8; config.data_key_length_bits() as usize / 8];
        rand::rng().fill_bytes(&mut data_key);

        let wrapped = client.wrap_key(&data_key, config.footer_key_id())?;
        let material = KeyMaterial {
            key_material_type: KEY_MATERIAL_TYPE.to_string(),
            is_footer_key: true,
            master_key_id: config.footer_key_id().to_string(),
            wrapped_dek: wrapped,
        };
        let metadata = serde_json::to_vec(&material)
            .map_err(|e| CoreError::Unknown(format!("key material serialization: {e}")))?;

        let mut properties = FileEncryptionConfig::new(data_key)?;
        properties.set_footer_key_metadata(metadata);
        properties.set_plaintext_footer(config.plaintext_footer());
        properties.set_cipher(config.cipher());
        Ok(properties)
    }

    /// Produce decryption settings whose key retriever unwraps key
    /// material through the registered factory.
    pub fn file_decryption_properties(
        &self,
        connection: &KmsConnectionConfig,
        config: &DecryptionConfiguration,
    ) -> Result<FileDecryptionConfig> {
        let client = self.client(connection)?;
        let mut properties = FileDecryptionConfig::new();
        properties.set_key_retriever(Some(Arc::new(KmsKeyRetriever { client })));
        if let Some(aad) = config.aad_prefix() {
            properties.set_aad_prefix(aad.to_vec());
        }
        Ok(properties)
    }
}

struct KmsKeyRetriever {
    client: Arc<dyn KmsClient>,
}

impl KeyRetriever for KmsKeyRetriever {
    fn retrieve_key(&self, key_metadata: &[u8]) -> parquet::errors::Result<Vec<u8>> {
        let material: KeyMaterial = serde_json::from_slice(key_metadata).map_err(|e| {
            parquet::errors::ParquetError::General(format!("malformed key material: {e}"))
        })?;
        if material.key_material_type != KEY_MATERIAL_TYPE {
            return Err(parquet::errors::ParquetError::General(format!(
                "unsupported key material type {:?}",
                material.key_material_type
            )));
        }
        let key = self
            .client
            .unwrap_key(&material.wrapped_dek, &material.master_key_id)
            .map_err(|e| parquet::errors::ParquetError::External(Box::new(e)))?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reversible stand-in for a real KMS: base64 payload tagged with the
    /// master key id.
    pub struct EchoKmsClient {
        pub wraps: AtomicUsize,
        pub unwraps: AtomicUsize,
    }

    impl KmsClient for EchoKmsClient {
        fn wrap_key(&self, key_bytes: &[u8], master_key_identifier: &str) -> Result<String> {
            self.wraps.fetch_add(1, Ordering::SeqCst);
            let encoded = base64::engine::general_purpose::STANDARD.encode(key_bytes);
            Ok(format!("{master_key_identifier}:{encoded}"))
        }

        fn unwrap_key(&self, wrapped_key: &str, master_key_identifier: &str) -> Result<Vec<u8>> {
            self.unwraps.fetch_add(1, Ordering::SeqCst);
            let (master, encoded) = wrapped_key
                .split_once(':')
                .ok_or_else(|| CoreError::host("malformed wrapped key"))?;
            if master != master_key_identifier {
                return Err(CoreError::host(format!(
                    "wrapped key belongs to {master}, not {master_key_identifier}"
                )));
            }
            base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| CoreError::host(e.to_string()))
        }
    }

    struct EchoFactory {
        created: AtomicUsize,
    }

    impl KmsClientFactory for EchoFactory {
        fn create_client(&self, _config: &KmsConnectionConfig) -> Result<Arc<dyn KmsClient>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(EchoKmsClient {
                wraps: AtomicUsize::new(0),
                unwraps: AtomicUsize::new(0),
            }))
        }
    }

    #[test]
    fn test_envelope_roundtrip() {
        let factory = CryptoFactory::new();
        factory.register_kms_client_factory(Some(Arc::new(EchoFactory {
            created: AtomicUsize::new(0),
        })));
        let connection = KmsConnectionConfig::new();
        let config = EncryptionConfiguration::new("master-1".into());

        let encryption = factory
            .file_encryption_properties(&connection, &config)
            .unwrap();
        let metadata = encryption.footer_key_metadata().unwrap().to_vec();
        let data_key = encryption.footer_key().to_vec();
        assert_eq!(data_key.len(), 16);

        let decryption = factory
            .file_decryption_properties(&connection, &DecryptionConfiguration::new())
            .unwrap();
        assert!(decryption.has_key_retriever());

        // Unwrap through the retriever the factory installed.
        let client = factory.client(&connection).unwrap();
        let retriever = KmsKeyRetriever { client };
        let recovered = retriever.retrieve_key(&metadata).unwrap();
        assert_eq!(recovered, data_key);
    }

    #[test]
    fn test_unregistered_factory_is_an_error() {
        let factory = CryptoFactory::new();
        let connection = KmsConnectionConfig::new();
        let err = factory
            .file_decryption_properties(&connection, &DecryptionConfiguration::new())
            .unwrap_err();
        assert_eq!(err.kind(), "ArgumentException");
    }

    #[test]
    fn test_kms_column_keys_rejected() {
        let factory = CryptoFactory::new();
        factory.register_kms_client_factory(Some(Arc::new(EchoFactory {
            created: AtomicUsize::new(0),
        })));
        let connection = KmsConnectionConfig::new();
        let mut config = EncryptionConfiguration::new("master-1".into());
        config.add_column_key_id("master-2".into(), vec!["secret".into()]);
        let err = factory
            .file_encryption_properties(&connection, &config)
            .unwrap_err();
        assert_eq!(err.kind(), "NotSupportedException");
    }

    #[test]
    fn test_token_refresh_visible_through_shared_config() {
        let config = Arc::new(KmsConnectionConfig::new());
        config.refresh_key_access_token("t1".into());
        let shared = Arc::clone(&config);
        assert_eq!(shared.key_access_token(), "t1");
        config.refresh_key_access_token("t2".into());
        assert_eq!(shared.key_access_token(), "t2");
    }

    #[test]
    fn test_data_key_length_validation() {
        let mut config = EncryptionConfiguration::new("m".into());
        assert!(config.set_data_key_length_bits(256).is_ok());
        assert!(config.set_data_key_length_bits(100).is_err());
    }
}
