//! Opening file readers over any input source

use std::sync::Arc;

use parquet::file::serialized_reader::{ReadOptionsBuilder, SerializedFileReader};

use crate::encryption::FileDecryptionConfig;
use crate::source::InputSource;
use crate::Result;

/// The reader type behind every file reader handle
pub type NativeFileReader = SerializedFileReader<InputSource>;

/// Options applied when opening a reader
#[derive(Clone, Default)]
pub struct ReaderConfig {
    decryption: Option<Arc<FileDecryptionConfig>>,
    read_page_index: bool,
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_decryption(&mut self, decryption: Option<Arc<FileDecryptionConfig>>) {
        self.decryption = decryption;
    }

    pub fn decryption(&self) -> Option<&Arc<FileDecryptionConfig>> {
        self.decryption.as_ref()
    }

    pub fn set_read_page_index(&mut self, enabled: bool) {
        self.read_page_index = enabled;
    }

    pub fn read_page_index(&self) -> bool {
        self.read_page_index
    }
}

/// Open a reader, verifying the AAD prefix first when a verifier is
/// registered on the decryption configuration.
pub fn open_reader(source: InputSource, config: &ReaderConfig) -> Result<NativeFileReader> {
    let mut options = ReadOptionsBuilder::new();
    if config.read_page_index {
        options = options.with_page_index();
    }
    if let Some(decryption) = &config.decryption {
        decryption.verify_aad()?;
        options = options.with_file_decryption_properties(decryption.build()?);
    }
    Ok(SerializedFileReader::new_with_options(
        source,
        options.build(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_open_garbage_is_engine_error() {
        let source = InputSource::from_bytes(Bytes::from_static(b"not a parquet file"));
        let err = open_reader(source, &ReaderConfig::new()).unwrap_err();
        assert_eq!(err.kind(), "ParquetException");
        assert!(!err.to_string().is_empty());
    }
}
