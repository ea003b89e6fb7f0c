//! Encryption through the exported catalog: explicit keys, managed key
//! retrievers, AAD verification and the KMS envelope.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use parquet_host_adapter::retriever::AesKeyMaterial;
use parquet_host_adapter::ExceptionSlot;
use parquet_native::buffer::BufferHandle;
use parquet_native::encryption;
use parquet_native::error::{ErrorInfo, ErrorInfo_Free, ErrorInfo_Kind, ErrorInfo_Message};
use parquet_native::io;
use parquet_native::kms;
use parquet_native::properties;
use parquet_native::reader;
use parquet_native::schema;
use parquet_native::writer;

const FOOTER_KEY: &[u8; 16] = b"0123456789abcdef";

fn ok(error: *mut ErrorInfo) {
    if !error.is_null() {
        let kind = unsafe { CStr::from_ptr(ErrorInfo_Kind(error)) }.to_string_lossy();
        let message = unsafe { CStr::from_ptr(ErrorInfo_Message(error)) }.to_string_lossy();
        panic!("unexpected error [{kind}] {message}");
    }
}

fn error_parts(error: *mut ErrorInfo) -> (String, String) {
    assert!(!error.is_null());
    let kind = unsafe { CStr::from_ptr(ErrorInfo_Kind(error)) }
        .to_string_lossy()
        .into_owned();
    let message = unsafe { CStr::from_ptr(ErrorInfo_Message(error)) }
        .to_string_lossy()
        .into_owned();
    unsafe { ErrorInfo_Free(error) };
    (kind, message)
}

unsafe fn int32_schema() -> *mut schema::NodeHandle {
    let mut value: *mut schema::NodeHandle = std::ptr::null_mut();
    let name = CString::new("value").unwrap();
    ok(schema::PrimitiveNode_Make(
        name.as_ptr(),
        0,
        std::ptr::null(),
        1, // INT32
        -1,
        -1,
        -1,
        &mut value,
    ));
    let fields = [value as *const schema::NodeHandle];
    let mut root: *mut schema::NodeHandle = std::ptr::null_mut();
    let name = CString::new("schema").unwrap();
    ok(schema::RootNode_Make(
        name.as_ptr(),
        fields.as_ptr(),
        1,
        &mut root,
    ));
    schema::Node_Free(value);
    root
}

/// Writes a small encrypted file and returns its bytes as a buffer
/// handle the caller frees.
unsafe fn write_encrypted(
    encryption_props: *const encryption::FileEncryptionPropertiesHandle,
) -> *mut BufferHandle {
    let root = int32_schema();

    let mut builder: *mut properties::WriterPropertiesBuilderHandle = std::ptr::null_mut();
    ok(properties::WriterPropertiesBuilder_Create(&mut builder));
    ok(properties::WriterPropertiesBuilder_Encryption(
        builder,
        encryption_props,
    ));
    let mut props: *mut properties::WriterPropertiesHandle = std::ptr::null_mut();
    ok(properties::WriterPropertiesBuilder_Build(builder, &mut props));
    properties::WriterPropertiesBuilder_Free(builder);

    let mut stream: *mut io::OutputStreamHandle = std::ptr::null_mut();
    ok(io::BufferOutputStream_Create(&mut stream));
    let mut file_writer: *mut writer::FileWriterHandle = std::ptr::null_mut();
    ok(writer::FileWriter_OpenStream(
        stream,
        root,
        props,
        &mut file_writer,
    ));

    let mut row_group: *mut writer::RowGroupWriterHandle = std::ptr::null_mut();
    ok(writer::FileWriter_AppendRowGroup(file_writer, &mut row_group));
    let mut column: *mut writer::ColumnWriterHandle = std::ptr::null_mut();
    ok(writer::RowGroupWriter_NextColumn(row_group, &mut column));
    let values = [7i32, 8, 9];
    let mut written = 0i64;
    ok(writer::TypedColumnWriter_WriteBatchInt32(
        column,
        values.as_ptr(),
        values.len() as i64,
        std::ptr::null(),
        std::ptr::null(),
        0,
        &mut written,
    ));
    ok(writer::ColumnWriter_Close(column));
    writer::ColumnWriter_Free(column);
    ok(writer::RowGroupWriter_Close(row_group));
    writer::RowGroupWriter_Free(row_group);
    ok(writer::FileWriter_Close(file_writer));
    writer::FileWriter_Free(file_writer);

    let mut bytes: *mut BufferHandle = std::ptr::null_mut();
    ok(io::BufferOutputStream_Finish(stream, &mut bytes));
    io::OutputStream_Free(stream);
    schema::Node_Free(root);
    properties::WriterProperties_Free(props);
    bytes
}

unsafe fn open_encrypted(
    bytes: *const BufferHandle,
    decryption: *const encryption::FileDecryptionPropertiesHandle,
) -> Result<i64, *mut ErrorInfo> {
    let mut input: *mut io::InputStreamHandle = std::ptr::null_mut();
    ok(io::BufferReader_Create(bytes, &mut input));

    let mut config: *mut properties::ReaderConfigHandle = std::ptr::null_mut();
    ok(properties::ReaderConfig_Create(&mut config));
    ok(properties::ReaderConfig_DecryptionProperties(
        config, decryption,
    ));

    let mut file_reader: *mut reader::FileReaderHandle = std::ptr::null_mut();
    let error = reader::FileReader_OpenStream(input, config, &mut file_reader);
    io::InputStream_Free(input);
    properties::ReaderConfig_Free(config);
    if !error.is_null() {
        return Err(error);
    }

    let mut metadata: *mut parquet_native::metadata::FileMetaDataHandle = std::ptr::null_mut();
    ok(reader::FileReader_Metadata(file_reader, &mut metadata));
    let mut num_rows = 0;
    ok(parquet_native::metadata::FileMetaData_NumRows(
        metadata, &mut num_rows,
    ));
    parquet_native::metadata::FileMetaData_Free(metadata);
    reader::FileReader_Free(file_reader);
    Ok(num_rows)
}

unsafe fn encryption_with_metadata(
    metadata: &[u8],
) -> *mut encryption::FileEncryptionPropertiesHandle {
    let mut builder: *mut encryption::FileEncryptionPropertiesBuilderHandle = std::ptr::null_mut();
    ok(encryption::FileEncryptionPropertiesBuilder_Create(
        FOOTER_KEY.as_ptr(),
        FOOTER_KEY.len() as u64,
        &mut builder,
    ));
    if !metadata.is_empty() {
        ok(encryption::FileEncryptionPropertiesBuilder_FooterKeyMetadata(
            builder,
            metadata.as_ptr(),
            metadata.len() as u64,
        ));
    }
    let mut props: *mut encryption::FileEncryptionPropertiesHandle = std::ptr::null_mut();
    ok(encryption::FileEncryptionPropertiesBuilder_Build(
        builder, &mut props,
    ));
    encryption::FileEncryptionPropertiesBuilder_Free(builder);
    props
}

// ---------------------------------------------------------------------
// Host callbacks
// ---------------------------------------------------------------------

static RELEASES: AtomicUsize = AtomicUsize::new(0);

unsafe extern "C" fn release(_h: *mut c_void) {
    RELEASES.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn get_key_k1(
    _h: *mut c_void,
    metadata: *const u8,
    metadata_len: u64,
    key: *mut AesKeyMaterial,
    slot: ExceptionSlot,
) {
    let metadata = std::slice::from_raw_parts(metadata, metadata_len as usize);
    if metadata == b"k1" {
        *key = AesKeyMaterial::from(&FOOTER_KEY[..]);
    } else {
        static MESSAGE: &[u8] = b"no key for that metadata\0";
        *slot = MESSAGE.as_ptr() as *const c_char;
    }
}

unsafe extern "C" fn verify_reject(
    _h: *mut c_void,
    _aad: *const u8,
    _len: u64,
    slot: ExceptionSlot,
) {
    static MESSAGE: &[u8] = b"AAD prefix rejected by host\0";
    *slot = MESSAGE.as_ptr() as *const c_char;
}

unsafe extern "C" fn verify_accept(
    _h: *mut c_void,
    _aad: *const u8,
    _len: u64,
    _slot: ExceptionSlot,
) {
}

static WRAPPED: Mutex<String> = Mutex::new(String::new());
static NEXT_CLIENT: AtomicUsize = AtomicUsize::new(0x1000);

unsafe extern "C" fn kms_create_client(
    _h: *mut c_void,
    _config: *const c_void,
    client_out: *mut *mut c_void,
    _slot: ExceptionSlot,
) {
    *client_out = NEXT_CLIENT.fetch_add(1, Ordering::SeqCst) as *mut c_void;
}

unsafe extern "C" fn kms_wrap(
    _h: *mut c_void,
    key: *const u8,
    key_len: u64,
    master: *const u8,
    master_len: u64,
    wrapped_out: *mut *const u8,
    wrapped_len_out: *mut u64,
    _slot: ExceptionSlot,
) {
    let key = std::slice::from_raw_parts(key, key_len as usize);
    let master = std::slice::from_raw_parts(master, master_len as usize);
    let mut text = format!("{}:", String::from_utf8_lossy(master));
    for b in key {
        text.push_str(&format!("{:02x}", b));
    }
    let mut guard = WRAPPED.lock().unwrap();
    *guard = text;
    *wrapped_out = guard.as_ptr();
    *wrapped_len_out = guard.len() as u64;
}

unsafe extern "C" fn kms_unwrap(
    _h: *mut c_void,
    wrapped: *const u8,
    wrapped_len: u64,
    master: *const u8,
    master_len: u64,
    key_out: *mut AesKeyMaterial,
    slot: ExceptionSlot,
) {
    let wrapped = std::slice::from_raw_parts(wrapped, wrapped_len as usize);
    let master = std::str::from_utf8(std::slice::from_raw_parts(master, master_len as usize));
    let text = String::from_utf8_lossy(wrapped);
    let parts = text.split_once(':');
    match (parts, master) {
        (Some((id, hex)), Ok(master)) if id == master => {
            let bytes: Vec<u8> = (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
                .collect();
            *key_out = AesKeyMaterial::from(bytes.as_slice());
        }
        _ => {
            static MESSAGE: &[u8] = b"wrapped key does not match master key\0";
            *slot = MESSAGE.as_ptr() as *const c_char;
        }
    }
}

// ---------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------

#[test]
fn explicit_footer_key_roundtrip() {
    unsafe {
        let encryption_props = encryption_with_metadata(b"");
        let bytes = write_encrypted(encryption_props);
        encryption::FileEncryptionProperties_Free(encryption_props);

        let mut builder: *mut encryption::FileDecryptionPropertiesBuilderHandle =
            std::ptr::null_mut();
        ok(encryption::FileDecryptionPropertiesBuilder_Create(&mut builder));
        ok(encryption::FileDecryptionPropertiesBuilder_FooterKey(
            builder,
            FOOTER_KEY.as_ptr(),
            FOOTER_KEY.len() as u64,
        ));
        let mut decryption: *mut encryption::FileDecryptionPropertiesHandle = std::ptr::null_mut();
        ok(encryption::FileDecryptionPropertiesBuilder_Build(
            builder,
            &mut decryption,
        ));
        encryption::FileDecryptionPropertiesBuilder_Free(builder);

        assert_eq!(open_encrypted(bytes, decryption).unwrap(), 3);
        encryption::FileDecryptionProperties_Free(decryption);
        parquet_native::buffer::Buffer_Free(bytes);
    }
}

#[test]
fn managed_key_retriever_succeeds_for_known_metadata() {
    unsafe {
        let encryption_props = encryption_with_metadata(b"k1");
        let bytes = write_encrypted(encryption_props);
        encryption::FileEncryptionProperties_Free(encryption_props);

        let mut builder: *mut encryption::FileDecryptionPropertiesBuilderHandle =
            std::ptr::null_mut();
        ok(encryption::FileDecryptionPropertiesBuilder_Create(&mut builder));
        ok(encryption::FileDecryptionPropertiesBuilder_KeyRetriever(
            builder,
            0x11 as *mut c_void,
            release,
            get_key_k1,
        ));
        let mut decryption: *mut encryption::FileDecryptionPropertiesHandle = std::ptr::null_mut();
        ok(encryption::FileDecryptionPropertiesBuilder_Build(
            builder,
            &mut decryption,
        ));
        encryption::FileDecryptionPropertiesBuilder_Free(builder);

        assert_eq!(open_encrypted(bytes, decryption).unwrap(), 3);
        encryption::FileDecryptionProperties_Free(decryption);
        parquet_native::buffer::Buffer_Free(bytes);
    }
}

#[test]
fn managed_key_retriever_fails_with_host_message_for_unknown_metadata() {
    unsafe {
        let encryption_props = encryption_with_metadata(b"bogus");
        let bytes = write_encrypted(encryption_props);
        encryption::FileEncryptionProperties_Free(encryption_props);

        let mut builder: *mut encryption::FileDecryptionPropertiesBuilderHandle =
            std::ptr::null_mut();
        ok(encryption::FileDecryptionPropertiesBuilder_Create(&mut builder));
        ok(encryption::FileDecryptionPropertiesBuilder_KeyRetriever(
            builder,
            0x12 as *mut c_void,
            release,
            get_key_k1,
        ));
        let mut decryption: *mut encryption::FileDecryptionPropertiesHandle = std::ptr::null_mut();
        ok(encryption::FileDecryptionPropertiesBuilder_Build(
            builder,
            &mut decryption,
        ));
        encryption::FileDecryptionPropertiesBuilder_Free(builder);

        let error = open_encrypted(bytes, decryption).unwrap_err();
        let (kind, message) = error_parts(error);
        assert_eq!(kind, "ParquetException");
        assert!(message.contains("no key for that metadata"));
        encryption::FileDecryptionProperties_Free(decryption);
        parquet_native::buffer::Buffer_Free(bytes);
    }
}

#[test]
fn aad_verifier_gates_reader_open() {
    unsafe {
        let encryption_props = encryption_with_metadata(b"");
        let bytes = write_encrypted(encryption_props);
        encryption::FileEncryptionProperties_Free(encryption_props);

        // Rejecting verifier: the open must fail with the host's text.
        let mut builder: *mut encryption::FileDecryptionPropertiesBuilderHandle =
            std::ptr::null_mut();
        ok(encryption::FileDecryptionPropertiesBuilder_Create(&mut builder));
        ok(encryption::FileDecryptionPropertiesBuilder_FooterKey(
            builder,
            FOOTER_KEY.as_ptr(),
            FOOTER_KEY.len() as u64,
        ));
        ok(encryption::FileDecryptionPropertiesBuilder_AadPrefixVerifier(
            builder,
            0x21 as *mut c_void,
            release,
            verify_reject,
        ));
        let mut decryption: *mut encryption::FileDecryptionPropertiesHandle = std::ptr::null_mut();
        ok(encryption::FileDecryptionPropertiesBuilder_Build(
            builder,
            &mut decryption,
        ));
        encryption::FileDecryptionPropertiesBuilder_Free(builder);
        let error = open_encrypted(bytes, decryption).unwrap_err();
        let (kind, message) = error_parts(error);
        assert_eq!(kind, "HostException");
        assert_eq!(message, "AAD prefix rejected by host");
        encryption::FileDecryptionProperties_Free(decryption);

        // Accepting verifier: the same file opens.
        let mut builder: *mut encryption::FileDecryptionPropertiesBuilderHandle =
            std::ptr::null_mut();
        ok(encryption::FileDecryptionPropertiesBuilder_Create(&mut builder));
        ok(encryption::FileDecryptionPropertiesBuilder_FooterKey(
            builder,
            FOOTER_KEY.as_ptr(),
            FOOTER_KEY.len() as u64,
        ));
        ok(encryption::FileDecryptionPropertiesBuilder_AadPrefixVerifier(
            builder,
            0x22 as *mut c_void,
            release,
            verify_accept,
        ));
        let mut decryption: *mut encryption::FileDecryptionPropertiesHandle = std::ptr::null_mut();
        ok(encryption::FileDecryptionPropertiesBuilder_Build(
            builder,
            &mut decryption,
        ));
        encryption::FileDecryptionPropertiesBuilder_Free(builder);
        assert_eq!(open_encrypted(bytes, decryption).unwrap(), 3);
        encryption::FileDecryptionProperties_Free(decryption);
        parquet_native::buffer::Buffer_Free(bytes);
    }
}

#[test]
fn kms_envelope_roundtrip_through_catalog() {
    unsafe {
        let mut factory: *mut kms::CryptoFactoryHandle = std::ptr::null_mut();
        ok(kms::CryptoFactory_Create(&mut factory));
        ok(kms::CryptoFactory_RegisterKmsClientFactory(
            factory,
            0x31 as *mut c_void,
            release,
            kms_create_client,
            kms_wrap,
            kms_unwrap,
        ));

        let mut connection: *const parquet_native_core::kms::KmsConnectionConfig =
            std::ptr::null();
        ok(kms::KmsConnectionConfig_Create(&mut connection));
        let url = CString::new("https://kms.example.test").unwrap();
        ok(kms::KmsConnectionConfig_SetKmsInstanceUrl(
            connection,
            url.as_ptr(),
        ));

        let footer_key_id = CString::new("master-1").unwrap();
        let mut enc_config: *mut kms::EncryptionConfigurationHandle = std::ptr::null_mut();
        ok(kms::EncryptionConfiguration_Create(
            footer_key_id.as_ptr(),
            &mut enc_config,
        ));

        let mut encryption_props: *mut encryption::FileEncryptionPropertiesHandle =
            std::ptr::null_mut();
        ok(kms::CryptoFactory_FileEncryptionProperties(
            factory,
            connection,
            enc_config,
            &mut encryption_props,
        ));
        let bytes = write_encrypted(encryption_props);
        encryption::FileEncryptionProperties_Free(encryption_props);

        let mut dec_config: *mut kms::DecryptionConfigurationHandle = std::ptr::null_mut();
        ok(kms::DecryptionConfiguration_Create(&mut dec_config));
        let mut decryption: *mut encryption::FileDecryptionPropertiesHandle = std::ptr::null_mut();
        ok(kms::CryptoFactory_FileDecryptionProperties(
            factory,
            connection,
            dec_config,
            &mut decryption,
        ));
        assert_eq!(open_encrypted(bytes, decryption).unwrap(), 3);

        encryption::FileDecryptionProperties_Free(decryption);
        kms::DecryptionConfiguration_Free(dec_config);
        kms::EncryptionConfiguration_Free(enc_config);
        kms::KmsConnectionConfig_Free(connection);
        kms::CryptoFactory_Free(factory);
        parquet_native::buffer::Buffer_Free(bytes);
    }
}
