//! Drives the exported catalog the way a managed host would: build a
//! schema, write through a buffer stream, read everything back.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use parquet_native::buffer::{BufferHandle, FfiByteSpan};
use parquet_native::error::{ErrorInfo, ErrorInfo_Free, ErrorInfo_Kind, ErrorInfo_Message};
use parquet_native::io;
use parquet_native::metadata;
use parquet_native::properties;
use parquet_native::reader;
use parquet_native::schema;
use parquet_native::strings::ParquetString_Free;
use parquet_native::writer;

fn ok(error: *mut ErrorInfo) {
    if !error.is_null() {
        let kind = unsafe { CStr::from_ptr(ErrorInfo_Kind(error)) }.to_string_lossy();
        let message = unsafe { CStr::from_ptr(ErrorInfo_Message(error)) }.to_string_lossy();
        panic!("unexpected error [{kind}] {message}");
    }
}

fn take_string(ptr: *mut c_char) -> String {
    assert!(!ptr.is_null());
    let value = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    unsafe { ParquetString_Free(ptr) };
    value
}

unsafe fn build_schema() -> *mut schema::NodeHandle {
    let mut id: *mut schema::NodeHandle = std::ptr::null_mut();
    let name = CString::new("id").unwrap();
    ok(schema::PrimitiveNode_Make(
        name.as_ptr(),
        0, // required
        std::ptr::null(),
        2, // INT64
        -1,
        -1,
        -1,
        &mut id,
    ));

    let mut string_type: *mut schema::LogicalTypeHandle = std::ptr::null_mut();
    ok(schema::LogicalType_String(&mut string_type));
    let mut label: *mut schema::NodeHandle = std::ptr::null_mut();
    let name = CString::new("label").unwrap();
    ok(schema::PrimitiveNode_Make(
        name.as_ptr(),
        1, // optional
        string_type,
        6, // BYTE_ARRAY
        -1,
        -1,
        -1,
        &mut label,
    ));
    schema::LogicalType_Free(string_type);

    let fields = [id as *const schema::NodeHandle, label as *const _];
    let mut root: *mut schema::NodeHandle = std::ptr::null_mut();
    let name = CString::new("schema").unwrap();
    ok(schema::RootNode_Make(
        name.as_ptr(),
        fields.as_ptr(),
        fields.len() as i64,
        &mut root,
    ));
    schema::Node_Free(id);
    schema::Node_Free(label);
    root
}

#[test]
fn catalog_write_and_read_back() {
    unsafe {
        let root = build_schema();

        // Writer properties: snappy, page statistics, created-by tag.
        let mut builder: *mut properties::WriterPropertiesBuilderHandle = std::ptr::null_mut();
        ok(properties::WriterPropertiesBuilder_Create(&mut builder));
        ok(properties::WriterPropertiesBuilder_Compression(builder, 1, -1));
        ok(properties::WriterPropertiesBuilder_StatisticsEnabled(builder, 2));
        let created_by = CString::new("parquet-native catalog test").unwrap();
        ok(properties::WriterPropertiesBuilder_CreatedBy(
            builder,
            created_by.as_ptr(),
        ));
        let mut props: *mut properties::WriterPropertiesHandle = std::ptr::null_mut();
        ok(properties::WriterPropertiesBuilder_Build(builder, &mut props));
        properties::WriterPropertiesBuilder_Free(builder);

        // Write one row group through an in-memory output stream.
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
        let ids = [11i64, 22, 33];
        let mut written = 0i64;
        ok(writer::TypedColumnWriter_WriteBatchInt64(
            column,
            ids.as_ptr(),
            ids.len() as i64,
            std::ptr::null(),
            std::ptr::null(),
            0,
            &mut written,
        ));
        assert_eq!(written, 3);
        ok(writer::ColumnWriter_Close(column));
        writer::ColumnWriter_Free(column);

        let mut column: *mut writer::ColumnWriterHandle = std::ptr::null_mut();
        ok(writer::RowGroupWriter_NextColumn(row_group, &mut column));
        let alpha = b"alpha";
        let gamma = b"gamma";
        let labels = [
            FfiByteSpan {
                data: alpha.as_ptr(),
                len: alpha.len() as i32,
            },
            FfiByteSpan {
                data: gamma.as_ptr(),
                len: gamma.len() as i32,
            },
        ];
        let def_levels = [1i16, 0, 1];
        ok(writer::TypedColumnWriter_WriteBatchByteArray(
            column,
            labels.as_ptr(),
            labels.len() as i64,
            def_levels.as_ptr(),
            std::ptr::null(),
            def_levels.len() as i64,
            &mut written,
        ));
        assert_eq!(written, 2);
        ok(writer::ColumnWriter_Close(column));
        writer::ColumnWriter_Free(column);

        ok(writer::RowGroupWriter_Close(row_group));
        writer::RowGroupWriter_Free(row_group);
        ok(writer::FileWriter_Close(file_writer));
        writer::FileWriter_Free(file_writer);

        // Snapshot the file bytes and reopen them for reading.
        let mut file_bytes: *mut BufferHandle = std::ptr::null_mut();
        ok(io::BufferOutputStream_Finish(stream, &mut file_bytes));
        io::OutputStream_Free(stream);

        let mut input: *mut io::InputStreamHandle = std::ptr::null_mut();
        ok(io::BufferReader_Create(file_bytes, &mut input));
        parquet_native::buffer::Buffer_Free(file_bytes);

        let mut file_reader: *mut reader::FileReaderHandle = std::ptr::null_mut();
        ok(reader::FileReader_OpenStream(
            input,
            std::ptr::null(),
            &mut file_reader,
        ));
        io::InputStream_Free(input);

        // File metadata and schema introspection.
        let mut file_metadata: *mut metadata::FileMetaDataHandle = std::ptr::null_mut();
        ok(reader::FileReader_Metadata(file_reader, &mut file_metadata));
        let mut num_rows = 0i64;
        ok(metadata::FileMetaData_NumRows(file_metadata, &mut num_rows));
        assert_eq!(num_rows, 3);
        let mut created = std::ptr::null_mut();
        ok(metadata::FileMetaData_CreatedBy(file_metadata, &mut created));
        assert_eq!(take_string(created), "parquet-native catalog test");

        let mut descriptor: *mut schema::SchemaDescriptorHandle = std::ptr::null_mut();
        ok(metadata::FileMetaData_Schema(file_metadata, &mut descriptor));
        let mut num_columns = 0i32;
        ok(schema::SchemaDescriptor_NumColumns(
            descriptor,
            &mut num_columns,
        ));
        assert_eq!(num_columns, 2);
        let mut column_descr: *mut schema::ColumnDescriptorHandle = std::ptr::null_mut();
        ok(schema::SchemaDescriptor_Column(descriptor, 1, &mut column_descr));
        let mut path = std::ptr::null_mut();
        ok(schema::ColumnDescriptor_PathDotString(column_descr, &mut path));
        assert_eq!(take_string(path), "label");
        let mut max_def = 0i16;
        ok(schema::ColumnDescriptor_MaxDefinitionLevel(
            column_descr,
            &mut max_def,
        ));
        assert_eq!(max_def, 1);
        schema::ColumnDescriptor_Free(column_descr);
        schema::SchemaDescriptor_Free(descriptor);

        // Column chunk statistics of the id column.
        let mut rg_metadata: *mut metadata::RowGroupMetaDataHandle = std::ptr::null_mut();
        ok(metadata::FileMetaData_RowGroup(file_metadata, 0, &mut rg_metadata));
        let mut chunk: *mut metadata::ColumnChunkMetaDataHandle = std::ptr::null_mut();
        ok(metadata::RowGroupMetaData_Column(rg_metadata, 0, &mut chunk));
        let mut codec = -1i32;
        ok(metadata::ColumnChunkMetaData_Compression(chunk, &mut codec));
        assert_eq!(codec, 1);
        let mut statistics: *mut metadata::StatisticsHandle = std::ptr::null_mut();
        ok(metadata::ColumnChunkMetaData_Statistics(chunk, &mut statistics));
        assert!(!statistics.is_null());
        let mut has = false;
        let mut min = 0i64;
        ok(metadata::Statistics_MinInt64(statistics, &mut has, &mut min));
        assert!(has);
        assert_eq!(min, 11);
        let mut max = 0i64;
        ok(metadata::Statistics_MaxInt64(statistics, &mut has, &mut max));
        assert!(has);
        assert_eq!(max, 33);
        metadata::Statistics_Free(statistics);
        metadata::ColumnChunkMetaData_Free(chunk);
        metadata::RowGroupMetaData_Free(rg_metadata);
        metadata::FileMetaData_Free(file_metadata);

        // Read the values back through typed column readers.
        let mut rg_reader: *mut reader::RowGroupReaderHandle = std::ptr::null_mut();
        ok(reader::FileReader_RowGroup(file_reader, 0, &mut rg_reader));

        let mut id_reader: *mut reader::ColumnReaderHandle = std::ptr::null_mut();
        ok(reader::RowGroupReader_Column(rg_reader, 0, &mut id_reader));
        let mut physical = -1i32;
        ok(reader::ColumnReader_Type(id_reader, &mut physical));
        assert_eq!(physical, 2);
        let mut ids_out = [0i64; 8];
        let (mut records, mut values, mut levels) = (0i64, 0i64, 0i64);
        ok(reader::TypedColumnReader_ReadBatchInt64(
            id_reader,
            8,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            ids_out.as_mut_ptr(),
            &mut records,
            &mut values,
            &mut levels,
        ));
        assert_eq!(records, 3);
        assert_eq!(values, 3);
        assert_eq!(&ids_out[..3], &[11, 22, 33]);
        reader::ColumnReader_Free(id_reader);

        let mut label_reader: *mut reader::ColumnReaderHandle = std::ptr::null_mut();
        ok(reader::RowGroupReader_Column(rg_reader, 1, &mut label_reader));
        let mut spans = [FfiByteSpan::empty(); 8];
        let mut defs = [0i16; 8];
        let mut arena: *mut BufferHandle = std::ptr::null_mut();
        ok(reader::TypedColumnReader_ReadBatchByteArray(
            label_reader,
            8,
            defs.as_mut_ptr(),
            std::ptr::null_mut(),
            spans.as_mut_ptr(),
            &mut arena,
            &mut records,
            &mut values,
            &mut levels,
        ));
        assert_eq!(records, 3);
        assert_eq!(values, 2);
        assert_eq!(levels, 3);
        assert_eq!(&defs[..3], &[1, 0, 1]);
        let first = std::slice::from_raw_parts(spans[0].data, spans[0].len as usize);
        let second = std::slice::from_raw_parts(spans[1].data, spans[1].len as usize);
        assert_eq!(first, b"alpha");
        assert_eq!(second, b"gamma");
        parquet_native::buffer::Buffer_Free(arena);
        reader::ColumnReader_Free(label_reader);

        reader::RowGroupReader_Free(rg_reader);
        reader::FileReader_Free(file_reader);
        schema::Node_Free(root);
        properties::WriterProperties_Free(props);
    }
}

#[test]
fn error_descriptor_reports_missing_file() {
    unsafe {
        let path = CString::new("/nonexistent/directory/data.parquet").unwrap();
        let sentinel = 0xDEADusize as *mut reader::FileReaderHandle;
        let mut out = sentinel;
        let error = reader::FileReader_OpenPath(path.as_ptr(), std::ptr::null(), &mut out);
        assert!(!error.is_null());
        let kind = CStr::from_ptr(ErrorInfo_Kind(error)).to_string_lossy().into_owned();
        let message = CStr::from_ptr(ErrorInfo_Message(error))
            .to_string_lossy()
            .into_owned();
        assert_eq!(kind, "IoException");
        assert!(!message.is_empty());
        // Output parameters stay untouched on failure.
        assert_eq!(out, sentinel);
        ErrorInfo_Free(error);
    }
}

#[test]
fn out_of_range_field_index() {
    unsafe {
        let root = build_schema();
        let mut field: *mut schema::NodeHandle = std::ptr::null_mut();
        let error = schema::Node_Field(root, 7, &mut field);
        assert!(!error.is_null());
        let kind = CStr::from_ptr(ErrorInfo_Kind(error)).to_string_lossy().into_owned();
        assert_eq!(kind, "OutOfRangeException");
        ErrorInfo_Free(error);
        schema::Node_Free(root);
    }
}

#[test]
fn logger_registration_and_clearing() {
    use std::os::raw::c_void;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static RECORDS: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn release(_h: *mut c_void) {}

    unsafe extern "C" fn log(_h: *mut c_void, _level: i32, _message: *const u8, _len: u64) {
        RECORDS.fetch_add(1, Ordering::SeqCst);
    }

    unsafe {
        ok(io::Logger_Register(0x41 as *mut c_void, release, log, 2));
        // A null handle restores the default stderr sink.
        ok(io::Logger_Register(std::ptr::null_mut(), release, log, 2));
    }
}

#[test]
fn builder_reuse_after_build_is_rejected() {
    unsafe {
        let mut builder: *mut properties::WriterPropertiesBuilderHandle = std::ptr::null_mut();
        ok(properties::WriterPropertiesBuilder_Create(&mut builder));
        let mut props: *mut properties::WriterPropertiesHandle = std::ptr::null_mut();
        ok(properties::WriterPropertiesBuilder_Build(builder, &mut props));
        let error = properties::WriterPropertiesBuilder_DictionaryEnabled(builder, false);
        assert!(!error.is_null());
        let kind = CStr::from_ptr(ErrorInfo_Kind(error)).to_string_lossy().into_owned();
        assert_eq!(kind, "ArgumentException");
        ErrorInfo_Free(error);
        properties::WriterPropertiesBuilder_Free(builder);
        properties::WriterProperties_Free(props);
    }
}
