//! Opening and closing file writers over any output sink

use std::sync::Arc;

use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::types::TypePtr;

use crate::sink::OutputDest;
use crate::{CoreError, Result};

/// The writer type behind every file writer handle
pub type NativeFileWriter = SerializedFileWriter<OutputDest>;

/// Create a file writer for the given schema and properties.
pub fn create_writer(
    sink: OutputDest,
    schema: TypePtr,
    properties: Arc<WriterProperties>,
) -> Result<NativeFileWriter> {
    Ok(SerializedFileWriter::new(sink, schema, properties)?)
}

/// Write the footer, recover the sink and close it.
///
/// The writer slot is taken so a second close is an argument error rather
/// than a double-finish.
pub fn close_writer(writer: &mut Option<NativeFileWriter>) -> Result<()> {
    let mut w = writer
        .take()
        .ok_or_else(|| CoreError::invalid_argument("file writer is already closed"))?;
    w.finish()?;
    let mut sink = w.into_inner()?;
    sink.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{open_reader, ReaderConfig};
    use crate::sink::SharedBuffer;
    use crate::source::InputSource;
    use bytes::Bytes;
    use parquet::basic::{Repetition, Type as PhysicalType};
    use parquet::data_type::Int64Type;
    use parquet::file::reader::FileReader;
    use parquet::schema::types::Type;

    fn int64_schema() -> TypePtr {
        let field = Type::primitive_type_builder("id", PhysicalType::INT64)
            .with_repetition(Repetition::REQUIRED)
            .build()
            .unwrap();
        Arc::new(
            Type::group_type_builder("schema")
                .with_fields(vec![Arc::new(field)])
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_buffer_roundtrip() {
        let buffer = SharedBuffer::new();
        let mut writer = create_writer(
            OutputDest::from_buffer(buffer.clone()),
            int64_schema(),
            Arc::new(WriterProperties::builder().build()),
        )
        .unwrap();

        let mut rg = writer.next_row_group().unwrap();
        let mut col = rg.next_column().unwrap().unwrap();
        col.typed::<Int64Type>()
            .write_batch(&[1, 2, 3], None, None)
            .unwrap();
        col.close().unwrap();
        rg.close().unwrap();

        let mut slot = Some(writer);
        close_writer(&mut slot).unwrap();
        assert!(close_writer(&mut slot).is_err());

        let source = InputSource::from_bytes(Bytes::from(buffer.snapshot()));
        let reader = open_reader(source, &ReaderConfig::new()).unwrap();
        assert_eq!(reader.metadata().num_row_groups(), 1);
        assert_eq!(reader.metadata().file_metadata().num_rows(), 3);
    }
}
