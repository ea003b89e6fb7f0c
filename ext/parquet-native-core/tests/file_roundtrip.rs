//! Plaintext roundtrips through real files

use std::sync::Arc;

use parquet::basic::{Compression, ConvertedType, Repetition, Type as PhysicalType};
use parquet::data_type::{DoubleType, Int32Type};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::FileReader;
use parquet::file::metadata::KeyValue;
use parquet::schema::types::{Type, TypePtr};

use parquet_native_core::reader::{open_reader, ReaderConfig};
use parquet_native_core::sink::OutputDest;
use parquet_native_core::source::InputSource;
use parquet_native_core::writer::{close_writer, create_writer};

fn schema() -> TypePtr {
    let id = Type::primitive_type_builder("id", PhysicalType::INT32)
        .with_repetition(Repetition::REQUIRED)
        .with_converted_type(ConvertedType::INT_32)
        .build()
        .unwrap();
    let score = Type::primitive_type_builder("score", PhysicalType::DOUBLE)
        .with_repetition(Repetition::REQUIRED)
        .build()
        .unwrap();
    Arc::new(
        Type::group_type_builder("schema")
            .with_fields(vec![Arc::new(id), Arc::new(score)])
            .build()
            .unwrap(),
    )
}

#[test]
fn multi_row_group_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.parquet");

    let properties = WriterProperties::builder()
        .set_compression(Compression::UNCOMPRESSED)
        .set_created_by("parquet-native test".to_string())
        .set_key_value_metadata(Some(vec![KeyValue::new(
            "origin".to_string(),
            "roundtrip".to_string(),
        )]))
        .build();

    let mut writer = create_writer(
        OutputDest::from_path(&path).unwrap(),
        schema(),
        Arc::new(properties),
    )
    .unwrap();

    for group in 0..3i32 {
        let mut rg = writer.next_row_group().unwrap();

        let mut col = rg.next_column().unwrap().unwrap();
        let ids: Vec<i32> = (group * 10..group * 10 + 5).collect();
        col.typed::<Int32Type>()
            .write_batch(&ids, None, None)
            .unwrap();
        col.close().unwrap();

        let mut col = rg.next_column().unwrap().unwrap();
        let scores: Vec<f64> = ids.iter().map(|i| *i as f64 / 2.0).collect();
        col.typed::<DoubleType>()
            .write_batch(&scores, None, None)
            .unwrap();
        col.close().unwrap();

        rg.close().unwrap();
    }

    let mut slot = Some(writer);
    close_writer(&mut slot).unwrap();

    let reader = open_reader(
        InputSource::from_path(&path).unwrap(),
        &ReaderConfig::new(),
    )
    .unwrap();
    let metadata = reader.metadata();
    assert_eq!(metadata.num_row_groups(), 3);
    assert_eq!(metadata.file_metadata().num_rows(), 15);
    assert_eq!(
        metadata.file_metadata().created_by(),
        Some("parquet-native test")
    );
    let kv = metadata.file_metadata().key_value_metadata().unwrap();
    assert_eq!(kv[0].key, "origin");
    assert_eq!(kv[0].value.as_deref(), Some("roundtrip"));

    // Cloned sources read independently.
    let source = InputSource::from_path(&path).unwrap();
    let second = source.clone();
    let r1 = open_reader(source, &ReaderConfig::new()).unwrap();
    let r2 = open_reader(second, &ReaderConfig::new()).unwrap();
    assert_eq!(
        r1.metadata().file_metadata().num_rows(),
        r2.metadata().file_metadata().num_rows()
    );
}
