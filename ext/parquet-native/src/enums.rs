//! Host-facing enums and the ABI stability guard
//!
//! Enumerations cross the boundary as plain `i32`s. The engine offers no
//! cross-version guarantee for its own enum shapes, so the contract lives
//! here: `#[repr(i32)]` enums with pinned discriminants, `const`
//! assertions as the regression gate, and exhaustive `match` converters
//! so any engine-side change breaks the build instead of the ABI.

use parquet::basic::{
    BrotliLevel, ColumnOrder, Compression, ConvertedType, Encoding, GzipLevel, LogicalType,
    Repetition, SortOrder, TimeUnit, Type as PhysicalType, ZstdLevel,
};
use parquet::file::properties::{EnabledStatistics, WriterVersion};
use parquet_native_core::encryption::CipherKind;
use parquet_native_core::{CoreError, Result};

/// Compression codec identifiers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionId {
    Uncompressed = 0,
    Snappy = 1,
    Gzip = 2,
    Brotli = 3,
    Zstd = 4,
    Lz4 = 5,
    Lz4Raw = 6,
    Lzo = 7,
}

/// Page encoding identifiers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingId {
    Plain = 0,
    PlainDictionary = 2,
    Rle = 3,
    BitPacked = 4,
    DeltaBinaryPacked = 5,
    DeltaLengthByteArray = 6,
    DeltaByteArray = 7,
    RleDictionary = 8,
    ByteStreamSplit = 9,
}

/// Physical type identifiers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalTypeId {
    Boolean = 0,
    Int32 = 1,
    Int64 = 2,
    Int96 = 3,
    Float = 4,
    Double = 5,
    ByteArray = 6,
    FixedLenByteArray = 7,
}

/// Logical type tags; parameters travel through separate accessors
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalTypeId {
    None = 0,
    String = 1,
    Map = 2,
    List = 3,
    Enum = 4,
    Decimal = 5,
    Date = 6,
    Time = 7,
    Timestamp = 8,
    Integer = 10,
    Unknown = 11,
    Json = 12,
    Bson = 13,
    Uuid = 14,
    Float16 = 15,
}

/// Time unit identifiers (0 is reserved)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnitId {
    Millis = 1,
    Micros = 2,
    Nanos = 3,
}

/// Repetition identifiers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepetitionId {
    Required = 0,
    Optional = 1,
    Repeated = 2,
}

/// Converted (legacy logical) type identifiers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertedTypeId {
    None = 0,
    Utf8 = 1,
    Map = 2,
    MapKeyValue = 3,
    List = 4,
    Enum = 5,
    Decimal = 6,
    Date = 7,
    TimeMillis = 8,
    TimeMicros = 9,
    TimestampMillis = 10,
    TimestampMicros = 11,
    Uint8 = 12,
    Uint16 = 13,
    Uint32 = 14,
    Uint64 = 15,
    Int8 = 16,
    Int16 = 17,
    Int32 = 18,
    Int64 = 19,
    Json = 20,
    Bson = 21,
    Interval = 22,
}

/// Encryption cipher identifiers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherId {
    AesGcmV1 = 0,
    AesGcmCtrV1 = 1,
}

/// Writer format version identifiers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterVersionId {
    Parquet1_0 = 0,
    Parquet2_0 = 1,
}

/// Statistics level identifiers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsLevelId {
    None = 0,
    Chunk = 1,
    Page = 2,
}

/// Sort order identifiers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrderId {
    Signed = 0,
    Unsigned = 1,
    Undefined = 2,
}

/// Column order identifiers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrderId {
    Undefined = 0,
    TypeDefinedOrder = 1,
}

// The ABI guard: these discriminants are the documented host contract.
// A mismatch here is a build failure, never a runtime one.
const _: () = {
    assert!(CompressionId::Uncompressed as i32 == 0);
    assert!(CompressionId::Snappy as i32 == 1);
    assert!(CompressionId::Gzip as i32 == 2);
    assert!(CompressionId::Brotli as i32 == 3);
    assert!(CompressionId::Zstd as i32 == 4);
    assert!(CompressionId::Lz4 as i32 == 5);
    assert!(CompressionId::Lz4Raw as i32 == 6);
    assert!(CompressionId::Lzo as i32 == 7);

    assert!(EncodingId::Plain as i32 == 0);
    assert!(EncodingId::PlainDictionary as i32 == 2);
    assert!(EncodingId::Rle as i32 == 3);
    assert!(EncodingId::BitPacked as i32 == 4);
    assert!(EncodingId::DeltaBinaryPacked as i32 == 5);
    assert!(EncodingId::DeltaLengthByteArray as i32 == 6);
    assert!(EncodingId::DeltaByteArray as i32 == 7);
    assert!(EncodingId::RleDictionary as i32 == 8);
    assert!(EncodingId::ByteStreamSplit as i32 == 9);

    assert!(PhysicalTypeId::Boolean as i32 == 0);
    assert!(PhysicalTypeId::Int32 as i32 == 1);
    assert!(PhysicalTypeId::Int64 as i32 == 2);
    assert!(PhysicalTypeId::Int96 as i32 == 3);
    assert!(PhysicalTypeId::Float as i32 == 4);
    assert!(PhysicalTypeId::Double as i32 == 5);
    assert!(PhysicalTypeId::ByteArray as i32 == 6);
    assert!(PhysicalTypeId::FixedLenByteArray as i32 == 7);

    assert!(LogicalTypeId::None as i32 == 0);
    assert!(LogicalTypeId::String as i32 == 1);
    assert!(LogicalTypeId::Map as i32 == 2);
    assert!(LogicalTypeId::List as i32 == 3);
    assert!(LogicalTypeId::Enum as i32 == 4);
    assert!(LogicalTypeId::Decimal as i32 == 5);
    assert!(LogicalTypeId::Date as i32 == 6);
    assert!(LogicalTypeId::Time as i32 == 7);
    assert!(LogicalTypeId::Timestamp as i32 == 8);
    assert!(LogicalTypeId::Integer as i32 == 10);
    assert!(LogicalTypeId::Unknown as i32 == 11);
    assert!(LogicalTypeId::Json as i32 == 12);
    assert!(LogicalTypeId::Bson as i32 == 13);
    assert!(LogicalTypeId::Uuid as i32 == 14);
    assert!(LogicalTypeId::Float16 as i32 == 15);

    assert!(TimeUnitId::Millis as i32 == 1);
    assert!(TimeUnitId::Micros as i32 == 2);
    assert!(TimeUnitId::Nanos as i32 == 3);

    assert!(RepetitionId::Required as i32 == 0);
    assert!(RepetitionId::Optional as i32 == 1);
    assert!(RepetitionId::Repeated as i32 == 2);

    assert!(CipherId::AesGcmV1 as i32 == 0);
    assert!(CipherId::AesGcmCtrV1 as i32 == 1);

    assert!(WriterVersionId::Parquet1_0 as i32 == 0);
    assert!(WriterVersionId::Parquet2_0 as i32 == 1);

    assert!(StatisticsLevelId::None as i32 == 0);
    assert!(StatisticsLevelId::Chunk as i32 == 1);
    assert!(StatisticsLevelId::Page as i32 == 2);

    assert!(SortOrderId::Signed as i32 == 0);
    assert!(SortOrderId::Unsigned as i32 == 1);
    assert!(SortOrderId::Undefined as i32 == 2);

    assert!(ColumnOrderId::Undefined as i32 == 0);
    assert!(ColumnOrderId::TypeDefinedOrder as i32 == 1);

    assert!(ConvertedTypeId::None as i32 == 0);
    assert!(ConvertedTypeId::Interval as i32 == 22);
};

fn bad_value(what: &str, value: i32) -> CoreError {
    CoreError::invalid_argument(format!("{value} is not a valid {what}"))
}

/// Build an engine compression value; `level` below zero selects the
/// codec default.
pub(crate) fn compression_to_engine(codec: i32, level: i32) -> Result<Compression> {
    Ok(match codec {
        0 => Compression::UNCOMPRESSED,
        1 => Compression::SNAPPY,
        2 => Compression::GZIP(if level < 0 {
            GzipLevel::default()
        } else {
            GzipLevel::try_new(level as u32)?
        }),
        3 => Compression::BROTLI(if level < 0 {
            BrotliLevel::default()
        } else {
            BrotliLevel::try_new(level as u32)?
        }),
        4 => Compression::ZSTD(if level < 0 {
            ZstdLevel::default()
        } else {
            ZstdLevel::try_new(level)?
        }),
        5 => Compression::LZ4,
        6 => Compression::LZ4_RAW,
        7 => {
            return Err(CoreError::unsupported(
                "the engine does not implement LZO compression",
            ))
        }
        other => return Err(bad_value("compression codec", other)),
    })
}

pub(crate) fn compression_from_engine(compression: Compression) -> CompressionId {
    match compression {
        Compression::UNCOMPRESSED => CompressionId::Uncompressed,
        Compression::SNAPPY => CompressionId::Snappy,
        Compression::GZIP(_) => CompressionId::Gzip,
        Compression::BROTLI(_) => CompressionId::Brotli,
        Compression::ZSTD(_) => CompressionId::Zstd,
        Compression::LZ4 => CompressionId::Lz4,
        Compression::LZ4_RAW => CompressionId::Lz4Raw,
        Compression::LZO => CompressionId::Lzo,
    }
}

pub(crate) fn encoding_to_engine(encoding: i32) -> Result<Encoding> {
    Ok(match encoding {
        0 => Encoding::PLAIN,
        2 => Encoding::PLAIN_DICTIONARY,
        3 => Encoding::RLE,
        4 => Encoding::BIT_PACKED,
        5 => Encoding::DELTA_BINARY_PACKED,
        6 => Encoding::DELTA_LENGTH_BYTE_ARRAY,
        7 => Encoding::DELTA_BYTE_ARRAY,
        8 => Encoding::RLE_DICTIONARY,
        9 => Encoding::BYTE_STREAM_SPLIT,
        other => return Err(bad_value("encoding", other)),
    })
}

pub(crate) fn encoding_from_engine(encoding: Encoding) -> EncodingId {
    match encoding {
        Encoding::PLAIN => EncodingId::Plain,
        Encoding::PLAIN_DICTIONARY => EncodingId::PlainDictionary,
        Encoding::RLE => EncodingId::Rle,
        #[allow(deprecated)]
        Encoding::BIT_PACKED => EncodingId::BitPacked,
        Encoding::DELTA_BINARY_PACKED => EncodingId::DeltaBinaryPacked,
        Encoding::DELTA_LENGTH_BYTE_ARRAY => EncodingId::DeltaLengthByteArray,
        Encoding::DELTA_BYTE_ARRAY => EncodingId::DeltaByteArray,
        Encoding::RLE_DICTIONARY => EncodingId::RleDictionary,
        Encoding::BYTE_STREAM_SPLIT => EncodingId::ByteStreamSplit,
    }
}

pub(crate) fn physical_type_to_engine(physical: i32) -> Result<PhysicalType> {
    Ok(match physical {
        0 => PhysicalType::BOOLEAN,
        1 => PhysicalType::INT32,
        2 => PhysicalType::INT64,
        3 => PhysicalType::INT96,
        4 => PhysicalType::FLOAT,
        5 => PhysicalType::DOUBLE,
        6 => PhysicalType::BYTE_ARRAY,
        7 => PhysicalType::FIXED_LEN_BYTE_ARRAY,
        other => return Err(bad_value("physical type", other)),
    })
}

pub(crate) fn physical_type_from_engine(physical: PhysicalType) -> PhysicalTypeId {
    match physical {
        PhysicalType::BOOLEAN => PhysicalTypeId::Boolean,
        PhysicalType::INT32 => PhysicalTypeId::Int32,
        PhysicalType::INT64 => PhysicalTypeId::Int64,
        PhysicalType::INT96 => PhysicalTypeId::Int96,
        PhysicalType::FLOAT => PhysicalTypeId::Float,
        PhysicalType::DOUBLE => PhysicalTypeId::Double,
        PhysicalType::BYTE_ARRAY => PhysicalTypeId::ByteArray,
        PhysicalType::FIXED_LEN_BYTE_ARRAY => PhysicalTypeId::FixedLenByteArray,
    }
}

pub(crate) fn repetition_to_engine(repetition: i32) -> Result<Repetition> {
    Ok(match repetition {
        0 => Repetition::REQUIRED,
        1 => Repetition::OPTIONAL,
        2 => Repetition::REPEATED,
        other => return Err(bad_value("repetition", other)),
    })
}

pub(crate) fn repetition_from_engine(repetition: Repetition) -> RepetitionId {
    match repetition {
        Repetition::REQUIRED => RepetitionId::Required,
        Repetition::OPTIONAL => RepetitionId::Optional,
        Repetition::REPEATED => RepetitionId::Repeated,
    }
}

pub(crate) fn time_unit_to_engine(unit: i32) -> Result<TimeUnit> {
    Ok(match unit {
        1 => TimeUnit::MILLIS,
        2 => TimeUnit::MICROS,
        3 => TimeUnit::NANOS,
        other => return Err(bad_value("time unit", other)),
    })
}

pub(crate) fn time_unit_from_engine(unit: &TimeUnit) -> TimeUnitId {
    match unit {
        TimeUnit::MILLIS => TimeUnitId::Millis,
        TimeUnit::MICROS => TimeUnitId::Micros,
        TimeUnit::NANOS => TimeUnitId::Nanos,
    }
}

pub(crate) fn converted_type_to_engine(converted: i32) -> Result<ConvertedType> {
    Ok(match converted {
        0 => ConvertedType::NONE,
        1 => ConvertedType::UTF8,
        2 => ConvertedType::MAP,
        3 => ConvertedType::MAP_KEY_VALUE,
        4 => ConvertedType::LIST,
        5 => ConvertedType::ENUM,
        6 => ConvertedType::DECIMAL,
        7 => ConvertedType::DATE,
        8 => ConvertedType::TIME_MILLIS,
        9 => ConvertedType::TIME_MICROS,
        10 => ConvertedType::TIMESTAMP_MILLIS,
        11 => ConvertedType::TIMESTAMP_MICROS,
        12 => ConvertedType::UINT_8,
        13 => ConvertedType::UINT_16,
        14 => ConvertedType::UINT_32,
        15 => ConvertedType::UINT_64,
        16 => ConvertedType::INT_8,
        17 => ConvertedType::INT_16,
        18 => ConvertedType::INT_32,
        19 => ConvertedType::INT_64,
        20 => ConvertedType::JSON,
        21 => ConvertedType::BSON,
        22 => ConvertedType::INTERVAL,
        other => return Err(bad_value("converted type", other)),
    })
}

pub(crate) fn converted_type_from_engine(converted: ConvertedType) -> ConvertedTypeId {
    match converted {
        ConvertedType::NONE => ConvertedTypeId::None,
        ConvertedType::UTF8 => ConvertedTypeId::Utf8,
        ConvertedType::MAP => ConvertedTypeId::Map,
        ConvertedType::MAP_KEY_VALUE => ConvertedTypeId::MapKeyValue,
        ConvertedType::LIST => ConvertedTypeId::List,
        ConvertedType::ENUM => ConvertedTypeId::Enum,
        ConvertedType::DECIMAL => ConvertedTypeId::Decimal,
        ConvertedType::DATE => ConvertedTypeId::Date,
        ConvertedType::TIME_MILLIS => ConvertedTypeId::TimeMillis,
        ConvertedType::TIME_MICROS => ConvertedTypeId::TimeMicros,
        ConvertedType::TIMESTAMP_MILLIS => ConvertedTypeId::TimestampMillis,
        ConvertedType::TIMESTAMP_MICROS => ConvertedTypeId::TimestampMicros,
        ConvertedType::UINT_8 => ConvertedTypeId::Uint8,
        ConvertedType::UINT_16 => ConvertedTypeId::Uint16,
        ConvertedType::UINT_32 => ConvertedTypeId::Uint32,
        ConvertedType::UINT_64 => ConvertedTypeId::Uint64,
        ConvertedType::INT_8 => ConvertedTypeId::Int8,
        ConvertedType::INT_16 => ConvertedTypeId::Int16,
        ConvertedType::INT_32 => ConvertedTypeId::Int32,
        ConvertedType::INT_64 => ConvertedTypeId::Int64,
        ConvertedType::JSON => ConvertedTypeId::Json,
        ConvertedType::BSON => ConvertedTypeId::Bson,
        ConvertedType::INTERVAL => ConvertedTypeId::Interval,
    }
}

pub(crate) fn logical_type_id_from_engine(logical: &LogicalType) -> LogicalTypeId {
    match logical {
        LogicalType::String => LogicalTypeId::String,
        LogicalType::Map => LogicalTypeId::Map,
        LogicalType::List => LogicalTypeId::List,
        LogicalType::Enum => LogicalTypeId::Enum,
        LogicalType::Decimal { .. } => LogicalTypeId::Decimal,
        LogicalType::Date => LogicalTypeId::Date,
        LogicalType::Time { .. } => LogicalTypeId::Time,
        LogicalType::Timestamp { .. } => LogicalTypeId::Timestamp,
        LogicalType::Integer { .. } => LogicalTypeId::Integer,
        LogicalType::Unknown => LogicalTypeId::Unknown,
        LogicalType::Json => LogicalTypeId::Json,
        LogicalType::Bson => LogicalTypeId::Bson,
        LogicalType::Uuid => LogicalTypeId::Uuid,
        LogicalType::Float16 => LogicalTypeId::Float16,
        // Engine variants without a host-side tag report as Unknown
        // rather than breaking the ABI.
        _ => LogicalTypeId::Unknown,
    }
}

pub(crate) fn cipher_to_core(cipher: i32) -> Result<CipherKind> {
    Ok(match cipher {
        0 => CipherKind::AesGcmV1,
        1 => CipherKind::AesGcmCtrV1,
        other => return Err(bad_value("cipher", other)),
    })
}

pub(crate) fn cipher_from_core(cipher: CipherKind) -> CipherId {
    match cipher {
        CipherKind::AesGcmV1 => CipherId::AesGcmV1,
        CipherKind::AesGcmCtrV1 => CipherId::AesGcmCtrV1,
    }
}

pub(crate) fn writer_version_to_engine(version: i32) -> Result<WriterVersion> {
    Ok(match version {
        0 => WriterVersion::PARQUET_1_0,
        1 => WriterVersion::PARQUET_2_0,
        other => return Err(bad_value("writer version", other)),
    })
}

pub(crate) fn writer_version_from_engine(version: WriterVersion) -> WriterVersionId {
    match version {
        WriterVersion::PARQUET_1_0 => WriterVersionId::Parquet1_0,
        WriterVersion::PARQUET_2_0 => WriterVersionId::Parquet2_0,
    }
}

pub(crate) fn statistics_level_to_engine(level: i32) -> Result<EnabledStatistics> {
    Ok(match level {
        0 => EnabledStatistics::None,
        1 => EnabledStatistics::Chunk,
        2 => EnabledStatistics::Page,
        other => return Err(bad_value("statistics level", other)),
    })
}

pub(crate) fn statistics_level_from_engine(level: EnabledStatistics) -> StatisticsLevelId {
    match level {
        EnabledStatistics::None => StatisticsLevelId::None,
        EnabledStatistics::Chunk => StatisticsLevelId::Chunk,
        EnabledStatistics::Page => StatisticsLevelId::Page,
    }
}

pub(crate) fn sort_order_from_engine(order: SortOrder) -> SortOrderId {
    match order {
        SortOrder::SIGNED => SortOrderId::Signed,
        SortOrder::UNSIGNED => SortOrderId::Unsigned,
        SortOrder::UNDEFINED => SortOrderId::Undefined,
    }
}

pub(crate) fn column_order_from_engine(order: ColumnOrder) -> ColumnOrderId {
    match order {
        ColumnOrder::TYPE_DEFINED_ORDER(_) => ColumnOrderId::TypeDefinedOrder,
        ColumnOrder::UNDEFINED => ColumnOrderId::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_roundtrip() {
        for id in [0, 1, 2, 3, 4, 5, 6] {
            let engine = compression_to_engine(id, -1).unwrap();
            assert_eq!(compression_from_engine(engine) as i32, id);
        }
        assert_eq!(
            compression_to_engine(7, -1).unwrap_err().kind(),
            "NotSupportedException"
        );
        assert!(compression_to_engine(42, -1).is_err());
    }

    #[test]
    fn test_compression_levels() {
        assert!(compression_to_engine(2, 6).is_ok());
        assert!(compression_to_engine(4, 3).is_ok());
        // Far above the codec maximum.
        assert!(compression_to_engine(2, 10_000).is_err());
    }

    #[test]
    fn test_encoding_roundtrip() {
        for id in [0, 2, 3, 4, 5, 6, 7, 8, 9] {
            let engine = encoding_to_engine(id).unwrap();
            assert_eq!(encoding_from_engine(engine) as i32, id);
        }
        assert!(encoding_to_engine(1).is_err());
    }

    #[test]
    fn test_physical_type_roundtrip() {
        for id in 0..=7 {
            let engine = physical_type_to_engine(id).unwrap();
            assert_eq!(physical_type_from_engine(engine) as i32, id);
        }
        assert!(physical_type_to_engine(8).is_err());
    }

    #[test]
    fn test_converted_type_roundtrip() {
        for id in 0..=22 {
            let engine = converted_type_to_engine(id).unwrap();
            assert_eq!(converted_type_from_engine(engine) as i32, id);
        }
    }

    #[test]
    fn test_logical_type_tags() {
        assert_eq!(
            logical_type_id_from_engine(&LogicalType::String),
            LogicalTypeId::String
        );
        assert_eq!(
            logical_type_id_from_engine(&LogicalType::Decimal {
                scale: 2,
                precision: 10
            }),
            LogicalTypeId::Decimal
        );
    }
}
