use thiserror::Error;

/// Core error type for the shim.
///
/// Every failure that crosses the C boundary is reduced to one of these
/// variants; [`CoreError::kind`] yields the stable category string carried
/// by the error descriptor.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Allocation failure detected by the shim itself
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// Errors reported by the engine
    #[error("parquet error: {0}")]
    Engine(#[from] parquet::errors::ParquetError),

    /// IO errors from file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Index outside the valid range of a container
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: i64, len: i64 },

    /// Length or size constraint violations
    #[error("length error: {0}")]
    Length(String),

    /// Invalid argument errors
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// UTF-8 decoding errors on host-provided strings
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Failure reported by a host callback through its exception slot
    #[error("{0}")]
    Host(String),

    /// Operation the engine does not support
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Failures with no typed information (panic payloads and the like)
    #[error("{0}")]
    Unknown(String),
}

/// Result type alias for shim operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        CoreError::InvalidArgument(msg.into())
    }

    /// Create a new length error
    pub fn length<S: Into<String>>(msg: S) -> Self {
        CoreError::Length(msg.into())
    }

    /// Create a new unsupported operation error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        CoreError::Unsupported(msg.into())
    }

    /// Create a new host callback error
    pub fn host<S: Into<String>>(msg: S) -> Self {
        CoreError::Host(msg.into())
    }

    /// The stable category string surfaced to the host.
    ///
    /// Engine errors are reclassified as out-of-memory when their message
    /// indicates an allocation failure; the engine has no dedicated status
    /// for it.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::OutOfMemory(_) => "OutOfMemoryException",
            CoreError::Engine(e) if engine_out_of_memory(e) => "OutOfMemoryException",
            CoreError::Engine(_) => "ParquetException",
            CoreError::Io(_) => "IoException",
            CoreError::OutOfRange { .. } => "OutOfRangeException",
            CoreError::Length(_) => "LengthException",
            CoreError::InvalidArgument(_) => "ArgumentException",
            CoreError::InvalidUtf8(_) => "Utf8Exception",
            CoreError::Host(_) => "HostException",
            CoreError::Unsupported(_) => "NotSupportedException",
            CoreError::Unknown(_) => "unknown",
        }
    }
}

fn engine_out_of_memory(err: &parquet::errors::ParquetError) -> bool {
    let msg = err.to_string();
    msg.contains("out of memory") || msg.contains("memory allocation")
}

/// Bounds-check an index coming from the host side.
pub fn check_index(index: i64, len: usize) -> Result<usize> {
    if index < 0 || index as u64 >= len as u64 {
        return Err(CoreError::OutOfRange {
            index,
            len: len as i64,
        });
    }
    Ok(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        assert_eq!(
            CoreError::OutOfMemory("alloc".into()).kind(),
            "OutOfMemoryException"
        );
        assert_eq!(
            CoreError::OutOfRange { index: 4, len: 2 }.kind(),
            "OutOfRangeException"
        );
        assert_eq!(CoreError::length("too long").kind(), "LengthException");
        assert_eq!(CoreError::host("boom").kind(), "HostException");
        assert_eq!(CoreError::Unknown("?".into()).kind(), "unknown");
    }

    #[test]
    fn test_engine_oom_classification() {
        let err = CoreError::Engine(parquet::errors::ParquetError::General(
            "out of memory while reading page".into(),
        ));
        assert_eq!(err.kind(), "OutOfMemoryException");

        let err = CoreError::Engine(parquet::errors::ParquetError::General(
            "corrupt footer".into(),
        ));
        assert_eq!(err.kind(), "ParquetException");
    }

    #[test]
    fn test_host_error_message_preserved() {
        let err = CoreError::host("stream closed by peer");
        assert_eq!(err.to_string(), "stream closed by peer");
    }

    #[test]
    fn test_check_index() {
        assert_eq!(check_index(1, 3).unwrap(), 1);
        assert!(matches!(
            check_index(3, 3),
            Err(CoreError::OutOfRange { index: 3, len: 3 })
        ));
        assert!(check_index(-1, 3).is_err());
    }
}
