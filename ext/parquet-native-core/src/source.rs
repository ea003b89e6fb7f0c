//! Input sources for the engine's `ChunkReader` seam
//!
//! The engine pulls file data through `ChunkReader`, which hands out
//! independent readers for byte ranges. [`InputSource`] is a cloneable
//! implementation over the three ways data reaches the shim: a file path,
//! an in-memory buffer, or a host-supplied random access stream.

use bytes::Bytes;
use parquet::errors::ParquetError;
use parquet::file::reader::{ChunkReader, Length};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{CoreError, Result};

/// A position-addressed input the engine may read from any thread.
///
/// Implementations must be internally synchronized; the engine issues
/// reads in whatever order and from whatever thread it likes. A short
/// read signals end of data, never an error.
pub trait RandomAccessInput: Send + Sync {
    /// Total size of the input in bytes.
    fn size(&self) -> Result<u64>;

    /// Read up to `buf.len()` bytes at `offset`, returning the count read.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;
}

/// Read exactly `buf.len()` bytes at `offset`, looping over short reads.
/// Returns the actual count, which is smaller only at end of data.
pub fn read_fully(input: &dyn RandomAccessInput, offset: u64, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = input.read_at(offset + filled as u64, &mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Read `nbytes` at `offset` into an owned buffer.
///
/// Short reads are not errors: the returned buffer always has length
/// `nbytes`, real data is followed by zero padding, and the returned
/// count is the number of real bytes.
pub fn read_padded(
    input: &dyn RandomAccessInput,
    offset: u64,
    nbytes: usize,
) -> Result<(Vec<u8>, usize)> {
    let mut buf = vec![0u8; nbytes];
    let actual = read_fully(input, offset, &mut buf)?;
    Ok((buf, actual))
}

/// File-based source that reopens the file for each range reader
#[derive(Clone)]
pub struct FileInput {
    path: PathBuf,
    file_len: u64,
}

impl FileInput {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let file_len = file.metadata()?.len();
        Ok(FileInput { path, file_len })
    }
}

/// Host-stream-based source; the length is captured once at wrap time
#[derive(Clone)]
pub struct StreamInput {
    input: Arc<dyn RandomAccessInput>,
    len: u64,
}

impl StreamInput {
    pub fn new(input: Arc<dyn RandomAccessInput>) -> Result<Self> {
        let len = input.size()?;
        Ok(StreamInput { input, len })
    }
}

/// A cloneable `ChunkReader` over the supported input kinds
#[derive(Clone)]
pub enum InputSource {
    /// File-based reader that reopens the file on each range read
    File(FileInput),
    /// In-memory bytes
    Bytes(Bytes),
    /// Host-supplied random access stream
    Stream(StreamInput),
}

impl InputSource {
    /// Create from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(InputSource::File(FileInput::new(path)?))
    }

    /// Create from bytes (small inputs or tests)
    pub fn from_bytes(bytes: Bytes) -> Self {
        InputSource::Bytes(bytes)
    }

    /// Create from a host random access stream
    pub fn from_stream(input: Arc<dyn RandomAccessInput>) -> Result<Self> {
        Ok(InputSource::Stream(StreamInput::new(input)?))
    }
}

/// A reader limited to a byte range of an underlying `Read + Seek`
struct RangeReader<R> {
    inner: R,
    end: u64,
    pos: u64,
}

impl<R: Read + Seek> RangeReader<R> {
    fn new(mut inner: R, start: u64, length: u64) -> io::Result<Self> {
        inner.seek(SeekFrom::Start(start))?;
        Ok(RangeReader {
            inner,
            end: start + length,
            pos: start,
        })
    }
}

impl<R: Read> Read for RangeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = (self.end - self.pos) as usize;
        if remaining == 0 {
            return Ok(0);
        }
        let to_read = buf.len().min(remaining);
        let n = self.inner.read(&mut buf[..to_read])?;
        self.pos += n as u64;
        Ok(n)
    }
}

/// A sequential cursor over a `RandomAccessInput`
struct StreamCursor {
    input: Arc<dyn RandomAccessInput>,
    pos: u64,
    end: u64,
}

impl Read for StreamCursor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = (self.end - self.pos) as usize;
        if remaining == 0 {
            return Ok(0);
        }
        let to_read = buf.len().min(remaining);
        let n = self
            .input
            .read_at(self.pos, &mut buf[..to_read])
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Length for FileInput {
    fn len(&self) -> u64 {
        self.file_len
    }
}

impl Length for StreamInput {
    fn len(&self) -> u64 {
        self.len
    }
}

impl Length for InputSource {
    fn len(&self) -> u64 {
        match self {
            InputSource::File(f) => f.len(),
            InputSource::Bytes(b) => b.len() as u64,
            InputSource::Stream(s) => s.len(),
        }
    }
}

impl ChunkReader for FileInput {
    type T = Box<dyn Read + Send>;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        let file = File::open(&self.path).map_err(external)?;
        let reader = RangeReader::new(file, start, self.file_len.saturating_sub(start))
            .map_err(external)?;
        Ok(Box::new(reader))
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        let mut file = File::open(&self.path).map_err(external)?;
        file.seek(SeekFrom::Start(start)).map_err(external)?;
        let mut buf = vec![0; length];
        file.read_exact(&mut buf).map_err(external)?;
        Ok(Bytes::from(buf))
    }
}

impl ChunkReader for StreamInput {
    type T = Box<dyn Read + Send>;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        Ok(Box::new(StreamCursor {
            input: Arc::clone(&self.input),
            pos: start,
            end: self.len,
        }))
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        let mut buf = vec![0; length];
        let read = read_fully(self.input.as_ref(), start, &mut buf)
            .map_err(|e| ParquetError::External(Box::new(e)))?;
        if read != length {
            return Err(ParquetError::EOF(format!(
                "Expected to read {} bytes, read only {}",
                length, read
            )));
        }
        Ok(Bytes::from(buf))
    }
}

impl ChunkReader for InputSource {
    type T = Box<dyn Read + Send>;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        match self {
            InputSource::File(f) => f.get_read(start),
            InputSource::Bytes(b) => {
                let len = b.len();
                if start as usize > len {
                    return Err(ParquetError::IndexOutOfBound(start as usize, len));
                }
                Ok(Box::new(io::Cursor::new(b.clone().slice(start as usize..))))
            }
            InputSource::Stream(s) => s.get_read(start),
        }
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        match self {
            InputSource::File(f) => f.get_bytes(start, length),
            InputSource::Bytes(b) => {
                let end = (start as usize).saturating_add(length);
                if end > b.len() {
                    return Err(ParquetError::EOF(format!(
                        "Expected to read {} bytes, only {} available",
                        length,
                        b.len().saturating_sub(start as usize)
                    )));
                }
                Ok(b.slice(start as usize..end))
            }
            InputSource::Stream(s) => s.get_bytes(start, length),
        }
    }
}

fn external(e: io::Error) -> ParquetError {
    ParquetError::External(Box::new(e))
}

impl From<CoreError> for ParquetError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Engine(inner) => inner,
            other => ParquetError::External(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct SliceInput(Mutex<Vec<u8>>);

    impl RandomAccessInput for SliceInput {
        fn size(&self) -> Result<u64> {
            Ok(self.0.lock().unwrap().len() as u64)
        }

        fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
            let data = self.0.lock().unwrap();
            if offset as usize >= data.len() {
                return Ok(0);
            }
            let avail = &data[offset as usize..];
            let n = avail.len().min(buf.len());
            buf[..n].copy_from_slice(&avail[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_read_padded_short_read() {
        let input = SliceInput(Mutex::new(vec![1, 2, 3]));
        let (buf, actual) = read_padded(&input, 0, 8).unwrap();
        assert_eq!(actual, 3);
        assert_eq!(buf, vec![1, 2, 3, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read_padded_exact() {
        let input = SliceInput(Mutex::new(vec![9; 16]));
        let (buf, actual) = read_padded(&input, 4, 12).unwrap();
        assert_eq!(actual, 12);
        assert_eq!(buf, vec![9; 12]);
    }

    #[test]
    fn test_stream_source_get_bytes() {
        let data: Vec<u8> = (0..64).collect();
        let source =
            InputSource::from_stream(Arc::new(SliceInput(Mutex::new(data.clone())))).unwrap();
        assert_eq!(source.len(), 64);
        let bytes = source.get_bytes(8, 8).unwrap();
        assert_eq!(&bytes[..], &data[8..16]);
        assert!(source.get_bytes(60, 8).is_err());
    }

    #[test]
    fn test_stream_source_range_reader() {
        let data: Vec<u8> = (0..32).collect();
        let source = InputSource::from_stream(Arc::new(SliceInput(Mutex::new(data)))).unwrap();
        let mut reader = source.get_read(30).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![30, 31]);
    }

    #[test]
    fn test_bytes_source() {
        let source = InputSource::from_bytes(Bytes::from_static(b"hello world"));
        assert_eq!(&source.get_bytes(6, 5).unwrap()[..], b"world");
        assert!(source.get_bytes(6, 6).is_err());
    }
}
