//! Output sinks for the engine's `Write` seam
//!
//! The engine writes files through plain `std::io::Write + Send`.
//! [`OutputDest`] dispatches that over a file, a shared in-memory buffer,
//! or a host-supplied output stream.

use std::fs::File;
use std::io::{self, Error as IoError, ErrorKind, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::{CoreError, Result};

/// A host-backed output stream.
///
/// `write` either writes the whole buffer or fails; the engine never sees
/// partial writes from a host stream. `close` is the only cooperative stop
/// mechanism and is explicit.
pub trait StreamOutput: Send {
    fn write(&mut self, data: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn is_closed(&self) -> bool;
}

/// An in-memory buffer that stays reachable after the writer consumed it
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the accumulated bytes out.
    pub fn snapshot(&self) -> Vec<u8> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| IoError::new(ErrorKind::Other, e.to_string()))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A `Write + Send` over the supported output kinds
pub enum OutputDest {
    File(File),
    Buffer(SharedBuffer),
    Stream(Box<dyn StreamOutput>),
}

impl OutputDest {
    /// Create (truncating) a file sink
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(OutputDest::File(File::create(path)?))
    }

    pub fn from_buffer(buffer: SharedBuffer) -> Self {
        OutputDest::Buffer(buffer)
    }

    pub fn from_stream(stream: Box<dyn StreamOutput>) -> Self {
        OutputDest::Stream(stream)
    }

    /// Flush and close the sink. For host streams this forwards the
    /// explicit `close` callback; files are synced to disk.
    pub fn close(&mut self) -> Result<()> {
        match self {
            OutputDest::File(f) => {
                f.flush()?;
                f.sync_all()?;
                Ok(())
            }
            OutputDest::Buffer(_) => Ok(()),
            OutputDest::Stream(s) => {
                s.flush()?;
                s.close()
            }
        }
    }
}

impl Write for OutputDest {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputDest::File(f) => f.write(buf),
            OutputDest::Buffer(b) => b.write(buf),
            OutputDest::Stream(s) => {
                s.write(buf).map_err(to_io)?;
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputDest::File(f) => f.flush(),
            OutputDest::Buffer(b) => b.flush(),
            OutputDest::Stream(s) => s.flush().map_err(to_io),
        }
    }
}

fn to_io(e: CoreError) -> IoError {
    IoError::new(ErrorKind::Other, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_buffer_accumulates() {
        let buffer = SharedBuffer::new();
        let mut dest = OutputDest::from_buffer(buffer.clone());
        dest.write_all(b"abc").unwrap();
        dest.write_all(b"def").unwrap();
        dest.close().unwrap();
        assert_eq!(buffer.snapshot(), b"abcdef");
        assert_eq!(buffer.len(), 6);
    }

    struct RecordingStream {
        data: Vec<u8>,
        closed: bool,
    }

    impl StreamOutput for RecordingStream {
        fn write(&mut self, data: &[u8]) -> Result<()> {
            self.data.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.closed = true;
            Ok(())
        }

        fn is_closed(&self) -> bool {
            self.closed
        }
    }

    #[test]
    fn test_stream_dest_forwards_close() {
        let mut dest = OutputDest::from_stream(Box::new(RecordingStream {
            data: Vec::new(),
            closed: false,
        }));
        dest.write_all(b"xyz").unwrap();
        dest.close().unwrap();
        match dest {
            OutputDest::Stream(s) => assert!(s.is_closed()),
            _ => unreachable!(),
        }
    }
}
