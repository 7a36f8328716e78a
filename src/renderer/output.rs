//! Output buffering.
//!
//! A document is assembled completely in memory and handed to the caller's
//! sink with a single `write_all`, so a failed render never leaves a
//! half-written file behind a valid header.

use std::io::{self, Write};

/// A buffer that accumulates output for batch writing.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(8192)
    }

    /// Create a buffer with specific capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flush buffer to a writer, returning the number of bytes written.
    pub fn flush_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> io::Result<usize> {
        let written = self.data.len();
        if written == 0 {
            return Ok(0);
        }
        writer.write_all(&self.data)?;
        writer.flush()?;
        self.data.clear();
        Ok(written)
    }

    /// Get the accumulated data as a string (lossy).
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(()) // Buffering only - real flush via flush_to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_flush_drains() {
        let mut buf = OutputBuffer::new();
        write!(buf, "<g>{}", 42).unwrap();
        assert_eq!(buf.as_str(), "<g>42");

        let mut sink = Vec::new();
        assert_eq!(buf.flush_to(&mut sink).unwrap(), 5);
        assert_eq!(sink, b"<g>42");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_failed_flush_keeps_data() {
        let mut buf = OutputBuffer::new();
        buf.write_all(b"abc").unwrap();
        assert!(buf.flush_to(&mut FailingSink).is_err());
        assert_eq!(buf.len(), 3);
    }
}
