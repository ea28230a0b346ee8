// SPDX-License-Identifier: Apache-2.0

//! Byte sources for [`StreamContext`](crate::StreamContext).
//!
//! [`ChunkReader`] serves an in-memory slice, optionally a few bytes at a time to mimic
//! packets arriving from a socket. With the `std` feature, [`IoReader`] adapts anything
//! implementing `std::io::Read`.
//!
//! # Example
//!
//! ```rust
//! use lazyjson::{parse_array, ChunkReader, StreamContext};
//!
//! let ctx = StreamContext::new(ChunkReader::new(b"[1, 2, 3]", 2));
//! let mut sum = 0u32;
//! parse_array(&ctx, |value| {
//!     sum += value.to::<u32>()?;
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(sum, 6);
//! ```

/// Trait for input sources feeding a stream context.
pub trait Reader {
    /// The error type returned by read operations
    type Error;

    /// Read data into the provided buffer.
    /// Returns the number of bytes read, or an error.
    ///
    /// # Contract
    /// - A return value of 0 **MUST** indicate true end of stream
    /// - Implementations may block until at least one byte is available
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// A [`Reader`] over a byte slice, handing out at most `chunk_size` bytes per call.
#[derive(Debug)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    chunk_size: usize,
}

impl<'a> ChunkReader<'a> {
    /// Create a reader returning at most `chunk_size` bytes (minimum 1) per `read()`.
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Create a reader that hands out as much of `data` as each buffer can hold.
    pub fn full_slice(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: usize::MAX,
        }
    }
}

impl Reader for ChunkReader<'_> {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = self.data.get(self.pos..).unwrap_or_default();
        let count = remaining.len().min(buf.len()).min(self.chunk_size);
        match (buf.get_mut(..count), remaining.get(..count)) {
            (Some(dest), Some(src)) => {
                dest.copy_from_slice(src);
                self.pos = self.pos.saturating_add(count);
                Ok(count)
            }
            _ => Ok(0),
        }
    }
}

/// Adapts a `std::io::Read` into a [`Reader`].
///
/// Interrupted reads are retried; any other I/O error is returned to the context.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoReader<R>(pub R);

#[cfg(feature = "std")]
impl<R: std::io::Read> Reader for IoReader<R> {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match self.0.read(buf) {
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_slice_reader_basic() {
        let mut reader = ChunkReader::full_slice(b"hello world");

        let mut buf = [0u8; 5];
        assert_eq!(reader.read(&mut buf), Ok(5));
        assert_eq!(&buf, b"hello");

        let mut buf = [0u8; 10];
        assert_eq!(reader.read(&mut buf), Ok(6));
        assert_eq!(&buf[..6], b" world");

        assert_eq!(reader.read(&mut buf), Ok(0));
    }

    #[test]
    fn test_chunk_reader_limits_each_read() {
        let mut reader = ChunkReader::new(b"hello world", 4);
        let mut buf = [0u8; 10];
        assert_eq!(reader.read(&mut buf), Ok(4));
        assert_eq!(&buf[..4], b"hell");
        assert_eq!(reader.read(&mut buf), Ok(4));
        assert_eq!(&buf[..4], b"o wo");
        assert_eq!(reader.read(&mut buf), Ok(3));
        assert_eq!(&buf[..3], b"rld");
        assert_eq!(reader.read(&mut buf), Ok(0));
    }

    #[test]
    fn test_chunk_reader_zero_chunk_size() {
        let mut reader = ChunkReader::new(b"hello", 0);
        let mut buf = [0u8; 10];
        assert_eq!(reader.read(&mut buf), Ok(1));
        assert_eq!(buf[0], b'h');
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_io_reader_reads_cursor() {
        let mut reader = IoReader(std::io::Cursor::new(b"[true]".to_vec()));
        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 6);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }
}
