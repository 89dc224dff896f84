//! Binary reader for zero-copy parsing of byte slices.
//!
//! [`BinaryReader`] is a cursor over a borrowed byte slice. Every multi-byte
//! integer is decoded as little-endian regardless of the host, and every read
//! is bounds-checked so a truncated buffer surfaces as
//! [`Error::UnexpectedEof`] instead of a panic.

use byteorder::{ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// # Example
///
/// ```
/// use ddslook_common::BinaryReader;
///
/// let data = [0x44, 0x44, 0x53, 0x20, 0x7C, 0x00, 0x00, 0x00];
/// let mut reader = BinaryReader::new(&data);
///
/// reader.expect_magic(b"DDS ").unwrap();
/// assert_eq!(reader.read_uint(4).unwrap(), 124);
/// assert_eq!(reader.remaining(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a new reader starting at a specific position.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        let end = self.position.saturating_add(count);
        self.data
            .get(self.position..end)
            .ok_or(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            })
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a little-endian unsigned integer of `count` bytes (1..=4).
    ///
    /// Packed pixels are read this way, including 24-bit RGB.
    #[inline]
    pub fn read_uint(&mut self, count: usize) -> Result<u32> {
        debug_assert!((1..=4).contains(&count));
        self.read_bytes(count)
            .map(|b| LittleEndian::read_uint(b, count) as u32)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }

    /// Expect specific magic bytes.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_uint_24() {
        let data = [0x11, 0x22, 0x33, 0x44];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_uint(3).unwrap(), 0x332211);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let reader = BinaryReader::new_at(&data, 2);

        assert_eq!(reader.peek_bytes(2).unwrap(), &[0x03, 0x04]);
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_expect_magic_mismatch() {
        let data = *b"DDX \x00";
        let mut reader = BinaryReader::new(&data);

        match reader.expect_magic(b"DDS ") {
            Err(Error::InvalidMagic { actual, .. }) => assert_eq!(actual, b"DDX "),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            reader.read_uint(4),
            Err(Error::UnexpectedEof { needed: 4, available: 2 })
        ));
    }
}
