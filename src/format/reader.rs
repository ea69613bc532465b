//! Bounds-checked cursor over an in-memory byte slice.

use super::error::{CodecError, Result};

/// Forward-only reader over a borrowed byte slice.
///
/// Every read checks the remaining length first and reports
/// [`CodecError::Truncated`] instead of panicking.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Offset of the cursor from the start of the slice.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Next byte without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Take the next `n` bytes.
    pub fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(CodecError::Truncated {
                what,
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self, what: &'static str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    /// Big-endian u16.
    pub fn read_u16(&mut self, what: &'static str) -> Result<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Everything left; the reader is empty afterwards.
    pub fn rest(&mut self) -> &'a [u8] {
        let bytes = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance() {
        let mut r = ByteReader::new(&[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(r.peek(), Some(0x12));
        assert_eq!(r.read_u16("short").unwrap(), 0x1234);
        assert_eq!(r.read_u8("byte").unwrap(), 0x56);
        assert_eq!(r.position(), 3);
        assert_eq!(r.rest(), &[0x78]);
        assert!(r.is_empty());
    }

    #[test]
    fn test_truncated() {
        let mut r = ByteReader::new(&[1, 2]);
        let err = r.take(3, "tile data").unwrap_err();
        assert!(matches!(
            err,
            CodecError::Truncated {
                what: "tile data",
                needed: 3,
                available: 2
            }
        ));
        // A failed read does not consume anything
        assert_eq!(r.remaining(), 2);
    }
}
