//! Generic chunk framing.
//!
//! ```text
//! signature: [u8; 2]
//! total_len: u16 (big-endian, header + padded body)
//! body:      total_len - 4 bytes
//! ```
//!
//! Odd bodies get one zero pad byte so every chunk starts on an even offset.

use super::error::{CodecError, Result};
use super::reader::ByteReader;

/// Two-byte ASCII chunk tag.
pub type Signature = [u8; 2];

/// Size of the signature + length header.
pub const HEADER_SIZE: usize = 4;

/// Largest padded body the 16-bit length field can describe.
pub const MAX_BODY_SIZE: usize = (u16::MAX as usize - HEADER_SIZE) & !1;

/// Printable form of a signature for messages.
pub fn signature_str(signature: &Signature) -> String {
    signature
        .iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { '?' })
        .collect()
}

/// A typed chunk body.
pub trait Section: Sized {
    const SIGNATURE: Signature;

    /// Append the unpadded body.
    fn write_body(&self, out: &mut Vec<u8>) -> Result<()>;

    /// Parse a body. May leave trailing bytes unread.
    fn read_body(r: &mut ByteReader<'_>) -> Result<Self>;

    /// Append the full chunk (header, body and padding).
    fn write_chunk(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut body = Vec::new();
        self.write_body(&mut body)?;
        write_chunk(Self::SIGNATURE, &body, out)
    }
}

/// Frame a body as a chunk.
pub fn write_chunk(signature: Signature, body: &[u8], out: &mut Vec<u8>) -> Result<()> {
    let padded = body.len() + (body.len() & 1);
    if padded > MAX_BODY_SIZE {
        return Err(CodecError::ValueTooLarge {
            value: padded + HEADER_SIZE,
            bits: 16,
        });
    }
    out.extend_from_slice(&signature);
    out.extend_from_slice(&((padded + HEADER_SIZE) as u16).to_be_bytes());
    out.extend_from_slice(body);
    if padded != body.len() {
        out.push(0);
    }
    Ok(())
}

/// An undecoded chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'a> {
    pub signature: Signature,
    /// Padded body.
    pub body: &'a [u8],
    /// Offset of the chunk header in the parent slice.
    pub offset: usize,
}

impl RawChunk<'_> {
    /// Decode the body as `T`, logging any trailing bytes `T` did not consume.
    pub fn parse<T: Section>(&self) -> Result<T> {
        let mut r = ByteReader::new(self.body);
        let section = T::read_body(&mut r)?;
        let rest = r.rest();
        if rest.iter().any(|&b| b != 0) {
            log::warn!(
                "ignoring {} non-zero trailing bytes in {} chunk at offset {}",
                rest.len(),
                signature_str(&self.signature),
                self.offset
            );
        }
        Ok(section)
    }

    /// Fail with `Format` unless this chunk's signature is in `known`.
    pub fn check_signature(&self, known: &[Signature]) -> Result<()> {
        if !known.contains(&self.signature) {
            return Err(CodecError::format(format!(
                "Unexpected chunk signature {} at offset {}",
                signature_str(&self.signature),
                self.offset
            )));
        }
        Ok(())
    }
}

/// Read the next chunk from `r`.
pub fn read_chunk<'a>(r: &mut ByteReader<'a>) -> Result<RawChunk<'a>> {
    let offset = r.position();
    let header = r.take(HEADER_SIZE, "chunk header")?;
    let signature = [header[0], header[1]];
    let total = u16::from_be_bytes([header[2], header[3]]) as usize;

    let body_len = total.checked_sub(HEADER_SIZE).ok_or_else(|| {
        CodecError::format(format!(
            "{} chunk at offset {offset} declares length {total}, shorter than its header",
            signature_str(&signature)
        ))
    })?;
    if body_len & 1 != 0 {
        return Err(CodecError::format(format!(
            "{} chunk at offset {offset} has odd body length {body_len}",
            signature_str(&signature)
        )));
    }

    let body = r.take(body_len, "chunk body")?;
    log::debug!(
        "chunk {} at offset {offset}: {body_len} body bytes",
        signature_str(&signature)
    );
    Ok(RawChunk {
        signature,
        body,
        offset,
    })
}

/// Iterator over the chunks of a byte slice. Stops after the first error.
pub struct Chunks<'a> {
    reader: ByteReader<'a>,
    failed: bool,
}

impl<'a> Chunks<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(bytes),
            failed: false,
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<RawChunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_empty() {
            return None;
        }
        let chunk = read_chunk(&mut self.reader);
        self.failed = chunk.is_err();
        Some(chunk)
    }
}

/// Split `bytes` into chunks, rejecting any signature not in `known`.
pub fn read_chunks<'a>(bytes: &'a [u8], known: &[Signature]) -> Result<Vec<RawChunk<'a>>> {
    Chunks::new(bytes)
        .map(|chunk| {
            let chunk = chunk?;
            chunk.check_signature(known)?;
            Ok(chunk)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_pads_odd_body() {
        let mut out = Vec::new();
        write_chunk(*b"A1", &[1, 2, 3], &mut out).unwrap();
        assert_eq!(out, vec![b'A', b'1', 0, 8, 1, 2, 3, 0]);

        let mut out = Vec::new();
        write_chunk(*b"A1", &[1, 2], &mut out).unwrap();
        assert_eq!(out, vec![b'A', b'1', 0, 6, 1, 2]);
    }

    #[test]
    fn test_write_too_large() {
        let mut out = Vec::new();
        assert!(write_chunk(*b"F1", &vec![0; MAX_BODY_SIZE], &mut out).is_ok());
        let err = write_chunk(*b"F1", &vec![0; MAX_BODY_SIZE + 1], &mut out).unwrap_err();
        assert!(matches!(err, CodecError::ValueTooLarge { bits: 16, .. }));
    }

    #[test]
    fn test_read_sequence() {
        let mut bytes = Vec::new();
        write_chunk(*b"P1", &[9], &mut bytes).unwrap();
        write_chunk(*b"A1", &[], &mut bytes).unwrap();

        let chunks = read_chunks(&bytes, &[*b"P1", *b"A1"]).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].signature, *b"P1");
        assert_eq!(chunks[0].body, &[9, 0]);
        assert_eq!(chunks[1].offset, 6);
        assert!(chunks[1].body.is_empty());
    }

    #[test]
    fn test_unknown_signature() {
        let mut bytes = Vec::new();
        write_chunk(*b"ZZ", &[], &mut bytes).unwrap();
        let err = read_chunks(&bytes, &[*b"P1"]).unwrap_err();
        assert!(matches!(err, CodecError::Format(_)));
    }

    #[test]
    fn test_unknown_signature_message() {
        let mut bytes = Vec::new();
        write_chunk(*b"P1", &[], &mut bytes).unwrap();
        write_chunk(*b"ZZ", &[], &mut bytes).unwrap();
        let err = read_chunks(&bytes, &[*b"P1"]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Format(ref msg) if msg == "Unexpected chunk signature ZZ at offset 4"
        ));
    }

    #[test]
    fn test_odd_length_rejected() {
        let bytes = [b'P', b'1', 0, 5, 0];
        assert!(matches!(
            read_chunks(&bytes, &[*b"P1"]),
            Err(CodecError::Format(_))
        ));
    }

    #[test]
    fn test_length_shorter_than_header() {
        let bytes = [b'P', b'1', 0, 2];
        assert!(matches!(
            read_chunks(&bytes, &[*b"P1"]),
            Err(CodecError::Format(_))
        ));
    }

    #[test]
    fn test_truncated_header_and_body() {
        assert!(matches!(
            read_chunks(&[b'P', b'1', 0], &[*b"P1"]),
            Err(CodecError::Truncated { .. })
        ));
        assert!(matches!(
            read_chunks(&[b'P', b'1', 0, 8, 1, 2], &[*b"P1"]),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let bytes = [b'P', b'1', 0, 5, 0, 0, 0];
        let mut chunks = Chunks::new(&bytes);
        assert!(chunks.next().unwrap().is_err());
        assert!(chunks.next().is_none());
    }
}
