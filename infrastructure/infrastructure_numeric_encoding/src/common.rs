//! Common Encoding/Decoding Utilities
//!
//! Provides the error types and the low-level cursor helpers shared by the
//! fixnum, bignum and float codecs.
//!
//! Decoding functions follow one convention: they take the whole buffer and a
//! mutable read position, advance the position past what they consumed, and
//! fail with [`DecodeError::BufferTooShort`] as soon as a read would run past
//! the end of the buffer.

use crate::fixnum_codec::{decode_fixnum, encode_fixnum};

/// Encoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The value does not fit the 32-bit `long` Marshal uses for lengths
    #[error("long too big to dump: {0}")]
    ValueTooLarge(i128),
}

/// Decoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A read ran past the end of the buffer
    #[error("marshal data too short: needed {needed} byte(s) at offset {offset}")]
    BufferTooShort {
        /// Read position
        offset: usize,
        /// Bytes requested
        needed: usize,
    },
    /// Bytes are present but do not form a valid encoding
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

/// Read one byte and advance
pub fn read_byte(buf: &[u8], index: &mut usize) -> Result<u8, DecodeError> {
    let byte = *buf.get(*index).ok_or(DecodeError::BufferTooShort {
        offset: *index,
        needed: 1,
    })?;
    *index += 1;
    Ok(byte)
}

/// Peek at the next byte without advancing
pub fn peek_byte(buf: &[u8], index: usize) -> Option<u8> {
    buf.get(index).copied()
}

/// Read `len` bytes and advance
pub fn read_slice<'a>(buf: &'a [u8], index: &mut usize, len: usize) -> Result<&'a [u8], DecodeError> {
    let end = index
        .checked_add(len)
        .filter(|end| *end <= buf.len())
        .ok_or(DecodeError::BufferTooShort {
            offset: *index,
            needed: len,
        })?;
    let slice = &buf[*index..end];
    *index = end;
    Ok(slice)
}

/// Write a length (element count or byte count) as a fixnum
pub fn encode_len(buf: &mut Vec<u8>, len: usize) -> Result<(), EncodeError> {
    let len = i64::try_from(len).map_err(|_| EncodeError::ValueTooLarge(len as i128))?;
    encode_fixnum(buf, len)
}

/// Read a length written by [`encode_len`]
///
/// A negative length is a format error.
pub fn decode_len(buf: &[u8], index: &mut usize) -> Result<usize, DecodeError> {
    let start = *index;
    let len = decode_fixnum(buf, index)?;
    usize::try_from(len).map_err(|_| {
        DecodeError::InvalidFormat(format!("negative length {} at offset {}", len, start))
    })
}

/// Write a length-prefixed byte chunk
///
/// # Arguments
/// * `buf` - Output buffer
/// * `bytes` - Chunk contents
pub fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<(), EncodeError> {
    encode_len(buf, bytes.len())?;
    buf.extend_from_slice(bytes);
    Ok(())
}

/// Read a length-prefixed byte chunk
///
/// # Returns
/// * `Ok(bytes)` - The chunk contents, borrowed from `buf`
/// * `Err(DecodeError)` - Truncated buffer or negative length
pub fn decode_bytes<'a>(buf: &'a [u8], index: &mut usize) -> Result<&'a [u8], DecodeError> {
    let len = decode_len(buf, index)?;
    read_slice(buf, index, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_byte_advances() {
        let buf = [1, 2];
        let mut index = 0;
        assert_eq!(read_byte(&buf, &mut index), Ok(1));
        assert_eq!(read_byte(&buf, &mut index), Ok(2));
        assert_eq!(
            read_byte(&buf, &mut index),
            Err(DecodeError::BufferTooShort { offset: 2, needed: 1 })
        );
    }

    #[test]
    fn test_read_slice_out_of_bounds() {
        let buf = [1, 2, 3];
        let mut index = 1;
        assert!(read_slice(&buf, &mut index, 5).is_err());
        assert_eq!(index, 1);
        assert_eq!(read_slice(&buf, &mut index, 2), Ok(&buf[1..3]));
        assert_eq!(index, 3);
    }

    #[test]
    fn test_bytes_chunk() {
        let mut buf = Vec::new();
        encode_bytes(&mut buf, b"hello").unwrap();
        assert_eq!(buf, vec![10, b'h', b'e', b'l', b'l', b'o']);

        let mut index = 0;
        assert_eq!(decode_bytes(&buf, &mut index).unwrap(), b"hello");
        assert_eq!(index, buf.len());
    }

    #[test]
    fn test_negative_length_rejected() {
        // fixnum -1
        let buf = [0xfa];
        let mut index = 0;
        assert!(matches!(
            decode_len(&buf, &mut index),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_truncated_chunk() {
        let buf = [10, b'h'];
        let mut index = 0;
        assert!(matches!(
            decode_bytes(&buf, &mut index),
            Err(DecodeError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_peek_byte() {
        assert_eq!(peek_byte(&[7], 0), Some(7));
        assert_eq!(peek_byte(&[7], 1), None);
    }
}
