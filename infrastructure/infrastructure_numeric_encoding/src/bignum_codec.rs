//! Bignum Codec Module
//!
//! Provides bignum encoding/decoding functionality.
//! Based on w_object/r_object's T_BIGNUM branches in marshal.c
//!
//! Body layout, after the `l` tag:
//! - sign byte, `+` or `-`
//! - length in 16-bit words, as a fixnum
//! - magnitude, little-endian bytes, zero padded to an even count

use malachite::base::num::conversion::traits::PowerOf2Digits;
use malachite::{Integer, Natural};

use crate::common::{encode_len, read_byte, read_slice, DecodeError, EncodeError};
use crate::fixnum_codec::decode_fixnum;

/// Sign byte for non-negative bignums
pub const SIGN_POSITIVE: u8 = b'+';

/// Sign byte for negative bignums
pub const SIGN_NEGATIVE: u8 = b'-';

/// Bignum codec
pub struct BignumCodec;

impl BignumCodec {
    /// Encode a bignum body (sign, word count, magnitude)
    ///
    /// # Arguments
    /// * `buf` - Output buffer
    /// * `value` - Integer to encode, any magnitude
    pub fn encode(buf: &mut Vec<u8>, value: &Integer) -> Result<(), EncodeError> {
        let (mut bytes, negative) = integer_to_bytes(value);
        if bytes.len() % 2 == 1 {
            bytes.push(0);
        }

        buf.push(if negative { SIGN_NEGATIVE } else { SIGN_POSITIVE });
        encode_len(buf, bytes.len() / 2)?;
        buf.extend_from_slice(&bytes);
        Ok(())
    }

    /// Decode a bignum body
    ///
    /// # Arguments
    /// * `buf` - Input buffer
    /// * `index` - Read position, just past the `l` tag
    ///
    /// # Returns
    /// * `Ok(Integer)` - The decoded value
    /// * `Err(DecodeError)` - Truncated input, bad sign byte or negative length
    pub fn decode(buf: &[u8], index: &mut usize) -> Result<Integer, DecodeError> {
        let sign_offset = *index;
        let negative = match read_byte(buf, index)? {
            SIGN_POSITIVE => false,
            SIGN_NEGATIVE => true,
            other => {
                return Err(DecodeError::InvalidFormat(format!(
                    "invalid bignum sign byte 0x{:02x} at offset {}",
                    other, sign_offset
                )))
            }
        };

        let words = decode_fixnum(buf, index)?;
        let byte_len = usize::try_from(words)
            .ok()
            .and_then(|words| words.checked_mul(2))
            .ok_or_else(|| DecodeError::InvalidFormat(format!("invalid bignum length {}", words)))?;
        let bytes = read_slice(buf, index, byte_len)?;
        Ok(bytes_to_integer(bytes, negative))
    }
}

/// Split an integer into little-endian magnitude bytes and a sign
///
/// The magnitude has no trailing zero bytes; zero yields an empty vector.
pub fn integer_to_bytes(value: &Integer) -> (Vec<u8>, bool) {
    let negative = *value < 0;
    let magnitude: &Natural = value.unsigned_abs_ref();
    let bytes = <Natural as PowerOf2Digits<u8>>::to_power_of_2_digits_asc(magnitude, 8);
    (bytes, negative)
}

/// Rebuild an integer from little-endian magnitude bytes and a sign
///
/// Trailing zero bytes are ignored.
pub fn bytes_to_integer(bytes: &[u8], negative: bool) -> Integer {
    let magnitude =
        <Natural as PowerOf2Digits<u8>>::from_power_of_2_digits_asc(8, bytes.iter().copied())
            .unwrap_or_else(|| Natural::from(0u32));
    let value = Integer::from(magnitude);
    if negative {
        -value
    } else {
        value
    }
}
