//! Fixnum Codec
//!
//! Variable-length signed integer encoding used for every length, index and
//! small integer in a Marshal stream.
//!
//! Based on w_long/r_long in marshal.c.
//!
//! A single leading byte `c` decides the layout:
//! - `0` is zero
//! - `6..=127` is `c - 5` (1..=122)
//! - `-128..=-6` (as i8) is `c + 5` (-123..=-1)
//! - `1..=4` means `c` little-endian payload bytes, zero extended
//! - `-4..=-1` means `-c` little-endian payload bytes, sign extended from -1

use crate::common::{read_byte, read_slice, DecodeError, EncodeError};

/// Smallest value the long encoding can carry
pub const LONG_MIN: i64 = -(1 << 31);

/// Largest value the long encoding can carry
pub const LONG_MAX: i64 = (1 << 31) - 1;

/// Encode a signed value in the compact fixnum layout
///
/// # Arguments
/// * `buf` - Output buffer
/// * `value` - Value in `LONG_MIN..=LONG_MAX`
///
/// # Returns
/// `Err(EncodeError::ValueTooLarge)` when the value needs more than 4 bytes
pub fn encode_fixnum(buf: &mut Vec<u8>, value: i64) -> Result<(), EncodeError> {
    if !(LONG_MIN..=LONG_MAX).contains(&value) {
        return Err(EncodeError::ValueTooLarge(value as i128));
    }

    if value == 0 {
        buf.push(0);
        return Ok(());
    }
    if 0 < value && value < 123 {
        buf.push((value + 5) as u8);
        return Ok(());
    }
    if -124 < value && value < 0 {
        buf.push(((value - 5) & 0xff) as u8);
        return Ok(());
    }

    let mut payload = [0u8; 4];
    let mut x = value;
    let mut prefix = 0i8;
    for (i, slot) in payload.iter_mut().enumerate() {
        *slot = (x & 0xff) as u8;
        x >>= 8;
        let count = (i + 1) as i8;
        if x == 0 {
            prefix = count;
            break;
        }
        if x == -1 {
            prefix = -count;
            break;
        }
    }

    buf.push(prefix as u8);
    buf.extend_from_slice(&payload[..prefix.unsigned_abs() as usize]);
    Ok(())
}

/// Decode a fixnum
///
/// # Arguments
/// * `buf` - Input buffer
/// * `index` - Read position, advanced past the fixnum
pub fn decode_fixnum(buf: &[u8], index: &mut usize) -> Result<i64, DecodeError> {
    let c = read_byte(buf, index)? as i8;
    match c {
        0 => Ok(0),
        1..=4 => {
            let bytes = read_slice(buf, index, c as usize)?;
            let mut x = 0i64;
            for (i, byte) in bytes.iter().enumerate() {
                x |= (*byte as i64) << (8 * i);
            }
            Ok(x)
        }
        -4..=-1 => {
            let bytes = read_slice(buf, index, c.unsigned_abs() as usize)?;
            let mut x = -1i64;
            for (i, byte) in bytes.iter().enumerate() {
                x &= !(0xff << (8 * i));
                x |= (*byte as i64) << (8 * i);
            }
            Ok(x)
        }
        c if c > 0 => Ok(c as i64 - 5),
        c => Ok(c as i64 + 5),
    }
}
