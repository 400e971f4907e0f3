//! Float Codec Module
//!
//! Floats travel as a length-prefixed decimal string. Based on w_float and
//! r_object's TYPE_FLOAT branch in marshal.c.
//!
//! The text form is the shortest decimal that reads back to the same double:
//! - `nan`, `inf`, `-inf` for the non-finite values
//! - `0` and `-0` for the zeros
//! - exponent notation (`1e2`, `1.5e-5`)
//!   when the decimal point falls outside `-3..=digits`
//! - plain decimal otherwise

use crate::common::{decode_bytes, encode_bytes, DecodeError, EncodeError};

/// Float codec
pub struct FloatCodec;

impl FloatCodec {
    /// Encode a float body (length-prefixed text)
    pub fn encode(buf: &mut Vec<u8>, value: f64) -> Result<(), EncodeError> {
        encode_bytes(buf, format_float(value).as_bytes())
    }

    /// Decode a float body
    pub fn decode(buf: &[u8], index: &mut usize) -> Result<f64, DecodeError> {
        let text = decode_bytes(buf, index)?;
        parse_float(text)
    }
}

/// Render a float the way Marshal writes it
///
/// # Examples
/// ```
/// use infrastructure_numeric_encoding::format_float;
/// assert_eq!(format_float(1.5), "1.5");
/// assert_eq!(format_float(100.0), "1e2");
/// assert_eq!(format_float(-0.0), "-0");
/// ```
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.2345e3"
    let scientific = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let digit_count = digits.len() as i32;
    let decpt = exponent + 1;

    let mut out = String::with_capacity(digits.len() + 8);
    if value < 0.0 {
        out.push('-');
    }

    if decpt < -3 || decpt > digit_count {
        out.push_str(&digits[..1]);
        if digit_count > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push_str(&(decpt - 1).to_string());
    } else if decpt > 0 {
        let point = decpt as usize;
        out.push_str(&digits[..point]);
        if digit_count > decpt {
            out.push('.');
            out.push_str(&digits[point..]);
        }
    } else {
        out.push_str("0.");
        for _ in 0..(-decpt) {
            out.push('0');
        }
        out.push_str(&digits);
    }
    out
}

/// Parse Marshal float text
///
/// Anything after the first NUL byte is ignored; older writers appended
/// mantissa bytes there.
pub fn parse_float(text: &[u8]) -> Result<f64, DecodeError> {
    let end = text.iter().position(|b| *b == 0).unwrap_or(text.len());
    let text = std::str::from_utf8(&text[..end])
        .map_err(|_| DecodeError::InvalidFormat("float text is not ASCII".to_string()))?;

    match text {
        "nan" => Ok(f64::NAN),
        "inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        _ => text
            .parse::<f64>()
            .map_err(|_| DecodeError::InvalidFormat(format!("invalid float text {:?}", text))),
    }
}
