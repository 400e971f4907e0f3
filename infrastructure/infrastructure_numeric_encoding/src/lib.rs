//! Infrastructure Layer: Numeric Encoding
//!
//! Low-level codecs for the numeric pieces of the Marshal 4.8 format:
//!
//! - **Fixnum**: the compact signed integer used for small integers, lengths
//!   and back-reference indices
//! - **Bignum**: sign byte, 16-bit word count, little-endian magnitude
//!   (arbitrary precision through malachite)
//! - **Float**: shortest round-trip decimal text
//!
//! All decoders share the cursor convention `fn(buf: &[u8], index: &mut usize)`
//! and report errors through [`DecodeError`].
//!
//! ## Examples
//!
//! ```rust
//! use infrastructure_numeric_encoding::{decode_fixnum, encode_fixnum};
//!
//! let mut buf = Vec::new();
//! encode_fixnum(&mut buf, 300).unwrap();
//! assert_eq!(buf, vec![0x02, 0x2c, 0x01]);
//!
//! let mut index = 0;
//! assert_eq!(decode_fixnum(&buf, &mut index).unwrap(), 300);
//! ```

/*
 * %CopyrightBegin%
 *
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 *
 * %CopyrightEnd%
 */

pub mod bignum_codec;
pub mod common;
pub mod fixnum_codec;
pub mod float_codec;

pub use bignum_codec::{bytes_to_integer, integer_to_bytes, BignumCodec, SIGN_NEGATIVE, SIGN_POSITIVE};
pub use common::{
    decode_bytes, decode_len, encode_bytes, encode_len, peek_byte, read_byte, read_slice,
    DecodeError, EncodeError,
};
pub use fixnum_codec::{decode_fixnum, encode_fixnum, LONG_MAX, LONG_MIN};
pub use float_codec::{format_float, parse_float, FloatCodec};
