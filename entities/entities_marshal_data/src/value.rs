//! Value Module
//!
//! Provides the `Value` type: the immediate part of the Marshal value model.
//!
//! Values that Ruby treats as heap objects (strings, arrays, hashes, objects,
//! ...) are not stored inline. They live in a [`Heap`](crate::heap::Heap) and
//! a `Value` refers to them through an [`ObjectId`]. Two occurrences of the
//! same `ObjectId` are the same Ruby object, which is what lets the encoder
//! emit back-references and lets cyclic graphs exist at all.

use malachite::Integer;

use crate::heap::ObjectId;
use crate::symbol::Symbol;

/// Smallest integer representable as a Marshal fixnum (-2^30)
pub const FIXNUM_MIN: i64 = -(1 << 30);

/// Largest integer representable as a Marshal fixnum (2^30 - 1)
pub const FIXNUM_MAX: i64 = (1 << 30) - 1;

/// Whether `value` lies in the Marshal fixnum range [-2^30, 2^30)
///
/// The range is fixed by the format, not by the host integer width: an `i64`
/// outside this range is written as a bignum.
pub fn in_fixnum_range(value: i64) -> bool {
    (FIXNUM_MIN..=FIXNUM_MAX).contains(&value)
}

/// A Marshal value
///
/// # Variants
///
/// - **Nil / Bool**: `nil`, `true`, `false`
/// - **Integer**: any `i64`; encoded as a fixnum when in range, otherwise as a bignum
/// - **Bignum**: an arbitrary precision integer
/// - **Float**: an IEEE-754 double, including NaN, infinities and signed zero
/// - **Symbol**: an interned name
/// - **Object**: a handle to a node in the heap
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `nil`
    Nil,
    /// `true` / `false`
    Bool(bool),
    /// Integer that fits the host word
    Integer(i64),
    /// Arbitrary precision integer
    Bignum(Integer),
    /// Double precision float
    Float(f64),
    /// Symbol
    Symbol(Symbol),
    /// Heap object
    Object(ObjectId),
}

impl Value {
    /// Shorthand for a symbol value
    pub fn symbol(name: impl AsRef<[u8]>) -> Self {
        Value::Symbol(Symbol::new(name))
    }

    /// Whether this is `nil`
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Whether writing this value assigns a slot in the object table
    ///
    /// `nil`, booleans, fixnums and symbols are immediates. Floats, bignums
    /// (including out-of-range `Integer`s) and heap objects are not.
    pub fn is_referenceable(&self) -> bool {
        match self {
            Value::Nil | Value::Bool(_) | Value::Symbol(_) => false,
            Value::Integer(value) => !in_fixnum_range(*value),
            Value::Bignum(_) | Value::Float(_) | Value::Object(_) => true,
        }
    }

    /// The heap handle, if this value is a heap object
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// The symbol, if this value is a symbol
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// The boolean, if this value is `true` or `false`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The float, if this value is a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// The integer as an `i64`, if it is an integer that fits
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            Value::Bignum(value) => i64::try_from(value).ok(),
            _ => None,
        }
    }

    /// The integer as an arbitrary precision value, if it is an integer
    pub fn to_integer(&self) -> Option<Integer> {
        match self {
            Value::Integer(value) => Some(Integer::from(*value)),
            Value::Bignum(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Value::Bignum(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Value::Symbol(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixnum_range_boundaries() {
        assert!(in_fixnum_range(0));
        assert!(in_fixnum_range(FIXNUM_MIN));
        assert!(in_fixnum_range(FIXNUM_MAX));
        assert!(!in_fixnum_range(FIXNUM_MIN - 1));
        assert!(!in_fixnum_range(FIXNUM_MAX + 1));
        assert_eq!(FIXNUM_MAX, 1_073_741_823);
    }

    #[test]
    fn test_is_referenceable() {
        assert!(!Value::Nil.is_referenceable());
        assert!(!Value::Bool(true).is_referenceable());
        assert!(!Value::Integer(42).is_referenceable());
        assert!(Value::Integer(1 << 40).is_referenceable());
        assert!(!Value::symbol("a").is_referenceable());
        assert!(Value::Float(1.5).is_referenceable());
        assert!(Value::Bignum(Integer::from(7)).is_referenceable());
    }

    #[test]
    fn test_as_i64_from_bignum() {
        assert_eq!(Value::Bignum(Integer::from(-5)).as_i64(), Some(-5));
        assert_eq!(Value::Integer(3).as_i64(), Some(3));
        assert_eq!(Value::Nil.as_i64(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Nil);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
    }
}
