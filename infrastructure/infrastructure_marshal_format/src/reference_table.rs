//! Reference Tables
//!
//! The object and symbol tables that implement sharing in a Marshal stream.
//!
//! Both directions assign indices in the order values are first written or
//! read, with one independent counter per table. The encoder side maps a key
//! to its index; the decoder side is a plain vector whose position is the
//! index.

use std::collections::HashMap;

use entities_marshal_data::{ObjectId, Symbol, Value};
use malachite::Integer;

use crate::decoding::FormatError;

/// Identity of a value occupying an object-table slot
///
/// Heap nodes are identified by handle. Inline floats and bignums have no
/// handle and are identified by value, so equal numbers share a slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKey {
    Node(ObjectId),
    Float(u64),
    Bignum(Integer),
}

impl ObjectKey {
    /// Key for an inline float; all NaNs share one key
    pub fn float(value: f64) -> Self {
        if value.is_nan() {
            ObjectKey::Float(f64::NAN.to_bits())
        } else {
            ObjectKey::Float(value.to_bits())
        }
    }
}

/// Encoder object table
#[derive(Debug, Default)]
pub struct ObjectTable {
    indices: HashMap<ObjectKey, usize>,
}

impl ObjectTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Index previously assigned to `key`
    pub fn lookup(&self, key: &ObjectKey) -> Option<usize> {
        self.indices.get(key).copied()
    }

    /// Assign the next index to `key`, keeping an existing one
    pub fn remember(&mut self, key: ObjectKey) -> usize {
        let next = self.indices.len();
        *self.indices.entry(key).or_insert(next)
    }

    /// Number of assigned slots
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Encoder symbol table
#[derive(Debug, Default)]
pub struct SymbolTable {
    indices: HashMap<Symbol, usize>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Index previously assigned to `symbol`
    pub fn lookup(&self, symbol: &Symbol) -> Option<usize> {
        self.indices.get(symbol).copied()
    }

    /// Assign the next index to `symbol`, keeping an existing one
    pub fn remember(&mut self, symbol: Symbol) -> usize {
        let next = self.indices.len();
        *self.indices.entry(symbol).or_insert(next)
    }

    /// Number of assigned slots
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Decoder object table
///
/// Holds the value each slot resolves to: `Value::Object` for heap nodes,
/// the number itself for inline floats and bignums.
#[derive(Debug, Default)]
pub struct ObjectLinks {
    entries: Vec<Value>,
}

impl ObjectLinks {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slot and return its index
    pub fn push(&mut self, value: Value) -> usize {
        self.entries.push(value);
        self.entries.len() - 1
    }

    /// Resolve an `@` back-reference
    pub fn get(&self, index: i64) -> Result<&Value, FormatError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i))
            .ok_or(FormatError::BadObjectLink {
                index,
                len: self.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decoder symbol table
#[derive(Debug, Default)]
pub struct SymbolLinks {
    entries: Vec<Symbol>,
}

impl SymbolLinks {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol and return its index
    pub fn push(&mut self, symbol: Symbol) -> usize {
        self.entries.push(symbol);
        self.entries.len() - 1
    }

    /// Resolve a `;` back-reference
    pub fn get(&self, index: i64) -> Result<&Symbol, FormatError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i))
            .ok_or(FormatError::BadSymbolLink {
                index,
                len: self.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_table_assigns_in_order() {
        let mut table = ObjectTable::new();
        assert_eq!(table.remember(ObjectKey::float(1.5)), 0);
        assert_eq!(table.remember(ObjectKey::Bignum(Integer::from(1i64 << 40))), 1);
        assert_eq!(table.remember(ObjectKey::float(1.5)), 0);
        assert_eq!(table.lookup(&ObjectKey::float(-1.5)), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_signed_zero_keys_differ() {
        let mut table = ObjectTable::new();
        table.remember(ObjectKey::float(0.0));
        assert_eq!(table.lookup(&ObjectKey::float(-0.0)), None);
    }

    #[test]
    fn test_symbol_table() {
        let mut table = SymbolTable::new();
        assert!(table.is_empty());
        assert_eq!(table.remember(Symbol::from("a")), 0);
        assert_eq!(table.remember(Symbol::from("b")), 1);
        assert_eq!(table.lookup(&Symbol::from("a")), Some(0));
    }

    #[test]
    fn test_object_links_bounds() {
        let mut links = ObjectLinks::new();
        links.push(Value::Float(2.5));
        assert_eq!(links.get(0), Ok(&Value::Float(2.5)));
        assert_eq!(links.get(1), Err(FormatError::BadObjectLink { index: 1, len: 1 }));
        assert_eq!(links.get(-1), Err(FormatError::BadObjectLink { index: -1, len: 1 }));
    }

    #[test]
    fn test_symbol_links_bounds() {
        let mut links = SymbolLinks::new();
        assert_eq!(links.push(Symbol::from("x")), 0);
        assert_eq!(links.get(0), Ok(&Symbol::from("x")));
        assert!(matches!(links.get(3), Err(FormatError::BadSymbolLink { index: 3, len: 1 })));
    }
}
