//! Symbol Module
//!
//! Provides the interned symbol name used for class names, instance variable
//! names, struct members and extended modules.
//!
//! Symbols are immediates: they never occupy a slot in the object table. The
//! encoder and decoder keep a separate symbol table keyed by name.

use std::fmt;
use std::sync::Arc;

/// A Ruby symbol name
///
/// The name is a raw byte string; Ruby does not require symbol names to be
/// valid UTF-8. Cloning is cheap (shared buffer), and equality, ordering and
/// hashing are by name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: Arc<[u8]>,
}

impl Symbol {
    /// Create a symbol from its name bytes
    pub fn new(name: impl AsRef<[u8]>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    /// The raw name bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.name
    }

    /// The name as UTF-8 text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    /// Length of the name in bytes
    pub fn len(&self) -> usize {
        self.name.len()
    }

    /// Whether the name is empty
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Whether every byte of the name is 7-bit ASCII
    ///
    /// Non-ASCII UTF-8 symbols are written with an encoding ivar.
    pub fn is_ascii(&self) -> bool {
        self.name.is_ascii()
    }

    /// Whether this is an instance variable name (`@foo`)
    pub fn is_ivar_name(&self) -> bool {
        self.name.first() == Some(&b'@')
    }

    /// Return the name with a leading `@` removed, if present
    pub fn strip_ivar_prefix(&self) -> Symbol {
        match self.name.split_first() {
            Some((b'@', rest)) => Symbol::new(rest),
            _ => self.clone(),
        }
    }

    /// Return the name with a leading `@` added, unless already present
    pub fn with_ivar_prefix(&self) -> Symbol {
        if self.is_ivar_name() {
            return self.clone();
        }
        let mut name = Vec::with_capacity(self.name.len() + 1);
        name.push(b'@');
        name.extend_from_slice(&self.name);
        Symbol::new(name)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol::new(name)
    }
}

impl From<&[u8]> for Symbol {
    fn from(name: &[u8]) -> Self {
        Symbol::new(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", String::from_utf8_lossy(&self.name))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{:?}", String::from_utf8_lossy(&self.name))
    }
}
