//! Dump and Load Options
//!
//! Presentation knobs over the core codec. None of them change what bytes
//! are accepted; they only choose how decoded values are represented and how
//! instance-variable names are spelled.

use std::sync::Arc;

use crate::class_registry::ClassRegistry;

/// Default bound on nesting depth, for both dump and load
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// How decoded string bytes are presented
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StringMode {
    /// Keep raw bytes
    #[default]
    Bytes,
    /// Convert to UTF-8 text when the bytes are valid UTF-8
    Text,
}

/// How decoded floats and bignums are presented
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumericMode {
    /// `Value::Float` / `Value::Integer` / `Value::Bignum`; a bignum that fits
    /// in `i64` becomes `Value::Integer`
    ///
    /// Inline numbers have no identity. On dump, equal floats or bignums
    /// share one object-table slot, so a stream holding two distinct but
    /// equal bignums re-encodes with a `@` link in place of the second body.
    /// Use `Boxed` when the exact bytes must survive a load/dump cycle.
    #[default]
    Inline,
    /// Heap nodes (`Object::Float`, `Object::Bignum`) so that shared
    /// references keep their identity
    Boxed,
}

/// How decoded hashes are presented
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HashMode {
    /// Every pair as written, duplicates included
    #[default]
    Entries,
    /// Duplicate keys collapse; the last value wins at the first key's position
    Map,
}

/// How object instance-variable names are spelled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IvarKeyMode {
    /// As in the stream, `@name`
    #[default]
    Prefixed,
    /// Without the leading `@`; dump adds it back
    Bare,
}

/// Options rejected at call entry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// `max_depth` of zero would reject every input
    #[error("max_depth must be at least 1")]
    ZeroDepthLimit,
}

/// Options for `dump`
#[derive(Clone, Debug)]
pub struct DumpOptions {
    /// Spelling of object ivar names in the heap
    pub ivar_keys: IvarKeyMode,
    /// Class names for host values
    pub registry: Option<Arc<ClassRegistry>>,
    /// Deepest chain of nested heap objects written before the dump is
    /// aborted
    pub max_depth: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            ivar_keys: IvarKeyMode::default(),
            registry: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check the options before a dump starts
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_depth == 0 {
            return Err(ConfigurationError::ZeroDepthLimit);
        }
        Ok(())
    }

    pub fn with_ivar_keys(mut self, mode: IvarKeyMode) -> Self {
        self.ivar_keys = mode;
        self
    }

    pub fn with_registry(mut self, registry: Arc<ClassRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }
}

/// Options for `load`
#[derive(Clone, Debug)]
pub struct LoadOptions {
    pub string_mode: StringMode,
    pub numeric_mode: NumericMode,
    pub hash_mode: HashMode,
    /// Spelling of object ivar names in the decoded heap
    pub ivar_keys: IvarKeyMode,
    /// Host constructors for known classes
    pub registry: Option<Arc<ClassRegistry>>,
    /// Deepest nesting accepted before the decode is aborted
    pub max_depth: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            string_mode: StringMode::default(),
            numeric_mode: NumericMode::default(),
            hash_mode: HashMode::default(),
            ivar_keys: IvarKeyMode::default(),
            registry: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string_mode(mut self, mode: StringMode) -> Self {
        self.string_mode = mode;
        self
    }

    pub fn with_numeric_mode(mut self, mode: NumericMode) -> Self {
        self.numeric_mode = mode;
        self
    }

    pub fn with_hash_mode(mut self, mode: HashMode) -> Self {
        self.hash_mode = mode;
        self
    }

    pub fn with_ivar_keys(mut self, mode: IvarKeyMode) -> Self {
        self.ivar_keys = mode;
        self
    }

    pub fn with_registry(mut self, registry: Arc<ClassRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check the options before a load starts
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_depth == 0 {
            return Err(ConfigurationError::ZeroDepthLimit);
        }
        Ok(())
    }
}
