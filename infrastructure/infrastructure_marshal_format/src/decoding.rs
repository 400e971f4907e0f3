//! Decoding Module
//!
//! Reads a Marshal 4.8 stream back into a [`Document`].
//! Based on r_object0(), r_symbol() and r_ivar() from marshal.c
//!
//! Every heap node is inserted into the heap and the object table as soon as
//! its tag and class are read, before any child is decoded. A child that
//! links back to an ancestor therefore resolves to the ancestor's handle, and
//! the ancestor is filled in once its children are known.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use entities_marshal_data::{
    Document, Heap, Node, Object, ObjectId, RegexpOptions, RubyClassValue, RubyHash, RubyObject,
    RubyRegexp, RubyString, RubyStruct, RubyUserDefined, RubyWrapped, Symbol, Value,
};
use infrastructure_numeric_encoding::{
    decode_bytes, decode_fixnum, decode_len, peek_byte, read_byte, BignumCodec,
    DecodeError as NumericDecodeError, FloatCodec,
};
use malachite::Integer;
use tracing::{debug, trace, warn};

use crate::constants::*;
use crate::options::{HashMode, IvarKeyMode, LoadOptions, NumericMode, StringMode};
use crate::reference_table::{ObjectLinks, SymbolLinks};

/// Decoding error types
///
/// Every error aborts the whole load; the format has no resync point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Input ended in the middle of a value
    #[error("marshal data too short: needed {needed} byte(s) at offset {offset}")]
    BufferTooShort { offset: usize, needed: usize },
    /// Header is not 4.8
    #[error("incompatible marshal file format (can't be read): format version 4.8 required; {major}.{minor} given")]
    InvalidVersion { major: u8, minor: u8 },
    /// Byte is not a Marshal tag
    #[error("dump format error (unknown type 0x{tag:02x}) at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },
    /// A valid tag where it cannot appear
    #[error("unexpected tag 0x{tag:02x} at offset {offset} while reading {context}")]
    UnexpectedTag {
        tag: u8,
        offset: usize,
        context: &'static str,
    },
    /// `@` index past the end of the object table
    #[error("dump format error (unlinked object {index}, table has {len})")]
    BadObjectLink { index: i64, len: usize },
    /// `;` index past the end of the symbol table
    #[error("dump format error (bad symbol link {index}, table has {len})")]
    BadSymbolLink { index: i64, len: usize },
    /// Structurally invalid input not covered by a more specific variant
    #[error("dump format error: {0}")]
    InvalidFormat(String),
    /// Nesting deeper than `LoadOptions::max_depth`
    #[error("marshal data nested deeper than {limit}")]
    DepthLimitExceeded { limit: usize },
}

impl From<NumericDecodeError> for FormatError {
    fn from(err: NumericDecodeError) -> Self {
        match err {
            NumericDecodeError::BufferTooShort { offset, needed } => {
                FormatError::BufferTooShort { offset, needed }
            }
            NumericDecodeError::InvalidFormat(msg) => FormatError::InvalidFormat(msg),
        }
    }
}

/// Hashable form of a hash key, agreeing with [`Heap::same_key`]
///
/// Strings project to their bytes, other heap objects to their handle.
/// Zeros of either sign share a key. NaN has none, since it never equals
/// another key.
#[derive(Debug, PartialEq, Eq, Hash)]
enum HashKey {
    Nil,
    Bool(bool),
    Integer(i64),
    Bignum(Integer),
    Float(u64),
    Symbol(Symbol),
    String(Vec<u8>),
    Object(ObjectId),
}

impl HashKey {
    fn of(heap: &Heap, value: &Value) -> Option<HashKey> {
        let key = match value {
            Value::Nil => HashKey::Nil,
            Value::Bool(b) => HashKey::Bool(*b),
            Value::Integer(n) => HashKey::Integer(*n),
            Value::Bignum(n) => HashKey::Bignum(n.clone()),
            Value::Float(f) if f.is_nan() => return None,
            Value::Float(f) if *f == 0.0 => HashKey::Float(0.0f64.to_bits()),
            Value::Float(f) => HashKey::Float(f.to_bits()),
            Value::Symbol(symbol) => HashKey::Symbol(symbol.clone()),
            Value::Object(id) => match heap.object(*id) {
                Some(Object::String(s)) => HashKey::String(s.as_bytes().to_vec()),
                _ => HashKey::Object(*id),
            },
        };
        Some(key)
    }
}

/// Marshal stream reader
///
/// A buffer may hold several consecutive sections; each
/// [`read_section`](Decoder::read_section) call decodes the next one with
/// fresh tables and a fresh heap.
pub struct Decoder<'a> {
    buf: &'a [u8],
    index: usize,
    options: &'a LoadOptions,
    heap: Heap,
    objects: ObjectLinks,
    symbols: SymbolLinks,
}

impl<'a> Decoder<'a> {
    /// Create a decoder positioned at the start of `buf`
    pub fn new(buf: &'a [u8], options: &'a LoadOptions) -> Self {
        Self {
            buf,
            index: 0,
            options,
            heap: Heap::new(),
            objects: ObjectLinks::new(),
            symbols: SymbolLinks::new(),
        }
    }

    /// Decode the first section of `buf`
    ///
    /// # Arguments
    /// * `buf` - Marshal bytes, starting with the `4, 8` header
    /// * `options` - Load options
    ///
    /// # Returns
    /// * `Ok(Document)` - The root value and its heap
    /// * `Err(FormatError)` - Malformed or truncated input
    pub fn decode(buf: &[u8], options: &LoadOptions) -> Result<Document, FormatError> {
        Decoder::new(buf, options).read_section()
    }

    /// Current read position
    pub fn position(&self) -> usize {
        self.index
    }

    /// Whether the whole buffer has been consumed
    pub fn is_at_end(&self) -> bool {
        self.index >= self.buf.len()
    }

    /// Decode the next section
    pub fn read_section(&mut self) -> Result<Document, FormatError> {
        self.heap = Heap::new();
        self.objects = ObjectLinks::new();
        self.symbols = SymbolLinks::new();

        let start = self.index;
        let major = read_byte(self.buf, &mut self.index)?;
        let minor = read_byte(self.buf, &mut self.index)?;
        if major != MAJOR_VERSION || minor != MINOR_VERSION {
            return Err(FormatError::InvalidVersion { major, minor });
        }

        let root = self.read_value(1)?;
        debug!(
            offset = start,
            bytes = self.index - start,
            objects = self.objects.len(),
            symbols = self.symbols.len(),
            "read marshal section"
        );
        Ok(Document::new(std::mem::take(&mut self.heap), root))
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.index)
    }

    fn read_value(&mut self, depth: usize) -> Result<Value, FormatError> {
        self.read_tagged(depth, false, Vec::new())
    }

    /// Read one tagged value
    ///
    /// `ivar` is set inside an `I` wrapper: the node read here owns the
    /// instance variables that follow it. `extends` collects the `e` markers
    /// seen so far; they belong to the node read here.
    fn read_tagged(
        &mut self,
        depth: usize,
        ivar: bool,
        mut extends: Vec<Symbol>,
    ) -> Result<Value, FormatError> {
        self.check_depth(depth)?;

        let offset = self.index;
        let tag = read_byte(self.buf, &mut self.index)?;
        trace!(offset, tag = tag_name(tag), "read tag");

        let id = match tag {
            TYPE_IVAR => {
                if ivar {
                    return Err(FormatError::UnexpectedTag { tag, offset, context: "ivar wrapper" });
                }
                if extends.is_empty() && peek_byte(self.buf, self.index) == Some(TYPE_SYMBOL) {
                    self.index += 1;
                    return Ok(Value::Symbol(self.read_symbol_body(depth, true)?));
                }
                return self.read_tagged(depth + 1, true, extends);
            }
            TYPE_EXTENDED => {
                let module = self.read_symbol(depth)?;
                extends.push(module);
                return self.read_tagged(depth + 1, ivar, extends);
            }
            TYPE_UCLASS => return self.read_wrapped(depth, ivar, extends),
            TYPE_USERDEF => return self.read_user_defined(depth, ivar, extends),

            TYPE_NIL | TYPE_TRUE | TYPE_FALSE | TYPE_FIXNUM | TYPE_SYMBOL | TYPE_SYMLINK
            | TYPE_LINK => {
                if ivar || !extends.is_empty() {
                    return Err(FormatError::UnexpectedTag { tag, offset, context: "object" });
                }
                return self.read_immediate(tag, depth);
            }

            TYPE_FLOAT | TYPE_BIGNUM => {
                if !extends.is_empty() {
                    return Err(FormatError::UnexpectedTag { tag, offset, context: "object" });
                }
                let (inline, boxed) = if tag == TYPE_FLOAT {
                    let f = FloatCodec::decode(self.buf, &mut self.index)?;
                    (Value::Float(f), Object::Float(f))
                } else {
                    let n = BignumCodec::decode(self.buf, &mut self.index)?;
                    let inline = match i64::try_from(&n) {
                        Ok(small) => Value::Integer(small),
                        Err(_) => Value::Bignum(n.clone()),
                    };
                    (inline, Object::Bignum(n))
                };
                match self.options.numeric_mode {
                    NumericMode::Inline => {
                        if ivar {
                            return Err(FormatError::UnexpectedTag { tag, offset, context: "object" });
                        }
                        self.objects.push(inline.clone());
                        return Ok(inline);
                    }
                    NumericMode::Boxed => self.alloc(boxed, extends),
                }
            }

            TYPE_STRING => {
                let bytes = decode_bytes(self.buf, &mut self.index)?.to_vec();
                let string = match self.options.string_mode {
                    StringMode::Bytes => RubyString::Bytes(bytes),
                    StringMode::Text => RubyString::Bytes(bytes).into_text(),
                };
                self.alloc(Object::String(string), extends)
            }
            TYPE_REGEXP => {
                let source = decode_bytes(self.buf, &mut self.index)?.to_vec();
                let options = RegexpOptions::from_bits_retain(read_byte(self.buf, &mut self.index)?);
                self.alloc(Object::Regexp(RubyRegexp::new(source, options)), extends)
            }
            TYPE_CLASS | TYPE_MODULE | TYPE_MODULE_OLD => {
                let name = decode_bytes(self.buf, &mut self.index)?.to_vec();
                let object = match tag {
                    TYPE_CLASS => Object::Class(name),
                    TYPE_MODULE => Object::Module(name),
                    _ => Object::ClassOrModule(name),
                };
                self.alloc(object, extends)
            }
            TYPE_ARRAY => self.read_array(depth, extends)?,
            TYPE_HASH | TYPE_HASH_DEF => self.read_hash(depth, tag == TYPE_HASH_DEF, extends)?,
            TYPE_OBJECT => self.read_object(depth, extends)?,
            TYPE_STRUCT => {
                let class = self.read_symbol(depth)?;
                let id = self.alloc(Object::Struct(RubyStruct::new(class, Vec::new())), extends);
                let members = self.read_ivars(depth)?;
                if let Some(Object::Struct(st)) = self.heap.object_mut(id) {
                    st.members = members;
                }
                id
            }
            TYPE_USRMARSHAL | TYPE_DATA => {
                let class = self.read_symbol(depth)?;
                let placeholder = RubyClassValue { class, value: Value::Nil };
                let object = if tag == TYPE_DATA {
                    Object::Data(placeholder)
                } else {
                    Object::UserMarshal(placeholder)
                };
                let id = self.alloc(object, extends);
                let value = self.read_value(depth + 1)?;
                if let Some(Object::UserMarshal(user) | Object::Data(user)) = self.heap.object_mut(id) {
                    user.value = value;
                }
                id
            }
            _ => return Err(FormatError::UnknownTag { tag, offset }),
        };

        if ivar {
            let ivars = self.read_ivars(depth)?;
            if let Some(node) = self.heap.get_mut(id) {
                node.ivars = ivars;
            }
        }
        Ok(Value::Object(id))
    }

    fn check_depth(&self, depth: usize) -> Result<(), FormatError> {
        let limit = self.options.max_depth;
        if depth > limit {
            warn!(limit, offset = self.index, "marshal data nested too deep");
            return Err(FormatError::DepthLimitExceeded { limit });
        }
        Ok(())
    }

    /// Insert a node and give it the next object-table slot
    fn alloc(&mut self, object: Object, extends: Vec<Symbol>) -> ObjectId {
        let id = self.heap.insert_node(Node::new(object).with_extends(extends));
        self.objects.push(Value::Object(id));
        id
    }

    fn read_immediate(&mut self, tag: u8, depth: usize) -> Result<Value, FormatError> {
        match tag {
            TYPE_NIL => Ok(Value::Nil),
            TYPE_TRUE => Ok(Value::Bool(true)),
            TYPE_FALSE => Ok(Value::Bool(false)),
            TYPE_FIXNUM => Ok(Value::Integer(decode_fixnum(self.buf, &mut self.index)?)),
            TYPE_SYMBOL => Ok(Value::Symbol(self.read_symbol_body(depth, false)?)),
            TYPE_SYMLINK => {
                let index = decode_fixnum(self.buf, &mut self.index)?;
                Ok(Value::Symbol(self.symbols.get(index)?.clone()))
            }
            _ => {
                let index = decode_fixnum(self.buf, &mut self.index)?;
                Ok(self.objects.get(index)?.clone())
            }
        }
    }

    /// Read a symbol in a position that only admits symbols
    fn read_symbol(&mut self, depth: usize) -> Result<Symbol, FormatError> {
        let offset = self.index;
        match read_byte(self.buf, &mut self.index)? {
            TYPE_SYMBOL => self.read_symbol_body(depth, false),
            TYPE_SYMLINK => {
                let index = decode_fixnum(self.buf, &mut self.index)?;
                Ok(self.symbols.get(index)?.clone())
            }
            TYPE_IVAR => {
                let inner = self.index;
                match read_byte(self.buf, &mut self.index)? {
                    TYPE_SYMBOL => self.read_symbol_body(depth, true),
                    tag => Err(FormatError::UnexpectedTag { tag, offset: inner, context: "symbol" }),
                }
            }
            tag => Err(FormatError::UnexpectedTag { tag, offset, context: "symbol" }),
        }
    }

    /// Symbol name after its `:` tag
    ///
    /// The symbol is registered before its encoding ivars, which are read
    /// and dropped.
    fn read_symbol_body(&mut self, depth: usize, ivar: bool) -> Result<Symbol, FormatError> {
        let symbol = Symbol::new(decode_bytes(self.buf, &mut self.index)?);
        self.symbols.push(symbol.clone());
        if ivar {
            self.read_ivars(depth + 1)?;
        }
        Ok(symbol)
    }

    fn read_ivars(&mut self, depth: usize) -> Result<Vec<(Symbol, Value)>, FormatError> {
        self.check_depth(depth)?;
        let count = decode_len(self.buf, &mut self.index)?;
        let mut ivars = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            let name = self.read_symbol(depth)?;
            let value = self.read_value(depth + 1)?;
            ivars.push((name, value));
        }
        Ok(ivars)
    }

    fn read_array(&mut self, depth: usize, extends: Vec<Symbol>) -> Result<ObjectId, FormatError> {
        let count = decode_len(self.buf, &mut self.index)?;
        let id = self.alloc(Object::Array(Vec::new()), extends);
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(self.read_value(depth + 1)?);
        }
        if let Some(slot) = self.heap.array_mut(id) {
            *slot = items;
        }
        Ok(id)
    }

    fn read_hash(
        &mut self,
        depth: usize,
        with_default: bool,
        extends: Vec<Symbol>,
    ) -> Result<ObjectId, FormatError> {
        let count = decode_len(self.buf, &mut self.index)?;
        let id = self.alloc(Object::Hash(RubyHash::default()), extends);
        let mut pairs: Vec<(Value, Value)> = Vec::with_capacity(count.min(self.remaining()));
        let mut positions: HashMap<HashKey, usize> = HashMap::new();
        for _ in 0..count {
            let key = self.read_value(depth + 1)?;
            let value = self.read_value(depth + 1)?;
            if self.options.hash_mode == HashMode::Map {
                if let Some(hash_key) = HashKey::of(&self.heap, &key) {
                    match positions.entry(hash_key) {
                        Entry::Occupied(slot) => {
                            pairs[*slot.get()].1 = value;
                            continue;
                        }
                        Entry::Vacant(slot) => {
                            slot.insert(pairs.len());
                        }
                    }
                }
            }
            pairs.push((key, value));
        }
        let default = if with_default {
            Some(self.read_value(depth + 1)?)
        } else {
            None
        };
        if let Some(hash) = self.heap.hash_mut(id) {
            hash.pairs = pairs;
            hash.default = default;
        }
        Ok(id)
    }

    /// `o`: a plain object, or a host value when the class is registered
    fn read_object(&mut self, depth: usize, extends: Vec<Symbol>) -> Result<ObjectId, FormatError> {
        let options = self.options;
        let class = self.read_symbol(depth)?;
        let id = self.alloc(Object::Object(RubyObject::new(class.clone(), Vec::new())), extends);

        let mut ivars = self.read_ivars(depth)?;
        if options.ivar_keys == IvarKeyMode::Bare {
            for (name, _) in ivars.iter_mut() {
                *name = name.strip_ivar_prefix();
            }
        }

        let object = match options.registry.as_deref().and_then(|r| r.constructor(&class)) {
            Some(constructor) => {
                debug!(class = %class, "constructing host object");
                Object::Host(constructor(ivars))
            }
            None => Object::Object(RubyObject { class, ivars }),
        };
        self.heap.replace(id, object);
        Ok(id)
    }

    /// `C`: wraps the built-in that follows in place; no slot of its own
    fn read_wrapped(
        &mut self,
        depth: usize,
        ivar: bool,
        extends: Vec<Symbol>,
    ) -> Result<Value, FormatError> {
        let offset = self.index - 1;
        let class = self.read_symbol(depth)?;
        let first_new = self.heap.len();
        let inner = self.read_tagged(depth + 1, false, extends)?;

        let id = inner
            .as_object()
            .filter(|id| id.index() >= first_new)
            .ok_or_else(|| {
                FormatError::InvalidFormat(format!("user class {} wraps a non-object at offset {}", class, offset))
            })?;
        let node = self
            .heap
            .get_mut(id)
            .ok_or_else(|| FormatError::InvalidFormat(format!("dangling node at offset {}", offset)))?;
        if !node.object.is_wrappable() {
            return Err(FormatError::InvalidFormat(format!(
                "user class {} wraps a {} at offset {}",
                class,
                node.object.kind(),
                offset
            )));
        }
        let object = std::mem::replace(&mut node.object, Object::Array(Vec::new()));
        node.object = Object::Wrapped(RubyWrapped {
            class,
            inner: Box::new(object),
        });

        if ivar {
            let ivars = self.read_ivars(depth)?;
            if let Some(node) = self.heap.get_mut(id) {
                node.ivars = ivars;
            }
        }
        Ok(inner)
    }

    /// `u`: class, opaque bytes, then ivars; the slot is taken last
    fn read_user_defined(
        &mut self,
        depth: usize,
        ivar: bool,
        extends: Vec<Symbol>,
    ) -> Result<Value, FormatError> {
        let class = self.read_symbol(depth)?;
        let data = decode_bytes(self.buf, &mut self.index)?.to_vec();
        let ivars = if ivar { self.read_ivars(depth)? } else { Vec::new() };
        let node = Node::new(Object::UserDefined(RubyUserDefined { class, data }))
            .with_ivars(ivars)
            .with_extends(extends);
        let id = self.heap.insert_node(node);
        self.objects.push(Value::Object(id));
        Ok(Value::Object(id))
    }
}
