//! Encoding Module
//!
//! Writes a value graph as a Marshal 4.8 stream.
//! Based on w_object(), w_symbol() and w_ivar() from marshal.c
//!
//! Layout of one heap node, in stream order:
//!
//! ```text
//! [I] [e module]* [C class] tag body [ivar-count (symbol value)*]
//! ```
//!
//! The node takes its object-table slot before the `I` prefix is written,
//! except for `u` objects, which take it after their instance variables.

use entities_marshal_data::{
    in_fixnum_range, Heap, HostRef, Node, Object, ObjectId, RubyHash, Symbol, Value,
};
use infrastructure_numeric_encoding::{
    encode_bytes, encode_fixnum, encode_len, BignumCodec, EncodeError as NumericEncodeError,
    FloatCodec,
};
use malachite::Integer;
use tracing::{debug, trace};

use crate::constants::*;
use crate::options::{DumpOptions, IvarKeyMode};
use crate::reference_table::{ObjectKey, ObjectTable, SymbolTable};

/// Encoding error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The value has no Marshal representation
    #[error("can't dump {0}")]
    UnsupportedValue(String),
    /// Heap objects nested deeper than `DumpOptions::max_depth`
    #[error("object graph nested deeper than {limit}")]
    DepthLimitExceeded { limit: usize },
    /// A length or count exceeds the format's 32-bit limit
    #[error(transparent)]
    Numeric(#[from] NumericEncodeError),
}

/// Marshal stream writer
///
/// One encoder can write several consecutive sections; each section starts
/// with a fresh pair of reference tables.
pub struct Encoder<'a> {
    heap: &'a Heap,
    options: &'a DumpOptions,
    buf: Vec<u8>,
    objects: ObjectTable,
    symbols: SymbolTable,
    // `u` nodes whose ivars are being written; they have no slot yet
    pending_user_defined: Vec<ObjectId>,
    depth: usize,
}

impl<'a> Encoder<'a> {
    /// Create an encoder over `heap` with an empty output buffer
    pub fn new(heap: &'a Heap, options: &'a DumpOptions) -> Self {
        Self {
            heap,
            options,
            buf: Vec::with_capacity(16),
            objects: ObjectTable::new(),
            symbols: SymbolTable::new(),
            pending_user_defined: Vec::new(),
            depth: 0,
        }
    }

    /// Encode one value as a complete stream
    ///
    /// # Arguments
    /// * `heap` - Heap that owns every node `value` reaches
    /// * `value` - Root value
    /// * `options` - Dump options
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - Header followed by the encoded value
    /// * `Err(EncodeError)` - The graph contains an unrepresentable value
    pub fn encode(heap: &Heap, value: &Value, options: &DumpOptions) -> Result<Vec<u8>, EncodeError> {
        let mut encoder = Encoder::new(heap, options);
        encoder.write_section(value)?;
        Ok(encoder.finish())
    }

    /// Append a header and one value with fresh reference tables
    pub fn write_section(&mut self, value: &Value) -> Result<(), EncodeError> {
        self.objects = ObjectTable::new();
        self.symbols = SymbolTable::new();
        self.pending_user_defined.clear();
        self.depth = 0;

        let start = self.buf.len();
        self.buf.push(MAJOR_VERSION);
        self.buf.push(MINOR_VERSION);
        self.write_value(value)?;
        debug!(
            bytes = self.buf.len() - start,
            objects = self.objects.len(),
            symbols = self.symbols.len(),
            "wrote marshal section"
        );
        Ok(())
    }

    /// Take the encoded bytes
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn write_value(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Nil => self.buf.push(TYPE_NIL),
            Value::Bool(true) => self.buf.push(TYPE_TRUE),
            Value::Bool(false) => self.buf.push(TYPE_FALSE),
            Value::Integer(n) => {
                if in_fixnum_range(*n) {
                    self.write_fixnum(*n)?;
                } else {
                    self.write_inline_bignum(Integer::from(*n))?;
                }
            }
            Value::Bignum(n) => match i64::try_from(n) {
                Ok(small) if in_fixnum_range(small) => self.write_fixnum(small)?,
                _ => self.write_inline_bignum(n.clone())?,
            },
            Value::Float(f) => {
                let key = ObjectKey::float(*f);
                if let Some(index) = self.objects.lookup(&key) {
                    self.write_link(index)?;
                } else {
                    self.objects.remember(key);
                    self.buf.push(TYPE_FLOAT);
                    FloatCodec::encode(&mut self.buf, *f)?;
                }
            }
            Value::Symbol(symbol) => self.write_symbol(symbol)?,
            Value::Object(id) => self.write_node(*id)?,
        }
        Ok(())
    }

    fn write_fixnum(&mut self, n: i64) -> Result<(), EncodeError> {
        self.buf.push(TYPE_FIXNUM);
        encode_fixnum(&mut self.buf, n)?;
        Ok(())
    }

    fn write_inline_bignum(&mut self, n: Integer) -> Result<(), EncodeError> {
        if let Some(index) = self.objects.lookup(&ObjectKey::Bignum(n.clone())) {
            return self.write_link(index);
        }
        self.buf.push(TYPE_BIGNUM);
        BignumCodec::encode(&mut self.buf, &n)?;
        self.objects.remember(ObjectKey::Bignum(n));
        Ok(())
    }

    fn write_link(&mut self, index: usize) -> Result<(), EncodeError> {
        self.buf.push(TYPE_LINK);
        encode_len(&mut self.buf, index)?;
        Ok(())
    }

    /// Write a symbol, or a `;` link if it was already written
    ///
    /// Non-ASCII UTF-8 names carry an `E => true` encoding ivar.
    fn write_symbol(&mut self, symbol: &Symbol) -> Result<(), EncodeError> {
        if let Some(index) = self.symbols.lookup(symbol) {
            self.buf.push(TYPE_SYMLINK);
            encode_len(&mut self.buf, index)?;
            return Ok(());
        }

        let utf8 = !symbol.is_ascii() && symbol.as_str().is_some();
        if utf8 {
            self.buf.push(TYPE_IVAR);
        }
        self.buf.push(TYPE_SYMBOL);
        encode_bytes(&mut self.buf, symbol.as_bytes())?;
        self.symbols.remember(symbol.clone());
        if utf8 {
            encode_len(&mut self.buf, 1)?;
            self.write_symbol(&Symbol::new(ENCODING_SHORT_IVAR))?;
            self.buf.push(TYPE_TRUE);
        }
        Ok(())
    }

    fn write_node(&mut self, id: ObjectId) -> Result<(), EncodeError> {
        if self.pending_user_defined.contains(&id) {
            return Err(EncodeError::UnsupportedValue(format!(
                "user-defined object #{} referenced from its own instance variables",
                id.index()
            )));
        }
        if let Some(index) = self.objects.lookup(&ObjectKey::Node(id)) {
            return self.write_link(index);
        }

        let limit = self.options.max_depth;
        if self.depth >= limit {
            debug!(limit, id = id.index(), "object graph nested too deep");
            return Err(EncodeError::DepthLimitExceeded { limit });
        }
        self.depth += 1;
        let written = self.write_node_body(id);
        self.depth -= 1;
        written
    }

    fn write_node_body(&mut self, id: ObjectId) -> Result<(), EncodeError> {
        let heap = self.heap;
        let node = heap.get(id).ok_or_else(|| {
            EncodeError::UnsupportedValue(format!("dangling object handle #{}", id.index()))
        })?;
        trace!(id = id.index(), kind = node.object.kind(), "writing node");

        if let Object::UserDefined(user) = &node.object {
            if !node.ivars.is_empty() {
                self.buf.push(TYPE_IVAR);
            }
            self.write_extends(node)?;
            self.buf.push(TYPE_USERDEF);
            self.write_symbol(&user.class)?;
            encode_bytes(&mut self.buf, &user.data)?;
            if !node.ivars.is_empty() {
                self.pending_user_defined.push(id);
                let written = self.write_ivars(&node.ivars);
                self.pending_user_defined.pop();
                written?;
            }
            self.objects.remember(ObjectKey::Node(id));
            return Ok(());
        }

        self.objects.remember(ObjectKey::Node(id));
        if !node.ivars.is_empty() {
            self.buf.push(TYPE_IVAR);
        }
        self.write_extends(node)?;
        self.write_object(&node.object)?;
        if !node.ivars.is_empty() {
            self.write_ivars(&node.ivars)?;
        }
        Ok(())
    }

    fn write_extends(&mut self, node: &Node) -> Result<(), EncodeError> {
        if !node.extends.is_empty()
            && matches!(
                node.object,
                Object::Class(_)
                    | Object::Module(_)
                    | Object::ClassOrModule(_)
                    | Object::Float(_)
                    | Object::Bignum(_)
            )
        {
            return Err(EncodeError::UnsupportedValue(format!(
                "{} with extended modules",
                node.object.kind()
            )));
        }
        for module in &node.extends {
            self.buf.push(TYPE_EXTENDED);
            self.write_symbol(module)?;
        }
        Ok(())
    }

    /// Tag and body of a node, without the `I` and `e` prefixes
    fn write_object(&mut self, object: &Object) -> Result<(), EncodeError> {
        match object {
            Object::String(s) => {
                self.buf.push(TYPE_STRING);
                encode_bytes(&mut self.buf, s.as_bytes())?;
            }
            Object::Array(items) => {
                self.buf.push(TYPE_ARRAY);
                encode_len(&mut self.buf, items.len())?;
                for item in items {
                    self.write_value(item)?;
                }
            }
            Object::Hash(hash) => self.write_hash(hash)?,
            Object::Regexp(regexp) => {
                self.buf.push(TYPE_REGEXP);
                encode_bytes(&mut self.buf, &regexp.source)?;
                self.buf.push(regexp.options.bits());
            }
            Object::Object(object) => {
                self.buf.push(TYPE_OBJECT);
                self.write_symbol(&object.class)?;
                self.write_object_ivars(&object.ivars)?;
            }
            Object::Struct(st) => {
                self.buf.push(TYPE_STRUCT);
                self.write_symbol(&st.class)?;
                self.write_ivars(&st.members)?;
            }
            Object::Class(name) => {
                self.buf.push(TYPE_CLASS);
                encode_bytes(&mut self.buf, name)?;
            }
            Object::Module(name) => {
                self.buf.push(TYPE_MODULE);
                encode_bytes(&mut self.buf, name)?;
            }
            Object::ClassOrModule(name) => {
                self.buf.push(TYPE_MODULE_OLD);
                encode_bytes(&mut self.buf, name)?;
            }
            Object::UserMarshal(user) => {
                self.buf.push(TYPE_USRMARSHAL);
                self.write_symbol(&user.class)?;
                self.write_value(&user.value)?;
            }
            Object::Data(data) => {
                self.buf.push(TYPE_DATA);
                self.write_symbol(&data.class)?;
                self.write_value(&data.value)?;
            }
            Object::Wrapped(wrapped) => {
                if !wrapped.inner.is_wrappable() {
                    return Err(EncodeError::UnsupportedValue(format!(
                        "{} subclass {}",
                        wrapped.inner.kind(),
                        wrapped.class
                    )));
                }
                self.buf.push(TYPE_UCLASS);
                self.write_symbol(&wrapped.class)?;
                self.write_object(&wrapped.inner)?;
            }
            Object::Float(f) => {
                self.buf.push(TYPE_FLOAT);
                FloatCodec::encode(&mut self.buf, *f)?;
            }
            Object::Bignum(n) => {
                self.buf.push(TYPE_BIGNUM);
                BignumCodec::encode(&mut self.buf, n)?;
            }
            Object::UserDefined(_) => {
                return Err(EncodeError::UnsupportedValue(
                    "user-defined object in a nested position".to_string(),
                ))
            }
            Object::Host(host) => self.write_host(host)?,
        }
        Ok(())
    }

    fn write_hash(&mut self, hash: &RubyHash) -> Result<(), EncodeError> {
        self.buf.push(if hash.default.is_some() { TYPE_HASH_DEF } else { TYPE_HASH });
        encode_len(&mut self.buf, hash.pairs.len())?;
        for (key, value) in &hash.pairs {
            self.write_value(key)?;
            self.write_value(value)?;
        }
        if let Some(default) = &hash.default {
            self.write_value(default)?;
        }
        Ok(())
    }

    fn write_host(&mut self, host: &HostRef) -> Result<(), EncodeError> {
        let class = self
            .options
            .registry
            .as_ref()
            .and_then(|registry| registry.class_name_of(host))
            .ok_or_else(|| EncodeError::UnsupportedValue(format!("{:?}", host)))?;
        self.buf.push(TYPE_OBJECT);
        self.write_symbol(&class)?;
        self.write_object_ivars(&host.instance_variables())
    }

    /// Instance variables of an `o` object, spelled per the ivar key mode
    fn write_object_ivars(&mut self, ivars: &[(Symbol, Value)]) -> Result<(), EncodeError> {
        encode_len(&mut self.buf, ivars.len())?;
        for (name, value) in ivars {
            match self.options.ivar_keys {
                IvarKeyMode::Prefixed => self.write_symbol(name)?,
                IvarKeyMode::Bare => self.write_symbol(&name.with_ivar_prefix())?,
            }
            self.write_value(value)?;
        }
        Ok(())
    }

    fn write_ivars(&mut self, ivars: &[(Symbol, Value)]) -> Result<(), EncodeError> {
        encode_len(&mut self.buf, ivars.len())?;
        for (name, value) in ivars {
            self.write_symbol(name)?;
            self.write_value(value)?;
        }
        Ok(())
    }
}
