//! Object Module
//!
//! Provides the heap object kinds of the Marshal value model, one per
//! referenceable Marshal tag.
//!
//! | Kind | Tag | Contents |
//! |------|-----|----------|
//! | `String` | `"` | raw bytes or UTF-8 text |
//! | `Array` | `[` | ordered values |
//! | `Hash` | `{` / `}` | ordered pairs, optional default |
//! | `Object` | `o` | class symbol + instance variables |
//! | `Struct` | `S` | class symbol + members |
//! | `Class` / `Module` / `ClassOrModule` | `c` / `m` / `M` | class path |
//! | `UserDefined` | `u` | class symbol + opaque bytes |
//! | `UserMarshal` | `U` | class symbol + one value |
//! | `Data` | `d` | class symbol + one value |
//! | `Wrapped` | `C` | class symbol + wrapped built-in |
//! | `Regexp` | `/` | source bytes + option flags |
//! | `Float` / `Bignum` | `f` / `l` | boxed numerics |
//! | `Host` | `o` | caller-registered host value |

use bitflags::bitflags;
use malachite::Integer;

use crate::host::HostRef;
use crate::symbol::Symbol;
use crate::value::Value;

/// Ruby string contents
///
/// Marshal strings are byte strings; their encoding is carried separately in
/// an instance variable. `Text` is a presentation choice made by the decoder
/// (or by the caller) when the bytes are valid UTF-8.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RubyString {
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Decoded UTF-8 text
    Text(String),
}

impl RubyString {
    /// The raw bytes, whatever the representation
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RubyString::Bytes(bytes) => bytes,
            RubyString::Text(text) => text.as_bytes(),
        }
    }

    /// The contents as text, if valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RubyString::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
            RubyString::Text(text) => Some(text),
        }
    }

    /// Convert to `Text` when the bytes are valid UTF-8, otherwise keep `Bytes`
    pub fn into_text(self) -> RubyString {
        match self {
            RubyString::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => RubyString::Text(text),
                Err(err) => RubyString::Bytes(err.into_bytes()),
            },
            text => text,
        }
    }
}

impl From<&str> for RubyString {
    fn from(text: &str) -> Self {
        RubyString::Text(text.to_owned())
    }
}

impl From<String> for RubyString {
    fn from(text: String) -> Self {
        RubyString::Text(text)
    }
}

impl From<Vec<u8>> for RubyString {
    fn from(bytes: Vec<u8>) -> Self {
        RubyString::Bytes(bytes)
    }
}

/// Hash contents: ordered pairs plus an optional default value
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RubyHash {
    /// Key/value pairs in insertion order
    pub pairs: Vec<(Value, Value)>,
    /// Value returned for missing keys (`Hash.new(default)`), written with tag `}`
    pub default: Option<Value>,
}

impl RubyHash {
    /// Create a hash without a default value
    pub fn new(pairs: Vec<(Value, Value)>) -> Self {
        Self {
            pairs,
            default: None,
        }
    }

    /// Create a hash with a default value
    pub fn with_default(pairs: Vec<(Value, Value)>, default: Value) -> Self {
        Self {
            pairs,
            default: Some(default),
        }
    }

    /// Look up the first pair whose key equals `key` (by value, not by content)
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// A plain Ruby object (`o`): class and instance variables
#[derive(Clone, Debug, PartialEq)]
pub struct RubyObject {
    /// Class name
    pub class: Symbol,
    /// Instance variables in definition order
    pub ivars: Vec<(Symbol, Value)>,
}

impl RubyObject {
    /// Create an object
    pub fn new(class: impl Into<Symbol>, ivars: Vec<(Symbol, Value)>) -> Self {
        Self {
            class: class.into(),
            ivars,
        }
    }

    /// Look up an instance variable by name
    pub fn ivar(&self, name: &Symbol) -> Option<&Value> {
        lookup(&self.ivars, name)
    }
}

/// A Ruby struct (`S`): class and named members
#[derive(Clone, Debug, PartialEq)]
pub struct RubyStruct {
    /// Struct class name
    pub class: Symbol,
    /// Member name/value pairs in declaration order
    pub members: Vec<(Symbol, Value)>,
}

impl RubyStruct {
    /// Create a struct
    pub fn new(class: impl Into<Symbol>, members: Vec<(Symbol, Value)>) -> Self {
        Self {
            class: class.into(),
            members,
        }
    }

    /// Look up a member by name
    pub fn member(&self, name: &Symbol) -> Option<&Value> {
        lookup(&self.members, name)
    }
}

/// An object dumped through `_dump` (`u`): class and opaque bytes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RubyUserDefined {
    /// Class name
    pub class: Symbol,
    /// Bytes returned by `_dump`
    pub data: Vec<u8>,
}

/// An object dumped through `marshal_dump` (`U`), or a `_dump_data` object (`d`)
#[derive(Clone, Debug, PartialEq)]
pub struct RubyClassValue {
    /// Class name
    pub class: Symbol,
    /// The representation chosen by the object
    pub value: Value,
}

bitflags! {
    /// Regexp option byte
    ///
    /// Bit positions match Ruby's `RE_*` constants. Unknown bits are retained.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RegexpOptions: u8 {
        /// `/i`
        const IGNORECASE = 1;
        /// `/x`
        const EXTENDED = 2;
        /// `/m`
        const MULTILINE = 4;

        const _ = !0;
    }
}

impl Default for RegexpOptions {
    fn default() -> Self {
        RegexpOptions::empty()
    }
}

/// A Ruby regexp (`/`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RubyRegexp {
    /// Pattern source bytes
    pub source: Vec<u8>,
    /// Option flags
    pub options: RegexpOptions,
}

impl RubyRegexp {
    /// Create a regexp
    pub fn new(source: impl Into<Vec<u8>>, options: RegexpOptions) -> Self {
        Self {
            source: source.into(),
            options,
        }
    }
}

/// A user subclass of a built-in (`C`)
///
/// Only `String`, `Array`, `Hash` and `Regexp` may be wrapped. The wrapper and
/// the built-in are one Ruby object and occupy one slot in the object table.
#[derive(Clone, Debug, PartialEq)]
pub struct RubyWrapped {
    /// Subclass name
    pub class: Symbol,
    /// The built-in contents
    pub inner: Box<Object>,
}

/// A heap object
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    /// `"`
    String(RubyString),
    /// `[`
    Array(Vec<Value>),
    /// `{` or `}`
    Hash(RubyHash),
    /// `o`
    Object(RubyObject),
    /// `S`
    Struct(RubyStruct),
    /// `c`
    Class(Vec<u8>),
    /// `m`
    Module(Vec<u8>),
    /// `M`
    ClassOrModule(Vec<u8>),
    /// `u`
    UserDefined(RubyUserDefined),
    /// `U`
    UserMarshal(RubyClassValue),
    /// `d`
    Data(RubyClassValue),
    /// `C`
    Wrapped(RubyWrapped),
    /// `/`
    Regexp(RubyRegexp),
    /// `f`, boxed
    Float(f64),
    /// `l`, boxed
    Bignum(Integer),
    /// Host value constructed through a class registry
    Host(HostRef),
}

impl Object {
    /// Short kind name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Object::String(_) => "String",
            Object::Array(_) => "Array",
            Object::Hash(_) => "Hash",
            Object::Object(_) => "Object",
            Object::Struct(_) => "Struct",
            Object::Class(_) => "Class",
            Object::Module(_) => "Module",
            Object::ClassOrModule(_) => "ClassOrModule",
            Object::UserDefined(_) => "UserDefined",
            Object::UserMarshal(_) => "UserMarshal",
            Object::Data(_) => "Data",
            Object::Wrapped(_) => "Wrapped",
            Object::Regexp(_) => "Regexp",
            Object::Float(_) => "Float",
            Object::Bignum(_) => "Bignum",
            Object::Host(_) => "Host",
        }
    }

    /// Whether this kind may appear inside a `C` wrapper
    pub fn is_wrappable(&self) -> bool {
        matches!(
            self,
            Object::String(_) | Object::Array(_) | Object::Hash(_) | Object::Regexp(_)
        )
    }
}

fn lookup<'a>(pairs: &'a [(Symbol, Value)], name: &Symbol) -> Option<&'a Value> {
    pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruby_string_into_text() {
        let text = RubyString::Bytes(b"hello".to_vec()).into_text();
        assert_eq!(text, RubyString::Text("hello".to_owned()));

        let binary = RubyString::Bytes(vec![0xff, 0x00]).into_text();
        assert_eq!(binary, RubyString::Bytes(vec![0xff, 0x00]));
    }

    #[test]
    fn test_ruby_string_as_bytes() {
        assert_eq!(RubyString::from("abc").as_bytes(), b"abc");
        assert_eq!(RubyString::from(vec![1, 2]).as_bytes(), &[1, 2]);
    }

    #[test]
    fn test_regexp_options_bits() {
        let options = RegexpOptions::IGNORECASE | RegexpOptions::MULTILINE;
        assert_eq!(options.bits(), 5);
        assert_eq!(RegexpOptions::EXTENDED.bits(), 2);
    }

    #[test]
    fn test_regexp_options_keep_unknown_bits() {
        let options = RegexpOptions::from_bits_retain(0x11);
        assert!(options.contains(RegexpOptions::IGNORECASE));
        assert_eq!(options.bits(), 0x11);
    }

    #[test]
    fn test_hash_lookup() {
        let hash = RubyHash::new(vec![(Value::symbol("a"), Value::Integer(1))]);
        assert_eq!(hash.get(&Value::symbol("a")), Some(&Value::Integer(1)));
        assert_eq!(hash.get(&Value::symbol("b")), None);
    }

    #[test]
    fn test_object_ivar_lookup() {
        let object = RubyObject::new("Point", vec![(Symbol::from("@x"), Value::Integer(3))]);
        assert_eq!(object.ivar(&Symbol::from("@x")), Some(&Value::Integer(3)));
        assert_eq!(object.class, Symbol::from("Point"));
    }

    #[test]
    fn test_wrappable_kinds() {
        assert!(Object::Array(vec![]).is_wrappable());
        assert!(!Object::Class(b"Foo".to_vec()).is_wrappable());
    }
}
