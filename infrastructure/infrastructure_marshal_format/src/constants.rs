//! Marshal Format Constants
//!
//! Version bytes and type tags of the Marshal 4.8 stream.
//! Based on the TYPE_* definitions in marshal.c

/// Major format version
pub const MAJOR_VERSION: u8 = 4;
/// Minor format version
pub const MINOR_VERSION: u8 = 8;

pub const TYPE_NIL: u8 = b'0';
pub const TYPE_TRUE: u8 = b'T';
pub const TYPE_FALSE: u8 = b'F';
pub const TYPE_FIXNUM: u8 = b'i';

/// Extended-module marker, precedes the object it applies to
pub const TYPE_EXTENDED: u8 = b'e';
/// User subclass of a built-in
pub const TYPE_UCLASS: u8 = b'C';
pub const TYPE_OBJECT: u8 = b'o';
pub const TYPE_DATA: u8 = b'd';
pub const TYPE_USERDEF: u8 = b'u';
pub const TYPE_USRMARSHAL: u8 = b'U';
pub const TYPE_FLOAT: u8 = b'f';
pub const TYPE_BIGNUM: u8 = b'l';
pub const TYPE_STRING: u8 = b'"';
pub const TYPE_REGEXP: u8 = b'/';
pub const TYPE_ARRAY: u8 = b'[';
pub const TYPE_HASH: u8 = b'{';
pub const TYPE_HASH_DEF: u8 = b'}';
pub const TYPE_STRUCT: u8 = b'S';
/// Legacy class-or-module tag, read only by old Ruby versions
pub const TYPE_MODULE_OLD: u8 = b'M';
pub const TYPE_CLASS: u8 = b'c';
pub const TYPE_MODULE: u8 = b'm';

pub const TYPE_SYMBOL: u8 = b':';
/// Back-reference into the symbol table
pub const TYPE_SYMLINK: u8 = b';';

/// Instance-variable wrapper
pub const TYPE_IVAR: u8 = b'I';
/// Back-reference into the object table
pub const TYPE_LINK: u8 = b'@';

/// Name of the encoding ivar Ruby attaches to UTF-8 strings and symbols
pub const ENCODING_SHORT_IVAR: &[u8] = b"E";

/// Printable name of a tag byte, for diagnostics
pub fn tag_name(tag: u8) -> &'static str {
    match tag {
        TYPE_NIL => "nil",
        TYPE_TRUE => "true",
        TYPE_FALSE => "false",
        TYPE_FIXNUM => "fixnum",
        TYPE_EXTENDED => "extended",
        TYPE_UCLASS => "user class",
        TYPE_OBJECT => "object",
        TYPE_DATA => "data",
        TYPE_USERDEF => "user defined",
        TYPE_USRMARSHAL => "user marshal",
        TYPE_FLOAT => "float",
        TYPE_BIGNUM => "bignum",
        TYPE_STRING => "string",
        TYPE_REGEXP => "regexp",
        TYPE_ARRAY => "array",
        TYPE_HASH => "hash",
        TYPE_HASH_DEF => "hash with default",
        TYPE_STRUCT => "struct",
        TYPE_MODULE_OLD => "class or module",
        TYPE_CLASS => "class",
        TYPE_MODULE => "module",
        TYPE_SYMBOL => "symbol",
        TYPE_SYMLINK => "symbol link",
        TYPE_IVAR => "ivar",
        TYPE_LINK => "link",
        _ => "unknown",
    }
}
