//! Marshal Facades
//!
//! The four entry points of the library (`dump`, `dump_all`, `load`,
//! `load_all`) plus `clone_value`. Each call owns all of its state; nothing
//! is shared between calls.

use entities_marshal_data::{Document, Heap, Value};
use infrastructure_marshal_format::{
    ConfigurationError, Decoder, DumpOptions, EncodeError, Encoder, FormatError, LoadOptions,
};
use tracing::debug;

/// Errors surfaced by the facades
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarshalError {
    /// Malformed, truncated or mis-headered input
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A value with no Marshal representation
    #[error(transparent)]
    UnsupportedValue(#[from] EncodeError),
    /// Options rejected before any work was done
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Serialize one value
///
/// # Arguments
/// * `heap` - Heap owning every object `value` reaches
/// * `value` - Root value
/// * `options` - Dump options
///
/// # Returns
/// The `4, 8` header followed by the encoded value
pub fn dump(heap: &Heap, value: &Value, options: &DumpOptions) -> Result<Vec<u8>, MarshalError> {
    options.validate()?;
    let bytes = Encoder::encode(heap, value, options)?;
    debug!(bytes = bytes.len(), "dump");
    Ok(bytes)
}

/// Serialize several values as consecutive, independent sections
///
/// Objects shared between two values are written in full in each section.
pub fn dump_all(heap: &Heap, values: &[Value], options: &DumpOptions) -> Result<Vec<u8>, MarshalError> {
    options.validate()?;
    let mut encoder = Encoder::new(heap, options);
    for value in values {
        encoder.write_section(value)?;
    }
    let bytes = encoder.finish();
    debug!(sections = values.len(), bytes = bytes.len(), "dump_all");
    Ok(bytes)
}

/// Deserialize the first section of `bytes`
///
/// Bytes after the first section are ignored.
pub fn load(bytes: &[u8], options: &LoadOptions) -> Result<Document, MarshalError> {
    options.validate()?;
    let document = Decoder::decode(bytes, options)?;
    debug!(bytes = bytes.len(), objects = document.heap.len(), "load");
    Ok(document)
}

/// Deserialize every section of `bytes`
///
/// Each section gets its own heap and tables. An empty buffer yields no
/// documents.
pub fn load_all(bytes: &[u8], options: &LoadOptions) -> Result<Vec<Document>, MarshalError> {
    options.validate()?;
    let mut decoder = Decoder::new(bytes, options);
    let mut documents = Vec::new();
    while !decoder.is_at_end() {
        documents.push(decoder.read_section()?);
    }
    debug!(sections = documents.len(), "load_all");
    Ok(documents)
}

/// Deep copy a value graph by dumping and loading it
///
/// The copy lives in a fresh heap. Instance-variable spelling, the class
/// registry and the depth limit are taken from `options` for both directions.
pub fn clone_value(heap: &Heap, value: &Value, options: &LoadOptions) -> Result<Document, MarshalError> {
    let dump_options = DumpOptions {
        ivar_keys: options.ivar_keys,
        registry: options.registry.clone(),
        max_depth: options.max_depth,
    };
    let bytes = dump(heap, value, &dump_options)?;
    load(&bytes, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entities_marshal_data::{graph_eq, Object, RubyHash, Symbol};
    use infrastructure_marshal_format::IvarKeyMode;

    #[test]
    fn test_dump_fixnums() {
        let heap = Heap::new();
        let options = DumpOptions::default();
        assert_eq!(dump(&heap, &Value::Integer(0), &options).unwrap(), vec![4, 8, 105, 0]);
        assert_eq!(dump(&heap, &Value::Integer(122), &options).unwrap(), vec![4, 8, 105, 127]);
        assert_eq!(dump(&heap, &Value::Integer(123), &options).unwrap(), vec![4, 8, 105, 1, 123]);
        assert_eq!(dump(&heap, &Value::Integer(-124), &options).unwrap(), vec![4, 8, 105, 255, 132]);
    }

    #[test]
    fn test_load_rejects_zero_depth() {
        let options = LoadOptions::new().with_max_depth(0);
        assert_eq!(
            load(&[4, 8, b'0'], &options),
            Err(MarshalError::Configuration(ConfigurationError::ZeroDepthLimit))
        );
    }

    #[test]
    fn test_dump_rejects_zero_depth() {
        let options = DumpOptions::new().with_max_depth(0);
        assert_eq!(
            dump(&Heap::new(), &Value::Nil, &options),
            Err(MarshalError::Configuration(ConfigurationError::ZeroDepthLimit))
        );
    }

    #[test]
    fn test_load_format_errors() {
        let options = LoadOptions::default();
        assert!(matches!(load(&[4, 8], &options), Err(MarshalError::Format(FormatError::BufferTooShort { .. }))));
        assert!(matches!(load(&[4, 9, b'0'], &options), Err(MarshalError::Format(FormatError::InvalidVersion { .. }))));
    }

    #[test]
    fn test_dump_all_and_load_all() {
        let mut heap = Heap::new();
        let shared = heap.string("s");
        let first = heap.array(vec![shared.clone(), Value::symbol("k")]);
        let bytes = dump_all(&heap, &[first.clone(), shared.clone()], &DumpOptions::default()).unwrap();
        assert_eq!(
            bytes,
            vec![4, 8, b'[', 7, b'"', 6, b's', b':', 6, b'k', 4, 8, b'"', 6, b's']
        );

        let documents = load_all(&bytes, &LoadOptions::default()).unwrap();
        assert_eq!(documents.len(), 2);
        assert!(graph_eq(&heap, &first, &documents[0].heap, &documents[0].root));
        assert!(graph_eq(&heap, &shared, &documents[1].heap, &documents[1].root));
    }

    #[test]
    fn test_load_all_empty() {
        assert_eq!(load_all(&[], &LoadOptions::default()).unwrap(), vec![]);
    }

    #[test]
    fn test_load_all_trailing_garbage() {
        let result = load_all(&[4, 8, b'0', 4], &LoadOptions::default());
        assert!(matches!(result, Err(MarshalError::Format(FormatError::BufferTooShort { .. }))));
    }

    #[test]
    fn test_clone_value_is_deep() {
        let mut heap = Heap::new();
        let id = heap.insert(Object::Hash(RubyHash::default()));
        heap.hash_mut(id)
            .unwrap()
            .pairs
            .push((Value::symbol("me"), Value::Object(id)));

        let copy = clone_value(&heap, &Value::Object(id), &LoadOptions::default()).unwrap();
        assert!(graph_eq(&heap, &Value::Object(id), &copy.heap, &copy.root));
    }

    #[test]
    fn test_clone_value_keeps_bare_keys() {
        let mut heap = Heap::new();
        let object = heap.alloc(Object::Object(entities_marshal_data::RubyObject::new(
            "Foo",
            vec![(Symbol::from("x"), Value::Integer(1))],
        )));
        let options = LoadOptions::new().with_ivar_keys(IvarKeyMode::Bare);
        let copy = clone_value(&heap, &object, &options).unwrap();
        assert!(graph_eq(&heap, &object, &copy.heap, &copy.root));
    }

    #[test]
    fn test_error_display() {
        let err = MarshalError::from(FormatError::UnknownTag { tag: b'Z', offset: 2 });
        assert_eq!(err.to_string(), "dump format error (unknown type 0x5a) at offset 2");
    }
}
