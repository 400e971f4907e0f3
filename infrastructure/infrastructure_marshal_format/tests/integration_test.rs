//! Integration tests for infrastructure_marshal_format
//!
//! Byte streams below are what Ruby 3.x `Marshal.dump` produces for the
//! commented expression.

use std::any::Any;
use std::sync::Arc;

use entities_marshal_data::*;
use infrastructure_marshal_format::*;
use proptest::prelude::*;

fn roundtrip_bytes(bytes: &[u8], options: &LoadOptions) -> Vec<u8> {
    let doc = Decoder::decode(bytes, options).unwrap();
    Encoder::encode(&doc.heap, &doc.root, &DumpOptions::default()).unwrap()
}

#[test]
fn test_ruby_streams_are_byte_stable() {
    let streams: Vec<Vec<u8>> = vec![
        // [1, "a", :b, nil, true, 1.5]
        b"\x04\x08[\x0bi\x06I\"\x06a\x06:\x06ET:\x06b0Tf\x081.5".to_vec(),
        // {a: [1, 2], "k" => {}}
        b"\x04\x08{\x07:\x06a[\x07i\x06i\x07I\"\x06k\x06:\x06ET{\x00".to_vec(),
        // Struct.new(:x, :y).new(1, 2) named Point
        b"\x04\x08S:\x0aPoint\x07:\x06xi\x06:\x06yi\x07".to_vec(),
        // /ab/im
        b"\x04\x08I/\x07ab\x05\x06:\x06EF".to_vec(),
        // 2**70
        b"\x04\x08l+\x0a\x00\x00\x00\x00\x00\x00\x00\x00@\x00".to_vec(),
        // [String, Kernel]
        b"\x04\x08[\x07c\x0bStringm\x0bKernel".to_vec(),
        // h = Hash.new(0); h[:x] = 1
        b"\x04\x08}\x06:\x06xi\x06i\x00".to_vec(),
    ];
    for bytes in &streams {
        assert_eq!(&roundtrip_bytes(bytes, &LoadOptions::default()), bytes);
    }
}

#[test]
fn test_boxed_mode_is_byte_stable_for_shared_floats() {
    // f = 1.0e100; [f, f]
    let bytes = b"\x04\x08[\x07f\x0a1e100@\x06".to_vec();
    let boxed = LoadOptions::new().with_numeric_mode(NumericMode::Boxed);
    assert_eq!(roundtrip_bytes(&bytes, &boxed), bytes);
    assert_eq!(roundtrip_bytes(&bytes, &LoadOptions::default()), bytes);
}

#[test]
fn test_inline_mode_merges_equal_bignums() {
    // [2**70, 2**70], two distinct Bignum objects
    let body = b"l+\x0a\x00\x00\x00\x00\x00\x00\x00\x00@\x00";
    let mut bytes = b"\x04\x08[\x07".to_vec();
    bytes.extend_from_slice(body);
    bytes.extend_from_slice(body);

    let boxed = LoadOptions::new().with_numeric_mode(NumericMode::Boxed);
    assert_eq!(roundtrip_bytes(&bytes, &boxed), bytes);

    let mut merged = b"\x04\x08[\x07".to_vec();
    merged.extend_from_slice(body);
    merged.extend_from_slice(b"@\x06");
    assert_eq!(roundtrip_bytes(&bytes, &LoadOptions::default()), merged);
}

#[test]
fn test_self_referential_object() {
    // o = Object.new; o.instance_variable_set(:@me, o)
    let bytes = b"\x04\x08o:\x0bObject\x06:\x08@me@\x00".to_vec();
    let doc = Decoder::decode(&bytes, &LoadOptions::default()).unwrap();
    let id = doc.root.as_object().unwrap();
    let Some(Object::Object(object)) = doc.heap.object(id) else {
        panic!("expected object");
    };
    assert_eq!(object.ivar(&Symbol::from("@me")), Some(&Value::Object(id)));
    assert_eq!(
        Encoder::encode(&doc.heap, &doc.root, &DumpOptions::default()).unwrap(),
        bytes
    );
}

#[derive(Debug, PartialEq)]
struct Point {
    x: i64,
    y: i64,
}

impl HostObject for Point {
    fn instance_variables(&self) -> Vec<(Symbol, Value)> {
        vec![
            (Symbol::from("@x"), Value::Integer(self.x)),
            (Symbol::from("@y"), Value::Integer(self.y)),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn point_registry() -> Arc<ClassRegistry> {
    let mut registry = ClassRegistry::new();
    registry.register("Point", |ivars: Vec<(Symbol, Value)>| {
        let get = |name: &str| {
            ivars
                .iter()
                .find(|(k, _)| k.as_bytes() == name.as_bytes())
                .and_then(|(_, v)| v.as_i64())
                .unwrap_or(0)
        };
        Point { x: get("@x"), y: get("@y") }
    });
    Arc::new(registry)
}

#[test]
fn test_registry_host_roundtrip() {
    let registry = point_registry();
    let mut heap = Heap::new();
    let point = heap.alloc(Object::Host(HostRef::new(Point { x: 3, y: -4 })));

    let dump_options = DumpOptions::new().with_registry(registry.clone());
    let bytes = Encoder::encode(&heap, &point, &dump_options).unwrap();
    assert_eq!(
        bytes,
        b"\x04\x08o:\x0aPoint\x07:\x07@xi\x08:\x07@yi\xf7".to_vec()
    );

    let load_options = LoadOptions::new().with_registry(registry);
    let doc = Decoder::decode(&bytes, &load_options).unwrap();
    let Some(Object::Host(host)) = doc.root_object() else {
        panic!("expected host object");
    };
    assert_eq!(host.downcast_ref::<Point>(), Some(&Point { x: 3, y: -4 }));
}

#[test]
fn test_unregistered_host_is_unsupported() {
    let mut heap = Heap::new();
    let point = heap.alloc(Object::Host(HostRef::new(Point { x: 0, y: 0 })));
    let err = Encoder::encode(&heap, &point, &DumpOptions::default()).unwrap_err();
    let EncodeError::UnsupportedValue(message) = err else {
        panic!("expected unsupported value");
    };
    assert!(message.contains("Point"));
}

#[test]
fn test_float_specials_roundtrip() {
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -0.0] {
        let bytes = Encoder::encode(&Heap::new(), &Value::Float(value), &DumpOptions::default()).unwrap();
        let doc = Decoder::decode(&bytes, &LoadOptions::default()).unwrap();
        let Value::Float(decoded) = doc.root else {
            panic!("expected float");
        };
        assert!(float_identical(decoded, value));
    }
}

#[test]
fn test_extends_preserved_in_order() {
    let mut heap = Heap::new();
    let id = heap.insert_node(
        Node::new(Object::Object(RubyObject::new("Object", vec![])))
            .with_extends(vec![Symbol::from("A"), Symbol::from("B")]),
    );
    let bytes = Encoder::encode(&heap, &Value::Object(id), &DumpOptions::default()).unwrap();
    let doc = Decoder::decode(&bytes, &LoadOptions::default()).unwrap();
    let node = doc.heap.get(doc.root.as_object().unwrap()).unwrap();
    assert_eq!(node.extends, vec![Symbol::from("A"), Symbol::from("B")]);
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>().prop_map(Value::Float),
        "[a-z]{1,6}".prop_map(|s| Value::symbol(s)),
    ]
}

proptest! {
    #[test]
    fn prop_array_of_leaves_roundtrip(items in proptest::collection::vec(arb_leaf(), 0..20)) {
        let mut heap = Heap::new();
        let root = heap.array(items);
        let bytes = Encoder::encode(&heap, &root, &DumpOptions::default()).unwrap();
        let doc = Decoder::decode(&bytes, &LoadOptions::default()).unwrap();
        prop_assert!(graph_eq(&heap, &root, &doc.heap, &doc.root));
        let again = Encoder::encode(&doc.heap, &doc.root, &DumpOptions::default()).unwrap();
        prop_assert_eq!(again, bytes);
    }

    #[test]
    fn prop_truncation_never_panics(items in proptest::collection::vec(arb_leaf(), 1..10), cut in 0usize..64) {
        let mut heap = Heap::new();
        let root = heap.array(items);
        let bytes = Encoder::encode(&heap, &root, &DumpOptions::default()).unwrap();
        let cut = cut % bytes.len();
        prop_assert!(Decoder::decode(&bytes[..cut], &LoadOptions::default()).is_err());
    }
}
