//! Integration tests for entities_marshal_data
//!
//! Builds the value shapes a Marshal stream can describe and checks that
//! sharing and cycles are represented through the heap.

use entities_marshal_data::*;
use proptest::prelude::*;

#[test]
fn test_build_self_referential_hash() {
    // a = {}; a[:a] = a
    let mut heap = Heap::new();
    let id = heap.insert(Object::Hash(RubyHash::default()));
    heap.hash_mut(id)
        .unwrap()
        .pairs
        .push((Value::symbol("a"), Value::Object(id)));

    match heap.object(id) {
        Some(Object::Hash(hash)) => {
            assert_eq!(hash.get(&Value::symbol("a")), Some(&Value::Object(id)));
        }
        other => panic!("Expected Hash, got {:?}", other),
    }
}

#[test]
fn test_build_self_referential_object() {
    // a = Object.new; a.instance_variable_set(:@a, a)
    let mut heap = Heap::new();
    let id = heap.insert(Object::Object(RubyObject::new("Object", vec![])));
    if let Some(Object::Object(object)) = heap.object_mut(id) {
        object.ivars.push((Symbol::from("@a"), Value::Object(id)));
    }

    let copy = heap.clone();
    assert!(graph_eq(&heap, &Value::Object(id), &copy, &Value::Object(id)));
}

#[test]
fn test_wrapped_builtin() {
    let mut heap = Heap::new();
    let wrapped = heap.alloc(Object::Wrapped(RubyWrapped {
        class: Symbol::from("MyArray"),
        inner: Box::new(Object::Array(vec![Value::Integer(1)])),
    }));
    match heap.resolve(&wrapped) {
        Some(Object::Wrapped(w)) => {
            assert!(w.inner.is_wrappable());
            assert_eq!(w.class, Symbol::from("MyArray"));
        }
        other => panic!("Expected Wrapped, got {:?}", other),
    }
}

#[test]
fn test_document_root_object() {
    let mut heap = Heap::new();
    let root = heap.string("hello");
    let doc = Document::new(heap, root);
    assert_eq!(
        doc.root_object(),
        Some(&Object::String(RubyString::Text("hello".to_owned())))
    );
}

#[test]
fn test_graph_eq_detects_extends_difference() {
    let mut a = Heap::new();
    let ida = a.insert_node(
        Node::new(Object::Object(RubyObject::new("A", vec![])))
            .with_extends(vec![Symbol::from("M")]),
    );
    let mut b = Heap::new();
    let idb = b.insert(Object::Object(RubyObject::new("A", vec![])));
    assert!(!graph_eq(&a, &Value::Object(ida), &b, &Value::Object(idb)));
}

proptest! {
    #[test]
    fn prop_graph_eq_is_reflexive_for_arrays(items in proptest::collection::vec(any::<i64>(), 0..32)) {
        let mut heap = Heap::new();
        let values = items.into_iter().map(Value::Integer).collect();
        let root = heap.array(values);
        prop_assert!(graph_eq(&heap, &root, &heap.clone(), &root));
    }

    #[test]
    fn prop_float_identical_matches_bits(bits in any::<u64>()) {
        let value = f64::from_bits(bits);
        prop_assert!(float_identical(value, value));
    }
}
