//! Heap Module
//!
//! Provides the arena that owns every referenceable Marshal object.
//!
//! Each object is a [`Node`] addressed by an [`ObjectId`]. Sharing and cycles
//! are expressed by reusing the same `ObjectId`; no reference counting or
//! interior mutability is involved. The decoder relies on the two-phase
//! construction this enables: it inserts an empty node first (so that
//! back-references to it resolve), decodes the children, then fills the node
//! in place with [`Heap::replace`] or [`Heap::get_mut`].

use crate::object::{Object, RubyHash, RubyString};
use crate::symbol::Symbol;
use crate::value::Value;

/// Handle to a node in a [`Heap`]
///
/// Handles are only meaningful for the heap that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Position of the node in its heap
    pub fn index(self) -> usize {
        self.0
    }
}

/// A heap object plus the per-object metadata Marshal can attach to it
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// The object itself
    pub object: Object,
    /// Instance variables carried by the `I` wrapper (e.g. `:E => true` on
    /// UTF-8 strings). Ivars of plain objects live in
    /// [`RubyObject`](crate::object::RubyObject) instead.
    pub ivars: Vec<(Symbol, Value)>,
    /// Modules announced with `e` before the object, in stream order
    ///
    /// The format does not distinguish `Object#extend` from a singleton class
    /// `prepend`; the list is kept exactly as written.
    pub extends: Vec<Symbol>,
}

impl Node {
    /// Create a node without ivars or extended modules
    pub fn new(object: Object) -> Self {
        Self {
            object,
            ivars: Vec::new(),
            extends: Vec::new(),
        }
    }

    /// Attach `I`-wrapper instance variables
    pub fn with_ivars(mut self, ivars: Vec<(Symbol, Value)>) -> Self {
        self.ivars = ivars;
        self
    }

    /// Attach extended modules
    pub fn with_extends(mut self, extends: Vec<Symbol>) -> Self {
        self.extends = extends;
        self
    }
}

/// Arena of Marshal objects
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Heap {
    nodes: Vec<Node>,
}

impl Heap {
    /// Create an empty heap
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty heap with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the heap has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a node and return its handle
    pub fn insert_node(&mut self, node: Node) -> ObjectId {
        let id = ObjectId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Insert an object and return its handle
    pub fn insert(&mut self, object: Object) -> ObjectId {
        self.insert_node(Node::new(object))
    }

    /// Insert an object and return a value referring to it
    pub fn alloc(&mut self, object: Object) -> Value {
        Value::Object(self.insert(object))
    }

    /// Allocate a string
    pub fn string(&mut self, contents: impl Into<RubyString>) -> Value {
        self.alloc(Object::String(contents.into()))
    }

    /// Allocate an array
    pub fn array(&mut self, items: Vec<Value>) -> Value {
        self.alloc(Object::Array(items))
    }

    /// Allocate a hash
    pub fn hash(&mut self, hash: RubyHash) -> Value {
        self.alloc(Object::Hash(hash))
    }

    /// Borrow a node
    pub fn get(&self, id: ObjectId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Mutably borrow a node
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Borrow the object of a node
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.get(id).map(|node| &node.object)
    }

    /// Mutably borrow the object of a node
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.get_mut(id).map(|node| &mut node.object)
    }

    /// Borrow the object a value refers to, if it is a heap object
    pub fn resolve(&self, value: &Value) -> Option<&Object> {
        value.as_object().and_then(|id| self.object(id))
    }

    /// Replace the object of a node, returning the previous one
    pub fn replace(&mut self, id: ObjectId, object: Object) -> Option<Object> {
        self.object_mut(id)
            .map(|slot| std::mem::replace(slot, object))
    }

    /// Mutably borrow the items of an array node
    pub fn array_mut(&mut self, id: ObjectId) -> Option<&mut Vec<Value>> {
        match self.object_mut(id) {
            Some(Object::Array(items)) => Some(items),
            _ => None,
        }
    }

    /// Mutably borrow the contents of a hash node
    pub fn hash_mut(&mut self, id: ObjectId) -> Option<&mut RubyHash> {
        match self.object_mut(id) {
            Some(Object::Hash(hash)) => Some(hash),
            _ => None,
        }
    }

    /// Iterate over all nodes with their handles
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (ObjectId(index), node))
    }

    /// Whether two values are the same hash key
    ///
    /// Strings compare by content (Ruby's `String#eql?`); everything else
    /// compares by value, i.e. heap objects by identity.
    pub fn same_key(&self, lhs: &Value, rhs: &Value) -> bool {
        match (self.resolve(lhs), self.resolve(rhs)) {
            (Some(Object::String(a)), Some(Object::String(b))) => a.as_bytes() == b.as_bytes(),
            _ => lhs == rhs,
        }
    }
}

/// A decoded value together with the heap its objects live in
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    /// Object arena
    pub heap: Heap,
    /// Top-level value
    pub root: Value,
}

impl Document {
    /// Create a document
    pub fn new(heap: Heap, root: Value) -> Self {
        Self { heap, root }
    }

    /// Borrow the object the root refers to
    pub fn root_object(&self) -> Option<&Object> {
        self.heap.resolve(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut heap = Heap::new();
        let a = heap.insert(Object::Array(vec![]));
        let b = heap.insert(Object::Array(vec![]));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn test_self_referential_array() {
        let mut heap = Heap::new();
        let id = heap.insert(Object::Array(vec![]));
        heap.array_mut(id).unwrap().push(Value::Object(id));
        assert_eq!(heap.object(id), Some(&Object::Array(vec![Value::Object(id)])));
    }

    #[test]
    fn test_replace_fills_reserved_node() {
        let mut heap = Heap::new();
        let id = heap.insert(Object::Array(vec![]));
        let previous = heap.replace(id, Object::Array(vec![Value::Integer(1)]));
        assert_eq!(previous, Some(Object::Array(vec![])));
        assert_eq!(heap.array_mut(id).map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_missing_handle() {
        let mut heap = Heap::new();
        let id = heap.insert(Object::Float(1.0));
        let other = Heap::new();
        assert!(other.get(id).is_none());
        assert!(heap.array_mut(id).is_none());
    }

    #[test]
    fn test_same_key_compares_strings_by_content() {
        let mut heap = Heap::new();
        let a = heap.string("k");
        let b = heap.string(b"k".to_vec());
        let c = heap.string("j");
        assert!(heap.same_key(&a, &b));
        assert!(!heap.same_key(&a, &c));
        assert!(heap.same_key(&Value::symbol("k"), &Value::symbol("k")));
        assert!(!heap.same_key(&a, &Value::symbol("k")));
    }

    #[test]
    fn test_node_builders() {
        let node = Node::new(Object::String("x".into()))
            .with_ivars(vec![(Symbol::from("E"), Value::Bool(true))])
            .with_extends(vec![Symbol::from("M")]);
        assert_eq!(node.ivars.len(), 1);
        assert_eq!(node.extends, vec![Symbol::from("M")]);
    }
}
