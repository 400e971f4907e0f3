//! Graph Equivalence Module
//!
//! Structural comparison of two value graphs that may live in different
//! heaps, e.g. a value and its dump-then-load copy.
//!
//! Handles are compared up to isomorphism: the first time a pair of objects
//! is visited they are bound to each other, and every later occurrence must
//! respect that binding. This makes the comparison terminate on cycles and
//! distinguishes "shared" from "two equal copies".

use std::collections::HashMap;

use crate::heap::{Heap, ObjectId};
use crate::object::Object;
use crate::symbol::Symbol;
use crate::value::Value;

/// Whether two floats are the same float
///
/// NaN equals NaN, and `-0.0` differs from `0.0`.
pub fn float_identical(lhs: f64, rhs: f64) -> bool {
    if lhs.is_nan() || rhs.is_nan() {
        return lhs.is_nan() && rhs.is_nan();
    }
    lhs.to_bits() == rhs.to_bits()
}

/// Compare two value graphs structurally
///
/// # Arguments
/// * `lhs_heap` - Heap owning the objects of `lhs`
/// * `lhs` - First value
/// * `rhs_heap` - Heap owning the objects of `rhs`
/// * `rhs` - Second value
///
/// # Returns
/// `true` if both graphs have the same shape, the same immediates and the
/// same sharing structure.
pub fn graph_eq(lhs_heap: &Heap, lhs: &Value, rhs_heap: &Heap, rhs: &Value) -> bool {
    Matcher {
        lhs_heap,
        rhs_heap,
        forward: HashMap::new(),
        backward: HashMap::new(),
        pending: vec![(lhs.clone(), rhs.clone())],
    }
    .run()
}

struct Matcher<'a> {
    lhs_heap: &'a Heap,
    rhs_heap: &'a Heap,
    forward: HashMap<ObjectId, ObjectId>,
    backward: HashMap<ObjectId, ObjectId>,
    pending: Vec<(Value, Value)>,
}

impl Matcher<'_> {
    fn run(mut self) -> bool {
        while let Some((lhs, rhs)) = self.pending.pop() {
            if !self.compare_values(&lhs, &rhs) {
                return false;
            }
        }
        true
    }

    fn compare_values(&mut self, lhs: &Value, rhs: &Value) -> bool {
        match (lhs, rhs) {
            (Value::Object(a), Value::Object(b)) => self.bind(*a, *b),
            (Value::Float(a), Value::Float(b)) => float_identical(*a, *b),
            (
                Value::Integer(_) | Value::Bignum(_),
                Value::Integer(_) | Value::Bignum(_),
            ) => lhs.to_integer() == rhs.to_integer(),
            _ => lhs == rhs,
        }
    }

    fn bind(&mut self, a: ObjectId, b: ObjectId) -> bool {
        if let Some(bound) = self.forward.get(&a) {
            return *bound == b;
        }
        if self.backward.contains_key(&b) {
            return false;
        }
        self.forward.insert(a, b);
        self.backward.insert(b, a);

        let (lhs_heap, rhs_heap) = (self.lhs_heap, self.rhs_heap);
        let (Some(lhs), Some(rhs)) = (lhs_heap.get(a), rhs_heap.get(b)) else {
            return false;
        };
        lhs.extends == rhs.extends
            && self.queue_pairs(&lhs.ivars, &rhs.ivars)
            && self.compare_objects(&lhs.object, &rhs.object)
    }

    fn queue_pairs(&mut self, lhs: &[(Symbol, Value)], rhs: &[(Symbol, Value)]) -> bool {
        if lhs.len() != rhs.len() {
            return false;
        }
        for ((lk, lv), (rk, rv)) in lhs.iter().zip(rhs) {
            if lk != rk {
                return false;
            }
            self.pending.push((lv.clone(), rv.clone()));
        }
        true
    }

    fn queue_values(&mut self, lhs: &[Value], rhs: &[Value]) -> bool {
        if lhs.len() != rhs.len() {
            return false;
        }
        self.pending
            .extend(lhs.iter().cloned().zip(rhs.iter().cloned()));
        true
    }

    fn compare_objects(&mut self, lhs: &Object, rhs: &Object) -> bool {
        match (lhs, rhs) {
            (Object::String(a), Object::String(b)) => a.as_bytes() == b.as_bytes(),
            (Object::Array(a), Object::Array(b)) => self.queue_values(a, b),
            (Object::Hash(a), Object::Hash(b)) => {
                if a.pairs.len() != b.pairs.len() {
                    return false;
                }
                match (&a.default, &b.default) {
                    (Some(da), Some(db)) => self.pending.push((da.clone(), db.clone())),
                    (None, None) => {}
                    _ => return false,
                }
                for ((ak, av), (bk, bv)) in a.pairs.iter().zip(&b.pairs) {
                    self.pending.push((ak.clone(), bk.clone()));
                    self.pending.push((av.clone(), bv.clone()));
                }
                true
            }
            (Object::Object(a), Object::Object(b)) => {
                a.class == b.class && self.queue_pairs(&a.ivars, &b.ivars)
            }
            (Object::Struct(a), Object::Struct(b)) => {
                a.class == b.class && self.queue_pairs(&a.members, &b.members)
            }
            (Object::Class(a), Object::Class(b))
            | (Object::Module(a), Object::Module(b))
            | (Object::ClassOrModule(a), Object::ClassOrModule(b)) => a == b,
            (Object::UserDefined(a), Object::UserDefined(b)) => a == b,
            (Object::UserMarshal(a), Object::UserMarshal(b))
            | (Object::Data(a), Object::Data(b)) => {
                self.pending.push((a.value.clone(), b.value.clone()));
                a.class == b.class
            }
            (Object::Wrapped(a), Object::Wrapped(b)) => {
                a.class == b.class && self.compare_objects(&a.inner, &b.inner)
            }
            (Object::Regexp(a), Object::Regexp(b)) => a == b,
            (Object::Float(a), Object::Float(b)) => float_identical(*a, *b),
            (Object::Bignum(a), Object::Bignum(b)) => a == b,
            (Object::Host(a), Object::Host(b)) => {
                a == b
                    || (a.concrete_type_id() == b.concrete_type_id()
                        && self.queue_pairs(&a.instance_variables(), &b.instance_variables()))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{RubyHash, RubyObject};

    #[test]
    fn test_float_identical() {
        assert!(float_identical(f64::NAN, f64::NAN));
        assert!(!float_identical(0.0, -0.0));
        assert!(float_identical(1.5, 1.5));
        assert!(!float_identical(f64::NAN, 1.0));
    }

    #[test]
    fn test_equal_trees_in_different_heaps() {
        let mut a = Heap::new();
        let sa = a.string("x");
        let ra = a.array(vec![sa, Value::Integer(1)]);

        let mut b = Heap::new();
        b.string("unrelated");
        let sb = b.string(b"x".to_vec());
        let rb = b.array(vec![sb, Value::Integer(1)]);

        assert!(graph_eq(&a, &ra, &b, &rb));
    }

    #[test]
    fn test_sharing_is_significant() {
        let mut shared = Heap::new();
        let s = shared.string("x");
        let root_shared = shared.array(vec![s.clone(), s]);

        let mut copied = Heap::new();
        let s1 = copied.string("x");
        let s2 = copied.string("x");
        let root_copied = copied.array(vec![s1, s2]);

        assert!(!graph_eq(&shared, &root_shared, &copied, &root_copied));
        assert!(!graph_eq(&copied, &root_copied, &shared, &root_shared));
    }

    #[test]
    fn test_cycles_terminate() {
        let mut a = Heap::new();
        let ia = a.insert(Object::Array(vec![]));
        a.array_mut(ia).unwrap().push(Value::Object(ia));

        let mut b = Heap::new();
        let ib = b.insert(Object::Hash(RubyHash::default()));
        let jb = b.insert(Object::Array(vec![]));
        b.array_mut(jb).unwrap().push(Value::Object(jb));

        assert!(graph_eq(&a, &Value::Object(ia), &b, &Value::Object(jb)));
        assert!(!graph_eq(&a, &Value::Object(ia), &b, &Value::Object(ib)));
    }

    #[test]
    fn test_object_ivars_compared() {
        let mut a = Heap::new();
        let oa = a.alloc(Object::Object(RubyObject::new(
            "A",
            vec![(Symbol::from("@v"), Value::Integer(1))],
        )));
        let mut b = Heap::new();
        let ob = b.alloc(Object::Object(RubyObject::new(
            "A",
            vec![(Symbol::from("@v"), Value::Integer(2))],
        )));
        assert!(!graph_eq(&a, &oa, &b, &ob));
        assert!(graph_eq(&a, &oa, &a, &oa));
    }

    #[test]
    fn test_integer_and_bignum_compare_numerically() {
        let heap = Heap::new();
        let big = Value::Bignum(malachite::Integer::from(1_i64 << 40));
        assert!(graph_eq(&heap, &Value::Integer(1 << 40), &heap, &big));
    }
}
