//! Host Object Module
//!
//! Provides the extension point for caller-defined types. A class registry
//! (in the format layer) maps Ruby class names to constructors producing
//! [`HostObject`]s on load, and maps host types back to class names on dump.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::symbol::Symbol;
use crate::value::Value;

/// A caller-defined type that can stand in for a plain Ruby object
///
/// Host objects are written with the `o` tag: the registry supplies the class
/// name and the object supplies its instance variables.
pub trait HostObject: Any + fmt::Debug + Send + Sync {
    /// Instance variables to write, in order
    fn instance_variables(&self) -> Vec<(Symbol, Value)>;

    /// Upcast for downcasting and type lookup
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a host object
///
/// Equality is identity: two `HostRef`s are equal iff they point to the same
/// allocation.
#[derive(Clone)]
pub struct HostRef(Arc<dyn HostObject>);

impl HostRef {
    /// Wrap a host object
    pub fn new<T: HostObject>(object: T) -> Self {
        HostRef(Arc::new(object))
    }

    /// Borrow the host object
    pub fn get(&self) -> &dyn HostObject {
        self.0.as_ref()
    }

    /// The concrete type of the host object
    pub fn concrete_type_id(&self) -> TypeId {
        self.0.as_any().type_id()
    }

    /// Downcast to a concrete type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Instance variables of the host object
    pub fn instance_variables(&self) -> Vec<(Symbol, Value)> {
        self.0.instance_variables()
    }
}

impl From<Arc<dyn HostObject>> for HostRef {
    fn from(object: Arc<dyn HostObject>) -> Self {
        HostRef(object)
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Point {
        x: i64,
    }

    impl HostObject for Point {
        fn instance_variables(&self) -> Vec<(Symbol, Value)> {
            vec![(Symbol::from("@x"), Value::Integer(self.x))]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_downcast() {
        let host = HostRef::new(Point { x: 4 });
        assert_eq!(host.downcast_ref::<Point>().map(|p| p.x), Some(4));
        assert!(host.downcast_ref::<String>().is_none());
        assert_eq!(host.concrete_type_id(), TypeId::of::<Point>());
    }

    #[test]
    fn test_equality_is_identity() {
        let a = HostRef::new(Point { x: 1 });
        let b = HostRef::new(Point { x: 1 });
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_instance_variables() {
        let host = HostRef::new(Point { x: 9 });
        assert_eq!(
            host.instance_variables(),
            vec![(Symbol::from("@x"), Value::Integer(9))]
        );
    }
}
