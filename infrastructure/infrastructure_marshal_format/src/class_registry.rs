//! Class Registry
//!
//! Caller-supplied mapping between Marshal class names and host types.
//!
//! On load, an `o` object whose class has a registered constructor is handed
//! to that constructor (with its instance variables) and stored as an
//! [`Object::Host`](entities_marshal_data::Object::Host) node. On dump, a host
//! node is written as an `o` object under the class name registered for its
//! concrete type, or the name returned by the fallback resolver.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use entities_marshal_data::{HostObject, HostRef, Symbol, Value};

/// Builds a host value from decoded instance variables
pub type HostConstructor = Arc<dyn Fn(Vec<(Symbol, Value)>) -> HostRef + Send + Sync>;

/// Names host values that have no registered type
pub type ClassNameFallback = Arc<dyn Fn(&dyn HostObject) -> Option<Symbol> + Send + Sync>;

/// Registry of host classes
#[derive(Clone, Default)]
pub struct ClassRegistry {
    constructors: HashMap<Symbol, HostConstructor>,
    names: HashMap<TypeId, Symbol>,
    fallback: Option<ClassNameFallback>,
}

impl ClassRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a host type under a Marshal class name
    ///
    /// # Arguments
    /// * `class` - Marshal class name, e.g. `"Point"`
    /// * `constructor` - Builds the host value from the object's ivars
    pub fn register<T, F>(&mut self, class: impl Into<Symbol>, constructor: F) -> &mut Self
    where
        T: HostObject,
        F: Fn(Vec<(Symbol, Value)>) -> T + Send + Sync + 'static,
    {
        let class = class.into();
        self.names.insert(TypeId::of::<T>(), class.clone());
        self.constructors
            .insert(class, Arc::new(move |ivars| HostRef::new(constructor(ivars))));
        self
    }

    /// Set the resolver consulted for host types without a registration
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&dyn HostObject) -> Option<Symbol> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Constructor registered for `class`
    pub fn constructor(&self, class: &Symbol) -> Option<&HostConstructor> {
        self.constructors.get(class)
    }

    /// Build a host value for `class`, if it is registered
    pub fn construct(&self, class: &Symbol, ivars: Vec<(Symbol, Value)>) -> Option<HostRef> {
        self.constructor(class).map(|constructor| constructor(ivars))
    }

    /// Class name to dump `host` under
    ///
    /// The concrete type's registration wins over the fallback.
    pub fn class_name_of(&self, host: &HostRef) -> Option<Symbol> {
        self.names
            .get(&host.concrete_type_id())
            .cloned()
            .or_else(|| self.fallback.as_ref().and_then(|fallback| fallback(host.get())))
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Whether no class is registered
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<&Symbol> = self.constructors.keys().collect();
        classes.sort();
        f.debug_struct("ClassRegistry")
            .field("classes", &classes)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
