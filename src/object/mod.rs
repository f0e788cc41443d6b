mod slot;
mod state;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::error::LazyResult;
use crate::types::{LazyType, PropertyId};
use crate::value::Value;

pub use self::state::LazyState;

/// Anything that carries lazy properties.
///
/// Implementors hold a [`LazyState`] created while they are being
/// constructed and call [`initialize`] once they are fully built.
/// [`Object`] is the stock implementation.
pub trait LazyObject {
    fn lazy_state(&self) -> &LazyState;

    /// An ordinary (non-lazy) attribute.
    fn attr(&self, name: &str) -> Option<Value>;

    fn lazy_type(&self) -> &LazyType {
        self.lazy_state().lazy_type()
    }
}

impl<'a> dyn LazyObject + 'a {
    /// Reads a lazy property, computing it on first access.
    pub fn lazy_get(&self, name: &str) -> LazyResult<Value> {
        self.lazy_state().get(self, name)
    }

    /// Reads one specific declaration, even when a subtype shadows its name.
    pub fn lazy_get_declared(&self, id: &PropertyId) -> LazyResult<Value> {
        self.lazy_state().get_declared(self, id)
    }

    pub fn is_computed(&self, name: &str) -> LazyResult<bool> {
        self.lazy_state().is_computed(name)
    }
}

/// Runs the initializers of every type `this` is an instance of, base-most
/// first.
pub fn initialize(this: &dyn LazyObject) -> LazyResult<()> {
    for ty in this.lazy_type().ancestors().rev() {
        if let Option::Some(init) = ty.initializer() {
            init(this)?;
        }
    }
    Ok(())
}

/// A dynamically typed instance.
///
/// `Object` is a handle: clones refer to the same instance, sharing its
/// attributes and lazy slots.
#[derive(Clone)]
pub struct Object {
    value: Arc<ObjectInner>,
}

struct ObjectInner {
    id: usize,
    attributes: RwLock<HashMap<String, Value>>,
    lazy: LazyState,
}

impl Object {
    /// Constructs an instance of `ty`.
    ///
    /// Lazy slots for every property declared on `ty` or its ancestors exist
    /// before any initializer runs or any other thread can see the object.
    /// Fails if `ty` is a mixin or an initializer fails.
    pub fn new<I, K>(ty: &LazyType, attributes: I) -> LazyResult<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let lazy = LazyState::new(ty)?;
        let attributes = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect();
        let object = Object {
            value: Arc::new(ObjectInner {
                id: ty.core().object_ids.next(),
                attributes: RwLock::new(attributes),
                lazy,
            }),
        };
        initialize(&object)?;
        debug!("Instantiated {} #{}", ty.name(), object.id());
        Ok(object)
    }

    pub fn id(&self) -> usize {
        self.value.id
    }

    pub fn get_type(&self) -> &LazyType {
        self.value.lazy.lazy_type()
    }

    /// Sets an ordinary attribute, returning the old value.
    pub fn set_attr(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.value.attributes.write().insert(name.into(), value)
    }

    pub fn lazy_get(&self, name: &str) -> LazyResult<Value> {
        self.value.lazy.get(self, name)
    }

    pub fn lazy_get_declared(&self, id: &PropertyId) -> LazyResult<Value> {
        self.value.lazy.get_declared(self, id)
    }

    pub fn is_computed(&self, name: &str) -> LazyResult<bool> {
        self.value.lazy.is_computed(name)
    }

    pub fn peek(&self, name: &str) -> LazyResult<Option<Value>> {
        self.value.lazy.peek(name)
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl LazyObject for Object {
    fn lazy_state(&self) -> &LazyState {
        &self.value.lazy
    }

    fn attr(&self, name: &str) -> Option<Value> {
        self.value.attributes.read().get(name).cloned()
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.value.id)
            .field("type", &self.get_type().name())
            .finish_non_exhaustive()
    }
}
