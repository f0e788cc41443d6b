mod declaration;
mod supers;

use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::iter;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::{debug, warn};
use parking_lot::RwLock;

use crate::config::RedeclarePolicy;
use crate::error::{LazyResult, UsageError};
use crate::object::{LazyObject, Object};
use crate::registry::RegistryCore;
use crate::value::Value;

pub use self::declaration::{ComputeFn, PropertyDecl, PropertyId};
use self::supers::SuperHolder;

/// User construction logic, run after the lazy slots of a new instance exist.
pub type InitFn = dyn Fn(&dyn LazyObject) -> LazyResult<()> + Send + Sync;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// An instantiable type.
    Class,
    /// A bundle of declarations mixed into other types; never instantiated
    /// on its own.
    Mixin,
}

/// A handle to a type that may carry lazy properties.
///
/// Handles are cheap to clone; two handles are equal when they refer to the
/// same definition.
#[derive(Clone)]
pub struct LazyType {
    value: Arc<TypeInfo>,
}

struct TypeInfo {
    id: usize,
    name: Arc<str>,
    kind: TypeKind,
    supers: SuperHolder,
    initializer: Option<Arc<InitFn>>,
    declarations: RwLock<IndexMap<Arc<str>, Arc<PropertyDecl>>>,
    is_sealed: AtomicBool,
    instances: AtomicUsize,
    registry: Arc<RegistryCore>,
}

impl LazyType {
    pub(crate) fn new(
        registry: Arc<RegistryCore>,
        name: Arc<str>,
        kind: TypeKind,
        supers: Vec<LazyType>,
        initializer: Option<Arc<InitFn>>,
    ) -> Self {
        Self {
            value: Arc::new(TypeInfo {
                id: registry.type_ids.next(),
                name,
                kind,
                supers: SuperHolder::new(supers),
                initializer,
                declarations: RwLock::new(IndexMap::new()),
                is_sealed: AtomicBool::new(false),
                instances: AtomicUsize::new(0),
                registry,
            }),
        }
    }

    pub fn id(&self) -> usize {
        self.value.id
    }

    pub fn name(&self) -> &str {
        &self.value.name
    }

    pub fn kind(&self) -> TypeKind {
        self.value.kind
    }

    /// The supertypes this type was defined with, in order.
    pub fn supers(&self) -> &[LazyType] {
        self.value.supers.direct()
    }

    /// This type followed by every type it inherits from, nearest first.
    ///
    /// Each type appears once, even when it is reachable along more than one
    /// path.
    pub fn ancestors(&self) -> impl DoubleEndedIterator<Item = &'_ LazyType> {
        iter::once(self).chain(self.value.supers.linearized())
    }

    pub fn is_subtype(&self, other: &LazyType) -> bool {
        self.ancestors().any(|x| x == other)
    }

    /// Whether an instance of this type or of a subtype has been created.
    ///
    /// Once sealed, a type accepts no further lazy declarations.
    pub fn is_sealed(&self) -> bool {
        self.value.is_sealed.load(Ordering::Acquire)
    }

    /// The number of live instances whose concrete type is this one.
    pub fn instance_count(&self) -> usize {
        self.value.instances.load(Ordering::Relaxed)
    }

    pub(crate) fn registry_id(&self) -> usize {
        self.value.registry.id
    }

    pub(crate) fn core(&self) -> &RegistryCore {
        &self.value.registry
    }

    pub(crate) fn initializer(&self) -> Option<&InitFn> {
        self.value.initializer.as_deref()
    }

    /// Registers a lazy property named `name` on this type.
    ///
    /// Fails if this type has been sealed by the construction of an
    /// instance of it or of any subtype. What happens when `name` is
    /// already declared here depends on the registry's
    /// [`RedeclarePolicy`].
    pub fn declare<F>(&self, name: &str, compute: F) -> LazyResult<PropertyId>
    where
        F: Fn(&dyn LazyObject) -> LazyResult<Value> + Send + Sync + 'static,
    {
        let mut declarations = self.value.declarations.write();
        if self.is_sealed() {
            warn!(
                "Rejected lazy property {}.{}: type already instantiated",
                self.name(),
                name
            );
            return Err(UsageError::late_declaration(self.name(), name).into());
        }
        let id = PropertyId::new(self.id(), self.value.name.clone(), name.into());
        let compute: Arc<ComputeFn> = Arc::new(compute);
        let decl = Arc::new(PropertyDecl::new(id.clone(), compute));
        match declarations.entry(id.name_arc()) {
            Entry::Occupied(mut entry) => match self.core().config.redeclare() {
                RedeclarePolicy::Overwrite => {
                    warn!("Lazy property {} redeclared, replacing it", id);
                    entry.insert(decl);
                }
                RedeclarePolicy::Reject => {
                    return Err(UsageError::duplicate_declaration(self.name(), name).into())
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(decl);
            }
        }
        debug!("Declared lazy property {}", id);
        Ok(id)
    }

    /// The lazy properties declared directly on this type, in declaration
    /// order.
    pub fn declarations(&self) -> Vec<Arc<PropertyDecl>> {
        self.value.declarations.read().values().cloned().collect()
    }

    pub fn declared_names(&self) -> Vec<Arc<str>> {
        self.value.declarations.read().keys().cloned().collect()
    }

    /// Every lazy property name readable on an instance of this type,
    /// nearest declaration first.
    pub fn lazy_property_names(&self) -> Vec<Arc<str>> {
        let mut names = Vec::new();
        for ty in self.ancestors() {
            for name in ty.declared_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Constructs an instance with the given attributes.
    ///
    /// See [`Object::new`].
    pub fn instantiate<I, K>(&self, attributes: I) -> LazyResult<Object>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Object::new(self, attributes)
    }

    /// Constructs an instance with no attributes.
    pub fn new_instance(&self) -> LazyResult<Object> {
        Object::new(self, iter::empty::<(String, Value)>())
    }

    pub(crate) fn seal(&self) {
        let _declarations = self.value.declarations.write();
        if !self.value.is_sealed.swap(true, Ordering::AcqRel) {
            debug!("Sealed type {}", self.name());
        }
    }

    pub(crate) fn add_instance(&self) {
        self.value.instances.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn remove_instance(&self) {
        self.value.instances.fetch_sub(1, Ordering::Relaxed);
    }
}

impl PartialEq for LazyType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl Eq for LazyType {}

impl Hash for LazyType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.id.hash(state);
        self.value.registry.id.hash(state);
    }
}

impl Debug for LazyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyType")
            .field("name", &self.value.name)
            .field("kind", &self.value.kind)
            .field("sealed", &self.is_sealed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::config::{LazyConfig, RedeclarePolicy};
    use crate::error::UsageErrorKind;
    use crate::object::LazyObject;
    use crate::registry::TypeRegistry;
    use crate::value::Value;

    #[test]
    fn ancestors_depth_first() {
        let registry = TypeRegistry::default();
        let named = registry.define_mixin("Named", &[]).unwrap();
        let base = registry.define_class("Base", &[named.clone()]).unwrap();
        let timestamped = registry.define_mixin("Timestamped", &[]).unwrap();
        let user = registry
            .define_class("User", &[base.clone(), timestamped.clone()])
            .unwrap();
        let names = user.ancestors().map(|x| x.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["User", "Base", "Named", "Timestamped"]);
        assert!(user.is_subtype(&named));
        assert!(!base.is_subtype(&user));
    }

    #[test]
    fn diamond_collapses() {
        let registry = TypeRegistry::default();
        let root = registry.define_class("Root", &[]).unwrap();
        let left = registry.define_mixin("Left", &[root.clone()]).unwrap();
        let right = registry.define_mixin("Right", &[root.clone()]).unwrap();
        let leaf = registry.define_class("Leaf", &[left, right]).unwrap();
        let names = leaf.ancestors().map(|x| x.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Leaf", "Left", "Right", "Root"]);
    }

    #[test]
    fn diamond_override_wins() {
        let registry = TypeRegistry::default();
        let root = registry.define_class("Root", &[]).unwrap();
        root.declare("x", |_| Ok(Value::from("root"))).unwrap();
        let left = registry.define_mixin("Left", &[root.clone()]).unwrap();
        let right = registry.define_mixin("Right", &[root.clone()]).unwrap();
        right.declare("x", |_| Ok(Value::from("right"))).unwrap();
        let leaf = registry.define_class("Leaf", &[left, right]).unwrap();
        let obj = leaf.new_instance().unwrap();
        assert_eq!(obj.lazy_get("x").unwrap(), Value::from("right"));
        assert_eq!(obj.lazy_state().len(), 2);
        let names = leaf
            .lazy_property_names()
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["x"]);
    }

    #[test]
    fn diamond_initializers_base_first() {
        let registry = TypeRegistry::default();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let o = order.clone();
        let root = registry
            .define_class_with_init("Root", &[], move |_| {
                o.lock().push("Root");
                Ok(())
            })
            .unwrap();
        let left = registry.define_mixin("Left", &[root.clone()]).unwrap();
        let o = order.clone();
        let right = registry
            .define_class_with_init("Right", &[root], move |_| {
                o.lock().push("Right");
                Ok(())
            })
            .unwrap();
        let leaf = registry.define_class("Leaf", &[left, right]).unwrap();
        let _obj = leaf.new_instance().unwrap();
        assert_eq!(*order.lock(), vec!["Root", "Right"]);
    }

    #[test]
    fn overwrite_keeps_position() {
        let registry = TypeRegistry::default();
        let ty = registry.define_class("T", &[]).unwrap();
        ty.declare("a", |_| Ok(Value::Int(1))).unwrap();
        ty.declare("b", |_| Ok(Value::Int(2))).unwrap();
        ty.declare("a", |_| Ok(Value::Int(3))).unwrap();
        assert_eq!(
            ty.declared_names(),
            vec![Arc::<str>::from("a"), Arc::<str>::from("b")]
        );
        let obj = ty.new_instance().unwrap();
        assert_eq!(obj.lazy_get("a").unwrap(), Value::Int(3));
    }

    #[test]
    fn reject_duplicate() {
        let config = LazyConfig::default().with_redeclare(RedeclarePolicy::Reject);
        let registry = TypeRegistry::new(config);
        let ty = registry.define_class("T", &[]).unwrap();
        ty.declare("a", |_| Ok(Value::Int(1))).unwrap();
        let err = ty.declare("a", |_| Ok(Value::Int(2))).unwrap_err();
        assert_eq!(err.usage_kind(), Some(UsageErrorKind::DuplicateDeclaration));
        let obj = ty.new_instance().unwrap();
        assert_eq!(obj.lazy_get("a").unwrap(), Value::Int(1));
    }

    #[test]
    fn subtype_instance_seals_ancestors() {
        let registry = TypeRegistry::default();
        let base = registry.define_class("Base", &[]).unwrap();
        let child = registry.define_class("Child", &[base.clone()]).unwrap();
        let other = registry.define_class("Other", &[]).unwrap();
        let _obj = child.new_instance().unwrap();
        assert!(child.is_sealed());
        assert!(base.is_sealed());
        assert!(!other.is_sealed());
        let err = base.declare("late", |_| Ok(Value::Nil)).unwrap_err();
        assert_eq!(err.usage_kind(), Some(UsageErrorKind::LateDeclaration));
        assert!(base.declared_names().is_empty());
        other.declare("fine", |_| Ok(Value::Nil)).unwrap();
    }

    #[test]
    fn lazy_property_names_shadow() {
        let registry = TypeRegistry::default();
        let base = registry.define_class("Base", &[]).unwrap();
        base.declare("x", |_| Ok(Value::Int(1))).unwrap();
        base.declare("y", |_| Ok(Value::Int(2))).unwrap();
        let child = registry.define_class("Child", &[base]).unwrap();
        child.declare("x", |_| Ok(Value::Int(10))).unwrap();
        child.declare("z", |_| Ok(Value::Int(3))).unwrap();
        let names = child
            .lazy_property_names()
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["x", "z", "y"]);
    }

    #[test]
    fn instance_count_tracks_drops() {
        let registry = TypeRegistry::default();
        let ty = registry.define_class("T", &[]).unwrap();
        let a = ty.new_instance().unwrap();
        let b = ty.new_instance().unwrap();
        let a2 = a.clone();
        assert_eq!(ty.instance_count(), 2);
        drop(a);
        assert_eq!(ty.instance_count(), 2);
        drop(a2);
        drop(b);
        assert_eq!(ty.instance_count(), 0);
        assert!(ty.is_sealed());
    }

    #[test]
    fn initializers_run_base_first() {
        let registry = TypeRegistry::default();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let o = order.clone();
        let base = registry
            .define_class_with_init("Base", &[], move |_| {
                o.lock().push("Base");
                Ok(())
            })
            .unwrap();
        let o = order.clone();
        let child = registry
            .define_class_with_init("Child", &[base], move |this| {
                o.lock().push("Child");
                assert!(this.attr("name").is_some());
                Ok(())
            })
            .unwrap();
        let _obj = child.instantiate([("name", Value::from("x"))]).unwrap();
        assert_eq!(*order.lock(), vec!["Base", "Child"]);
    }

    #[test]
    fn initializer_may_read_lazy() {
        let registry = TypeRegistry::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let ty = registry
            .define_class_with_init("Eager", &[], |this| {
                this.lazy_get("warm")?;
                Ok(())
            })
            .unwrap();
        let c = calls.clone();
        ty.declare("warm", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Bool(true))
        })
        .unwrap();
        let obj = ty.new_instance().unwrap();
        assert!(obj.is_computed("warm").unwrap());
        assert_eq!(obj.lazy_get("warm").unwrap(), Value::Bool(true));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
