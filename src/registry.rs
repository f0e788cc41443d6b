use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use itertools::Itertools;
use log::debug;
use once_cell::sync::Lazy;

use crate::config::LazyConfig;
use crate::error::{LazyResult, UsageError};
use crate::object::{LazyObject, Object};
use crate::types::{InitFn, LazyType, PropertyId, TypeKind};
use crate::util::compute_stats::ComputeStats;
use crate::util::id_allocator::IdAllocator;
use crate::value::Value;

static REGISTRY_IDS: IdAllocator = IdAllocator::new();

static GLOBAL: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::default);

/// The part of a registry every type it defines keeps a handle to.
#[derive(Debug)]
pub(crate) struct RegistryCore {
    pub(crate) id: usize,
    pub(crate) config: LazyConfig,
    pub(crate) type_ids: IdAllocator,
    pub(crate) object_ids: IdAllocator,
    pub(crate) stats: ComputeStats,
}

/// A set of types, by name, together with the settings their lazy
/// properties follow.
///
/// Most programs use the process-wide [`TypeRegistry::global`]; separate
/// registries are fully independent of one another.
#[derive(Debug)]
pub struct TypeRegistry {
    core: Arc<RegistryCore>,
    types: DashMap<Arc<str>, LazyType>,
}

impl TypeRegistry {
    pub fn new(config: LazyConfig) -> Self {
        Self {
            core: Arc::new(RegistryCore {
                id: REGISTRY_IDS.next(),
                config,
                type_ids: IdAllocator::new(),
                object_ids: IdAllocator::new(),
                stats: ComputeStats::new(),
            }),
            types: DashMap::new(),
        }
    }

    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    pub fn config(&self) -> LazyConfig {
        self.core.config
    }

    pub fn stats(&self) -> &ComputeStats {
        &self.core.stats
    }

    /// The number of instances ever constructed from this registry's types.
    pub fn objects_created(&self) -> usize {
        self.core.object_ids.allocated()
    }

    pub fn define_class(&self, name: &str, supers: &[LazyType]) -> LazyResult<LazyType> {
        self.define(name, TypeKind::Class, supers, None)
    }

    /// Defines a class whose instances run `init` once their lazy slots
    /// exist.
    ///
    /// Initializers of supertypes run first.
    pub fn define_class_with_init<F>(
        &self,
        name: &str,
        supers: &[LazyType],
        init: F,
    ) -> LazyResult<LazyType>
    where
        F: Fn(&dyn LazyObject) -> LazyResult<()> + Send + Sync + 'static,
    {
        let init: Arc<InitFn> = Arc::new(init);
        self.define(name, TypeKind::Class, supers, Some(init))
    }

    pub fn define_mixin(&self, name: &str, supers: &[LazyType]) -> LazyResult<LazyType> {
        self.define(name, TypeKind::Mixin, supers, None)
    }

    fn define(
        &self,
        name: &str,
        kind: TypeKind,
        supers: &[LazyType],
        init: Option<Arc<InitFn>>,
    ) -> LazyResult<LazyType> {
        for sup in supers {
            self.check_owned(sup)?;
        }
        match self.types.entry(name.into()) {
            Entry::Occupied(_) => Err(UsageError::duplicate_type(name).into()),
            Entry::Vacant(entry) => {
                let ty = LazyType::new(
                    self.core.clone(),
                    entry.key().clone(),
                    kind,
                    supers.to_vec(),
                    init,
                );
                debug!(
                    "Defined {:?} {} with supertypes [{}]",
                    kind,
                    name,
                    supers.iter().map(|x| x.name()).format(", ")
                );
                entry.insert(ty.clone());
                Ok(ty)
            }
        }
    }

    pub fn get_type(&self, name: &str) -> Option<LazyType> {
        self.types.get(name).map(|x| x.value().clone())
    }

    /// Registers a lazy property on a type of this registry.
    ///
    /// See [`LazyType::declare`].
    pub fn declare<F>(&self, ty: &LazyType, name: &str, compute: F) -> LazyResult<PropertyId>
    where
        F: Fn(&dyn LazyObject) -> LazyResult<Value> + Send + Sync + 'static,
    {
        self.check_owned(ty)?;
        ty.declare(name, compute)
    }

    pub fn instantiate<I, K>(&self, ty: &LazyType, attributes: I) -> LazyResult<Object>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.check_owned(ty)?;
        Object::new(ty, attributes)
    }

    /// Reads a lazy property, computing it on first access.
    pub fn get(&self, this: &dyn LazyObject, name: &str) -> LazyResult<Value> {
        self.check_owned(this.lazy_type())?;
        this.lazy_get(name)
    }

    fn check_owned(&self, ty: &LazyType) -> Result<(), UsageError> {
        if ty.registry_id() == self.core.id {
            Ok(())
        } else {
            Err(UsageError::foreign_type(ty.name()))
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(LazyConfig::default())
    }
}
