use std::fmt::{Debug, Display};
use std::sync::Arc;

use derive_new::new;

use crate::error::LazyResult;
use crate::object::LazyObject;
use crate::value::Value;

/// The defining computation of a lazy property.
///
/// It runs with the instance being read, so it may look at attributes and at
/// other lazy properties of the same instance.
pub type ComputeFn = dyn Fn(&dyn LazyObject) -> LazyResult<Value> + Send + Sync;

/// Identifies one lazy property declaration: the declaring type plus the
/// property name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, new)]
pub struct PropertyId {
    owner_id: usize,
    owner: Arc<str>,
    name: Arc<str>,
}

#[derive(new)]
pub struct PropertyDecl {
    id: PropertyId,
    compute: Arc<ComputeFn>,
}

impl PropertyId {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn owner_id(&self) -> usize {
        self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        self.name.clone()
    }
}

impl Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

impl PropertyDecl {
    pub fn id(&self) -> &PropertyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.name()
    }

    pub(crate) fn compute(&self, this: &dyn LazyObject) -> LazyResult<Value> {
        (self.compute)(this)
    }
}

impl Debug for PropertyDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDecl")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
