use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use log::trace;

use crate::error::{LazyResult, UsageError};
use crate::types::{LazyType, PropertyId, TypeKind};
use crate::util::levenshtein::closest_name;
use crate::value::Value;

use super::slot::LazySlot;
use super::LazyObject;

/// The lazy slots of one instance.
///
/// Creating one is the construction step every instance of a type with lazy
/// properties has to go through: it seals the type and its ancestors, then
/// materializes an empty slot and a guard for every property reachable from
/// the type.
#[derive(Debug)]
pub struct LazyState {
    ty: LazyType,
    slots: IndexMap<PropertyId, LazySlot>,
    by_name: HashMap<Arc<str>, usize>,
}

impl LazyState {
    pub fn new(ty: &LazyType) -> LazyResult<Self> {
        if ty.kind() == TypeKind::Mixin {
            return Err(UsageError::mixin_instantiation(ty.name()).into());
        }
        for ancestor in ty.ancestors() {
            ancestor.seal();
        }
        let mut slots = IndexMap::new();
        let mut by_name = HashMap::new();
        for ancestor in ty.ancestors() {
            for decl in ancestor.declarations() {
                let name = decl.id().name_arc();
                let (index, _) = slots.insert_full(decl.id().clone(), LazySlot::new(decl));
                by_name.entry(name).or_insert(index);
            }
        }
        ty.add_instance();
        trace!("Materialized {} lazy slots for {}", slots.len(), ty.name());
        Ok(Self {
            ty: ty.clone(),
            slots,
            by_name,
        })
    }

    pub fn lazy_type(&self) -> &LazyType {
        &self.ty
    }

    /// The number of slots, including those of shadowed declarations.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn property_ids(&self) -> impl Iterator<Item = &'_ PropertyId> {
        self.slots.keys()
    }

    pub fn is_computed(&self, name: &str) -> LazyResult<bool> {
        Ok(self.slot(name)?.peek().is_some())
    }

    /// The cached value, without computing or waiting for it.
    pub fn peek(&self, name: &str) -> LazyResult<Option<Value>> {
        Ok(self.slot(name)?.peek().cloned())
    }

    pub(crate) fn get(&self, this: &dyn LazyObject, name: &str) -> LazyResult<Value> {
        self.slot(name)?.get(this, self.ty.core())
    }

    pub(crate) fn get_declared(&self, this: &dyn LazyObject, id: &PropertyId) -> LazyResult<Value> {
        match self.slots.get(id) {
            Option::Some(slot) => slot.get(this, self.ty.core()),
            Option::None => Err(self.missing(id.name()).into()),
        }
    }

    fn slot(&self, name: &str) -> Result<&LazySlot, UsageError> {
        self.by_name
            .get(name)
            .and_then(|&index| self.slots.get_index(index))
            .map(|(_, slot)| slot)
            .ok_or_else(|| self.missing(name))
    }

    fn missing(&self, name: &str) -> UsageError {
        let suggestion = closest_name(name, self.slots.keys().map(PropertyId::name));
        UsageError::missing_declaration(self.ty.name(), name, suggestion)
    }
}

impl Drop for LazyState {
    fn drop(&mut self) {
        self.ty.remove_instance();
    }
}
