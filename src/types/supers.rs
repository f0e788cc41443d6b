use indexmap::IndexMap;

use super::LazyType;

/// The supertypes of a type, both as written and flattened.
#[derive(Debug)]
pub(super) struct SuperHolder {
    supers: Vec<LazyType>,
    linearized: Vec<LazyType>,
}

impl SuperHolder {
    pub fn new(supers: Vec<LazyType>) -> Self {
        let linearized = linearize(&supers);
        Self { supers, linearized }
    }

    pub fn direct(&self) -> &[LazyType] {
        &self.supers
    }

    pub fn linearized(&self) -> &[LazyType] {
        &self.linearized
    }
}

/// Depth-first, in declaration order, keeping only the last occurrence of
/// each type. Every type comes before all of its own supertypes.
fn linearize(supers: &[LazyType]) -> Vec<LazyType> {
    let mut seen = IndexMap::new();
    for sup in supers {
        for ty in sup.ancestors() {
            seen.shift_remove(&ty.id());
            seen.insert(ty.id(), ty.clone());
        }
    }
    seen.into_iter().map(|(_, ty)| ty).collect()
}
