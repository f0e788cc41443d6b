use std::cell::RefCell;
use std::sync::Arc;

use log::{debug, trace, warn};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::config::FailurePolicy;
use crate::error::{ComputeError, LazyResult, UsageError};
use crate::registry::RegistryCore;
use crate::types::PropertyDecl;
use crate::value::Value;

use super::LazyObject;

thread_local! {
    /// Slots whose computation is running on this thread, innermost last.
    static ACTIVE: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

/// One lazy property of one instance: the cached value plus the guard
/// arbitrating its first computation.
#[derive(Debug)]
pub(crate) struct LazySlot {
    decl: Arc<PropertyDecl>,
    value: OnceCell<Value>,
    poison: OnceCell<String>,
    guard: Mutex<()>,
}

/// Marks a slot as being computed on the current thread until dropped.
struct ActiveCompute {
    addr: usize,
}

impl LazySlot {
    pub fn new(decl: Arc<PropertyDecl>) -> Self {
        Self {
            decl,
            value: OnceCell::new(),
            poison: OnceCell::new(),
            guard: Mutex::new(()),
        }
    }

    pub fn peek(&self) -> Option<&Value> {
        self.value.get()
    }

    /// Returns the cached value, computing it first if no thread has yet.
    ///
    /// Only the first successful computation is stored. Readers that race it
    /// wait on the guard and then return what it stored.
    pub fn get(&self, this: &dyn LazyObject, core: &RegistryCore) -> LazyResult<Value> {
        if let Option::Some(value) = self.value.get() {
            return Ok(value.clone());
        }
        self.check_poison()?;
        let _active = ActiveCompute::enter(self).ok_or_else(|| {
            let id = self.decl.id();
            UsageError::cyclic_definition(id.owner(), id.name())
        })?;
        let _guard = match self.guard.try_lock() {
            Option::Some(guard) => guard,
            Option::None => {
                core.stats.add_contended();
                trace!("Waiting for lazy property {}", self.decl.id());
                self.guard.lock()
            }
        };
        if let Option::Some(value) = self.value.get() {
            return Ok(value.clone());
        }
        self.check_poison()?;
        match self.decl.compute(this) {
            Ok(value) => {
                core.stats.add_computed();
                debug!("Computed lazy property {}", self.decl.id());
                Ok(self.value.get_or_init(|| value).clone())
            }
            Err(error) => {
                core.stats.add_failed();
                warn!("Lazy property {} failed: {}", self.decl.id(), error);
                if core.config.on_failure() == FailurePolicy::Poison {
                    self.poison.get_or_init(|| error.to_string());
                }
                Err(error)
            }
        }
    }

    fn check_poison(&self) -> Result<(), ComputeError> {
        match self.poison.get() {
            Option::Some(cause) => Err(ComputeError::poisoned(self.decl.name(), cause)),
            Option::None => Ok(()),
        }
    }
}

impl ActiveCompute {
    fn enter(slot: &LazySlot) -> Option<Self> {
        let addr = slot as *const LazySlot as usize;
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&addr) {
                None
            } else {
                active.push(addr);
                Some(Self { addr })
            }
        })
    }
}

impl Drop for ActiveCompute {
    fn drop(&mut self) {
        let _ = ACTIVE.try_with(|active| {
            let mut active = active.borrow_mut();
            if let Option::Some(pos) = active.iter().rposition(|x| *x == self.addr) {
                active.remove(pos);
            }
        });
    }
}
