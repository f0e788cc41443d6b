//! Lazily computed, thread-safe properties for a small dynamic object model.
//!
//! A lazy property is declared on a [`LazyType`] with a computation. Every
//! instance gets its own slot for it; the first read runs the computation
//! and every later read, from any thread, returns the cached result.
//!
//! ```
//! use lazy_attrs::{LazyObject, TypeRegistry, Value};
//!
//! let registry = TypeRegistry::default();
//! let user = registry.define_class("User", &[]).unwrap();
//! registry
//!     .declare(&user, "full_name", |this| {
//!         let first = this.attr("first_name").unwrap_or_default();
//!         let last = this.attr("last_name").unwrap_or_default();
//!         Ok(Value::from(format!("{} {}", first, last)))
//!     })
//!     .unwrap();
//! let ada = user
//!     .instantiate([
//!         ("first_name", Value::from("Ada")),
//!         ("last_name", Value::from("Lovelace")),
//!     ])
//!     .unwrap();
//! assert_eq!(ada.lazy_get("full_name").unwrap(), Value::from("Ada Lovelace"));
//! ```

#[macro_use]
mod macros;

pub mod config;
pub mod error;
mod object;
mod registry;
mod types;
mod util;
mod value;

pub use self::config::{FailurePolicy, LazyConfig, RedeclarePolicy};
pub use self::error::{
    ComputeError, ComputeErrorKind, LazyError, LazyResult, UsageError, UsageErrorKind,
};
pub use self::object::{initialize, LazyObject, LazyState, Object};
pub use self::registry::TypeRegistry;
pub use self::types::{ComputeFn, InitFn, LazyType, PropertyDecl, PropertyId, TypeKind};
pub use self::util::compute_stats::ComputeStats;
pub use self::value::Value;

/// Reads the lazy property `name` of `this`, computing it on first access.
pub fn get(this: &dyn LazyObject, name: &str) -> LazyResult<Value> {
    this.lazy_get(name)
}
