use derive_new::new;

/// What happens when a property name is declared twice on one type before
/// the type is sealed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum RedeclarePolicy {
    /// The later computation replaces the earlier one. The property keeps
    /// its original position in declaration order.
    #[default]
    Overwrite,
    /// The second declaration fails with a usage error.
    Reject,
}

/// What happens to a property whose computation fails.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum FailurePolicy {
    /// The slot stays empty and the next read computes again.
    #[default]
    Retry,
    /// The failure is remembered and every later read fails without
    /// computing again.
    Poison,
}

/// Settings shared by every type of a [`TypeRegistry`](crate::TypeRegistry).
///
/// # Examples
/// ```
/// use lazy_attrs::config::{FailurePolicy, LazyConfig, RedeclarePolicy};
///
/// let config = LazyConfig::new(RedeclarePolicy::Reject, FailurePolicy::Retry);
/// assert_eq!(config.redeclare(), RedeclarePolicy::Reject);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, new)]
pub struct LazyConfig {
    redeclare: RedeclarePolicy,
    on_failure: FailurePolicy,
}

impl LazyConfig {
    pub fn redeclare(&self) -> RedeclarePolicy {
        self.redeclare
    }

    pub fn on_failure(&self) -> FailurePolicy {
        self.on_failure
    }

    pub fn with_redeclare(self, redeclare: RedeclarePolicy) -> Self {
        Self { redeclare, ..self }
    }

    pub fn with_on_failure(self, on_failure: FailurePolicy) -> Self {
        Self { on_failure, ..self }
    }
}
