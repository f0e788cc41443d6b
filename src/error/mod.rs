mod compute;
mod usage;

use std::error::Error;
use std::fmt::Display;

pub use self::compute::{ComputeError, ComputeErrorKind};
pub use self::usage::{UsageError, UsageErrorKind};

pub type LazyResult<T> = Result<T, LazyError>;

/// Any error produced while declaring, constructing, or reading lazy
/// properties.
#[derive(Debug)]
pub enum LazyError {
    Usage(UsageError),
    Compute(ComputeError),
}

impl LazyError {
    pub fn as_usage(&self) -> Option<&UsageError> {
        match self {
            LazyError::Usage(u) => Some(u),
            LazyError::Compute(_) => None,
        }
    }

    pub fn as_compute(&self) -> Option<&ComputeError> {
        match self {
            LazyError::Usage(_) => None,
            LazyError::Compute(c) => Some(c),
        }
    }

    pub fn usage_kind(&self) -> Option<UsageErrorKind> {
        self.as_usage().map(UsageError::kind)
    }
}

impl Display for LazyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LazyError::Usage(u) => Display::fmt(u, f),
            LazyError::Compute(c) => Display::fmt(c, f),
        }
    }
}

impl Error for LazyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LazyError::Usage(u) => Some(u),
            LazyError::Compute(c) => Some(c),
        }
    }
}

impl From<UsageError> for LazyError {
    fn from(x: UsageError) -> Self {
        LazyError::Usage(x)
    }
}

impl From<ComputeError> for LazyError {
    fn from(x: ComputeError) -> Self {
        LazyError::Compute(x)
    }
}
