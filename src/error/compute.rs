use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt::Display;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ComputeErrorKind {
    /// The computation itself failed.
    Failed,
    /// An earlier computation failed and the property is poisoned.
    Poisoned,
}

/// The failure of a lazy property's defining computation.
#[derive(Debug)]
pub struct ComputeError {
    kind: ComputeErrorKind,
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl ComputeError {
    pub fn new<D: Display>(message: D) -> Self {
        Self {
            kind: ComputeErrorKind::Failed,
            message: message.to_string(),
            source: None,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn from_source<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            kind: ComputeErrorKind::Failed,
            message: error.to_string(),
            source: Some(Box::new(error)),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn poisoned(property: &str, cause: &str) -> Self {
        Self {
            kind: ComputeErrorKind::Poisoned,
            message: format!(
                "Lazy property '{}' is poisoned by an earlier failure: {}",
                property, cause
            ),
            source: None,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn kind(&self) -> ComputeErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl Display for ComputeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ComputeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|x| x as &(dyn Error + 'static))
    }
}
