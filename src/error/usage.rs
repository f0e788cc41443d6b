use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt::Display;

/// The ways lazy properties can be misused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UsageErrorKind {
    /// A property was declared on a type that (or a subtype of which) has
    /// already been instantiated.
    LateDeclaration,
    /// A property was read that no type in the object's ancestry declares.
    MissingDeclaration,
    /// A property was declared twice on the same type under
    /// [`RedeclarePolicy::Reject`](crate::config::RedeclarePolicy::Reject).
    DuplicateDeclaration,
    /// A type name was defined twice in the same registry.
    DuplicateType,
    /// A property's computation read the property itself.
    CyclicDefinition,
    /// A type from one registry was used with another.
    ForeignType,
    /// A mixin was instantiated directly.
    MixinInstantiation,
}

#[derive(Debug)]
pub struct UsageError {
    kind: UsageErrorKind,
    message: String,
    backtrace: Backtrace,
}

impl UsageError {
    pub fn of<D: Display>(kind: UsageErrorKind, message: D) -> Self {
        Self {
            kind,
            message: message.to_string(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn late_declaration(type_name: &str, property: &str) -> Self {
        Self::of(
            UsageErrorKind::LateDeclaration,
            format_args!(
                "Cannot declare lazy property '{}' on type '{}': \
                 the type has already been instantiated",
                property, type_name
            ),
        )
    }

    pub fn missing_declaration(type_name: &str, property: &str, suggestion: Option<&str>) -> Self {
        let message = match suggestion {
            Option::Some(s) => format!(
                "Type '{}' has no lazy property '{}' (did you mean '{}'?)",
                type_name, property, s
            ),
            Option::None => format!("Type '{}' has no lazy property '{}'", type_name, property),
        };
        Self::of(UsageErrorKind::MissingDeclaration, message)
    }

    pub fn duplicate_declaration(type_name: &str, property: &str) -> Self {
        Self::of(
            UsageErrorKind::DuplicateDeclaration,
            format_args!(
                "Lazy property '{}' is already declared on type '{}'",
                property, type_name
            ),
        )
    }

    pub fn duplicate_type(type_name: &str) -> Self {
        Self::of(
            UsageErrorKind::DuplicateType,
            format_args!("Type '{}' is already defined", type_name),
        )
    }

    pub fn cyclic_definition(type_name: &str, property: &str) -> Self {
        Self::of(
            UsageErrorKind::CyclicDefinition,
            format_args!(
                "Lazy property '{}' on type '{}' depends on itself",
                property, type_name
            ),
        )
    }

    pub fn foreign_type(type_name: &str) -> Self {
        Self::of(
            UsageErrorKind::ForeignType,
            format_args!("Type '{}' belongs to a different registry", type_name),
        )
    }

    pub fn mixin_instantiation(type_name: &str) -> Self {
        Self::of(
            UsageErrorKind::MixinInstantiation,
            format_args!("Cannot instantiate mixin '{}'", type_name),
        )
    }

    pub fn kind(&self) -> UsageErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for UsageError {}

#[cfg(test)]
mod tests {
    use super::{UsageError, UsageErrorKind};

    #[test]
    fn missing_with_suggestion() {
        let err = UsageError::missing_declaration("User", "ful_name", Some("full_name"));
        assert_eq!(err.kind(), UsageErrorKind::MissingDeclaration);
        assert_eq!(
            err.to_string(),
            "Type 'User' has no lazy property 'ful_name' (did you mean 'full_name'?)"
        );
    }

    #[test]
    fn missing_without_suggestion() {
        let err = UsageError::missing_declaration("User", "age", None);
        assert_eq!(err.to_string(), "Type 'User' has no lazy property 'age'");
    }

    #[test]
    fn late_names_type() {
        let err = UsageError::late_declaration("User", "full_name");
        assert_eq!(err.kind(), UsageErrorKind::LateDeclaration);
        assert!(err.message().contains("'User'"));
        assert!(err.message().contains("'full_name'"));
    }
}
