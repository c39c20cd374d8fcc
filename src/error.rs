//! Error types for the dependency injection container.

use std::fmt;

use crate::key::Key;

/// Dependency injection errors
///
/// Represents the conditions that can occur while configuring a container
/// or resolving bindings from it. Every variant that comes out of a
/// resolution carries ready-to-print text; callers are not expected to
/// format anything further.
///
/// # Examples
///
/// ```rust
/// use ferrous_bind::{ContainerBuilder, DiError, Resolver};
///
/// struct Person;
///
/// let container = ContainerBuilder::new().build().unwrap();
/// match container.get::<Person>() {
///     Err(DiError::NotFound { message, .. }) => {
///         assert!(message.starts_with("No binding found for bind<Person>()"));
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_bind::DiError;
///
/// let mismatch = DiError::TypeMismatch("alloc::string::String");
/// let uninjected = DiError::Uninjected("app::Config");
///
/// println!("Error: {}", mismatch);
/// println!("Error: {}", uninjected);
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// No binding, or more than one binding, matches the requested key
    NotFound {
        key: Key,
        message: String,
    },
    /// A key reappeared in its own construction chain (rendered diagram)
    DependencyLoop(String),
    /// Type-erased value could not be downcast to the requested type
    TypeMismatch(&'static str),
    /// Registration conflicts with the override policy
    Overriding(String),
    /// Lazy handle read before its injector was activated
    Uninjected(&'static str),
}

impl DiError {
    pub(crate) fn not_found(key: &Key, message: String) -> Self {
        DiError::NotFound { key: key.clone(), message }
    }

    /// True for errors caused by missing or ambiguous configuration.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiError::NotFound { .. })
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotFound { message, .. } => f.write_str(message),
            DiError::DependencyLoop(diagram) => f.write_str(diagram),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::Overriding(msg) => write!(f, "Override error: {}", msg),
            DiError::Uninjected(name) => {
                write!(f, "Value of type {} was read before the injector was activated", name)
            }
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations
///
/// A convenience alias for `Result<T, DiError>` used throughout ferrous-bind.
///
/// # Examples
///
/// ```rust
/// use ferrous_bind::{DiResult, DiError};
///
/// fn create_service() -> DiResult<String> {
///     Ok("service created".to_string())
/// }
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::TypeMismatch("some_service"))
/// }
///
/// assert!(create_service().is_ok());
/// assert!(failing_operation().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
