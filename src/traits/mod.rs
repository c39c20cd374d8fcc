//! Core traits for the dependency injection container.

mod binding;
mod resolver;

pub use binding::{Binding, ContextTranslator, ExternalSource, SimpleContextTranslator};
pub use resolver::{FactoryFn, ProviderFn, Resolver, ResolverCore};
