//! # ferrous-bind
//!
//! Runtime dependency injection for Rust with keyed bindings, explicit
//! override levels and readable failure diagnostics.
//!
//! ## Features
//!
//! - **Keyed bindings**: a key combines the bound type, an optional argument
//!   type, an optional context type and an optional tag
//! - **Binding strategies**: singleton, provider, factory, multiton, instance,
//!   or any type implementing [`Binding`]
//! - **Overrides**: later registrations stack on earlier ones and can still
//!   reach them through [`BindingContext::overridden`]
//! - **Dependency loop detection**: per call stack, reported as a diagram
//! - **Diagnostics**: not-found and ambiguous lookups list what *is* bound
//! - **Thread-safe**: the binding tree is immutable once built
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_bind::{ContainerBuilder, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut builder = ContainerBuilder::new();
//! builder.bind::<Database>().instance(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! }).unwrap();
//! builder.bind::<UserService>().provider(|r| {
//!     Ok(UserService { db: r.get::<Database>()? })
//! }).unwrap();
//!
//! let container = builder.build().unwrap();
//! let users = container.get::<UserService>().unwrap();
//! assert_eq!(users.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Dependency Loops
//!
//! ```rust
//! use ferrous_bind::{ContainerBuilder, DiError, Resolver};
//! use std::sync::Arc;
//!
//! struct Egg(Arc<Chicken>);
//! struct Chicken(Arc<Egg>);
//!
//! let mut builder = ContainerBuilder::new();
//! builder.bind::<Egg>().singleton(|r| Ok(Egg(r.get()?))).unwrap();
//! builder.bind::<Chicken>().singleton(|r| Ok(Chicken(r.get()?))).unwrap();
//! let container = builder.build().unwrap();
//!
//! match container.get::<Egg>() {
//!     Err(DiError::DependencyLoop(diagram)) => println!("{}", diagram),
//!     _ => unreachable!(),
//! }
//! ```
//!
//! prints
//!
//! ```text
//! Dependency recursion:
//!      bind<Egg>()
//!     ╔╩>bind<Chicken>()
//!     ║  ╚>bind<Egg>()
//!     ╚════╝
//! ```
//!
//! ## Missing Bindings
//!
//! ```rust
//! use ferrous_bind::{ContainerBuilder, Resolver};
//!
//! struct Mailer;
//!
//! let mut builder = ContainerBuilder::new();
//! builder.bind::<Mailer>().tag("smtp").provider(|_| Ok(Mailer)).unwrap();
//! let container = builder.build().unwrap();
//!
//! let err = container.get::<Mailer>().err().unwrap();
//! assert_eq!(
//!     err.to_string(),
//!     "No binding found for bind<Mailer>() with ? { ? }\n\
//!      Available bindings for this type:\n\
//!      \x20       bind<Mailer>(tag = \"smtp\") with provider { Mailer }\n\
//!      Registered in this Kodein container:\n\
//!      \x20       bind<Mailer>(tag = \"smtp\") with provider { Mailer }\n"
//! );
//! ```

// Module declarations
pub mod bindings;
pub mod builder;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod injector;
pub mod key;
pub mod traits;
pub mod tree;

// Internal modules
mod diagnostics;
mod internal;
mod registration;

// Re-exports
pub use bindings::{Factory, Instance, Multiton, Provider, Singleton};
pub use builder::{ContainerBuilder, Module, ModuleFn, TypedBinder};
pub use container::{BindingContext, Container};
pub use descriptors::BindingDescriptor;
pub use error::{DiError, DiResult};
pub use injector::{Injected, InjectedOrNone, InjectedProvider, Injector};
pub use key::{Key, SearchSpecs, Tag, TagValue, TypeToken};
pub use registration::{AnyArc, AnyFactory, BindingDefinition, Context};
pub use traits::{
    Binding, ContextTranslator, ExternalSource, FactoryFn, ProviderFn, Resolver, ResolverCore,
    SimpleContextTranslator,
};
pub use tree::{BindingTree, Match, Matches, OverrideLevel};
