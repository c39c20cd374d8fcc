//! Context handed to binding creators.

use std::sync::Arc;

use super::Container;
use crate::error::DiResult;
use crate::key::Key;
use crate::registration::{downcast_instance, AnyArc, AnyFactory, Context};
use crate::traits::ResolverCore;
use crate::tree::OverrideLevel;

/// What a binding sees while it builds an instance.
///
/// Resolving through it (via [`Resolver`](crate::Resolver)) goes through a
/// container one step deeper in the construction chain, so a binding that
/// ends up needing itself fails with a dependency loop rather than a stack
/// overflow.
///
/// # Examples
///
/// ```
/// use ferrous_bind::{ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Port(u16);
/// struct Server { port: Arc<Port> }
///
/// let mut builder = ContainerBuilder::new();
/// builder.bind::<Port>().instance(Port(8080)).unwrap();
/// builder.bind::<Server>().provider(|ctx| {
///     // ctx is a BindingContext
///     Ok(Server { port: ctx.get::<Port>()? })
/// }).unwrap();
///
/// let container = builder.build().unwrap();
/// assert_eq!(container.get::<Server>().unwrap().port.0, 8080);
/// ```
#[derive(Clone)]
pub struct BindingContext {
    container: Container,
    key: Key,
    level: usize,
}

impl BindingContext {
    pub(crate) fn new(container: Container, key: Key, level: usize) -> Self {
        Self { container, key, level }
    }

    /// The nested container requests go through.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Key of the binding being built.
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn override_level(&self) -> usize {
        self.level
    }

    /// The context value, downcast to the binding's context type.
    pub fn context_value<C: Send + Sync + 'static>(&self) -> DiResult<Arc<C>> {
        self.container.context_ref().downcast::<C>()
    }

    /// Factory of the definition this one overrides.
    ///
    /// Fails with `NotFound` on a base (level 0) binding.
    pub fn overridden_factory(&self) -> DiResult<AnyFactory> {
        match self.level.checked_sub(1) {
            Some(lower) => self.container.factory(
                &self.key,
                self.container.context_ref(),
                OverrideLevel::Exact(lower),
            ),
            None => Err(self.container.not_found(&self.key, OverrideLevel::Exact(0))),
        }
    }

    pub fn overridden_factory_or_none(&self) -> DiResult<Option<AnyFactory>> {
        match self.level.checked_sub(1) {
            Some(lower) => self.container.factory_or_none(
                &self.key,
                self.container.context_ref(),
                OverrideLevel::Exact(lower),
            ),
            None => Ok(None),
        }
    }

    /// Instance from the overridden definition, for bindings that decorate it.
    ///
    /// ```
    /// use ferrous_bind::{ContainerBuilder, Resolver};
    ///
    /// let mut builder = ContainerBuilder::new();
    /// builder.bind::<String>().instance("base".to_string()).unwrap();
    /// builder
    ///     .bind::<String>()
    ///     .overrides(true)
    ///     .provider(|ctx| Ok(format!("{}+wrapped", ctx.overridden::<String>()?)))
    ///     .unwrap();
    ///
    /// let container = builder.build().unwrap();
    /// assert_eq!(*container.get::<String>().unwrap(), "base+wrapped");
    /// ```
    pub fn overridden<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let factory = self.overridden_factory()?;
        downcast_instance::<T>(factory(Arc::new(()) as AnyArc)?)
    }
}

impl ResolverCore for BindingContext {
    fn context(&self) -> &Context {
        self.container.context_ref()
    }

    fn factory_any(&self, key: &Key, level: OverrideLevel) -> DiResult<AnyFactory> {
        self.container.factory_any(key, level)
    }

    fn factory_any_or_none(&self, key: &Key, level: OverrideLevel) -> DiResult<Option<AnyFactory>> {
        self.container.factory_any_or_none(key, level)
    }

    fn all_factories_any(&self, key: &Key, level: OverrideLevel) -> DiResult<Vec<AnyFactory>> {
        self.container.all_factories_any(key, level)
    }
}
