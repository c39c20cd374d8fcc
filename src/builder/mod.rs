//! Container configuration.
//!
//! [`ContainerBuilder`] collects bindings, external sources, context
//! translators and ready callbacks, enforces the override policy as each
//! binding arrives, and freezes everything into a [`Container`].

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::bindings::{Factory, Instance, Multiton, Provider, Singleton};
use crate::container::{BindingContext, Container};
use crate::error::{DiError, DiResult};
use crate::internal::{InitCallback, InitCallbacks};
use crate::key::{Key, Tag, TypeToken};
use crate::registration::BindingDefinition;
use crate::traits::{Binding, ContextTranslator, ExternalSource};
use crate::tree::{BindingTree, Map};

pub mod module_system;
pub use module_system::*;

/// How a registration may interact with an existing binding for its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverrideMode {
    /// Overrides must be declared; undeclared ones are rejected
    Explicit,
    /// Undeclared overrides are accepted
    Silent,
    /// Inside a module imported without override permission
    Forbidden,
}

impl OverrideMode {
    /// `Some(must_override)` when the registration has to be checked.
    fn must_override(self, overrides: Option<bool>) -> DiResult<Option<bool>> {
        match self {
            OverrideMode::Explicit => Ok(Some(overrides.unwrap_or(false))),
            OverrideMode::Silent => Ok(overrides),
            OverrideMode::Forbidden if overrides == Some(true) => {
                Err(DiError::Overriding("Overriding has been forbidden".to_string()))
            }
            OverrideMode::Forbidden => Ok(Some(false)),
        }
    }
}

/// Builder for [`Container`]s.
///
/// # Examples
///
/// ```
/// use ferrous_bind::{ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync { fn now(&self) -> u64; }
/// struct Fixed;
/// impl Clock for Fixed { fn now(&self) -> u64 { 42 } }
///
/// let mut builder = ContainerBuilder::new();
/// builder.bind::<Arc<dyn Clock>>().instance(Arc::new(Fixed)).unwrap();
/// builder.bind::<u64>().tag("boot").provider(|r| Ok(r.get::<Arc<dyn Clock>>()?.now())).unwrap();
///
/// let container = builder.build().unwrap();
/// assert_eq!(*container.get_tagged::<u64>("boot").unwrap(), 42);
/// ```
pub struct ContainerBuilder {
    entries: Vec<(Key, Vec<Arc<BindingDefinition>>)>,
    index: Map<Key, usize>,
    external_sources: Vec<Arc<dyn ExternalSource>>,
    translators: Vec<Arc<dyn ContextTranslator>>,
    callbacks: Vec<InitCallback>,
    imported: HashSet<String>,
    /// Module being imported and whether it may override
    current_module: Option<(Arc<str>, bool)>,
    full_description_on_error: bool,
    run_callbacks_eagerly: bool,
    allow_silent_override: bool,
}

impl ContainerBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: Map::default(),
            external_sources: Vec::new(),
            translators: Vec::new(),
            callbacks: Vec::new(),
            imported: HashSet::new(),
            current_module: None,
            full_description_on_error: false,
            run_callbacks_eagerly: true,
            allow_silent_override: false,
        }
    }

    // ----- Configuration -----

    /// Use full type paths instead of short names in error messages.
    pub fn full_description_on_error(&mut self, full: bool) -> &mut Self {
        self.full_description_on_error = full;
        self
    }

    /// Run `on_ready` callbacks inside [`build`](Self::build) (the default)
    /// rather than on the first resolution.
    pub fn run_callbacks_eagerly(&mut self, eager: bool) -> &mut Self {
        self.run_callbacks_eagerly = eager;
        self
    }

    /// Let a registration replace an existing binding without declaring it.
    pub fn allow_silent_override(&mut self, allow: bool) -> &mut Self {
        self.allow_silent_override = allow;
        self
    }

    // ----- Registrations -----

    /// Starts a binding for `T`.
    ///
    /// ```
    /// use ferrous_bind::{ContainerBuilder, Resolver};
    ///
    /// struct Session;
    /// struct Account;
    ///
    /// let mut builder = ContainerBuilder::new();
    /// builder.bind::<u32>().tag("retries").instance(3).unwrap();
    /// builder.bind::<String>().in_context::<Session>().provider(|_| Ok("session".into())).unwrap();
    /// builder.bind::<Account>().singleton(|_| Ok(Account)).unwrap();
    /// ```
    pub fn bind<T: Send + Sync + 'static>(&mut self) -> TypedBinder<'_, T> {
        TypedBinder {
            builder: self,
            tag: None,
            context_type: TypeToken::Any,
            overrides: None,
            _marker: PhantomData,
        }
    }

    /// Registers `binding` under `key`.
    ///
    /// `overrides` declares intent: `Some(true)` must replace an existing
    /// binding, `Some(false)` must not, `None` follows the builder policy.
    /// An override stacks on top of the existing definitions, one level up.
    pub fn add_binding(
        &mut self,
        key: Key,
        binding: Arc<dyn Binding>,
        overrides: Option<bool>,
    ) -> DiResult<&mut Self> {
        self.check_overrides(&key, overrides)?;
        let module = self.current_module.as_ref().map(|(name, _)| name.clone());
        self.push_definition(key, binding, module);
        Ok(self)
    }

    pub fn add_external_source(&mut self, source: impl ExternalSource + 'static) -> &mut Self {
        self.external_sources.push(Arc::new(source));
        self
    }

    pub fn add_translator(&mut self, translator: impl ContextTranslator + 'static) -> &mut Self {
        self.translators.push(Arc::new(translator));
        self
    }

    /// Registers a callback that runs once the container is usable.
    ///
    /// ```
    /// use ferrous_bind::{ContainerBuilder, Resolver};
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    ///
    /// let warmed = Arc::new(AtomicBool::new(false));
    /// let flag = warmed.clone();
    ///
    /// let mut builder = ContainerBuilder::new();
    /// builder.bind::<String>().instance("cache".to_string()).unwrap();
    /// builder.on_ready(move |c| {
    ///     c.get::<String>()?;
    ///     flag.store(true, Ordering::SeqCst);
    ///     Ok(())
    /// });
    ///
    /// let _container = builder.build().unwrap();
    /// assert!(warmed.load(Ordering::SeqCst));
    /// ```
    pub fn on_ready<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(&Container) -> DiResult<()> + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
        self
    }

    /// Copies the bindings, external sources and translators of `parent`.
    ///
    /// Stateful bindings are shared, not copied: a singleton already built
    /// by `parent` is the same instance in the new container. Keys bound
    /// in both are an error unless `allow_override` is set, in which case
    /// the copied definitions stack on top of the existing ones.
    pub fn extend(&mut self, parent: &Container, allow_override: bool) -> DiResult<&mut Self> {
        let tree = parent.tree();
        for (key, defs) in tree.bindings() {
            if self.index.contains_key(key) && !allow_override {
                return Err(DiError::Overriding(format!(
                    "Binding {} must not override an existing binding.",
                    key
                )));
            }
            for def in defs {
                self.push_definition(key.clone(), def.binding.clone(), def.module.clone());
            }
        }
        self.external_sources.extend(tree.external_sources().iter().cloned());
        self.translators.extend(tree.translators().iter().cloned());
        debug!(bindings = tree.len(), "extended from parent container");
        Ok(self)
    }

    /// Number of distinct keys bound so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    /// Freezes the configuration into a container.
    ///
    /// With eager callbacks (the default) the `on_ready` callbacks run here
    /// and their first error is returned. Otherwise they run on the first
    /// resolution, exactly once even when several threads race for it.
    pub fn build(self) -> DiResult<Container> {
        let tree = Arc::new(BindingTree::new(self.entries, self.external_sources, self.translators));
        let full = self.full_description_on_error;

        if self.callbacks.is_empty() {
            return Ok(Container::new(tree, full, None));
        }

        if self.run_callbacks_eagerly {
            let container = Container::new(tree, full, None);
            debug!(count = self.callbacks.len(), "running ready callbacks");
            for callback in self.callbacks {
                callback(&container)?;
            }
            return Ok(container);
        }

        let init = InitCallbacks::new(self.callbacks);
        Ok(Container::new(tree, full, Some(Arc::new(init))))
    }

    fn override_mode(&self) -> OverrideMode {
        match &self.current_module {
            Some((_, false)) => OverrideMode::Forbidden,
            _ if self.allow_silent_override => OverrideMode::Silent,
            _ => OverrideMode::Explicit,
        }
    }

    fn check_overrides(&self, key: &Key, overrides: Option<bool>) -> DiResult<()> {
        let exists = self.index.contains_key(key);
        match self.override_mode().must_override(overrides)? {
            Some(true) if !exists => Err(DiError::Overriding(format!(
                "Binding {} must override an existing binding.",
                key
            ))),
            Some(false) if exists => Err(DiError::Overriding(format!(
                "Binding {} must not override an existing binding.",
                key
            ))),
            _ => Ok(()),
        }
    }

    fn push_definition(&mut self, key: Key, binding: Arc<dyn Binding>, module: Option<Arc<str>>) {
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                self.entries.push((key.clone(), Vec::new()));
                self.index.insert(key.clone(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        let defs = &mut self.entries[position].1;
        let level = defs.len();
        defs.push(Arc::new(BindingDefinition::new(key, binding, level, module)));
    }

    pub(crate) fn enter_module(&mut self, name: &str, allow_override: bool) -> DiResult<Option<(Arc<str>, bool)>> {
        if !self.imported.insert(name.to_string()) {
            return Err(DiError::Overriding(format!(
                "Module \"{}\" has already been imported!",
                name
            )));
        }
        // A module without permission cannot grant it to the modules it imports.
        let allow_override = allow_override && !matches!(self.current_module, Some((_, false)));
        Ok(self.current_module.replace((Arc::from(name), allow_override)))
    }

    pub(crate) fn leave_module(&mut self, previous: Option<(Arc<str>, bool)>) {
        self.current_module = previous;
    }

    pub(crate) fn has_imported(&self, name: &str) -> bool {
        self.imported.contains(name)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent registration of one binding for `T`, started by
/// [`ContainerBuilder::bind`].
///
/// The modifiers (`tag`, `in_context`, `overrides`) shape the key; a
/// terminal method (`singleton`, `provider`, `instance`, ...) picks the
/// strategy and registers it.
#[must_use = "a binding is only registered by one of its terminal methods"]
pub struct TypedBinder<'a, T> {
    builder: &'a mut ContainerBuilder,
    tag: Option<Tag>,
    context_type: TypeToken,
    overrides: Option<bool>,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Send + Sync + 'static> TypedBinder<'a, T> {
    pub fn tag(mut self, tag: impl Into<Tag>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Only answer requests made in a context of type `C`.
    pub fn in_context<C: 'static>(mut self) -> Self {
        self.context_type = TypeToken::of::<C>();
        self
    }

    /// Declares whether this binding replaces an existing one.
    pub fn overrides(mut self, overrides: bool) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Registers any [`Binding`]; its argument type completes the key.
    pub fn with(self, binding: impl Binding + 'static) -> DiResult<&'a mut ContainerBuilder> {
        let key = Key::new(self.context_type, binding.argument_type(), TypeToken::of::<T>(), self.tag);
        self.builder.add_binding(key, Arc::new(binding), self.overrides)
    }

    pub fn singleton<F>(self, creator: F) -> DiResult<&'a mut ContainerBuilder>
    where
        F: Fn(&BindingContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.with(Singleton::new(creator))
    }

    /// A singleton whose creator may run more than once under contention.
    pub fn singleton_unsync<F>(self, creator: F) -> DiResult<&'a mut ContainerBuilder>
    where
        F: Fn(&BindingContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.with(Singleton::with_sync(false, creator))
    }

    pub fn provider<F>(self, creator: F) -> DiResult<&'a mut ContainerBuilder>
    where
        F: Fn(&BindingContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.with(Provider::new(creator))
    }

    pub fn instance(self, value: T) -> DiResult<&'a mut ContainerBuilder> {
        self.with(Instance::new(value))
    }

    pub fn factory<A, F>(self, creator: F) -> DiResult<&'a mut ContainerBuilder>
    where
        A: Send + Sync + 'static,
        F: Fn(&BindingContext, &A) -> DiResult<T> + Send + Sync + 'static,
    {
        self.with(Factory::new(creator))
    }

    pub fn multiton<A, F>(self, creator: F) -> DiResult<&'a mut ContainerBuilder>
    where
        A: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
        F: Fn(&BindingContext, &A) -> DiResult<T> + Send + Sync + 'static,
    {
        self.with(Multiton::new(creator))
    }

    pub fn multiton_unsync<A, F>(self, creator: F) -> DiResult<&'a mut ContainerBuilder>
    where
        A: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
        F: Fn(&BindingContext, &A) -> DiResult<T> + Send + Sync + 'static,
    {
        self.with(Multiton::with_sync(false, creator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mailer;

    #[test]
    fn undeclared_override_is_rejected() {
        let mut builder = ContainerBuilder::new();
        builder.bind::<Mailer>().provider(|_| Ok(Mailer)).unwrap();
        let err = builder.bind::<Mailer>().provider(|_| Ok(Mailer)).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Override error: Binding bind<Mailer>() with ? { ? } must not override an existing binding."
        );
    }

    #[test]
    fn override_of_missing_key_is_rejected() {
        let mut builder = ContainerBuilder::new();
        let err = builder.bind::<Mailer>().overrides(true).provider(|_| Ok(Mailer)).err().unwrap();
        assert!(err.to_string().ends_with("must override an existing binding."));
    }

    #[test]
    fn overrides_stack_levels() {
        let mut builder = ContainerBuilder::new();
        builder.bind::<u8>().instance(1).unwrap();
        builder.bind::<u8>().overrides(true).instance(2).unwrap();
        builder.bind::<u8>().overrides(true).instance(3).unwrap();

        let levels: Vec<usize> = builder.entries[0].1.iter().map(|d| d.level).collect();
        assert_eq!(levels, vec![0, 1, 2]);
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn silent_override_needs_no_declaration() {
        let mut builder = ContainerBuilder::new();
        builder.allow_silent_override(true);
        builder.bind::<u8>().instance(1).unwrap();
        assert!(builder.bind::<u8>().instance(2).is_ok());
        // An explicit declaration is still checked.
        assert!(builder.bind::<u16>().overrides(true).instance(2).is_err());
    }

    #[test]
    fn argument_type_is_part_of_the_key() {
        let mut builder = ContainerBuilder::new();
        builder.bind::<String>().provider(|_| Ok(String::new())).unwrap();
        builder.bind::<String>().factory(|_, n: &u32| Ok(n.to_string())).unwrap();
        assert_eq!(builder.len(), 2);
        assert!(builder.contains(&Key::with_argument::<u32, String>()));
    }
}
