//! The resolution façade.
//!
//! A [`Container`] answers "give me a factory for this key" by searching the
//! binding tree, checking the request against the chain of keys already
//! under construction, and handing the matched binding a nested container
//! to resolve its own dependencies through.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::diagnostics::{ambiguous_message, not_found_message};
use crate::error::{DiError, DiResult};
use crate::internal::{InitCallbacks, Node};
use crate::key::Key;
use crate::registration::{AnyFactory, Context};
use crate::traits::ResolverCore;
use crate::tree::{BindingTree, Lookup, Match, OverrideLevel};

mod context;
pub use context::BindingContext;

/// Resolves bindings from a built [`BindingTree`].
///
/// Containers are cheap to clone: the tree is shared, and every nested
/// resolution step works on its own clone carrying one more node of the
/// construction chain. That chain is what turns infinite recursion into a
/// [`DiError::DependencyLoop`].
///
/// # Examples
///
/// ```
/// use ferrous_bind::{ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Config { name: String }
/// struct Greeter { config: Arc<Config> }
///
/// let mut builder = ContainerBuilder::new();
/// builder.bind::<Config>().instance(Config { name: "ada".into() }).unwrap();
/// builder.bind::<Greeter>().singleton(|r| Ok(Greeter { config: r.get()? })).unwrap();
///
/// let container = builder.build().unwrap();
/// assert_eq!(container.get::<Greeter>().unwrap().config.name, "ada");
/// ```
#[derive(Clone)]
pub struct Container {
    tree: Arc<BindingTree>,
    node: Option<Arc<Node>>,
    context: Context,
    full_description_on_error: bool,
    init: Option<Arc<InitCallbacks>>,
}

impl Container {
    pub(crate) fn new(
        tree: Arc<BindingTree>,
        full_description_on_error: bool,
        init: Option<Arc<InitCallbacks>>,
    ) -> Self {
        Self {
            tree,
            node: None,
            context: Context::none(),
            full_description_on_error,
            init,
        }
    }

    pub fn tree(&self) -> &BindingTree {
        &self.tree
    }

    pub fn full_description_on_error(&self) -> bool {
        self.full_description_on_error
    }

    /// This container with every request carrying `value` as its context.
    ///
    /// ```
    /// use ferrous_bind::{ContainerBuilder, Resolver};
    ///
    /// struct Request { user: String }
    /// struct Greeting(String);
    ///
    /// let mut builder = ContainerBuilder::new();
    /// builder
    ///     .bind::<Greeting>()
    ///     .in_context::<Request>()
    ///     .provider(|ctx| Ok(Greeting(format!("hi {}", ctx.context_value::<Request>()?.user))))
    ///     .unwrap();
    /// let container = builder.build().unwrap();
    ///
    /// let scoped = container.on(Request { user: "ada".into() });
    /// assert_eq!(scoped.get::<Greeting>().unwrap().0, "hi ada");
    /// ```
    pub fn on<C: Send + Sync + 'static>(&self, value: C) -> Container {
        self.with_context(Context::of(value))
    }

    pub fn with_context(&self, context: Context) -> Container {
        Container { context, ..self.clone() }
    }

    /// Factory for the single binding answering `key` at `level`.
    ///
    /// Falls back to the external sources when the tree has no match or an
    /// ambiguous one; fails with [`DiError::NotFound`] when they don't
    /// answer either.
    pub fn factory(&self, key: &Key, context: &Context, level: OverrideLevel) -> DiResult<AnyFactory> {
        self.ensure_ready()?;

        let candidates = match self.tree.lookup(key, level) {
            Lookup::Found(found) => return self.materialize(key, context, found),
            Lookup::NotFound => None,
            Lookup::Ambiguous(candidates) => Some(candidates),
        };

        if let Some(factory) = self.from_external_sources(key, context, level)? {
            return Ok(factory);
        }

        let full = self.full_description_on_error;
        let message = match &candidates {
            None => not_found_message(&self.tree, key, level, full),
            Some(candidates) => ambiguous_message(&self.tree, key, candidates, level, full),
        };
        warn!(
            key = %key.description(),
            candidates = candidates.as_ref().map_or(0, |c| c.len()),
            "no unique binding found"
        );
        Err(DiError::not_found(key, message))
    }

    /// Like [`factory`](Self::factory), with `Ok(None)` instead of `NotFound`.
    pub fn factory_or_none(
        &self,
        key: &Key,
        context: &Context,
        level: OverrideLevel,
    ) -> DiResult<Option<AnyFactory>> {
        self.ensure_ready()?;

        if let Lookup::Found(found) = self.tree.lookup(key, level) {
            return self.materialize(key, context, found).map(Some);
        }
        self.from_external_sources(key, context, level)
    }

    /// Factories for every binding answering `key`, lowest override level first.
    ///
    /// Never fails with `NotFound`. The first error met while building the
    /// list aborts the whole call.
    pub fn all_factories(&self, key: &Key, context: &Context, level: OverrideLevel) -> DiResult<Vec<AnyFactory>> {
        self.ensure_ready()?;

        self.tree
            .find(key, level, true)
            .into_iter()
            .map(|found| self.materialize(key, context, found))
            .collect()
    }

    pub(crate) fn not_found(&self, key: &Key, level: OverrideLevel) -> DiError {
        DiError::not_found(
            key,
            not_found_message(&self.tree, key, level, self.full_description_on_error),
        )
    }

    pub(crate) fn context_ref(&self) -> &Context {
        &self.context
    }

    fn ensure_ready(&self) -> DiResult<()> {
        match &self.init {
            Some(init) => init.run(&self.with_context(Context::none())),
            None => Ok(()),
        }
    }

    fn check(&self, key: &Key, level: usize, overridden: bool) -> DiResult<()> {
        match &self.node {
            Some(node) => node.check(key, level, overridden),
            None => Ok(()),
        }
    }

    /// A container one step deeper in the construction chain.
    fn nested(&self, key: &Key, level: usize, overridden: bool, context: Context) -> Container {
        let node = Node::new(
            key.clone(),
            level,
            overridden,
            self.node.clone(),
            self.full_description_on_error,
        );
        Container {
            tree: self.tree.clone(),
            node: Some(Arc::new(node)),
            context,
            full_description_on_error: self.full_description_on_error,
            init: None,
        }
    }

    fn materialize(&self, key: &Key, context: &Context, found: Match) -> DiResult<AnyFactory> {
        // The chain records requested keys: distinct requests answered by one
        // wildcard binding are different steps.
        let level = found.definition.level;
        self.check(key, level, found.overridden)?;

        let translated = found.translator.as_ref().and_then(|t| t.translate(context));
        if translated.is_some() {
            debug!(key = %key.description(), scope = ?found.key.context_type, "context translated");
        }
        let context = translated.unwrap_or_else(|| context.clone());

        trace!(key = %key.description(), level, "binding found");
        let nested = self.nested(key, level, found.overridden, context);
        let ctx = BindingContext::new(nested, found.key.clone(), level);
        found.definition.binding.factory(ctx, key)
    }

    fn from_external_sources(
        &self,
        key: &Key,
        context: &Context,
        level: OverrideLevel,
    ) -> DiResult<Option<AnyFactory>> {
        let sources = self.tree.external_sources();
        if sources.is_empty() {
            return Ok(None);
        }

        let level = match level {
            OverrideLevel::Exact(level) => level,
            OverrideLevel::Highest => 0,
        };
        let ctx = BindingContext::new(self.nested(key, level, false, context.clone()), key.clone(), level);
        for source in sources {
            if let Some(factory) = source.factory(&ctx, key)? {
                self.check(key, level, false)?;
                debug!(key = %key.description(), "resolved by external source");
                return Ok(Some(factory));
            }
        }
        Ok(None)
    }

    /// One [`BindingDescriptor`](crate::BindingDescriptor) per registered definition.
    pub fn descriptors(&self) -> Vec<crate::BindingDescriptor> {
        crate::descriptors::describe_tree(&self.tree)
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str("Bindings:\n");
        for d in self.descriptors() {
            s.push_str(&format!("  {} [level {}]: {}\n", d.key, d.level, d.binding));
        }
        s.push_str(&format!("External sources: {}\n", self.tree.external_sources().len()));
        s.push_str(&format!("Context translators: {}\n", self.tree.translators().len()));
        s
    }
}

impl ResolverCore for Container {
    fn context(&self) -> &Context {
        &self.context
    }

    fn factory_any(&self, key: &Key, level: OverrideLevel) -> DiResult<AnyFactory> {
        self.factory(key, &self.context, level)
    }

    fn factory_any_or_none(&self, key: &Key, level: OverrideLevel) -> DiResult<Option<AnyFactory>> {
        self.factory_or_none(key, &self.context, level)
    }

    fn all_factories_any(&self, key: &Key, level: OverrideLevel) -> DiResult<Vec<AnyFactory>> {
        self.all_factories(key, &self.context, level)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.tree.len())
            .field("context", &self.context)
            .field("nested", &self.node.is_some())
            .finish()
    }
}
