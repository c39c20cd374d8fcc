//! Resolver traits for binding resolution.

use std::sync::Arc;

use crate::error::DiResult;
use crate::key::{Key, Tag, TypeToken};
use crate::registration::{downcast_instance, AnyArc, AnyFactory, Context};
use crate::tree::OverrideLevel;

/// Typed provider: builds or fetches a `T` on each call.
pub type ProviderFn<T> = Arc<dyn Fn() -> DiResult<Arc<T>> + Send + Sync>;

/// Typed factory: builds or fetches a `T` from an `A`.
pub type FactoryFn<A, T> = Arc<dyn Fn(A) -> DiResult<Arc<T>> + Send + Sync>;

/// Core resolver trait for object-safe factory lookup.
///
/// Implemented by [`Container`](crate::Container) and by the
/// [`BindingContext`](crate::BindingContext) handed to binding creators.
/// Every lookup goes through the container's cycle check, so a factory
/// obtained here fails with [`DiError::DependencyLoop`](crate::DiError::DependencyLoop)
/// instead of recursing forever.
///
/// Most users should use the [`Resolver`] trait instead, which provides
/// typed generic methods built on top of this one.
pub trait ResolverCore: Send + Sync {
    /// Context value that requests made through this resolver carry.
    fn context(&self) -> &Context;

    /// Factory for exactly one binding of `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(AnyFactory)` - A factory from the single matching binding or an external source
    /// * `Err(DiError::NotFound)` - Zero or several bindings match
    /// * `Err(DiError::DependencyLoop)` - `key` is already being constructed on this call path
    fn factory_any(&self, key: &Key, level: OverrideLevel) -> DiResult<AnyFactory>;

    /// Like [`factory_any`](Self::factory_any) but absent or ambiguous bindings give `Ok(None)`.
    ///
    /// Dependency loops are still reported as errors.
    fn factory_any_or_none(&self, key: &Key, level: OverrideLevel) -> DiResult<Option<AnyFactory>>;

    /// Factories for every binding matching `key`; never fails with `NotFound`.
    fn all_factories_any(&self, key: &Key, level: OverrideLevel) -> DiResult<Vec<AnyFactory>>;
}

/// High-level resolver interface with generic methods for typed resolution.
///
/// Implemented for every [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use ferrous_bind::{ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut builder = ContainerBuilder::new();
/// builder.bind::<Database>().instance(Database { url: "postgres://localhost".into() }).unwrap();
/// builder.bind::<UserService>().provider(|r| Ok(UserService { db: r.get::<Database>()? })).unwrap();
///
/// let container = builder.build().unwrap();
/// let users = container.get::<UserService>().unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
/// ```
pub trait Resolver: ResolverCore {
    /// Key for a `T` built from an `A`, in this resolver's context.
    fn key_for<A: 'static, T: 'static>(&self, tag: Option<Tag>) -> Key {
        Key::new(
            self.context().type_token().clone(),
            TypeToken::of::<A>(),
            TypeToken::of::<T>(),
            tag,
        )
    }

    /// Resolves a `T` from the binding for `key`, passing `arg` to its factory.
    fn resolve_keyed<A, T>(&self, key: &Key, arg: A) -> DiResult<Arc<T>>
    where
        A: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let factory = self.factory_any(key, OverrideLevel::Highest)?;
        downcast_instance::<T>(factory(Arc::new(arg) as AnyArc)?)
    }

    /// Resolves an untagged `T` that takes no argument.
    ///
    /// ```
    /// use ferrous_bind::{ContainerBuilder, Resolver};
    ///
    /// let mut builder = ContainerBuilder::new();
    /// builder.bind::<String>().instance("configuration".to_string()).unwrap();
    ///
    /// let container = builder.build().unwrap();
    /// assert_eq!(&*container.get::<String>().unwrap(), "configuration");
    /// ```
    fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.resolve_keyed::<(), T>(&self.key_for::<(), T>(None), ())
    }

    /// Resolves the `T` bound under `tag`.
    ///
    /// ```
    /// use ferrous_bind::{ContainerBuilder, Resolver};
    ///
    /// let mut builder = ContainerBuilder::new();
    /// builder.bind::<u16>().tag("http").instance(80u16).unwrap();
    /// builder.bind::<u16>().tag("https").instance(443u16).unwrap();
    ///
    /// let container = builder.build().unwrap();
    /// assert_eq!(*container.get_tagged::<u16>("https").unwrap(), 443);
    /// ```
    fn get_tagged<T: Send + Sync + 'static>(&self, tag: impl Into<Tag>) -> DiResult<Arc<T>> {
        self.resolve_keyed::<(), T>(&self.key_for::<(), T>(Some(tag.into())), ())
    }

    /// Resolves a `T` from a binding that takes an `A` argument.
    fn get_with<A, T>(&self, arg: A) -> DiResult<Arc<T>>
    where
        A: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.resolve_keyed::<A, T>(&self.key_for::<A, T>(None), arg)
    }

    fn get_tagged_with<A, T>(&self, tag: impl Into<Tag>, arg: A) -> DiResult<Arc<T>>
    where
        A: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.resolve_keyed::<A, T>(&self.key_for::<A, T>(Some(tag.into())), arg)
    }

    /// Resolves a `T`, or `Ok(None)` when nothing (or more than one binding) matches.
    fn get_or_none<T: Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        let key = self.key_for::<(), T>(None);
        match self.factory_any_or_none(&key, OverrideLevel::Highest)? {
            Some(factory) => Ok(Some(downcast_instance::<T>(factory(Arc::new(()) as AnyArc)?)?)),
            None => Ok(None),
        }
    }

    /// Resolves a `T`, panicking with the diagnostic text on failure.
    ///
    /// Use this when a missing binding is a configuration bug that should
    /// fail fast.
    fn get_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        match self.get::<T>() {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }

    /// Returns a provider for `T`; each call goes through the binding's strategy.
    fn provider<T: Send + Sync + 'static>(&self) -> DiResult<ProviderFn<T>> {
        let factory = self.factory_any(&self.key_for::<(), T>(None), OverrideLevel::Highest)?;
        Ok(Arc::new(move || downcast_instance::<T>(factory(Arc::new(()) as AnyArc)?)))
    }

    /// Returns a typed factory for bindings taking an `A`.
    ///
    /// ```
    /// use ferrous_bind::{ContainerBuilder, Resolver};
    ///
    /// struct Greeting(String);
    ///
    /// let mut builder = ContainerBuilder::new();
    /// builder.bind::<Greeting>().factory(|_, name: &String| Ok(Greeting(format!("hello {}", name)))).unwrap();
    ///
    /// let container = builder.build().unwrap();
    /// let greet = container.factory_fn::<String, Greeting>().unwrap();
    /// assert_eq!(greet("ada".to_string()).unwrap().0, "hello ada");
    /// ```
    fn factory_fn<A, T>(&self) -> DiResult<FactoryFn<A, T>>
    where
        A: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let factory = self.factory_any(&self.key_for::<A, T>(None), OverrideLevel::Highest)?;
        Ok(Arc::new(move |arg: A| downcast_instance::<T>(factory(Arc::new(arg) as AnyArc)?)))
    }

    /// Resolves every binding producing a `T`, whatever its tag.
    ///
    /// Returns an empty vector when nothing is bound.
    fn get_all<T: Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        let key = self.key_for::<(), T>(None);
        self.all_factories_any(&key, OverrideLevel::Highest)?
            .into_iter()
            .map(|factory| downcast_instance::<T>(factory(Arc::new(()) as AnyArc)?))
            .collect()
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
