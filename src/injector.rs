//! Handles declared before their container exists.
//!
//! An object that is constructed outside the container (a UI component, a
//! test fixture) can declare its dependencies up front as [`Injected`]
//! handles, and have them wired later with [`Injector::inject`].

use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::key::{Key, Tag};
use crate::registration::{downcast_instance, AnyArc};
use crate::traits::{Resolver, ResolverCore};
use crate::tree::OverrideLevel;

/// Source of [`Injected`] handles, activated once with a container.
///
/// ```
/// use ferrous_bind::{ContainerBuilder, DiError, Injector};
///
/// struct Screen {
///     title: ferrous_bind::Injected<String>,
/// }
///
/// let injector = Injector::new();
/// let screen = Screen { title: injector.instance::<String>() };
/// assert!(matches!(screen.title.get(), Err(DiError::Uninjected(_))));
///
/// let mut builder = ContainerBuilder::new();
/// builder.bind::<String>().instance("Home".to_string()).unwrap();
/// injector.inject(builder.build().unwrap());
///
/// assert_eq!(*screen.title.get().unwrap(), "Home");
/// ```
#[derive(Clone, Default)]
pub struct Injector {
    container: Arc<OnceCell<Container>>,
}

impl Injector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle on the untagged `T`.
    pub fn instance<T: Send + Sync + 'static>(&self) -> Injected<T> {
        self.handle(Key::of::<T>())
    }

    pub fn instance_tagged<T: Send + Sync + 'static>(&self, tag: impl Into<Tag>) -> Injected<T> {
        self.handle(Key::of::<T>().tagged(tag))
    }

    /// Handle on the untagged `T` that reads `None` when nothing answers it.
    pub fn instance_or_none<T: Send + Sync + 'static>(&self) -> InjectedOrNone<T> {
        InjectedOrNone {
            container: self.container.clone(),
            key: Key::of::<T>(),
            value: OnceCell::new(),
        }
    }

    /// Handle that goes back to the binding on every read.
    pub fn provider<T: Send + Sync + 'static>(&self) -> InjectedProvider<T> {
        InjectedProvider {
            container: self.container.clone(),
            key: Key::of::<T>(),
            _marker: PhantomData,
        }
    }

    /// Activates every handle, past and future.
    ///
    /// Returns `false`, leaving the first container in place, when already injected.
    pub fn inject(&self, container: Container) -> bool {
        self.container.set(container).is_ok()
    }

    pub fn is_injected(&self) -> bool {
        self.container.get().is_some()
    }

    fn handle<T: Send + Sync + 'static>(&self, key: Key) -> Injected<T> {
        Injected {
            container: self.container.clone(),
            key,
            value: OnceCell::new(),
        }
    }
}

/// A dependency resolved on first read after its injector is activated.
///
/// Reading before activation fails with [`DiError::Uninjected`]; after a
/// successful read the instance is cached in the handle.
pub struct Injected<T> {
    container: Arc<OnceCell<Container>>,
    key: Key,
    value: OnceCell<Arc<T>>,
}

impl<T: Send + Sync + 'static> Injected<T> {
    pub fn get(&self) -> DiResult<Arc<T>> {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }
        let container = activated::<T>(&self.container)?;
        self.value
            .get_or_try_init(|| container.resolve_keyed::<(), T>(&self.key, ()))
            .cloned()
    }

    pub fn key(&self) -> &Key {
        &self.key
    }
}

fn activated<T>(container: &OnceCell<Container>) -> DiResult<&Container> {
    container.get().ok_or(DiError::Uninjected(std::any::type_name::<T>()))
}

/// Like [`Injected`], for dependencies that may be missing.
pub struct InjectedOrNone<T> {
    container: Arc<OnceCell<Container>>,
    key: Key,
    value: OnceCell<Option<Arc<T>>>,
}

impl<T: Send + Sync + 'static> InjectedOrNone<T> {
    /// The absence of a binding is cached like an instance is.
    pub fn get(&self) -> DiResult<Option<Arc<T>>> {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }
        let container = activated::<T>(&self.container)?;
        self.value
            .get_or_try_init(|| {
                container
                    .factory_any_or_none(&self.key, OverrideLevel::Highest)?
                    .map(|factory| downcast_instance::<T>(factory(Arc::new(()) as AnyArc)?))
                    .transpose()
            })
            .cloned()
    }
}

/// Uncached handle: every read asks the binding again.
pub struct InjectedProvider<T> {
    container: Arc<OnceCell<Container>>,
    key: Key,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> InjectedProvider<T> {
    pub fn get(&self) -> DiResult<Arc<T>> {
        activated::<T>(&self.container)?.resolve_keyed::<(), T>(&self.key, ())
    }
}

impl<T> std::fmt::Debug for Injected<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injected")
            .field("key", &self.key)
            .field("resolved", &self.value.get().is_some())
            .finish()
    }
}
