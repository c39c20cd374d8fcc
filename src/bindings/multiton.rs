use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use super::factory::downcast_argument;
use super::ArgCreator;
use crate::container::BindingContext;
use crate::error::DiResult;
use crate::key::{Key, TypeToken};
use crate::registration::{AnyArc, AnyFactory};
use crate::traits::Binding;
use crate::tree::Map;

/// Keeps one `T` per distinct argument value.
///
/// Arguments are compared by equality, so two equal but separately built
/// arguments share an instance.
///
/// ```
/// use ferrous_bind::{ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Shard(u32);
///
/// let mut builder = ContainerBuilder::new();
/// builder.bind::<Shard>().multiton(|_, id: &u32| Ok(Shard(*id))).unwrap();
/// let container = builder.build().unwrap();
///
/// let a = container.get_with::<u32, Shard>(1).unwrap();
/// let b = container.get_with::<u32, Shard>(1).unwrap();
/// let c = container.get_with::<u32, Shard>(2).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(c.0, 2);
/// ```
pub struct Multiton<A, T> {
    inner: Arc<MultitonInner<A, T>>,
}

struct MultitonInner<A, T> {
    creator: ArgCreator<A, T>,
    instances: Mutex<Map<A, Arc<T>>>,
    sync: bool,
}

impl<A, T> Multiton<A, T>
where
    A: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new<F>(creator: F) -> Self
    where
        F: Fn(&BindingContext, &A) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::with_sync(true, creator)
    }

    pub fn with_sync<F>(sync: bool, creator: F) -> Self
    where
        F: Fn(&BindingContext, &A) -> DiResult<T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(MultitonInner {
                creator: Box::new(creator),
                instances: Mutex::new(Map::default()),
                sync,
            }),
        }
    }

    /// Number of instances created so far.
    pub fn len(&self) -> usize {
        self.inner.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A, T> MultitonInner<A, T>
where
    A: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn get_or_create(&self, ctx: &BindingContext, arg: &A) -> DiResult<Arc<T>> {
        if self.sync {
            // Held across creation so each argument is built once.
            let mut instances = self.instances.lock();
            if let Some(existing) = instances.get(arg) {
                return Ok(existing.clone());
            }
            let created = Arc::new((self.creator)(ctx, arg)?);
            instances.insert(arg.clone(), created.clone());
            return Ok(created);
        }

        if let Some(existing) = self.instances.lock().get(arg) {
            return Ok(existing.clone());
        }
        let created = Arc::new((self.creator)(ctx, arg)?);
        Ok(self.instances.lock().entry(arg.clone()).or_insert(created).clone())
    }
}

impl<A, T> Binding for Multiton<A, T>
where
    A: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn factory(&self, ctx: BindingContext, _key: &Key) -> DiResult<AnyFactory> {
        let inner = self.inner.clone();
        Ok(Arc::new(move |arg: AnyArc| -> DiResult<AnyArc> {
            let arg = downcast_argument::<A>(arg)?;
            Ok(inner.get_or_create(&ctx, &arg)?)
        }))
    }

    fn factory_name(&self) -> &'static str {
        "multiton"
    }

    fn argument_type(&self) -> TypeToken {
        TypeToken::of::<A>()
    }

    fn created_type(&self) -> TypeToken {
        TypeToken::of::<T>()
    }
}
