use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::Creator;
use crate::container::BindingContext;
use crate::error::DiResult;
use crate::key::{Key, TypeToken};
use crate::registration::{AnyArc, AnyFactory};
use crate::traits::Binding;

/// Creates its instance on first use and returns it ever after.
///
/// A synchronized singleton (the default) runs its creator at most once even
/// under contention: other threads block on the cell until it is filled. An
/// unsynchronized one skips the lock; racing threads may each run the
/// creator, but all of them get the instance that won.
///
/// ```
/// use ferrous_bind::{ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Pool;
///
/// let mut builder = ContainerBuilder::new();
/// builder.bind::<Pool>().singleton(|_| Ok(Pool)).unwrap();
/// let container = builder.build().unwrap();
///
/// let a = container.get::<Pool>().unwrap();
/// let b = container.get::<Pool>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct Singleton<T> {
    inner: Arc<SingletonInner<T>>,
}

struct SingletonInner<T> {
    creator: Creator<T>,
    cell: OnceCell<Arc<T>>,
    sync: bool,
}

impl<T: Send + Sync + 'static> Singleton<T> {
    pub fn new<F>(creator: F) -> Self
    where
        F: Fn(&BindingContext) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::with_sync(true, creator)
    }

    pub fn with_sync<F>(sync: bool, creator: F) -> Self
    where
        F: Fn(&BindingContext) -> DiResult<T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(SingletonInner {
                creator: Box::new(creator),
                cell: OnceCell::new(),
                sync,
            }),
        }
    }

    pub fn is_sync(&self) -> bool {
        self.inner.sync
    }
}

impl<T: Send + Sync + 'static> SingletonInner<T> {
    fn get_or_create(&self, ctx: &BindingContext) -> DiResult<Arc<T>> {
        if let Some(value) = self.cell.get() {
            return Ok(value.clone());
        }
        if self.sync {
            return self
                .cell
                .get_or_try_init(|| (self.creator)(ctx).map(Arc::new))
                .cloned();
        }
        let built = Arc::new((self.creator)(ctx)?);
        Ok(self.cell.get_or_init(|| built).clone())
    }
}

impl<T: Send + Sync + 'static> Binding for Singleton<T> {
    fn factory(&self, ctx: BindingContext, _key: &Key) -> DiResult<AnyFactory> {
        let inner = self.inner.clone();
        Ok(Arc::new(move |_arg: AnyArc| -> DiResult<AnyArc> {
            Ok(inner.get_or_create(&ctx)?)
        }))
    }

    fn factory_name(&self) -> &'static str {
        "singleton"
    }

    fn argument_type(&self) -> TypeToken {
        TypeToken::unit()
    }

    fn created_type(&self) -> TypeToken {
        TypeToken::of::<T>()
    }
}
