use std::marker::PhantomData;
use std::sync::Arc;

use super::{ArgCreator, Creator};
use crate::container::BindingContext;
use crate::error::{DiError, DiResult};
use crate::key::{Key, TypeToken};
use crate::registration::{AnyArc, AnyFactory};
use crate::traits::Binding;

/// Builds a new `T` from an `A` on every call.
pub struct Factory<A, T> {
    creator: Arc<ArgCreator<A, T>>,
    _marker: PhantomData<fn(A) -> T>,
}

impl<A, T> Factory<A, T>
where
    A: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new<F>(creator: F) -> Self
    where
        F: Fn(&BindingContext, &A) -> DiResult<T> + Send + Sync + 'static,
    {
        Self { creator: Arc::new(Box::new(creator)), _marker: PhantomData }
    }
}

impl<A, T> Binding for Factory<A, T>
where
    A: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn factory(&self, ctx: BindingContext, _key: &Key) -> DiResult<AnyFactory> {
        let creator = self.creator.clone();
        Ok(Arc::new(move |arg: AnyArc| -> DiResult<AnyArc> {
            let arg = downcast_argument::<A>(arg)?;
            Ok(Arc::new(creator(&ctx, &*arg)?))
        }))
    }

    fn factory_name(&self) -> &'static str {
        "factory"
    }

    fn argument_type(&self) -> TypeToken {
        TypeToken::of::<A>()
    }

    fn created_type(&self) -> TypeToken {
        TypeToken::of::<T>()
    }
}

/// Builds a new `T` on every call.
pub struct Provider<T> {
    creator: Arc<Creator<T>>,
}

impl<T: Send + Sync + 'static> Provider<T> {
    pub fn new<F>(creator: F) -> Self
    where
        F: Fn(&BindingContext) -> DiResult<T> + Send + Sync + 'static,
    {
        Self { creator: Arc::new(Box::new(creator)) }
    }
}

impl<T: Send + Sync + 'static> Binding for Provider<T> {
    fn factory(&self, ctx: BindingContext, _key: &Key) -> DiResult<AnyFactory> {
        let creator = self.creator.clone();
        Ok(Arc::new(move |_arg: AnyArc| -> DiResult<AnyArc> { Ok(Arc::new(creator(&ctx)?)) }))
    }

    fn factory_name(&self) -> &'static str {
        "provider"
    }

    fn argument_type(&self) -> TypeToken {
        TypeToken::unit()
    }

    fn created_type(&self) -> TypeToken {
        TypeToken::of::<T>()
    }
}

/// Hands out a value built before the container existed.
pub struct Instance<T> {
    value: Arc<T>,
}

impl<T: Send + Sync + 'static> Instance<T> {
    pub fn new(value: T) -> Self {
        Self { value: Arc::new(value) }
    }

    pub fn from_arc(value: Arc<T>) -> Self {
        Self { value }
    }
}

impl<T: Send + Sync + 'static> Binding for Instance<T> {
    fn factory(&self, _ctx: BindingContext, _key: &Key) -> DiResult<AnyFactory> {
        let value = self.value.clone();
        Ok(Arc::new(move |_arg: AnyArc| -> DiResult<AnyArc> { Ok(value.clone()) }))
    }

    fn factory_name(&self) -> &'static str {
        "instance"
    }

    fn argument_type(&self) -> TypeToken {
        TypeToken::unit()
    }

    fn created_type(&self) -> TypeToken {
        TypeToken::of::<T>()
    }

    fn description(&self) -> String {
        format!("instance ( {} )", TypeToken::of::<T>().simple_name())
    }

    fn full_description(&self) -> String {
        format!("instance ( {} )", TypeToken::of::<T>().full_name())
    }
}

pub(super) fn downcast_argument<A: Send + Sync + 'static>(arg: AnyArc) -> DiResult<Arc<A>> {
    arg.downcast::<A>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<A>()))
}
