//! Binding definitions and the type-erased values that flow through them.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::{Key, TypeToken};
use crate::traits::Binding;

/// Type-erased Arc for instances, arguments and context values
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased factory: argument in, instance out.
pub type AnyFactory = Arc<dyn Fn(AnyArc) -> DiResult<AnyArc> + Send + Sync>;

/// Context value attached to a resolution, together with its type.
///
/// Containers start with [`Context::none`]; bindings registered with
/// `in_context::<C>()` read their value back through
/// [`BindingContext::context_value`](crate::BindingContext::context_value).
#[derive(Clone)]
pub struct Context {
    type_token: TypeToken,
    value: AnyArc,
}

impl Context {
    /// The empty context (`Any` type, unit value).
    pub fn none() -> Self {
        Self { type_token: TypeToken::Any, value: Arc::new(()) }
    }

    pub fn of<C: Send + Sync + 'static>(value: C) -> Self {
        Self { type_token: TypeToken::of::<C>(), value: Arc::new(value) }
    }

    pub fn from_parts(type_token: TypeToken, value: AnyArc) -> Self {
        Self { type_token, value }
    }

    pub fn type_token(&self) -> &TypeToken {
        &self.type_token
    }

    pub fn value(&self) -> &AnyArc {
        &self.value
    }

    /// Downcasts the context value.
    pub fn downcast<C: Send + Sync + 'static>(&self) -> DiResult<Arc<C>> {
        self.value
            .clone()
            .downcast::<C>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<C>()))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").field("type", &self.type_token).finish_non_exhaustive()
    }
}

/// One registered binding at one override level.
pub struct BindingDefinition {
    pub(crate) key: Key,
    pub(crate) binding: Arc<dyn Binding>,
    /// 0 is the base binding, each explicit override adds one
    pub(crate) level: usize,
    /// Name of the module that registered it, if any
    pub(crate) module: Option<Arc<str>>,
}

impl BindingDefinition {
    pub(crate) fn new(key: Key, binding: Arc<dyn Binding>, level: usize, module: Option<Arc<str>>) -> Self {
        Self { key, binding, level, module }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn binding(&self) -> &Arc<dyn Binding> {
        &self.binding
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }
}

/// Downcasts a type-erased instance to `T`.
#[inline]
pub(crate) fn downcast_instance<T: Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}
