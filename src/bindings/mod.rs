//! Built-in binding strategies.
//!
//! | Strategy | Argument | Instances |
//! |----------|----------|-----------|
//! | [`Singleton`] | none | one, created on first use |
//! | [`Provider`] | none | a new one per call |
//! | [`Factory`] | `A` | a new one per call |
//! | [`Multiton`] | `A` | one per distinct argument value |
//! | [`Instance`] | none | the value given at registration |
//!
//! Creators receive the [`BindingContext`](crate::BindingContext) of the
//! binding, and resolve their own dependencies through it.

mod factory;
mod multiton;
mod singleton;

pub use factory::{Factory, Instance, Provider};
pub use multiton::Multiton;
pub use singleton::Singleton;

use crate::container::BindingContext;
use crate::error::DiResult;

pub(crate) type Creator<T> = Box<dyn Fn(&BindingContext) -> DiResult<T> + Send + Sync>;
pub(crate) type ArgCreator<A, T> = Box<dyn Fn(&BindingContext, &A) -> DiResult<T> + Send + Sync>;
