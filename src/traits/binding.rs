//! Capabilities the container consumes: binding strategies, external
//! sources and context translators.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::BindingContext;
use crate::error::DiResult;
use crate::key::{Key, TypeToken};
use crate::registration::{AnyFactory, Context};

/// A strategy that knows how to produce instances for a key.
///
/// The container calls [`factory`](Binding::factory) once per lookup and
/// hands it a [`BindingContext`] wired to a nested container, so anything
/// the produced factory resolves is checked for dependency loops against
/// the current construction chain.
///
/// # Examples
///
/// ```rust
/// use ferrous_bind::{AnyArc, AnyFactory, Binding, BindingContext, ContainerBuilder, DiResult, Key, Resolver, TypeToken};
/// use std::sync::Arc;
///
/// struct Answer;
///
/// impl Binding for Answer {
///     fn factory(&self, _ctx: BindingContext, _key: &Key) -> DiResult<AnyFactory> {
///         let factory: AnyFactory = Arc::new(|_arg: AnyArc| -> DiResult<AnyArc> { Ok(Arc::new(42u32)) });
///         Ok(factory)
///     }
///     fn factory_name(&self) -> &'static str { "answer" }
///     fn argument_type(&self) -> TypeToken { TypeToken::unit() }
///     fn created_type(&self) -> TypeToken { TypeToken::of::<u32>() }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder.add_binding(Key::of::<u32>(), Arc::new(Answer), None).unwrap();
/// let container = builder.build().unwrap();
/// assert_eq!(*container.get::<u32>().unwrap(), 42);
/// ```
pub trait Binding: Send + Sync {
    /// Produces a factory for `key`, capturing `ctx` for nested resolution.
    fn factory(&self, ctx: BindingContext, key: &Key) -> DiResult<AnyFactory>;

    /// Short strategy name used in diagnostics, e.g. `singleton`.
    fn factory_name(&self) -> &'static str;

    fn argument_type(&self) -> TypeToken;

    fn created_type(&self) -> TypeToken;

    fn description(&self) -> String {
        describe(self.factory_name(), &self.argument_type(), &self.created_type(), TypeToken::simple_name)
    }

    fn full_description(&self) -> String {
        describe(self.factory_name(), &self.argument_type(), &self.created_type(), TypeToken::full_name)
    }
}

fn describe(name: &str, arg: &TypeToken, created: &TypeToken, disp: fn(&TypeToken) -> String) -> String {
    if arg.is_unit() {
        format!("{} {{ {} }}", name, disp(created))
    } else {
        format!("{} {{ {} -> {} }}", name, disp(arg), disp(created))
    }
}

/// Fallback resolver consulted when the binding tree has no unambiguous match.
///
/// Returning `Ok(None)` means "not mine", and the next source is tried.
/// Closures with the matching signature implement this trait.
pub trait ExternalSource: Send + Sync {
    fn factory(&self, ctx: &BindingContext, key: &Key) -> DiResult<Option<AnyFactory>>;
}

impl<F> ExternalSource for F
where
    F: Fn(&BindingContext, &Key) -> DiResult<Option<AnyFactory>> + Send + Sync,
{
    fn factory(&self, ctx: &BindingContext, key: &Key) -> DiResult<Option<AnyFactory>> {
        self(ctx, key)
    }
}

/// Maps a context value of one type to the context a binding expects.
pub trait ContextTranslator: Send + Sync {
    /// Context type this translator accepts; `Any` accepts every context.
    fn context_type(&self) -> TypeToken;

    /// Context type of the bindings it leads to.
    fn scope_type(&self) -> TypeToken;

    /// `None` keeps the raw context.
    fn translate(&self, context: &Context) -> Option<Context>;
}

/// Translator built from a plain function `&C -> S`.
///
/// ```rust
/// use ferrous_bind::{Context, ContextTranslator, SimpleContextTranslator};
///
/// struct Request { user: String }
/// struct Session { user: String }
///
/// let translator = SimpleContextTranslator::new(|r: &Request| Session { user: r.user.clone() });
/// let translated = translator
///     .translate(&Context::of(Request { user: "ada".into() }))
///     .unwrap();
/// assert_eq!(translated.downcast::<Session>().unwrap().user, "ada");
/// ```
pub struct SimpleContextTranslator<C, S> {
    map: Arc<dyn Fn(&C) -> S + Send + Sync>,
    _marker: PhantomData<fn(&C) -> S>,
}

impl<C, S> SimpleContextTranslator<C, S>
where
    C: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    pub fn new<F>(map: F) -> Self
    where
        F: Fn(&C) -> S + Send + Sync + 'static,
    {
        Self { map: Arc::new(map), _marker: PhantomData }
    }
}

impl<C, S> ContextTranslator for SimpleContextTranslator<C, S>
where
    C: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    fn context_type(&self) -> TypeToken {
        TypeToken::of::<C>()
    }

    fn scope_type(&self) -> TypeToken {
        TypeToken::of::<S>()
    }

    fn translate(&self, context: &Context) -> Option<Context> {
        let value = context.value().downcast_ref::<C>()?;
        Some(Context::of((self.map)(value)))
    }
}
