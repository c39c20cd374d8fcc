//! Named, reusable groups of bindings.

use tracing::debug;

use crate::{ContainerBuilder, DiResult};

/// A named group of registrations that can be imported into a builder.
///
/// Each module can be imported once per builder. Unless it allows
/// overriding, a module may only add new keys: any override it declares is
/// rejected, and so is any binding that would replace an existing one.
///
/// # Example
///
/// ```rust
/// use ferrous_bind::{ContainerBuilder, DiResult, Module, Resolver};
/// use std::sync::Arc;
///
/// struct UserConfig { admin: String }
/// struct UserService { config: Arc<UserConfig> }
///
/// struct UserModule;
///
/// impl Module for UserModule {
///     fn name(&self) -> &str { "users" }
///
///     fn configure(self, builder: &mut ContainerBuilder) -> DiResult<()> {
///         builder.bind::<UserConfig>().instance(UserConfig { admin: "root".into() })?;
///         builder.bind::<UserService>().singleton(|r| Ok(UserService { config: r.get()? }))?;
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let mut builder = ContainerBuilder::new();
/// builder.import(UserModule)?;
/// let container = builder.build()?;
/// assert_eq!(container.get::<UserService>()?.config.admin, "root");
/// # Ok(())
/// # }
/// ```
pub trait Module {
    /// Identifies the module; importing a second module with the same name fails.
    fn name(&self) -> &str;

    /// Whether the module may override bindings. Defaults to `false`.
    fn allow_override(&self) -> bool {
        false
    }

    /// Register this module's bindings with the builder.
    fn configure(self, builder: &mut ContainerBuilder) -> DiResult<()>;
}

/// A [`Module`] built from a closure.
///
/// ```rust
/// use ferrous_bind::{ContainerBuilder, DiResult, ModuleFn};
///
/// # fn main() -> DiResult<()> {
/// let ports = ModuleFn::new("ports", |b| {
///     b.bind::<u16>().tag("http").instance(80)?;
///     Ok(())
/// });
///
/// let mut builder = ContainerBuilder::new();
/// builder.import(ports)?;
/// # Ok(())
/// # }
/// ```
pub struct ModuleFn<F> {
    name: String,
    allow_override: bool,
    configure: F,
}

impl<F> ModuleFn<F>
where
    F: FnOnce(&mut ContainerBuilder) -> DiResult<()>,
{
    pub fn new(name: impl Into<String>, configure: F) -> Self {
        Self { name: name.into(), allow_override: false, configure }
    }

    pub fn allowing_override(mut self) -> Self {
        self.allow_override = true;
        self
    }
}

impl<F> Module for ModuleFn<F>
where
    F: FnOnce(&mut ContainerBuilder) -> DiResult<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn allow_override(&self) -> bool {
        self.allow_override
    }

    fn configure(self, builder: &mut ContainerBuilder) -> DiResult<()> {
        (self.configure)(builder)
    }
}

impl ContainerBuilder {
    /// Imports `module`, failing if a module of the same name already was.
    pub fn import<M: Module>(&mut self, module: M) -> DiResult<&mut Self> {
        let previous = self.enter_module(module.name(), module.allow_override())?;
        debug!(module = module.name(), "importing module");
        let result = module.configure(self);
        self.leave_module(previous);
        result.map(|()| self)
    }

    /// Imports `module` unless a module of the same name already was.
    pub fn import_once<M: Module>(&mut self, module: M) -> DiResult<&mut Self> {
        if self.has_imported(module.name()) {
            return Ok(self);
        }
        self.import(module)
    }
}
