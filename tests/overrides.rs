use ferrous_bind::{AnyArc, ContainerBuilder, DiError, Key, OverrideLevel, Resolver, ResolverCore};
use std::sync::Arc;

fn layered() -> ferrous_bind::Container {
    let mut builder = ContainerBuilder::new();
    builder.bind::<String>().instance("v0".to_string()).unwrap();
    builder.bind::<String>().overrides(true).instance("v1".to_string()).unwrap();
    builder.bind::<String>().overrides(true).instance("v2".to_string()).unwrap();
    builder.build().unwrap()
}

fn at_level(container: &ferrous_bind::Container, level: OverrideLevel) -> Result<String, DiError> {
    let factory = container.factory_any(&Key::of::<String>(), level)?;
    let value = factory(Arc::new(()) as AnyArc)?;
    Ok(value.downcast::<String>().map_err(|_| DiError::TypeMismatch("String"))?.to_string())
}

#[test]
fn highest_level_wins_by_default() {
    let container = layered();
    assert_eq!(*container.get::<String>().unwrap(), "v2");
    assert_eq!(at_level(&container, OverrideLevel::Highest).unwrap(), "v2");
}

#[test]
fn exact_levels_address_each_definition() {
    let container = layered();
    assert_eq!(at_level(&container, OverrideLevel::Exact(0)).unwrap(), "v0");
    assert_eq!(at_level(&container, OverrideLevel::Exact(1)).unwrap(), "v1");
    assert_eq!(at_level(&container, OverrideLevel::Exact(2)).unwrap(), "v2");
}

#[test]
fn missing_exact_level_does_not_fall_back() {
    let container = layered();
    let err = at_level(&container, OverrideLevel::Exact(3)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "No binding found for bind<String>() with ? { ? }\n\
         Available bindings for this type:\n\
         \x20       bind<String>() with instance ( String )\n\
         \x20           overrides instance ( String )\n\
         \x20           overrides instance ( String )\n\
         Registered in this Kodein container:\n\
         \x20       bind<String>() with instance ( String )\n\
         \x20           overrides instance ( String )\n\
         \x20           overrides instance ( String )\n"
    );
}

#[test]
fn base_binding_has_nothing_to_override() {
    let mut builder = ContainerBuilder::new();
    builder
        .bind::<String>()
        .provider(|ctx| {
            assert!(ctx.overridden_factory_or_none()?.is_none());
            match ctx.overridden_factory() {
                Err(DiError::NotFound { .. }) => Ok("base".to_string()),
                Err(e) => Err(e),
                Ok(_) => panic!("a base binding has no overridden factory"),
            }
        })
        .unwrap();
    let container = builder.build().unwrap();

    assert_eq!(*container.get::<String>().unwrap(), "base");
}

#[test]
fn override_can_optionally_decorate() {
    let mut builder = ContainerBuilder::new();
    builder.bind::<u32>().instance(20).unwrap();
    builder
        .bind::<u32>()
        .overrides(true)
        .provider(|ctx| {
            let below = match ctx.overridden_factory_or_none()? {
                Some(factory) => *factory(Arc::new(()) as AnyArc)?
                    .downcast::<u32>()
                    .map_err(|_| DiError::TypeMismatch("u32"))?,
                None => 0,
            };
            Ok(below + 1)
        })
        .unwrap();
    let container = builder.build().unwrap();

    assert_eq!(*container.get::<u32>().unwrap(), 21);
}

#[test]
fn override_level_is_visible_to_the_binding() {
    let mut builder = ContainerBuilder::new();
    builder.bind::<usize>().provider(|ctx| Ok(ctx.override_level())).unwrap();
    builder.bind::<usize>().overrides(true).provider(|ctx| Ok(ctx.override_level() * 10)).unwrap();
    let container = builder.build().unwrap();

    assert_eq!(*container.get::<usize>().unwrap(), 10);
}

#[test]
fn overriding_a_singleton_keeps_the_original_alive_for_decorators() {
    struct Pool(u8);

    let mut builder = ContainerBuilder::new();
    builder.bind::<Pool>().singleton(|_| Ok(Pool(4))).unwrap();
    builder
        .bind::<Pool>()
        .overrides(true)
        .singleton(|ctx| Ok(Pool(ctx.overridden::<Pool>()?.0 * 2)))
        .unwrap();
    let container = builder.build().unwrap();

    let a = container.get::<Pool>().unwrap();
    let b = container.get::<Pool>().unwrap();
    assert_eq!(a.0, 8);
    assert!(Arc::ptr_eq(&a, &b));
}
