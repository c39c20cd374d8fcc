use ferrous_bind::{
    AnyArc, AnyFactory, BindingContext, ContainerBuilder, DiError, DiResult, Key, Resolver,
    SimpleContextTranslator, TypeToken,
};
use std::sync::Arc;

#[derive(Debug, PartialEq)]
struct Setting(String);

/// Answers any `Setting` request from a fixed table keyed by tag.
fn settings_source(ctx: &BindingContext, key: &Key) -> DiResult<Option<AnyFactory>> {
    if key.return_type != TypeToken::of::<Setting>() {
        return Ok(None);
    }
    let Some(name) = key.tag.as_ref().and_then(|t| t.downcast_ref::<String>()).cloned() else {
        return Ok(None);
    };
    assert_eq!(ctx.key(), key);
    let factory: AnyFactory =
        Arc::new(move |_: AnyArc| -> DiResult<AnyArc> { Ok(Arc::new(Setting(format!("value of {}", name)))) });
    Ok(Some(factory))
}

#[test]
fn source_answers_unbound_keys() {
    let mut builder = ContainerBuilder::new();
    builder.add_external_source(settings_source);
    let container = builder.build().unwrap();

    let setting = container.get_tagged::<Setting>("timeout").unwrap();
    assert_eq!(*setting, Setting("value of timeout".into()));
}

#[test]
fn bindings_take_precedence_over_sources() {
    let mut builder = ContainerBuilder::new();
    builder.bind::<Setting>().tag("timeout").instance(Setting("bound".into())).unwrap();
    builder.add_external_source(settings_source);
    let container = builder.build().unwrap();

    assert_eq!(container.get_tagged::<Setting>("timeout").unwrap().0, "bound");
    assert_eq!(container.get_tagged::<Setting>("retries").unwrap().0, "value of retries");
}

#[test]
fn sources_that_decline_leave_not_found() {
    let mut builder = ContainerBuilder::new();
    builder.add_external_source(settings_source);
    let container = builder.build().unwrap();

    // Untagged requests are declined.
    assert!(container.get::<Setting>().unwrap_err().is_not_found());
    assert!(container.get_or_none::<Setting>().unwrap().is_none());
}

#[test]
fn sources_are_consulted_in_order() {
    let mut builder = ContainerBuilder::new();
    builder.add_external_source(|_: &BindingContext, _: &Key| -> DiResult<Option<AnyFactory>> { Ok(None) });
    builder.add_external_source(|_: &BindingContext, key: &Key| -> DiResult<Option<AnyFactory>> {
        if key.return_type != TypeToken::of::<u32>() {
            return Ok(None);
        }
        let factory: AnyFactory = Arc::new(|_: AnyArc| -> DiResult<AnyArc> { Ok(Arc::new(2u32)) });
        Ok(Some(factory))
    });
    builder.add_external_source(|_: &BindingContext, _: &Key| -> DiResult<Option<AnyFactory>> {
        panic!("an earlier source already answered")
    });
    let container = builder.build().unwrap();

    assert_eq!(*container.get::<u32>().unwrap(), 2);
}

#[test]
fn source_errors_propagate() {
    let mut builder = ContainerBuilder::new();
    builder.add_external_source(|_: &BindingContext, _: &Key| -> DiResult<Option<AnyFactory>> {
        Err(DiError::TypeMismatch("config::Value"))
    });
    let container = builder.build().unwrap();

    assert!(matches!(container.get::<u8>(), Err(DiError::TypeMismatch("config::Value"))));
}

#[test]
fn source_resolving_its_own_key_is_a_loop() {
    let mut builder = ContainerBuilder::new();
    builder.add_external_source(|ctx: &BindingContext, key: &Key| -> DiResult<Option<AnyFactory>> {
        if key.return_type != TypeToken::of::<u64>() {
            return Ok(None);
        }
        let ctx = ctx.clone();
        let factory: AnyFactory = Arc::new(move |_: AnyArc| -> DiResult<AnyArc> {
            let inner = ctx.get::<u64>()?;
            Ok(Arc::new(*inner + 1))
        });
        Ok(Some(factory))
    });
    let container = builder.build().unwrap();

    assert!(matches!(container.get::<u64>(), Err(DiError::DependencyLoop(_))));
}

#[test]
fn translator_maps_request_context_to_session() {
    struct Request {
        session_id: u32,
    }
    struct Session {
        id: u32,
    }

    let mut builder = ContainerBuilder::new();
    builder.add_translator(SimpleContextTranslator::new(|r: &Request| Session { id: r.session_id }));
    builder
        .bind::<String>()
        .in_context::<Session>()
        .provider(|ctx| Ok(format!("session #{}", ctx.context_value::<Session>()?.id)))
        .unwrap();
    let container = builder.build().unwrap();

    let text = container.on(Request { session_id: 9 }).get::<String>().unwrap();
    assert_eq!(*text, "session #9");
    assert!(container.get::<String>().unwrap_err().is_not_found());
}

#[test]
fn sources_settle_ambiguous_matches() {
    use ferrous_bind::{Provider, Tag};

    struct Request;

    let mut builder = ContainerBuilder::new();
    let generic = Key::new(TypeToken::Any, TypeToken::Any, TypeToken::of::<Setting>(), Some(Tag::from("timeout")));
    let contextual = generic.clone().with_context_type(TypeToken::of::<Request>());
    for key in [generic, contextual] {
        builder
            .add_binding(key, Arc::new(Provider::new(|_| Ok(Setting("bound".into())))), None)
            .unwrap();
    }
    builder.add_external_source(settings_source);
    let container = builder.build().unwrap();

    let setting = container.on(Request).get_tagged::<Setting>("timeout").unwrap();
    assert_eq!(setting.0, "value of timeout");
}
