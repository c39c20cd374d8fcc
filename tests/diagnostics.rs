use ferrous_bind::{ContainerBuilder, DiError, Key, Provider, Resolver, TypeToken};
use std::sync::Arc;

struct Mailer;
struct Request;

fn message<T: Send + Sync + 'static>(container: &ferrous_bind::Container) -> String {
    match container.get::<T>() {
        Err(DiError::NotFound { message, .. }) => message,
        Err(other) => panic!("expected NotFound, got: {}", other),
        Ok(_) => panic!("expected NotFound, got an instance"),
    }
}

#[test]
fn nothing_registered() {
    let container = ContainerBuilder::new().build().unwrap();
    assert_eq!(
        message::<Mailer>(&container),
        "No binding found for bind<Mailer>() with ? { ? }\nRegistered in this Kodein container:\n"
    );
}

#[test]
fn registered_bindings_are_sorted() {
    let mut builder = ContainerBuilder::new();
    builder.bind::<u32>().instance(1).unwrap();
    builder.bind::<String>().provider(|_| Ok(String::new())).unwrap();
    builder.bind::<Mailer>().tag("smtp").singleton(|_| Ok(Mailer)).unwrap();
    builder.bind::<Mailer>().factory(|_, _host: &String| Ok(Mailer)).unwrap();
    let container = builder.build().unwrap();

    assert_eq!(
        message::<u64>(&container),
        "No binding found for bind<u64>() with ? { ? }\n\
         Registered in this Kodein container:\n\
         \x20       bind<Mailer>() with factory { String -> Mailer }\n\
         \x20       bind<Mailer>(tag = \"smtp\") with singleton { Mailer }\n\
         \x20       bind<String>() with provider { String }\n\
         \x20       bind<u32>() with instance ( u32 )\n"
    );
}

#[test]
fn same_type_bindings_are_suggested() {
    let mut builder = ContainerBuilder::new();
    builder.bind::<Mailer>().in_context::<Request>().provider(|_| Ok(Mailer)).unwrap();
    builder.bind::<u8>().instance(1).unwrap();
    let container = builder.build().unwrap();

    assert_eq!(
        message::<Mailer>(&container),
        "No binding found for bind<Mailer>() with ? { ? }\n\
         Available bindings for this type:\n\
         \x20       bind<Mailer>() with ?<Request>().provider { Mailer }\n\
         Registered in this Kodein container:\n\
         \x20       bind<Mailer>() with ?<Request>().provider { Mailer }\n\
         \x20       bind<u8>() with instance ( u8 )\n"
    );
}

#[test]
fn full_descriptions_name_type_paths() {
    let mut builder = ContainerBuilder::new();
    builder.full_description_on_error(true);
    builder.bind::<u8>().instance(1).unwrap();
    let container = builder.build().unwrap();

    let mailer = std::any::type_name::<Mailer>();
    assert_eq!(
        message::<Mailer>(&container),
        format!(
            "No binding found for bind<{mailer}>() with ? {{ ? }}\n\
             Registered in this Kodein container:\n\
             \x20       bind<u8>() with instance ( u8 )\n"
        )
    );
}

#[test]
fn ambiguous_bindings_list_the_candidates() {
    let mut builder = ContainerBuilder::new();
    // Both accept any argument; lines with equal keys keep registration order.
    let generic = Key::new(TypeToken::Any, TypeToken::Any, TypeToken::of::<Mailer>(), None);
    let contextual = generic.clone().with_context_type(TypeToken::of::<Request>());
    builder.add_binding(generic, Arc::new(Provider::new(|_| Ok(Mailer))), None).unwrap();
    builder.add_binding(contextual, Arc::new(Provider::new(|_| Ok(Mailer))), None).unwrap();
    builder.bind::<u8>().instance(1).unwrap();
    let container = builder.build().unwrap();

    let err = container
        .on(Request)
        .get_with::<String, Mailer>("smtp.local".to_string())
        .err()
        .unwrap();
    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        "2 bindings found that match bind<Mailer>() with ?<Request>().? { String -> ? }:\n\
         \x20       bind<Mailer>() with provider { Mailer }\n\
         \x20       bind<Mailer>() with ?<Request>().provider { Mailer }\n\
         Other bindings registered in Kodein:\n\
         \x20       bind<u8>() with instance ( u8 )\n"
    );
}

#[test]
fn the_first_failing_dependency_is_reported() {
    struct Service;

    let mut builder = ContainerBuilder::new();
    builder
        .bind::<Service>()
        .provider(|r| {
            r.get::<Mailer>()?;
            Ok(Service)
        })
        .unwrap();
    let container = builder.build().unwrap();

    let text = message::<Service>(&container);
    assert!(text.starts_with("No binding found for bind<Mailer>() with ? { ? }\n"));
    assert!(text.contains("bind<Service>() with provider { Service }"));
}
