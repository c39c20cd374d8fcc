/// Unit tests for binding descriptors

use ferrous_bind::{BindingDescriptor, ContainerBuilder, ModuleFn};

struct Cache;

fn described() -> Vec<BindingDescriptor> {
    let mut builder = ContainerBuilder::new();
    builder.bind::<Cache>().singleton(|_| Ok(Cache)).unwrap();
    builder.bind::<String>().factory(|_, n: &u32| Ok(n.to_string())).unwrap();
    builder
        .import(ModuleFn::new("limits", |b| {
            b.bind::<u32>().tag("max").instance(10)?;
            Ok(())
        }))
        .unwrap();
    builder.bind::<u32>().tag("max").overrides(true).instance(20).unwrap();
    builder.build().unwrap().descriptors()
}

#[test]
fn test_descriptor_per_definition() {
    let descriptors = described();
    assert_eq!(descriptors.len(), 4);

    let keys: Vec<&str> = descriptors.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "bind<Cache>() with ? { ? }",
            "bind<String>() with ? { u32 -> ? }",
            "bind<u32>(tag = \"max\") with ? { ? }",
            "bind<u32>(tag = \"max\") with ? { ? }",
        ]
    );
}

#[test]
fn test_descriptor_binding_texts() {
    let descriptors = described();
    assert_eq!(descriptors[0].binding, "singleton { Cache }");
    assert_eq!(descriptors[0].type_name, "Cache");
    assert_eq!(descriptors[1].binding, "factory { u32 -> String }");
    assert_eq!(descriptors[2].binding, "instance ( u32 )");
}

#[test]
fn test_descriptor_override_levels() {
    let descriptors = described();
    let base = &descriptors[2];
    let top = &descriptors[3];

    assert_eq!((base.level, base.overridden), (0, true));
    assert_eq!((top.level, top.overridden), (1, false));
    assert_eq!(base.module.as_deref(), Some("limits"));
    assert_eq!(top.module, None);
}

#[test]
fn test_descriptor_tags() {
    let descriptors = described();
    assert!(!descriptors[0].is_tagged());
    assert!(descriptors[3].is_tagged());
}

#[test]
fn test_empty_container_has_no_descriptors() {
    let container = ContainerBuilder::new().build().unwrap();
    assert!(container.descriptors().is_empty());
}

#[cfg(feature = "diagnostics")]
#[test]
fn test_debug_string_lists_bindings() {
    let mut builder = ContainerBuilder::new();
    builder.bind::<Cache>().singleton(|_| Ok(Cache)).unwrap();
    let text = builder.build().unwrap().to_debug_string();

    assert!(text.starts_with("=== Container Debug ===\n"));
    assert!(text.contains("bind<Cache>() with ? { ? } [level 0]: singleton { Cache }"));
    assert!(text.contains("External sources: 0"));
}

#[cfg(feature = "serde")]
#[test]
fn test_descriptor_serializes_to_json() {
    let descriptors = described();
    let json = serde_json::to_value(&descriptors[3]).unwrap();

    assert_eq!(json["key"], "bind<u32>(tag = \"max\") with ? { ? }");
    assert_eq!(json["binding"], "instance ( u32 )");
    assert_eq!(json["level"], 1);
    assert_eq!(json["overridden"], false);
    assert!(json["module"].is_null());
}
