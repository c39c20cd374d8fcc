/// Property-based tests for resolution invariants

use ferrous_bind::{AnyArc, ContainerBuilder, DiError, Key, OverrideLevel, Resolver, ResolverCore, Tag};
use proptest::prelude::*;
use std::sync::Arc;

fn ring(len: usize) -> ferrous_bind::Container {
    let mut builder = ContainerBuilder::new();
    for i in 0..len {
        let next = (i + 1) % len;
        builder
            .bind::<u64>()
            .tag(Tag::new(i))
            .provider(move |r| Ok(*r.get_tagged::<u64>(Tag::new(next))? + 1))
            .unwrap();
    }
    builder.build().unwrap()
}

proptest! {
    #[test]
    fn prop_ring_reports_every_member(len in 1usize..6, start in 0usize..6) {
        let start = start % len;
        let container = ring(len);

        let diagram = match container.get_tagged::<u64>(Tag::new(start)) {
            Err(DiError::DependencyLoop(diagram)) => diagram,
            other => panic!("expected a loop, got {:?}", other),
        };
        let lines: Vec<&str> = diagram.lines().collect();

        // Header, the ring members, the repeated entry and the closing line.
        prop_assert_eq!(lines.len(), len + 3);
        prop_assert_eq!(lines[0], "Dependency recursion:");
        let expected_first = format!("     bind<u64>(tag = {})", start);
        prop_assert_eq!(lines[1], expected_first.as_str());
        let expected_last = format!("    ╚{}╝", "══".repeat(len));
        prop_assert_eq!(lines[len + 2], expected_last.as_str());
        for (offset, line) in lines[1..len + 2].iter().enumerate() {
            let tag = (start + offset) % len;
            let expected_suffix = format!("bind<u64>(tag = {})", tag);
            prop_assert!(line.ends_with(&expected_suffix));
        }
    }

    #[test]
    fn prop_multiton_instances_follow_argument_equality(args in prop::collection::vec(0u8..8, 1..32)) {
        let mut builder = ContainerBuilder::new();
        builder.bind::<String>().multiton(|_, n: &u8| Ok(format!("#{}", n))).unwrap();
        let container = builder.build().unwrap();

        let make = container.factory_fn::<u8, String>().unwrap();
        let built: Vec<(u8, Arc<String>)> = args.iter().map(|&a| (a, make(a).unwrap())).collect();
        for (a, x) in &built {
            for (b, y) in &built {
                prop_assert_eq!(a == b, Arc::ptr_eq(x, y));
            }
        }
    }

    #[test]
    fn prop_exact_levels_select_their_override(depth in 1usize..8) {
        let mut builder = ContainerBuilder::new();
        builder.bind::<usize>().instance(0).unwrap();
        for level in 1..depth {
            builder.bind::<usize>().overrides(true).instance(level).unwrap();
        }
        let container = builder.build().unwrap();

        prop_assert_eq!(*container.get::<usize>().unwrap(), depth - 1);
        for level in 0..depth {
            let factory = container.factory_any(&Key::of::<usize>(), OverrideLevel::Exact(level)).unwrap();
            let value = factory(Arc::new(()) as AnyArc).unwrap().downcast::<usize>().unwrap();
            prop_assert_eq!(*value, level);
        }
        let beyond = container.factory_any(&Key::of::<usize>(), OverrideLevel::Exact(depth));
        prop_assert!(beyond.err().map_or(false, |e| e.is_not_found()));
    }

    #[test]
    fn prop_get_all_returns_one_value_per_definition(tags in prop::collection::hash_set(0u16..64, 0..12)) {
        let mut builder = ContainerBuilder::new();
        for tag in &tags {
            builder.bind::<u16>().tag(Tag::new(*tag)).instance(*tag).unwrap();
        }
        let container = builder.build().unwrap();

        let mut values: Vec<u16> = container.get_all::<u16>().unwrap().iter().map(|v| **v).collect();
        values.sort_unstable();
        let mut expected: Vec<u16> = tags.into_iter().collect();
        expected.sort_unstable();
        prop_assert_eq!(values, expected);
    }
}
