//! Human-readable failure text.
//!
//! Users and tests assert on these strings, so the layout here is part of
//! the public contract: changing a space changes the API.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::key::{Key, SearchSpecs};
use crate::registration::BindingDefinition;
use crate::tree::{BindingTree, Matches, OverrideLevel};

/// Draws the construction chain of a dependency loop.
///
/// `entries` reads from the first occurrence of the repeated key to its
/// second occurrence, both included.
pub(crate) fn render_cycle<S: AsRef<str>>(entries: &[S]) -> String {
    let mut out = String::from("Dependency recursion:\n");
    for (index, entry) in entries.iter().enumerate() {
        out.push_str("  ");
        match index {
            0 => out.push_str("   "),
            1 => out.push_str("  ╔╩>"),
            _ => {
                out.push_str("  ║");
                out.push_str(&"  ".repeat(index - 1));
                out.push_str("╚>");
            }
        }
        out.push_str(entry.as_ref());
        out.push('\n');
    }
    out.push_str("    ╚");
    out.push_str(&"══".repeat(entries.len().saturating_sub(1)));
    out.push('╝');
    out
}

/// One line per key, sorted by key description.
///
/// The line shows the highest level's binding; with `with_overrides` the
/// lower levels follow, highest first.
pub(crate) fn describe_bindings<'a, I>(bindings: I, with_overrides: bool, full: bool) -> String
where
    I: IntoIterator<Item = (&'a Key, &'a [Arc<BindingDefinition>])>,
{
    let mut lines: Vec<(String, &'a Key, &'a [Arc<BindingDefinition>])> = bindings
        .into_iter()
        .filter(|(_, defs)| !defs.is_empty())
        .map(|(key, defs)| (bind_display(key, full), key, defs))
        .collect();
    lines.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::new();
    for (bind, key, defs) in lines {
        let mut levels = defs.iter().rev();
        let Some(top) = levels.next() else { continue };

        let _ = write!(out, "        {} with ", bind);
        if !key.context_type.is_any() {
            let ctx = if full { key.context_type.full_name() } else { key.context_type.simple_name() };
            let _ = write!(out, "?<{}>().", ctx);
        }
        out.push_str(&binding_display(top, full));
        out.push('\n');

        if with_overrides {
            for def in levels {
                let _ = writeln!(out, "            overrides {}", binding_display(def, full));
            }
        }
    }
    out
}

/// Text of the error raised when nothing answers `key`.
pub(crate) fn not_found_message(tree: &BindingTree, key: &Key, level: OverrideLevel, full: bool) -> String {
    let with_overrides = level.is_explicit();
    let mut out = format!("No binding found for {}\n", key_display(key, full));

    let for_type = tree.find_specs(&SearchSpecs::for_type(key.return_type.clone()));
    if !for_type.is_empty() {
        out.push_str("Available bindings for this type:\n");
        out.push_str(&describe_bindings(for_type, with_overrides, full));
    }

    out.push_str("Registered in this Kodein container:\n");
    out.push_str(&describe_bindings(tree.bindings(), with_overrides, full));
    out
}

/// Text of the error raised when several bindings answer `key`.
pub(crate) fn ambiguous_message(
    tree: &BindingTree,
    key: &Key,
    candidates: &Matches,
    level: OverrideLevel,
    full: bool,
) -> String {
    let with_overrides = level.is_explicit();

    let mut potentials: Vec<&Key> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !potentials.contains(&&candidate.key) {
            potentials.push(&candidate.key);
        }
    }
    let matching = potentials.iter().filter_map(|k| tree.get(k).map(|defs| (*k, defs)));
    let others = tree.bindings().filter(|(k, _)| !potentials.contains(k));

    format!(
        "{} bindings found that match {}:\n{}Other bindings registered in Kodein:\n{}",
        potentials.len(),
        key_display(key, full),
        describe_bindings(matching, with_overrides, full),
        describe_bindings(others, with_overrides, full),
    )
}

fn key_display(key: &Key, full: bool) -> String {
    if full {
        key.full_description()
    } else {
        key.description()
    }
}

fn bind_display(key: &Key, full: bool) -> String {
    if full {
        key.bind_full_description()
    } else {
        key.bind_description()
    }
}

fn binding_display(def: &BindingDefinition, full: bool) -> String {
    if full {
        def.binding.full_description()
    } else {
        def.binding.description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{Instance, Provider};
    use crate::key::TypeToken;

    struct A;
    struct B;
    struct C;

    fn tree(defs: Vec<(Key, Vec<Arc<BindingDefinition>>)>) -> BindingTree {
        BindingTree::new(defs, Vec::new(), Vec::new())
    }

    fn provider_def(key: &Key, level: usize) -> Arc<BindingDefinition> {
        Arc::new(BindingDefinition::new(key.clone(), Arc::new(Provider::new(|_| Ok(A))), level, None))
    }

    #[test]
    fn three_step_cycle_diagram() {
        let text = render_cycle(&["bind<A>()", "bind<B>()", "bind<C>()", "bind<A>()"]);
        let expected = "Dependency recursion:\n     bind<A>()\n    ╔╩>bind<B>()\n    ║  ╚>bind<C>()\n    ║    ╚>bind<A>()\n    ╚══════╝";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_tree_lists_nothing() {
        let t = tree(Vec::new());
        assert_eq!(
            not_found_message(&t, &Key::of::<A>(), OverrideLevel::Highest, false),
            "No binding found for bind<A>() with ? { ? }\nRegistered in this Kodein container:\n"
        );
    }

    #[test]
    fn hints_bindings_of_the_same_type() {
        let tagged = Key::of::<A>().tagged("main");
        let other = Key::of::<u8>();
        let t = tree(vec![
            (tagged.clone(), vec![provider_def(&tagged, 0)]),
            (other.clone(), vec![Arc::new(BindingDefinition::new(other.clone(), Arc::new(Instance::new(1u8)), 0, None))]),
        ]);

        let text = not_found_message(&t, &Key::of::<A>(), OverrideLevel::Highest, false);
        assert_eq!(
            text,
            "No binding found for bind<A>() with ? { ? }\n\
             Available bindings for this type:\n\
             \x20       bind<A>(tag = \"main\") with provider { A }\n\
             Registered in this Kodein container:\n\
             \x20       bind<A>(tag = \"main\") with provider { A }\n\
             \x20       bind<u8>() with instance ( u8 )\n"
        );
    }

    #[test]
    fn explicit_level_lists_overrides() {
        let key = Key::of::<A>();
        let t = tree(vec![(key.clone(), vec![provider_def(&key, 0), provider_def(&key, 1)])]);

        let listing = describe_bindings(t.bindings(), true, false);
        assert_eq!(
            listing,
            "        bind<A>() with provider { A }\n            overrides provider { A }\n"
        );
        assert_eq!(describe_bindings(t.bindings(), false, false).lines().count(), 1);
    }

    #[test]
    fn contextual_bindings_show_their_context() {
        let key = Key::of::<A>().in_context::<C>();
        let t = tree(vec![(key.clone(), vec![provider_def(&key, 0)])]);
        assert_eq!(
            describe_bindings(t.bindings(), false, false),
            "        bind<A>() with ?<C>().provider { A }\n"
        );
    }

    #[test]
    fn ambiguity_separates_candidates() {
        let generic = Key::new(TypeToken::Any, TypeToken::Any, TypeToken::of::<A>(), None);
        let scoped = generic.clone().with_context_type(TypeToken::of::<C>());
        let unrelated = Key::of::<B>();
        let t = tree(vec![
            (generic.clone(), vec![provider_def(&generic, 0)]),
            (scoped.clone(), vec![provider_def(&scoped, 0)]),
            (unrelated.clone(), vec![provider_def(&unrelated, 0)]),
        ]);

        let request = Key::with_argument::<u8, A>().in_context::<C>();
        let candidates = t.find(&request, OverrideLevel::Highest, false);
        let text = ambiguous_message(&t, &request, &candidates, OverrideLevel::Highest, false);

        assert!(text.starts_with("2 bindings found that match bind<A>() with ?<C>().? { u8 -> ? }:\n"));
        let (matching, others) = text.split_once("Other bindings registered in Kodein:\n").unwrap();
        assert_eq!(matching.lines().count(), 3);
        assert_eq!(others, "        bind<B>() with provider { A }\n");
    }
}
