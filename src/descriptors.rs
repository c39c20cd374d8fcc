//! Binding descriptors for introspection and diagnostics.

use crate::key::Key;
use crate::tree::BindingTree;

/// Binding descriptor for introspection and diagnostics
///
/// One descriptor per registered definition, so an overridden key yields
/// one descriptor per override level. Descriptions use short type names;
/// the [`Key`] itself is kept for anything more precise.
///
/// # Examples
///
/// ```rust
/// use ferrous_bind::ContainerBuilder;
///
/// struct Database;
///
/// let mut builder = ContainerBuilder::new();
/// builder.bind::<Database>().singleton(|_| Ok(Database)).unwrap();
/// builder.bind::<u32>().tag("port").instance(5432).unwrap();
/// builder.bind::<u32>().tag("port").overrides(true).instance(5433).unwrap();
///
/// let container = builder.build().unwrap();
/// let descriptors = container.descriptors();
/// assert_eq!(descriptors.len(), 3);
///
/// let db = descriptors.iter().find(|d| d.type_name == "Database").unwrap();
/// assert_eq!(db.binding, "singleton { Database }");
/// assert!(!db.overridden);
///
/// let port_levels: Vec<usize> = descriptors
///     .iter()
///     .filter(|d| d.key.contains("port"))
///     .map(|d| d.level)
///     .collect();
/// assert_eq!(port_levels, vec![0, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BindingDescriptor {
    /// Key description, e.g. `bind<u32>(tag = "port") with ? { ? }`
    pub key: String,
    /// Short name of the bound type
    pub type_name: String,
    /// Binding description, e.g. `singleton { Database }`
    pub binding: String,
    /// Override level; 0 is the base binding
    pub level: usize,
    /// True when a higher override level exists
    pub overridden: bool,
    /// Module that registered the definition, if any
    pub module: Option<String>,
}

impl BindingDescriptor {
    /// True for bindings registered with a tag.
    pub fn is_tagged(&self) -> bool {
        self.key.contains("(tag = ")
    }
}

pub(crate) fn describe_tree(tree: &BindingTree) -> Vec<BindingDescriptor> {
    tree.bindings()
        .flat_map(|(key, defs)| {
            let count = defs.len();
            defs.iter().map(move |def| describe(key, def.binding.description(), def.level, count, def.module()))
        })
        .collect()
}

fn describe(key: &Key, binding: String, level: usize, count: usize, module: Option<&str>) -> BindingDescriptor {
    BindingDescriptor {
        key: key.description(),
        type_name: key.return_type.simple_name(),
        binding,
        level,
        overridden: level + 1 < count,
        module: module.map(str::to_string),
    }
}
