//! Immutable index of binding definitions.
//!
//! The tree is built once by [`ContainerBuilder::build`](crate::ContainerBuilder::build)
//! and only read afterwards, so any number of threads can search it at the
//! same time without locking.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::trace;

use crate::key::{Key, SearchSpecs, TypeToken};
use crate::registration::BindingDefinition;
use crate::traits::{ContextTranslator, ExternalSource};

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = ahash::AHashMap<K, V>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

/// Which override level of a binding a request targets.
///
/// Level 0 is the base binding; every explicit override adds one. The
/// `Highest` policy is resolved to a concrete level only at the tree
/// lookup boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverrideLevel {
    /// The most recent registration for the key (the default)
    #[default]
    Highest,
    /// Exactly this level, never a lower one
    Exact(usize),
}

impl OverrideLevel {
    fn pick<'a>(&self, defs: &'a [Arc<BindingDefinition>]) -> Option<&'a Arc<BindingDefinition>> {
        match self {
            OverrideLevel::Highest => defs.last(),
            OverrideLevel::Exact(level) => defs.get(*level),
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, OverrideLevel::Exact(_))
    }
}

/// A definition found for a requested key.
#[derive(Clone)]
pub struct Match {
    /// Key the definition is registered under (may differ from the request)
    pub key: Key,
    pub definition: Arc<BindingDefinition>,
    pub translator: Option<Arc<dyn ContextTranslator>>,
    /// True when a higher override level exists for `key`
    pub overridden: bool,
}

pub type Matches = SmallVec<[Match; 1]>;

/// Outcome of a single-binding lookup.
pub(crate) enum Lookup {
    Found(Match),
    NotFound,
    Ambiguous(Matches),
}

/// Registered bindings, external sources and context translators.
pub struct BindingTree {
    /// Insertion-ordered; each list is indexed by override level
    entries: Vec<(Key, Vec<Arc<BindingDefinition>>)>,
    index: Map<Key, usize>,
    external_sources: Vec<Arc<dyn ExternalSource>>,
    translators: Vec<Arc<dyn ContextTranslator>>,
}

impl BindingTree {
    pub(crate) fn new(
        entries: Vec<(Key, Vec<Arc<BindingDefinition>>)>,
        external_sources: Vec<Arc<dyn ExternalSource>>,
        translators: Vec<Arc<dyn ContextTranslator>>,
    ) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (key.clone(), i))
            .collect();
        Self { entries, index, external_sources, translators }
    }

    /// Definitions registered for exactly `key`, lowest override level first.
    pub fn get(&self, key: &Key) -> Option<&[Arc<BindingDefinition>]> {
        self.index.get(key).map(|&i| self.entries[i].1.as_slice())
    }

    /// Every registered key with its definitions, in registration order.
    pub fn bindings(&self) -> impl Iterator<Item = (&Key, &[Arc<BindingDefinition>])> {
        self.entries.iter().map(|(k, defs)| (k, defs.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn external_sources(&self) -> &[Arc<dyn ExternalSource>] {
        &self.external_sources
    }

    pub fn translators(&self) -> &[Arc<dyn ContextTranslator>] {
        &self.translators
    }

    /// Wildcard search used for diagnostics.
    pub fn find_specs(&self, specs: &SearchSpecs) -> Vec<(&Key, &[Arc<BindingDefinition>])> {
        self.bindings().filter(|(key, _)| specs.matches(key)).collect()
    }

    /// Finds the definitions answering `key` at `level`.
    ///
    /// Without `all`, the first of these that hits wins: the exact key; the
    /// key with an `Any` context; the key translated through a matching
    /// context translator; and finally a wildcard search, where every
    /// matching key yields its own entry so ambiguity reaches the caller.
    /// An `Exact` level is never satisfied by another level.
    ///
    /// With `all`, every definition of every wildcard match is returned
    /// ordered by override level, registration order breaking ties. A
    /// request without a tag then matches bindings with any tag.
    pub fn find(&self, key: &Key, level: OverrideLevel, all: bool) -> Matches {
        if all {
            return self.find_all(key, level);
        }

        if let Some(found) = self.find_direct(key, level) {
            return found;
        }

        let mut matches = Matches::new();
        for (bound, defs) in &self.entries {
            let Some(translator) = self.accepting(bound, key, false) else {
                continue;
            };
            if let Some(def) = level.pick(defs) {
                matches.push(Self::to_match(bound, def, defs.len(), translator));
            }
        }
        trace!(key = %key.description(), found = matches.len(), "wildcard binding search");
        matches
    }

    pub(crate) fn lookup(&self, key: &Key, level: OverrideLevel) -> Lookup {
        let mut matches = self.find(key, level, false);
        match matches.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(matches.remove(0)),
            _ => Lookup::Ambiguous(matches),
        }
    }

    fn find_direct(&self, key: &Key, level: OverrideLevel) -> Option<Matches> {
        let single = |bound: &Key, defs: &[Arc<BindingDefinition>], translator| {
            level
                .pick(defs)
                .map(|def| Self::to_match(bound, def, defs.len(), translator))
                .into_iter()
                .collect::<Matches>()
        };

        if let Some(defs) = self.get(key) {
            return Some(single(key, defs, None));
        }

        if !key.context_type.is_any() {
            let any_context = key.clone().with_context_type(TypeToken::Any);
            if let Some(defs) = self.get(&any_context) {
                return Some(single(&any_context, defs, None));
            }
        }

        let exact = self.translators.iter().filter(|t| t.context_type() == key.context_type);
        let generic = self
            .translators
            .iter()
            .filter(|t| t.context_type().is_any() && !key.context_type.is_any());
        for translator in exact.chain(generic) {
            let translated = key.clone().with_context_type(translator.scope_type());
            if let Some(defs) = self.get(&translated) {
                return Some(single(&translated, defs, Some(translator.clone())));
            }
        }

        None
    }

    fn find_all(&self, key: &Key, level: OverrideLevel) -> Matches {
        let mut found: Vec<(usize, usize, Match)> = Vec::new();
        for (position, (bound, defs)) in self.entries.iter().enumerate() {
            let Some(translator) = self.accepting(bound, key, true) else {
                continue;
            };
            for def in defs {
                if matches!(level, OverrideLevel::Exact(l) if l != def.level) {
                    continue;
                }
                found.push((def.level, position, Self::to_match(bound, def, defs.len(), translator.clone())));
            }
        }
        found.sort_by_key(|(level, position, _)| (*level, *position));
        found.into_iter().map(|(_, _, m)| m).collect()
    }

    /// Whether a binding registered under `bound` answers `requested`.
    ///
    /// The outer `Option` is the verdict, the inner one the translator
    /// the match goes through.
    fn accepting(
        &self,
        bound: &Key,
        requested: &Key,
        any_tag: bool,
    ) -> Option<Option<Arc<dyn ContextTranslator>>> {
        if bound.return_type != requested.return_type
            || !bound.argument_type.accepts(&requested.argument_type)
        {
            return None;
        }
        if !(bound.tag == requested.tag || (any_tag && requested.tag.is_none())) {
            return None;
        }
        if bound.context_type.accepts(&requested.context_type) {
            return Some(None);
        }
        self.translators
            .iter()
            .find(|t| t.scope_type() == bound.context_type && t.context_type().accepts(&requested.context_type))
            .map(|t| Some(t.clone()))
    }

    fn to_match(
        bound: &Key,
        def: &Arc<BindingDefinition>,
        count: usize,
        translator: Option<Arc<dyn ContextTranslator>>,
    ) -> Match {
        Match {
            key: bound.clone(),
            definition: def.clone(),
            translator,
            overridden: def.level + 1 < count,
        }
    }
}
