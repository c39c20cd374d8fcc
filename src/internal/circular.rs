//! Dependency loop detection over the chain of keys under construction.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::warn;

use crate::diagnostics::render_cycle;
use crate::error::{DiError, DiResult};
use crate::key::Key;

/// One key being constructed on the current call path.
///
/// Every nested container holds the node of the binding it was created for,
/// pointing at the node of the binding that requested it. Walking `parent`
/// links therefore replays the construction call stack, and a node only
/// lives as long as the containers and factories that captured it.
pub(crate) struct Node {
    key: Key,
    level: usize,
    overridden: bool,
    parent: Option<Arc<Node>>,
    full_description: bool,
}

impl Node {
    pub(crate) fn new(
        key: Key,
        level: usize,
        overridden: bool,
        parent: Option<Arc<Node>>,
        full_description: bool,
    ) -> Self {
        Self { key, level, overridden, parent, full_description }
    }

    fn is(&self, key: &Key, level: usize) -> bool {
        self.level == level && self.key == *key
    }

    fn ancestors(&self) -> impl Iterator<Item = &Node> {
        std::iter::successors(Some(self), |node| node.parent.as_deref())
    }

    /// Fails with [`DiError::DependencyLoop`] if `key` at `level` is already
    /// on this chain (this node included).
    pub(crate) fn check(&self, key: &Key, level: usize, overridden: bool) -> DiResult<()> {
        if !self.ancestors().any(|node| node.is(key, level)) {
            return Ok(());
        }

        // From this node up to the repeated key, then reversed to read root first.
        let mut chain: SmallVec<[String; 8]> = SmallVec::new();
        for node in self.ancestors() {
            chain.push(node.display(&node.key, node.overridden));
            if node.is(key, level) {
                break;
            }
        }
        chain.reverse();
        chain.push(self.display(key, overridden));

        let diagram = render_cycle(&chain);
        warn!(key = %key.full_description(), depth = chain.len() - 1, "dependency loop detected");
        Err(DiError::DependencyLoop(diagram))
    }

    fn display(&self, key: &Key, overridden: bool) -> String {
        let desc = if self.full_description {
            key.bind_full_description()
        } else {
            key.bind_description()
        };
        if overridden {
            format!("overridden {}", desc)
        } else {
            desc
        }
    }
}
