//! One-shot guard for deferred `on_ready` callbacks.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::ReentrantMutex;
use tracing::debug;

use crate::container::Container;
use crate::error::DiResult;

pub(crate) type InitCallback = Box<dyn FnOnce(&Container) -> DiResult<()> + Send>;

/// Callbacks that run once, on the first resolution through the container.
///
/// The lock is re-entrant: callbacks resolve through the same container, so
/// the thread running them passes straight through while other threads wait
/// for the whole batch to finish.
pub(crate) struct InitCallbacks {
    pending: AtomicBool,
    callbacks: ReentrantMutex<RefCell<Option<Vec<InitCallback>>>>,
}

impl InitCallbacks {
    pub(crate) fn new(callbacks: Vec<InitCallback>) -> Self {
        Self {
            pending: AtomicBool::new(!callbacks.is_empty()),
            callbacks: ReentrantMutex::new(RefCell::new(Some(callbacks))),
        }
    }

    /// Runs the callbacks if nobody has yet.
    ///
    /// Only the caller that actually runs them sees their error.
    pub(crate) fn run(&self, container: &Container) -> DiResult<()> {
        if !self.pending.load(Ordering::Acquire) {
            return Ok(());
        }

        let guard = self.callbacks.lock();
        let taken = guard.borrow_mut().take();
        let Some(callbacks) = taken else {
            return Ok(());
        };

        debug!(count = callbacks.len(), "running deferred init callbacks");
        let result = callbacks.into_iter().try_for_each(|callback| callback(container));
        self.pending.store(false, Ordering::Release);
        result
    }
}
