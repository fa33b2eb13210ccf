//! Fire-and-forget task dispatch.
//!
//! # Responsibilities
//! - Spawn detached work on behalf of a request that has already been answered
//! - Track how many such tasks are still running
//!
//! # Design Decisions
//! - Tasks are never joined by the request path
//! - Shutdown does not wait for them; whatever is in flight is lost
//! - The counter is the hook for a bounded, drained queue if one is ever needed

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::observability::metrics;

/// Spawner for detached background work.
#[derive(Clone, Debug, Default)]
pub struct BackgroundTasks {
    in_flight: Arc<AtomicUsize>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` onto the runtime and forget about it.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = InFlight::enter(self.in_flight.clone());
        tokio::spawn(async move {
            let _guard = guard;
            task.await;
        });
    }

    /// Tasks spawned but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Decrements the counter when the task ends, including by panic or abort.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        metrics::background_task_started();
        Self(counter)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
        metrics::background_task_finished();
    }
}
