//! Bridging single-shot completion callbacks into blocking calls.
//!
//! Catalog and upload APIs report completion through a callback invoked on
//! whatever thread the subsystem uses internally. [`run_blocking`] hands such
//! an operation a callback and parks the calling thread until it fires, so
//! orchestration code reads sequentially.
//!
//! There is no timeout: an operation that never completes blocks its caller
//! forever.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

/// Completion callback handed to asynchronous operations.
pub type Callback<T> = Box<dyn FnOnce(T) + Send + 'static>;

struct Slot<T> {
    value: Mutex<Option<T>>,
    ready: Condvar,
}

/// Waiting half of a one-shot completion.
pub struct Completion<T> {
    slot: Arc<Slot<T>>,
}

/// Signalling half of a one-shot completion. Cloneable; the first value wins.
pub struct Completer<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for Completer<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Completion<T> {
    /// Create a linked waiter/completer pair.
    #[must_use]
    pub fn pair() -> (Completion<T>, Completer<T>) {
        let slot = Arc::new(Slot {
            value: Mutex::new(None),
            ready: Condvar::new(),
        });
        (
            Completion {
                slot: Arc::clone(&slot),
            },
            Completer { slot },
        )
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slot
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Block until a value has been delivered and return it.
    ///
    /// Safe against spurious wake-ups and against completion that happens
    /// before the wait starts.
    pub fn wait(self) -> T {
        let mut guard = self
            .slot
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        loop {
            if let Some(value) = guard.take() {
                return value;
            }
            guard = self
                .slot
                .ready
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl<T> Completer<T> {
    /// Deliver `value`. Returns false if a value was already delivered, in
    /// which case `value` is dropped.
    pub fn complete(&self, value: T) -> bool {
        let mut guard = self
            .slot
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if guard.is_some() {
            return false;
        }

        *guard = Some(value);
        self.slot.ready.notify_all();
        true
    }
}

/// Run a callback-style operation and block until its callback fires.
///
/// `op` must invoke the callback it is given exactly once, on any thread.
/// The value passed to the callback is returned unchanged.
pub fn run_blocking<T, F>(op: F) -> T
where
    T: Send + 'static,
    F: FnOnce(Callback<T>),
{
    let (completion, completer) = Completion::pair();

    op(Box::new(move |value| {
        completer.complete(value);
    }));

    completion.wait()
}
