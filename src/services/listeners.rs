//! Listener registries shared by the catalog change feed and upload progress.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Opaque key returned when a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

/// Shared listener callback.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Set of listeners notified with events of type `E`.
pub struct ListenerRegistry<E> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerToken, Listener<E>)>>,
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<E> ListenerRegistry<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Listener<E>) -> ListenerToken {
        let token = ListenerToken(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((token, listener));
        token
    }

    /// Remove a listener. Returns false for unknown or already removed tokens.
    pub fn remove(&self, token: ListenerToken) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(t, _)| *t != token);
        listeners.len() != before
    }

    /// Deliver `event` to every listener. Listeners run outside the lock so
    /// they may register or remove listeners themselves.
    pub fn notify(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ListenerToken, Listener<E>)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, token: ListenerToken) -> bool;
}

impl<E: 'static> Unsubscribe for ListenerRegistry<E> {
    fn unsubscribe(&self, token: ListenerToken) -> bool {
        self.remove(token)
    }
}

/// Owned registration. Cancelled explicitly or when dropped.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    registry: Weak<dyn Unsubscribe>,
    token: Option<ListenerToken>,
}

impl Subscription {
    /// Register `listener` on `registry` and tie the registration to the
    /// returned value.
    pub fn attach<E: 'static>(registry: &Arc<ListenerRegistry<E>>, listener: Listener<E>) -> Self {
        let token = registry.register(listener);
        let registry: Arc<dyn Unsubscribe> = registry.clone();
        Self {
            registry: Arc::downgrade(&registry),
            token: Some(token),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.token.is_some() && self.registry.strong_count() > 0
    }

    /// Stop receiving events.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(token) = self.token.take()
            && let Some(registry) = self.registry.upgrade()
        {
            registry.unsubscribe(token);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("token", &self.token)
            .field("active", &self.is_active())
            .finish()
    }
}
