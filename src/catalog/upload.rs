//! Upload subsystem boundary and the in-process uploader used by
//! [`super::MemoryCatalog`].

use crate::models::{Handle, Session};
use crate::services::listeners::{Listener, ListenerRegistry, ListenerToken};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

/// Listener receiving upload progress snapshots.
pub type SessionListener = Listener<Session>;

/// Batch uploader reporting progress to registered listeners.
pub trait Uploader: Send + Sync {
    /// Queue `handles` for upload. Returns immediately.
    fn add(&self, handles: &[Handle]);

    fn add_session_listener(&self, listener: SessionListener) -> ListenerToken;

    fn remove_session_listener(&self, token: ListenerToken) -> bool;
}

/// Publishes one handle to the remote side; false when it could not.
pub type PublishFn = Arc<dyn Fn(&Handle) -> bool + Send + Sync>;

/// Uploader that hands each handle to a publish hook on a background thread.
///
/// Batches run one at a time. The session total grows when a batch is added
/// while another is still running and resets once a session has finished.
pub struct MemoryUploader {
    publish: PublishFn,
    listeners: Arc<ListenerRegistry<Session>>,
    session: Arc<Mutex<Session>>,
    transfer: Arc<Mutex<()>>,
}

impl MemoryUploader {
    #[must_use]
    pub fn new(publish: PublishFn) -> Self {
        Self {
            publish,
            listeners: Arc::new(ListenerRegistry::new()),
            session: Arc::new(Mutex::new(Session::default())),
            transfer: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn session(&self) -> Session {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Uploader for MemoryUploader {
    fn add(&self, handles: &[Handle]) {
        if handles.is_empty() {
            return;
        }

        {
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            if session.is_finished() {
                *session = Session::default();
            }
            session.total += handles.len() as u64;
        }

        let batch = handles.to_vec();
        let publish = Arc::clone(&self.publish);
        let listeners = Arc::clone(&self.listeners);
        let session = Arc::clone(&self.session);
        let transfer = Arc::clone(&self.transfer);

        thread::spawn(move || {
            let _running = transfer.lock().unwrap_or_else(PoisonError::into_inner);

            for handle in &batch {
                if !publish(handle) {
                    log::warn!("Upload of {handle} failed");
                }

                let snapshot = {
                    let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
                    session.completed += 1;
                    *session
                };
                listeners.notify(&snapshot);
            }
        });
    }

    fn add_session_listener(&self, listener: SessionListener) -> ListenerToken {
        self.listeners.register(listener)
    }

    fn remove_session_listener(&self, token: ListenerToken) -> bool {
        self.listeners.remove(token)
    }
}
