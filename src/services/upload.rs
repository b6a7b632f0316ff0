//! Upload session orchestration.
//!
//! Drives one batch through the upload subsystem and blocks until the
//! subsystem reports the whole batch complete:
//!
//! `Idle -> Listening -> Uploading -> Draining -> Done`
//!
//! The completion target is the batch size captured before submission, and
//! the wait ends only on a report whose `completed` equals it exactly. A
//! subsystem that counts overlapping batches into one session can step past
//! the target, so callers run one batch at a time.

use super::blocking::Completion;
use crate::catalog::Uploader;
use crate::models::{Handle, Session};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Listening,
    Uploading,
    Draining,
    Done,
}

impl UploadPhase {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadPhase::Idle => "idle",
            UploadPhase::Listening => "listening",
            UploadPhase::Uploading => "uploading",
            UploadPhase::Draining => "draining",
            UploadPhase::Done => "done",
        }
    }
}

impl std::fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one orchestrated batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    pub submitted: u64,
    /// The session that released the wait; `None` when nothing was submitted.
    pub final_session: Option<Session>,
}

impl UploadReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.submitted == 0
    }
}

/// One batch upload against an [`Uploader`].
pub struct UploadSession<'a> {
    uploader: &'a dyn Uploader,
    phase: UploadPhase,
}

impl<'a> UploadSession<'a> {
    #[must_use]
    pub fn new(uploader: &'a dyn Uploader) -> Self {
        Self {
            uploader,
            phase: UploadPhase::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    fn enter(&mut self, phase: UploadPhase) {
        log::trace!("Upload session {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Upload `handles` and block until all of them are reported complete.
    ///
    /// An empty batch finishes immediately without touching the uploader.
    pub fn run(&mut self, handles: &[Handle]) -> UploadReport {
        if handles.is_empty() {
            log::warn!("No local medias found");
            self.enter(UploadPhase::Done);
            return UploadReport {
                submitted: 0,
                final_session: None,
            };
        }

        let target = handles.len() as u64;
        let (completion, completer) = Completion::pair();

        let token = self
            .uploader
            .add_session_listener(Arc::new(move |session: &Session| {
                log::debug!("Session changed, {}/{}", session.completed, session.total);
                if session.completed == target {
                    completer.complete(*session);
                }
            }));
        self.enter(UploadPhase::Listening);

        self.uploader.add(handles);
        self.enter(UploadPhase::Uploading);

        self.enter(UploadPhase::Draining);
        let final_session = completion.wait();

        self.uploader.remove_session_listener(token);
        self.enter(UploadPhase::Done);
        log::info!("Uploaded {target} medias");

        UploadReport {
            submitted: target,
            final_session: Some(final_session),
        }
    }
}

/// Upload `handles` through `uploader`, blocking until the batch completes.
pub fn upload_handles(uploader: &dyn Uploader, handles: &[Handle]) -> UploadReport {
    UploadSession::new(uploader).run(handles)
}
