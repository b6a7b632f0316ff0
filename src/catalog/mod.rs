//! Catalog boundary: the asynchronous, callback-driven store of media records.
//!
//! Every mutating call returns immediately and reports completion through a
//! [`Callback`]. Reads go through cursors that snapshot the records they
//! cover. Out-of-band changes are announced to [`Subscription`] holders.

pub mod cursor;
pub mod memory;
pub mod upload;

pub use cursor::{Backward, Forward, MediaCursor, VecCursor, backward, forward};
pub use memory::MemoryCatalog;
pub use upload::{MemoryUploader, SessionListener, Uploader};

use crate::Result;
use crate::models::{Media, MediaState, Source, SyncStats, User};
use crate::services::blocking::Callback;
use crate::services::listeners::{Listener, Subscription};
use std::path::Path;
use std::sync::Arc;

/// Flags for a synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncRequest {
    /// Also revalidate every record, dropping sizes that no longer resolve.
    pub full: bool,
    /// Write back to storage even when nothing changed.
    pub force: bool,
}

/// Listener receiving catalog change summaries.
pub type SyncStatsListener = Listener<SyncStats>;

/// Persistent, iterable collection of local and remote media records.
pub trait Catalog: Send + Sync {
    /// Open the storage at `path` with the local source of this run.
    fn start(&self, path: &Path, local_source: &Source, done: Callback<Result<()>>);

    /// Flush and close the storage. Further mutations fail until restarted.
    fn stop(&self);

    fn put_user(&self, user: &User);

    /// Merge locally discovered records; records sharing a handle with an
    /// existing one have their size collections unioned.
    fn merge_local_medias(&self, medias: Vec<Media>, done: Callback<Result<()>>);

    fn sync(&self, request: SyncRequest, done: Callback<Result<SyncStats>>);

    /// Records ordered by handle.
    fn medias(&self) -> Box<dyn MediaCursor>;

    /// Records ordered by capture time, newest first.
    fn all_medias(&self) -> Box<dyn MediaCursor>;

    fn source_medias(&self, source: &Source) -> Box<dyn MediaCursor>;

    fn medias_by_state(&self, state: MediaState) -> Box<dyn MediaCursor>;

    /// Receive a [`SyncStats`] whenever the catalog changes.
    fn subscribe(&self, listener: SyncStatsListener) -> Subscription;

    fn uploader(&self) -> Arc<dyn Uploader>;

    /// Delete the backing storage. Only meaningful after [`Catalog::stop`].
    fn destroy(&self) -> Result<()>;
}
