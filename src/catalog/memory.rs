//! In-process catalog backed by a Parquet snapshot.
//!
//! Records live in memory ordered by handle. Start loads the snapshot at the
//! storage path, sync reconciles memory with it and writes the result back,
//! stop persists. Every asynchronous call completes on a spawned thread.

use super::upload::{MemoryUploader, Uploader};
use super::{Catalog, MediaCursor, SyncRequest, SyncStatsListener, VecCursor};
use crate::io::snapshot;
use crate::models::{Handle, Media, MediaState, Size, Source, SyncStats, User};
use crate::services::blocking::Callback;
use crate::services::listeners::{ListenerRegistry, Subscription};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;

/// Url prefix used for remote sizes when none is configured.
pub const DEFAULT_REMOTE_BASE: &str = "memory://remote";

#[derive(Default)]
struct CatalogState {
    path: Option<PathBuf>,
    source: Option<Source>,
    user: Option<User>,
    medias: BTreeMap<Handle, Media>,
    running: bool,
}

struct Inner {
    state: Mutex<CatalogState>,
    listeners: Arc<ListenerRegistry<SyncStats>>,
    uploader: Arc<MemoryUploader>,
    remote_base: String,
}

/// Reference [`Catalog`] implementation.
#[derive(Clone)]
pub struct MemoryCatalog {
    inner: Arc<Inner>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_BASE)
    }
}

impl MemoryCatalog {
    /// Create a stopped catalog. Uploaded items gain a size under `remote_base`.
    #[must_use]
    pub fn new(remote_base: impl Into<String>) -> Self {
        let remote_base = remote_base.into().trim_end_matches('/').to_string();

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let uploader = MemoryUploader::new(Arc::new(move |handle: &Handle| {
                weak.upgrade().is_some_and(|inner| inner.publish(handle))
            }));

            Inner {
                state: Mutex::new(CatalogState::default()),
                listeners: Arc::new(ListenerRegistry::new()),
                uploader: Arc::new(uploader),
                remote_base,
            }
        });

        Self { inner }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().medias.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.lock().user.clone()
    }

    #[must_use]
    pub fn local_source(&self) -> Option<Source> {
        self.inner.lock().source.clone()
    }

    #[must_use]
    pub fn get(&self, handle: &Handle) -> Option<Media> {
        self.inner.lock().medias.get(handle).cloned()
    }

    #[must_use]
    pub fn memory_uploader(&self) -> Arc<MemoryUploader> {
        Arc::clone(&self.inner.uploader)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn spawn<T, F>(&self, done: Callback<T>, op: F)
    where
        T: Send + 'static,
        F: FnOnce(&Inner) -> T + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        thread::spawn(move || done(op(&inner)));
    }

    fn cursor<F>(&self, filter: F) -> Box<dyn MediaCursor>
    where
        F: Fn(&Media) -> bool,
    {
        let medias = self
            .inner
            .lock()
            .medias
            .values()
            .filter(|media| filter(media))
            .cloned()
            .collect();
        Box::new(VecCursor::new(medias))
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn announce(&self, stats: &SyncStats) {
        if !stats.is_empty() {
            self.listeners.notify(stats);
        }
    }

    fn start(&self, path: &Path, source: Source) -> Result<()> {
        let stored = if path.exists() {
            snapshot::read_medias(path).map_err(|e| {
                Error::Catalog(format!("could not open {}: {e}", path.display()))
            })?
        } else {
            Vec::new()
        };

        let stats = {
            let mut state = self.lock();
            state.medias = stored
                .into_iter()
                .map(|media| (media.handle.clone(), media))
                .collect();
            state.path = Some(path.to_path_buf());
            state.source = Some(source);
            state.running = true;

            SyncStats {
                sources_changed: true,
                medias_inserted: count(state.medias.len()),
                ..SyncStats::default()
            }
        };

        log::debug!(
            "Catalog opened at {} with {} medias",
            path.display(),
            stats.medias_inserted
        );
        self.announce(&stats);
        Ok(())
    }

    fn merge_local(&self, medias: Vec<Media>) -> Result<()> {
        let stats = {
            let mut state = self.lock();
            if !state.running {
                return Err(Error::Catalog("catalog is not started".to_string()));
            }

            let mut stats = SyncStats::default();
            for media in medias {
                if media.sizes.is_empty() {
                    log::warn!("Ignoring {} without sizes", media.handle);
                    continue;
                }

                match state.medias.get_mut(&media.handle) {
                    Some(existing) => {
                        if existing.merge_from(&media) {
                            stats.medias_changed += 1;
                        }
                    }
                    None => {
                        state.medias.insert(media.handle.clone(), media);
                        stats.medias_inserted += 1;
                    }
                }
            }
            stats
        };

        self.announce(&stats);
        Ok(())
    }

    fn sync(&self, request: SyncRequest) -> Result<SyncStats> {
        let mut state = self.lock();
        if !state.running {
            return Err(Error::Catalog("catalog is not started".to_string()));
        }
        let Some(path) = state.path.clone() else {
            return Err(Error::Catalog("catalog has no storage path".to_string()));
        };

        let stored_exists = path.exists();
        let stored = if stored_exists {
            snapshot::read_medias(&path)
                .map_err(|e| Error::Catalog(format!("could not read {}: {e}", path.display())))?
        } else {
            Vec::new()
        };

        let mut stats = SyncStats::default();
        for media in stored {
            match state.medias.get_mut(&media.handle) {
                Some(existing) => {
                    if existing.merge_from(&media) {
                        stats.medias_changed += 1;
                    }
                }
                None => {
                    state.medias.insert(media.handle.clone(), media);
                    stats.medias_inserted += 1;
                }
            }
        }

        if request.full {
            let mut removed = Vec::new();
            for (handle, media) in &mut state.medias {
                let before = media.sizes.len();
                media
                    .sizes
                    .retain(|size| size.local_path().is_none_or(|p| Path::new(p).exists()));
                if media.sizes.is_empty() {
                    removed.push(handle.clone());
                } else if media.sizes.len() != before {
                    stats.medias_changed += 1;
                }
            }
            for handle in removed {
                state.medias.remove(&handle);
                stats.medias_removed += 1;
            }
        }

        if request.force || !stored_exists || stats.medias_touched() {
            let medias: Vec<Media> = state.medias.values().cloned().collect();
            snapshot::write_medias(&path, &medias)
                .map_err(|e| Error::Catalog(format!("could not write {}: {e}", path.display())))?;
        }
        drop(state);

        self.announce(&stats);
        Ok(stats)
    }

    fn publish(&self, handle: &Handle) -> bool {
        let stats = {
            let mut state = self.lock();
            let Some(media) = state.medias.get_mut(handle) else {
                return false;
            };

            if !media.is_local_only() {
                return true;
            }

            let Some(template) = media.original().or_else(|| media.sizes.first()).cloned() else {
                return false;
            };

            media.sizes.push(Size {
                url: format!("{}/{handle}", self.remote_base),
                ..template
            });

            SyncStats {
                medias_changed: 1,
                ..SyncStats::default()
            }
        };

        self.announce(&stats);
        true
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl Catalog for MemoryCatalog {
    fn start(&self, path: &Path, local_source: &Source, done: Callback<Result<()>>) {
        let path = path.to_path_buf();
        let source = local_source.clone();
        self.spawn(done, move |inner| inner.start(&path, source));
    }

    fn stop(&self) {
        let mut state = self.inner.lock();
        if !state.running {
            return;
        }
        state.running = false;

        if let Some(path) = state.path.clone() {
            let medias: Vec<Media> = state.medias.values().cloned().collect();
            if let Err(err) = snapshot::write_medias(&path, &medias) {
                log::error!("Could not persist catalog to {}: {err}", path.display());
            }
        }
    }

    fn put_user(&self, user: &User) {
        let changed = {
            let mut state = self.inner.lock();
            let changed = state.user.as_ref() != Some(user);
            state.user = Some(user.clone());
            changed
        };

        self.inner.announce(&SyncStats {
            user_changed: changed,
            ..SyncStats::default()
        });
    }

    fn merge_local_medias(&self, medias: Vec<Media>, done: Callback<Result<()>>) {
        self.spawn(done, move |inner| inner.merge_local(medias));
    }

    fn sync(&self, request: SyncRequest, done: Callback<Result<SyncStats>>) {
        self.spawn(done, move |inner| inner.sync(request));
    }

    fn medias(&self) -> Box<dyn MediaCursor> {
        self.cursor(|_| true)
    }

    fn all_medias(&self) -> Box<dyn MediaCursor> {
        let mut medias: Vec<Media> = self.inner.lock().medias.values().cloned().collect();
        medias.sort_by(|a, b| {
            b.captured_at
                .cmp(&a.captured_at)
                .then_with(|| a.handle.cmp(&b.handle))
        });
        Box::new(VecCursor::new(medias))
    }

    fn source_medias(&self, source: &Source) -> Box<dyn MediaCursor> {
        self.cursor(|media| source.owns(&media.handle))
    }

    fn medias_by_state(&self, state: MediaState) -> Box<dyn MediaCursor> {
        self.cursor(|media| media.state() == state)
    }

    fn subscribe(&self, listener: SyncStatsListener) -> Subscription {
        Subscription::attach(&self.inner.listeners, listener)
    }

    fn uploader(&self) -> Arc<dyn Uploader> {
        self.inner.uploader.clone()
    }

    fn destroy(&self) -> Result<()> {
        let mut state = self.inner.lock();
        if state.running {
            return Err(Error::Catalog("catalog must be stopped first".to_string()));
        }
        state.medias.clear();

        if let Some(path) = state.path.take() {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(Error::Io(err)),
            }
        }
        Ok(())
    }
}
