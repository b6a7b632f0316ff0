//! Blocking workflows over the catalog, uploader and remote service.
//!
//! Every step bridges one asynchronous call through
//! [`run_blocking`](super::blocking::run_blocking). Failures are logged and
//! reported as `false` or empty results; nothing is retried here.

use super::blocking::run_blocking;
use super::classify::local_only_handles;
use super::scan::read_media_directory;
use super::upload::{UploadReport, upload_handles};
use crate::catalog::{Catalog, SyncRequest, forward};
use crate::config::Config;
use crate::models::{Handle, Media, MediaState, Source, SyncStats};
use crate::remote::{self, RemoteService};
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// Open the catalog storage and wait for it to be ready.
pub fn open_catalog<C: Catalog + ?Sized>(catalog: &C, path: &Path, local_source: &Source) -> Result<()> {
    let result = run_blocking(|done| catalog.start(path, local_source, done));
    if let Err(err) = &result {
        log::error!("Could not open catalog at {}: {err}", path.display());
    }
    result
}

/// Scan `directory` and merge what was found into the catalog.
///
/// Returns false when nothing was found or the merge failed.
pub fn add_local_medias<C: Catalog + ?Sized>(catalog: &C, source: &Source, directory: &Path) -> bool {
    let Ok(medias) = read_media_directory(source, directory) else {
        return false;
    };

    log::debug!("Found medias: {}", medias.len());
    if medias.is_empty() {
        return false;
    }

    match run_blocking(|done| catalog.merge_local_medias(medias, done)) {
        Ok(()) => true,
        Err(err) => {
            log::error!("Merging local medias failed: {err}");
            false
        }
    }
}

/// Handles of local-state records with no remote size.
pub fn local_handles<C: Catalog + ?Sized>(catalog: &C) -> Vec<Handle> {
    local_only_handles(forward(catalog.medias_by_state(MediaState::Local)))
}

/// Upload every local-only record and wait for the batch to finish.
pub fn upload_medias<C: Catalog + ?Sized>(catalog: &C) -> UploadReport {
    let handles = local_handles(catalog);
    let uploader = catalog.uploader();
    upload_handles(uploader.as_ref(), &handles)
}

/// Synchronize and wait. Failures yield empty stats.
pub fn sync<C: Catalog + ?Sized>(catalog: &C, request: SyncRequest) -> SyncStats {
    match run_blocking(|done| catalog.sync(request, done)) {
        Ok(stats) => stats,
        Err(err) => {
            log::error!("Sync failed: {err}");
            SyncStats::default()
        }
    }
}

/// Every readable record, newest first. Unreadable ones are logged and skipped.
pub fn list_medias<C: Catalog + ?Sized>(catalog: &C) -> Vec<Media> {
    forward(catalog.all_medias())
        .filter_map(|record| match record {
            Ok(media) => Some(media),
            Err(err) => {
                log::error!("Could not read media: {err}");
                None
            }
        })
        .collect()
}

/// Log every record, newest first. Returns how many were printed.
pub fn print_medias<C: Catalog + ?Sized>(catalog: &C) -> usize {
    log_medias(&list_medias(catalog))
}

fn log_medias(medias: &[Media]) -> usize {
    for media in medias {
        log::info!("{media}");
    }
    medias.len()
}

/// Change listener reporting what a catalog mutation touched.
pub fn log_sync_stats(stats: &SyncStats) {
    if stats.config_changed {
        log::debug!("Catalog config changed");
    }
    if stats.user_changed {
        log::debug!("Catalog user changed");
    }
    if stats.sources_changed {
        log::debug!("Catalog sources changed");
    }
    if stats.medias_changed > 0 {
        log::debug!("Catalog medias changed: {}", stats.medias_changed);
    }
    if stats.medias_inserted > 0 {
        log::debug!("Catalog medias inserted: {}", stats.medias_inserted);
    }
    if stats.medias_removed > 0 {
        log::debug!("Catalog medias removed: {}", stats.medias_removed);
    }
}

fn finish<C: Catalog + ?Sized>(catalog: &C, config: &Config) {
    catalog.stop();
    if config.catalog.discard_on_exit
        && let Err(err) = catalog.destroy()
    {
        log::warn!("Could not destroy catalog: {err}");
    }
}

/// Options for a local ingestion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    pub upload: bool,
    pub sync: SyncRequest,
}

/// What a local ingestion run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub synced: SyncStats,
    pub found_medias: bool,
    pub uploaded: u64,
    pub printed: usize,
    /// Catalog contents, newest first, read before the catalog was stopped.
    pub medias: Vec<Media>,
}

/// Open, sync, merge local media, optionally upload, print and stop.
pub fn ingest_local<C: Catalog + ?Sized>(
    catalog: &C,
    config: &Config,
    media_dir: &Path,
    opts: IngestOptions,
) -> Result<IngestReport> {
    open_catalog(catalog, &config.catalog.path, &config.source)?;
    let subscription = catalog.subscribe(Arc::new(log_sync_stats));

    let mut report = IngestReport {
        synced: sync(catalog, opts.sync),
        ..IngestReport::default()
    };

    report.found_medias = add_local_medias(catalog, &config.source, media_dir);
    if opts.upload {
        report.uploaded = upload_medias(catalog).submitted;
    }
    report.medias = list_medias(catalog);
    report.printed = log_medias(&report.medias);

    subscription.cancel();
    finish(catalog, config);
    Ok(report)
}

/// Create an account, ingest local media, upload it, then sign out.
pub fn enroll_new_user<S, C>(service: &S, catalog: &C, config: &Config, media_dir: &Path) -> bool
where
    S: RemoteService + ?Sized,
    C: Catalog + ?Sized,
{
    if let Err(err) = config.validate() {
        log::error!("Invalid configuration: {err}");
        return false;
    }
    let email = config.service.email.as_str();
    let password = config.service.password.as_str();

    let Some(user) = remote::create_user(service, email, password) else {
        return false;
    };

    let Some(grant) = remote::get_token(service, email, password) else {
        return false;
    };
    service.set_token(&grant.access_token);

    if open_catalog(catalog, &config.catalog.path, &config.source).is_err() {
        return false;
    }
    catalog.put_user(&user);
    let subscription = catalog.subscribe(Arc::new(log_sync_stats));

    if add_local_medias(catalog, &config.source, media_dir) {
        upload_medias(catalog);
        print_medias(catalog);
    }

    subscription.cancel();
    finish(catalog, config);
    remote::sign_out(service);
    true
}

/// Sign in, pull the remote catalog, merge local media, then delete the account.
pub fn sign_in_existing_user<S, C>(service: &S, catalog: &C, config: &Config, media_dir: &Path) -> bool
where
    S: RemoteService + ?Sized,
    C: Catalog + ?Sized,
{
    if let Err(err) = config.validate() {
        log::error!("Invalid configuration: {err}");
        return false;
    }
    let email = config.service.email.as_str();
    let password = config.service.password.as_str();

    let Some(grant) = remote::get_token(service, email, password) else {
        return false;
    };
    service.set_token(&grant.access_token);

    if open_catalog(catalog, &config.catalog.path, &config.source).is_err() {
        return false;
    }
    catalog.put_user(&grant.user);
    let subscription = catalog.subscribe(Arc::new(log_sync_stats));

    sync(catalog, SyncRequest::default());

    // Records already known from the remote side gain their local size here.
    add_local_medias(catalog, &config.source, media_dir);
    print_medias(catalog);

    subscription.cancel();
    finish(catalog, config);
    remote::delete_user(service, password);
    true
}
