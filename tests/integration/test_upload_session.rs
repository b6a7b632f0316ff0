//! Upload session orchestration against scripted uploaders

use crate::fixtures::{ScriptedUploader, test_source};
use media_ingest::catalog::{Catalog, MemoryCatalog};
use media_ingest::models::{Handle, Session};
use media_ingest::services::upload::{UploadPhase, UploadSession, upload_handles};
use std::sync::atomic::Ordering;

fn handles(n: usize) -> Vec<Handle> {
    (0..n)
        .map(|i| test_source().item_handle(format!("IMG_{i:04}.jpg")))
        .collect()
}

fn session(completed: u64, total: u64) -> Session {
    Session { completed, total }
}

#[test]
fn empty_batch_never_touches_the_uploader() {
    let uploader = ScriptedUploader::new(vec![session(1, 1)]);

    let mut upload = UploadSession::new(&uploader);
    let report = upload.run(&[]);

    assert!(report.is_empty());
    assert_eq!(report.final_session, None);
    assert_eq!(upload.phase(), UploadPhase::Done);
    assert_eq!(uploader.registrations.load(Ordering::SeqCst), 0);
    assert_eq!(uploader.add_calls(), 0);
}

#[test]
fn wait_releases_only_when_batch_is_complete() {
    let uploader = ScriptedUploader::new(vec![session(1, 3), session(2, 3), session(3, 3)]);
    let batch = handles(3);

    let report = upload_handles(&uploader, &batch);

    assert_eq!(report.submitted, 3);
    assert_eq!(report.final_session, Some(session(3, 3)));
    assert_eq!(*uploader.added.lock().unwrap(), batch);
}

#[test]
fn target_is_the_batch_size_not_the_session_total() {
    // Another batch shares the session, so the total runs ahead of ours.
    let uploader = ScriptedUploader::new(vec![session(1, 5), session(2, 5), session(3, 5)]);

    let report = upload_handles(&uploader, &handles(3));

    assert_eq!(report.final_session, Some(session(3, 5)));
}

#[test]
fn completion_reported_during_add_is_not_lost() {
    let uploader = ScriptedUploader::synchronous(vec![session(1, 2), session(2, 2)]);

    let report = upload_handles(&uploader, &handles(2));

    assert_eq!(report.final_session, Some(session(2, 2)));
}

#[test]
fn later_progress_does_not_change_the_result() {
    let uploader = ScriptedUploader::synchronous(vec![
        session(1, 1),
        session(1, 2),
        session(2, 2),
    ]);

    let report = upload_handles(&uploader, &handles(1));

    assert_eq!(report.final_session, Some(session(1, 1)));
}

#[test]
fn listener_is_removed_after_the_batch() {
    let uploader = ScriptedUploader::new(vec![session(1, 1)]);

    let mut upload = UploadSession::new(&uploader);
    assert_eq!(upload.phase(), UploadPhase::Idle);
    upload.run(&handles(1));

    assert_eq!(upload.phase(), UploadPhase::Done);
    assert_eq!(uploader.registrations.load(Ordering::SeqCst), 1);
    assert_eq!(uploader.listener_count(), 0);
}

#[test]
fn memory_uploader_publishes_every_handle() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let dir = temp_dir.path().join("photos");
    std::fs::create_dir_all(&dir).unwrap();
    crate::fixtures::write_photo(&dir, "a.jpg", "2015:06:11 10:00:00", 8, 8);
    crate::fixtures::write_photo(&dir, "b.jpg", "2015:06:12 10:00:00", 8, 8);

    let catalog = MemoryCatalog::new("https://media.example/u");
    let source = test_source();
    media_ingest::services::workflow::open_catalog(
        &catalog,
        &temp_dir.path().join("catalog.parquet"),
        &source,
    )
    .unwrap();
    assert!(media_ingest::services::workflow::add_local_medias(&catalog, &source, &dir));

    let report = media_ingest::services::workflow::upload_medias(&catalog);
    assert_eq!(report.submitted, 2);
    assert_eq!(report.final_session, Some(session(2, 2)));

    for name in ["a.jpg", "b.jpg"] {
        let handle = source.item_handle(name);
        let media = catalog.get(&handle).unwrap();
        assert_eq!(media.sizes.len(), 2);
        assert!(!media.is_local_only());
        assert_eq!(media.sizes[1].url, format!("https://media.example/u/{handle}"));
    }

    // Nothing is left to upload on a second pass.
    let again = media_ingest::services::workflow::upload_medias(&catalog);
    assert!(again.is_empty());
    assert_eq!(catalog.memory_uploader().listener_count(), 0);
    catalog.stop();
}
