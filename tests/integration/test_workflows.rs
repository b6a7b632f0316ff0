//! End-to-end workflows over the in-process catalog and a fake service

use crate::fixtures::{FakeService, Reply, test_source, write_file_sync, write_photo};
use media_ingest::catalog::{Catalog, MemoryCatalog, SyncRequest, forward};
use media_ingest::config::Config;
use media_ingest::models::{Media, Size};
use media_ingest::services::blocking::run_blocking;
use media_ingest::services::workflow::{
    IngestOptions, enroll_new_user, ingest_local, local_handles, print_medias,
    sign_in_existing_user,
};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

struct Setup {
    _temp_dir: TempDir,
    photos: PathBuf,
    config: Config,
}

fn setup(photo_names: &[&str]) -> Setup {
    let temp_dir = TempDir::new().unwrap();
    let photos = temp_dir.path().join("photos");
    std::fs::create_dir_all(&photos).unwrap();
    for name in photo_names {
        write_photo(&photos, name, "2015:06:11 10:00:00", 64, 48);
    }
    write_file_sync(photos.join("readme.txt"), b"not a photo").unwrap();

    let mut config = Config::default();
    config.catalog.path = temp_dir.path().join("catalog.parquet");
    config.catalog.remote_base = "https://media.example/u".to_string();
    config.source = test_source();
    config.service.base_url = "https://media.example".to_string();
    config.service.email = "someone@example.com".to_string();
    config.service.password = "hunter2".to_string();

    Setup {
        _temp_dir: temp_dir,
        photos,
        config,
    }
}

fn catalog_for(config: &Config) -> MemoryCatalog {
    MemoryCatalog::new(config.catalog.remote_base.clone())
}

fn stored_medias(path: &Path) -> Vec<Media> {
    media_ingest::io::snapshot::read_medias(path).unwrap()
}

#[test]
fn ingest_merges_uploads_and_persists() {
    let setup = setup(&["a.jpg", "b.jpg"]);
    let catalog = catalog_for(&setup.config);

    let report = ingest_local(
        &catalog,
        &setup.config,
        &setup.photos,
        IngestOptions {
            upload: true,
            sync: SyncRequest::default(),
        },
    )
    .unwrap();

    assert!(report.found_medias);
    assert_eq!(report.uploaded, 2);
    assert_eq!(report.printed, 2);
    assert!(!catalog.is_running());
    assert_eq!(catalog.subscriber_count(), 0);

    let stored = stored_medias(&setup.config.catalog.path);
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|m| m.sizes.len() == 2 && !m.is_local_only()));
}

#[test]
fn ingest_without_upload_leaves_records_local() {
    let setup = setup(&["a.jpg"]);
    let catalog = catalog_for(&setup.config);

    let report = ingest_local(&catalog, &setup.config, &setup.photos, IngestOptions::default())
        .unwrap();
    assert_eq!(report.uploaded, 0);

    // Reopen to classify what is still waiting for upload.
    let reopened = catalog_for(&setup.config);
    run_blocking(|done| reopened.start(&setup.config.catalog.path, &test_source(), done))
        .unwrap();
    assert_eq!(local_handles(&reopened), [test_source().item_handle("a.jpg")]);
    reopened.stop();
}

#[test]
fn ingest_of_empty_directory_reports_nothing_found() {
    let setup = setup(&[]);
    let catalog = catalog_for(&setup.config);

    let report = ingest_local(
        &catalog,
        &setup.config,
        &setup.photos,
        IngestOptions {
            upload: true,
            sync: SyncRequest::default(),
        },
    )
    .unwrap();

    assert!(!report.found_medias);
    assert_eq!(report.uploaded, 0);
    assert_eq!(report.printed, 0);
}

#[test]
fn ingest_discards_storage_when_configured() {
    let mut setup = setup(&["a.jpg"]);
    setup.config.catalog.discard_on_exit = true;
    let catalog = catalog_for(&setup.config);

    let report =
        ingest_local(&catalog, &setup.config, &setup.photos, IngestOptions::default()).unwrap();
    assert!(!setup.config.catalog.path.exists());
    assert!(catalog.is_empty());

    // The listing was taken before the storage went away.
    let names: Vec<&str> = report.medias.iter().map(|m| m.filename.as_str()).collect();
    assert_eq!(names, ["a.jpg"]);
    assert_eq!(report.printed, 1);
}

#[test]
fn ingest_command_lists_records_of_a_discarded_catalog() {
    let setup = setup(&["a.jpg", "b.jpg"]);
    let config_path = setup.photos.with_file_name("mingest.json");
    let config = serde_json::json!({
        "catalog": {
            "path": setup.config.catalog.path,
            "discard_on_exit": true,
        },
    });
    write_file_sync(&config_path, config.to_string().as_bytes()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_mingest"))
        .arg("ingest")
        .arg(&setup.photos)
        .arg("--config")
        .arg(&config_path)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("No medias found."));
    assert!(stdout.contains("(2 medias)"));
    assert!(stdout.contains("a.jpg"));
    assert!(stdout.contains("b.jpg"));
    assert!(!setup.config.catalog.path.exists());
}

#[test]
fn enroll_creates_user_uploads_and_signs_out() {
    let setup = setup(&["a.jpg", "b.jpg"]);
    let service = FakeService::default();
    let catalog = catalog_for(&setup.config);

    assert!(enroll_new_user(&service, &catalog, &setup.config, &setup.photos));

    assert_eq!(
        service.calls(),
        ["create_user", "get_token", "set_token", "logout"]
    );
    assert_eq!(
        service.current_token.lock().unwrap().as_deref(),
        Some("token-123")
    );

    let user = catalog.user().unwrap();
    assert_eq!(user.id, "user-1");
    assert_eq!(user.email, "someone@example.com");

    let stored = stored_medias(&setup.config.catalog.path);
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|m| !m.is_local_only()));
}

#[test]
fn enroll_stops_when_account_creation_fails() {
    let setup = setup(&["a.jpg"]);
    let service = FakeService {
        create: Reply::Status(409),
        ..FakeService::default()
    };
    let catalog = catalog_for(&setup.config);

    assert!(!enroll_new_user(&service, &catalog, &setup.config, &setup.photos));
    assert_eq!(service.calls(), ["create_user"]);
    assert!(!catalog.is_running());
    assert!(!setup.config.catalog.path.exists());
}

#[test]
fn remote_flows_require_credentials() {
    let mut setup = setup(&["a.jpg"]);
    setup.config.service.password = String::new();
    let service = FakeService::default();

    let catalog = catalog_for(&setup.config);
    assert!(!enroll_new_user(&service, &catalog, &setup.config, &setup.photos));
    let catalog = catalog_for(&setup.config);
    assert!(!sign_in_existing_user(&service, &catalog, &setup.config, &setup.photos));

    assert!(service.calls().is_empty());
    assert!(!setup.config.catalog.path.exists());
}

#[test]
fn enroll_rejects_an_empty_access_token() {
    let setup = setup(&["a.jpg"]);
    let service = FakeService {
        access_token: String::new(),
        ..FakeService::default()
    };
    let catalog = catalog_for(&setup.config);

    assert!(!enroll_new_user(&service, &catalog, &setup.config, &setup.photos));
    assert_eq!(service.calls(), ["create_user", "get_token"]);
}

#[test]
fn enroll_completes_when_sign_out_fails() {
    let setup = setup(&["a.jpg"]);
    let service = FakeService {
        logout: Reply::Unreachable,
        ..FakeService::default()
    };
    let catalog = catalog_for(&setup.config);

    assert!(enroll_new_user(&service, &catalog, &setup.config, &setup.photos));
    assert_eq!(service.calls().last().map(String::as_str), Some("logout"));
}

#[test]
fn sign_in_merges_local_sizes_into_known_records() {
    let setup = setup(&["a.jpg"]);
    let handle = test_source().item_handle("a.jpg");

    // Seed the storage with the remote side of the same photo.
    let seed = catalog_for(&setup.config);
    run_blocking(|done| seed.start(&setup.config.catalog.path, &test_source(), done)).unwrap();
    run_blocking(|done| {
        seed.merge_local_medias(
            vec![Media {
                handle: handle.clone(),
                filename: "a.jpg".to_string(),
                title: "a.jpg".to_string(),
                sizes: vec![Size {
                    url: format!("https://media.example/u/{handle}"),
                    mime_type: "image/jpeg".to_string(),
                    width: 64,
                    height: 48,
                    file_size: 10,
                    is_original: true,
                }],
                ..Media::default()
            }],
            done,
        )
    })
    .unwrap();
    seed.stop();

    let service = FakeService::default();
    let catalog = catalog_for(&setup.config);
    assert!(sign_in_existing_user(&service, &catalog, &setup.config, &setup.photos));

    assert_eq!(service.calls(), ["get_token", "set_token", "delete_user"]);
    assert_eq!(catalog.user().map(|u| u.id), Some("user-1".to_string()));

    let media = catalog.get(&handle).unwrap();
    assert_eq!(media.sizes.len(), 2);
    assert_eq!(media.captured_at, 1_434_016_800);
    assert_eq!(forward(catalog.all_medias()).count(), 1);
}

#[test]
fn sign_in_fails_without_a_token() {
    let setup = setup(&["a.jpg"]);
    let service = FakeService {
        token: Reply::Unreachable,
        ..FakeService::default()
    };
    let catalog = catalog_for(&setup.config);

    assert!(!sign_in_existing_user(&service, &catalog, &setup.config, &setup.photos));
    assert_eq!(service.calls(), ["get_token"]);
    assert!(!catalog.is_running());
}

#[test]
fn print_medias_counts_readable_records() {
    let setup = setup(&["a.jpg", "b.jpg", "c.jpg"]);
    let catalog = catalog_for(&setup.config);
    ingest_local(&catalog, &setup.config, &setup.photos, IngestOptions::default()).unwrap();

    assert_eq!(print_medias(&catalog), 3);
}
