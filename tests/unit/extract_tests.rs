//! Unit tests for metadata extraction from real files

use crate::fixtures::{exif_jpeg, exif_jpeg_with_broken_make, write_file_sync};
use media_ingest::services::extract::{ImageMetadata, extract};
use tempfile::TempDir;

#[test]
fn extracts_dimensions_and_capture_time() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("photo.jpg");
    let bytes = exif_jpeg(Some("2016:02:29 23:59:59"), Some(4032), Some(3024));
    write_file_sync(&path, &bytes).unwrap();

    let metadata = extract(&path).expect("metadata container");
    assert_eq!(
        metadata,
        ImageMetadata {
            width: 4032,
            height: 3024,
            captured_at: 1_456_790_399,
            file_size: bytes.len() as u64,
        }
    );
}

#[test]
fn short_date_value_reads_as_zero() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("photo.jpg");
    write_file_sync(&path, &exif_jpeg(Some("x"), Some(1), Some(2))).unwrap();

    let metadata = extract(&path).unwrap();
    assert_eq!(metadata.captured_at, 0);
    assert_eq!((metadata.width, metadata.height), (1, 2));
}

#[test]
fn files_without_a_container_are_not_media() {
    let temp_dir = TempDir::new().unwrap();

    let text = temp_dir.path().join("notes.txt");
    write_file_sync(&text, b"hello").unwrap();
    assert_eq!(extract(&text), None);

    let truncated = temp_dir.path().join("truncated.jpg");
    write_file_sync(&truncated, &[0xFF, 0xD8]).unwrap();
    assert_eq!(extract(&truncated), None);

    assert_eq!(extract(&temp_dir.path().join("missing.jpg")), None);
}

#[test]
fn malformed_entry_does_not_hide_other_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("photo.jpg");
    let bytes = exif_jpeg_with_broken_make("2015:06:11 10:00:00", 100, 100);
    write_file_sync(&path, &bytes).unwrap();

    let metadata = extract(&path).expect("container with one broken entry");
    assert_eq!(
        (metadata.width, metadata.height, metadata.captured_at),
        (100, 100, 1_434_016_800)
    );
    assert_eq!(metadata.file_size, bytes.len() as u64);
}
