//! Contract test for the Parquet snapshot column layout

use crate::fixtures::test_source;
use media_ingest::io::snapshot::{snapshot_schema, write_medias};
use media_ingest::models::{Media, Size};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use tempfile::TempDir;

#[test]
fn test_snapshot_has_one_row_per_size() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("medias.parquet");

    let media = Media {
        handle: test_source().item_handle("a.jpg"),
        filename: "a.jpg".to_string(),
        sizes: vec![
            Size {
                url: "file:///photos/a.jpg".to_string(),
                is_original: true,
                ..Size::default()
            },
            Size {
                url: "https://media.example/a".to_string(),
                ..Size::default()
            },
        ],
        ..Media::default()
    };
    write_medias(&path, &[media]).unwrap();

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap()).unwrap();
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let expected: Vec<String> = snapshot_schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(names, expected);
    assert_eq!(
        &names[..3],
        ["source_type", "source_handle", "handle"]
    );

    let rows: usize = builder.build().unwrap().map(|b| b.unwrap().num_rows()).sum();
    assert_eq!(rows, 2);
}
