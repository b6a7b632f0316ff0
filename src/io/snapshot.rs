//! Parquet snapshot read/write operations
//!
//! Media records are stored one row per size variant and regrouped by
//! handle on read, in first-seen order.

use crate::models::{Handle, Media, Size};
use arrow_array::{
    Array, ArrayRef, BooleanArray, Int64Array, RecordBatch, StringArray, UInt32Array, UInt64Array,
};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::properties::WriterProperties;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Error, ErrorKind, Result};
use std::path::Path;
use std::sync::Arc;

/// Return the Arrow schema shared by snapshot writers and readers.
#[must_use]
pub fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("source_type", DataType::Utf8, false),
        Field::new("source_handle", DataType::Utf8, false),
        Field::new("handle", DataType::Utf8, false),
        Field::new("filename", DataType::Utf8, false),
        Field::new("original_path", DataType::Utf8, true),
        Field::new("title", DataType::Utf8, false),
        Field::new("captured_at", DataType::Int64, false),
        Field::new("size_url", DataType::Utf8, true),
        Field::new("size_mime_type", DataType::Utf8, true),
        Field::new("size_width", DataType::UInt32, true),
        Field::new("size_height", DataType::UInt32, true),
        Field::new("size_file_size", DataType::UInt64, true),
        Field::new("size_is_original", DataType::Boolean, true),
    ]))
}

/// Write media records to a Parquet file, replacing any existing file.
pub fn write_medias(path: &Path, medias: &[Media]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let schema = snapshot_schema();
    let props = WriterProperties::builder().build();
    let mut writer =
        ArrowWriter::try_new(file, schema.clone(), Some(props)).map_err(Error::other)?;

    if !medias.is_empty() {
        let batch = create_medias_batch(&schema, medias)?;
        writer.write(&batch).map_err(Error::other)?;
    }

    writer.close().map_err(Error::other)?;
    Ok(())
}

/// Read media records from a Parquet file.
pub fn read_medias(path: &Path) -> Result<Vec<Media>> {
    let file = File::open(path)?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    let reader = builder
        .build()
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    let mut medias: Vec<Media> = Vec::new();
    let mut index: HashMap<Handle, usize> = HashMap::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

        for row in 0..batch.num_rows() {
            let (media, size) = extract_row(&batch, row)?;

            if let Some(&pos) = index.get(&media.handle) {
                medias[pos].sizes.extend(size);
            } else {
                index.insert(media.handle.clone(), medias.len());
                let mut media = media;
                media.sizes.extend(size);
                medias.push(media);
            }
        }
    }

    Ok(medias)
}

/// Flatten media records into one row per size.
pub fn create_medias_batch(schema: &Arc<Schema>, medias: &[Media]) -> Result<RecordBatch> {
    let rows: Vec<(&Media, Option<&Size>)> = medias
        .iter()
        .flat_map(|media| {
            let sizes: Vec<Option<&Size>> = if media.sizes.is_empty() {
                vec![None]
            } else {
                media.sizes.iter().map(Some).collect()
            };
            sizes.into_iter().map(move |size| (media, size))
        })
        .collect();

    let columns: Vec<ArrayRef> = vec![
        string_column(&rows, |m, _| Some(m.handle.source_type.clone())),
        string_column(&rows, |m, _| Some(m.handle.source_handle.clone())),
        string_column(&rows, |m, _| Some(m.handle.handle.clone())),
        string_column(&rows, |m, _| Some(m.filename.clone())),
        string_column(&rows, |m, _| m.original_path.clone()),
        string_column(&rows, |m, _| Some(m.title.clone())),
        Arc::new(Int64Array::from(
            rows.iter().map(|(m, _)| m.captured_at).collect::<Vec<_>>(),
        )) as ArrayRef,
        string_column(&rows, |_, s| s.map(|s| s.url.clone())),
        string_column(&rows, |_, s| s.map(|s| s.mime_type.clone())),
        Arc::new(UInt32Array::from(
            rows.iter().map(|(_, s)| s.map(|s| s.width)).collect::<Vec<_>>(),
        )) as ArrayRef,
        Arc::new(UInt32Array::from(
            rows.iter().map(|(_, s)| s.map(|s| s.height)).collect::<Vec<_>>(),
        )) as ArrayRef,
        Arc::new(UInt64Array::from(
            rows.iter().map(|(_, s)| s.map(|s| s.file_size)).collect::<Vec<_>>(),
        )) as ArrayRef,
        Arc::new(BooleanArray::from(
            rows.iter().map(|(_, s)| s.map(|s| s.is_original)).collect::<Vec<_>>(),
        )) as ArrayRef,
    ];

    RecordBatch::try_new(schema.clone(), columns).map_err(Error::other)
}

fn string_column(
    rows: &[(&Media, Option<&Size>)],
    value: impl Fn(&Media, Option<&Size>) -> Option<String>,
) -> ArrayRef {
    Arc::new(StringArray::from(
        rows.iter().map(|(m, s)| value(m, *s)).collect::<Vec<_>>(),
    ))
}

fn extract_row(batch: &RecordBatch, row: usize) -> Result<(Media, Option<Size>)> {
    let media = Media {
        handle: Handle {
            source_type: required(string_value(batch, "source_type", row)?, "source_type")?,
            source_handle: required(string_value(batch, "source_handle", row)?, "source_handle")?,
            handle: required(string_value(batch, "handle", row)?, "handle")?,
        },
        filename: string_value(batch, "filename", row)?.unwrap_or_default(),
        original_path: string_value(batch, "original_path", row)?,
        title: string_value(batch, "title", row)?.unwrap_or_default(),
        captured_at: column::<Int64Array>(batch, "captured_at")?.value(row),
        sizes: Vec::new(),
    };

    let Some(url) = string_value(batch, "size_url", row)? else {
        return Ok((media, None));
    };

    let widths = column::<UInt32Array>(batch, "size_width")?;
    let heights = column::<UInt32Array>(batch, "size_height")?;
    let file_sizes = column::<UInt64Array>(batch, "size_file_size")?;
    let originals = column::<BooleanArray>(batch, "size_is_original")?;

    let size = Size {
        url,
        mime_type: string_value(batch, "size_mime_type", row)?.unwrap_or_default(),
        width: if widths.is_null(row) { 0 } else { widths.value(row) },
        height: if heights.is_null(row) { 0 } else { heights.value(row) },
        file_size: if file_sizes.is_null(row) { 0 } else { file_sizes.value(row) },
        is_original: !originals.is_null(row) && originals.value(row),
    };

    Ok((media, Some(size)))
}

fn required(value: Option<String>, col_name: &str) -> Result<String> {
    value.ok_or_else(|| Error::new(ErrorKind::InvalidData, format!("Missing {col_name}")))
}

fn column<'a, A: Array + 'static>(batch: &'a RecordBatch, col_name: &str) -> Result<&'a A> {
    let col = batch.column_by_name(col_name).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Missing column: {col_name}"),
        )
    })?;

    col.as_any().downcast_ref::<A>().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Invalid type for: {col_name}"),
        )
    })
}

fn string_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<String>> {
    let array = column::<StringArray>(batch, col_name)?;

    if array.is_null(row) {
        Ok(None)
    } else {
        Ok(Some(array.value(row).to_string()))
    }
}
