//! Capture metadata extraction from EXIF containers.
//!
//! Extraction is best-effort: a missing or malformed field yields zero for
//! that field alone. The only hard failure is a file that carries no
//! recognizable metadata container, which callers treat as "not media".

use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Mime type recorded for sizes produced by this extractor.
pub const MIME_TYPE: &str = "image/jpeg";

/// Textual layout of EXIF `DateTime` values.
pub const CAPTURE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Fields read from one image file. Zero means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// UTC epoch seconds
    pub captured_at: i64,
    pub file_size: u64,
}

/// Read capture metadata from `path`.
///
/// Returns `None` when the file has no metadata container (or cannot be
/// opened at all); every other problem degrades to a zero field.
#[must_use]
pub fn extract(path: &Path) -> Option<ImageMetadata> {
    let exif = read_container(path)?;

    let metadata = ImageMetadata {
        width: read_int_field(&exif, Tag::PixelXDimension),
        height: read_int_field(&exif, Tag::PixelYDimension),
        captured_at: read_capture_time(&exif),
        file_size: fs::metadata(path).map_or(0, |m| m.len()),
    };

    log::trace!(
        "Metadata for {}: {}x{}, captured_at {}, {} bytes",
        path.display(),
        metadata.width,
        metadata.height,
        metadata.captured_at,
        metadata.file_size
    );

    Some(metadata)
}

fn read_container(path: &Path) -> Option<Exif> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
            log::debug!("Could not open {}: {err}", path.display());
            return None;
        }
    };

    let mut reader = BufReader::new(file);
    match Reader::new()
        .continue_on_error(true)
        .read_from_container(&mut reader)
    {
        Ok(exif) => Some(exif),
        // Broken entries are dropped; the rest of the container is kept.
        Err(exif::Error::PartialResult(partial)) => {
            let (exif, errors) = partial.into_inner();
            for err in &errors {
                log::debug!("Ignoring malformed entry in {}: {err}", path.display());
            }
            Some(exif)
        }
        Err(err) => {
            log::trace!("No metadata container in {}: {err}", path.display());
            None
        }
    }
}

fn read_int_field(exif: &Exif, tag: Tag) -> u32 {
    exif.get_field(tag, In::PRIMARY)
        .map_or(0, |field| parse_int_field(&field.display_value().to_string()))
}

fn read_capture_time(exif: &Exif) -> i64 {
    let Some(field) = exif.get_field(Tag::DateTime, In::PRIMARY) else {
        return 0;
    };

    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map_or(0, |raw| parse_capture_time(&String::from_utf8_lossy(raw))),
        other => {
            log::debug!("Unexpected DateTime value type: {other:?}");
            0
        }
    }
}

/// Convert a text-encoded numeric field.
///
/// Trailing spaces are trimmed first; an empty result is 0. Otherwise the
/// leading run of decimal digits is taken, so `"100 pixels"` reads as 100.
/// Negative or out-of-range values read as 0.
#[must_use]
pub fn parse_int_field(raw: &str) -> u32 {
    let trimmed = raw.trim_end_matches(' ');
    if trimmed.is_empty() {
        return 0;
    }

    let body = trimmed.trim_start();
    let (negative, digits) = match body.as_bytes().first() {
        Some(b'-') => (true, &body[1..]),
        Some(b'+') => (false, &body[1..]),
        _ => (false, body),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    if negative {
        return 0;
    }

    digits[..end]
        .parse::<u64>()
        .ok()
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(0)
}

/// Parse `YYYY:MM:DD HH:MM:SS` as UTC epoch seconds, 0 when unparseable.
#[must_use]
pub fn parse_capture_time(raw: &str) -> i64 {
    let trimmed = raw.trim_end_matches(' ');
    if trimmed.is_empty() {
        return 0;
    }

    NaiveDateTime::parse_from_str(trimmed, CAPTURE_TIME_FORMAT)
        .map_or(0, |datetime| datetime.and_utc().timestamp())
}
