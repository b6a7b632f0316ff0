//! Directory scanning: one level of regular files, each probed for metadata.

use super::extract::{self, ImageMetadata, MIME_TYPE};
use crate::models::{ErrorItem, FILE_URL_PREFIX, Media, Size, Source};
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Scan state accumulated while walking one directory
pub struct ScanContext<'a> {
    source: &'a Source,
    medias: Vec<Media>,
    skipped: usize,
    errors: Vec<ErrorItem>,
}

impl<'a> ScanContext<'a> {
    #[must_use]
    pub fn new(source: &'a Source) -> Self {
        Self {
            source,
            medias: Vec::new(),
            skipped: 0,
            errors: Vec::new(),
        }
    }

    /// Record an error encountered for a single entry
    pub(crate) fn record_error(&mut self, path: &Path, error: &std::io::Error) {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => "ENOENT",
            std::io::ErrorKind::PermissionDenied => "EACCES",
            _ => "IO",
        };

        self.errors.push(ErrorItem {
            path: path_string(path),
            code: code.to_string(),
            message: error.to_string(),
        });
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<Media>, usize, Vec<ErrorItem>) {
        (self.medias, self.skipped, self.errors)
    }
}

#[cfg(windows)]
pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(not(windows))]
pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Build the record for one file that carried a metadata container.
#[must_use]
pub fn media_from_file(source: &Source, path: &Path, metadata: &ImageMetadata) -> Media {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let path_str = path_string(path);

    Media {
        handle: source.item_handle(filename.clone()),
        title: filename.clone(),
        filename,
        original_path: Some(path_str.clone()),
        captured_at: metadata.captured_at,
        sizes: vec![Size {
            url: format!("{FILE_URL_PREFIX}{path_str}"),
            mime_type: MIME_TYPE.to_string(),
            width: metadata.width,
            height: metadata.height,
            file_size: metadata.file_size,
            is_original: true,
        }],
    }
}

/// Walk the immediate entries of `dir`, collecting media into `context`.
///
/// Only regular files are considered; symlinks, subdirectories and device
/// files are passed over. Failing to open `dir` itself is the only error.
pub fn scan_directory(dir: &Path, context: &mut ScanContext<'_>) -> std::io::Result<()> {
    let entries = fs::read_dir(dir)?;

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                context.record_error(dir, &e);
                continue;
            }
        };

        let entry_path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                context.record_error(&entry_path, &e);
                continue;
            }
        };

        if !file_type.is_file() {
            continue;
        }

        let Some(metadata) = extract::extract(&entry_path) else {
            log::debug!("{} not an image", entry.file_name().to_string_lossy());
            context.skipped += 1;
            continue;
        };

        let media = media_from_file(context.source, &entry_path, &metadata);
        log::debug!("Media entry: {} ({}x{})", media.handle, metadata.width, metadata.height);
        context.medias.push(media);
    }

    Ok(())
}

/// Scan `directory` for media attributed to `source`.
///
/// Per-file problems never fail the scan; an unreadable directory does and
/// is logged here.
pub fn read_media_directory(source: &Source, directory: &Path) -> Result<Vec<Media>> {
    let mut context = ScanContext::new(source);

    if let Err(err) = scan_directory(directory, &mut context) {
        log::error!("Could not read directory {}: {err}", directory.display());
        return Err(Error::Io(err));
    }

    for error in &context.errors {
        log::warn!("Skipped {}: {} ({})", error.path, error.message, error.code);
    }

    let (medias, _, _) = context.into_parts();
    Ok(medias)
}
