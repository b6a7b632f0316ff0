//! Local Media Ingestion Library
//!
//! This library discovers image files in a local directory, extracts their
//! embedded capture metadata, and produces media records for merging into a
//! catalog. It also provides the blocking orchestration layer that drives an
//! asynchronous, callback-based catalog through open, merge, sync and upload.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod io;
pub mod models;
pub mod remote;
pub mod services;

pub use models::{ErrorItem, Handle, Media, MediaState, Session, Size, Source, SyncStats, User};

use std::path::Path;
use std::result;

/// Custom error type for the library
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidInput(String),
    /// A catalog record or snapshot row could not be decoded.
    Decode(String),
    /// The catalog rejected or could not complete an operation.
    Catalog(String),
    /// The remote call itself could not complete.
    Transport(String),
    /// The remote call completed with a non-success application status.
    Application {
        code: u16,
        error: String,
        description: String,
    },
    System(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Error::Decode(msg) => write!(f, "Decode error: {msg}"),
            Error::Catalog(msg) => write!(f, "Catalog error: {msg}"),
            Error::Transport(msg) => write!(f, "Transport error: {msg}"),
            Error::Application {
                code,
                error,
                description,
            } => write!(f, "{code}: {error} - {description}"),
            Error::System(msg) => write!(f, "System error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Options for scanning a media directory
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Sort discovered media by file name instead of directory order.
    pub sort_by_filename: bool,
}

/// Summary result from a scan operation
#[derive(Debug)]
pub struct Summary {
    pub root: String,
    pub medias: Vec<Media>,
    /// Regular files without a metadata container.
    pub skipped: usize,
    pub errors: Vec<ErrorItem>,
    pub started_at: std::time::SystemTime,
    pub finished_at: std::time::SystemTime,
}

/// Scan a directory for media and return a summary
///
/// # Arguments
/// * `source` - The local source the discovered media is attributed to
/// * `root` - The directory to scan (not recursed)
/// * `opts` - Scan options
///
/// # Returns
/// A Summary containing media records and any per-entry errors encountered
pub fn scan_summary<P: AsRef<Path>>(source: &Source, root: P, opts: &ScanOptions) -> Result<Summary> {
    let root = root.as_ref();
    let root_path = root.to_string_lossy().to_string();

    if !root.exists() {
        return Err(Error::InvalidInput(format!(
            "Path does not exist: {root_path}"
        )));
    }

    if !root.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Path is not a directory: {root_path}"
        )));
    }

    let started_at = std::time::SystemTime::now();

    let mut context = services::scan::ScanContext::new(source);
    services::scan::scan_directory(root, &mut context)?;

    let (mut medias, skipped, errors) = context.into_parts();
    if opts.sort_by_filename {
        medias.sort_by(|a, b| a.filename.cmp(&b.filename));
    }

    let finished_at = std::time::SystemTime::now();

    Ok(Summary {
        root: root_path,
        medias,
        skipped,
        errors,
        started_at,
        finished_at,
    })
}
