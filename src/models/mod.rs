//! Data models for sources, media records, sync statistics and upload sessions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheme prefix for sizes that live on the local filesystem.
pub const FILE_URL_PREFIX: &str = "file://";

/// Logical origin of local media (one device or app instance).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    #[serde(rename = "type")]
    pub source_type: String,
    pub handle: String,
    pub title: String,
    pub subtitle: String,
    pub category: String,
}

impl Source {
    #[must_use]
    pub fn new(source_type: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            handle: handle.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        self.title = title.into();
        self.subtitle = subtitle.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Build the handle of an item contributed by this source.
    #[must_use]
    pub fn item_handle(&self, item: impl Into<String>) -> Handle {
        Handle {
            source_type: self.source_type.clone(),
            source_handle: self.handle.clone(),
            handle: item.into(),
        }
    }

    /// Whether `handle` belongs to this source.
    #[must_use]
    pub fn owns(&self, handle: &Handle) -> bool {
        handle.source_type == self.source_type && handle.source_handle == self.handle
    }
}

/// Composite identifier of one logical media item across local and remote catalogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub source_type: String,
    pub source_handle: String,
    pub handle: String,
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.source_type, self.source_handle, self.handle)
    }
}

/// One physical rendition of a media item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub url: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub is_original: bool,
}

impl Size {
    /// A size is local when its url denotes a file on this machine.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.url.starts_with(FILE_URL_PREFIX)
    }

    /// Filesystem path of a local size.
    #[must_use]
    pub fn local_path(&self) -> Option<&str> {
        self.url.strip_prefix(FILE_URL_PREFIX)
    }
}

/// Whether a catalog record still has a local rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaState {
    Local,
    Remote,
}

impl MediaState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaState::Local => "local",
            MediaState::Remote => "remote",
        }
    }
}

/// One logical media item with its ordered size variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub handle: Handle,
    pub filename: String,
    pub original_path: Option<String>,
    pub title: String,
    /// Capture time in UTC epoch seconds, 0 when unknown.
    pub captured_at: i64,
    pub sizes: Vec<Size>,
}

impl Media {
    /// True iff every size resolves to a local file.
    ///
    /// A single remote-resident size disqualifies the whole item, and so does
    /// an empty size list (a record that breaks the non-empty invariant is
    /// never an upload candidate).
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        !self.sizes.is_empty() && self.sizes.iter().all(Size::is_local)
    }

    #[must_use]
    pub fn state(&self) -> MediaState {
        if self.sizes.iter().any(Size::is_local) {
            MediaState::Local
        } else {
            MediaState::Remote
        }
    }

    #[must_use]
    pub fn original(&self) -> Option<&Size> {
        self.sizes.iter().find(|size| size.is_original)
    }

    /// Union another record for the same handle into this one.
    ///
    /// Sizes are matched by url; fields missing here are taken from `other`.
    /// Returns true when anything changed.
    pub fn merge_from(&mut self, other: &Media) -> bool {
        let mut changed = false;

        for size in &other.sizes {
            if !self.sizes.iter().any(|existing| existing.url == size.url) {
                self.sizes.push(size.clone());
                changed = true;
            }
        }

        if self.original_path.is_none() && other.original_path.is_some() {
            self.original_path.clone_from(&other.original_path);
            changed = true;
        }
        if self.captured_at == 0 && other.captured_at != 0 {
            self.captured_at = other.captured_at;
            changed = true;
        }
        if self.filename.is_empty() && !other.filename.is_empty() {
            self.filename.clone_from(&other.filename);
            changed = true;
        }
        if self.title.is_empty() && !other.title.is_empty() {
            self.title.clone_from(&other.title);
            changed = true;
        }

        changed
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Media {}", self.handle)?;
        for size in &self.sizes {
            writeln!(f, "\t{}", size.url)?;
        }
        Ok(())
    }
}

/// What changed in the catalog during one synchronization pass or mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub config_changed: bool,
    pub user_changed: bool,
    pub sources_changed: bool,
    pub medias_changed: u32,
    pub medias_inserted: u32,
    pub medias_removed: u32,
}

impl SyncStats {
    #[must_use]
    pub fn medias_touched(&self) -> bool {
        self.medias_changed > 0 || self.medias_inserted > 0 || self.medias_removed > 0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.config_changed && !self.user_changed && !self.sources_changed && !self.medias_touched()
    }
}

/// Upload progress snapshot for the running batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub completed: u64,
    pub total: u64,
}

impl Session {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.completed == self.total
    }
}

/// Account owning the catalog on the remote side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl User {
    #[must_use]
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}

/// Represents an error encountered during scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorItem {
    pub path: String,
    pub code: String,
    pub message: String,
}
