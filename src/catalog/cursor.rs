//! Bidirectional record cursors and their iterator adapters.

use crate::models::Media;
use crate::{Error, Result};

/// Positioned cursor over catalog records.
///
/// A fresh cursor is unpositioned; call [`MediaCursor::seek_to_first`] or
/// [`MediaCursor::seek_to_last`] before reading.
pub trait MediaCursor: Send {
    fn seek_to_first(&mut self);

    fn seek_to_last(&mut self);

    fn valid(&self) -> bool;

    fn next(&mut self);

    fn prev(&mut self);

    /// Decode the record under the cursor.
    fn get(&self) -> Result<Media>;
}

impl<C: MediaCursor + ?Sized> MediaCursor for Box<C> {
    fn seek_to_first(&mut self) {
        (**self).seek_to_first();
    }

    fn seek_to_last(&mut self) {
        (**self).seek_to_last();
    }

    fn valid(&self) -> bool {
        (**self).valid()
    }

    fn next(&mut self) {
        (**self).next();
    }

    fn prev(&mut self) {
        (**self).prev();
    }

    fn get(&self) -> Result<Media> {
        (**self).get()
    }
}

/// Cursor over an owned snapshot of records.
#[derive(Debug, Default)]
pub struct VecCursor {
    items: Vec<Media>,
    pos: Option<usize>,
}

impl VecCursor {
    #[must_use]
    pub fn new(items: Vec<Media>) -> Self {
        Self { items, pos: None }
    }
}

impl MediaCursor for VecCursor {
    fn seek_to_first(&mut self) {
        self.pos = if self.items.is_empty() { None } else { Some(0) };
    }

    fn seek_to_last(&mut self) {
        self.pos = self.items.len().checked_sub(1);
    }

    fn valid(&self) -> bool {
        self.pos.is_some_and(|pos| pos < self.items.len())
    }

    fn next(&mut self) {
        self.pos = self
            .pos
            .map(|pos| pos + 1)
            .filter(|pos| *pos < self.items.len());
    }

    fn prev(&mut self) {
        self.pos = self.pos.and_then(|pos| pos.checked_sub(1));
    }

    fn get(&self) -> Result<Media> {
        self.pos
            .and_then(|pos| self.items.get(pos))
            .cloned()
            .ok_or_else(|| Error::Catalog("cursor is not positioned on a record".to_string()))
    }
}

/// Iterator walking a cursor from first to last record.
pub struct Forward<C> {
    cursor: C,
    started: bool,
}

/// Iterator walking a cursor from last to first record.
pub struct Backward<C> {
    cursor: C,
    started: bool,
}

#[must_use]
pub fn forward<C: MediaCursor>(cursor: C) -> Forward<C> {
    Forward {
        cursor,
        started: false,
    }
}

#[must_use]
pub fn backward<C: MediaCursor>(cursor: C) -> Backward<C> {
    Backward {
        cursor,
        started: false,
    }
}

impl<C: MediaCursor> Iterator for Forward<C> {
    type Item = Result<Media>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started {
            MediaCursor::next(&mut self.cursor);
        } else {
            self.cursor.seek_to_first();
            self.started = true;
        }

        self.cursor.valid().then(|| self.cursor.get())
    }
}

impl<C: MediaCursor> Iterator for Backward<C> {
    type Item = Result<Media>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started {
            self.cursor.prev();
        } else {
            self.cursor.seek_to_last();
            self.started = true;
        }

        self.cursor.valid().then(|| self.cursor.get())
    }
}
