//! Selection of catalog records that have no remote representation yet.

use crate::models::{Handle, Media};
use crate::Result;

/// Collect the handles of records whose sizes are all local files.
///
/// `medias` is expected to be pre-filtered to local-state records. A record
/// that fails to decode is logged and skipped. Output order follows the
/// input order.
pub fn local_only_handles<I>(medias: I) -> Vec<Handle>
where
    I: IntoIterator<Item = Result<Media>>,
{
    let mut handles = Vec::new();

    for record in medias {
        match record {
            Ok(media) => {
                if media.is_local_only() {
                    handles.push(media.handle);
                } else {
                    log::trace!("{} already has a remote size", media.handle);
                }
            }
            Err(err) => log::error!("Could not read media: {err}"),
        }
    }

    handles
}
