//! Tar member tables

use crate::{Error, Result, ScanObserver};
use bindstamp_pathsys::member_of;
use bindstamp_timestamp::Timestamp;
use std::io::Read;

/// Reports each entry with its header `mtime`.
///
/// Directory entries are members too; their trailing `/` is dropped so
/// `pkg.tar(docs)` and `pkg.tar(docs/)` name the same binding.
pub(super) fn scan<R: Read>(
    reader: R,
    archive: &str,
    observer: &mut dyn ScanObserver,
) -> Result<usize> {
    let mut tar = tar::Archive::new(reader);
    let entries = tar
        .entries()
        .map_err(|e| Error::io(e, archive, "read tar"))?;

    let mut reported = 0;
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::malformed(archive, format!("unreadable tar entry: {e}")))?;
        let path = entry
            .path()
            .map_err(|e| Error::malformed(archive, format!("invalid tar entry path: {e}")))?;
        let Some(name) = path.to_str() else {
            tracing::debug!(archive, member = ?path, "Skipping non UTF-8 tar member");
            continue;
        };
        let mtime = entry
            .header()
            .mtime()
            .map_err(|e| Error::malformed(archive, format!("invalid tar mtime: {e}")))?;

        let secs = i64::try_from(mtime).unwrap_or(i64::MAX);
        let member = name.trim_end_matches('/');
        observer.entry(&member_of(archive, member), Some(Timestamp::new(secs, 0)));
        reported += 1;
    }

    Ok(reported)
}
