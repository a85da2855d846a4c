//! Archive member tables
//!
//! Archives record a modification time for every member, so a single pass
//! over the headers times every member without touching member data.

mod ar;
mod tarball;

use crate::{Error, Result, ScanObserver};
use std::io::{Cursor, Read};

/// Bytes needed to recognize every supported format.
const HEAD_LEN: usize = 512;

const AR_MAGIC: &[u8] = b"!<arch>\n";
const ZSTD_MAGIC: &[u8] = &[0x28, 0xB5, 0x2F, 0xFD];
const USTAR_OFFSET: usize = 257;
const USTAR_MAGIC: &[u8] = b"ustar";

/// Archive layouts the scanner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Unix `ar` (static libraries), GNU and BSD name variants.
    Ar,
    /// POSIX or GNU tar.
    Tar,
    /// Tar compressed with zstd.
    TarZst,
}

impl ArchiveFormat {
    /// Recognizes a format from the leading bytes of an archive.
    #[must_use]
    pub fn detect(head: &[u8]) -> Option<Self> {
        if head.starts_with(AR_MAGIC) {
            Some(Self::Ar)
        } else if head.starts_with(ZSTD_MAGIC) {
            Some(Self::TarZst)
        } else if head
            .get(USTAR_OFFSET..USTAR_OFFSET + USTAR_MAGIC.len())
            .is_some_and(|magic| magic == USTAR_MAGIC)
        {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Reports every member of the archive read from `reader`.
///
/// `archive` is the archive's own path, used to name members as
/// `archive(member)`. Returns the number of members reported.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the member table is
/// malformed. Members reported before a malformed header stay reported.
pub fn scan<R: Read>(
    mut reader: R,
    archive: &str,
    observer: &mut dyn ScanObserver,
) -> Result<usize> {
    let mut head = Vec::with_capacity(HEAD_LEN);
    (&mut reader)
        .take(HEAD_LEN as u64)
        .read_to_end(&mut head)
        .map_err(|e| Error::io(e, archive, "read"))?;

    let format = ArchiveFormat::detect(&head).ok_or_else(|| Error::unknown_format(archive))?;
    tracing::trace!(archive, ?format, "Detected archive format");

    let stream = Cursor::new(head).chain(reader);
    match format {
        ArchiveFormat::Ar => ar::scan(stream, archive, observer),
        ArchiveFormat::Tar => tarball::scan(stream, archive, observer),
        ArchiveFormat::TarZst => {
            let decoder = zstd::Decoder::new(stream)
                .map_err(|e| Error::io(e, archive, "zstd decode"))?;
            tarball::scan(decoder, archive, observer)
        }
    }
}
