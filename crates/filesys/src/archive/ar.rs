//! Unix `ar` member tables (GNU and BSD variants)

use crate::{Error, Result, ScanObserver};
use bindstamp_pathsys::member_of;
use bindstamp_timestamp::Timestamp;
use std::io::{self, Read};

const MAGIC: &[u8; 8] = b"!<arch>\n";
const HEADER_LEN: usize = 60;
const TERMINATOR: &[u8; 2] = b"`\n";

const NAME: std::ops::Range<usize> = 0..16;
const DATE: std::ops::Range<usize> = 16..28;
const SIZE: std::ops::Range<usize> = 48..58;

/// GNU long-name table member.
const LONG_NAMES: &[u8] = b"//";
/// BSD names stored inline after the header: `#1/<len>`.
const BSD_INLINE: &[u8] = b"#1/";

fn is_symbol_table(name: &[u8]) -> bool {
    name == b"/" || name == b"/SYM64/" || name.starts_with(b"__.SYMDEF")
}

fn trim_padding(field: &[u8]) -> &[u8] {
    let end = field
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    &field[..end]
}

fn decimal<T>(field: &[u8], what: &str, archive: &str) -> Result<T>
where
    T: std::str::FromStr + Default,
{
    let text = trim_padding(field);
    if text.is_empty() {
        return Ok(T::default());
    }
    std::str::from_utf8(text)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::malformed(archive, format!("invalid {what} field")))
}

/// Reads a full header; `Ok(false)` on a clean end of archive.
fn read_header<R: Read>(
    reader: &mut R,
    header: &mut [u8; HEADER_LEN],
    archive: &str,
) -> Result<bool> {
    let mut filled = 0;
    while filled < HEADER_LEN {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(Error::malformed(archive, "truncated member header")),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::io(e, archive, "read")),
        }
    }
    Ok(true)
}

fn read_bytes<R: Read>(reader: &mut R, len: u64, archive: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .by_ref()
        .take(len)
        .read_to_end(&mut buf)
        .map_err(|e| Error::io(e, archive, "read"))?;
    if (buf.len() as u64) < len {
        return Err(Error::malformed(archive, "truncated member data"));
    }
    Ok(buf)
}

fn skip<R: Read>(reader: &mut R, len: u64, archive: &str) -> Result<u64> {
    io::copy(&mut reader.by_ref().take(len), &mut io::sink())
        .map_err(|e| Error::io(e, archive, "read"))
}

/// Looks up `/<offset>` in the GNU long-name table.
fn long_name(table: &[u8], offset: usize) -> Option<&[u8]> {
    let rest = table.get(offset..)?;
    let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    let name = &rest[..end];
    Some(name.strip_suffix(b"/").unwrap_or(name))
}

/// Reports each member with its header date.
pub(super) fn scan<R: Read>(
    mut reader: R,
    archive: &str,
    observer: &mut dyn ScanObserver,
) -> Result<usize> {
    let mut magic = [0_u8; MAGIC.len()];
    reader
        .read_exact(&mut magic)
        .map_err(|e| Error::io(e, archive, "read"))?;
    if &magic != MAGIC {
        return Err(Error::malformed(archive, "missing ar magic"));
    }

    let mut long_names: Vec<u8> = Vec::new();
    let mut header = [0_u8; HEADER_LEN];
    let mut reported = 0;

    while read_header(&mut reader, &mut header, archive)? {
        if &header[HEADER_LEN - 2..] != TERMINATOR {
            return Err(Error::malformed(archive, "bad member header terminator"));
        }

        let raw_name = trim_padding(&header[NAME]);
        let date: i64 = decimal(&header[DATE], "date", archive)?;
        let size: u64 = decimal(&header[SIZE], "size", archive)?;
        let mut remaining = size;

        let name: Option<Vec<u8>> = if is_symbol_table(raw_name) {
            tracing::trace!(archive, "Skipping ar symbol table");
            None
        } else if raw_name == LONG_NAMES {
            long_names = read_bytes(&mut reader, size, archive)?;
            remaining = 0;
            None
        } else if let Some(len) = raw_name.strip_prefix(BSD_INLINE) {
            let len: u64 = decimal(len, "name length", archive)?;
            if len > size {
                return Err(Error::malformed(archive, "inline name longer than member"));
            }
            let inline = read_bytes(&mut reader, len, archive)?;
            remaining -= len;
            Some(trim_padding(&inline).to_vec())
        } else if let Some(offset) = raw_name
            .strip_prefix(b"/")
            .filter(|digits| !digits.is_empty() && digits.iter().all(u8::is_ascii_digit))
        {
            let offset: usize = decimal(offset, "long name offset", archive)?;
            let name = long_name(&long_names, offset)
                .ok_or_else(|| Error::malformed(archive, "long name offset out of range"))?;
            Some(name.to_vec())
        } else {
            Some(raw_name.strip_suffix(b"/").unwrap_or(raw_name).to_vec())
        };

        if let Some(name) = name {
            let name = String::from_utf8_lossy(&name);
            observer.entry(&member_of(archive, &name), Some(Timestamp::new(date, 0)));
            reported += 1;
        }

        if skip(&mut reader, remaining, archive)? < remaining {
            return Err(Error::malformed(archive, "truncated member data"));
        }
        // Member data is padded to an even length; the last pad byte may be absent.
        if size % 2 == 1 {
            skip(&mut reader, 1, archive)?;
        }
    }

    Ok(reported)
}
