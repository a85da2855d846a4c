//! Path decomposition and cache-key normalization for bindstamp.
//!
//! Build targets are named by strings that may carry more than a filesystem
//! path:
//!
//! - a leading *grist* in angle brackets (`<src>foo.c`) used to tell apart
//!   targets with the same file name,
//! - a trailing *archive member* in parentheses (`/lib/libx.a(x.o)`) naming a
//!   unit stored inside an archive file.
//!
//! [`PathName`] splits such a string into its components and reassembles a
//! string from any subset of them. [`KeyStyle`] turns a path into the
//! canonical form used as a cache key.
//!
//! # Example
//!
//! ```
//! use bindstamp_pathsys::PathName;
//!
//! let name = PathName::parse("<grist>/lib/libfoo.a(bar.o)");
//! assert_eq!(name.dir, "/lib");
//! assert_eq!(name.member, "bar.o");
//! assert_eq!(name.strip_grist().parent().build(), "/lib");
//! assert_eq!(name.strip_grist().strip_member().build(), "/lib/libfoo.a");
//! ```

use std::borrow::Cow;

/// Components of a target path. All fields borrow from the parsed string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathName<'a> {
    /// Leading `<...>` decoration, brackets included.
    pub grist: &'a str,
    /// Directory prefix applied by [`PathName::build`] when `dir` is relative.
    pub root: &'a str,
    /// Everything before the last separator; `/` for files in the root.
    pub dir: &'a str,
    /// File name without its suffix.
    pub base: &'a str,
    /// File name from its last `.`, dot included.
    pub suffix: &'a str,
    /// Archive member named inside trailing parentheses.
    pub member: &'a str,
}

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// `c:` style drive prefix.
fn is_drive(dir: &str) -> bool {
    let bytes = dir.as_bytes();
    cfg!(windows) && bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn is_rooted(dir: &str) -> bool {
    dir.starts_with(is_separator) || dir.get(..2).is_some_and(is_drive)
}

/// Byte offset of the `(` matching a trailing `)`, if any.
fn member_open(path: &str) -> Option<usize> {
    if !path.ends_with(')') {
        return None;
    }
    let mut depth = 0usize;
    for (at, c) in path.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return Some(at);
                }
            }
            _ => {}
        }
    }
    None
}

impl<'a> PathName<'a> {
    /// Splits a target path into its components.
    #[must_use]
    pub fn parse(path: &'a str) -> Self {
        let mut name = Self::default();
        let mut rest = path;

        if rest.starts_with('<') {
            if let Some(end) = rest.find('>') {
                name.grist = &rest[..=end];
                rest = &rest[end + 1..];
            }
        }

        // Members may hold separators of their own (`pkg.tar(sub/x.o)`), so
        // the member goes first and the directory is searched for in what
        // remains.
        if let Some(open) = member_open(rest) {
            name.member = &rest[open + 1..rest.len() - 1];
            rest = &rest[..open];
        }

        if let Some(sep) = rest.rfind(is_separator) {
            name.dir = if sep == 0 {
                &rest[..1]
            } else if is_drive(&rest[..sep]) {
                // Keep `c:/` so the directory still names the drive root.
                &rest[..=sep]
            } else {
                &rest[..sep]
            };
            rest = &rest[sep + 1..];
        }

        match rest.rfind('.') {
            Some(dot) => {
                name.base = &rest[..dot];
                name.suffix = &rest[dot..];
            }
            None => name.base = rest,
        }

        name
    }

    /// Names the containing directory: base, suffix and member are dropped.
    #[must_use]
    pub fn parent(&self) -> Self {
        Self {
            base: "",
            suffix: "",
            member: "",
            ..*self
        }
    }

    /// Same path without its grist.
    #[must_use]
    pub fn strip_grist(&self) -> Self {
        Self { grist: "", ..*self }
    }

    /// Same path without its archive member, i.e. the archive file itself.
    #[must_use]
    pub fn strip_member(&self) -> Self {
        Self { member: "", ..*self }
    }

    /// Sets the root prepended to relative directories.
    #[must_use]
    pub fn with_root(&self, root: &'a str) -> Self {
        Self { root, ..*self }
    }

    /// Returns true when the path names a member inside an archive.
    #[must_use]
    pub fn has_member(&self) -> bool {
        !self.member.is_empty()
    }

    /// Reassembles a path string from the components.
    #[must_use]
    pub fn build(&self) -> String {
        let mut out = String::with_capacity(
            self.grist.len()
                + self.root.len()
                + self.dir.len()
                + self.base.len()
                + self.suffix.len()
                + self.member.len()
                + 6,
        );

        if !self.grist.is_empty() {
            if !self.grist.starts_with('<') {
                out.push('<');
            }
            out.push_str(self.grist);
            if !self.grist.ends_with('>') {
                out.push('>');
            }
        }

        if !self.root.is_empty() && self.root != "." && !is_rooted(self.dir) {
            out.push_str(self.root);
            if !self.root.ends_with(is_separator) {
                out.push('/');
            }
        }

        out.push_str(self.dir);

        let has_file = !self.base.is_empty() || !self.suffix.is_empty();
        if !self.dir.is_empty() && has_file && !self.dir.ends_with(is_separator) {
            out.push('/');
        }

        out.push_str(self.base);
        out.push_str(self.suffix);

        if !self.member.is_empty() {
            out.push('(');
            out.push_str(self.member);
            out.push(')');
        }

        out
    }
}

/// Path of the entry `name` inside directory `dir`.
///
/// An empty `dir` stands for the current directory and yields `name` alone.
#[must_use]
pub fn child(dir: &str, name: &str) -> String {
    PathName {
        dir,
        base: name,
        ..PathName::default()
    }
    .build()
}

/// Path addressing `member` inside `archive`, as `archive(member)`.
#[must_use]
pub fn member_of(archive: &str, member: &str) -> String {
    format!("{archive}({member})")
}

/// How a path string is turned into a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// The path is its own key.
    Exact,
    /// Lowercased, with `\` separators turned into `/`.
    CaseFolded,
}

impl Default for KeyStyle {
    fn default() -> Self {
        if cfg!(windows) {
            Self::CaseFolded
        } else {
            Self::Exact
        }
    }
}

impl KeyStyle {
    /// Canonical key for `path`.
    #[must_use]
    pub fn key<'p>(self, path: &'p str) -> Cow<'p, str> {
        match self {
            Self::Exact => Cow::Borrowed(path),
            Self::CaseFolded => {
                if path.chars().any(|c| c == '\\' || c.is_uppercase()) {
                    Cow::Owned(path.replace('\\', "/").to_lowercase())
                } else {
                    Cow::Borrowed(path)
                }
            }
        }
    }
}
