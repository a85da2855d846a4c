//! File system collaborators for the bindstamp resolver.
//!
//! The resolver never touches the disk itself. It talks to a [`FileSystem`],
//! which bundles three operations:
//!
//! - enumerate a directory, reporting every entry to a [`ScanObserver`]
//! - enumerate the members of an archive (`ar`, `tar`, `tar.zst`), reporting
//!   each as `archive(member)` together with the member's stored time
//! - fetch the modification time of a single path
//!
//! [`LocalFileSystem`] implements these against the real file system. Tests
//! substitute their own implementation to count or script calls.

pub mod archive;
mod error;
mod local;
mod observer;

pub use archive::ArchiveFormat;
pub use error::{Error, Result};
pub use local::{LocalFileSystem, ScanConfig};
pub use observer::{FileSystem, ScanObserver};
