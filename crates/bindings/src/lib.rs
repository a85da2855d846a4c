//! Memoizing timestamp resolution for build targets.
//!
//! A [`TimestampResolver`] maps paths (including `archive(member)` paths) to
//! modification times. Instead of stat-ing every path it is asked about, it
//! enumerates the containing directory, and the containing archive for
//! members, once, recording every entry the scan reports in a
//! [`BindingStore`]. Later questions about siblings are answered from the
//! store.
//!
//! # Example
//!
//! ```no_run
//! use bindstamp_bindings::{Progress, TimestampResolver};
//! use bindstamp_filesys::LocalFileSystem;
//!
//! let resolver = TimestampResolver::new(LocalFileSystem::default());
//! let time = resolver.resolve("/usr/lib/libc.a(printf.o)");
//! if resolver.progress("/usr/lib/libc.a(printf.o)") == Some(Progress::Found) {
//!     println!("printf.o: {time}");
//! }
//! ```

mod binding;
mod config;
mod observer;
mod progress;
mod resolver;
mod store;

pub use binding::{Binding, BindingId};
pub use config::{ResolverConfig, ResolverStats};
pub use progress::Progress;
pub use resolver::TimestampResolver;
pub use store::BindingStore;
