//! resalloc Store
//!
//! In-memory adapter for every repository port, plus snapshot files that
//! seed and dump its tables.
//!
//! # Example
//!
//! ```rust
//! use resalloc_core::{Issue, IssueRepository, ProjectId, TrackerId};
//! use resalloc_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let id = store
//!     .insert_issue(&Issue::new(ProjectId(1), TrackerId(1)).with_estimated_hours(3.0))
//!     .unwrap();
//! assert_eq!(store.issue(id).unwrap().unwrap().hours(), 3.0);
//! ```

#![warn(unreachable_pub)]

mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{Snapshot, SnapshotFormat};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
