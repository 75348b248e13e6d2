//! resalloc Propagator
//!
//! Keeps resource-estimation bookkeeping consistent when an issue's
//! estimated hours change:
//! - Resolves the resource responsible for the issue through project membership
//! - Upserts or deletes the per-resource aggregate for the issue's sibling set
//! - Rolls children's hours up into each ancestor until the root or a blocked parent
//!
//! # Example
//!
//! ```rust
//! use resalloc_core::{Issue, IssueRepository, ProjectId, SaveContext, TrackerId};
//! use resalloc_propagator::{EstimationPropagator, IssueLifecycle};
//! use resalloc_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let lifecycle = IssueLifecycle::new(EstimationPropagator::new(Arc::clone(&store)));
//!
//! let parent = lifecycle
//!     .save(Issue::new(ProjectId(1), TrackerId(1)), &mut SaveContext::new())
//!     .unwrap();
//! let parent_id = parent.id.unwrap();
//!
//! let child = Issue::new(ProjectId(1), TrackerId(1))
//!     .with_parent(parent_id)
//!     .with_estimated_hours(3.0);
//! lifecycle.save(child, &mut SaveContext::new()).unwrap();
//!
//! assert_eq!(store.issue(parent_id).unwrap().unwrap().hours(), 3.0);
//! ```

#![warn(unreachable_pub)]

pub mod lifecycle;
pub mod propagator;
pub mod query;
pub mod rollup;

pub use lifecycle::IssueLifecycle;
pub use propagator::{EstimationPropagator, PendingEstimation};
pub use rollup::children_total;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
