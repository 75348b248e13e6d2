//! resalloc Core
//!
//! Shared vocabulary for resource-estimation bookkeeping:
//! - Issue, resource, membership and estimation records
//! - Repository ports the propagator reads and writes through
//! - Propagation configuration (tracker taxonomy, depth bound)
//! - Change-journal details
//! - Error taxonomy
//!
//! # Example
//!
//! ```rust
//! use resalloc_core::{Issue, IssueId, ProjectId, TrackerId};
//!
//! let issue = Issue::new(ProjectId(1), TrackerId(1))
//!     .with_parent(IssueId(10))
//!     .with_estimated_hours(4.0);
//!
//! assert!(issue.is_new());
//! assert_eq!(issue.hours(), 4.0);
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod journal;
pub mod repository;
pub mod types;

pub use config::PropagationConfig;
pub use error::{EstimationError, StoreError};
pub use journal::{ChangeMode, Journal, JournalDetail, JournalSink, SaveContext};
pub use repository::{
    IssueRepository, IssueResourceRepository, MembershipRepository, SettingRepository, Store,
};
pub use types::{
    Department, DepartmentId, Issue, IssueId, IssueResource, IssueResourceId, Member, MemberId,
    ProjectId, Resource, ResourceId, ResourceSetting, SettingObjectType, TrackerId, UserId,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
