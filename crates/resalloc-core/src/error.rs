//! Error types for resalloc
//!
//! Store failures are whatever the backing adapter raises; they propagate
//! unchanged and abort the enclosing save. A missing resource link or a
//! missing parent is not an error.

use crate::types::{DepartmentId, IssueId, ResourceId};

/// Errors raised by a repository adapter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Record expected to exist was not found
    #[error("{entity} {id} not found")]
    NotFound {
        /// Record kind
        entity: &'static str,
        /// Record id
        id: u64,
    },

    /// Write rejected by the store
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Snapshot could not be imported or exported
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl StoreError {
    /// Create not-found error
    #[inline]
    pub fn not_found(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Main propagation error type
#[derive(Debug, thiserror::Error)]
pub enum EstimationError {
    /// Repository failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Walking up the parent chain came back to an issue already visited
    #[error("parent cycle detected at issue {issue}")]
    ParentCycle {
        /// Issue reached twice
        issue: IssueId,
    },

    /// Walking up the parent chain went deeper than allowed
    #[error("parent chain exceeds max depth {max_depth} at issue {issue}")]
    DepthExceeded {
        /// Ancestor at which the bound was hit
        issue: IssueId,
        /// Configured bound
        max_depth: usize,
    },

    /// Operation needs a persisted issue
    #[error("issue has not been saved")]
    UnsavedIssue,

    /// Estimation row points at a resource that does not exist
    #[error("resource {0} not found")]
    MissingResource(ResourceId),

    /// Resource points at a department that does not exist
    #[error("department {0} not found")]
    MissingDepartment(DepartmentId),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl EstimationError {
    /// Whether the error points at inconsistent stored data
    #[inline]
    #[must_use]
    pub fn is_data_corruption(&self) -> bool {
        matches!(
            self,
            Self::ParentCycle { .. }
                | Self::DepthExceeded { .. }
                | Self::MissingResource(_)
                | Self::MissingDepartment(_)
        )
    }
}
