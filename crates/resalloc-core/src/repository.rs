//! Repository ports
//!
//! The propagator reads and writes host records only through these traits.
//! Adapters decide how records are stored; every method reports failures as
//! [`StoreError`] and the propagator propagates them unchanged.

use crate::error::StoreError;
use crate::types::{
    Department, DepartmentId, Issue, IssueId, IssueResource, IssueResourceId, Member, ProjectId,
    Resource, ResourceId, TrackerId, UserId,
};

/// Issue reads and writes
pub trait IssueRepository {
    /// Load an issue by id
    fn issue(&self, id: IssueId) -> Result<Option<Issue>, StoreError>;

    /// Children of an issue, ordered by id
    fn children(&self, parent_id: IssueId) -> Result<Vec<Issue>, StoreError>;

    /// Whether the issue has at least one child
    fn has_children(&self, parent_id: IssueId) -> Result<bool, StoreError> {
        Ok(!self.children(parent_id)?.is_empty())
    }

    /// Persist a new issue and return its assigned id
    fn insert_issue(&self, issue: &Issue) -> Result<IssueId, StoreError>;

    /// Overwrite a persisted issue
    fn update_issue(&self, issue: &Issue) -> Result<(), StoreError>;

    /// Write only the estimated-hours column, skipping save hooks
    fn update_estimated_hours_column(&self, id: IssueId, hours: f64) -> Result<(), StoreError>;

    /// Remove an issue
    fn delete_issue(&self, id: IssueId) -> Result<(), StoreError>;
}

/// Membership, resource and department lookups
pub trait MembershipRepository {
    /// First membership of a user in a project
    fn member(&self, user_id: UserId, project_id: ProjectId) -> Result<Option<Member>, StoreError>;

    /// Load a resource by id
    fn resource(&self, id: ResourceId) -> Result<Option<Resource>, StoreError>;

    /// Load a department by id
    fn department(&self, id: DepartmentId) -> Result<Option<Department>, StoreError>;
}

/// Resource estimation rows
pub trait IssueResourceRepository {
    /// First row keyed to (issue, resource)
    fn find_issue_resource(
        &self,
        issue_id: IssueId,
        resource_id: ResourceId,
    ) -> Result<Option<IssueResource>, StoreError>;

    /// Rows keyed to an issue, in insertion order
    fn issue_resources(&self, issue_id: IssueId) -> Result<Vec<IssueResource>, StoreError>;

    /// Persist a new row and return its assigned id
    fn insert_issue_resource(&self, row: &IssueResource) -> Result<IssueResourceId, StoreError>;

    /// Overwrite a persisted row
    fn update_issue_resource(&self, row: &IssueResource) -> Result<(), StoreError>;

    /// Remove a row
    fn delete_issue_resource(&self, id: IssueResourceId) -> Result<(), StoreError>;
}

/// Per-project resource settings
pub trait SettingRepository {
    /// Trackers for which `setting` is switched on in the project
    fn enabled_trackers(
        &self,
        project_id: ProjectId,
        setting: u32,
    ) -> Result<Vec<TrackerId>, StoreError>;
}

/// Everything the propagator needs from the host
pub trait Store:
    IssueRepository + MembershipRepository + IssueResourceRepository + SettingRepository
{
}

impl<T> Store for T where
    T: IssueRepository + MembershipRepository + IssueResourceRepository + SettingRepository
{
}
