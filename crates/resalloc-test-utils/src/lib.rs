//! Testing utilities for resalloc workspace
//!
//! Shared fixtures: one project with two departments, three resources and
//! users mapped onto them.

#![allow(missing_docs)]

use resalloc_core::{
    Department, DepartmentId, Issue, IssueId, IssueRepository, IssueResource, IssueResourceId,
    IssueResourceRepository, Member, MemberId, ProjectId, Resource, ResourceId, ResourceSetting,
    TrackerId, UserId,
};
use resalloc_store::MemoryStore;
use std::sync::Arc;

/// Seeded in-memory store
///
/// | user | resource |
/// |---|---|
/// | `BACKEND_USER` | `BACKEND` (Engineering) |
/// | `FRONTEND_USER` | `FRONTEND` (Engineering) |
/// | `DESIGN_USER` | `DESIGN` (Design) |
/// | `UNSTAFFED_USER` | member without resource |
/// | `ORPHANED_USER` | member linked to a resource that does not exist |
#[derive(Debug, Clone)]
pub struct Fixture {
    store: Arc<MemoryStore>,
}

impl Fixture {
    pub const PROJECT: ProjectId = ProjectId(1);
    pub const OTHER_PROJECT: ProjectId = ProjectId(2);

    pub const ENGINEERING: DepartmentId = DepartmentId(1);
    pub const DESIGN_DEPT: DepartmentId = DepartmentId(2);
    pub const ENGINEERING_DEPARTMENT: &'static str = "Engineering";
    pub const DESIGN_DEPARTMENT: &'static str = "Design";

    pub const BACKEND: ResourceId = ResourceId(10);
    pub const FRONTEND: ResourceId = ResourceId(11);
    pub const DESIGN: ResourceId = ResourceId(20);
    pub const MISSING_RESOURCE: ResourceId = ResourceId(99);

    pub const BACKEND_USER: UserId = UserId(100);
    pub const FRONTEND_USER: UserId = UserId(101);
    pub const DESIGN_USER: UserId = UserId(200);
    pub const UNSTAFFED_USER: UserId = UserId(300);
    pub const ORPHANED_USER: UserId = UserId(301);
    pub const STRANGER: UserId = UserId(400);

    pub fn new() -> Self {
        let store = MemoryStore::new();
        store.put_department(Department {
            id: Self::ENGINEERING,
            name: Self::ENGINEERING_DEPARTMENT.to_string(),
        });
        store.put_department(Department {
            id: Self::DESIGN_DEPT,
            name: Self::DESIGN_DEPARTMENT.to_string(),
        });
        for (id, name, department_id) in [
            (Self::BACKEND, "Backend developer", Self::ENGINEERING),
            (Self::FRONTEND, "Frontend developer", Self::ENGINEERING),
            (Self::DESIGN, "Designer", Self::DESIGN_DEPT),
        ] {
            store.put_resource(Resource {
                id,
                name: name.to_string(),
                department_id,
            });
        }
        for (member, user_id, resource_id) in [
            (1, Self::BACKEND_USER, Some(Self::BACKEND)),
            (2, Self::FRONTEND_USER, Some(Self::FRONTEND)),
            (3, Self::DESIGN_USER, Some(Self::DESIGN)),
            (4, Self::UNSTAFFED_USER, None),
            (5, Self::ORPHANED_USER, Some(Self::MISSING_RESOURCE)),
        ] {
            store.put_member(Member {
                id: MemberId(member),
                user_id,
                project_id: Self::PROJECT,
                resource_id,
            });
        }
        Self {
            store: Arc::new(store),
        }
    }

    /// Switch resource estimation on for a tracker in `PROJECT`
    #[must_use]
    pub fn enable_tracker(self, tracker: TrackerId) -> Self {
        self.store
            .put_setting(ResourceSetting::tracker(Self::PROJECT, 1, tracker));
        self
    }

    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    /// Insert an issue directly, bypassing save hooks
    pub fn issue(&self, issue: Issue) -> IssueId {
        self.store.insert_issue(&issue).unwrap()
    }

    /// Insert an estimation row directly
    pub fn estimation(
        &self,
        issue_id: IssueId,
        resource_id: ResourceId,
        estimation: f64,
    ) -> IssueResourceId {
        let mut row = IssueResource::new(issue_id, resource_id);
        row.estimation = estimation;
        self.store.insert_issue_resource(&row).unwrap()
    }

    /// Current stored hours of an issue
    pub fn hours(&self, id: IssueId) -> Option<f64> {
        self.store.issue(id).unwrap().and_then(|issue| issue.estimated_hours)
    }

    /// Current estimation of the (issue, resource) row, if any
    pub fn row_estimation(&self, issue_id: IssueId, resource_id: ResourceId) -> Option<f64> {
        self.store
            .find_issue_resource(issue_id, resource_id)
            .unwrap()
            .map(|row| row.estimation)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Issue in `Fixture::PROJECT` on the given tracker
pub fn issue(tracker: u64) -> Issue {
    Issue::new(Fixture::PROJECT, TrackerId(tracker))
}
