//! Domain records
//!
//! Defines the records the propagator works over:
//! - Issues and their parent/child hierarchy
//! - Departments, resources and project memberships
//! - Per-resource estimation aggregates
//! - Per-project resource settings

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id!(
    /// Issue identifier
    IssueId
);
define_id!(
    /// Tracker (issue category) identifier
    TrackerId
);
define_id!(
    /// Project identifier
    ProjectId
);
define_id!(
    /// User identifier
    UserId
);
define_id!(
    /// Staffable resource identifier
    ResourceId
);
define_id!(
    /// Department identifier
    DepartmentId
);
define_id!(
    /// Project membership identifier
    MemberId
);
define_id!(
    /// Resource estimation row identifier
    IssueResourceId
);

/// An issue in the tracker
///
/// `id` is `None` until the issue has been saved for the first time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue id, `None` while unsaved
    #[serde(default)]
    pub id: Option<IssueId>,
    /// Parent issue, `None` for a root
    #[serde(default)]
    pub parent_id: Option<IssueId>,
    /// Tracker the issue is filed under
    pub tracker_id: TrackerId,
    /// Owning project
    pub project_id: ProjectId,
    /// Assignee
    #[serde(default)]
    pub assigned_to_id: Option<UserId>,
    /// Estimated hours; unset counts as zero in sums
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    /// Blocked issues keep their hours when children change
    #[serde(default)]
    pub blocked: bool,
}

impl Issue {
    /// Create an unsaved issue
    #[inline]
    #[must_use]
    pub fn new(project_id: ProjectId, tracker_id: TrackerId) -> Self {
        Self {
            id: None,
            parent_id: None,
            tracker_id,
            project_id,
            assigned_to_id: None,
            estimated_hours: None,
            blocked: false,
        }
    }

    /// With an id (marks the issue as persisted)
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: IssueId) -> Self {
        self.id = Some(id);
        self
    }

    /// With parent
    #[inline]
    #[must_use]
    pub fn with_parent(mut self, parent_id: IssueId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// With assignee
    #[inline]
    #[must_use]
    pub fn with_assignee(mut self, user_id: UserId) -> Self {
        self.assigned_to_id = Some(user_id);
        self
    }

    /// With estimated hours
    #[inline]
    #[must_use]
    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Mark as blocked
    #[inline]
    #[must_use]
    pub fn blocked(mut self) -> Self {
        self.blocked = true;
        self
    }

    /// Whether the issue has never been saved
    #[inline]
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Estimated hours, with an unset value counting as zero
    #[inline]
    #[must_use]
    pub fn hours(&self) -> f64 {
        self.estimated_hours.unwrap_or(0.0)
    }
}

/// Organisational unit owning resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Department id
    pub id: DepartmentId,
    /// Display name, used as the grouping key
    pub name: String,
}

/// A staffable entity (role or person slot), distinct from a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource id
    pub id: ResourceId,
    /// Display name
    pub name: String,
    /// Owning department
    pub department_id: DepartmentId,
}

/// Links a user to a project and optionally to an assignable resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Membership id
    pub id: MemberId,
    /// Member user
    pub user_id: UserId,
    /// Project the user belongs to
    pub project_id: ProjectId,
    /// Resource the user staffs in this project
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
}

/// Hours a resource is responsible for within the sibling set of an issue
///
/// `id` is `None` until the row has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueResource {
    /// Row id, `None` while unsaved
    #[serde(default)]
    pub id: Option<IssueResourceId>,
    /// Issue the row is keyed to
    pub issue_id: IssueId,
    /// Resource the hours belong to
    pub resource_id: ResourceId,
    /// Aggregated hours
    pub estimation: f64,
}

impl IssueResource {
    /// Initialize an unsaved row with zero estimation
    #[inline]
    #[must_use]
    pub fn new(issue_id: IssueId, resource_id: ResourceId) -> Self {
        Self {
            id: None,
            issue_id,
            resource_id,
            estimation: 0.0,
        }
    }
}

/// Kind of object a resource setting applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingObjectType {
    /// `object_id` is a tracker id
    Tracker,
}

/// Per-project switch stored as (kind, object type, object id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSetting {
    /// Project the setting applies to
    pub project_id: ProjectId,
    /// Setting kind
    pub setting: u32,
    /// Kind of object switched on
    pub object_type: SettingObjectType,
    /// Id of the object switched on
    pub object_id: u64,
}

impl ResourceSetting {
    /// Setting that enables a tracker for the given setting kind
    #[inline]
    #[must_use]
    pub fn tracker(project_id: ProjectId, setting: u32, tracker_id: TrackerId) -> Self {
        Self {
            project_id,
            setting,
            object_type: SettingObjectType::Tracker,
            object_id: tracker_id.0,
        }
    }
}
