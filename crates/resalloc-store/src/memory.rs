//! In-memory repository adapter
//!
//! Tables live behind one `parking_lot::RwLock`, so the store can be shared
//! across threads. Each call takes the lock once; there is no transaction
//! spanning several calls.

use parking_lot::RwLock;
use resalloc_core::{
    Department, DepartmentId, Issue, IssueId, IssueRepository, IssueResource, IssueResourceId,
    IssueResourceRepository, Member, MembershipRepository, ProjectId, Resource, ResourceId,
    ResourceSetting, SettingObjectType, SettingRepository, StoreError, TrackerId, UserId,
};
use std::collections::BTreeMap;

/// Repository adapter keeping every table in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    issues: BTreeMap<IssueId, Issue>,
    departments: BTreeMap<DepartmentId, Department>,
    resources: BTreeMap<ResourceId, Resource>,
    members: Vec<Member>,
    settings: Vec<ResourceSetting>,
    issue_resources: BTreeMap<IssueResourceId, IssueResource>,
    last_issue_id: u64,
    last_issue_resource_id: u64,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a department
    pub fn put_department(&self, department: Department) {
        self.tables.write().departments.insert(department.id, department);
    }

    /// Add or replace a resource
    pub fn put_resource(&self, resource: Resource) {
        self.tables.write().resources.insert(resource.id, resource);
    }

    /// Append a membership
    pub fn put_member(&self, member: Member) {
        self.tables.write().members.push(member);
    }

    /// Append a resource setting
    pub fn put_setting(&self, setting: ResourceSetting) {
        self.tables.write().settings.push(setting);
    }

    /// Add or replace an issue that already carries an id
    ///
    /// # Errors
    /// `StoreError::Constraint` if the issue has no id.
    pub fn put_issue(&self, issue: Issue) -> Result<IssueId, StoreError> {
        let id = issue
            .id
            .ok_or_else(|| StoreError::Constraint("issue without id cannot be restored".into()))?;
        let mut tables = self.tables.write();
        tables.last_issue_id = tables.last_issue_id.max(id.0);
        tables.issues.insert(id, issue);
        Ok(id)
    }

    /// Add or replace an estimation row that already carries an id
    ///
    /// # Errors
    /// `StoreError::Constraint` if the row has no id.
    pub fn put_issue_resource(&self, row: IssueResource) -> Result<IssueResourceId, StoreError> {
        let id = row.id.ok_or_else(|| {
            StoreError::Constraint("issue resource without id cannot be restored".into())
        })?;
        let mut tables = self.tables.write();
        tables.last_issue_resource_id = tables.last_issue_resource_id.max(id.0);
        tables.issue_resources.insert(id, row);
        Ok(id)
    }

    /// All issues, ordered by id
    #[must_use]
    pub fn issues(&self) -> Vec<Issue> {
        self.tables.read().issues.values().cloned().collect()
    }

    /// All estimation rows, ordered by id
    #[must_use]
    pub fn all_issue_resources(&self) -> Vec<IssueResource> {
        self.tables.read().issue_resources.values().cloned().collect()
    }

    /// All departments, ordered by id
    #[must_use]
    pub fn departments(&self) -> Vec<Department> {
        self.tables.read().departments.values().cloned().collect()
    }

    /// All resources, ordered by id
    #[must_use]
    pub fn resources(&self) -> Vec<Resource> {
        self.tables.read().resources.values().cloned().collect()
    }

    /// All memberships, in insertion order
    #[must_use]
    pub fn members(&self) -> Vec<Member> {
        self.tables.read().members.clone()
    }

    /// All resource settings, in insertion order
    #[must_use]
    pub fn settings(&self) -> Vec<ResourceSetting> {
        self.tables.read().settings.clone()
    }
}

impl IssueRepository for MemoryStore {
    fn issue(&self, id: IssueId) -> Result<Option<Issue>, StoreError> {
        Ok(self.tables.read().issues.get(&id).cloned())
    }

    fn children(&self, parent_id: IssueId) -> Result<Vec<Issue>, StoreError> {
        Ok(self
            .tables
            .read()
            .issues
            .values()
            .filter(|issue| issue.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    fn has_children(&self, parent_id: IssueId) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .read()
            .issues
            .values()
            .any(|issue| issue.parent_id == Some(parent_id)))
    }

    fn insert_issue(&self, issue: &Issue) -> Result<IssueId, StoreError> {
        if let Some(id) = issue.id {
            return Err(StoreError::Constraint(format!("issue {id} is already persisted")));
        }
        let mut tables = self.tables.write();
        tables.last_issue_id += 1;
        let id = IssueId(tables.last_issue_id);
        let mut stored = issue.clone();
        stored.id = Some(id);
        tables.issues.insert(id, stored);
        tracing::trace!(issue = %id, "inserted issue");
        Ok(id)
    }

    fn update_issue(&self, issue: &Issue) -> Result<(), StoreError> {
        let id = issue
            .id
            .ok_or_else(|| StoreError::Constraint("cannot update an unsaved issue".into()))?;
        let mut tables = self.tables.write();
        let slot = tables
            .issues
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("issue", id))?;
        *slot = issue.clone();
        Ok(())
    }

    fn update_estimated_hours_column(&self, id: IssueId, hours: f64) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let slot = tables
            .issues
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("issue", id))?;
        slot.estimated_hours = Some(hours);
        Ok(())
    }

    fn delete_issue(&self, id: IssueId) -> Result<(), StoreError> {
        self.tables
            .write()
            .issues
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("issue", id))
    }
}

impl MembershipRepository for MemoryStore {
    fn member(&self, user_id: UserId, project_id: ProjectId) -> Result<Option<Member>, StoreError> {
        Ok(self
            .tables
            .read()
            .members
            .iter()
            .find(|m| m.user_id == user_id && m.project_id == project_id)
            .cloned())
    }

    fn resource(&self, id: ResourceId) -> Result<Option<Resource>, StoreError> {
        Ok(self.tables.read().resources.get(&id).cloned())
    }

    fn department(&self, id: DepartmentId) -> Result<Option<Department>, StoreError> {
        Ok(self.tables.read().departments.get(&id).cloned())
    }
}

impl IssueResourceRepository for MemoryStore {
    fn find_issue_resource(
        &self,
        issue_id: IssueId,
        resource_id: ResourceId,
    ) -> Result<Option<IssueResource>, StoreError> {
        Ok(self
            .tables
            .read()
            .issue_resources
            .values()
            .find(|row| row.issue_id == issue_id && row.resource_id == resource_id)
            .cloned())
    }

    fn issue_resources(&self, issue_id: IssueId) -> Result<Vec<IssueResource>, StoreError> {
        Ok(self
            .tables
            .read()
            .issue_resources
            .values()
            .filter(|row| row.issue_id == issue_id)
            .cloned()
            .collect())
    }

    fn insert_issue_resource(&self, row: &IssueResource) -> Result<IssueResourceId, StoreError> {
        if let Some(id) = row.id {
            return Err(StoreError::Constraint(format!(
                "issue resource {id} is already persisted"
            )));
        }
        let mut tables = self.tables.write();
        tables.last_issue_resource_id += 1;
        let id = IssueResourceId(tables.last_issue_resource_id);
        let mut stored = row.clone();
        stored.id = Some(id);
        tables.issue_resources.insert(id, stored);
        tracing::trace!(row = %id, issue = %row.issue_id, "inserted issue resource");
        Ok(id)
    }

    fn update_issue_resource(&self, row: &IssueResource) -> Result<(), StoreError> {
        let id = row
            .id
            .ok_or_else(|| StoreError::Constraint("cannot update an unsaved issue resource".into()))?;
        let mut tables = self.tables.write();
        let slot = tables
            .issue_resources
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("issue resource", id))?;
        *slot = row.clone();
        Ok(())
    }

    fn delete_issue_resource(&self, id: IssueResourceId) -> Result<(), StoreError> {
        self.tables
            .write()
            .issue_resources
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("issue resource", id))
    }
}

impl SettingRepository for MemoryStore {
    fn enabled_trackers(
        &self,
        project_id: ProjectId,
        setting: u32,
    ) -> Result<Vec<TrackerId>, StoreError> {
        let tables = self.tables.read();
        let mut trackers = Vec::new();
        for row in tables.settings.iter().filter(|s| {
            s.project_id == project_id
                && s.setting == setting
                && s.object_type == SettingObjectType::Tracker
        }) {
            let tracker = TrackerId(row.object_id);
            if !trackers.contains(&tracker) {
                trackers.push(tracker);
            }
        }
        Ok(trackers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue() -> Issue {
        Issue::new(ProjectId(1), TrackerId(1))
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.insert_issue(&issue()).unwrap();
        let b = store.insert_issue(&issue()).unwrap();
        assert_eq!(a, IssueId(1));
        assert_eq!(b, IssueId(2));
        assert_eq!(store.issue(b).unwrap().unwrap().id, Some(b));
    }

    #[test]
    fn insert_rejects_persisted_issue() {
        let store = MemoryStore::new();
        let err = store.insert_issue(&issue().with_id(IssueId(5))).unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[test]
    fn restored_ids_advance_sequence() {
        let store = MemoryStore::new();
        store.put_issue(issue().with_id(IssueId(10))).unwrap();
        assert_eq!(store.insert_issue(&issue()).unwrap(), IssueId(11));
    }

    #[test]
    fn children_filter_by_parent() {
        let store = MemoryStore::new();
        let parent = store.insert_issue(&issue()).unwrap();
        store.insert_issue(&issue().with_parent(parent)).unwrap();
        store.insert_issue(&issue().with_parent(parent)).unwrap();
        store.insert_issue(&issue()).unwrap();

        assert_eq!(store.children(parent).unwrap().len(), 2);
        assert!(store.has_children(parent).unwrap());
        assert!(!store.has_children(IssueId(99)).unwrap());
    }

    #[test]
    fn column_update_touches_hours_only() {
        let store = MemoryStore::new();
        let id = store.insert_issue(&issue().blocked()).unwrap();
        store.update_estimated_hours_column(id, 8.0).unwrap();

        let stored = store.issue(id).unwrap().unwrap();
        assert_eq!(stored.estimated_hours, Some(8.0));
        assert!(stored.blocked);
    }

    #[test]
    fn missing_issue_update_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update_estimated_hours_column(IssueId(3), 1.0).unwrap_err();
        assert_eq!(err, StoreError::not_found("issue", IssueId(3)));
        assert!(store.delete_issue(IssueId(3)).is_err());
    }

    #[test]
    fn issue_resource_lifecycle() {
        let store = MemoryStore::new();
        let mut row = IssueResource::new(IssueId(1), ResourceId(2));
        row.estimation = 4.0;
        let id = store.insert_issue_resource(&row).unwrap();

        let mut found = store
            .find_issue_resource(IssueId(1), ResourceId(2))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, Some(id));

        found.estimation = 6.0;
        store.update_issue_resource(&found).unwrap();
        assert_eq!(store.issue_resources(IssueId(1)).unwrap()[0].estimation, 6.0);

        store.delete_issue_resource(id).unwrap();
        assert!(store.issue_resources(IssueId(1)).unwrap().is_empty());
    }

    #[test]
    fn first_membership_wins() {
        let store = MemoryStore::new();
        store.put_member(Member {
            id: resalloc_core::MemberId(1),
            user_id: UserId(1),
            project_id: ProjectId(1),
            resource_id: Some(ResourceId(7)),
        });
        store.put_member(Member {
            id: resalloc_core::MemberId(2),
            user_id: UserId(1),
            project_id: ProjectId(1),
            resource_id: Some(ResourceId(8)),
        });
        let member = store.member(UserId(1), ProjectId(1)).unwrap().unwrap();
        assert_eq!(member.resource_id, Some(ResourceId(7)));
        assert!(store.member(UserId(1), ProjectId(2)).unwrap().is_none());
    }

    #[test]
    fn enabled_trackers_filters_and_dedups() {
        let store = MemoryStore::new();
        store.put_setting(ResourceSetting::tracker(ProjectId(1), 1, TrackerId(3)));
        store.put_setting(ResourceSetting::tracker(ProjectId(1), 1, TrackerId(3)));
        store.put_setting(ResourceSetting::tracker(ProjectId(1), 2, TrackerId(4)));
        store.put_setting(ResourceSetting::tracker(ProjectId(2), 1, TrackerId(5)));

        assert_eq!(
            store.enabled_trackers(ProjectId(1), 1).unwrap(),
            vec![TrackerId(3)]
        );
    }
}
