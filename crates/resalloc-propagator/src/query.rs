//! Read-side accessors for an issue's estimation rows

use crate::propagator::EstimationPropagator;
use indexmap::IndexMap;
use resalloc_core::{
    Department, DepartmentId, EstimationError, IssueId, IssueResource, IssueResourceRepository,
    MembershipRepository, Resource, ResourceId, Store,
};
use std::collections::HashMap;

impl<S: Store> EstimationPropagator<S> {
    /// Estimation rows keyed to an issue, in insertion order
    ///
    /// # Errors
    /// Store failures.
    pub fn issue_resources(&self, issue_id: IssueId) -> Result<Vec<IssueResource>, EstimationError> {
        Ok(self.store().issue_resources(issue_id)?)
    }

    /// Distinct resources reached through an issue's estimation rows
    ///
    /// # Errors
    /// `EstimationError::MissingResource` for a row pointing nowhere, or
    /// store failures.
    pub fn resources(&self, issue_id: IssueId) -> Result<Vec<Resource>, EstimationError> {
        let mut resources: Vec<Resource> = Vec::new();
        for row in self.store().issue_resources(issue_id)? {
            if resources.iter().any(|r| r.id == row.resource_id) {
                continue;
            }
            resources.push(self.load_resource(row.resource_id)?);
        }
        Ok(resources)
    }

    /// An issue's estimation rows grouped by the owning department's name
    ///
    /// Groups and the rows inside them keep the order the store returned.
    ///
    /// # Errors
    /// `EstimationError::MissingResource` / `MissingDepartment` for dangling
    /// references, or store failures.
    pub fn resources_with_departments(
        &self,
        issue_id: IssueId,
    ) -> Result<IndexMap<String, Vec<IssueResource>>, EstimationError> {
        let mut departments: HashMap<DepartmentId, Department> = HashMap::new();
        let mut grouped: IndexMap<String, Vec<IssueResource>> = IndexMap::new();

        for row in self.store().issue_resources(issue_id)? {
            let resource = self.load_resource(row.resource_id)?;
            let department = match departments.get(&resource.department_id) {
                Some(department) => department.clone(),
                None => {
                    let department = self
                        .store()
                        .department(resource.department_id)?
                        .ok_or(EstimationError::MissingDepartment(resource.department_id))?;
                    departments.insert(department.id, department.clone());
                    department
                }
            };
            grouped.entry(department.name).or_default().push(row);
        }

        Ok(grouped)
    }

    fn load_resource(&self, id: ResourceId) -> Result<Resource, EstimationError> {
        self.store()
            .resource(id)?
            .ok_or(EstimationError::MissingResource(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use resalloc_test_utils::Fixture;

    #[test]
    fn groups_by_department_in_row_order() {
        let fx = Fixture::new();
        let issue = IssueId(1);
        fx.estimation(issue, Fixture::DESIGN, 1.0);
        fx.estimation(issue, Fixture::BACKEND, 2.0);
        fx.estimation(issue, Fixture::FRONTEND, 3.0);
        fx.estimation(IssueId(2), Fixture::BACKEND, 9.0);

        let propagator = EstimationPropagator::new(fx.store());
        let grouped = propagator.resources_with_departments(issue).unwrap();

        let names: Vec<&str> = grouped.keys().map(String::as_str).collect();
        assert_eq!(names, vec![Fixture::DESIGN_DEPARTMENT, Fixture::ENGINEERING_DEPARTMENT]);
        let engineering: Vec<f64> = grouped[Fixture::ENGINEERING_DEPARTMENT]
            .iter()
            .map(|row| row.estimation)
            .collect();
        assert_eq!(engineering, vec![2.0, 3.0]);
    }

    #[test]
    fn empty_issue_has_no_groups() {
        let fx = Fixture::new();
        let propagator = EstimationPropagator::new(fx.store());
        assert!(propagator.resources_with_departments(IssueId(1)).unwrap().is_empty());
    }

    #[test]
    fn dangling_resource_is_reported() {
        let fx = Fixture::new();
        fx.estimation(IssueId(1), ResourceId(999), 1.0);
        let propagator = EstimationPropagator::new(fx.store());
        let err = propagator.resources_with_departments(IssueId(1)).unwrap_err();
        assert!(matches!(err, EstimationError::MissingResource(ResourceId(999))));
    }

    #[test]
    fn resources_are_distinct() {
        let fx = Fixture::new();
        fx.estimation(IssueId(1), Fixture::BACKEND, 1.0);
        fx.estimation(IssueId(1), Fixture::BACKEND, 2.0);
        fx.estimation(IssueId(1), Fixture::DESIGN, 2.0);

        let propagator = EstimationPropagator::new(fx.store());
        let ids: Vec<ResourceId> = propagator
            .resources(IssueId(1))
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![Fixture::BACKEND, Fixture::DESIGN]);
        assert_eq!(propagator.issue_resources(IssueId(1)).unwrap().len(), 3);
    }
}
