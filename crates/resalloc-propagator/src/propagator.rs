//! Estimation propagator
//!
//! Maintains the per-resource aggregate ([`IssueResource`]) for the sibling
//! set an issue belongs to, and re-derives the issue's own estimated hours.
//!
//! The aggregate for resource `R` under parent `P` is keyed `(P, R)` and
//! holds the hours of every child of `P` whose assignee's membership
//! resolves to `R`. A zero aggregate is never stored.

use resalloc_core::{
    ChangeMode, EstimationError, Issue, IssueId, IssueRepository, IssueResource,
    IssueResourceRepository, JournalDetail, MembershipRepository, ProjectId, PropagationConfig,
    ResourceId, SaveContext, Store, UserId,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Estimation row write deferred until the issue has an id
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum PendingEstimation {
    /// Insert a new row keyed to the saved issue
    Create {
        /// Resource the row is for
        resource_id: ResourceId,
        /// Aggregated hours
        estimation: f64,
    },
    /// Write back an existing row, re-keyed to the saved issue
    Update {
        /// Row with its new estimation
        row: IssueResource,
    },
}

/// Resource-estimation service over a [`Store`]
#[derive(Debug)]
pub struct EstimationPropagator<S> {
    store: Arc<S>,
    config: PropagationConfig,
}

impl<S> Clone for EstimationPropagator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: Store> EstimationPropagator<S> {
    /// Create propagator with default configuration
    #[inline]
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            config: PropagationConfig::default(),
        }
    }

    /// Create propagator with explicit configuration
    ///
    /// # Errors
    /// Returns `EstimationError::Config` if the configuration is invalid.
    pub fn with_config(store: Arc<S>, config: PropagationConfig) -> Result<Self, EstimationError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Backing store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Resource for the issue's assignee, or the acting user when unassigned
    ///
    /// No user, no membership, or a membership without an existing resource
    /// all resolve to `None`.
    ///
    /// # Errors
    /// Store failures.
    pub fn resolve_resource(
        &self,
        issue: &Issue,
        acting_user: Option<UserId>,
    ) -> Result<Option<ResourceId>, EstimationError> {
        match issue.assigned_to_id.or(acting_user) {
            Some(user) => self.member_resource(user, issue.project_id),
            None => Ok(None),
        }
    }

    fn member_resource(
        &self,
        user: UserId,
        project: ProjectId,
    ) -> Result<Option<ResourceId>, EstimationError> {
        let Some(resource_id) = self
            .store
            .member(user, project)?
            .and_then(|member| member.resource_id)
        else {
            return Ok(None);
        };
        Ok(self.store.resource(resource_id)?.map(|resource| resource.id))
    }

    /// Hours of the issue's siblings whose assignee resolves to `resource_id`
    ///
    /// The issue itself is never counted, so its stored (pre-save) hours drop
    /// out of the sum. An issue without a parent has no siblings.
    ///
    /// # Errors
    /// Store failures.
    pub fn sibling_hours_for_resource(
        &self,
        issue: &Issue,
        resource_id: ResourceId,
    ) -> Result<f64, EstimationError> {
        let Some(parent_id) = issue.parent_id else {
            return Ok(0.0);
        };

        let mut resolved: HashMap<(UserId, ProjectId), Option<ResourceId>> = HashMap::new();
        let mut total = 0.0;
        for sibling in self.store.children(parent_id)? {
            if sibling.id.is_some() && sibling.id == issue.id {
                continue;
            }
            let Some(assignee) = sibling.assigned_to_id else {
                continue;
            };
            let key = (assignee, sibling.project_id);
            let sibling_resource = match resolved.get(&key) {
                Some(cached) => *cached,
                None => {
                    let found = self.member_resource(assignee, sibling.project_id)?;
                    resolved.insert(key, found);
                    found
                }
            };
            if sibling_resource == Some(resource_id) {
                total += sibling.hours();
            }
        }
        Ok(total)
    }

    /// Hours derived for an issue from its children or its estimation rows
    ///
    /// With children this is the plain sum of their hours; a leaf sums the
    /// estimation rows keyed to it.
    ///
    /// # Errors
    /// Store failures.
    pub fn total_estimated_hours(&self, issue_id: IssueId) -> Result<f64, EstimationError> {
        if self.store.has_children(issue_id)? {
            Ok(self.store.children(issue_id)?.iter().map(Issue::hours).sum())
        } else {
            Ok(self
                .store
                .issue_resources(issue_id)?
                .iter()
                .map(|row| row.estimation)
                .sum())
        }
    }

    /// Update the resource aggregate for a changed estimate
    ///
    /// Mutates `issue.estimated_hours`: a new issue takes the aggregate, a
    /// persisted issue takes [`Self::total_estimated_hours`]. Row writes for
    /// a persisted issue happen immediately; for a new issue they are
    /// returned as a [`PendingEstimation`] to apply once the issue has an id.
    ///
    /// # Errors
    /// Store failures.
    pub fn record_resource_estimation(
        &self,
        issue: &mut Issue,
        ctx: &mut SaveContext<'_>,
    ) -> Result<Option<PendingEstimation>, EstimationError> {
        let Some(resource_id) = self.resolve_resource(issue, ctx.acting_user)? else {
            tracing::debug!(issue = ?issue.id, "no resource resolved, skipping aggregate");
            issue.estimated_hours = Some(match issue.id {
                Some(id) => self.total_estimated_hours(id)?,
                None => issue.hours(),
            });
            return Ok(None);
        };

        let resource_total = self.sibling_hours_for_resource(issue, resource_id)? + issue.hours();
        let existing = match issue.parent_id {
            Some(parent_id) => self.store.find_issue_resource(parent_id, resource_id)?,
            None => None,
        };

        let mut pending = None;
        let detail = if resource_total.abs() < f64::EPSILON {
            match existing {
                Some(row) => {
                    if let Some(row_id) = row.id {
                        self.store.delete_issue_resource(row_id)?;
                    }
                    tracing::info!(issue = %row.issue_id, resource = %resource_id, "deleted resource estimation");
                    Some(JournalDetail::resource_estimation(
                        resource_id,
                        ChangeMode::Delete,
                        Some(row.estimation),
                        None,
                    ))
                }
                None => None,
            }
        } else {
            match existing {
                Some(mut row) => {
                    let old = row.estimation;
                    row.estimation = resource_total;
                    if issue.is_new() {
                        pending = Some(PendingEstimation::Update { row });
                    } else {
                        self.store.update_issue_resource(&row)?;
                        tracing::info!(
                            issue = %row.issue_id,
                            resource = %resource_id,
                            estimation = resource_total,
                            "updated resource estimation"
                        );
                    }
                    Some(JournalDetail::resource_estimation(
                        resource_id,
                        ChangeMode::Update,
                        Some(old),
                        Some(resource_total),
                    ))
                }
                None => self.create_estimation(issue, resource_id, resource_total, &mut pending)?,
            }
        };

        issue.estimated_hours = Some(match issue.id {
            Some(id) => self.total_estimated_hours(id)?,
            None => resource_total,
        });

        if let Some(detail) = detail {
            ctx.record(detail);
        }
        Ok(pending)
    }

    fn create_estimation(
        &self,
        issue: &Issue,
        resource_id: ResourceId,
        estimation: f64,
        pending: &mut Option<PendingEstimation>,
    ) -> Result<Option<JournalDetail>, EstimationError> {
        if issue.is_new() {
            *pending = Some(PendingEstimation::Create {
                resource_id,
                estimation,
            });
        } else if let Some(parent_id) = issue.parent_id {
            let mut row = IssueResource::new(parent_id, resource_id);
            row.estimation = estimation;
            self.store.insert_issue_resource(&row)?;
            tracing::info!(issue = %parent_id, resource = %resource_id, estimation, "created resource estimation");
        } else {
            tracing::debug!(issue = ?issue.id, "persisted issue without parent has no aggregate key");
            return Ok(None);
        }
        Ok(Some(JournalDetail::resource_estimation(
            resource_id,
            ChangeMode::Create,
            None,
            Some(estimation),
        )))
    }

    /// Write a deferred estimation row for a freshly saved issue
    ///
    /// # Errors
    /// Store failures.
    pub fn apply_pending(
        &self,
        issue_id: IssueId,
        pending: PendingEstimation,
    ) -> Result<(), EstimationError> {
        match pending {
            PendingEstimation::Create {
                resource_id,
                estimation,
            } => {
                let mut row = IssueResource::new(issue_id, resource_id);
                row.estimation = estimation;
                self.store.insert_issue_resource(&row)?;
                tracing::info!(issue = %issue_id, resource = %resource_id, estimation, "created resource estimation");
            }
            PendingEstimation::Update { mut row } => {
                row.issue_id = issue_id;
                self.store.update_issue_resource(&row)?;
                tracing::info!(
                    issue = %row.issue_id,
                    resource = %row.resource_id,
                    estimation = row.estimation,
                    "updated resource estimation"
                );
            }
        }
        Ok(())
    }

    /// Remove the estimation rows keyed to an issue being destroyed
    ///
    /// Returns how many rows were removed.
    ///
    /// # Errors
    /// Store failures.
    pub fn on_destroy(&self, issue_id: IssueId) -> Result<usize, EstimationError> {
        let rows = self.store.issue_resources(issue_id)?;
        for row in &rows {
            if let Some(row_id) = row.id {
                self.store.delete_issue_resource(row_id)?;
            }
        }
        tracing::debug!(issue = %issue_id, removed = rows.len(), "dropped resource estimations");
        Ok(rows.len())
    }
}
