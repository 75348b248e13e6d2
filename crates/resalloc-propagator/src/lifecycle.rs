//! Issue save lifecycle
//!
//! Hosts call [`IssueLifecycle::before_save`] and
//! [`IssueLifecycle::after_save`] around their own write, or let
//! [`IssueLifecycle::save`] do the write through the store.
//!
//! # Workflow
//! 1. Before save: if the estimate changed and the tracker has resource
//!    estimation switched on, update the resource aggregate
//! 2. Write the issue
//! 3. After save: flush any deferred aggregate row, then roll hours up
//!    through the ancestors (always, whether or not step 1 ran)

use crate::propagator::{EstimationPropagator, PendingEstimation};
use resalloc_core::{
    EstimationError, Issue, IssueId, IssueRepository, SaveContext, SettingRepository, Store,
};

/// Save hooks wired to an [`EstimationPropagator`]
#[derive(Debug, Clone)]
pub struct IssueLifecycle<S> {
    propagator: EstimationPropagator<S>,
}

impl<S: Store> IssueLifecycle<S> {
    /// Create lifecycle around a propagator
    #[inline]
    #[must_use]
    pub fn new(propagator: EstimationPropagator<S>) -> Self {
        Self { propagator }
    }

    /// Underlying propagator
    #[inline]
    #[must_use]
    pub fn propagator(&self) -> &EstimationPropagator<S> {
        &self.propagator
    }

    /// Whether the issue's estimate differs from the stored one
    ///
    /// A new issue counts as changed when it carries any estimate.
    ///
    /// # Errors
    /// Store failures.
    pub fn estimation_changed(&self, issue: &Issue) -> Result<bool, EstimationError> {
        let stored = match issue.id {
            Some(id) => self.propagator.store().issue(id)?,
            None => None,
        };
        Ok(match stored {
            Some(stored) => stored.estimated_hours != issue.estimated_hours,
            None => issue.estimated_hours.is_some(),
        })
    }

    /// Whether resource estimation is switched on for the issue's tracker
    ///
    /// # Errors
    /// Store failures.
    pub fn estimation_enabled(&self, issue: &Issue) -> Result<bool, EstimationError> {
        let setting = self.propagator.config().estimation_setting;
        Ok(self
            .propagator
            .store()
            .enabled_trackers(issue.project_id, setting)?
            .contains(&issue.tracker_id))
    }

    /// Pre-save hook
    ///
    /// # Errors
    /// Store failures.
    pub fn before_save(
        &self,
        issue: &mut Issue,
        ctx: &mut SaveContext<'_>,
    ) -> Result<Option<PendingEstimation>, EstimationError> {
        if !self.estimation_changed(issue)? {
            return Ok(None);
        }
        if !self.estimation_enabled(issue)? {
            tracing::debug!(
                project = %issue.project_id,
                tracker = %issue.tracker_id,
                "resource estimation disabled for tracker"
            );
            return Ok(None);
        }
        self.propagator.record_resource_estimation(issue, ctx)
    }

    /// Post-save hook
    ///
    /// # Errors
    /// - `EstimationError::UnsavedIssue` if `issue` has no id
    /// - roll-up and store failures
    pub fn after_save(
        &self,
        issue: &Issue,
        pending: Option<PendingEstimation>,
    ) -> Result<(), EstimationError> {
        let id = issue.id.ok_or(EstimationError::UnsavedIssue)?;
        if let Some(pending) = pending {
            self.propagator.apply_pending(id, pending)?;
        }
        self.propagator.update_parent_estimation(issue)?;
        Ok(())
    }

    /// Run both hooks around a store write and return the saved issue
    ///
    /// Each step writes straight to the store. When a later step fails, the
    /// issue row and any rows or ancestors written before it stay in place;
    /// hosts that need all-or-nothing saves wrap the call in their own
    /// transaction.
    ///
    /// # Errors
    /// Store and propagation failures; the first one stops the remaining
    /// steps.
    pub fn save(
        &self,
        mut issue: Issue,
        ctx: &mut SaveContext<'_>,
    ) -> Result<Issue, EstimationError> {
        let pending = self.before_save(&mut issue, ctx)?;
        if issue.id.is_some() {
            self.propagator.store().update_issue(&issue)?;
        } else {
            issue.id = Some(self.propagator.store().insert_issue(&issue)?);
        }
        self.after_save(&issue, pending)?;
        Ok(issue)
    }

    /// Delete an issue together with its estimation rows
    ///
    /// # Errors
    /// Store failures.
    pub fn destroy(&self, issue_id: IssueId) -> Result<(), EstimationError> {
        self.propagator.on_destroy(issue_id)?;
        self.propagator.store().delete_issue(issue_id)?;
        Ok(())
    }
}
