//! Parent hour roll-up
//!
//! After every save the parent's estimated hours are rewritten from its
//! children, then the same happens for the grandparent and so on. A blocked
//! parent is frozen and stops the walk.

use crate::propagator::EstimationPropagator;
use resalloc_core::{EstimationError, Issue, IssueRepository, PropagationConfig, Store, TrackerId};
use std::collections::HashSet;

/// Sum of children's hours as seen by a parent with `parent_tracker`
///
/// Children on excluded trackers are left out. Under a
/// `rollup_parent_tracker` parent, `rollup_readded_tracker` children are
/// added back.
#[must_use]
pub fn children_total(
    parent_tracker: TrackerId,
    children: &[Issue],
    config: &PropagationConfig,
) -> f64 {
    let mut total: f64 = children
        .iter()
        .filter(|child| config.counts_toward_parent(child.tracker_id))
        .map(Issue::hours)
        .sum();
    if parent_tracker == config.rollup_parent_tracker {
        total += children
            .iter()
            .filter(|child| child.tracker_id == config.rollup_readded_tracker)
            .map(Issue::hours)
            .sum::<f64>();
    }
    total
}

impl<S: Store> EstimationPropagator<S> {
    /// Rewrite the estimated hours of every ancestor of `issue`
    ///
    /// Parent columns are written directly, without save hooks. The walk ends
    /// at an issue without a parent, a parent that no longer exists, or a
    /// blocked parent. Returns how many ancestors were rewritten.
    ///
    /// The depth bound counts rewrites, so a chain of exactly `max_depth`
    /// ancestors ending in a missing or blocked parent still succeeds.
    ///
    /// # Errors
    /// - `EstimationError::ParentCycle` if the chain revisits an issue
    /// - `EstimationError::DepthExceeded` past `max_depth` ancestors
    /// - Store failures
    pub fn update_parent_estimation(&self, issue: &Issue) -> Result<usize, EstimationError> {
        let max_depth = self.config().max_depth;
        let mut visited: HashSet<_> = issue.id.into_iter().collect();
        let mut next = issue.parent_id;
        let mut rewritten = 0;

        while let Some(parent_id) = next {
            if !visited.insert(parent_id) {
                tracing::warn!(issue = %parent_id, "parent cycle detected");
                return Err(EstimationError::ParentCycle { issue: parent_id });
            }

            let Some(parent) = self.store().issue(parent_id)? else {
                tracing::debug!(issue = %parent_id, "parent not found, nothing to propagate");
                break;
            };
            if parent.blocked {
                tracing::debug!(issue = %parent_id, "parent is blocked, roll-up stops");
                break;
            }
            if rewritten >= max_depth {
                tracing::warn!(issue = %parent_id, max_depth, "parent chain too deep");
                return Err(EstimationError::DepthExceeded {
                    issue: parent_id,
                    max_depth,
                });
            }

            let children = self.store().children(parent_id)?;
            let total = children_total(parent.tracker_id, &children, self.config());
            self.store().update_estimated_hours_column(parent_id, total)?;
            tracing::info!(issue = %parent_id, hours = total, "rolled up estimated hours");

            rewritten += 1;
            next = parent.parent_id;
        }

        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resalloc_core::{IssueId, ProjectId};
    use resalloc_store::MemoryStore;
    use resalloc_test_utils::Fixture;

    fn child(tracker: u64, hours: f64) -> Issue {
        Issue::new(ProjectId(1), TrackerId(tracker)).with_estimated_hours(hours)
    }

    #[test]
    fn excluded_trackers_are_skipped() {
        let children = vec![child(1, 3.0), child(2, 4.0), child(5, 5.0), child(6, 6.0), child(3, 1.5)];
        let total = children_total(TrackerId(1), &children, &PropagationConfig::default());
        assert_eq!(total, 4.5);
    }

    #[test]
    fn tracker_five_parent_readds_tracker_two() {
        let children = vec![child(1, 3.0), child(2, 4.0), child(5, 5.0), child(2, 1.0)];
        let total = children_total(TrackerId(5), &children, &PropagationConfig::default());
        assert_eq!(total, 8.0);
    }

    #[test]
    fn unset_hours_count_as_zero() {
        let children = vec![Issue::new(ProjectId(1), TrackerId(1)), child(1, 2.0)];
        assert_eq!(
            children_total(TrackerId(1), &children, &PropagationConfig::default()),
            2.0
        );
    }

    #[test]
    fn root_issue_rewrites_nothing() {
        let fx = Fixture::new();
        let id = fx.issue(child(1, 2.0));
        let propagator = EstimationPropagator::new(fx.store());
        let issue = fx.store().issue(id).unwrap().unwrap();
        assert_eq!(propagator.update_parent_estimation(&issue).unwrap(), 0);
    }

    #[test]
    fn missing_parent_is_not_an_error() {
        let fx = Fixture::new();
        let id = fx.issue(child(1, 2.0).with_parent(IssueId(404)));
        let propagator = EstimationPropagator::new(fx.store());
        let issue = fx.store().issue(id).unwrap().unwrap();
        assert_eq!(propagator.update_parent_estimation(&issue).unwrap(), 0);
    }

    fn bounded(fx: &Fixture, max_depth: usize) -> EstimationPropagator<MemoryStore> {
        let config = PropagationConfig::new().with_max_depth(max_depth);
        EstimationPropagator::with_config(fx.store(), config).unwrap()
    }

    #[test]
    fn blocked_ancestor_at_depth_bound_ends_walk() {
        let fx = Fixture::new();
        let grandparent = fx.issue(child(1, 9.0).blocked());
        let parent = fx.issue(child(1, 0.0).with_parent(grandparent));
        let id = fx.issue(child(1, 2.0).with_parent(parent));
        let issue = fx.store().issue(id).unwrap().unwrap();

        assert_eq!(bounded(&fx, 1).update_parent_estimation(&issue).unwrap(), 1);
        assert_eq!(fx.hours(parent), Some(2.0));
        assert_eq!(fx.hours(grandparent), Some(9.0));
    }

    #[test]
    fn missing_ancestor_at_depth_bound_ends_walk() {
        let fx = Fixture::new();
        let parent = fx.issue(child(1, 0.0).with_parent(IssueId(404)));
        let id = fx.issue(child(1, 2.0).with_parent(parent));
        let issue = fx.store().issue(id).unwrap().unwrap();

        assert_eq!(bounded(&fx, 1).update_parent_estimation(&issue).unwrap(), 1);
        assert_eq!(fx.hours(parent), Some(2.0));
    }

    #[test]
    fn live_ancestor_past_depth_bound_fails() {
        let fx = Fixture::new();
        let grandparent = fx.issue(child(1, 9.0));
        let parent = fx.issue(child(1, 0.0).with_parent(grandparent));
        let id = fx.issue(child(1, 2.0).with_parent(parent));
        let issue = fx.store().issue(id).unwrap().unwrap();

        let err = bounded(&fx, 1).update_parent_estimation(&issue).unwrap_err();
        assert!(matches!(
            err,
            EstimationError::DepthExceeded { issue, max_depth: 1 } if issue == grandparent
        ));
        assert_eq!(fx.hours(grandparent), Some(9.0));
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let fx = Fixture::new();
        fx.store()
            .put_issue(child(1, 2.0).with_id(IssueId(1)).with_parent(IssueId(1)))
            .unwrap();
        let propagator = EstimationPropagator::new(fx.store());
        let issue = fx.store().issue(IssueId(1)).unwrap().unwrap();
        let err = propagator.update_parent_estimation(&issue).unwrap_err();
        assert!(matches!(err, EstimationError::ParentCycle { issue } if issue == IssueId(1)));
    }
}
