//! Propagation configuration
//!
//! The defaults encode the tracker taxonomy the roll-up has always used:
//! trackers 2, 5 and 6 are left out of a parent's sum, and a tracker-5
//! parent takes its tracker-2 children back in.

use crate::error::EstimationError;
use crate::types::TrackerId;
use serde::{Deserialize, Serialize};

/// Configuration for the estimation propagator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Trackers excluded from a parent's default children sum
    pub excluded_trackers: Vec<TrackerId>,
    /// Parent tracker that re-includes `rollup_readded_tracker` children
    pub rollup_parent_tracker: TrackerId,
    /// Child tracker added back under a `rollup_parent_tracker` parent
    pub rollup_readded_tracker: TrackerId,
    /// ResourceSetting kind that enables resource estimation for a tracker
    pub estimation_setting: u32,
    /// Maximum number of ancestors visited by one upward walk
    pub max_depth: usize,
}

impl PropagationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With excluded trackers
    #[inline]
    #[must_use]
    pub fn with_excluded_trackers(mut self, trackers: impl IntoIterator<Item = TrackerId>) -> Self {
        self.excluded_trackers = trackers.into_iter().collect();
        self
    }

    /// With max depth
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse a YAML document; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns `EstimationError::Config` if the document is malformed or
    /// `max_depth` is zero.
    pub fn from_yaml_str(source: &str) -> Result<Self, EstimationError> {
        let config: Self =
            serde_yaml::from_str(source).map_err(|e| EstimationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// Returns `EstimationError::Config` when `max_depth` is zero.
    pub fn validate(&self) -> Result<(), EstimationError> {
        if self.max_depth == 0 {
            return Err(EstimationError::Config("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Whether a child with this tracker counts toward the default sum
    #[inline]
    #[must_use]
    pub fn counts_toward_parent(&self, tracker: TrackerId) -> bool {
        !self.excluded_trackers.contains(&tracker)
    }
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            excluded_trackers: vec![TrackerId(2), TrackerId(5), TrackerId(6)],
            rollup_parent_tracker: TrackerId(5),
            rollup_readded_tracker: TrackerId(2),
            estimation_setting: 1,
            max_depth: 64,
        }
    }
}
