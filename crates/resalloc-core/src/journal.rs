//! Change journal and per-save context
//!
//! The acting user and the active journal are passed explicitly with each
//! save instead of being looked up from request-global state.

use crate::types::{ResourceId, UserId};
use serde::{Deserialize, Serialize};

/// Property name recorded on resource-estimation journal details
pub const RESOURCE_ESTIMATION_PROPERTY: &str = "resource_estimation";

/// What happened to an estimation row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMode {
    /// Row inserted
    Create,
    /// Row estimation rewritten
    Update,
    /// Row removed
    Delete,
}

impl std::fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One journal detail describing an estimation row change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalDetail {
    /// Journaled property name
    pub property: String,
    /// Resource whose row changed
    pub resource_id: ResourceId,
    /// Kind of change
    pub mode: ChangeMode,
    /// Estimation before the change
    pub old_value: Option<f64>,
    /// Estimation after the change
    pub new_value: Option<f64>,
}

impl JournalDetail {
    /// Detail for a resource estimation change
    #[must_use]
    pub fn resource_estimation(
        resource_id: ResourceId,
        mode: ChangeMode,
        old_value: Option<f64>,
        new_value: Option<f64>,
    ) -> Self {
        Self {
            property: RESOURCE_ESTIMATION_PROPERTY.to_string(),
            resource_id,
            mode,
            old_value,
            new_value,
        }
    }
}

/// Receiver for journal details produced during a save
pub trait JournalSink {
    /// Append a detail to the journal
    fn record(&mut self, detail: JournalDetail);
}

/// In-memory journal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    /// Details in recording order
    pub details: Vec<JournalDetail>,
}

impl Journal {
    /// Create empty journal
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

impl JournalSink for Journal {
    fn record(&mut self, detail: JournalDetail) {
        self.details.push(detail);
    }
}

/// Per-save context supplied by the host
#[derive(Default)]
pub struct SaveContext<'a> {
    /// User performing the save, used when the issue has no assignee
    pub acting_user: Option<UserId>,
    /// Journal for this save, if the host keeps one
    pub journal: Option<&'a mut dyn JournalSink>,
}

impl<'a> SaveContext<'a> {
    /// Context with no acting user and no journal
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With acting user
    #[inline]
    #[must_use]
    pub fn with_acting_user(mut self, user: UserId) -> Self {
        self.acting_user = Some(user);
        self
    }

    /// With journal sink
    #[inline]
    #[must_use]
    pub fn with_journal(mut self, journal: &'a mut dyn JournalSink) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Record a detail if a journal is active
    pub fn record(&mut self, detail: JournalDetail) {
        if let Some(journal) = self.journal.as_mut() {
            journal.record(detail);
        }
    }
}

impl std::fmt::Debug for SaveContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveContext")
            .field("acting_user", &self.acting_user)
            .field("journal", &self.journal.is_some())
            .finish()
    }
}
