//! Snapshot files
//!
//! A snapshot is a serde document listing every table of a [`MemoryStore`].
//! Import keeps record ids; export orders records by id.

use crate::memory::MemoryStore;
use resalloc_core::{Department, Issue, IssueResource, Member, Resource, ResourceSetting, StoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Document encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl SnapshotFormat {
    /// Pick a format from a file extension (`.yaml`/`.yml` are YAML, anything else JSON)
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Full dump of a store's tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Departments, by id
    pub departments: Vec<Department>,
    /// Resources, by id
    pub resources: Vec<Resource>,
    /// Memberships, in insertion order
    pub members: Vec<Member>,
    /// Resource settings, in insertion order
    pub settings: Vec<ResourceSetting>,
    /// Issues, by id; each must carry an id
    pub issues: Vec<Issue>,
    /// Estimation rows, by id; each must carry an id
    pub issue_resources: Vec<IssueResource>,
}

impl Snapshot {
    /// Parse a snapshot document
    ///
    /// # Errors
    /// `StoreError::Snapshot` if the document does not parse.
    pub fn parse(source: &str, format: SnapshotFormat) -> Result<Self, StoreError> {
        match format {
            SnapshotFormat::Json => {
                serde_json::from_str(source).map_err(|e| StoreError::Snapshot(e.to_string()))
            }
            SnapshotFormat::Yaml => {
                serde_yaml::from_str(source).map_err(|e| StoreError::Snapshot(e.to_string()))
            }
        }
    }

    /// Render the snapshot
    ///
    /// # Errors
    /// `StoreError::Snapshot` if serialization fails.
    pub fn render(&self, format: SnapshotFormat) -> Result<String, StoreError> {
        match format {
            SnapshotFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| StoreError::Snapshot(e.to_string()))
            }
            SnapshotFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| StoreError::Snapshot(e.to_string()))
            }
        }
    }

    /// Read a snapshot file, picking the format from its extension
    ///
    /// # Errors
    /// `StoreError::Snapshot` if the file cannot be read or parsed.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Snapshot(format!("{}: {e}", path.display())))?;
        Self::parse(&source, SnapshotFormat::from_path(path))
    }

    /// Dump every table of a store
    #[must_use]
    pub fn capture(store: &MemoryStore) -> Self {
        Self {
            departments: store.departments(),
            resources: store.resources(),
            members: store.members(),
            settings: store.settings(),
            issues: store.issues(),
            issue_resources: store.all_issue_resources(),
        }
    }

    /// Build a store holding this snapshot's records
    ///
    /// # Errors
    /// `StoreError::Constraint` if an issue or estimation row has no id.
    pub fn into_store(self) -> Result<MemoryStore, StoreError> {
        let store = MemoryStore::new();
        for department in self.departments {
            store.put_department(department);
        }
        for resource in self.resources {
            store.put_resource(resource);
        }
        for member in self.members {
            store.put_member(member);
        }
        for setting in self.settings {
            store.put_setting(setting);
        }
        let issue_count = self.issues.len();
        for issue in self.issues {
            store.put_issue(issue)?;
        }
        for row in self.issue_resources {
            store.put_issue_resource(row)?;
        }
        tracing::debug!(issues = issue_count, "loaded snapshot");
        Ok(store)
    }
}
