//! Customization API models

use serde::{Deserialize, Serialize};

/// Project metadata sent with every imported package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    /// Layer of the project; lower levels are applied first
    pub project_level: u32,

    /// Unique project name on the platform
    pub project_name: String,

    /// Human readable description
    pub project_description: String,

    /// Replace a project with the same name
    pub is_replace_if_exists: bool,
}

/// Body of the `Import` request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest<'a> {
    #[serde(flatten)]
    pub project: &'a ProjectMetadata,

    /// Raw package bytes, base64 encoded
    pub project_content_base64: String,
}

/// Tenant scope of a publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantMode {
    #[default]
    Current,
}

/// Publish mode flags. All false means a full live publish without replaying scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishMode {
    #[serde(default)]
    pub merge_with_existing: bool,

    #[serde(default)]
    pub only_validation: bool,

    #[serde(default)]
    pub only_db_updates: bool,

    #[serde(default)]
    pub replay_previously_executed_scripts: bool,
}

/// Body of the `publishBegin` request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest<'a> {
    pub is_merge_with_existing_packages: bool,
    pub is_only_validation: bool,
    pub is_only_db_updates: bool,
    pub is_replay_previously_executed_scripts: bool,
    pub project_names: &'a [String],
    pub tenant_mode: TenantMode,
}

impl<'a> PublishRequest<'a> {
    pub fn new(project_names: &'a [String], mode: &PublishMode) -> Self {
        Self {
            is_merge_with_existing_packages: mode.merge_with_existing,
            is_only_validation: mode.only_validation,
            is_only_db_updates: mode.only_db_updates,
            is_replay_previously_executed_scripts: mode.replay_previously_executed_scripts,
            project_names,
            tenant_mode: TenantMode::Current,
        }
    }
}

/// One log line reported by the publish job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default)]
    pub log_type: String,

    #[serde(default)]
    pub message: String,
}

impl LogEntry {
    pub fn new(log_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            log_type: log_type.into(),
            message: message.into(),
        }
    }
}

/// Response of the `publishEnd` status request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishStatus {
    #[serde(default)]
    pub is_completed: bool,

    #[serde(default)]
    pub is_failed: bool,

    #[serde(default)]
    pub log: Vec<LogEntry>,
}

impl PublishStatus {
    /// Publish still running
    pub fn in_progress(log: Vec<LogEntry>) -> Self {
        Self {
            is_completed: false,
            is_failed: false,
            log,
        }
    }

    /// Publish finished, successfully or not
    pub fn completed(is_failed: bool, log: Vec<LogEntry>) -> Self {
        Self {
            is_completed: true,
            is_failed,
            log,
        }
    }
}
