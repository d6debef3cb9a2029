//! Error types for the deployer

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for a deployment run
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("No valid package files found in {}", .0.display())]
    NoPackages(PathBuf),

    #[error("Duplicate project name in deployment plan: {0}")]
    DuplicateProject(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Upload failed for {project}: {detail}")]
    UploadError { project: String, detail: String },

    #[error("Failed to start publishing: {0}")]
    PublishTriggerError(String),

    #[error("Error checking publish status: {0}")]
    PollError(String),

    #[error("Publishing completed with errors")]
    PublishFailed,

    #[error("Publishing did not complete after {attempts} status checks")]
    PollTimeout { attempts: u32 },

    #[error("Session is closed")]
    SessionClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeployError {
    /// Configuration errors are raised before any request reaches the platform
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DeployError::ConfigError(_)
                | DeployError::DirectoryNotFound(_)
                | DeployError::NoPackages(_)
                | DeployError::DuplicateProject(_)
        )
    }
}
