//! Progress reporting for a deployment run
//!
//! The orchestrator narrates what it does through a [`ProgressSink`] it is
//! handed, instead of writing to a logger on its own.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::deploy::fsm::DeploymentState;
use crate::models::customization::LogEntry;

/// Something worth telling the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A stage started
    StageEntered(DeploymentState),

    /// Sleeping before the next stage
    Waiting(Duration),

    /// Upload of one package started
    UploadStarted {
        project_name: String,
        project_level: u32,
        position: usize,
        total: usize,
    },

    /// One package imported
    UploadSucceeded { project_name: String, sha256: String },

    /// New line from the publish log
    PublishLog(LogEntry),

    /// Publish still running after this many status checks
    PublishPending { attempt: u32 },

    /// Run finished successfully
    Succeeded,

    /// Run failed in `stage`
    Failed { stage: DeploymentState, cause: String },
}

/// Receiver of progress events
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Writes progress to the `tracing` subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageEntered(DeploymentState::Uploading) => {
                info!("Starting package uploads...")
            }
            ProgressEvent::StageEntered(DeploymentState::Polling) => {
                info!("Monitoring publication status...")
            }
            ProgressEvent::StageEntered(stage) => info!(stage = %stage, "Entering stage"),
            ProgressEvent::Waiting(delay) => {
                info!("Waiting {:?} before continuing...", delay)
            }
            ProgressEvent::UploadStarted {
                project_name,
                project_level,
                position,
                total,
            } => info!(
                project_level,
                "[{}/{}] Uploading {}", position, total, project_name
            ),
            ProgressEvent::UploadSucceeded {
                project_name,
                sha256,
            } => info!(sha256 = %sha256, "Uploaded {}", project_name),
            ProgressEvent::PublishLog(entry) => match entry.log_type.as_str() {
                "ERROR" => error!("[{}] {}", entry.log_type, entry.message),
                "WARNING" | "WARN" => warn!("[{}] {}", entry.log_type, entry.message),
                _ => info!("[{}] {}", entry.log_type, entry.message),
            },
            ProgressEvent::PublishPending { attempt } => {
                debug!(attempt, "Publish still running")
            }
            ProgressEvent::Succeeded => info!("Deployment completed successfully!"),
            ProgressEvent::Failed { stage, cause } => {
                error!(stage = %stage, "Deployment failed during {}: {}", stage, cause)
            }
        }
    }
}
