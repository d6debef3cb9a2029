//! Finite State Machine for a deployment run

use std::fmt;

use serde::{Deserialize, Serialize};

/// Deployment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    /// Nothing started yet
    Idle,

    /// Logging in
    Authenticating,

    /// Letting the new session settle before uploading
    PreUploadDelay,

    /// Importing packages one by one
    Uploading,

    /// Waiting before the publish is triggered
    PrePublishDelay,

    /// Triggering the publish
    Publishing,

    /// Waiting for the publish to complete
    Polling,

    /// Publish completed without errors
    Succeeded,

    /// Run aborted
    Failed,
}

impl DeploymentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentState::Succeeded | DeploymentState::Failed)
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentState::Idle => "idle",
            DeploymentState::Authenticating => "authentication",
            DeploymentState::PreUploadDelay => "pre-upload delay",
            DeploymentState::Uploading => "upload",
            DeploymentState::PrePublishDelay => "pre-publish delay",
            DeploymentState::Publishing => "publish trigger",
            DeploymentState::Polling => "publish status polling",
            DeploymentState::Succeeded => "succeeded",
            DeploymentState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Deployment event
#[derive(Debug, Clone)]
pub enum DeploymentEvent {
    /// Start the run
    Start,

    /// Login succeeded
    Authenticated,

    /// A fixed delay elapsed
    DelayElapsed,

    /// Every package was imported
    UploadsCompleted,

    /// The platform accepted the publish request
    PublishStarted,

    /// The publish job completed without errors
    PublishCompleted,

    /// The current stage failed
    Fail(String),
}

/// Deployment FSM
#[derive(Debug, Clone)]
pub struct DeploymentFsm {
    state: DeploymentState,
    error: Option<String>,
    failed_stage: Option<DeploymentState>,
}

impl DeploymentFsm {
    /// Create a new FSM in idle state
    pub fn new() -> Self {
        Self {
            state: DeploymentState::Idle,
            error: None,
            failed_stage: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> DeploymentState {
        self.state
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Stage that was active when the run failed
    pub fn failed_stage(&self) -> Option<DeploymentState> {
        self.failed_stage
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: DeploymentEvent) -> Result<DeploymentState, String> {
        let new_state = match (self.state, &event) {
            (DeploymentState::Idle, DeploymentEvent::Start) => DeploymentState::Authenticating,

            (DeploymentState::Authenticating, DeploymentEvent::Authenticated) => {
                DeploymentState::PreUploadDelay
            }

            (DeploymentState::PreUploadDelay, DeploymentEvent::DelayElapsed) => {
                DeploymentState::Uploading
            }

            (DeploymentState::Uploading, DeploymentEvent::UploadsCompleted) => {
                DeploymentState::PrePublishDelay
            }

            (DeploymentState::PrePublishDelay, DeploymentEvent::DelayElapsed) => {
                DeploymentState::Publishing
            }

            (DeploymentState::Publishing, DeploymentEvent::PublishStarted) => {
                DeploymentState::Polling
            }

            (DeploymentState::Polling, DeploymentEvent::PublishCompleted) => {
                DeploymentState::Succeeded
            }

            // Any running stage can fail
            (state, DeploymentEvent::Fail(err)) if !state.is_terminal() => {
                self.error = Some(err.clone());
                self.failed_stage = Some(state);
                DeploymentState::Failed
            }

            // Invalid transitions
            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(new_state)
    }
}

impl Default for DeploymentFsm {
    fn default() -> Self {
        Self::new()
    }
}
