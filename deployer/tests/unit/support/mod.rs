//! Shared test doubles: an in-memory platform and a recording progress sink

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use custdeploy::deploy::plan::{DeploymentPlan, PackageUnit};
use custdeploy::deploy::progress::{ProgressEvent, ProgressSink};
use custdeploy::errors::DeployError;
use custdeploy::http::customization::{CustomizationApi, UploadResult};
use custdeploy::models::customization::{PublishMode, PublishStatus};

/// A call received by the fake platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login,
    Logout,
    Upload(String),
    PublishBegin(Vec<String>),
    Poll,
}

/// Scripted platform
#[derive(Default)]
pub struct FakePlatform {
    pub calls: Vec<Call>,
    pub reject_login: bool,
    pub failing_uploads: HashMap<String, String>,
    pub reject_publish: bool,
    pub statuses: VecDeque<Result<PublishStatus, DeployError>>,
    pub panic_on_poll: bool,
    pub publish_mode: Option<PublishMode>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform whose publish completes on the first poll
    pub fn publishing_ok() -> Self {
        let mut platform = Self::new();
        platform
            .statuses
            .push_back(Ok(PublishStatus::completed(false, vec![])));
        platform
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Upload(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn published(&self) -> bool {
        self.calls.iter().any(|c| matches!(c, Call::PublishBegin(_)))
    }
}

#[async_trait]
impl CustomizationApi for FakePlatform {
    async fn login(&mut self) -> Result<(), DeployError> {
        self.calls.push(Call::Login);
        if self.reject_login {
            return Err(DeployError::AuthError("401 Unauthorized".to_string()));
        }
        Ok(())
    }

    async fn logout(&mut self) {
        self.calls.push(Call::Logout);
    }

    async fn upload_package(&mut self, unit: &PackageUnit) -> Result<UploadResult, DeployError> {
        let name = unit.project_name().to_string();
        self.calls.push(Call::Upload(name.clone()));
        if let Some(detail) = self.failing_uploads.get(&name) {
            return Err(DeployError::UploadError {
                project: name,
                detail: detail.clone(),
            });
        }
        Ok(UploadResult {
            project_name: name,
            bytes: 4,
            sha256: "00".repeat(32),
        })
    }

    async fn publish_begin(
        &mut self,
        project_names: &[String],
        mode: &PublishMode,
    ) -> Result<(), DeployError> {
        self.calls.push(Call::PublishBegin(project_names.to_vec()));
        self.publish_mode = Some(mode.clone());
        if self.reject_publish {
            return Err(DeployError::PublishTriggerError("500 Internal Server Error".to_string()));
        }
        Ok(())
    }

    async fn check_publish_status(&mut self) -> Result<PublishStatus, DeployError> {
        self.calls.push(Call::Poll);
        if self.panic_on_poll {
            panic!("status decoder blew up");
        }
        self.statuses
            .pop_front()
            .unwrap_or_else(|| Ok(PublishStatus::in_progress(vec![])))
    }
}

/// Keeps every emitted event
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Publish log lines in the order they were displayed
    pub fn publish_logs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::PublishLog(entry) => Some(entry.message),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Sleep stand-in that records requested delays and returns immediately
pub fn recording_sleep(
    log: Arc<Mutex<Vec<Duration>>>,
) -> impl Fn(Duration) -> std::future::Ready<()> {
    move |delay| {
        log.lock().unwrap().push(delay);
        std::future::ready(())
    }
}

/// Plan with one unit per (name, level)
pub fn plan(units: &[(&str, u32)]) -> DeploymentPlan {
    DeploymentPlan::new(
        units
            .iter()
            .map(|(name, level)| PackageUnit::new(format!("/pkg/{name}.zip"), *name, *level, ""))
            .collect(),
    )
    .unwrap()
}
