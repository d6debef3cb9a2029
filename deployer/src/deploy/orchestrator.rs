//! Deployment orchestration
//!
//! Drives one run through login, ordered uploads, publish and status polling.
//! The first failure ends the run. Logout always happens exactly once, after
//! the last stage and before the report is returned, even when a stage panics.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::debug;

use crate::deploy::dedup::SeenLogSet;
use crate::deploy::fsm::{DeploymentEvent, DeploymentFsm, DeploymentState};
use crate::deploy::plan::DeploymentPlan;
use crate::deploy::poller;
use crate::deploy::progress::{ProgressEvent, ProgressSink};
use crate::errors::DeployError;
use crate::http::customization::{CustomizationApi, UploadResult};
use crate::models::customization::PublishMode;

/// Orchestrator options
#[derive(Debug, Clone)]
pub struct Options {
    /// Pause between login and the first upload
    pub pre_upload_delay: Duration,

    /// Pause between the last upload and the publish trigger
    pub pre_publish_delay: Duration,

    /// Publish status polling
    pub poller: poller::Options,

    /// Publish flags
    pub publish_mode: PublishMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pre_upload_delay: Duration::from_secs(3),
            pre_publish_delay: Duration::from_secs(5),
            poller: poller::Options::default(),
            publish_mode: PublishMode::default(),
        }
    }
}

/// Outcome of one deployment run
#[derive(Debug)]
pub struct DeploymentReport {
    /// Terminal state
    pub state: DeploymentState,

    /// Stage that failed, if any
    pub failed_stage: Option<DeploymentState>,

    /// Why the run failed
    pub error: Option<DeployError>,

    /// Packages imported before the run ended
    pub uploads: Vec<UploadResult>,

    /// Distinct publish log lines surfaced
    pub publish_log_lines: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeploymentReport {
    pub fn is_success(&self) -> bool {
        self.state == DeploymentState::Succeeded
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Bookkeeping that outlives a failed or panicking stage
#[derive(Default)]
struct RunState {
    fsm: DeploymentFsm,
    uploads: Vec<UploadResult>,
    seen: SeenLogSet,
}

/// Run a deployment
pub async fn run<A, S, F>(
    options: &Options,
    plan: &DeploymentPlan,
    api: &mut A,
    sink: &dyn ProgressSink,
    sleep_fn: S,
) -> DeploymentReport
where
    A: CustomizationApi + ?Sized,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let started_at = Utc::now();
    let mut state = RunState::default();

    let outcome = AssertUnwindSafe(execute(options, plan, &mut *api, sink, &sleep_fn, &mut state))
        .catch_unwind()
        .await;
    let result = match outcome {
        Ok(result) => result,
        Err(panic) => Err(DeployError::Internal(panic_message(panic.as_ref()))),
    };

    let error = match result {
        Ok(()) => None,
        Err(err) => {
            if !state.fsm.state().is_terminal() {
                if let Err(e) = state.fsm.process(DeploymentEvent::Fail(err.to_string())) {
                    debug!("Could not record failure: {}", e);
                }
            }
            Some(err)
        }
    };

    api.logout().await;

    match (&error, state.fsm.failed_stage()) {
        (None, _) => sink.emit(ProgressEvent::Succeeded),
        (Some(err), stage) => sink.emit(ProgressEvent::Failed {
            stage: stage.unwrap_or(DeploymentState::Idle),
            cause: err.to_string(),
        }),
    }

    DeploymentReport {
        state: state.fsm.state(),
        failed_stage: state.fsm.failed_stage(),
        error,
        uploads: state.uploads,
        publish_log_lines: state.seen.distinct_lines(),
        started_at,
        finished_at: Utc::now(),
    }
}

async fn execute<A, S, F>(
    options: &Options,
    plan: &DeploymentPlan,
    api: &mut A,
    sink: &dyn ProgressSink,
    sleep_fn: &S,
    state: &mut RunState,
) -> Result<(), DeployError>
where
    A: CustomizationApi + ?Sized,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    advance(&mut state.fsm, DeploymentEvent::Start, sink)?;
    api.login().await?;

    advance(&mut state.fsm, DeploymentEvent::Authenticated, sink)?;
    wait(options.pre_upload_delay, sink, sleep_fn).await;

    advance(&mut state.fsm, DeploymentEvent::DelayElapsed, sink)?;
    let total = plan.len();
    for (index, unit) in plan.units().iter().enumerate() {
        sink.emit(ProgressEvent::UploadStarted {
            project_name: unit.project_name().to_string(),
            project_level: unit.project_level(),
            position: index + 1,
            total,
        });

        let upload = api.upload_package(unit).await.map_err(|err| match err {
            DeployError::UploadError { .. } => err,
            other => DeployError::UploadError {
                project: unit.project_name().to_string(),
                detail: other.to_string(),
            },
        })?;

        sink.emit(ProgressEvent::UploadSucceeded {
            project_name: upload.project_name.clone(),
            sha256: upload.sha256.clone(),
        });
        state.uploads.push(upload);
    }

    advance(&mut state.fsm, DeploymentEvent::UploadsCompleted, sink)?;
    wait(options.pre_publish_delay, sink, sleep_fn).await;

    advance(&mut state.fsm, DeploymentEvent::DelayElapsed, sink)?;
    api.publish_begin(&plan.project_names(), &options.publish_mode)
        .await?;

    advance(&mut state.fsm, DeploymentEvent::PublishStarted, sink)?;
    poller::run(&options.poller, api, &mut state.seen, sink, sleep_fn).await?;

    advance(&mut state.fsm, DeploymentEvent::PublishCompleted, sink)?;
    Ok(())
}

fn advance(
    fsm: &mut DeploymentFsm,
    event: DeploymentEvent,
    sink: &dyn ProgressSink,
) -> Result<(), DeployError> {
    let next = fsm.process(event).map_err(DeployError::Internal)?;
    if !next.is_terminal() {
        sink.emit(ProgressEvent::StageEntered(next));
    }
    Ok(())
}

async fn wait<S, F>(delay: Duration, sink: &dyn ProgressSink, sleep_fn: &S)
where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    if delay.is_zero() {
        return;
    }
    sink.emit(ProgressEvent::Waiting(delay));
    sleep_fn(delay).await;
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("unexpected fault: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("unexpected fault: {message}")
    } else {
        "unexpected fault".to_string()
    }
}
