//! Publish status polling

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::deploy::dedup::SeenLogSet;
use crate::deploy::progress::{ProgressEvent, ProgressSink};
use crate::errors::DeployError;
use crate::http::customization::CustomizationApi;

/// Poller options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay between status checks
    pub interval: Duration,

    /// Give up after this many status checks. `None` polls until the platform reports completion.
    pub max_attempts: Option<u32>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

impl Options {
    /// Bound polling by a total wait time, expressed in whole poll intervals
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_attempts = max_wait.map(|wait| {
            let interval = self.interval.as_millis().max(1);
            let attempts = wait.as_millis().div_ceil(interval);
            u32::try_from(attempts).unwrap_or(u32::MAX).max(1)
        });
        self
    }
}

/// Poll the publish job until it completes
///
/// New publish log lines are forwarded to `sink` as they appear. Returns
/// `PublishFailed` when the job completes with its failure flag set.
pub async fn run<A, S, F>(
    options: &Options,
    api: &mut A,
    seen: &mut SeenLogSet,
    sink: &dyn ProgressSink,
    sleep_fn: &S,
) -> Result<(), DeployError>
where
    A: CustomizationApi + ?Sized,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        debug!("Checking publish status (attempt {})...", attempt);

        let status = api.check_publish_status().await?;

        for entry in seen.observe(&status.log) {
            sink.emit(ProgressEvent::PublishLog(entry));
        }

        if status.is_completed {
            if status.is_failed {
                return Err(DeployError::PublishFailed);
            }
            return Ok(());
        }

        if let Some(max_attempts) = options.max_attempts {
            if attempt >= max_attempts {
                return Err(DeployError::PollTimeout { attempts: attempt });
            }
        }

        sink.emit(ProgressEvent::PublishPending { attempt });
        sleep_fn(options.interval).await;
    }
}
