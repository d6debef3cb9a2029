//! Deployment entry point

use tracing::{debug, info};

use crate::app::options::AppOptions;
use crate::deploy::orchestrator::{self, DeploymentReport};
use crate::deploy::plan::{build_plan, DeploymentPlan};
use crate::deploy::progress::TracingSink;
use crate::errors::DeployError;
use crate::http::client::{Endpoints, SessionClient};

/// Resolve the package plan and deploy it
///
/// Configuration problems are returned as errors before any request is made.
/// Everything that goes wrong afterwards is reported in the returned
/// [`DeploymentReport`].
pub async fn run(options: AppOptions) -> Result<DeploymentReport, DeployError> {
    let endpoints = Endpoints::from_instance_url(&options.instance_url)?;
    let plan = build_plan(&options.package_dir, &options.packages).await?;
    deploy(options, endpoints, &plan).await
}

/// Deploy an already resolved plan
pub async fn deploy(
    options: AppOptions,
    endpoints: Endpoints,
    plan: &DeploymentPlan,
) -> Result<DeploymentReport, DeployError> {
    info!(
        "Deploying {} package(s) to {}",
        plan.len(),
        options.instance_url
    );

    let mut session = SessionClient::new(endpoints, options.credentials, options.request_timeout)?;
    let report = orchestrator::run(
        &options.orchestrator,
        plan,
        &mut session,
        &TracingSink,
        tokio::time::sleep,
    )
    .await;

    debug!(
        "Run finished in {}s: {} of {} package(s) uploaded, {} publish log line(s)",
        report.elapsed().num_seconds(),
        report.uploads.len(),
        plan.len(),
        report.publish_log_lines
    );
    Ok(report)
}
