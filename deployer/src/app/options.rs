//! Application configuration options

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::deploy::orchestrator;
use crate::deploy::plan::PackageSpec;
use crate::deploy::poller;
use crate::http::client::{Credentials, DEFAULT_REQUEST_TIMEOUT};
use crate::storage::settings::Settings;

/// Everything one deployment run needs
#[derive(Debug)]
pub struct AppOptions {
    /// Platform instance URL
    pub instance_url: String,

    /// Login credentials
    pub credentials: Credentials,

    /// Directory holding the package archives
    pub package_dir: PathBuf,

    /// Packages to look for in `package_dir`
    pub packages: Vec<PackageSpec>,

    /// Timeout of a single HTTP request
    pub request_timeout: Duration,

    /// Orchestrator timings and publish flags
    pub orchestrator: orchestrator::Options,
}

impl AppOptions {
    /// Combine the settings file with the values given on the command line
    pub fn from_settings(
        settings: &Settings,
        instance_url: String,
        username: String,
        password: SecretString,
        package_dir: PathBuf,
    ) -> Self {
        let timing = &settings.timing;
        let poller = poller::Options {
            interval: Duration::from_secs(timing.poll_interval_secs),
            max_attempts: None,
        }
        .with_max_wait(timing.max_publish_wait_secs.map(Duration::from_secs));

        let packages = settings.package_specs(Some(&instance_url));
        let request_timeout = match settings.request_timeout_secs {
            0 => DEFAULT_REQUEST_TIMEOUT,
            secs => Duration::from_secs(secs),
        };

        Self {
            instance_url,
            credentials: Credentials { username, password },
            package_dir,
            packages,
            request_timeout,
            orchestrator: orchestrator::Options {
                pre_upload_delay: Duration::from_secs(timing.pre_upload_delay_secs),
                pre_publish_delay: Duration::from_secs(timing.pre_publish_delay_secs),
                poller,
                publish_mode: settings.publish.clone(),
            },
        }
    }
}
