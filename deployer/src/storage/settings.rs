//! Settings file management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::deploy::plan::{default_package_specs, PackageSpec, DEFAULT_BASE_VERSION};
use crate::logs::LogLevel;
use crate::models::customization::PublishMode;

/// Deployer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Platform instance URL, e.g. `https://erp.example.com/Site`
    #[serde(default)]
    pub instance_url: Option<String>,

    /// Login name
    #[serde(default)]
    pub username: Option<String>,

    /// Directory holding one sub-directory of packages per package date
    #[serde(default = "default_packages_root")]
    pub packages_root: PathBuf,

    /// Timeout of a single HTTP request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Delays and polling
    #[serde(default)]
    pub timing: TimingSettings,

    /// Publish flags
    #[serde(default)]
    pub publish: PublishMode,

    /// Packages to deploy. Empty means the built-in package set.
    #[serde(default)]
    pub packages: Vec<PackageSpec>,

    /// Base package version of the built-in set. Overrides `base_version_rules`.
    #[serde(default)]
    pub base_version: Option<String>,

    /// Per-instance base package versions, first match wins
    #[serde(default = "default_base_version_rules")]
    pub base_version_rules: Vec<BaseVersionRule>,
}

/// Selects a base package version for instances whose URL contains `url_contains`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseVersionRule {
    pub url_contains: String,
    pub version: String,
}

impl BaseVersionRule {
    pub fn new(url_contains: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            url_contains: url_contains.into(),
            version: version.into(),
        }
    }
}

fn default_base_version_rules() -> Vec<BaseVersionRule> {
    vec![
        BaseVersionRule::new("https://qa.readywire.com/maruti-acermotors", "0021"),
        BaseVersionRule::new("https://dev.readywire.com", "0021"),
    ]
}

fn default_packages_root() -> PathBuf {
    PathBuf::from(r"C:\Backups\pkg-backups")
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            instance_url: None,
            username: None,
            packages_root: default_packages_root(),
            request_timeout_secs: default_request_timeout(),
            timing: TimingSettings::default(),
            publish: PublishMode::default(),
            packages: Vec::new(),
            base_version: None,
            base_version_rules: default_base_version_rules(),
        }
    }
}

impl Settings {
    /// Base package version for an instance
    pub fn base_version_for(&self, instance_url: Option<&str>) -> &str {
        if let Some(version) = &self.base_version {
            return version;
        }
        instance_url
            .and_then(|url| {
                self.base_version_rules
                    .iter()
                    .find(|rule| url.contains(&rule.url_contains))
            })
            .map(|rule| rule.version.as_str())
            .unwrap_or(DEFAULT_BASE_VERSION)
    }

    /// Configured packages, falling back to the built-in set for the instance
    pub fn package_specs(&self, instance_url: Option<&str>) -> Vec<PackageSpec> {
        if self.packages.is_empty() {
            default_package_specs(self.base_version_for(instance_url))
        } else {
            self.packages.clone()
        }
    }
}

/// Delay and polling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Pause after login before the first upload
    #[serde(default = "default_pre_upload_delay")]
    pub pre_upload_delay_secs: u64,

    /// Pause after the last upload before publishing
    #[serde(default = "default_pre_publish_delay")]
    pub pre_publish_delay_secs: u64,

    /// Publish status polling interval
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Give up waiting for the publish after this long. Unset waits forever.
    #[serde(default)]
    pub max_publish_wait_secs: Option<u64>,
}

fn default_pre_upload_delay() -> u64 {
    3
}

fn default_pre_publish_delay() -> u64 {
    5
}

fn default_poll_interval() -> u64 {
    5
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            pre_upload_delay_secs: default_pre_upload_delay(),
            pre_publish_delay_secs: default_pre_publish_delay(),
            poll_interval_secs: default_poll_interval(),
            max_publish_wait_secs: None,
        }
    }
}
