//! Command-line interface definition

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use custdeploy::logs::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "custdeploy")]
#[command(about = "Upload and publish customization packages")]
#[command(version)]
#[command(group(ArgGroup::new("source").required(true).args(["package_date", "package_dir"])))]
pub struct Cli {
    /// Platform instance URL, e.g. https://erp.example.com/Site
    #[arg(long, env = "CUSTDEPLOY_INSTANCE_URL")]
    pub instance_url: Option<String>,

    /// Login name
    #[arg(long, env = "CUSTDEPLOY_USERNAME")]
    pub username: Option<String>,

    /// Login password, required unless --plan-only
    #[arg(long, env = "CUSTDEPLOY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Package date; packages are read from <packages_root>/<package_date>
    #[arg(long)]
    pub package_date: Option<String>,

    /// Read packages from this directory instead
    #[arg(long)]
    pub package_dir: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Do not log to the console; use with --log-file
    #[arg(long, short)]
    pub quiet: bool,

    /// Only validate the packages, do not publish them
    #[arg(long)]
    pub validate_only: bool,

    /// Stop waiting for the publish after this many seconds
    #[arg(long, value_name = "SECS")]
    pub max_publish_wait: Option<u64>,

    /// Resolve and print the package plan without contacting the platform
    #[arg(long)]
    pub plan_only: bool,
}
