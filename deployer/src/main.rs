//! custdeploy - Entry Point
//!
//! Uploads a dated set of customization packages to a platform instance,
//! publishes them and waits for the publish to finish.

mod cli;

use std::path::Path;

use anyhow::{anyhow, Context};
use clap::Parser;
use colored::Colorize;
use secrecy::SecretString;
use tracing::{error, info, warn};

use cli::Cli;
use custdeploy::app::options::AppOptions;
use custdeploy::app::run::run;
use custdeploy::deploy::plan::build_plan;
use custdeploy::filesys::file::File;
use custdeploy::logs::{init_logging, LogOptions};
use custdeploy::storage::layout::PackageLayout;
use custdeploy::storage::settings::Settings;
use custdeploy::utils::version_info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: cli
            .log_level
            .clone()
            .unwrap_or_else(|| settings.log_level.clone()),
        log_file: cli.log_file.clone(),
        stdout: !cli.quiet,
        json_format: cli.json_logs,
    };
    let log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    let version = version_info();
    info!(
        "custdeploy {} ({}, built {})",
        version.version, version.git_hash, version.build_time
    );

    let code = match deploy(cli, settings).await {
        Ok(true) => {
            println!("{}", "[SUCCESS] Deployment completed".green().bold());
            0
        }
        Ok(false) => {
            eprintln!("{}", "[ERROR] Deployment failed".red().bold());
            1
        }
        Err(e) => {
            error!("Critical error: {:#}", e);
            eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
            1
        }
    };

    // Flush the log file before exiting
    drop(log_guard);
    std::process::exit(code);
}

async fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => File::new(path)
            .read_json::<Settings>()
            .await
            .with_context(|| format!("Unable to read settings file {}", path.display())),
        None => Ok(Settings::default()),
    }
}

async fn deploy(cli: Cli, mut settings: Settings) -> anyhow::Result<bool> {
    if cli.validate_only {
        settings.publish.only_validation = true;
    }
    if let Some(secs) = cli.max_publish_wait {
        settings.timing.max_publish_wait_secs = Some(secs);
    }

    let package_dir = match (&cli.package_dir, &cli.package_date) {
        (Some(dir), _) => dir.clone(),
        (None, Some(date)) => PackageLayout::new(&settings.packages_root)
            .package_dir(date)
            .path()
            .to_path_buf(),
        (None, None) => return Err(anyhow!("Either --package-dir or --package-date is required")),
    };

    let instance_url = cli.instance_url.or_else(|| settings.instance_url.clone());

    if cli.plan_only {
        let specs = settings.package_specs(instance_url.as_deref());
        let plan = build_plan(&package_dir, &specs).await?;
        for unit in plan.units() {
            println!(
                "{:>3}  {:<45} {}",
                unit.project_level(),
                unit.project_name(),
                unit.file_path.display()
            );
        }
        return Ok(true);
    }

    let instance_url = instance_url
        .ok_or_else(|| anyhow!("Missing instance URL. Provide --instance-url or set instance_url in the settings file"))?;
    let username = cli
        .username
        .or_else(|| settings.username.clone())
        .ok_or_else(|| anyhow!("Missing username. Provide --username or set username in the settings file"))?;
    let password = cli
        .password
        .ok_or_else(|| anyhow!("Missing password. Provide --password or set CUSTDEPLOY_PASSWORD"))?;

    if settings.publish.only_validation {
        warn!("Validation only: packages will be checked but not published");
    }

    let options = AppOptions::from_settings(
        &settings,
        instance_url,
        username,
        SecretString::from(password),
        package_dir,
    );

    let report = run(options).await.context("Deployment could not start")?;
    Ok(report.is_success())
}
