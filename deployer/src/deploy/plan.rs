//! Deployment plan: which package files are uploaded, and in which order

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::DeployError;
use crate::filesys::dir::Dir;
use crate::models::customization::ProjectMetadata;

/// Configured package: a file name pattern plus the project metadata it is published under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// File name pattern, `*` and `?` wildcards allowed
    pub pattern: String,

    /// Project level; packages are applied in ascending order
    pub project_level: u32,

    /// Project description shown on the platform
    #[serde(default)]
    pub description: String,
}

impl PackageSpec {
    pub fn new(pattern: impl Into<String>, project_level: u32, description: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            project_level,
            description: description.into(),
        }
    }
}

/// One package file resolved for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUnit {
    /// Package archive on disk
    pub file_path: PathBuf,

    /// Metadata sent to the platform
    pub metadata: ProjectMetadata,
}

impl PackageUnit {
    pub fn new(
        file_path: impl Into<PathBuf>,
        project_name: impl Into<String>,
        project_level: u32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            metadata: ProjectMetadata {
                project_level,
                project_name: project_name.into(),
                project_description: description.into(),
                is_replace_if_exists: true,
            },
        }
    }

    pub fn project_name(&self) -> &str {
        &self.metadata.project_name
    }

    pub fn project_level(&self) -> u32 {
        self.metadata.project_level
    }
}

/// Ordered, non-empty list of packages with distinct project names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    units: Vec<PackageUnit>,
}

impl DeploymentPlan {
    /// Validate and order a list of units by ascending project level.
    /// Units sharing a level keep their given order.
    pub fn new(mut units: Vec<PackageUnit>) -> Result<Self, DeployError> {
        if units.is_empty() {
            return Err(DeployError::ConfigError(
                "Deployment plan contains no packages".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for unit in &units {
            if !seen.insert(unit.project_name()) {
                return Err(DeployError::DuplicateProject(unit.project_name().to_string()));
            }
        }

        units.sort_by_key(|unit| unit.project_level());
        Ok(Self { units })
    }

    pub fn units(&self) -> &[PackageUnit] {
        &self.units
    }

    // Never empty
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Project names in upload order
    pub fn project_names(&self) -> Vec<String> {
        self.units
            .iter()
            .map(|unit| unit.project_name().to_string())
            .collect()
    }
}

/// Base package version used unless the settings select another one
pub const DEFAULT_BASE_VERSION: &str = "0020";

/// Resolve configured package specs against the files in `base_dir`
///
/// A spec without a matching file is skipped with a warning. When several
/// files match a wildcard, the lexicographically first one wins and the
/// ambiguity is logged.
pub async fn build_plan(base_dir: &Path, specs: &[PackageSpec]) -> Result<DeploymentPlan, DeployError> {
    let dir = Dir::new(base_dir);
    if !dir.exists().await {
        return Err(DeployError::DirectoryNotFound(base_dir.to_path_buf()));
    }

    let mut ordered: Vec<&PackageSpec> = specs.iter().collect();
    ordered.sort_by_key(|spec| spec.project_level);

    let mut units = Vec::with_capacity(ordered.len());
    for spec in ordered {
        let matches = dir.matching_files(&spec.pattern).await?;
        if matches.len() > 1 {
            warn!(
                "{} files match {}, using {}",
                matches.len(),
                spec.pattern,
                matches[0].display()
            );
        }
        let Some(file_path) = matches.into_iter().next() else {
            warn!(
                "Customization project file not found: {}",
                base_dir.join(&spec.pattern).display()
            );
            continue;
        };

        let project_name = project_name_for(&file_path)?;
        debug!(
            "Resolved {} -> {} (level {})",
            spec.pattern, project_name, spec.project_level
        );
        units.push(PackageUnit::new(
            file_path,
            project_name,
            spec.project_level,
            spec.description.clone(),
        ));
    }

    if units.is_empty() {
        return Err(DeployError::NoPackages(base_dir.to_path_buf()));
    }

    let plan = DeploymentPlan::new(units)?;
    info!("Resolved {} package(s) in {}", plan.len(), base_dir.display());
    Ok(plan)
}

/// Project name of a package archive: its file name without the final extension
fn project_name_for(file_path: &Path) -> Result<String, DeployError> {
    file_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            DeployError::ConfigError(format!(
                "Cannot derive a project name from {}",
                file_path.display()
            ))
        })
}

/// Built-in package layers, used when the settings do not list any packages
///
/// `base_version` is the four digit build of the base layer, e.g. `0021`.
pub fn default_package_specs(base_version: &str) -> Vec<PackageSpec> {
    vec![
        PackageSpec::new(
            format!("RW.Base.22.210.{base_version}.zip"),
            1,
            "This Package contains all screens but the GST related screens & dll",
        ),
        PackageSpec::new(
            "RW.Screens.Extension.Files.23.213.0015.zip",
            2,
            "Contains customized screens of Acumatica",
        ),
        PackageSpec::new("RW.SiteMap.23.213.0015.zip", 3, "Readywire Product Navigation"),
        PackageSpec::new("RW.Branding.23.213.0015.zip", 4, "Readywire Branding Info"),
        PackageSpec::new("RW.Endpoints.23.213.0015.zip", 5, "APIs package"),
        PackageSpec::new("RW.Security.23.213.0015.zip", 6, "Roles & their access on screens"),
        PackageSpec::new(
            "RW.BusinessEvents.23.213.0015.zip",
            7,
            "Business Events and corresponding Notification Templates",
        ),
        PackageSpec::new(
            "RW.FinancialReports.23.213.0015.zip",
            8,
            "Readywire financial reports",
        ),
    ]
}
