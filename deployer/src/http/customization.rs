//! Customization API client

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{error, info};

use crate::deploy::plan::PackageUnit;
use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::http::client::SessionClient;
use crate::models::customization::{ImportRequest, PublishMode, PublishRequest, PublishStatus};
use crate::utils::sha256_hash;

/// Successful package import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub project_name: String,

    /// Size of the uploaded archive
    pub bytes: usize,

    /// SHA-256 of the uploaded archive, hex encoded
    pub sha256: String,
}

/// Operations the deployment needs from the platform
///
/// Implemented by [`SessionClient`]; tests drive the orchestrator with an
/// in-memory implementation.
#[async_trait]
pub trait CustomizationApi: Send {
    /// Authenticate the session
    async fn login(&mut self) -> Result<(), DeployError>;

    /// End the session. Never fails and is safe to call in any state.
    async fn logout(&mut self);

    /// Import one package
    async fn upload_package(&mut self, unit: &PackageUnit) -> Result<UploadResult, DeployError>;

    /// Start publishing the given projects. Returns once the platform accepted the request.
    async fn publish_begin(
        &mut self,
        project_names: &[String],
        mode: &PublishMode,
    ) -> Result<(), DeployError>;

    /// Fetch the state of the running publish
    async fn check_publish_status(&mut self) -> Result<PublishStatus, DeployError>;
}

impl SessionClient {
    /// Read, encode and import a package archive
    pub async fn import_package(&self, unit: &PackageUnit) -> Result<UploadResult, DeployError> {
        let project_name = unit.project_name().to_string();
        let upload_error = |detail: String| DeployError::UploadError {
            project: project_name.clone(),
            detail,
        };

        info!("Uploading package: {}", project_name);

        let file = File::new(&unit.file_path);
        if !file.exists().await {
            error!("Package file not found: {}", unit.file_path.display());
            return Err(upload_error(format!(
                "file not found: {}",
                unit.file_path.display()
            )));
        }

        let content = file
            .read_bytes()
            .await
            .map_err(|e| upload_error(e.to_string()))?;
        let sha256 = sha256_hash(&content);
        let request = ImportRequest {
            project: &unit.metadata,
            project_content_base64: STANDARD.encode(&content),
        };

        self.post_customization("Import", &request)
            .await
            .map_err(|detail| {
                error!("Error uploading {}: {}", unit.file_path.display(), detail);
                upload_error(detail)
            })?;

        info!("Upload successful for package: {}", project_name);
        Ok(UploadResult {
            project_name,
            bytes: content.len(),
            sha256,
        })
    }

    /// Trigger the asynchronous publish
    pub async fn begin_publish(
        &self,
        project_names: &[String],
        mode: &PublishMode,
    ) -> Result<(), DeployError> {
        info!("Starting publication of {} project(s)...", project_names.len());

        let request = PublishRequest::new(project_names, mode);
        self.post_customization("publishBegin", &request)
            .await
            .map_err(|detail| {
                error!("Failed to start publishing: {}", detail);
                DeployError::PublishTriggerError(detail)
            })?;

        info!("Publishing started successfully");
        Ok(())
    }

    /// Poll the publish job
    pub async fn publish_status(&self) -> Result<PublishStatus, DeployError> {
        let response = self
            .post_customization("publishEnd", &serde_json::json!({}))
            .await
            .map_err(DeployError::PollError)?;

        response
            .json::<PublishStatus>()
            .await
            .map_err(|e| DeployError::PollError(format!("invalid status response: {e}")))
    }
}

#[async_trait]
impl CustomizationApi for SessionClient {
    async fn login(&mut self) -> Result<(), DeployError> {
        SessionClient::login(self).await
    }

    async fn logout(&mut self) {
        SessionClient::logout(self).await
    }

    async fn upload_package(&mut self, unit: &PackageUnit) -> Result<UploadResult, DeployError> {
        self.import_package(unit).await
    }

    async fn publish_begin(
        &mut self,
        project_names: &[String],
        mode: &PublishMode,
    ) -> Result<(), DeployError> {
        self.begin_publish(project_names, mode).await
    }

    async fn check_publish_status(&mut self) -> Result<PublishStatus, DeployError> {
        self.publish_status().await
    }
}
