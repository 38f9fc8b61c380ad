//! Page-level workflows: each one validates, calls the backend, then applies
//! the answer to the [`SessionStore`] wholesale.

use std::{path::Path, sync::Arc};

use shared::{
    domain::{Project, ProjectId, TeamSession},
    protocol::{AdminCredentials, AdminStats, PdfUploadResult, ProjectDraft, TeamCredentials},
};
use tracing::{info, warn};

use crate::{
    admin::sort_newest_first,
    api::ApiClient,
    error::ClientError,
    local_store::LocalStore,
    session_store::SessionStore,
    validation::{ensure_pdf_upload, normalize_draft, validate_leader_email, validate_project},
};

#[derive(Debug, Clone)]
pub struct PdfAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PdfAttachment {
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::InvalidUpload(format!("'{}' has no file name", path.display())))?;
        ensure_pdf_upload(&filename)?;
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            ClientError::InvalidUpload(format!("failed to read '{}': {err}", path.display()))
        })?;
        Ok(Self { filename, bytes })
    }
}

#[derive(Debug)]
pub struct SubmissionOutcome {
    pub project: Project,
    pub created: bool,
    /// `None` when no PDF was attached. A failed upload does not undo the
    /// submission.
    pub pdf: Option<Result<PdfUploadResult, ClientError>>,
}

#[derive(Debug, Clone)]
pub struct AdminOverview {
    pub projects: Vec<Project>,
    pub stats: AdminStats,
}

pub struct Portal {
    api: Arc<ApiClient>,
    store: Arc<SessionStore>,
}

impl Portal {
    pub fn new(api: Arc<ApiClient>, store: Arc<SessionStore>) -> Self {
        Self { api, store }
    }

    /// Restores the persisted credential and session from `local_store`.
    pub async fn open(base_url: impl Into<String>, local_store: Arc<dyn LocalStore>) -> Self {
        let api = Arc::new(ApiClient::restore(base_url, Arc::clone(&local_store)).await);
        let store = SessionStore::initialize(local_store, api.clone()).await;
        Self::new(api, store)
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub async fn register_team(&self, leader_email: &str) -> Result<TeamCredentials, ClientError> {
        validate_leader_email(leader_email)?;
        let creds = self.api.generate_team(leader_email).await?;
        self.store.set_session(Some(creds.session())).await?;
        Ok(creds)
    }

    pub async fn team_login(&self, session: &TeamSession) -> Result<TeamCredentials, ClientError> {
        let creds = self.api.team_login(session).await?;
        self.store.set_session(Some(creds.session())).await?;
        Ok(creds)
    }

    pub async fn admin_login(&self, password: &str) -> Result<AdminCredentials, ClientError> {
        self.api.admin_login(password).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.store.set_session(None).await?;
        Ok(())
    }

    /// Refetches the team's projects and returns the derived team view.
    pub async fn load_dashboard(&self) -> Result<Vec<Project>, ClientError> {
        self.require_team().await?;
        let projects = self.api.list_team_projects().await?;
        info!("dashboard: loaded projects count={}", projects.len());
        self.store.set_projects(projects).await;
        Ok(self.store.team_projects().await)
    }

    /// Creates a project, or updates `existing` when given, then uploads the
    /// optional PDF.
    pub async fn submit_project(
        &self,
        existing: Option<&ProjectId>,
        draft: &ProjectDraft,
        pdf: Option<PdfAttachment>,
    ) -> Result<SubmissionOutcome, ClientError> {
        validate_project(draft)?;
        self.require_team().await?;
        let draft = normalize_draft(draft);

        let (mut project, created) = match existing {
            Some(id) => {
                let project = self.api.update_project(id, &draft).await?;
                if !self.store.update_project(project.clone()).await {
                    // Not cached yet (e.g. edited before the dashboard loaded).
                    self.store.add_project(project.clone()).await;
                }
                (project, false)
            }
            None => {
                let project = self.api.create_project(&draft).await?;
                self.store.add_project(project.clone()).await;
                (project, true)
            }
        };
        info!(
            "submit: project saved id={} created={created} features={} members={}",
            project.id,
            project.features.len(),
            project.team_members.len()
        );

        let pdf = match pdf {
            Some(attachment) => {
                let result = self
                    .api
                    .upload_pdf(&project.id, &attachment.filename, attachment.bytes)
                    .await;
                match &result {
                    Ok(upload) => {
                        project.prompt_pdf_name =
                            Some(upload.blob_name.clone().unwrap_or_else(|| upload.filename.clone()));
                        project.prompt_pdf_url = Some(upload.url.clone());
                        self.store.update_project(project.clone()).await;
                    }
                    Err(err) => warn!("submit: pdf upload failed id={} err={err}", project.id),
                }
                Some(result)
            }
            None => None,
        };

        Ok(SubmissionOutcome {
            project,
            created,
            pdf,
        })
    }

    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), ClientError> {
        self.require_team().await?;
        self.api.delete_project(id).await?;
        self.store.delete_project(id).await;
        Ok(())
    }

    /// All submissions (newest first) plus the backend's stats, fetched
    /// together.
    pub async fn admin_overview(&self, search: Option<&str>) -> Result<AdminOverview, ClientError> {
        if self.api.access_token().await.is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        let (mut projects, stats) =
            tokio::try_join!(self.api.admin_projects(search), self.api.admin_stats())?;
        sort_newest_first(&mut projects);
        Ok(AdminOverview { projects, stats })
    }

    async fn require_team(&self) -> Result<(), ClientError> {
        if self.store.is_authenticated().await {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }
}

#[cfg(test)]
#[path = "tests/portal_tests.rs"]
mod tests;
