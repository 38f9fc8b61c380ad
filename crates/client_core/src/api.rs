use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    multipart::{Form, Part},
    Client, Method, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Project, ProjectId, TeamSession},
    error::ApiException,
    protocol::{
        AdminCredentials, AdminLoginRequest, AdminStats, GenerateTeamRequest, PdfUploadResult,
        ProjectDraft, TeamCredentials, TeamLoginRequest,
    },
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    local_store::{LocalStore, AUTH_TOKEN_KEY},
    session_store::CredentialProvider,
    validation::{ensure_pdf_upload, PDF_MIME},
};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

const UNKNOWN_ERROR: &str = "Unknown error";
const UPLOAD_FAILED: &str = "Upload failed";

/// REST client for the submission backend. Holds the bearer credential in
/// memory and mirrors it to local storage under [`AUTH_TOKEN_KEY`].
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    local_store: Arc<dyn LocalStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, local_store: Arc<dyn LocalStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
            local_store,
        }
    }

    /// Builds a client and picks up a credential persisted by an earlier run.
    /// An unreadable credential is treated as absent.
    pub async fn restore(base_url: impl Into<String>, local_store: Arc<dyn LocalStore>) -> Self {
        let client = Self::new(base_url, local_store);
        match client.local_store.get_item(AUTH_TOKEN_KEY).await {
            Ok(token) => *client.token.write().await = token.filter(|t| !t.is_empty()),
            Err(err) => warn!("auth: failed to read persisted credential: {err:#}"),
        }
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn access_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set_auth_token(&self, token: Option<String>) -> Result<(), ClientError> {
        *self.token.write().await = token.clone();
        match token {
            Some(token) => self.local_store.set_item(AUTH_TOKEN_KEY, &token).await?,
            None => self.local_store.remove_item(AUTH_TOKEN_KEY).await?,
        }
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        debug!("auth: discarding access credential");
        self.set_auth_token(None).await
    }

    pub async fn generate_team(&self, leader_email: &str) -> Result<TeamCredentials, ClientError> {
        let creds: TeamCredentials = self
            .send_json(
                self.request(Method::POST, "/api/auth/generate-team")
                    .await
                    .json(&GenerateTeamRequest {
                        leader_email: leader_email.to_string(),
                    }),
            )
            .await?;
        self.set_auth_token(Some(creds.token.clone())).await?;
        info!("auth: team generated team_id={}", creds.team_id);
        Ok(creds)
    }

    pub async fn team_login(&self, session: &TeamSession) -> Result<TeamCredentials, ClientError> {
        let creds: TeamCredentials = self
            .send_json(
                self.request(Method::POST, "/api/auth/team-login")
                    .await
                    .json(&TeamLoginRequest::from(session)),
            )
            .await?;
        self.set_auth_token(Some(creds.token.clone())).await?;
        info!("auth: team login ok team_id={}", creds.team_id);
        Ok(creds)
    }

    pub async fn admin_login(&self, password: &str) -> Result<AdminCredentials, ClientError> {
        let creds: AdminCredentials = self
            .send_json(
                self.request(Method::POST, "/api/auth/admin-login")
                    .await
                    .json(&AdminLoginRequest {
                        password: password.to_string(),
                    }),
            )
            .await?;
        self.set_auth_token(Some(creds.token.clone())).await?;
        info!("auth: admin login ok role={}", creds.role);
        Ok(creds)
    }

    pub async fn list_team_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.send_json(self.request(Method::GET, "/api/projects/").await)
            .await
    }

    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ClientError> {
        self.send_json(self.request(Method::POST, "/api/projects/").await.json(draft))
            .await
    }

    pub async fn update_project(
        &self,
        id: &ProjectId,
        draft: &ProjectDraft,
    ) -> Result<Project, ClientError> {
        self.send_json(
            self.request(Method::PUT, &format!("/api/projects/{id}"))
                .await
                .json(draft),
        )
        .await
    }

    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/api/projects/{id}"))
            .await
            .send()
            .await?;
        check_status(response, UNKNOWN_ERROR).await?;
        Ok(())
    }

    pub async fn upload_pdf(
        &self,
        id: &ProjectId,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<PdfUploadResult, ClientError> {
        ensure_pdf_upload(filename)?;
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(PDF_MIME)?;
        let form = Form::new().part("file", part);

        // Multipart requests pick their own content type.
        let mut request = self
            .http
            .post(format!("{}/api/projects/{id}/upload-pdf", self.base_url));
        if let Some(token) = self.access_token().await {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = request.multipart(form).send().await?;
        let response = check_status(response, UPLOAD_FAILED).await?;
        decode(response).await
    }

    pub async fn admin_projects(&self, search: Option<&str>) -> Result<Vec<Project>, ClientError> {
        let mut request = self.request(Method::GET, "/api/admin/projects").await;
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            request = request.query(&[("search", search)]);
        }
        self.send_json(request).await
    }

    pub async fn admin_stats(&self) -> Result<AdminStats, ClientError> {
        self.send_json(self.request(Method::GET, "/api/admin/stats").await)
            .await
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.access_token().await {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let response = check_status(response, UNKNOWN_ERROR).await?;
        decode(response).await
    }
}

async fn check_status(response: Response, fallback_message: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let err = ApiException::from_body(status.as_u16(), &body, fallback_message);
    warn!(
        "api: request failed path={url} status={} message={}",
        err.status, err.message
    );
    Err(err.into())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| ClientError::Decode(err.to_string()))
}

#[async_trait]
impl CredentialProvider for ApiClient {
    async fn has_access_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn clear_access_token(&self) -> anyhow::Result<()> {
        self.logout().await.map_err(anyhow::Error::from)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
