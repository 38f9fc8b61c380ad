use serde::{Deserialize, Serialize};

use crate::domain::{Feature, TeamId, TeamMember, TeamSession};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTeamRequest {
    pub leader_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLoginRequest {
    pub team_id: TeamId,
    pub email: String,
}

impl From<&TeamSession> for TeamLoginRequest {
    fn from(session: &TeamSession) -> Self {
        Self {
            team_id: session.team_id.clone(),
            email: session.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

/// Answer to team generation and team login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCredentials {
    pub team_id: TeamId,
    pub email: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TeamCredentials {
    pub fn session(&self) -> TeamSession {
        TeamSession {
            team_id: self.team_id.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub token: String,
    pub role: String,
}

/// Body of both project create and project update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub github_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub features: Vec<Feature>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
}

pub type ProjectCreate = ProjectDraft;
pub type ProjectUpdate = ProjectDraft;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfUploadResult {
    pub filename: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_projects: u64,
    pub teams_with_projects: u64,
    pub projects_with_pdf: u64,
}
