//! Checks run before anything is sent to the backend.

use std::{collections::BTreeMap, sync::OnceLock};

use regex::Regex;
use shared::protocol::ProjectDraft;
use thiserror::Error;

use crate::error::ClientError;

pub const PDF_MIME: &str = "application/pdf";

static GITHUB_URL_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn github_url_re() -> &'static Regex {
    GITHUB_URL_RE.get_or_init(|| {
        Regex::new(r"^https?://(www\.)?github\.com/.+/.+").expect("static github url regex")
    })
}

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Description,
    GithubUrl,
    Features,
    LeaderEmail,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::GithubUrl => "githubUrl",
            Self::Features => "features",
            Self::LeaderEmail => "leaderEmail",
        }
    }
}

/// Per-field messages, rendered inline next to each field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.joined())]
pub struct ValidationErrors {
    fields: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn joined(&self) -> String {
        self.iter()
            .map(|(field, message)| format!("{}: {message}", field.as_str()))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.fields.insert(field, message.to_string());
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub fn validate_project(draft: &ProjectDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if draft.name.trim().is_empty() {
        errors.insert(Field::Name, "Project name is required");
    }
    if draft.description.trim().is_empty() {
        errors.insert(Field::Description, "Description is required");
    }
    if !github_url_re().is_match(&draft.github_url) {
        errors.insert(Field::GithubUrl, "Enter a valid GitHub repository URL");
    }
    if draft.features.is_empty() {
        errors.insert(Field::Features, "Add at least one feature");
    }
    errors.into_result()
}

pub fn validate_leader_email(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !email_re().is_match(email) {
        errors.insert(Field::LeaderEmail, "Enter a valid email address");
    }
    errors.into_result()
}

/// The draft as it is sent: text fields trimmed, lists untouched.
pub fn normalize_draft(draft: &ProjectDraft) -> ProjectDraft {
    ProjectDraft {
        name: draft.name.trim().to_string(),
        description: draft.description.trim().to_string(),
        github_url: draft.github_url.trim().to_string(),
        team_name: draft
            .team_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        features: draft.features.clone(),
        team_members: draft.team_members.clone(),
    }
}

/// Only PDFs may be attached; the type is guessed from the file name.
pub fn ensure_pdf_upload(filename: &str) -> Result<(), ClientError> {
    let is_pdf = mime_guess::from_path(filename)
        .first()
        .is_some_and(|mime| mime.essence_str() == PDF_MIME);
    if is_pdf {
        Ok(())
    } else {
        Err(ClientError::InvalidUpload(format!(
            "'{filename}' is not a PDF file"
        )))
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
