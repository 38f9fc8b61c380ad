use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(TeamId);
id_newtype!(ProjectId);
id_newtype!(ItemId);

impl ItemId {
    /// Fresh process-unique identifier for a newly added list item.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Content carried by a ranked list row.
pub trait ListPayload: Clone {
    fn from_text(text: String) -> Self;
    fn label(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureText {
    pub text: String,
}

impl ListPayload for FeatureText {
    fn from_text(text: String) -> Self {
        Self { text }
    }

    fn label(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberName {
    pub name: String,
}

impl ListPayload for MemberName {
    fn from_text(name: String) -> Self {
        Self { name }
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// One row of a ranked list. The payload is flattened on the wire, so a
/// feature reads `{"id": .., "text": ..}` and a member `{"id": .., "name": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem<T> {
    pub id: ItemId,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: ListPayload> ListItem<T> {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ItemId::generate(),
            payload: T::from_text(text.into()),
        }
    }

    pub fn label(&self) -> &str {
        self.payload.label()
    }
}

pub type Feature = ListItem<FeatureText>;
pub type TeamMember = ListItem<MemberName>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSession {
    pub team_id: TeamId,
    pub email: String,
}

impl TeamSession {
    pub fn new(team_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            team_id: TeamId::new(team_id),
            email: email.into(),
        }
    }
}

/// Canonical project record. Records written before team rosters existed
/// carry neither `teamName` nor `teamMembers`; they load with an empty roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub team_id: TeamId,
    pub email: String,
    pub name: String,
    pub description: String,
    pub github_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub features: Vec<Feature>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub prompt_pdf_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_pdf_url: Option<String>,
    pub submitted_at: String,
}

impl Project {
    pub fn has_pdf(&self) -> bool {
        self.prompt_pdf_name
            .as_deref()
            .is_some_and(|name| !name.is_empty())
    }

    /// Submission time as UTC. The backend emits naive ISO-8601 timestamps,
    /// older records may carry RFC 3339.
    pub fn submitted_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.submitted_at)
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
