use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            400 | 422 => Self::Validation,
            429 => Self::RateLimited,
            _ => Self::Internal,
        }
    }
}

/// What a caller should do after a failed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// 401/403: send the user back to a login view.
    Reauthenticate,
    /// 409: conflict-specific handling (e.g. team already registered).
    Conflict,
    /// Show the server message and let the user retry.
    Notify,
}

/// A non-2xx answer from the backend.
#[derive(Debug, Clone, Error)]
#[error("{status} {code:?}: {message}")]
pub struct ApiException {
    pub status: u16,
    pub code: ErrorCode,
    pub message: String,
    /// Structured `detail` body, kept when the server sent more than a string.
    pub detail: Option<Value>,
}

impl ApiException {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: ErrorCode::from_status(status),
            message: message.into(),
            detail: None,
        }
    }

    /// Builds the failure from a raw error body of the form `{"detail": ..}`.
    /// Bodies that do not parse fall back to `fallback_message`.
    pub fn from_body(status: u16, body: &str, fallback_message: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|mut value| value.get_mut("detail").map(Value::take));

        match detail {
            Some(Value::String(message)) => Self::new(status, message),
            Some(Value::Null) | None => Self::new(status, fallback_message),
            Some(structured) => {
                let message = structured
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| structured.to_string());
                Self {
                    detail: Some(structured),
                    ..Self::new(status, message)
                }
            }
        }
    }

    pub fn recovery(&self) -> Recovery {
        match self.status {
            401 | 403 => Recovery::Reauthenticate,
            409 => Recovery::Conflict,
            _ => Recovery::Notify,
        }
    }

    pub fn requires_login(&self) -> bool {
        self.recovery() == Recovery::Reauthenticate
    }

    /// Team id reported by a 409 on team generation. The server either sends
    /// a structured detail or a detail string that is itself JSON.
    pub fn existing_team_id(&self) -> Option<String> {
        if self.code != ErrorCode::Conflict {
            return None;
        }
        let from_value = |value: &Value| {
            value
                .get("teamId")
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        if let Some(detail) = &self.detail {
            return from_value(detail);
        }
        serde_json::from_str::<Value>(&self.message)
            .ok()
            .as_ref()
            .and_then(from_value)
    }
}
