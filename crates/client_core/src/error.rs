use shared::error::{ApiException, Recovery};
use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("api error: {0}")]
    Api(#[from] ApiException),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode server response: {0}")]
    Decode(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("local storage failure: {0:#}")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for ClientError {
    fn from(value: anyhow::Error) -> Self {
        Self::Storage(value)
    }
}

impl ClientError {
    pub fn api(&self) -> Option<&ApiException> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.api().map(|err| err.status)
    }

    /// How an outer layer should react. A missing local credential is
    /// handled like a rejected one.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Api(err) => err.recovery(),
            Self::NotAuthenticated => Recovery::Reauthenticate,
            _ => Recovery::Notify,
        }
    }
}
