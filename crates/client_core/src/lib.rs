pub mod admin;
pub mod api;
pub mod error;
pub mod local_store;
pub mod ordered_list;
pub mod portal;
pub mod session_store;
pub mod validation;

pub use api::{ApiClient, DEFAULT_API_BASE_URL};
pub use error::ClientError;
pub use local_store::{LocalStore, MemoryLocalStore, AUTH_TOKEN_KEY, SESSION_KEY};
pub use ordered_list::{DragGesture, KeyOutcome, ListEditor, ListKey, ListView};
pub use portal::{AdminOverview, PdfAttachment, Portal, SubmissionOutcome};
pub use session_store::{CredentialProvider, NoCredentials, SessionStore, StoreEvent};

#[cfg(test)]
#[path = "tests/mock_backend.rs"]
mod mock_backend;
