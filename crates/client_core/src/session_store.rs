use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::domain::{Project, ProjectId, TeamSession};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::local_store::{LocalStore, SESSION_KEY};

/// The collaborator holding the bearer credential.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn has_access_token(&self) -> bool;
    /// Discards the credential; invoked when the session is cleared.
    async fn clear_access_token(&self) -> Result<()>;
}

pub struct NoCredentials;

#[async_trait]
impl CredentialProvider for NoCredentials {
    async fn has_access_token(&self) -> bool {
        false
    }

    async fn clear_access_token(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    SessionChanged(Option<TeamSession>),
    ProjectsChanged { count: usize },
}

#[derive(Default)]
struct SessionStoreState {
    session: Option<TeamSession>,
    projects: Vec<Project>,
}

/// Current team session (persisted) and the in-memory project collection.
pub struct SessionStore {
    local_store: Arc<dyn LocalStore>,
    credentials: Arc<dyn CredentialProvider>,
    inner: RwLock<SessionStoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl SessionStore {
    /// Loads the persisted session, if any. A missing, unreadable or corrupt
    /// value yields a store with no session. Projects always start empty.
    pub async fn initialize(
        local_store: Arc<dyn LocalStore>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Arc<Self> {
        let session = load_persisted_session(local_store.as_ref()).await;
        if let Some(session) = &session {
            info!("session: restored team_id={}", session.team_id);
        }
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            local_store,
            credentials,
            inner: RwLock::new(SessionStoreState {
                session,
                projects: Vec::new(),
            }),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn session(&self) -> Option<TeamSession> {
        self.inner.read().await.session.clone()
    }

    /// Setting `None` also removes the persisted session and discards the
    /// access credential. In-memory state changes before anything is written.
    pub async fn set_session(&self, session: Option<TeamSession>) -> Result<()> {
        let changed = {
            let mut guard = self.inner.write().await;
            let changed = guard.session != session;
            guard.session = session.clone();
            changed
        };
        if changed {
            self.emit(StoreEvent::SessionChanged(session.clone()));
        }

        match session {
            Some(session) => {
                let serialized =
                    serde_json::to_string(&session).context("failed to serialize session")?;
                self.local_store
                    .set_item(SESSION_KEY, &serialized)
                    .await
                    .context("failed to persist session")?;
                debug!("session: persisted team_id={}", session.team_id);
            }
            None => {
                // The credential goes even when the session row cannot be removed.
                let removed = self.local_store.remove_item(SESSION_KEY).await;
                let cleared = self.credentials.clear_access_token().await;
                removed.context("failed to remove persisted session")?;
                cleared.context("failed to discard access credential")?;
                info!("session: cleared");
            }
        }
        Ok(())
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.inner.read().await.projects.clone()
    }

    pub async fn set_projects(&self, projects: Vec<Project>) {
        let count = {
            let mut guard = self.inner.write().await;
            guard.projects = projects;
            guard.projects.len()
        };
        self.emit(StoreEvent::ProjectsChanged { count });
    }

    pub async fn add_project(&self, project: Project) {
        let count = {
            let mut guard = self.inner.write().await;
            guard.projects.push(project);
            guard.projects.len()
        };
        self.emit(StoreEvent::ProjectsChanged { count });
    }

    /// Replaces the project with the same id. Unknown ids are ignored, never
    /// inserted. Returns whether anything was replaced.
    pub async fn update_project(&self, project: Project) -> bool {
        let count = {
            let mut guard = self.inner.write().await;
            let Some(slot) = guard.projects.iter_mut().find(|p| p.id == project.id) else {
                debug!("session: ignoring update for unknown project id={}", project.id);
                return false;
            };
            *slot = project;
            guard.projects.len()
        };
        self.emit(StoreEvent::ProjectsChanged { count });
        true
    }

    pub async fn delete_project(&self, id: &ProjectId) -> bool {
        let count = {
            let mut guard = self.inner.write().await;
            let before = guard.projects.len();
            guard.projects.retain(|p| &p.id != id);
            if guard.projects.len() == before {
                return false;
            }
            guard.projects.len()
        };
        self.emit(StoreEvent::ProjectsChanged { count });
        true
    }

    /// Projects of the current team in collection order; empty without a
    /// session.
    pub async fn team_projects(&self) -> Vec<Project> {
        let guard = self.inner.read().await;
        let Some(session) = &guard.session else {
            return Vec::new();
        };
        guard
            .projects
            .iter()
            .filter(|p| p.team_id == session.team_id)
            .cloned()
            .collect()
    }

    pub async fn is_authenticated(&self) -> bool {
        let has_session = self.inner.read().await.session.is_some();
        has_session && self.credentials.has_access_token().await
    }

    fn emit(&self, event: StoreEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}

async fn load_persisted_session(local_store: &dyn LocalStore) -> Option<TeamSession> {
    let raw = match local_store.get_item(SESSION_KEY).await {
        Ok(raw) => raw?,
        Err(err) => {
            warn!("session: failed to read persisted session: {err:#}");
            return None;
        }
    };
    match serde_json::from_str::<TeamSession>(&raw) {
        Ok(session) => Some(session),
        Err(err) => {
            warn!("session: ignoring unparsable persisted session: {err}");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/session_store_tests.rs"]
mod tests;
