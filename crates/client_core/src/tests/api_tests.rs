use shared::{
    domain::{Feature, TeamMember},
    error::{ErrorCode, Recovery},
};

use super::*;
use crate::{
    local_store::MemoryLocalStore,
    mock_backend::{team_token, MockBackend, ADMIN_PASSWORD, ADMIN_TOKEN},
};

fn draft(name: &str) -> ProjectDraft {
    ProjectDraft {
        name: name.to_string(),
        description: "Submission portal".to_string(),
        github_url: "https://github.com/acme/portal".to_string(),
        team_name: Some("Crabs".to_string()),
        features: vec![Feature::new("Upload"), Feature::new("Review")],
        team_members: vec![TeamMember::new("Ada")],
    }
}

async fn client_for(backend: &MockBackend) -> (ApiClient, Arc<MemoryLocalStore>) {
    let local = Arc::new(MemoryLocalStore::new());
    (ApiClient::new(backend.url.clone(), local.clone()), local)
}

#[tokio::test]
async fn generate_team_stores_and_persists_token() {
    let backend = MockBackend::spawn().await.expect("spawn backend");
    let (client, local) = client_for(&backend).await;

    let creds = client
        .generate_team("lead@example.com")
        .await
        .expect("generate");

    assert_eq!(creds.email, "lead@example.com");
    assert_eq!(creds.token, team_token(creds.team_id.as_str()));
    assert_eq!(client.access_token().await, Some(creds.token.clone()));
    assert_eq!(
        local.get_item(AUTH_TOKEN_KEY).await.expect("get"),
        Some(creds.token)
    );
}

#[tokio::test]
async fn generate_team_conflict_carries_existing_team() {
    let backend = MockBackend::spawn().await.expect("spawn backend");
    backend.seed_team("TEAM-OLD", "lead@example.com").await;
    let (client, _local) = client_for(&backend).await;

    let err = client
        .generate_team("lead@example.com")
        .await
        .expect_err("conflict");

    let api = err.api().expect("api failure");
    assert_eq!(api.code, ErrorCode::Conflict);
    assert_eq!(err.recovery(), Recovery::Conflict);
    assert_eq!(api.existing_team_id().as_deref(), Some("TEAM-OLD"));
    assert_eq!(client.access_token().await, None);
}

#[tokio::test]
async fn restore_reads_persisted_token_and_sends_bearer_header() {
    let backend = MockBackend::spawn().await.expect("spawn backend");
    backend.seed_team("TEAM-1", "lead@example.com").await;
    let local = Arc::new(MemoryLocalStore::new());
    local
        .set_item(AUTH_TOKEN_KEY, &team_token("TEAM-1"))
        .await
        .expect("seed token");

    let client = ApiClient::restore(format!("{}/", backend.url), local).await;
    assert_eq!(client.base_url(), backend.url);

    let projects = client.list_team_projects().await.expect("list");
    assert!(projects.is_empty());
    assert_eq!(
        backend.last_authorization().await,
        Some(format!("Bearer {}", team_token("TEAM-1")))
    );
}

#[tokio::test]
async fn unauthenticated_listing_asks_for_login() {
    let backend = MockBackend::spawn().await.expect("spawn backend");
    let (client, _local) = client_for(&backend).await;

    let err = client.list_team_projects().await.expect_err("401");
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.recovery(), Recovery::Reauthenticate);
    assert_eq!(err.api().expect("api").message, "Not authenticated");
    assert_eq!(backend.last_authorization().await, None);
}

#[tokio::test]
async fn project_lifecycle_round_trips_through_backend() {
    let backend = MockBackend::spawn().await.expect("spawn backend");
    backend.seed_team("TEAM-1", "lead@example.com").await;
    let (client, _local) = client_for(&backend).await;
    client
        .team_login(&TeamSession::new("TEAM-1", "lead@example.com"))
        .await
        .expect("login");

    let created = client.create_project(&draft("Portal")).await.expect("create");
    assert_eq!(created.team_id.as_str(), "TEAM-1");
    assert_eq!(created.features.len(), 2);
    assert_eq!(created.team_members[0].label(), "Ada");

    let mut reordered = draft("Portal v2");
    reordered.features.reverse();
    let updated = client
        .update_project(&created.id, &reordered)
        .await
        .expect("update");
    assert_eq!(updated.name, "Portal v2");
    assert_eq!(updated.features, reordered.features);

    client.delete_project(&created.id).await.expect("delete");
    assert!(client.list_team_projects().await.expect("list").is_empty());

    let err = client
        .delete_project(&created.id)
        .await
        .expect_err("already deleted");
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.api().expect("api").message, "Project not found");
}

#[tokio::test]
async fn upload_sends_pdf_multipart() {
    let backend = MockBackend::spawn().await.expect("spawn backend");
    backend.seed_team("TEAM-1", "lead@example.com").await;
    let (client, _local) = client_for(&backend).await;
    client
        .team_login(&TeamSession::new("TEAM-1", "lead@example.com"))
        .await
        .expect("login");
    let project = client.create_project(&draft("Portal")).await.expect("create");

    let result = client
        .upload_pdf(&project.id, "prompt.pdf", b"%PDF-1.4 fake".to_vec())
        .await
        .expect("upload");

    assert_eq!(result.filename, "prompt.pdf");
    assert_eq!(result.blob_name.as_deref(), Some("TEAM-1/prompt.pdf"));
    let state = backend.state.lock().await;
    assert_eq!(state.uploads.len(), 1);
    assert_eq!(state.uploads[0].project_id, project.id.as_str());
    assert_eq!(state.uploads[0].filename.as_deref(), Some("prompt.pdf"));
    assert_eq!(state.uploads[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(state.uploads[0].size, 13);
}

#[tokio::test]
async fn non_pdf_upload_never_reaches_backend() {
    let backend = MockBackend::spawn().await.expect("spawn backend");
    let (client, _local) = client_for(&backend).await;

    let err = client
        .upload_pdf(&ProjectId::new("p1"), "notes.txt", b"hi".to_vec())
        .await
        .expect_err("rejected");
    assert!(matches!(err, ClientError::InvalidUpload(_)));
    assert!(backend.state.lock().await.authorizations.is_empty());
}

#[tokio::test]
async fn admin_calls_send_search_only_when_given() {
    let backend = MockBackend::spawn().await.expect("spawn backend");
    let (client, _local) = client_for(&backend).await;

    let creds = client.admin_login(ADMIN_PASSWORD).await.expect("admin login");
    assert_eq!(creds.token, ADMIN_TOKEN);
    assert_eq!(creds.role, "admin");

    client.admin_projects(None).await.expect("all");
    client.admin_projects(Some("")).await.expect("empty search");
    client.admin_projects(Some("crab")).await.expect("search");
    let stats = client.admin_stats().await.expect("stats");
    assert_eq!(stats, AdminStats::default());

    let queries = backend.state.lock().await.admin_queries.clone();
    assert_eq!(queries, vec![None, None, Some("crab".to_string())]);
}

#[tokio::test]
async fn wrong_admin_password_is_rejected_and_no_token_kept() {
    let backend = MockBackend::spawn().await.expect("spawn backend");
    let (client, local) = client_for(&backend).await;

    let err = client.admin_login("nope").await.expect_err("rejected");
    assert_eq!(err.status(), Some(401));
    assert_eq!(client.access_token().await, None);
    assert!(local.get_item(AUTH_TOKEN_KEY).await.expect("get").is_none());
}

#[tokio::test]
async fn logout_discards_credential_everywhere() {
    let backend = MockBackend::spawn().await.expect("spawn backend");
    let (client, local) = client_for(&backend).await;
    client.admin_login(ADMIN_PASSWORD).await.expect("admin login");
    assert!(client.has_access_token().await);

    client.clear_access_token().await.expect("logout");

    assert!(!client.has_access_token().await);
    assert!(local.get_item(AUTH_TOKEN_KEY).await.expect("get").is_none());
}
