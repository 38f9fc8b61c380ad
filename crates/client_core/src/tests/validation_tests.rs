use shared::domain::{Feature, TeamMember};

use super::*;

fn draft() -> ProjectDraft {
    ProjectDraft {
        name: "Portal".to_string(),
        description: "Submission portal".to_string(),
        github_url: "https://github.com/acme/portal".to_string(),
        team_name: None,
        features: vec![Feature::new("Upload")],
        team_members: vec![TeamMember::new("Ada")],
    }
}

#[test]
fn accepts_complete_draft() {
    assert!(validate_project(&draft()).is_ok());

    let mut www = draft();
    www.github_url = "http://www.github.com/acme/portal".to_string();
    assert!(validate_project(&www).is_ok());
}

#[test]
fn reports_every_failing_field() {
    let empty = ProjectDraft {
        name: "   ".to_string(),
        description: String::new(),
        github_url: "https://gitlab.com/acme/portal".to_string(),
        team_name: None,
        features: Vec::new(),
        team_members: Vec::new(),
    };

    let errors = validate_project(&empty).expect_err("invalid");
    assert_eq!(errors.get(Field::Name), Some("Project name is required"));
    assert_eq!(errors.get(Field::Description), Some("Description is required"));
    assert_eq!(
        errors.get(Field::GithubUrl),
        Some("Enter a valid GitHub repository URL")
    );
    assert_eq!(errors.get(Field::Features), Some("Add at least one feature"));
    assert_eq!(errors.iter().count(), 4);
    assert_eq!(
        errors.to_string(),
        "name: Project name is required; description: Description is required; \
         githubUrl: Enter a valid GitHub repository URL; features: Add at least one feature"
    );
    let wrapped = ClientError::from(errors);
    assert!(wrapped.to_string().starts_with("validation failed: name: "));
}

#[test]
fn github_url_needs_owner_and_repo() {
    let mut owner_only = draft();
    owner_only.github_url = "https://github.com/acme".to_string();
    let errors = validate_project(&owner_only).expect_err("invalid");
    assert!(errors.get(Field::GithubUrl).is_some());
    assert_eq!(errors.to_string(), "githubUrl: Enter a valid GitHub repository URL");
}

#[test]
fn leader_email_shape() {
    assert!(validate_leader_email("lead@example.com").is_ok());
    for bad in ["", "lead", "lead@example", "le ad@example.com", "@example.com"] {
        let errors = validate_leader_email(bad).expect_err(bad);
        assert_eq!(errors.get(Field::LeaderEmail), Some("Enter a valid email address"));
    }
}

#[test]
fn normalize_trims_text_and_drops_blank_team_name() {
    let mut raw = draft();
    raw.name = "  Portal ".to_string();
    raw.github_url = " https://github.com/acme/portal\n".to_string();
    raw.team_name = Some("   ".to_string());

    let normalized = normalize_draft(&raw);
    assert_eq!(normalized.name, "Portal");
    assert_eq!(normalized.github_url, "https://github.com/acme/portal");
    assert_eq!(normalized.team_name, None);
    assert_eq!(normalized.features, raw.features);
}

#[test]
fn only_pdf_uploads_pass() {
    assert!(ensure_pdf_upload("prompt.pdf").is_ok());
    assert!(ensure_pdf_upload("PROMPT.PDF").is_ok());
    assert!(matches!(
        ensure_pdf_upload("prompt.docx"),
        Err(ClientError::InvalidUpload(_))
    ));
    assert!(ensure_pdf_upload("no-extension").is_err());
}
