mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    admin::{filter_projects, summarize},
    ClientError, ListEditor, ListView, Portal,
};
use shared::{
    domain::{Project, ProjectId, TeamSession},
    error::Recovery,
    protocol::ProjectDraft,
};
use storage::Storage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, prepare_api_base_url, prepare_storage_url};

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Hackathon submission portal client")]
struct Cli {
    /// Backend base URL, overrides config and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Local storage location (sqlite URL or file path).
    #[arg(long, global = true)]
    storage_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a team for a leader email and sign in as it.
    Register { email: String },
    /// Sign in to an existing team.
    Login { team_id: String, email: String },
    Logout,
    /// Show the current session and local state.
    Status,
    /// List the team's submissions.
    Projects,
    /// Submit a new project, or edit one with --edit.
    Submit(SubmitArgs),
    Delete { id: String },
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
struct SubmitArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    github_url: String,
    #[arg(long)]
    team_name: Option<String>,
    /// Feature, in ranked order. Repeat for more.
    #[arg(long = "feature")]
    features: Vec<String>,
    /// Team member. Repeat for more.
    #[arg(long = "member")]
    members: Vec<String>,
    /// Prompt PDF to attach.
    #[arg(long)]
    pdf: Option<PathBuf>,
    /// Id of the project to update instead of creating one.
    #[arg(long)]
    edit: Option<String>,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    Login {
        password: String,
    },
    Projects {
        /// Server-side search on name, team id and email.
        #[arg(long)]
        search: Option<String>,
        /// Further narrows the fetched listing locally, including team names.
        #[arg(long)]
        filter: Option<String>,
    },
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url.clone() {
        settings.api_base_url = api_url;
    }
    if let Some(storage_url) = cli.storage_url.clone() {
        settings.storage_url = storage_url;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let api_base_url = prepare_api_base_url(&settings.api_base_url)?;
    let storage_url = prepare_storage_url(&settings.storage_url);
    let storage = Arc::new(
        Storage::new(&storage_url)
            .await
            .with_context(|| format!("failed to open local storage '{storage_url}'"))?,
    );
    info!("portal: starting api={api_base_url} storage={storage_url}");

    let portal = Portal::open(api_base_url, storage.clone()).await;
    match run(&portal, &storage, cli.command).await {
        Ok(()) => Ok(()),
        Err(err) => {
            report(&err);
            std::process::exit(1);
        }
    }
}

async fn run(portal: &Portal, storage: &Storage, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Register { email } => {
            let creds = portal.register_team(&email).await?;
            println!("Team created: {}", creds.team_id);
            if let Some(message) = creds.message {
                println!("{message}");
            }
            println!("Keep this team id, you need it to sign in again.");
        }
        Command::Login { team_id, email } => {
            let creds = portal
                .team_login(&TeamSession::new(team_id, email))
                .await?;
            println!("Signed in as team {} ({})", creds.team_id, creds.email);
        }
        Command::Logout => {
            portal.logout().await?;
            println!("Signed out");
        }
        Command::Status => {
            storage.health_check().await?;
            println!("API: {}", portal.api().base_url());
            match portal.store().session().await {
                Some(session) => println!("Team: {} ({})", session.team_id, session.email),
                None => println!("Team: not signed in"),
            }
            let credential = portal.api().access_token().await.is_some();
            println!("Credential held: {}", if credential { "yes" } else { "no" });
            println!("Stored keys: {}", storage.keys().await?.join(", "));
        }
        Command::Projects => {
            let projects = portal.load_dashboard().await?;
            if projects.is_empty() {
                println!("No submission yet");
            }
            for project in &projects {
                print_project(project);
            }
        }
        Command::Submit(args) => submit(portal, args).await?,
        Command::Delete { id } => {
            portal.delete_project(&ProjectId::new(id.as_str())).await?;
            println!("Deleted project {id}");
        }
        Command::Admin(AdminCommand::Login { password }) => {
            let creds = portal.admin_login(&password).await?;
            println!("Signed in with role {}", creds.role);
        }
        Command::Admin(AdminCommand::Projects { search, filter }) => {
            let overview = portal.admin_overview(search.as_deref()).await?;
            let shown = filter_projects(&overview.projects, filter.as_deref().unwrap_or_default());
            for project in &shown {
                print_project(project);
            }
            let listed: Vec<Project> = shown.into_iter().cloned().collect();
            let local = summarize(&listed);
            println!(
                "{} shown, {} teams, {} with PDF",
                local.total_projects, local.teams_with_projects, local.projects_with_pdf
            );
        }
        Command::Admin(AdminCommand::Stats) => {
            let stats = portal.api().admin_stats().await?;
            println!("Total projects: {}", stats.total_projects);
            println!("Teams with projects: {}", stats.teams_with_projects);
            println!("Projects with PDF: {}", stats.projects_with_pdf);
        }
    }
    Ok(())
}

async fn submit(portal: &Portal, args: SubmitArgs) -> Result<(), ClientError> {
    let mut feature_editor = ListEditor::new();
    let mut features = Vec::new();
    for text in &args.features {
        if let Some(next) = feature_editor.add(&features, text) {
            features = next;
        }
    }
    let mut member_editor = ListEditor::new();
    let mut team_members = Vec::new();
    for name in &args.members {
        if let Some(next) = member_editor.add(&team_members, name) {
            team_members = next;
        }
    }

    let draft = ProjectDraft {
        name: args.name,
        description: args.description,
        github_url: args.github_url,
        team_name: args.team_name,
        features,
        team_members,
    };
    let pdf = match &args.pdf {
        Some(path) => Some(client_core::PdfAttachment::from_path(path).await?),
        None => None,
    };
    let existing = args.edit.map(ProjectId::new);

    let outcome = portal.submit_project(existing.as_ref(), &draft, pdf).await?;
    let verb = if outcome.created { "Submitted" } else { "Updated" };
    println!("{verb} project {}", outcome.project.id);
    match outcome.pdf {
        Some(Ok(upload)) => println!("Attached {} ({})", upload.filename, upload.url),
        Some(Err(err)) => {
            warn!("submit: project saved without pdf");
            eprintln!("PDF upload failed: {err}");
        }
        None => {}
    }
    print_project(&outcome.project);
    Ok(())
}

fn print_project(project: &Project) {
    println!("{} [{}] {}", project.id, project.team_id, project.name);
    if let Some(team_name) = &project.team_name {
        println!("  team: {team_name}");
    }
    println!("  contact: {}", project.email);
    println!("  repo: {}", project.github_url);
    println!("  submitted: {}", project.submitted_at);
    println!("  {}", project.description);
    println!("  features:");
    for (rank, feature) in ListView::new(&project.features).rows() {
        println!("    {rank}. {}", feature.label());
    }
    let members = ListView::new(&project.team_members);
    if !members.is_empty() {
        println!("  members: {}", members.labels().join(", "));
    }
    match (&project.prompt_pdf_name, &project.prompt_pdf_url) {
        (Some(name), Some(url)) if project.has_pdf() => println!("  prompt pdf: {name} ({url})"),
        (Some(name), None) if project.has_pdf() => println!("  prompt pdf: {name}"),
        _ => {}
    }
}

fn report(err: &ClientError) {
    match (err, err.recovery()) {
        (ClientError::Validation(errors), _) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {message}", field.as_str());
            }
        }
        (_, Recovery::Reauthenticate) => {
            eprintln!("{err}");
            eprintln!("Sign in again with `portal login` or `portal admin login`.");
        }
        (ClientError::Api(api), Recovery::Conflict) => {
            eprintln!("{}", api.message);
            if let Some(team_id) = api.existing_team_id() {
                eprintln!("This email already leads team {team_id}. Sign in with that id.");
            }
        }
        _ => eprintln!("{err}"),
    }
}
