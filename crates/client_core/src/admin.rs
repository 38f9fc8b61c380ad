use std::{cmp::Reverse, collections::HashSet};

use shared::{domain::Project, protocol::AdminStats};

/// Case-insensitive match on project name, team id, contact email and team
/// name. An empty query keeps everything.
pub fn filter_projects<'a>(projects: &'a [Project], query: &str) -> Vec<&'a Project> {
    let needle = query.trim().to_lowercase();
    projects
        .iter()
        .filter(|project| needle.is_empty() || matches_query(project, &needle))
        .collect()
}

fn matches_query(project: &Project, needle: &str) -> bool {
    project.name.to_lowercase().contains(needle)
        || project.team_id.as_str().to_lowercase().contains(needle)
        || project.email.to_lowercase().contains(needle)
        || project
            .team_name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(needle))
}

/// Newest submission first; unparsable timestamps sort last.
pub fn sort_newest_first(projects: &mut [Project]) {
    projects.sort_by_key(|project| Reverse(project.submitted_at_utc()));
}

/// Same figures the backend reports, computed from a listing already held.
pub fn summarize(projects: &[Project]) -> AdminStats {
    let teams: HashSet<&str> = projects.iter().map(|p| p.team_id.as_str()).collect();
    AdminStats {
        total_projects: projects.len() as u64,
        teams_with_projects: teams.len() as u64,
        projects_with_pdf: projects.iter().filter(|p| p.has_pdf()).count() as u64,
    }
}
