//! Static task-type to platform table.
//!
//! The table is closed: adding a task type means adding a row here. Anything
//! not listed is unroutable and the dispatcher answers with a clarification
//! request instead of an error.

/// Every routable task type and the platform that owns it.
pub const PLATFORM_ROUTES: &[(&str, &str)] = &[
    ("github_create_issue", "github"),
    ("github_create_pr", "github"),
    ("github_list_repos", "github"),
    ("github_update_repo", "github"),
    ("code_review", "github"),
    ("repository_management", "github"),
    ("send_email", "gmail"),
    ("check_email", "gmail"),
    ("schedule_email", "gmail"),
    ("email_followup", "gmail"),
    ("create_ticket", "jira"),
    ("update_ticket", "jira"),
    ("assign_ticket", "jira"),
    ("track_progress", "jira"),
    ("project_management", "jira"),
    ("schedule_meeting", "calendar"),
    ("check_availability", "calendar"),
    ("send_invite", "calendar"),
    ("reschedule_meeting", "calendar"),
];

/// Platform owning `task_type`, if any.
pub fn platform_for(task_type: &str) -> Option<&'static str> {
    PLATFORM_ROUTES
        .iter()
        .find(|(t, _)| *t == task_type)
        .map(|(_, platform)| *platform)
}

/// Task types routed to `platform`, in table order.
pub fn task_types_for(platform: &str) -> Vec<&'static str> {
    PLATFORM_ROUTES
        .iter()
        .filter(|(_, p)| *p == platform)
        .map(|(t, _)| *t)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_routes() {
        assert_eq!(platform_for("github_create_issue"), Some("github"));
        assert_eq!(platform_for("code_review"), Some("github"));
        assert_eq!(platform_for("email_followup"), Some("gmail"));
        assert_eq!(platform_for("project_management"), Some("jira"));
        assert_eq!(platform_for("reschedule_meeting"), Some("calendar"));
    }

    #[test]
    fn test_unknown_routes() {
        assert_eq!(platform_for("conversation"), None);
        assert_eq!(platform_for("github_list_issues"), None);
        assert_eq!(platform_for(""), None);
        assert_eq!(platform_for("SEND_EMAIL"), None);
    }

    #[test]
    fn test_table_shape() {
        assert_eq!(PLATFORM_ROUTES.len(), 19);
        assert_eq!(task_types_for("github").len(), 6);
        assert_eq!(task_types_for("gmail").len(), 4);
        assert_eq!(task_types_for("jira").len(), 5);
        assert_eq!(task_types_for("calendar").len(), 4);
        assert!(task_types_for("slack").is_empty());
    }

    #[test]
    fn test_no_duplicate_task_types() {
        let mut seen = std::collections::HashSet::new();
        for (task_type, _) in PLATFORM_ROUTES {
            assert!(seen.insert(*task_type), "duplicate route for {task_type}");
        }
    }
}
