use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::task::Task;

/// Input structure for creating or updating a project.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 200, message = "Project name is required"))]
    pub project_name: String,
    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub client_name: String,
    #[validate(length(min = 1, max = 1000, message = "Description is required"))]
    pub description: String,
}

/// A project owned by a manager and shared with a team.
///
/// `team` and `tasks` hold references by id, the way the project document is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub project_name: String,
    pub client_name: String,
    pub description: String,
    /// The user who created the project.
    pub manager: Uuid,
    /// Users granted access besides the manager.
    pub team: Vec<Uuid>,
    /// Tasks of the project, in creation order.
    pub tasks: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(input: ProjectInput, manager: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_name: input.project_name,
            client_name: input.client_name,
            description: input.description,
            manager,
            team: Vec::new(),
            tasks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: ProjectInput) {
        self.project_name = input.project_name;
        self.client_name = input.client_name;
        self.description = input.description;
        self.updated_at = Utc::now();
    }

    pub fn is_manager(&self, user_id: Uuid) -> bool {
        self.manager == user_id
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.team.contains(&user_id)
    }

    /// Managers and team members may read the project.
    pub fn can_access(&self, user_id: Uuid) -> bool {
        self.is_manager(user_id) || self.is_member(user_id)
    }
}

/// A project with its tasks populated, as returned by `GET /api/projects/{id}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub id: Uuid,
    pub project_name: String,
    pub client_name: String,
    pub description: String,
    pub manager: Uuid,
    pub team: Vec<Uuid>,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectDetails {
    pub fn new(project: Project, tasks: Vec<Task>) -> Self {
        Self {
            id: project.id,
            project_name: project.project_name,
            client_name: project.client_name,
            description: project.description,
            manager: project.manager,
            team: project.team,
            tasks,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProjectInput {
        ProjectInput {
            project_name: "Website".to_string(),
            client_name: "ACME".to_string(),
            description: "Landing page redesign".to_string(),
        }
    }

    #[test]
    fn test_project_access() {
        let manager = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut project = Project::new(input(), manager);
        project.team.push(member);

        assert!(project.can_access(manager));
        assert!(project.can_access(member));
        assert!(!project.is_manager(member));
        assert!(!project.can_access(Uuid::new_v4()));
    }

    #[test]
    fn test_project_input_validation() {
        assert!(input().validate().is_ok());

        let missing_client = ProjectInput {
            client_name: String::new(),
            ..input()
        };
        assert!(missing_client.validate().is_err());
    }

    #[test]
    fn test_project_serializes_camel_case() {
        let project = Project::new(input(), Uuid::new_v4());
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["projectName"], "Website");
        assert_eq!(json["clientName"], "ACME");
        assert!(json["team"].as_array().unwrap().is_empty());
    }
}
