use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::seeds;

/// Placeholder stored for an empty name reference.
pub const NONE_MARKER: &str = "-";

/// A record type persisted as one JSON array under one store key.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug {
    /// Store key of the collection.
    const KEY: &'static str;
    /// Human-readable singular name, used in messages.
    const LABEL: &'static str;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);

    /// Records written the first time the collection is accessed.
    fn seed() -> Vec<Self>;
}

/// A node in the department hierarchy. `parent` is a department *name*.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Department {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "none_marker")]
    pub parent: String,
    #[serde(default)]
    pub main_branch: String,
}

impl Department {
    pub fn has_parent(&self) -> bool {
        !self.parent.is_empty() && self.parent != NONE_MARKER
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub can_view_all_tasks: bool,
    #[serde(default)]
    pub can_view_all_teams: bool,
    #[serde(default)]
    pub is_team_lead_role: bool,
}

/// A login account. `role` and `department` hold names, not ids.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default = "none_marker")]
    pub role: String,
    #[serde(default = "none_marker")]
    pub department: String,
    #[serde(default, rename = "linkedContact")]
    pub linked_contact: String,
    #[serde(default = "default_true")]
    pub staff_status: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Team {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub department: String,
    /// Username of the team lead.
    #[serde(default)]
    pub lead: String,
    /// Usernames; treated as a set but kept in insertion order.
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Overdue,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        };
        f.write_str(s)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Overdue => "Overdue",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    /// Stored as `YYYY-MM-DD`, or an empty string when unset.
    #[serde(default, with = "empty_date")]
    pub deadline: Option<NaiveDate>,
    /// Username of the assignee.
    #[serde(default)]
    pub assigned_to: String,
    /// Team name.
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub assigned_by: String,
    /// ISO 8601 timestamps.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Work handed in against a task. `task` is the task's *title*.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskSubmission {
    pub id: u64,
    pub task: String,
    #[serde(default)]
    pub submission_note: String,
    /// File name only; uploads are not stored.
    #[serde(default)]
    pub submission_file: Option<String>,
    #[serde(default)]
    pub submitted_by: String,
    #[serde(default)]
    pub created_at: String,
}

/// Legacy address-book entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Contact {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    /// National identity number, `#####-#######-#`.
    #[serde(default)]
    pub cnic: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_whatsapp: bool,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub designation: String,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

fn none_marker() -> String {
    NONE_MARKER.to_string()
}

fn default_true() -> bool {
    true
}

macro_rules! impl_entity {
    ($ty:ty, $key:expr, $label:expr, $seed:path) => {
        impl Entity for $ty {
            const KEY: &'static str = $key;
            const LABEL: &'static str = $label;

            fn id(&self) -> u64 {
                self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = id;
            }

            fn seed() -> Vec<Self> {
                $seed()
            }
        }
    };
}

impl_entity!(Department, "jira_departments", "Department", seeds::departments);
impl_entity!(Role, "jira_roles", "Role", seeds::roles);
impl_entity!(User, "jira_users", "User", seeds::users);
impl_entity!(Team, "jira_teams", "Team", seeds::teams);
impl_entity!(Task, "jira_tasks", "Task", seeds::tasks);
impl_entity!(TaskSubmission, "jira_task_submissions", "Task submission", seeds::submissions);
impl_entity!(Contact, "contacts", "Contact", seeds::contacts);

/// `Option<NaiveDate>` stored the way a date input leaves it: `""` when unset.
mod empty_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
