//! Board Models
//!
//! Data structures matching the REST payloads, plus the local `Card`
//! shape the board renders.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::{
    CardId, ChecklistId, ChecklistItemId, CommentId, Entity, EntityId, LabelId, TaskId,
};
use crate::serde_util::{lenient_datetime, null_as_default};

pub const UNTITLED_PROJECT: &str = "Untitled Project";
pub const UNTITLED_CHECKLIST: &str = "Untitled Checklist";
pub const DEFAULT_LABEL_COLOR: &str = "#9CA3AF";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#1e3a8a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[serde(alias = "DONE")]
    Done,
    #[serde(alias = "PENDING")]
    Pending,
}

/// A work item. Owned by exactly one card; `card_id` is a back-reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub card_id: CardId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub due_date_reminder: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<Label>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checklists: Vec<Checklist>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assigned_members: Vec<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

/// Where a task stands relative to its due date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    Done,
    Overdue,
    DueSoon,
    Upcoming,
}

impl Task {
    pub fn new(id: TaskId, card_id: CardId, name: impl Into<String>) -> Self {
        Self {
            id,
            card_id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == Some(TaskStatus::Done)
    }

    /// `None` when the task has no due date. "Soon" means within 24 hours.
    pub fn due_state(&self, now: NaiveDateTime) -> Option<DueState> {
        let due = self.due_date?;
        if self.is_done() {
            return Some(DueState::Done);
        }
        Some(if due < now {
            DueState::Overdue
        } else if due - now <= Duration::hours(24) {
            DueState::DueSoon
        } else {
            DueState::Upcoming
        })
    }

    /// (completed, total) across all checklists
    pub fn checklist_totals(&self) -> (usize, usize) {
        self.checklists.iter().fold((0, 0), |(done, total), c| {
            let (d, t) = c.progress();
            (done + d, total + t)
        })
    }
}

impl Entity for Task {
    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

fn title_or_untitled<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNTITLED_CHECKLIST.to_string()))
}

fn untitled_checklist() -> String {
    UNTITLED_CHECKLIST.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: ChecklistId,
    #[serde(default = "untitled_checklist", deserialize_with = "title_or_untitled")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ChecklistItem>,
}

impl Checklist {
    pub fn new(id: ChecklistId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            items: Vec::new(),
        }
    }

    /// (completed, total)
    pub fn progress(&self) -> (usize, usize) {
        let done = self.items.iter().filter(|i| i.completed).count();
        (done, self.items.len())
    }

    /// Whole-number percentage; an empty checklist is 0%.
    pub fn percent_complete(&self) -> u8 {
        let (done, total) = self.progress();
        if total == 0 {
            0
        } else {
            ((done * 100) / total) as u8
        }
    }
}

impl Entity for Checklist {
    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    #[serde(default, alias = "text", deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, alias = "isCompleted", deserialize_with = "null_as_default")]
    pub completed: bool,
}

impl Entity for ChecklistItem {
    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    #[serde(default)]
    pub user_id: Option<EntityId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<NaiveDateTime>,
}

impl Entity for Comment {
    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

fn default_label_color() -> String {
    DEFAULT_LABEL_COLOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: LabelId,
    #[serde(default, alias = "value", deserialize_with = "null_as_default")]
    pub tag_value: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_label_color")]
    pub color: String,
}

impl Entity for Label {
    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// A column on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub tasks: Vec<Task>,
    pub color: String,
    /// True while awaiting the server-assigned id
    pub is_temporary: bool,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tasks: Vec::new(),
            color: color.into(),
            is_temporary: id < 0,
        }
    }
}

impl Entity for Card {
    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
        self.is_temporary = id < 0;
    }
}

/// Card as the project-details endpoint returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub id: CardId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
}

/// Full card/task tree for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub model_background_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cards: Vec<ProjectCard>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub workspace_id: EntityId,
}

/// Board backdrop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    Image(String),
    Color(String),
}

impl Background {
    pub fn to_css(&self) -> String {
        match self {
            Background::Image(url) => format!("background: url({}) center/cover no-repeat;", url),
            Background::Color(color) => format!("background-color: {};", color),
        }
    }
}

impl ProjectDetails {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNTITLED_PROJECT,
        }
    }

    /// Project image, then project color, then the template image.
    pub fn background(&self) -> Background {
        let present = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        if let Some(image) = present(&self.background_image) {
            Background::Image(image)
        } else if let Some(color) = present(&self.background_color) {
            Background::Color(color)
        } else if let Some(image) = present(&self.model_background_image) {
            Background::Image(image)
        } else {
            Background::Color(DEFAULT_BACKGROUND_COLOR.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: EntityId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub owner: Option<Owner>,
}

/// `my-workspace` wraps the workspace in a dashboard object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    #[serde(default)]
    pub workspace: Option<Workspace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: EntityId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Up to two uppercase initials for avatars
    pub fn initials(&self) -> String {
        [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|n| n.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl Entity for Member {
    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: EntityId,
    #[serde(default)]
    pub workspace_name: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub expires_at: Option<NaiveDateTime>,
}

impl Entity for Invitation {
    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serde_util::parse_datetime;

    #[test]
    fn test_project_details_deserialize() {
        let json = r#"{
            "id": 3,
            "name": null,
            "workspaceId": 9,
            "cards": [
                {"id": 1, "name": "Todo", "tasks": [{"id": 10, "name": "Write"}]},
                {"id": 2, "name": "Done", "tasks": null}
            ]
        }"#;
        let details: ProjectDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.display_name(), UNTITLED_PROJECT);
        assert_eq!(details.cards.len(), 2);
        assert_eq!(details.cards[0].tasks[0].name, "Write");
        assert!(details.cards[1].tasks.is_empty());
        assert_eq!(
            details.background(),
            Background::Color(DEFAULT_BACKGROUND_COLOR.to_string())
        );
    }

    #[test]
    fn test_background_precedence() {
        let mut details: ProjectDetails =
            serde_json::from_str(r#"{"id": 1, "modelBackgroundImage": "m.png"}"#).unwrap();
        assert_eq!(details.background(), Background::Image("m.png".into()));
        details.background_color = Some("#123456".into());
        assert_eq!(details.background(), Background::Color("#123456".into()));
        details.background_image = Some("own.png".into());
        assert_eq!(details.background(), Background::Image("own.png".into()));
    }

    #[test]
    fn test_checklist_alternate_spellings() {
        let json = r#"{"id": 4, "title": null, "items": [
            {"id": 1, "text": "a", "isCompleted": true},
            {"id": 2, "content": "b", "completed": false}
        ]}"#;
        let checklist: Checklist = serde_json::from_str(json).unwrap();
        assert_eq!(checklist.title, UNTITLED_CHECKLIST);
        assert_eq!(checklist.items[0].content, "a");
        assert!(checklist.items[0].completed);
        assert_eq!(checklist.progress(), (1, 2));
        assert_eq!(checklist.percent_complete(), 50);
    }

    #[test]
    fn test_label_defaults() {
        let label: Label = serde_json::from_str(r#"{"id": 1, "value": "bug"}"#).unwrap();
        assert_eq!(label.tag_value, "bug");
        assert_eq!(label.color, DEFAULT_LABEL_COLOR);
    }

    #[test]
    fn test_due_state() {
        let now = parse_datetime("2024-05-01T12:00:00").unwrap();
        let mut task = Task::new(1, 1, "t");
        assert_eq!(task.due_state(now), None);
        task.due_date = parse_datetime("2024-05-01T08:00:00");
        assert_eq!(task.due_state(now), Some(DueState::Overdue));
        task.due_date = parse_datetime("2024-05-02T08:00:00");
        assert_eq!(task.due_state(now), Some(DueState::DueSoon));
        task.due_date = parse_datetime("2024-05-09");
        assert_eq!(task.due_state(now), Some(DueState::Upcoming));
        task.status = Some(TaskStatus::Done);
        assert_eq!(task.due_state(now), Some(DueState::Done));
    }

    #[test]
    fn test_member_names() {
        let m = Member {
            id: 1,
            first_name: "ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
        };
        assert_eq!(m.full_name(), "ada Lovelace");
        assert_eq!(m.initials(), "AL");
    }
}
