//! REST paths, relative to the configured base URL

use board_engine::{CardId, ChecklistId, ChecklistItemId, CommentId, EntityId, LabelId, TaskId};

const PROJECTS: &str = "/api/v1/projects";
const WORKSPACE: &str = "/api/v1/workspace";

// ========================
// Board
// ========================

pub fn project_details(project_id: EntityId) -> String {
    format!("{PROJECTS}/{project_id}/details")
}

pub fn project_cards(project_id: EntityId) -> String {
    format!("{PROJECTS}/{project_id}/cards")
}

pub fn card(card_id: CardId) -> String {
    format!("{PROJECTS}/cards/{card_id}")
}

pub fn card_tasks(card_id: CardId) -> String {
    format!("{PROJECTS}/cards/{card_id}/tasks")
}

pub fn task(task_id: TaskId) -> String {
    format!("{PROJECTS}/tasks/{task_id}")
}

pub fn task_move(task_id: TaskId) -> String {
    format!("{}/move", task(task_id))
}

pub fn task_name(task_id: TaskId) -> String {
    format!("{}/name", task(task_id))
}

// ========================
// Task detail
// ========================

pub fn task_info(task_id: TaskId) -> String {
    format!("{PROJECTS}/FetchTaskInfo/{task_id}")
}

pub fn add_description(task_id: TaskId) -> String {
    format!("{}/AddDescription", task(task_id))
}

pub fn update_description(task_id: TaskId) -> String {
    format!("{}/UpdateDescription", task(task_id))
}

pub fn checklists(task_id: TaskId) -> String {
    format!("{}/GetAllChecklists", task(task_id))
}

pub fn create_checklist(task_id: TaskId) -> String {
    format!("{}/CreateChecklists", task(task_id))
}

pub fn rename_checklist(task_id: TaskId, checklist_id: ChecklistId) -> String {
    format!("{}/UpdateChecklistName/{checklist_id}", task(task_id))
}

pub fn delete_checklist(task_id: TaskId, checklist_id: ChecklistId) -> String {
    format!("{}/DeleteChecklist/{checklist_id}", task(task_id))
}

pub fn add_checklist_item(task_id: TaskId, checklist_id: ChecklistId) -> String {
    format!("{}/AddChecklistItem/{checklist_id}/items", task(task_id))
}

pub fn rename_checklist_item(task_id: TaskId, checklist_id: ChecklistId, item_id: ChecklistItemId) -> String {
    format!("{}/UpdateChecklistItemName/{checklist_id}/items/{item_id}", task(task_id))
}

pub fn toggle_checklist_item(task_id: TaskId, checklist_id: ChecklistId, item_id: ChecklistItemId) -> String {
    format!("{}/ToggleChecklistItemStatus/{checklist_id}/items/{item_id}/status", task(task_id))
}

pub fn remove_checklist_item(task_id: TaskId, checklist_id: ChecklistId, item_id: ChecklistItemId) -> String {
    format!("{}/RemoveChecklistItem/{checklist_id}/items/{item_id}", task(task_id))
}

pub fn all_labels() -> String {
    format!("{PROJECTS}/labels/FetchAllLabels")
}

pub fn assign_labels(task_id: TaskId) -> String {
    format!("{}/Assignlabels", task(task_id))
}

pub fn remove_label(task_id: TaskId, label_id: LabelId) -> String {
    format!("{}/RemoveLabelFromTask/{label_id}", task(task_id))
}

pub fn comments(task_id: TaskId) -> String {
    format!("{}/comments", task(task_id))
}

pub fn comment(task_id: TaskId, comment_id: CommentId) -> String {
    format!("{}/comments/{comment_id}", task(task_id))
}

// ========================
// Workspace
// ========================

pub fn my_workspace() -> String {
    format!("{WORKSPACE}/my-workspace")
}

pub fn joined_workspaces() -> String {
    format!("{WORKSPACE}/joined-workspaces")
}

pub fn members(workspace_id: EntityId) -> String {
    format!("{WORKSPACE}/{workspace_id}/members")
}

pub fn member(workspace_id: EntityId, member_id: EntityId) -> String {
    format!("{WORKSPACE}/{workspace_id}/members/{member_id}")
}

pub fn invite(workspace_id: EntityId) -> String {
    format!("{WORKSPACE}/{workspace_id}/invite")
}

pub fn pending_invitations() -> String {
    format!("{WORKSPACE}/invitations/pending")
}

pub fn accept_invitation(invitation_id: EntityId) -> String {
    format!("{WORKSPACE}/invitations/accept/{invitation_id}")
}

pub fn reject_invitation(invitation_id: EntityId) -> String {
    format!("{WORKSPACE}/invitations/reject/{invitation_id}")
}
