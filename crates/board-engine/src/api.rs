//! Remote API Seams
//!
//! Async interfaces the controllers talk to. The app implements them over
//! HTTP; tests implement them in memory. Futures are not `Send` because
//! the browser runtime is single threaded.

use async_trait::async_trait;

use crate::entity::{
    CardId, ChecklistId, ChecklistItemId, CommentId, EntityId, LabelId, TaskId,
};
use crate::error::ApiResult;
use crate::model::{Checklist, Comment, Invitation, Label, Member, ProjectDetails, Task, Workspace};

/// Board-level calls: the project tree and card/task structure
#[async_trait(?Send)]
pub trait BoardApi {
    /// Full card/task tree used for reconciliation
    async fn project_details(&self, project_id: EntityId) -> ApiResult<ProjectDetails>;

    /// The server derives the order itself; only the destination card is sent
    async fn move_task(&self, task_id: TaskId, card_id: CardId) -> ApiResult<()>;

    /// Returns the new id when the server reports one
    async fn add_card(&self, project_id: EntityId, name: &str) -> ApiResult<Option<CardId>>;

    async fn delete_card(&self, card_id: CardId) -> ApiResult<()>;

    async fn add_task(&self, card_id: CardId, name: &str) -> ApiResult<Option<TaskId>>;

    async fn rename_task(&self, task_id: TaskId, name: &str) -> ApiResult<()>;

    async fn delete_task(&self, task_id: TaskId) -> ApiResult<()>;
}

/// Task detail calls: description, checklists, labels, comments
#[async_trait(?Send)]
pub trait TaskApi {
    async fn task_info(&self, task_id: TaskId) -> ApiResult<Task>;

    async fn checklists(&self, task_id: TaskId) -> ApiResult<Vec<Checklist>>;

    async fn comments(&self, task_id: TaskId) -> ApiResult<Vec<Comment>>;

    async fn add_description(&self, task_id: TaskId, description: &str) -> ApiResult<()>;

    async fn update_description(&self, task_id: TaskId, description: &str) -> ApiResult<()>;

    async fn create_checklist(&self, task_id: TaskId, title: &str) -> ApiResult<Option<ChecklistId>>;

    async fn rename_checklist(&self, task_id: TaskId, checklist_id: ChecklistId, title: &str) -> ApiResult<()>;

    async fn delete_checklist(&self, task_id: TaskId, checklist_id: ChecklistId) -> ApiResult<()>;

    async fn add_checklist_item(
        &self,
        task_id: TaskId,
        checklist_id: ChecklistId,
        content: &str,
    ) -> ApiResult<Option<ChecklistItemId>>;

    async fn rename_checklist_item(
        &self,
        task_id: TaskId,
        checklist_id: ChecklistId,
        item_id: ChecklistItemId,
        content: &str,
    ) -> ApiResult<()>;

    async fn set_checklist_item_completed(
        &self,
        task_id: TaskId,
        checklist_id: ChecklistId,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> ApiResult<()>;

    async fn remove_checklist_item(
        &self,
        task_id: TaskId,
        checklist_id: ChecklistId,
        item_id: ChecklistItemId,
    ) -> ApiResult<()>;

    async fn all_labels(&self) -> ApiResult<Vec<Label>>;

    async fn assign_labels(&self, task_id: TaskId, label_ids: &[LabelId]) -> ApiResult<()>;

    async fn remove_label(&self, task_id: TaskId, label_id: LabelId) -> ApiResult<()>;

    async fn add_comment(&self, task_id: TaskId, content: &str) -> ApiResult<Option<CommentId>>;

    async fn update_comment(&self, task_id: TaskId, comment_id: CommentId, content: &str) -> ApiResult<()>;

    async fn delete_comment(&self, task_id: TaskId, comment_id: CommentId) -> ApiResult<()>;
}

/// Workspace and membership calls
#[async_trait(?Send)]
pub trait WorkspaceApi {
    /// `None` when the user owns no workspace yet
    async fn my_workspace(&self) -> ApiResult<Option<Workspace>>;

    async fn joined_workspaces(&self) -> ApiResult<Vec<Workspace>>;

    async fn members(&self, workspace_id: EntityId) -> ApiResult<Vec<Member>>;

    async fn remove_member(&self, workspace_id: EntityId, member_id: EntityId) -> ApiResult<()>;

    async fn invite(&self, workspace_id: EntityId, email: &str) -> ApiResult<()>;

    async fn pending_invitations(&self) -> ApiResult<Vec<Invitation>>;

    async fn accept_invitation(&self, invitation_id: EntityId) -> ApiResult<Workspace>;

    async fn reject_invitation(&self, invitation_id: EntityId) -> ApiResult<()>;
}
