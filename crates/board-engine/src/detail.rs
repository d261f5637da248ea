//! Task Detail
//!
//! View-model behind the task modal: description, checklists and their
//! items, comments and labels. Mutations are optimistic like the board's,
//! with one extra rule: a checklist, item or comment that has a call in
//! flight refuses further operations until that call settles.

use std::collections::HashSet;

use crate::api::TaskApi;
use crate::controller::Ack;
use crate::entity::{self, ChecklistId, ChecklistItemId, CommentId, EntityId, LabelId, TaskId, TempIds};
use crate::error::{ApiError, ApiResult};
use crate::model::{Checklist, ChecklistItem, Comment, Label, Task};
use crate::optimistic::{Optimistic, Pending, Reversion};

/// Everything the modal renders
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailState {
    pub task: Task,
    pub checklists: Vec<Checklist>,
    pub comments: Vec<Comment>,
}

impl DetailState {
    pub fn description(&self) -> Option<&str> {
        self.task.description.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// (completed, total) over every checklist
    pub fn checklist_totals(&self) -> (usize, usize) {
        self.checklists.iter().fold((0, 0), |(done, total), c| {
            let (d, t) = c.progress();
            (done + d, total + t)
        })
    }

    fn checklist_mut(&mut self, id: ChecklistId) -> Option<&mut Checklist> {
        entity::find_mut(&mut self.checklists, id)
    }

    fn item_mut(&mut self, checklist_id: ChecklistId, item_id: ChecklistItemId) -> Option<&mut ChecklistItem> {
        self.checklist_mut(checklist_id)
            .and_then(|c| entity::find_mut(&mut c.items, item_id))
    }

    fn item(&self, checklist_id: ChecklistId, item_id: ChecklistItemId) -> Option<&ChecklistItem> {
        entity::find(&self.checklists, checklist_id).and_then(|c| entity::find(&c.items, item_id))
    }
}

/// Fetch task info, checklists and comments concurrently
pub async fn load_task_detail<A>(api: &A, task_id: TaskId) -> ApiResult<DetailState>
where
    A: TaskApi + ?Sized,
{
    let (task, checklists, comments) = futures::try_join!(
        api.task_info(task_id),
        api.checklists(task_id),
        api.comments(task_id)
    )?;
    log::debug!(
        "[DETAIL] Loaded task {}: {} checklists, {} comments",
        task_id,
        checklists.len(),
        comments.len()
    );
    Ok(DetailState { task, checklists, comments })
}

/// What an in-flight operation holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusyKey {
    Description,
    Labels,
    Checklist(ChecklistId),
    Item(ChecklistId, ChecklistItemId),
    Comment(CommentId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailOp {
    /// `existed` picks the update endpoint over the add endpoint
    SaveDescription { text: String, existed: bool },
    CreateChecklist { temp_id: ChecklistId, title: String },
    RenameChecklist { checklist_id: ChecklistId, title: String },
    DeleteChecklist { checklist_id: ChecklistId },
    AddItem { checklist_id: ChecklistId, temp_id: ChecklistItemId, content: String },
    RenameItem { checklist_id: ChecklistId, item_id: ChecklistItemId, content: String },
    ToggleItem { checklist_id: ChecklistId, item_id: ChecklistItemId, completed: bool },
    RemoveItem { checklist_id: ChecklistId, item_id: ChecklistItemId },
    AddComment { temp_id: CommentId, content: String },
    EditComment { comment_id: CommentId, content: String },
    DeleteComment { comment_id: CommentId },
    AssignLabels { label_ids: Vec<LabelId> },
    RemoveLabel { label_id: LabelId },
}

impl DetailOp {
    pub fn busy_key(&self) -> BusyKey {
        match self {
            DetailOp::SaveDescription { .. } => BusyKey::Description,
            DetailOp::CreateChecklist { temp_id, .. } => BusyKey::Checklist(*temp_id),
            DetailOp::RenameChecklist { checklist_id, .. }
            | DetailOp::DeleteChecklist { checklist_id }
            | DetailOp::AddItem { checklist_id, .. } => BusyKey::Checklist(*checklist_id),
            DetailOp::RenameItem { checklist_id, item_id, .. }
            | DetailOp::ToggleItem { checklist_id, item_id, .. }
            | DetailOp::RemoveItem { checklist_id, item_id } => BusyKey::Item(*checklist_id, *item_id),
            DetailOp::AddComment { temp_id, .. } => BusyKey::Comment(*temp_id),
            DetailOp::EditComment { comment_id, .. } | DetailOp::DeleteComment { comment_id } => {
                BusyKey::Comment(*comment_id)
            }
            DetailOp::AssignLabels { .. } | DetailOp::RemoveLabel { .. } => BusyKey::Labels,
        }
    }

    /// Temp id of the entity this op creates
    pub fn temp_id(&self) -> Option<EntityId> {
        match self {
            DetailOp::CreateChecklist { temp_id, .. }
            | DetailOp::AddItem { temp_id, .. }
            | DetailOp::AddComment { temp_id, .. } => Some(*temp_id),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            DetailOp::SaveDescription { .. } => "Failed to save description",
            DetailOp::CreateChecklist { .. } => "Failed to create checklist",
            DetailOp::RenameChecklist { .. } => "Failed to update checklist title",
            DetailOp::DeleteChecklist { .. } => "Failed to delete checklist",
            DetailOp::AddItem { .. } => "Failed to add checklist item",
            DetailOp::RenameItem { .. } => "Failed to update checklist item",
            DetailOp::ToggleItem { .. } => "Failed to update checklist item status",
            DetailOp::RemoveItem { .. } => "Failed to delete checklist item",
            DetailOp::AddComment { .. } => "Failed to post comment",
            DetailOp::EditComment { .. } => "Failed to update comment",
            DetailOp::DeleteComment { .. } => "Failed to delete comment",
            DetailOp::AssignLabels { .. } => "Failed to save labels",
            DetailOp::RemoveLabel { .. } => "Failed to remove label",
        }
    }
}

/// Why an operation was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refused {
    Blank,
    Unchanged,
    /// Another call on the same target is in flight
    Busy,
    /// Target not in the current state
    Missing,
    /// Target still has a temporary id
    Unsaved,
}

impl Refused {
    /// Inline message, where the refusal is worth telling the user about
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Refused::Blank => Some("Text cannot be blank"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailCommit {
    pending: Pending<DetailState>,
    pub op: DetailOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetailSettlement {
    /// Reload the detail; the server state may differ from ours
    pub refetch: bool,
    pub rolled_back: bool,
    /// Board tile shows label and checklist summaries
    pub board_stale: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetail {
    task_id: TaskId,
    state: Optimistic<DetailState>,
    busy: HashSet<BusyKey>,
    /// Temp ids whose create call is still in flight
    creating: HashSet<EntityId>,
    temp_ids: TempIds,
    error: Option<String>,
    available_labels: Vec<Label>,
}

impl TaskDetail {
    pub fn new(state: DetailState) -> Self {
        Self {
            task_id: state.task.id,
            state: Optimistic::new(state),
            busy: HashSet::new(),
            creating: HashSet::new(),
            temp_ids: TempIds::new(),
            error: None,
            available_labels: Vec::new(),
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn state(&self) -> &DetailState {
        self.state.get()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_busy(&self, key: BusyKey) -> bool {
        self.busy.contains(&key)
    }

    pub fn available_labels(&self) -> &[Label] {
        &self.available_labels
    }

    pub fn set_available_labels(&mut self, labels: Vec<Label>) {
        self.available_labels = labels;
    }

    pub fn refetch_ticket(&self) -> u64 {
        self.state.generation()
    }

    /// Accept a reload unless something changed locally since `ticket`
    pub fn reconcile(&mut self, ticket: u64, state: DetailState) -> bool {
        self.state.reconcile(ticket, state)
    }

    // ========================
    // Description
    // ========================

    pub fn begin_save_description(&mut self, text: &str) -> Result<DetailCommit, Refused> {
        let text = non_blank(text)?;
        let existed = self.state().description();
        if existed == Some(text.as_str()) {
            return Err(Refused::Unchanged);
        }
        let existed = existed.is_some();
        let value = text.clone();
        self.begin(DetailOp::SaveDescription { text, existed }, move |s| {
            s.task.description = Some(value);
        })
    }

    // ========================
    // Checklists
    // ========================

    pub fn begin_create_checklist(&mut self, title: &str) -> Result<DetailCommit, Refused> {
        let title = non_blank(title)?;
        let temp_id = self.temp_ids.next();
        let checklist = Checklist::new(temp_id, title.clone());
        self.begin(DetailOp::CreateChecklist { temp_id, title }, move |s| {
            s.checklists.push(checklist);
        })
    }

    pub fn begin_rename_checklist(&mut self, checklist_id: ChecklistId, title: &str) -> Result<DetailCommit, Refused> {
        let title = non_blank(title)?;
        let current = self.saved_checklist(checklist_id)?;
        if current.title == title {
            return Err(Refused::Unchanged);
        }
        let value = title.clone();
        self.begin(DetailOp::RenameChecklist { checklist_id, title }, move |s| {
            if let Some(c) = s.checklist_mut(checklist_id) {
                c.title = value;
            }
        })
    }

    pub fn begin_delete_checklist(&mut self, checklist_id: ChecklistId) -> Result<DetailCommit, Refused> {
        self.saved_checklist(checklist_id)?;
        if self.busy.iter().any(|k| matches!(k, BusyKey::Item(c, _) if *c == checklist_id)) {
            return Err(Refused::Busy);
        }
        self.begin(DetailOp::DeleteChecklist { checklist_id }, move |s| {
            s.checklists.retain(|c| c.id != checklist_id);
        })
    }

    pub fn begin_add_item(&mut self, checklist_id: ChecklistId, content: &str) -> Result<DetailCommit, Refused> {
        let content = non_blank(content)?;
        self.saved_checklist(checklist_id)?;
        let temp_id = self.temp_ids.next();
        let item = ChecklistItem {
            id: temp_id,
            content: content.clone(),
            completed: false,
        };
        self.begin(DetailOp::AddItem { checklist_id, temp_id, content }, move |s| {
            if let Some(c) = s.checklist_mut(checklist_id) {
                c.items.push(item);
            }
        })
    }

    pub fn begin_rename_item(
        &mut self,
        checklist_id: ChecklistId,
        item_id: ChecklistItemId,
        content: &str,
    ) -> Result<DetailCommit, Refused> {
        let content = non_blank(content)?;
        let current = self.saved_item(checklist_id, item_id)?;
        if current.content == content {
            return Err(Refused::Unchanged);
        }
        let value = content.clone();
        self.begin(DetailOp::RenameItem { checklist_id, item_id, content }, move |s| {
            if let Some(item) = s.item_mut(checklist_id, item_id) {
                item.content = value;
            }
        })
    }

    /// Flip the item's completion
    pub fn begin_toggle_item(&mut self, checklist_id: ChecklistId, item_id: ChecklistItemId) -> Result<DetailCommit, Refused> {
        let completed = !self.saved_item(checklist_id, item_id)?.completed;
        self.begin(DetailOp::ToggleItem { checklist_id, item_id, completed }, move |s| {
            if let Some(item) = s.item_mut(checklist_id, item_id) {
                item.completed = completed;
            }
        })
    }

    pub fn begin_remove_item(&mut self, checklist_id: ChecklistId, item_id: ChecklistItemId) -> Result<DetailCommit, Refused> {
        self.saved_item(checklist_id, item_id)?;
        self.begin(DetailOp::RemoveItem { checklist_id, item_id }, move |s| {
            if let Some(c) = s.checklist_mut(checklist_id) {
                c.items.retain(|i| i.id != item_id);
            }
        })
    }

    // ========================
    // Comments
    // ========================

    pub fn begin_add_comment(&mut self, content: &str) -> Result<DetailCommit, Refused> {
        let content = non_blank(content)?;
        let temp_id = self.temp_ids.next();
        let comment = Comment {
            id: temp_id,
            user_id: None,
            content: content.clone(),
            created_at: None,
        };
        self.begin(DetailOp::AddComment { temp_id, content }, move |s| {
            s.comments.push(comment);
        })
    }

    pub fn begin_edit_comment(&mut self, comment_id: CommentId, content: &str) -> Result<DetailCommit, Refused> {
        let content = non_blank(content)?;
        let current = self.saved_comment(comment_id)?;
        if current.content == content {
            return Err(Refused::Unchanged);
        }
        let value = content.clone();
        self.begin(DetailOp::EditComment { comment_id, content }, move |s| {
            if let Some(c) = entity::find_mut(&mut s.comments, comment_id) {
                c.content = value;
            }
        })
    }

    pub fn begin_delete_comment(&mut self, comment_id: CommentId) -> Result<DetailCommit, Refused> {
        self.saved_comment(comment_id)?;
        self.begin(DetailOp::DeleteComment { comment_id }, move |s| {
            s.comments.retain(|c| c.id != comment_id);
        })
    }

    // ========================
    // Labels
    // ========================

    /// Replace the task's labels with `label_ids`, resolved against the
    /// label catalog. Ids missing from the catalog are still sent.
    pub fn begin_assign_labels(&mut self, label_ids: &[LabelId]) -> Result<DetailCommit, Refused> {
        let mut current: Vec<LabelId> = self.state().task.labels.iter().map(|l| l.id).collect();
        let mut wanted = label_ids.to_vec();
        current.sort_unstable();
        wanted.sort_unstable();
        wanted.dedup();
        if current == wanted {
            return Err(Refused::Unchanged);
        }
        let labels: Vec<Label> = wanted
            .iter()
            .filter_map(|id| {
                entity::find(&self.available_labels, *id)
                    .or_else(|| entity::find(&self.state().task.labels, *id))
                    .cloned()
            })
            .collect();
        self.begin(DetailOp::AssignLabels { label_ids: wanted }, move |s| {
            s.task.labels = labels;
        })
    }

    pub fn begin_remove_label(&mut self, label_id: LabelId) -> Result<DetailCommit, Refused> {
        if entity::find(&self.state().task.labels, label_id).is_none() {
            return Err(Refused::Missing);
        }
        self.begin(DetailOp::RemoveLabel { label_id }, move |s| {
            s.task.labels.retain(|l| l.id != label_id);
        })
    }

    fn begin(&mut self, op: DetailOp, mutate: impl FnOnce(&mut DetailState)) -> Result<DetailCommit, Refused> {
        let key = op.busy_key();
        if !self.busy.insert(key) {
            return Err(Refused::Busy);
        }
        let (pending, ()) = self.state.apply(mutate);
        if let Some(temp_id) = op.temp_id() {
            self.creating.insert(temp_id);
        }
        self.error = None;
        Ok(DetailCommit { pending, op })
    }

    fn saved_checklist(&self, checklist_id: ChecklistId) -> Result<&Checklist, Refused> {
        if entity::is_temporary_id(checklist_id) {
            return Err(Refused::Unsaved);
        }
        entity::find(&self.state().checklists, checklist_id).ok_or(Refused::Missing)
    }

    fn saved_item(&self, checklist_id: ChecklistId, item_id: ChecklistItemId) -> Result<&ChecklistItem, Refused> {
        if entity::is_temporary_id(checklist_id) || entity::is_temporary_id(item_id) {
            return Err(Refused::Unsaved);
        }
        self.state().item(checklist_id, item_id).ok_or(Refused::Missing)
    }

    fn saved_comment(&self, comment_id: CommentId) -> Result<&Comment, Refused> {
        if entity::is_temporary_id(comment_id) {
            return Err(Refused::Unsaved);
        }
        entity::find(&self.state().comments, comment_id).ok_or(Refused::Missing)
    }

    // ========================
    // Settlement
    // ========================

    pub fn settle(&mut self, commit: DetailCommit, result: ApiResult<Ack>) -> DetailSettlement {
        let DetailCommit { pending, op } = commit;
        self.busy.remove(&op.busy_key());
        if let Some(temp_id) = op.temp_id() {
            self.creating.remove(&temp_id);
        }
        let mut settlement = DetailSettlement {
            board_stale: matches!(
                op,
                DetailOp::AssignLabels { .. }
                    | DetailOp::RemoveLabel { .. }
                    | DetailOp::CreateChecklist { .. }
                    | DetailOp::DeleteChecklist { .. }
                    | DetailOp::AddItem { .. }
                    | DetailOp::ToggleItem { .. }
                    | DetailOp::RemoveItem { .. }
            ),
            ..Default::default()
        };

        match result {
            Ok(ack) => {
                settlement.refetch = !self.promote(&op, ack);
                log::debug!("[DETAIL] {:?} confirmed", op);
            }
            Err(err) => {
                log::warn!("[DETAIL] {:?} failed: {}", op, err);
                self.error = Some(failure_text(&op, &err));
                settlement.board_stale = false;
                match self.state.revert(pending) {
                    Reversion::Restored => {
                        settlement.rolled_back = true;
                        // the snapshot may predate the promotion of a create that already settled
                        settlement.refetch = self.has_orphaned_temporaries();
                    }
                    Reversion::Superseded => settlement.refetch = true,
                }
            }
        }
        settlement
    }

    fn has_orphaned_temporaries(&self) -> bool {
        let orphaned = |id: EntityId| entity::is_temporary_id(id) && !self.creating.contains(&id);
        let state = self.state();
        state.comments.iter().any(|c| orphaned(c.id))
            || state
                .checklists
                .iter()
                .any(|c| orphaned(c.id) || c.items.iter().any(|i| orphaned(i.id)))
    }

    /// Swap temp ids for server ids. False when a create came back without
    /// an id or the temp entity is gone; the caller reloads.
    fn promote(&mut self, op: &DetailOp, ack: Ack) -> bool {
        let server_id = match ack {
            Ack::Created(id) => id,
            Ack::Done => {
                return !matches!(
                    op,
                    DetailOp::CreateChecklist { .. } | DetailOp::AddItem { .. } | DetailOp::AddComment { .. }
                )
            }
        };
        let mut found = false;
        match *op {
            DetailOp::CreateChecklist { temp_id, .. } => self
                .state
                .amend(|s| found = entity::promote(&mut s.checklists, temp_id, server_id)),
            DetailOp::AddItem { checklist_id, temp_id, .. } => self.state.amend(|s| {
                found = s
                    .checklist_mut(checklist_id)
                    .is_some_and(|c| entity::promote(&mut c.items, temp_id, server_id))
            }),
            DetailOp::AddComment { temp_id, .. } => self
                .state
                .amend(|s| found = entity::promote(&mut s.comments, temp_id, server_id)),
            _ => found = true,
        }
        found
    }
}

fn non_blank(text: &str) -> Result<String, Refused> {
    let text = text.trim();
    if text.is_empty() {
        Err(Refused::Blank)
    } else {
        Ok(text.to_string())
    }
}

fn failure_text(op: &DetailOp, err: &ApiError) -> String {
    let is_label_op = matches!(op, DetailOp::AssignLabels { .. } | DetailOp::RemoveLabel { .. });
    if is_label_op && err.is_not_found() {
        return "Label endpoint not found. Please contact support.".to_string();
    }
    err.user_message(op.failure_message())
}

/// Perform the remote call for a detail commit
pub async fn execute_detail<A>(api: &A, task_id: TaskId, op: &DetailOp) -> ApiResult<Ack>
where
    A: TaskApi + ?Sized,
{
    let created = |id: Option<EntityId>| Ack::from_created(id);
    match op {
        DetailOp::SaveDescription { text, existed: true } => api.update_description(task_id, text).await?,
        DetailOp::SaveDescription { text, existed: false } => api.add_description(task_id, text).await?,
        DetailOp::CreateChecklist { title, .. } => return api.create_checklist(task_id, title).await.map(created),
        DetailOp::RenameChecklist { checklist_id, title } => {
            api.rename_checklist(task_id, *checklist_id, title).await?
        }
        DetailOp::DeleteChecklist { checklist_id } => api.delete_checklist(task_id, *checklist_id).await?,
        DetailOp::AddItem { checklist_id, content, .. } => {
            return api
                .add_checklist_item(task_id, *checklist_id, content)
                .await
                .map(created)
        }
        DetailOp::RenameItem { checklist_id, item_id, content } => {
            api.rename_checklist_item(task_id, *checklist_id, *item_id, content).await?
        }
        DetailOp::ToggleItem { checklist_id, item_id, completed } => {
            api.set_checklist_item_completed(task_id, *checklist_id, *item_id, *completed)
                .await?
        }
        DetailOp::RemoveItem { checklist_id, item_id } => {
            api.remove_checklist_item(task_id, *checklist_id, *item_id).await?
        }
        DetailOp::AddComment { content, .. } => return api.add_comment(task_id, content).await.map(created),
        DetailOp::EditComment { comment_id, content } => api.update_comment(task_id, *comment_id, content).await?,
        DetailOp::DeleteComment { comment_id } => api.delete_comment(task_id, *comment_id).await?,
        DetailOp::AssignLabels { label_ids } => api.assign_labels(task_id, label_ids).await?,
        DetailOp::RemoveLabel { label_id } => api.remove_label(task_id, *label_id).await?,
    }
    Ok(Ack::Done)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct FakeTaskApi {
        calls: RefCell<Vec<String>>,
        fail_status: Cell<Option<u16>>,
        next_id: Cell<Option<EntityId>>,
    }

    impl FakeTaskApi {
        fn record(&self, call: String) -> ApiResult<()> {
            self.calls.borrow_mut().push(call);
            match self.fail_status.get() {
                Some(status) => Err(ApiError::Http { status, message: None }),
                None => Ok(()),
            }
        }

        fn created(&self, call: String) -> ApiResult<Option<EntityId>> {
            self.record(call)?;
            Ok(self.next_id.get())
        }
    }

    #[async_trait(?Send)]
    impl TaskApi for FakeTaskApi {
        async fn task_info(&self, task_id: TaskId) -> ApiResult<Task> {
            Ok(Task::new(task_id, 1, "Write docs"))
        }
        async fn checklists(&self, _task_id: TaskId) -> ApiResult<Vec<Checklist>> {
            Ok(vec![checklist(10, &[(100, false), (101, true)])])
        }
        async fn comments(&self, _task_id: TaskId) -> ApiResult<Vec<Comment>> {
            Ok(vec![comment(20, "first")])
        }
        async fn add_description(&self, _: TaskId, text: &str) -> ApiResult<()> {
            self.record(format!("add_description {}", text))
        }
        async fn update_description(&self, _: TaskId, text: &str) -> ApiResult<()> {
            self.record(format!("update_description {}", text))
        }
        async fn create_checklist(&self, _: TaskId, title: &str) -> ApiResult<Option<ChecklistId>> {
            self.created(format!("create_checklist {}", title))
        }
        async fn rename_checklist(&self, _: TaskId, id: ChecklistId, title: &str) -> ApiResult<()> {
            self.record(format!("rename_checklist {} {}", id, title))
        }
        async fn delete_checklist(&self, _: TaskId, id: ChecklistId) -> ApiResult<()> {
            self.record(format!("delete_checklist {}", id))
        }
        async fn add_checklist_item(&self, _: TaskId, id: ChecklistId, content: &str) -> ApiResult<Option<ChecklistItemId>> {
            self.created(format!("add_item {} {}", id, content))
        }
        async fn rename_checklist_item(&self, _: TaskId, _: ChecklistId, item: ChecklistItemId, content: &str) -> ApiResult<()> {
            self.record(format!("rename_item {} {}", item, content))
        }
        async fn set_checklist_item_completed(&self, _: TaskId, _: ChecklistId, item: ChecklistItemId, done: bool) -> ApiResult<()> {
            self.record(format!("toggle_item {} {}", item, done))
        }
        async fn remove_checklist_item(&self, _: TaskId, _: ChecklistId, item: ChecklistItemId) -> ApiResult<()> {
            self.record(format!("remove_item {}", item))
        }
        async fn all_labels(&self) -> ApiResult<Vec<Label>> {
            Ok(vec![label(1, "bug"), label(2, "feature")])
        }
        async fn assign_labels(&self, _: TaskId, ids: &[LabelId]) -> ApiResult<()> {
            self.record(format!("assign_labels {:?}", ids))
        }
        async fn remove_label(&self, _: TaskId, id: LabelId) -> ApiResult<()> {
            self.record(format!("remove_label {}", id))
        }
        async fn add_comment(&self, _: TaskId, content: &str) -> ApiResult<Option<CommentId>> {
            self.created(format!("add_comment {}", content))
        }
        async fn update_comment(&self, _: TaskId, id: CommentId, content: &str) -> ApiResult<()> {
            self.record(format!("update_comment {} {}", id, content))
        }
        async fn delete_comment(&self, _: TaskId, id: CommentId) -> ApiResult<()> {
            self.record(format!("delete_comment {}", id))
        }
    }

    fn checklist(id: ChecklistId, items: &[(ChecklistItemId, bool)]) -> Checklist {
        let mut c = Checklist::new(id, "Release");
        c.items = items
            .iter()
            .map(|(id, completed)| ChecklistItem {
                id: *id,
                content: format!("item {}", id),
                completed: *completed,
            })
            .collect();
        c
    }

    fn comment(id: CommentId, content: &str) -> Comment {
        Comment {
            id,
            user_id: Some(7),
            content: content.into(),
            created_at: None,
        }
    }

    fn label(id: LabelId, value: &str) -> Label {
        Label {
            id,
            tag_value: value.into(),
            category: None,
            color: "#ff0000".into(),
        }
    }

    async fn loaded(api: &FakeTaskApi) -> TaskDetail {
        let mut detail = TaskDetail::new(load_task_detail(api, 5).await.unwrap());
        detail.set_available_labels(api.all_labels().await.unwrap());
        detail
    }

    async fn run(detail: &mut TaskDetail, api: &FakeTaskApi, commit: DetailCommit) -> DetailSettlement {
        let result = execute_detail(api, detail.task_id(), &commit.op).await;
        detail.settle(commit, result)
    }

    #[tokio::test]
    async fn test_load_combines_three_calls() {
        let api = FakeTaskApi::default();
        let detail = loaded(&api).await;
        assert_eq!(detail.task_id(), 5);
        assert_eq!(detail.state().checklists.len(), 1);
        assert_eq!(detail.state().comments[0].content, "first");
        assert_eq!(detail.state().checklist_totals(), (1, 2));
        assert_eq!(detail.state().checklists[0].percent_complete(), 50);
    }

    #[tokio::test]
    async fn test_description_add_then_update() {
        let api = FakeTaskApi::default();
        let mut detail = loaded(&api).await;
        assert_eq!(detail.begin_save_description("  ").unwrap_err(), Refused::Blank);

        let commit = detail.begin_save_description("First draft").unwrap();
        run(&mut detail, &api, commit).await;
        let commit = detail.begin_save_description("Second draft").unwrap();
        run(&mut detail, &api, commit).await;
        assert_eq!(detail.begin_save_description("Second draft").unwrap_err(), Refused::Unchanged);

        assert_eq!(
            api.calls.borrow().as_slice(),
            ["add_description First draft", "update_description Second draft"]
        );
        assert_eq!(detail.state().description(), Some("Second draft"));
    }

    #[tokio::test]
    async fn test_toggle_guard_and_rollback() {
        let api = FakeTaskApi::default();
        api.fail_status.set(Some(500));
        let mut detail = loaded(&api).await;

        let commit = detail.begin_toggle_item(10, 100).unwrap();
        assert!(detail.state().item(10, 100).unwrap().completed);
        assert!(detail.is_busy(BusyKey::Item(10, 100)));
        assert_eq!(detail.begin_toggle_item(10, 100).unwrap_err(), Refused::Busy);
        assert_eq!(detail.begin_delete_checklist(10).unwrap_err(), Refused::Busy);

        let settlement = run(&mut detail, &api, commit).await;
        assert!(settlement.rolled_back);
        assert!(!detail.state().item(10, 100).unwrap().completed);
        assert!(!detail.is_busy(BusyKey::Item(10, 100)));
        assert_eq!(detail.error(), Some("Failed to update checklist item status"));
        assert_eq!(api.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_add_item_promotes_temp_id() {
        let api = FakeTaskApi::default();
        api.next_id.set(Some(555));
        let mut detail = loaded(&api).await;

        let commit = detail.begin_add_item(10, "Tag release").unwrap();
        let temp_id = detail.state().checklists[0].items.last().unwrap().id;
        assert!(entity::is_temporary_id(temp_id));
        assert_eq!(detail.begin_add_item(10, "again").unwrap_err(), Refused::Busy);
        assert_eq!(detail.begin_toggle_item(10, temp_id).unwrap_err(), Refused::Unsaved);

        let settlement = run(&mut detail, &api, commit).await;
        assert!(!settlement.refetch);
        assert!(settlement.board_stale);
        assert_eq!(detail.state().checklists[0].items.last().unwrap().id, 555);
        assert_eq!(detail.state().checklist_totals(), (1, 3));
    }

    #[tokio::test]
    async fn test_create_without_id_requests_reload() {
        let api = FakeTaskApi::default();
        let mut detail = loaded(&api).await;
        let commit = detail.begin_create_checklist("QA").unwrap();
        let settlement = run(&mut detail, &api, commit).await;
        assert!(settlement.refetch);
        assert_eq!(detail.state().checklists.last().unwrap().title, "QA");
    }

    #[tokio::test]
    async fn test_failed_comment_is_removed() {
        let api = FakeTaskApi::default();
        let mut detail = loaded(&api).await;
        api.fail_status.set(Some(400));
        let commit = detail.begin_add_comment("hello").unwrap();
        assert_eq!(detail.state().comments.len(), 2);
        run(&mut detail, &api, commit).await;
        assert_eq!(detail.state().comments.len(), 1);
        assert_eq!(detail.error(), Some("Failed to post comment"));

        api.fail_status.set(None);
        let commit = detail.begin_edit_comment(20, "edited").unwrap();
        assert!(detail.error().is_none());
        run(&mut detail, &api, commit).await;
        assert_eq!(detail.state().comments[0].content, "edited");
        let commit = detail.begin_delete_comment(20).unwrap();
        run(&mut detail, &api, commit).await;
        assert!(detail.state().comments.is_empty());
    }

    #[tokio::test]
    async fn test_checklist_rename_and_delete() {
        let api = FakeTaskApi::default();
        let mut detail = loaded(&api).await;
        assert_eq!(detail.begin_rename_checklist(10, "Release").unwrap_err(), Refused::Unchanged);
        assert_eq!(detail.begin_rename_checklist(99, "x").unwrap_err(), Refused::Missing);

        let commit = detail.begin_rename_checklist(10, "Launch").unwrap();
        run(&mut detail, &api, commit).await;
        assert_eq!(detail.state().checklists[0].title, "Launch");

        let commit = detail.begin_rename_item(10, 101, "Publish").unwrap();
        run(&mut detail, &api, commit).await;
        let commit = detail.begin_remove_item(10, 100).unwrap();
        run(&mut detail, &api, commit).await;
        assert_eq!(detail.state().checklist_totals(), (1, 1));

        let commit = detail.begin_delete_checklist(10).unwrap();
        run(&mut detail, &api, commit).await;
        assert!(detail.state().checklists.is_empty());
        assert_eq!(
            api.calls.borrow().as_slice(),
            [
                "rename_checklist 10 Launch",
                "rename_item 101 Publish",
                "remove_item 100",
                "delete_checklist 10"
            ]
        );
    }

    #[tokio::test]
    async fn test_labels() {
        let api = FakeTaskApi::default();
        let mut detail = loaded(&api).await;

        let commit = detail.begin_assign_labels(&[2, 1, 2]).unwrap();
        assert_eq!(detail.state().task.labels.len(), 2);
        assert_eq!(detail.begin_remove_label(1).unwrap_err(), Refused::Busy);
        run(&mut detail, &api, commit).await;
        assert_eq!(detail.begin_assign_labels(&[1, 2]).unwrap_err(), Refused::Unchanged);

        api.fail_status.set(Some(404));
        let commit = detail.begin_remove_label(1).unwrap();
        assert_eq!(detail.state().task.labels.len(), 1);
        let settlement = run(&mut detail, &api, commit).await;
        assert!(settlement.rolled_back);
        assert_eq!(detail.state().task.labels.len(), 2);
        assert_eq!(detail.error(), Some("Label endpoint not found. Please contact support."));
        assert_eq!(api.calls.borrow()[0], "assign_labels [1, 2]");
    }

    #[tokio::test]
    async fn test_failed_edit_after_settled_add_requests_reload() {
        let api = FakeTaskApi::default();
        let mut detail = loaded(&api).await;

        let add = detail.begin_add_comment("new one").unwrap();
        let edit = detail.begin_edit_comment(20, "edited").unwrap();

        api.next_id.set(Some(600));
        let settlement = run(&mut detail, &api, add).await;
        assert!(!settlement.refetch);
        let ids: Vec<_> = detail.state().comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![20, 600]);

        api.fail_status.set(Some(500));
        let settlement = run(&mut detail, &api, edit).await;
        assert!(settlement.rolled_back);
        assert!(settlement.refetch);
        assert_eq!(detail.state().comments[0].content, "first");

        // the reload brings the saved comment back under its server id
        let ticket = detail.refetch_ticket();
        let mut fresh = load_task_detail(&api, 5).await.unwrap();
        fresh.comments.push(comment(600, "new one"));
        assert!(detail.reconcile(ticket, fresh));
        api.fail_status.set(None);
        assert!(detail.begin_delete_comment(600).is_ok());
    }

    #[tokio::test]
    async fn test_failed_rename_keeps_in_flight_checklist_without_reload() {
        let api = FakeTaskApi::default();
        let mut detail = loaded(&api).await;

        let create = detail.begin_create_checklist("QA").unwrap();
        let rename = detail.begin_rename_checklist(10, "Launch").unwrap();

        api.fail_status.set(Some(500));
        let settlement = run(&mut detail, &api, rename).await;
        assert!(settlement.rolled_back);
        assert!(!settlement.refetch);
        assert_eq!(detail.state().checklists[0].title, "Release");

        api.fail_status.set(None);
        api.next_id.set(Some(700));
        let settlement = run(&mut detail, &api, create).await;
        assert!(!settlement.refetch);
        assert_eq!(detail.state().checklists.last().unwrap().id, 700);
    }

    #[tokio::test]
    async fn test_stale_reload_is_discarded() {
        let api = FakeTaskApi::default();
        let mut detail = loaded(&api).await;
        let ticket = detail.refetch_ticket();
        let fresh = load_task_detail(&api, 5).await.unwrap();
        let _commit = detail.begin_add_comment("typing fast").unwrap();
        assert!(!detail.reconcile(ticket, fresh.clone()));
        assert_eq!(detail.state().comments.len(), 2);

        let ticket = detail.refetch_ticket();
        assert!(detail.reconcile(ticket, fresh));
        assert_eq!(detail.state().comments.len(), 1);
    }
}
