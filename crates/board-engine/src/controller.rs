//! Board Controller
//!
//! Owns the optimistic board, the drag gesture state machine and the error
//! banner. Every board mutation is split in three steps so the UI can keep
//! state in a signal and run the network call in between:
//!
//! 1. `begin_*` / `drag_end` apply the change locally and hand back a
//!    [`BoardCommit`].
//! 2. [`execute`] performs the remote call for that commit.
//! 3. [`BoardController::settle`] confirms or rolls back.

use std::collections::HashSet;

use crate::api::BoardApi;
use crate::board::Board;
use crate::entity::{is_temporary_id, CardId, EntityId, TaskId, TempIds};
use crate::error::ApiResult;
use crate::model::{Card, ProjectDetails, Task};
use crate::optimistic::{Confirmation, Optimistic, Pending, Reversion};
use crate::palette::card_color;
use crate::resolve::{resolve_move, DropTarget, Resolution};

/// How long the error banner stays up
pub const DEFAULT_BANNER_TIMEOUT_MS: u32 = 5_000;

/// Drag gesture lifecycle
///
/// `Idle -> Dragging -> Resolving -> Committing -> Settled | RolledBack`.
/// The terminal states accept the next gesture just like `Idle`.
#[derive(Debug, Clone, PartialEq)]
pub enum DragPhase {
    Idle,
    /// Holds the dragged task for the overlay
    Dragging { source: Task },
    Resolving,
    /// Waiting on the move call issued at `generation`
    Committing { generation: u64 },
    Settled,
    RolledBack,
}

impl DragPhase {
    pub fn accepts_new_gesture(&self) -> bool {
        !matches!(self, DragPhase::Dragging { .. } | DragPhase::Resolving)
    }

    pub fn dragged_task(&self) -> Option<&Task> {
        match self {
            DragPhase::Dragging { source } => Some(source),
            _ => None,
        }
    }
}

/// Transient message over the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub id: u64,
    pub message: String,
}

/// A board mutation that was applied locally and still needs the server
#[derive(Debug, Clone, PartialEq)]
pub enum BoardOp {
    MoveTask { task_id: TaskId, destination_card_id: CardId },
    AddCard { temp_id: CardId, name: String },
    DeleteCard { card_id: CardId },
    AddTask { card_id: CardId, temp_id: TaskId, name: String },
    RenameTask { task_id: TaskId, name: String },
    DeleteTask { task_id: TaskId },
}

impl BoardOp {
    /// Banner text when the server gives no message
    pub fn failure_message(&self) -> &'static str {
        match self {
            BoardOp::MoveTask { .. } => "Failed to move task",
            BoardOp::AddCard { .. } => "Failed to add card",
            BoardOp::DeleteCard { .. } => "Failed to delete card",
            BoardOp::AddTask { .. } => "Failed to add task",
            BoardOp::RenameTask { .. } => "Failed to rename task",
            BoardOp::DeleteTask { .. } => "Failed to delete task",
        }
    }

    fn temp_id(&self) -> Option<EntityId> {
        match self {
            BoardOp::AddCard { temp_id, .. } | BoardOp::AddTask { temp_id, .. } => Some(*temp_id),
            _ => None,
        }
    }
}

/// Server acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Done,
    /// A create call that reported the new id
    Created(EntityId),
}

impl Ack {
    pub fn from_created(id: Option<EntityId>) -> Self {
        id.map_or(Ack::Done, Ack::Created)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardCommit {
    pending: Pending<Board>,
    pub op: BoardOp,
}

impl BoardCommit {
    pub fn generation(&self) -> u64 {
        self.pending.generation()
    }
}

/// What the caller should do after settling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settlement {
    /// Fetch the project again to pick up server-side ordering
    pub refetch: bool,
    pub rolled_back: bool,
    /// Banner raised for a failure; schedule its dismissal
    pub banner: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardController {
    project_id: EntityId,
    board: Optimistic<Board>,
    phase: DragPhase,
    hover: Option<DropTarget>,
    banner: Option<ErrorBanner>,
    banners_raised: u64,
    temp_ids: TempIds,
    /// Temp ids whose create call is still out
    creating: HashSet<EntityId>,
    loaded: bool,
}

impl BoardController {
    pub fn new(project_id: EntityId) -> Self {
        Self {
            project_id,
            board: Optimistic::new(Board::default()),
            phase: DragPhase::Idle,
            hover: None,
            banner: None,
            banners_raised: 0,
            temp_ids: TempIds::new(),
            creating: HashSet::new(),
            loaded: false,
        }
    }

    pub fn project_id(&self) -> EntityId {
        self.project_id
    }

    pub fn board(&self) -> &Board {
        self.board.get()
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn hover(&self) -> Option<DropTarget> {
        self.hover
    }

    pub fn banner(&self) -> Option<&ErrorBanner> {
        self.banner.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    // ========================
    // Server state
    // ========================

    /// Initial load: always accepted
    pub fn load(&mut self, details: &ProjectDetails) {
        self.board.replace(Board::from_details(details));
        self.creating.clear();
        self.loaded = true;
        log::info!(
            "[BOARD] Loaded project {} with {} cards, {} tasks",
            self.project_id,
            self.board().cards().len(),
            self.board().task_count()
        );
    }

    /// Take before issuing a refetch; pass to [`Self::reconcile`]
    pub fn refetch_ticket(&self) -> u64 {
        self.board.generation()
    }

    /// Apply a refetched tree unless local mutations happened meanwhile
    pub fn reconcile(&mut self, ticket: u64, details: &ProjectDetails) -> bool {
        let accepted = self.board.reconcile(ticket, Board::from_details(details));
        if accepted {
            self.creating.clear();
            self.loaded = true;
        } else {
            log::debug!("[BOARD] Discarded stale refetch (ticket {})", ticket);
        }
        accepted
    }

    // ========================
    // Drag gesture
    // ========================

    /// Capture the dragged task. Unknown ids leave the state untouched.
    pub fn drag_start(&mut self, task_id: TaskId) -> Option<Task> {
        if !self.phase.accepts_new_gesture() {
            return None;
        }
        let source = self.board().task(task_id)?.clone();
        log::debug!("[DND] Drag start: task {}", task_id);
        self.phase = DragPhase::Dragging { source: source.clone() };
        self.hover = None;
        Some(source)
    }

    /// Hover `drag_over(target)` would set, or `None` when it would
    /// change nothing (no drag in progress, or same highlight)
    pub fn hover_change(&self, target: Option<DropTarget>) -> Option<Option<DropTarget>> {
        let DragPhase::Dragging { source } = &self.phase else {
            return None;
        };
        let hover = match target {
            Some(DropTarget::Task(id)) if id == source.id => None,
            other => other,
        };
        (hover != self.hover).then_some(hover)
    }

    /// Hover highlight only; order is never touched while dragging
    pub fn drag_over(&mut self, target: Option<DropTarget>) {
        if let Some(hover) = self.hover_change(target) {
            self.hover = hover;
        }
    }

    pub fn drag_cancel(&mut self) {
        if matches!(self.phase, DragPhase::Dragging { .. }) {
            self.phase = DragPhase::Idle;
        }
        self.hover = None;
    }

    /// Resolve the drop and, for a real move, apply it optimistically.
    /// `None` means nothing to send to the server.
    pub fn drag_end(&mut self, target: Option<DropTarget>) -> Option<BoardCommit> {
        let source = match std::mem::replace(&mut self.phase, DragPhase::Resolving) {
            DragPhase::Dragging { source } => source,
            other => {
                self.phase = other;
                return None;
            }
        };
        self.hover = None;

        let Some(target) = target else {
            self.phase = DragPhase::Idle;
            return None;
        };

        let resolved = match resolve_move(self.board(), source.id, target) {
            Resolution::Move(m) => m,
            Resolution::Abort(reason) => {
                log::debug!("[DND] Drop of task {} aborted: {:?}", source.id, reason);
                self.phase = DragPhase::Idle;
                return None;
            }
        };
        if is_temporary_id(resolved.task_id) || is_temporary_id(resolved.destination_card_id) {
            log::debug!("[DND] Drop involves an unsaved entity, ignoring");
            self.phase = DragPhase::Idle;
            return None;
        }

        log::info!(
            "[DND] Move task {}: card {}[{}] -> card {}[{}]",
            resolved.task_id,
            resolved.source_card_id,
            resolved.source_index,
            resolved.destination_card_id,
            resolved.destination_index
        );
        let commit = self.begin(
            BoardOp::MoveTask {
                task_id: resolved.task_id,
                destination_card_id: resolved.destination_card_id,
            },
            |board| {
                board.move_task(
                    resolved.task_id,
                    resolved.destination_card_id,
                    resolved.destination_index,
                );
            },
        );
        self.phase = DragPhase::Committing { generation: commit.generation() };
        Some(commit)
    }

    // ========================
    // Card and task mutations
    // ========================

    pub fn begin_add_card(&mut self, name: &str) -> Option<BoardCommit> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let temp_id = self.temp_ids.next();
        let color = card_color(self.board().cards().len());
        let card = Card::new(temp_id, name, color);
        Some(self.begin(
            BoardOp::AddCard { temp_id, name: name.to_string() },
            move |board| board.push_card(card),
        ))
    }

    pub fn begin_delete_card(&mut self, card_id: CardId) -> Option<BoardCommit> {
        if is_temporary_id(card_id) || self.board().card(card_id).is_none() {
            return None;
        }
        Some(self.begin(BoardOp::DeleteCard { card_id }, move |board| {
            board.remove_card(card_id);
        }))
    }

    pub fn begin_add_task(&mut self, card_id: CardId, name: &str) -> Option<BoardCommit> {
        let name = name.trim();
        if name.is_empty() || is_temporary_id(card_id) || self.board().card(card_id).is_none() {
            return None;
        }
        let temp_id = self.temp_ids.next();
        let task = Task::new(temp_id, card_id, name);
        Some(self.begin(
            BoardOp::AddTask { card_id, temp_id, name: name.to_string() },
            move |board| {
                board.append_task(card_id, task);
            },
        ))
    }

    pub fn begin_rename_task(&mut self, task_id: TaskId, name: &str) -> Option<BoardCommit> {
        let name = name.trim();
        let current = self.board().task(task_id)?;
        if name.is_empty() || current.name == name || is_temporary_id(task_id) {
            return None;
        }
        let new_name = name.to_string();
        Some(self.begin(
            BoardOp::RenameTask { task_id, name: new_name.clone() },
            move |board| {
                board.rename_task(task_id, &new_name);
            },
        ))
    }

    pub fn begin_delete_task(&mut self, task_id: TaskId) -> Option<BoardCommit> {
        if is_temporary_id(task_id) || self.board().task(task_id).is_none() {
            return None;
        }
        Some(self.begin(BoardOp::DeleteTask { task_id }, move |board| {
            board.remove_task(task_id);
        }))
    }

    fn begin(&mut self, op: BoardOp, mutate: impl FnOnce(&mut Board)) -> BoardCommit {
        let (pending, ()) = self.board.apply(mutate);
        debug_assert!(self.board().is_consistent());
        if let Some(temp_id) = op.temp_id() {
            self.creating.insert(temp_id);
        }
        self.banner = None;
        BoardCommit { pending, op }
    }

    /// Confirm or roll back a commit once the server answered
    pub fn settle(&mut self, commit: BoardCommit, result: ApiResult<Ack>) -> Settlement {
        let BoardCommit { pending, op } = commit;
        let generation = pending.generation();
        if let Some(temp_id) = op.temp_id() {
            self.creating.remove(&temp_id);
        }
        let mut settlement = Settlement::default();

        match result {
            Ok(ack) => {
                let latest = self.board.confirm(&pending) == Confirmation::Latest;
                let promoted = match (&op, ack) {
                    (BoardOp::AddCard { temp_id, .. }, Ack::Created(id)) => {
                        let (temp_id, id) = (*temp_id, id);
                        let mut found = false;
                        self.board.amend(|board| found = board.promote_card(temp_id, id));
                        found
                    }
                    (BoardOp::AddTask { temp_id, .. }, Ack::Created(id)) => {
                        let (temp_id, id) = (*temp_id, id);
                        let mut found = false;
                        self.board.amend(|board| found = board.promote_task(temp_id, id));
                        found
                    }
                    (BoardOp::AddCard { .. } | BoardOp::AddTask { .. }, Ack::Done) => false,
                    _ => true,
                };
                settlement.refetch = latest || !promoted;
                log::debug!("[BOARD] {:?} confirmed (latest: {})", op, latest);
                self.finish_gesture(generation, DragPhase::Settled);
            }
            Err(err) => {
                log::warn!("[BOARD] {:?} failed: {}", op, err);
                let message = err.user_message(op.failure_message());
                match self.board.revert(pending) {
                    Reversion::Restored => {
                        settlement.rolled_back = true;
                        // an older snapshot may resurrect temp ids whose create already settled
                        settlement.refetch = self.has_orphaned_temporaries();
                    }
                    Reversion::Superseded => settlement.refetch = true,
                }
                settlement.banner = Some(self.raise_error(message));
                self.finish_gesture(generation, DragPhase::RolledBack);
            }
        }
        settlement
    }

    fn finish_gesture(&mut self, generation: u64, outcome: DragPhase) {
        if self.phase == (DragPhase::Committing { generation }) {
            self.phase = outcome;
        }
    }

    fn has_orphaned_temporaries(&self) -> bool {
        self.board().cards().iter().any(|card| {
            (card.is_temporary && !self.creating.contains(&card.id))
                || card
                    .tasks
                    .iter()
                    .any(|t| is_temporary_id(t.id) && !self.creating.contains(&t.id))
        })
    }

    // ========================
    // Error banner
    // ========================

    pub fn raise_error(&mut self, message: impl Into<String>) -> u64 {
        self.banners_raised += 1;
        self.banner = Some(ErrorBanner {
            id: self.banners_raised,
            message: message.into(),
        });
        self.banners_raised
    }

    /// Clears the banner only if it is still the one `id` refers to
    pub fn dismiss_error(&mut self, id: u64) -> bool {
        if self.banner.as_ref().map(|b| b.id) == Some(id) {
            self.banner = None;
            true
        } else {
            false
        }
    }
}

/// Perform the remote call for a commit
pub async fn execute<A>(api: &A, project_id: EntityId, op: &BoardOp) -> ApiResult<Ack>
where
    A: BoardApi + ?Sized,
{
    match op {
        BoardOp::MoveTask { task_id, destination_card_id } => {
            api.move_task(*task_id, *destination_card_id).await?;
            Ok(Ack::Done)
        }
        BoardOp::AddCard { name, .. } => api.add_card(project_id, name).await.map(Ack::from_created),
        BoardOp::DeleteCard { card_id } => {
            api.delete_card(*card_id).await?;
            Ok(Ack::Done)
        }
        BoardOp::AddTask { card_id, name, .. } => api.add_task(*card_id, name).await.map(Ack::from_created),
        BoardOp::RenameTask { task_id, name } => {
            api.rename_task(*task_id, name).await?;
            Ok(Ack::Done)
        }
        BoardOp::DeleteTask { task_id } => {
            api.delete_task(*task_id).await?;
            Ok(Ack::Done)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use async_trait::async_trait;

    use super::*;
    use crate::board::tests::ids;
    use crate::error::ApiError;
    use crate::model::ProjectCard;

    /// In-memory API that records calls and fails on demand
    #[derive(Default)]
    struct FakeApi {
        calls: RefCell<Vec<String>>,
        fail: RefCell<bool>,
        next_id: RefCell<Option<EntityId>>,
    }

    impl FakeApi {
        fn failing() -> Self {
            let api = Self::default();
            *api.fail.borrow_mut() = true;
            api
        }

        fn outcome(&self, call: String) -> ApiResult<()> {
            self.calls.borrow_mut().push(call);
            if *self.fail.borrow() {
                Err(ApiError::Http { status: 500, message: None })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait(?Send)]
    impl BoardApi for FakeApi {
        async fn project_details(&self, project_id: EntityId) -> ApiResult<ProjectDetails> {
            Ok(details(project_id, &[]))
        }
        async fn move_task(&self, task_id: TaskId, card_id: CardId) -> ApiResult<()> {
            self.outcome(format!("move {} {}", task_id, card_id))
        }
        async fn add_card(&self, _project_id: EntityId, name: &str) -> ApiResult<Option<CardId>> {
            self.outcome(format!("add_card {}", name))?;
            Ok(*self.next_id.borrow())
        }
        async fn delete_card(&self, card_id: CardId) -> ApiResult<()> {
            self.outcome(format!("delete_card {}", card_id))
        }
        async fn add_task(&self, card_id: CardId, name: &str) -> ApiResult<Option<TaskId>> {
            self.outcome(format!("add_task {} {}", card_id, name))?;
            Ok(*self.next_id.borrow())
        }
        async fn rename_task(&self, task_id: TaskId, name: &str) -> ApiResult<()> {
            self.outcome(format!("rename {} {}", task_id, name))
        }
        async fn delete_task(&self, task_id: TaskId) -> ApiResult<()> {
            self.outcome(format!("delete_task {}", task_id))
        }
    }

    fn details(project_id: EntityId, layout: &[(CardId, &[TaskId])]) -> ProjectDetails {
        ProjectDetails {
            id: project_id,
            name: Some("Launch".into()),
            background_image: None,
            background_color: None,
            model_background_image: None,
            workspace_id: 1,
            cards: layout
                .iter()
                .map(|(card_id, tasks)| ProjectCard {
                    id: *card_id,
                    name: format!("Card {}", card_id),
                    tasks: tasks.iter().map(|id| Task::new(*id, *card_id, format!("T{}", id))).collect(),
                })
                .collect(),
        }
    }

    /// Card X = [T1, T2], Card Y = [T3]
    fn scenario() -> BoardController {
        let mut ctrl = BoardController::new(1);
        ctrl.load(&details(1, &[(100, &[1, 2]), (200, &[3])]));
        ctrl
    }

    async fn run(ctrl: &mut BoardController, api: &FakeApi, commit: BoardCommit) -> Settlement {
        let result = execute(api, ctrl.project_id(), &commit.op).await;
        ctrl.settle(commit, result)
    }

    #[tokio::test]
    async fn test_move_then_rollback_scenario() {
        let mut ctrl = scenario();
        let before = ctrl.board().clone();
        let api = FakeApi::failing();

        assert_eq!(ctrl.drag_start(1).unwrap().name, "T1");
        ctrl.drag_over(Some(DropTarget::Task(3)));
        assert_eq!(ids(ctrl.board(), 100), vec![1, 2], "drag over must not reorder");

        let commit = ctrl.drag_end(Some(DropTarget::Task(3))).unwrap();
        assert_eq!(ids(ctrl.board(), 100), vec![2]);
        assert_eq!(ids(ctrl.board(), 200), vec![1, 3]);
        assert!(ctrl.board().is_consistent());
        assert!(matches!(ctrl.phase(), DragPhase::Committing { .. }));

        let settlement = run(&mut ctrl, &api, commit).await;
        assert!(settlement.rolled_back);
        assert!(!settlement.refetch);
        assert_eq!(ctrl.board(), &before);
        assert_eq!(ctrl.phase(), &DragPhase::RolledBack);
        assert_eq!(ctrl.banner().unwrap().message, "Failed to move task");
        assert_eq!(api.calls.borrow().as_slice(), ["move 1 200"]);
    }

    #[tokio::test]
    async fn test_successful_move_requests_refetch() {
        let mut ctrl = scenario();
        let api = FakeApi::default();
        ctrl.raise_error("old problem");

        ctrl.drag_start(2);
        let commit = ctrl.drag_end(Some(DropTarget::Card(200))).unwrap();
        assert!(ctrl.banner().is_none(), "a new move clears the banner");
        let settlement = run(&mut ctrl, &api, commit).await;

        assert!(settlement.refetch);
        assert_eq!(ctrl.phase(), &DragPhase::Settled);
        assert_eq!(ids(ctrl.board(), 200), vec![3, 2]);
        assert!(ctrl.phase().accepts_new_gesture());
    }

    #[test]
    fn test_drop_in_place_is_a_noop() {
        let mut ctrl = scenario();
        let generation = ctrl.refetch_ticket();
        ctrl.drag_start(2);
        assert!(ctrl.drag_end(Some(DropTarget::Task(2))).is_none());
        assert_eq!(ctrl.phase(), &DragPhase::Idle);
        assert_eq!(ctrl.refetch_ticket(), generation, "no mutation happened");
    }

    #[test]
    fn test_stale_and_missing_targets_abort() {
        let mut ctrl = scenario();
        assert!(ctrl.drag_start(42).is_none());
        assert_eq!(ctrl.phase(), &DragPhase::Idle);

        ctrl.drag_start(1);
        assert!(ctrl.drag_end(None).is_none());
        ctrl.drag_start(1);
        assert!(ctrl.drag_end(Some(DropTarget::Card(999))).is_none());
        assert_eq!(ctrl.phase(), &DragPhase::Idle);
        assert!(ctrl.drag_end(Some(DropTarget::Card(200))).is_none(), "no gesture in progress");
    }

    #[test]
    fn test_hovering_own_task_shows_no_highlight() {
        let mut ctrl = scenario();
        ctrl.drag_over(Some(DropTarget::Card(200)));
        assert_eq!(ctrl.hover(), None, "no drag in progress");
        ctrl.drag_start(1);
        ctrl.drag_over(Some(DropTarget::Task(1)));
        assert_eq!(ctrl.hover(), None);
        ctrl.drag_over(Some(DropTarget::Card(200)));
        assert_eq!(ctrl.hover(), Some(DropTarget::Card(200)));
        ctrl.drag_cancel();
        assert_eq!(ctrl.hover(), None);
        assert_eq!(ctrl.phase(), &DragPhase::Idle);
    }

    #[test]
    fn test_hover_change_only_while_dragging() {
        let mut ctrl = scenario();
        assert_eq!(ctrl.hover_change(Some(DropTarget::Card(200))), None);
        assert_eq!(ctrl.hover_change(None), None);

        ctrl.drag_start(2);
        assert_eq!(ctrl.hover_change(Some(DropTarget::Task(2))), None, "own task, already unhighlighted");
        assert_eq!(ctrl.hover_change(Some(DropTarget::Card(200))), Some(Some(DropTarget::Card(200))));
        ctrl.drag_over(Some(DropTarget::Card(200)));
        assert_eq!(ctrl.hover_change(Some(DropTarget::Card(200))), None);
        assert_eq!(ctrl.hover_change(None), Some(None));

        ctrl.drag_cancel();
        assert_eq!(ctrl.hover_change(Some(DropTarget::Task(3))), None);
    }

    #[tokio::test]
    async fn test_late_failure_does_not_clobber_newer_move() {
        let mut ctrl = scenario();
        let api_fail = FakeApi::failing();

        ctrl.drag_start(1);
        let first = ctrl.drag_end(Some(DropTarget::Card(200))).unwrap();
        ctrl.drag_start(2);
        let second = ctrl.drag_end(Some(DropTarget::Card(200))).unwrap();
        assert_eq!(ids(ctrl.board(), 200), vec![3, 1, 2]);

        let settlement = run(&mut ctrl, &api_fail, first).await;
        assert!(!settlement.rolled_back);
        assert!(settlement.refetch);
        assert_eq!(ids(ctrl.board(), 200), vec![3, 1, 2], "newer move survives");
        assert!(ctrl.board().is_consistent());
        assert!(ctrl.banner().is_some());
        assert!(matches!(ctrl.phase(), DragPhase::Committing { .. }), "second move still pending");

        let settlement = run(&mut ctrl, &FakeApi::default(), second).await;
        assert!(settlement.refetch);
        assert_eq!(ctrl.phase(), &DragPhase::Settled);
    }

    #[test]
    fn test_stale_refetch_is_discarded() {
        let mut ctrl = scenario();
        let ticket = ctrl.refetch_ticket();
        ctrl.drag_start(1);
        let _commit = ctrl.drag_end(Some(DropTarget::Card(200))).unwrap();
        assert!(!ctrl.reconcile(ticket, &details(1, &[(100, &[1, 2]), (200, &[3])])));
        assert_eq!(ids(ctrl.board(), 200), vec![3, 1]);

        let ticket = ctrl.refetch_ticket();
        assert!(ctrl.reconcile(ticket, &details(1, &[(100, &[2]), (200, &[1, 3])])));
        assert_eq!(ids(ctrl.board(), 200), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_add_card_promotes_temp_id() {
        let mut ctrl = scenario();
        let api = FakeApi::default();
        *api.next_id.borrow_mut() = Some(300);

        assert!(ctrl.begin_add_card("   ").is_none());
        let commit = ctrl.begin_add_card(" Review ").unwrap();
        let card = ctrl.board().cards().last().unwrap().clone();
        assert!(card.is_temporary);
        assert_eq!(card.name, "Review");
        assert_eq!(card.color, card_color(2));

        let settlement = run(&mut ctrl, &api, commit).await;
        assert!(settlement.refetch);
        let card = ctrl.board().card(300).unwrap();
        assert!(!card.is_temporary);
        assert_eq!(api.calls.borrow().as_slice(), ["add_card Review"]);
    }

    #[tokio::test]
    async fn test_failed_add_task_removes_temp_task() {
        let mut ctrl = scenario();
        let before = ctrl.board().clone();
        let commit = ctrl.begin_add_task(200, "Ship it").unwrap();
        assert_eq!(ctrl.board().card(200).unwrap().tasks.len(), 2);

        let settlement = run(&mut ctrl, &FakeApi::failing(), commit).await;
        assert!(settlement.rolled_back);
        assert_eq!(ctrl.board(), &before);
        assert!(settlement.banner.is_some());
    }

    #[test]
    fn test_unsaved_entities_are_not_mutated() {
        let mut ctrl = scenario();
        let _pending = ctrl.begin_add_card("Draft").unwrap();
        let temp_card = ctrl.board().cards().last().unwrap().id;
        assert!(ctrl.begin_add_task(temp_card, "x").is_none());
        assert!(ctrl.begin_delete_card(temp_card).is_none());

        let _pending = ctrl.begin_add_task(100, "new").unwrap();
        let temp_task = ctrl.board().card(100).unwrap().tasks.last().unwrap().id;
        assert!(ctrl.begin_delete_task(temp_task).is_none());
        ctrl.drag_start(temp_task);
        assert!(ctrl.drag_end(Some(DropTarget::Card(200))).is_none());
    }

    #[tokio::test]
    async fn test_rename_and_delete_task() {
        let mut ctrl = scenario();
        let api = FakeApi::default();
        assert!(ctrl.begin_rename_task(1, "T1").is_none(), "unchanged name");
        let commit = ctrl.begin_rename_task(1, "Renamed").unwrap();
        run(&mut ctrl, &api, commit).await;
        assert_eq!(ctrl.board().task(1).unwrap().name, "Renamed");

        let commit = ctrl.begin_delete_task(3).unwrap();
        run(&mut ctrl, &api, commit).await;
        assert!(ctrl.board().task(3).is_none());
        assert!(ctrl.board().card(200).unwrap().tasks.is_empty());

        let commit = ctrl.begin_delete_card(200).unwrap();
        run(&mut ctrl, &api, commit).await;
        assert!(ctrl.board().card(200).is_none());
    }

    #[test]
    fn test_banner_dismiss_only_clears_matching_banner() {
        let mut ctrl = scenario();
        let first = ctrl.raise_error("one");
        let second = ctrl.raise_error("two");
        assert!(!ctrl.dismiss_error(first));
        assert_eq!(ctrl.banner().unwrap().message, "two");
        assert!(ctrl.dismiss_error(second));
        assert!(ctrl.banner().is_none());
    }

    #[tokio::test]
    async fn test_server_message_reaches_banner() {
        struct Forbidden;

        #[async_trait(?Send)]
        impl BoardApi for Forbidden {
            async fn project_details(&self, _: EntityId) -> ApiResult<ProjectDetails> {
                Err(ApiError::Network("offline".into()))
            }
            async fn move_task(&self, _: TaskId, _: CardId) -> ApiResult<()> {
                Err(ApiError::Http { status: 403, message: Some("Read-only board".into()) })
            }
            async fn add_card(&self, _: EntityId, _: &str) -> ApiResult<Option<CardId>> {
                Ok(None)
            }
            async fn delete_card(&self, _: CardId) -> ApiResult<()> {
                Ok(())
            }
            async fn add_task(&self, _: CardId, _: &str) -> ApiResult<Option<TaskId>> {
                Ok(None)
            }
            async fn rename_task(&self, _: TaskId, _: &str) -> ApiResult<()> {
                Ok(())
            }
            async fn delete_task(&self, _: TaskId) -> ApiResult<()> {
                Ok(())
            }
        }

        let mut ctrl = scenario();
        ctrl.drag_start(3);
        let commit = ctrl.drag_end(Some(DropTarget::Task(1))).unwrap();
        let result = execute(&Forbidden, 1, &commit.op).await;
        ctrl.settle(commit, result);
        assert_eq!(ctrl.banner().unwrap().message, "Read-only board");
    }
}
