//! Board Engine
//!
//! UI-independent core of the kanban client: the board model, drag move
//! resolution, the optimistic update cell and the controllers built on it.
//! Remote calls go through the traits in [`api`].

pub mod api;
pub mod board;
pub mod controller;
pub mod detail;
pub mod entity;
pub mod error;
pub mod model;
pub mod optimistic;
pub mod palette;
pub mod resolve;
pub mod roster;
pub mod serde_util;
pub mod settings;

pub use api::{BoardApi, TaskApi, WorkspaceApi};
pub use board::Board;
pub use controller::{execute, Ack, BoardCommit, BoardController, BoardOp, DragPhase, ErrorBanner, Settlement};
pub use detail::{execute_detail, load_task_detail, BusyKey, DetailCommit, DetailOp, DetailState, Refused, TaskDetail};
pub use entity::{CardId, ChecklistId, ChecklistItemId, CommentId, Entity, EntityId, LabelId, TaskId};
pub use error::{ApiError, ApiResult};
pub use optimistic::Optimistic;
pub use resolve::{resolve_move, DropTarget, Resolution};
pub use roster::{RemovalSettlement, Roster, WorkspaceOverview};
pub use settings::{MemorySettings, SettingsStore, Theme};
