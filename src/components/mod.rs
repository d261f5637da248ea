//! UI Components
//!
//! Leptos components for the board, the task modal and the workspace panel.

mod add_card_form;
mod add_task_form;
mod board_view;
mod card_column;
mod checklist_panel;
mod comment_panel;
mod delete_confirm_button;
mod label_panel;
mod task_item;
mod task_modal;
mod top_bar;
mod workspace_panel;
mod workspace_tab_bar;

pub use add_card_form::AddCardForm;
pub use add_task_form::AddTaskForm;
pub use board_view::{use_board_actions, BoardActions, BoardView, ProjectMeta};
pub use card_column::CardColumn;
pub use checklist_panel::{ChecklistIntent, ChecklistPanel};
pub use comment_panel::{CommentIntent, CommentPanel};
pub use delete_confirm_button::DeleteConfirmButton;
pub use label_panel::{LabelIntent, LabelPanel};
pub use task_item::TaskItem;
pub use task_modal::TaskModal;
pub use top_bar::TopBar;
pub use workspace_panel::WorkspacePanel;
pub use workspace_tab_bar::WorkspaceTabBar;
