//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

use board_engine::model::{Invitation, Member, Workspace};
use board_engine::{EntityId, Roster, Theme, WorkspaceOverview};

/// Workspace-level state shared by the header and the member panel
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Workspace the user owns, if any
    pub own_workspace: Option<Workspace>,
    /// Own workspace first, then joined ones
    pub workspaces: Vec<Workspace>,
    pub current_workspace_id: Option<EntityId>,
    pub members: Roster<Member>,
    pub invitations: Roster<Invitation>,
    pub theme: Theme,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Apply a freshly loaded overview, keeping the selected workspace when it
/// still exists
pub fn store_apply_overview(store: &AppStore, overview: WorkspaceOverview) {
    let workspaces: Vec<Workspace> = overview.all_workspaces().into_iter().cloned().collect();
    let selected = store.current_workspace_id().get_untracked();
    let keep = selected.filter(|id| workspaces.iter().any(|w| w.id == *id));
    store
        .current_workspace_id()
        .set(keep.or_else(|| workspaces.first().map(|w| w.id)));
    store.own_workspace().set(overview.own);
    store.workspaces().set(workspaces);
    store.invitations().write().reset(overview.invitations);
}

/// Add a workspace the user just joined
pub fn store_add_workspace(store: &AppStore, workspace: Workspace) {
    let binding = store.workspaces();
    let mut workspaces = binding.write();
    if !workspaces.iter().any(|w| w.id == workspace.id) {
        workspaces.push(workspace);
    }
}

/// The current workspace is the user's own
pub fn store_owns_current(store: &AppStore) -> bool {
    let own = store.own_workspace().with(|w| w.as_ref().map(|w| w.id));
    own.is_some() && own == store.current_workspace_id().get()
}
