//! Kanban Frontend App
//!
//! Root component: top bar, the board for the selected project and the
//! workspace panel.

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;

use board_engine::roster::load_overview;
use board_engine::{EntityId, SettingsStore};

use crate::components::{BoardView, TopBar, WorkspacePanel};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::settings::LocalStorage;
use crate::store::{store_apply_overview, AppState, AppStateStoreFields};

/// Project id from a location hash such as `#project=12` or `#/projects/12`
pub fn project_from_hash(hash: &str) -> Option<EntityId> {
    let hash = hash.trim_start_matches('#').trim_start_matches('/');
    let raw = hash
        .strip_prefix("project=")
        .or_else(|| hash.strip_prefix("projects/"))?;
    raw.trim_end_matches('/').parse().ok().filter(|id| *id > 0)
}

fn location_hash() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

fn set_location_hash(project_id: EntityId) {
    if let Some(window) = web_sys::window() {
        let _ = window.location().set_hash(&format!("project={}", project_id));
    }
}

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    let ctx = AppContext::new(config, project_from_hash(&location_hash()));
    provide_context(ctx);

    let store = Store::new(AppState {
        theme: LocalStorage.theme(),
        ..Default::default()
    });
    provide_context(store);

    // Theme as a data attribute on <html>
    Effect::new(move |_| {
        let theme = store.theme().get();
        let root = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element());
        if let Some(root) = root {
            let _ = root.set_attribute("data-theme", &theme.to_string());
        }
    });

    // Keep the hash in sync so a reload reopens the same board
    Effect::new(move |_| {
        if let Some(project_id) = ctx.current_project.get() {
            set_location_hash(project_id);
        }
    });

    // Workspaces and invitations
    Effect::new(move |_| {
        let trigger = ctx.reload_trigger.get();
        log::debug!("[APP] Loading workspaces, trigger={}", trigger);
        spawn_local(async move {
            match load_overview(&ctx.api()).await {
                Ok(overview) => {
                    log::info!(
                        "[APP] Loaded {} joined workspaces, {} invitations",
                        overview.joined.len(),
                        overview.invitations.len()
                    );
                    store_apply_overview(&store, overview);
                }
                Err(err) => log::error!("[APP] Loading workspaces failed: {}", err),
            }
        });
    });

    view! {
        <div class="app-layout">
            <TopBar />
            <main class="main-content">
                {move || match ctx.current_project.get() {
                    Some(project_id) => view! { <BoardView project_id=project_id /> }.into_any(),
                    None => view! {
                        <div class="empty-state">
                            <h2>"No project open"</h2>
                            <p>"Enter a project number above to open its board."</p>
                        </div>
                    }
                    .into_any(),
                }}
            </main>
            <WorkspacePanel />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_from_hash() {
        assert_eq!(project_from_hash("#project=12"), Some(12));
        assert_eq!(project_from_hash("#/projects/7/"), Some(7));
        assert_eq!(project_from_hash("project=3"), Some(3));
    }

    #[test]
    fn test_project_from_hash_rejects_garbage() {
        assert_eq!(project_from_hash(""), None);
        assert_eq!(project_from_hash("#project=abc"), None);
        assert_eq!(project_from_hash("#project=-4"), None);
        assert_eq!(project_from_hash("#settings"), None);
    }
}
