//! Workspace Tab Bar Component
//!
//! Tabs for the user's own and joined workspaces. The selected tab drives
//! the member panel.

use leptos::prelude::*;

use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn WorkspaceTabBar() -> impl IntoView {
    let store = use_app_store();
    let own_id = move || store.own_workspace().with(|w| w.as_ref().map(|w| w.id));

    view! {
        <div class="workspace-tab-bar">
            <For
                each=move || store.workspaces().get()
                key=|ws| (ws.id, ws.name.clone())
                children=move |ws| {
                    let id = ws.id;
                    let is_active = move || store.current_workspace_id().get() == Some(id);
                    let tab_class = move || {
                        if is_active() { "workspace-tab active" } else { "workspace-tab" }
                    };

                    view! {
                        <button
                            class=tab_class
                            on:click=move |_| store.current_workspace_id().set(Some(id))
                        >
                            {ws.name.clone()}
                            <Show when=move || own_id() == Some(id)>
                                <span class="owner-badge">"owner"</span>
                            </Show>
                        </button>
                    }
                }
            />
            <Show when=move || store.workspaces().with(Vec::is_empty)>
                <span class="workspace-empty">"No workspaces"</span>
            </Show>
        </div>
    }
}
